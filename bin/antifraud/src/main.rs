mod cli;

use clap::Parser;
use cli::Cli;
use fraud_engine::{load_history, process_stream, FraudClassifier, FraudError, FraudResult, ReportWriter};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_filter);

    if let Err(err) = run(&cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> FraudResult<()> {
    info!(target: "antifraud::cli", batch = %cli.batch.display(), "loading payment history");
    let feed = load_history(open(&cli.batch)?)?;
    let mut classifier = FraudClassifier::from_feed(feed);

    let mut output = ReportWriter::new(
        create(&cli.output1)?,
        create(&cli.output2)?,
        create(&cli.output3)?,
        create(&cli.output4)?,
    );

    info!(target: "antifraud::cli", stream = %cli.stream.display(), "classifying stream");
    let summary = process_stream(open(&cli.stream)?, &mut classifier, &mut output)?;

    info!(
        target: "antifraud::cli",
        processed = summary.processed,
        flagged = summary.expired + summary.amount_exceeded + summary.suspicious,
        "done"
    );
    Ok(())
}

fn open(path: &Path) -> FraudResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|err| FraudError::open(path, err))
}

fn create(path: &Path) -> FraudResult<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|err| FraudError::open(path, err))
}
