use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
#[command(
    name = "antifraud",
    version,
    about = "Classify streamed payments as trusted or unverified against a payment history"
)]
pub struct Cli {
    /// Historical payments used to build the network
    pub batch: PathBuf,
    /// Payments to classify, in arrival order
    pub stream: PathBuf,
    /// Trust verdict per payment (feature 1)
    pub output1: PathBuf,
    /// Trust verdict per payment (feature 2)
    pub output2: PathBuf,
    /// Trust verdict per payment (feature 3)
    pub output3: PathBuf,
    /// Detailed report including expired, oversized and suspicious payments
    pub output4: PathBuf,

    #[arg(
        long,
        default_value = DEFAULT_LOG_FILTER,
        help = "Log filter directive, overridden by RUST_LOG"
    )]
    pub log_filter: String,
}
