use crate::types::Disposition;
use std::io::{self, Write};

/// Writes each disposition to the three feature outputs and the report.
///
/// The feature outputs all carry the graph verdict; the report carries the
/// flagged reason when a rule fired.
#[derive(Debug)]
pub struct ReportWriter<W: Write> {
    features: [W; 3],
    report: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(feature1: W, feature2: W, feature3: W, report: W) -> Self {
        Self {
            features: [feature1, feature2, feature3],
            report,
        }
    }

    pub fn write(&mut self, disposition: &Disposition) -> io::Result<()> {
        for sink in &mut self.features {
            writeln!(sink, "{}", disposition.verdict)?;
        }
        writeln!(self.report, "{}", disposition.report())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        for sink in &mut self.features {
            sink.flush()?;
        }
        self.report.flush()
    }

    pub fn into_inner(self) -> ([W; 3], W) {
        (self.features, self.report)
    }
}
