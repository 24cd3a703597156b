//! Batch and stream stages over any line-oriented reader.
//!
//! Both inputs start with a header line that is skipped. Malformed
//! records are logged and skipped without touching the network, the heat
//! window or the outputs.

use crate::classifier::FraudClassifier;
use crate::error::{FraudResult, RecordError};
use crate::output::ReportWriter;
use crate::payment_network::NetworkFeed;
use crate::types::{FlagReason, PaymentRecord, TrustVerdict};
use std::io::{BufRead, Write};
use tracing::{info, trace};

/// Counters for one pass over the stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub processed: usize,
    pub skipped: usize,
    pub trusted: usize,
    pub unverified: usize,
    pub expired: usize,
    pub amount_exceeded: usize,
    pub suspicious: usize,
}

/// Yields parsed records, skipping the header and anything unparseable.
///
/// Lines are split on raw bytes so a line that is not UTF-8 is skipped like
/// any other malformed record. Only read failures surface as errors.
fn records<'a, R: BufRead + 'a>(
    reader: R,
    stage: &'static str,
    skipped: &'a mut usize,
) -> impl Iterator<Item = FraudResult<PaymentRecord>> + 'a {
    reader
        .split(b'\n')
        .enumerate()
        .filter_map(move |(idx, line)| {
            let mut line = match line {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            if idx == 0 {
                return None;
            }
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let parsed = std::str::from_utf8(&line)
                .map_err(|err| RecordError::InvalidEncoding(err.valid_up_to()))
                .and_then(PaymentRecord::parse);
            match parsed {
                Ok(record) => Some(Ok(record)),
                Err(err) => {
                    trace!(target: "fraud::pipeline", stage, line = idx + 1, %err, "skipping record");
                    *skipped += 1;
                    None
                }
            }
        })
}

/// Stage 1: builds the payment network from the history.
pub fn load_history<R: BufRead>(reader: R) -> FraudResult<NetworkFeed> {
    let mut feed = NetworkFeed::new();
    let mut skipped = 0;

    for record in records(reader, "batch", &mut skipped) {
        feed.record(&record?);
    }

    info!(
        target: "fraud::pipeline",
        records = feed.records_seen(),
        skipped,
        users = feed.network().user_count(),
        connections = feed.network().connection_count(),
        max_amount = feed.max_amount(),
        "payment network built"
    );
    Ok(feed)
}

/// Stage 2: classifies every streamed payment in arrival order.
pub fn process_stream<R: BufRead, W: Write>(
    reader: R,
    classifier: &mut FraudClassifier,
    output: &mut ReportWriter<W>,
) -> FraudResult<StreamSummary> {
    let mut summary = StreamSummary::default();
    let mut skipped = 0;

    for record in records(reader, "stream", &mut skipped) {
        let disposition = classifier.classify(&record?);
        output.write(&disposition)?;

        summary.processed += 1;
        match disposition.final_verdict() {
            TrustVerdict::Trusted => summary.trusted += 1,
            TrustVerdict::Unverified => summary.unverified += 1,
        }
        match disposition.flag {
            Some(FlagReason::Expired) => summary.expired += 1,
            Some(FlagReason::AmountExceeded) => summary.amount_exceeded += 1,
            Some(FlagReason::Suspicious) => summary.suspicious += 1,
            None => {}
        }
    }
    output.flush()?;
    summary.skipped = skipped;

    info!(
        target: "fraud::pipeline",
        processed = summary.processed,
        skipped = summary.skipped,
        trusted = summary.trusted,
        unverified = summary.unverified,
        expired = summary.expired,
        amount_exceeded = summary.amount_exceeded,
        suspicious = summary.suspicious,
        "stream classified"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const BATCH: &str = "\
time, id1, id2, amount, message
2016-11-02 09:49:29, 1, 2, 25.32, Spam
2016-11-02 09:49:29, 2, 3, 19.45, Food for 🌽 😎
this line is broken
2016-11-02 09:49:29, 3, 4, 100.00, ride, with commas
2016-11-02 09:49:29, 4, 5, not-a-number, oops
2016-11-02 09:49:29, 4, 5, 14.99, Coffee
";

    fn classifier() -> FraudClassifier {
        FraudClassifier::from_feed(load_history(Cursor::new(BATCH)).unwrap())
    }

    fn run(stream: &str) -> (StreamSummary, Vec<String>, Vec<String>) {
        run_bytes(stream.as_bytes())
    }

    fn run_bytes(stream: &[u8]) -> (StreamSummary, Vec<String>, Vec<String>) {
        let mut classifier = classifier();
        let mut output = ReportWriter::new(Vec::new(), Vec::new(), Vec::new(), Vec::new());
        let summary = process_stream(Cursor::new(stream), &mut classifier, &mut output).unwrap();

        let (features, report) = output.into_inner();
        let lines = |buf: Vec<u8>| -> Vec<String> {
            String::from_utf8(buf).unwrap().lines().map(str::to_owned).collect()
        };
        let [first, second, third] = features.map(lines);
        assert_eq!(first, second);
        assert_eq!(second, third);
        (summary, first, lines(report))
    }

    #[test]
    fn test_load_history_skips_malformed() {
        let feed = load_history(Cursor::new(BATCH)).unwrap();

        assert_eq!(feed.records_seen(), 4);
        assert_eq!(feed.max_amount(), 100.0);
        assert_eq!(feed.network().connection_count(), 4);
    }

    #[test]
    fn test_header_only_input() {
        let feed = load_history(Cursor::new("time, id1, id2, amount, message\n")).unwrap();
        assert_eq!(feed.records_seen(), 0);
        assert_eq!(feed.max_amount(), 0.0);
    }

    #[test]
    fn test_stream_outputs() {
        let stream = "\
time, id1, id2, amount, message
2016-11-02 09:49:29, 1, 5, 10.00, four hops
2016-11-02 09:49:30, 1, 6, 10.00, stranger
garbage
2016-11-02 09:49:31, 2, 3, 150.00, too much
2016-10-30 09:49:31, 2, 3, 1.00, two days old
";
        let (summary, verdicts, report) = run(stream);

        assert_eq!(verdicts, ["trusted", "unverified", "trusted", "trusted"]);
        assert_eq!(
            report,
            [
                "trusted",
                "unverified",
                "Unverified \t Reason: Payment 150.0 has exceeded maximum payment, between users 2 and 3",
                "Unverified \t Reason: Payment 1.0 has expired, between users 2 and 3",
            ]
        );
        assert_eq!(
            summary,
            StreamSummary {
                processed: 4,
                skipped: 1,
                trusted: 1,
                unverified: 3,
                expired: 1,
                amount_exceeded: 1,
                suspicious: 0,
            }
        );
    }

    #[test]
    fn test_skipped_record_leaves_no_trace() {
        let clean = "\
time, id1, id2, amount, message
2016-11-02 09:49:29, 1, 2, 1.00, a
2016-11-02 09:49:40, 2, 3, 1.00, b
";
        let noisy = "\
time, id1, id2, amount, message
2016-11-02 09:49:29, 1, 2, 1.00, a
2099-01-01 00:00:00, 1, 2
2016-11-02 09:49:40, 2, 3, 1.00, b
";
        let (clean_summary, clean_verdicts, clean_report) = run(clean);
        let (noisy_summary, noisy_verdicts, noisy_report) = run(noisy);

        assert_eq!(clean_verdicts, noisy_verdicts);
        assert_eq!(clean_report, noisy_report);
        assert_eq!(noisy_summary.skipped, 1);
        assert_eq!(clean_summary.processed, noisy_summary.processed);
    }

    #[test]
    fn test_burst_is_reported_suspicious() {
        let mut stream = String::from("time, id1, id2, amount, message\n");
        for i in 0..12 {
            stream.push_str(&format!("2016-11-02 09:49:29, 1, peer{i}, 1.00, burst\n"));
        }
        stream.push_str("2016-11-02 09:49:30, 1, 2, 1.00, normally trusted\n");

        let (summary, verdicts, report) = run(&stream);
        assert_eq!(verdicts.last().map(String::as_str), Some("trusted"));
        assert_eq!(
            report.last().map(String::as_str),
            Some("Unverified \t Reason: Payment 1.0 was suspicious, between users 1 and 2")
        );
        assert!(summary.suspicious >= 1);
    }

    // ====================================================================
    // Undecodable input
    // ====================================================================

    #[test]
    fn test_stream_skips_non_utf8_line() {
        let mut stream = b"time, id1, id2, amount, message\n".to_vec();
        stream.extend_from_slice(b"2016-11-02 09:49:29, 1, 2, 1.00, a\n");
        stream.extend_from_slice(b"2016-11-02 09:49:30, 1, 2, 1.00, \xff\xfe\n");
        stream.extend_from_slice(b"2016-11-02 09:49:40, 1, 6, 1.00, b\n");

        let (summary, verdicts, report) = run_bytes(&stream);

        assert_eq!(verdicts, ["trusted", "unverified"]);
        assert_eq!(report, ["trusted", "unverified"]);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_history_skips_non_utf8_line() {
        let mut batch = b"time, id1, id2, amount, message\n".to_vec();
        batch.extend_from_slice(b"2016-11-02 09:49:29, 1, 2, 25.00, a\n");
        batch.extend_from_slice(b"2016-11-02 09:49:29, 2, \xff\xfe, 900.00, b\n");
        batch.extend_from_slice(b"2016-11-02 09:49:29, 2, 3, 30.00, c\r\n");

        let feed = load_history(Cursor::new(batch)).unwrap();

        assert_eq!(feed.records_seen(), 2);
        assert_eq!(feed.max_amount(), 30.0, "skipped amount never reaches the ceiling");
        assert_eq!(feed.network().user_count(), 3);
        assert!(feed.network().contains("3"));
    }

    #[test]
    fn test_non_utf8_header_is_skipped() {
        let batch = b"\xff\xfe header\n2016-11-02 09:49:29, 1, 2, 5.00, a\n".to_vec();

        let feed = load_history(Cursor::new(batch)).unwrap();
        assert_eq!(feed.records_seen(), 1);
    }
}
