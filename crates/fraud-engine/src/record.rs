//! Parsing of comma-separated payment lines:
//!
//! ```text
//! time, id1, id2, amount, message
//! 2016-11-02 09:49:29, 52575, 1120, 25.32, Spam
//! ```
//!
//! Only the first four fields matter. The message is free text and may
//! itself contain commas, so the line is split at most four times.

use crate::error::RecordError;
use crate::types::PaymentRecord;
use chrono::NaiveDateTime;
use std::str::FromStr;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MIN_FIELDS: usize = 4;

impl FromStr for PaymentRecord {
    type Err = RecordError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.splitn(MIN_FIELDS + 1, ',').map(str::trim).collect();
        if fields.len() < MIN_FIELDS {
            return Err(RecordError::MissingField(fields.len()));
        }

        let timestamp = parse_timestamp(fields[0])?;
        let payer = parse_user(fields[1], 1)?;
        let payee = parse_user(fields[2], 2)?;
        let amount = parse_amount(fields[3])?;

        Ok(PaymentRecord {
            timestamp,
            payer,
            payee,
            amount,
        })
    }
}

impl PaymentRecord {
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        line.parse()
    }
}

/// Seconds since the epoch, reading the wall-clock text as UTC.
pub fn parse_timestamp(raw: &str) -> Result<i64, RecordError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|dt| dt.and_utc().timestamp())
        .map_err(|_| RecordError::InvalidTimestamp(raw.to_owned()))
}

fn parse_user(raw: &str, field: usize) -> Result<String, RecordError> {
    if raw.is_empty() {
        return Err(RecordError::EmptyUser(field));
    }
    Ok(raw.to_owned())
}

fn parse_amount(raw: &str) -> Result<f64, RecordError> {
    match raw.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(RecordError::InvalidAmount(raw.to_owned())),
    }
}
