use std::fmt;

/// Opaque user identifier as it appears in the payment records.
pub type User = String;

/// ---------------------------------------------------------------------------
/// Inputs
/// ---------------------------------------------------------------------------

/// A single parsed payment line, from either the batch or the stream file.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    /// Event time in seconds.
    pub timestamp: i64,
    pub payer: User,
    pub payee: User,
    pub amount: f64,
}

/// A streamed payment waiting for a disposition.
///
/// Stream events and batch records share a layout; the alias keeps call
/// sites readable about which phase they belong to.
pub type StreamEvent = PaymentRecord;

/// ---------------------------------------------------------------------------
/// Outputs
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrustVerdict {
    Trusted,
    Unverified,
}

impl TrustVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustVerdict::Trusted => "trusted",
            TrustVerdict::Unverified => "unverified",
        }
    }
}

impl From<bool> for TrustVerdict {
    fn from(trusted: bool) -> Self {
        if trusted {
            TrustVerdict::Trusted
        } else {
            TrustVerdict::Unverified
        }
    }
}

impl fmt::Display for TrustVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a payment was forced to `unverified` regardless of its graph verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagReason {
    /// The event is two days or more behind the newest timestamp seen.
    Expired,
    /// The amount is above the largest amount in the payment history.
    AmountExceeded,
    /// One of the users is bursting in the heat window.
    Suspicious,
}

impl FlagReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagReason::Expired => "expired",
            FlagReason::AmountExceeded => "amount_exceeded",
            FlagReason::Suspicious => "suspicious",
        }
    }

    fn phrase(&self) -> &'static str {
        match self {
            FlagReason::Expired => "has expired",
            FlagReason::AmountExceeded => "has exceeded maximum payment",
            FlagReason::Suspicious => "was suspicious",
        }
    }
}

impl fmt::Display for FlagReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one stream event.
#[derive(Debug, Clone, PartialEq)]
pub struct Disposition {
    /// Graph verdict, written unchanged to the three feature outputs.
    pub verdict: TrustVerdict,
    /// Hops between payer and payee when within the trust depth.
    pub degree: Option<u32>,
    /// First rule that fired, if any.
    pub flag: Option<FlagReason>,
    pub payer: User,
    pub payee: User,
    pub amount: f64,
}

impl Disposition {
    /// Final verdict after the rules: any flag forces `unverified`.
    pub fn final_verdict(&self) -> TrustVerdict {
        match self.flag {
            Some(_) => TrustVerdict::Unverified,
            None => self.verdict,
        }
    }

    /// Line written to the detailed report output.
    pub fn report(&self) -> String {
        match self.flag {
            None => self.verdict.to_string(),
            Some(reason) => format!(
                "Unverified \t Reason: Payment {:?} {}, between users {} and {}",
                self.amount,
                reason.phrase(),
                self.payer,
                self.payee,
            ),
        }
    }
}
