//! Payment fraud classification.
//!
//! A historical batch of payments builds a static [`PaymentNetwork`]; each
//! streamed payment is then checked for graph trust (payer and payee within
//! four hops) and run through a rolling 60-second [`HeatWindow`] that flags
//! expired, oversized and bursting payments.

pub mod classifier;
pub mod error;
pub mod heat_window;
pub mod output;
pub mod payment_network;
pub mod pipeline;
pub mod record;
pub mod rules;
pub mod trust;
pub mod types;

pub use classifier::FraudClassifier;
pub use error::{FraudError, FraudResult, RecordError};
pub use heat_window::{HeatWindow, Observation, Placement};
pub use output::ReportWriter;
pub use payment_network::{NetworkFeed, PaymentNetwork};
pub use pipeline::{load_history, process_stream, StreamSummary};
pub use trust::{TrustResolver, MAX_TRUST_DEPTH};
pub use types::{Disposition, FlagReason, PaymentRecord, StreamEvent, TrustVerdict, User};
