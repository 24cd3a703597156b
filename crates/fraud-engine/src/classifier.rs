use crate::heat_window::HeatWindow;
use crate::payment_network::{NetworkFeed, PaymentNetwork};
use crate::rules::{default_rules, FraudRule, RuleContext};
use crate::trust::TrustResolver;
use crate::types::{Disposition, StreamEvent, TrustVerdict};
use std::sync::Arc;
use tracing::trace;

/// Per-event classifier for the payment stream.
///
/// Owns the heat window outright, so `classify` takes `&mut self` and
/// events for one classifier are serialized by construction. The payment
/// network is shared read-only and may back several classifiers.
#[derive(Debug)]
pub struct FraudClassifier {
    network: Arc<PaymentNetwork>,
    heat: HeatWindow,
    max_allowed_amount: f64,
    rules: Vec<Box<dyn FraudRule>>,
}

impl FraudClassifier {
    pub fn new(network: Arc<PaymentNetwork>, max_allowed_amount: f64) -> Self {
        Self::with_rules(network, max_allowed_amount, default_rules())
    }

    pub fn with_rules(
        network: Arc<PaymentNetwork>,
        max_allowed_amount: f64,
        rules: Vec<Box<dyn FraudRule>>,
    ) -> Self {
        Self {
            network,
            heat: HeatWindow::new(),
            max_allowed_amount,
            rules,
        }
    }

    /// Classifier over a finished history, using its largest amount as the ceiling.
    pub fn from_feed(feed: NetworkFeed) -> Self {
        let (network, max_amount) = feed.finish();
        Self::new(Arc::new(network), max_amount)
    }

    /// Classifies one event. Must be called in arrival order.
    ///
    /// The graph verdict is always computed; the rules then decide whether
    /// the final report is that verdict or a flagged `unverified`.
    pub fn classify(&mut self, event: &StreamEvent) -> Disposition {
        let degree = TrustResolver::new(&self.network).degree_between(&event.payer, &event.payee);
        let verdict = TrustVerdict::from(degree.is_some());

        let observation = self.heat.observe(event.timestamp, &event.payer, &event.payee);

        let ctx = RuleContext {
            event,
            observation,
            heat: &self.heat,
            max_allowed_amount: self.max_allowed_amount,
        };
        let flag = self.rules.iter().find_map(|rule| {
            let reason = rule.flag(&ctx)?;
            trace!(
                target: "fraud::classify",
                rule = rule.name(),
                %reason,
                degree = ?degree,
                payer = %event.payer,
                payee = %event.payee,
                "payment flagged"
            );
            Some(reason)
        });

        Disposition {
            verdict,
            degree,
            flag,
            payer: event.payer.clone(),
            payee: event.payee.clone(),
            amount: event.amount,
        }
    }

    pub fn network(&self) -> &PaymentNetwork {
        &self.network
    }

    pub fn heat(&self) -> &HeatWindow {
        &self.heat
    }

    pub fn max_allowed_amount(&self) -> f64 {
        self.max_allowed_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heat_window::EXPIRY_AGE_SECS;
    use crate::types::{FlagReason, PaymentRecord};

    fn event(timestamp: i64, payer: &str, payee: &str, amount: f64) -> StreamEvent {
        StreamEvent {
            timestamp,
            payer: payer.to_string(),
            payee: payee.to_string(),
            amount,
        }
    }

    /// A-B-C-D-E chain, ceiling 100.
    fn classifier() -> FraudClassifier {
        let mut feed = NetworkFeed::new();
        for (i, pair) in ["A", "B", "C", "D", "E"].windows(2).enumerate() {
            feed.record(&PaymentRecord {
                timestamp: i as i64,
                payer: pair[0].to_string(),
                payee: pair[1].to_string(),
                amount: 100.0,
            });
        }
        FraudClassifier::from_feed(feed)
    }

    #[test]
    fn test_trusted_within_four_hops() {
        let mut c = classifier();
        let d = c.classify(&event(1_000, "A", "E", 10.0));

        assert_eq!(d.verdict, TrustVerdict::Trusted);
        assert_eq!(d.degree, Some(4));
        assert_eq!(d.flag, None);
        assert_eq!(d.report(), "trusted");
    }

    #[test]
    fn test_unknown_user_is_unverified() {
        let mut c = classifier();
        let d = c.classify(&event(1_000, "A", "F", 10.0));

        assert_eq!(d.verdict, TrustVerdict::Unverified);
        assert_eq!(d.degree, None);
        assert_eq!(d.flag, None);
        assert_eq!(d.report(), "unverified");
    }

    #[test]
    fn test_amount_exceeded_overrides_trust() {
        let mut c = classifier();
        let d = c.classify(&event(1_000, "A", "B", 150.0));

        assert_eq!(d.verdict, TrustVerdict::Trusted, "core verdict unchanged");
        assert_eq!(d.degree, Some(1), "degree kept on flagged payments");
        assert_eq!(d.flag, Some(FlagReason::AmountExceeded));
        assert_eq!(d.final_verdict(), TrustVerdict::Unverified);
    }

    #[test]
    fn test_ceiling_comes_from_history() {
        assert_eq!(classifier().max_allowed_amount(), 100.0);
    }

    #[test]
    fn test_expired_takes_precedence_over_amount() {
        let mut c = classifier();
        c.classify(&event(EXPIRY_AGE_SECS + 10, "A", "B", 1.0));
        let d = c.classify(&event(10, "A", "B", 500.0));

        assert_eq!(d.flag, Some(FlagReason::Expired));
    }

    #[test]
    fn test_amount_takes_precedence_over_suspicion() {
        let mut c = classifier();
        for i in 0..11 {
            c.classify(&event(100, "A", &format!("p{i}"), 1.0));
        }

        let suspicious = c.classify(&event(100, "A", "B", 1.0));
        assert_eq!(suspicious.flag, Some(FlagReason::Suspicious));

        let over = c.classify(&event(100, "A", "B", 101.0));
        assert_eq!(over.flag, Some(FlagReason::AmountExceeded));
    }

    #[test]
    fn test_stale_event_is_active_and_unflagged() {
        let mut c = classifier();
        c.classify(&event(1_000, "A", "B", 1.0));
        let d = c.classify(&event(500, "B", "C", 1.0));

        assert_eq!(d.flag, None);
        assert_eq!(d.report(), "trusted");
        assert_eq!(c.heat().pair_count("B", "C"), 0);
    }

    #[test]
    fn test_shared_network_backs_two_classifiers() {
        let mut network = PaymentNetwork::new();
        network.add_edge("A", "B");
        let network = Arc::new(network);

        let mut first = FraudClassifier::new(Arc::clone(&network), 10.0);
        let mut second = FraudClassifier::new(network, 10.0);
        first.classify(&event(0, "A", "B", 1.0));

        assert_eq!(first.heat().pair_count("A", "B"), 1);
        assert_eq!(second.heat().pair_count("A", "B"), 0);
        assert_eq!(second.classify(&event(0, "A", "B", 1.0)).verdict, TrustVerdict::Trusted);
    }

    #[test]
    fn test_custom_rule_set() {
        let mut c = FraudClassifier::with_rules(Arc::new(PaymentNetwork::new()), 0.0, Vec::new());
        let d = c.classify(&event(0, "x", "y", 1_000.0));
        assert_eq!(d.flag, None, "no rules, no flags");
    }
}
