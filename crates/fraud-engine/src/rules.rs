use crate::heat_window::{HeatWindow, Observation};
use crate::types::{FlagReason, StreamEvent};

/// Everything a rule may look at for one event, after the heat window has
/// already observed it.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub event: &'a StreamEvent,
    pub observation: Observation,
    pub heat: &'a HeatWindow,
    pub max_allowed_amount: f64,
}

pub trait FraudRule: std::fmt::Debug + Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Stateless evaluation: reads the context, does not mutate anything.
    fn flag(&self, ctx: &RuleContext<'_>) -> Option<FlagReason>;
}

/// The rule set in precedence order; the first rule that fires wins.
pub fn default_rules() -> Vec<Box<dyn FraudRule>> {
    vec![
        Box::new(ExpiredRule),
        Box::new(AmountCeilingRule),
        Box::new(HeatBurstRule),
    ]
}

#[derive(Debug)]
pub struct ExpiredRule;

impl FraudRule for ExpiredRule {
    fn name(&self) -> &'static str {
        "ExpiredRule"
    }

    fn flag(&self, ctx: &RuleContext<'_>) -> Option<FlagReason> {
        (!ctx.observation.active).then_some(FlagReason::Expired)
    }
}

/// Rejects amounts above the largest payment in the history.
#[derive(Debug)]
pub struct AmountCeilingRule;

impl FraudRule for AmountCeilingRule {
    fn name(&self) -> &'static str {
        "AmountCeilingRule"
    }

    fn flag(&self, ctx: &RuleContext<'_>) -> Option<FlagReason> {
        (ctx.event.amount > ctx.max_allowed_amount).then_some(FlagReason::AmountExceeded)
    }
}

#[derive(Debug)]
pub struct HeatBurstRule;

impl FraudRule for HeatBurstRule {
    fn name(&self) -> &'static str {
        "HeatBurstRule"
    }

    fn flag(&self, ctx: &RuleContext<'_>) -> Option<FlagReason> {
        ctx.heat
            .is_suspicious(&ctx.event.payer, &ctx.event.payee)
            .then_some(FlagReason::Suspicious)
    }
}
