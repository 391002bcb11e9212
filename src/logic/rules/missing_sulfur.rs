use super::{Rule, RuleContext};
use crate::models::PlanWarning;

/// Sulfur is often left out of routine AZZP sampling. Without it the S dose
/// falls back to an estimate from the phosphorus category.
pub struct MissingSulfurRule;

impl Rule for MissingSulfurRule {
    fn id(&self) -> &'static str {
        "missing_sulfur"
    }

    fn name(&self) -> &'static str {
        "Missing Sulfur Measurement"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<PlanWarning> {
        if ctx.analysis.analysis.sulfur.is_some() {
            return None;
        }

        Some(
            PlanWarning::warning(
                "sulfur_estimated",
                "Sulfur was not measured; the S dose is estimated from the phosphorus category.",
            )
            .with_recommendation("Ask the laboratory for a sulfate sulfur determination."),
        )
    }
}
