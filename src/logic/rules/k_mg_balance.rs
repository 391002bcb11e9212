use super::{Rule, RuleContext};
use crate::models::PlanWarning;

/// K:Mg ratio outside the agronomic band
///
/// A wide ratio means potassium suppresses magnesium uptake; a narrow one
/// the reverse. The fertilization plan corrects it, this rule just flags it.
pub struct KMgBalanceRule;

impl Rule for KMgBalanceRule {
    fn id(&self) -> &'static str {
        "k_mg_balance"
    }

    fn name(&self) -> &'static str {
        "K:Mg Balance"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<PlanWarning> {
        let ratio = ctx.analysis.analysis.k_mg_ratio()?;
        let band = &ctx.cfg.k_mg_band;

        if band.contains(ratio) {
            return None;
        }

        let recommendation = if ratio > band.upper {
            "Favour magnesium: dolomitic lime or kieserite, and hold back potash."
        } else {
            "Favour potassium and avoid further magnesium inputs."
        };

        Some(
            PlanWarning::warning(
                "k_mg_imbalance",
                format!(
                    "K:Mg ratio {:.2} is outside the {:.1}-{:.1} band.",
                    ratio, band.lower, band.upper
                ),
            )
            .with_recommendation(recommendation),
        )
    }
}
