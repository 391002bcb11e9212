use super::{Rule, RuleContext};
use crate::models::{PhCategory, PlanWarning};

pub struct SoilReactionRule;

impl Rule for SoilReactionRule {
    fn id(&self) -> &'static str {
        "soil_reaction"
    }

    fn name(&self) -> &'static str {
        "Soil Reaction"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<PlanWarning> {
        let ph = ctx.analysis.analysis.ph;

        match ctx.analysis.ph_category {
            PhCategory::ExtremelyAcidic | PhCategory::StronglyAcidic => Some(
                PlanWarning::warning(
                    "ph_strongly_acidic",
                    format!(
                        "pH {:.1} is {}; phosphorus and molybdenum availability is reduced.",
                        ph,
                        ctx.analysis.ph_category.as_str().to_lowercase()
                    ),
                )
                .with_recommendation("Correct the soil reaction before raising P and K doses."),
            ),
            PhCategory::Alkaline | PhCategory::StronglyAlkaline => Some(
                PlanWarning::info(
                    "ph_alkaline",
                    format!("pH {:.1} is alkaline; no liming is needed.", ph),
                )
                .with_recommendation("Prefer physiologically acidic fertilizers."),
            ),
            _ => None,
        }
    }
}
