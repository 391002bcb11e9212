use super::{Rule, RuleContext};
use crate::models::PlanWarning;

/// Stale soil analysis rule
///
/// ÚKZÚZ recommends resampling arable land every 4-6 years. Older results
/// still drive the plan but the categories may no longer reflect the soil.
pub struct AnalysisAgeRule;

impl Rule for AnalysisAgeRule {
    fn id(&self) -> &'static str {
        "analysis_age"
    }

    fn name(&self) -> &'static str {
        "Soil Analysis Age"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<PlanWarning> {
        let sample_date = ctx.analysis.analysis.sample_date;
        let age = ctx.analysis.analysis.age_years(ctx.as_of);
        let limit = i64::from(ctx.cfg.resampling_interval_years);

        if age < limit {
            return None;
        }

        Some(
            PlanWarning::warning(
                "analysis_stale",
                format!(
                    "Soil analysis from {} is {} years old (resampling interval is {} years).",
                    sample_date, age, limit
                ),
            )
            .with_recommendation("Take a new soil sample before committing to the plan."),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::logic::classify::classify_analysis;
    use crate::models::{SoilAnalysis, SoilTextureClass};
    use chrono::NaiveDate;

    fn evaluate(sampled: NaiveDate, as_of: NaiveDate) -> Option<PlanWarning> {
        let cfg = EngineConfig::default();
        let classified = classify_analysis(&SoilAnalysis::new(sampled, 6.0), SoilTextureClass::Light);
        AnalysisAgeRule.evaluate(&RuleContext {
            analysis: &classified,
            as_of,
            cfg: &cfg,
        })
    }

    #[test]
    fn four_year_old_analysis_is_stale() {
        let warning = evaluate(
            NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        )
        .unwrap();
        assert_eq!(warning.key, "analysis_stale");
        assert!(warning.message.contains("4 years old"));
    }

    #[test]
    fn recent_analysis_passes() {
        assert!(evaluate(
            NaiveDate::from_ymd_opt(2022, 3, 2).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        )
        .is_none());
    }
}
