use super::{
    analysis_age::AnalysisAgeRule, k_mg_balance::KMgBalanceRule, missing_sulfur::MissingSulfurRule,
    soil_reaction::SoilReactionRule, Rule, RuleContext,
};
use crate::models::PlanWarning;

pub struct RulesEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl RulesEngine {
    pub fn new() -> Self {
        let rules: Vec<Box<dyn Rule>> = vec![
            Box::new(AnalysisAgeRule),
            Box::new(MissingSulfurRule),
            Box::new(KMgBalanceRule),
            Box::new(SoilReactionRule),
        ];

        Self { rules }
    }

    /// Rules relevant to a liming plan; sulfur only matters for fertilization.
    pub fn liming() -> Self {
        let rules: Vec<Box<dyn Rule>> = vec![
            Box::new(AnalysisAgeRule),
            Box::new(KMgBalanceRule),
            Box::new(SoilReactionRule),
        ];

        Self { rules }
    }

    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<PlanWarning> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let warning = rule.evaluate(ctx)?;
                tracing::debug!(rule = rule.id(), name = rule.name(), key = %warning.key, "rule fired");
                Some(warning)
            })
            .collect()
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::logic::classify::classify_analysis;
    use crate::models::{SoilAnalysis, SoilTextureClass};
    use chrono::NaiveDate;

    fn keys(engine: &RulesEngine, analysis: &SoilAnalysis, as_of: NaiveDate) -> Vec<String> {
        let cfg = EngineConfig::default();
        let classified = classify_analysis(analysis, SoilTextureClass::Medium);
        engine
            .evaluate(&RuleContext {
                analysis: &classified,
                as_of,
                cfg: &cfg,
            })
            .into_iter()
            .map(|w| w.key)
            .collect()
    }

    #[test]
    fn every_rule_reports_in_order() {
        // stale, no sulfur, K:Mg 4.0, pH 4.6
        let analysis = SoilAnalysis::new(NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(), 4.6)
            .with_phosphorus(60.0)
            .with_potassium(400.0)
            .with_magnesium(100.0);
        let as_of = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(
            keys(&RulesEngine::new(), &analysis, as_of),
            vec!["analysis_stale", "sulfur_estimated", "k_mg_imbalance", "ph_strongly_acidic"]
        );
    }

    #[test]
    fn liming_engine_skips_sulfur() {
        let analysis = SoilAnalysis::new(NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(), 4.6)
            .with_potassium(400.0)
            .with_magnesium(100.0);
        let as_of = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let fired = keys(&RulesEngine::liming(), &analysis, as_of);
        assert!(!fired.iter().any(|k| k == "sulfur_estimated"));
        assert!(fired.iter().any(|k| k == "analysis_stale"));
    }

    #[test]
    fn clean_recent_analysis_raises_nothing() {
        let analysis = SoilAnalysis::new(NaiveDate::from_ymd_opt(2025, 8, 20).unwrap(), 6.3)
            .with_phosphorus(90.0)
            .with_potassium(400.0)
            .with_magnesium(200.0)
            .with_sulfur(22.0);
        let as_of = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert!(keys(&RulesEngine::new(), &analysis, as_of).is_empty());
    }
}
