pub mod analysis_age;
pub mod engine;
pub mod k_mg_balance;
pub mod missing_sulfur;
pub mod soil_reaction;

pub use engine::RulesEngine;

use crate::config::EngineConfig;
use crate::models::{ClassifiedAnalysis, PlanWarning};
use chrono::NaiveDate;

/// Inputs every data-quality rule sees.
pub struct RuleContext<'a> {
    pub analysis: &'a ClassifiedAnalysis,
    pub as_of: NaiveDate,
    pub cfg: &'a EngineConfig,
}

/// Trait for data-quality rules
pub trait Rule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Evaluate the rule and return a warning if the condition holds
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<PlanWarning>;
}
