use super::classify::classify_analysis;
use super::lime_need::calculate_lime_need;
use super::lime_type::{filter_products, select_lime_type};
use super::liming_schedule::{schedule, ScheduleRequest};
use super::rules::{RuleContext, RulesEngine};
use super::validate_parcel;
use crate::config::EngineConfig;
use crate::error::{FertiPlanError, Result};
use crate::models::{merge_warnings, LimeProduct, LimingPlan, Parcel, PlanWarning, Season, SoilAnalysis};
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone)]
pub struct LimingRequest<'a> {
    pub parcel: &'a Parcel,
    pub analysis: &'a SoilAnalysis,
    pub products: &'a [LimeProduct],
    /// Explicit correction target. Must lie above the current pH.
    pub target_ph: Option<f64>,
    pub as_of: NaiveDate,
    pub preferred_season: Option<Season>,
}

/// Full liming workflow for one parcel: classify, pick the lime type, size
/// the need and schedule it.
pub fn generate_liming_plan(req: &LimingRequest<'_>, cfg: &EngineConfig) -> Result<LimingPlan> {
    validate_parcel(req.parcel)?;

    let current_ph = req.analysis.ph;
    if let Some(target) = req.target_ph {
        if target <= current_ph {
            return Err(FertiPlanError::TargetNotAboveCurrent {
                current: current_ph,
                target,
            });
        }
    }

    let texture = req.parcel.texture;
    let classified = classify_analysis(req.analysis, texture);
    let lime_type = select_lime_type(&classified, cfg);
    let need = calculate_lime_need(current_ph, texture, req.parcel.land_use, req.target_ph, cfg)?;

    let matching: Vec<LimeProduct> = filter_products(req.products, lime_type, cfg)
        .into_iter()
        .cloned()
        .collect();

    let mut catalog_warnings = Vec::new();
    if matching.is_empty() && !req.products.is_empty() {
        catalog_warnings.push(
            PlanWarning::warning(
                "lime_type_unavailable",
                format!(
                    "The catalog has no {} lime product.",
                    lime_type.as_str().to_lowercase()
                ),
            )
            .with_recommendation("Extend the lime product catalog or source the product separately."),
        );
    }

    tracing::debug!(
        parcel = %req.parcel.name,
        %lime_type,
        need = need.amount_kg_ha,
        candidates = matching.len(),
        "liming inputs resolved"
    );

    let mut plan = schedule(
        &ScheduleRequest {
            total_cao_need_per_ha: need.amount_kg_ha,
            texture,
            land_use: req.parcel.land_use,
            current_ph,
            target_ph: need.target_ph,
            candidate_products: &matching,
            area_ha: req.parcel.area_ha,
            lime_type,
            current_mg: req.analysis.magnesium,
            start_year: req.as_of.year(),
            preferred_season: req.preferred_season.unwrap_or(cfg.preferred_season),
        },
        cfg,
    )?;

    let context = RuleContext {
        analysis: &classified,
        as_of: req.as_of,
        cfg,
    };
    let rule_warnings = RulesEngine::liming().evaluate(&context);

    let schedule_warnings = std::mem::take(&mut plan.warnings);
    plan.warnings = merge_warnings([need.warnings, catalog_warnings, schedule_warnings, rule_warnings]);

    Ok(plan)
}
