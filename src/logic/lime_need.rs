use super::calculations::{cao_for_ph_delta, is_valid_ph};
use super::classify::classify_ph;
use crate::config::EngineConfig;
use crate::error::{FertiPlanError, Result};
use crate::models::{LandUse, PhCategory, PlanWarning, SoilTextureClass};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimeNeed {
    pub target_ph: f64,
    /// kg CaO per hectare for one correction cycle.
    pub amount_kg_ha: f64,
    pub category: PhCategory,
    pub capped: bool,
    pub warnings: Vec<PlanWarning>,
}

/// Lime requirement to move `current_ph` up to the target.
///
/// The target comes from the land-use/texture table unless `target_ph`
/// overrides it. Liming only corrects upward: at or above target the need is
/// zero. Heavier soils buffer more and need a larger coefficient per 0.1 pH.
pub fn calculate_lime_need(
    current_ph: f64,
    texture: SoilTextureClass,
    land_use: LandUse,
    target_ph: Option<f64>,
    cfg: &EngineConfig,
) -> Result<LimeNeed> {
    if !is_valid_ph(current_ph, cfg.ph_min, cfg.ph_max) {
        return Err(FertiPlanError::PhOutOfRange {
            field: "current",
            value: current_ph,
            min: cfg.ph_min,
            max: cfg.ph_max,
        });
    }

    let target = target_ph.unwrap_or_else(|| cfg.target_ph_for(land_use, texture));
    if !is_valid_ph(target, cfg.ph_min, cfg.ph_max) {
        return Err(FertiPlanError::PhOutOfRange {
            field: "target",
            value: target,
            min: cfg.ph_min,
            max: cfg.ph_max,
        });
    }

    let category = classify_ph(current_ph);
    let mut warnings = Vec::new();

    if current_ph >= target {
        return Ok(LimeNeed {
            target_ph: target,
            amount_kg_ha: 0.0,
            category,
            capped: false,
            warnings,
        });
    }

    let raw = cao_for_ph_delta(target - current_ph, cfg.lime_coefficient.get(texture));
    let limit = cfg.max_need_per_cycle.get(texture);
    let capped = raw > limit;
    let amount = raw.min(limit);

    tracing::debug!(
        current_ph,
        target,
        %texture,
        raw,
        amount,
        "lime need computed"
    );

    if capped {
        warnings.push(
            PlanWarning::warning(
                "lime_need_capped",
                format!(
                    "Lime need of {:.0} kg CaO/ha exceeds the {:.0} kg CaO/ha limit for one \
                     correction cycle on {} soil; capped.",
                    raw,
                    limit,
                    texture.as_str().to_lowercase()
                ),
            )
            .with_recommendation(
                "Re-test soil pH after the capped cycle before planning further liming.",
            ),
        );
    }

    Ok(LimeNeed {
        target_ph: target,
        amount_kg_ha: amount,
        category,
        capped,
        warnings,
    })
}
