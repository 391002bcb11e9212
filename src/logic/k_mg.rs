use super::calculations::{kg_ha_to_mg_kg, K2O_TO_K, MGO_TO_MG};
use crate::config::EngineConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KMgCorrection {
    pub k2o: f64,
    pub mgo: f64,
    /// Soil K:Mg ratio before fertilization; `None` without usable Mg.
    pub ratio: Option<f64>,
    /// Ratio after the (corrected) doses are incorporated into the topsoil.
    pub projected_ratio: Option<f64>,
    pub corrected: bool,
}

/// mg/kg added to the topsoil per kg/ha of K₂O and MgO.
fn k_per_kg_k2o(cfg: &EngineConfig) -> f64 {
    kg_ha_to_mg_kg(K2O_TO_K, cfg.topsoil_mass_t_ha)
}

fn mg_per_kg_mgo(cfg: &EngineConfig) -> f64 {
    kg_ha_to_mg_kg(MGO_TO_MG, cfg.topsoil_mass_t_ha)
}

/// K:Mg ratio of the soil once `k2o` and `mgo` (kg/ha) are mixed into the
/// topsoil on top of the current stock (mg/kg).
pub fn projected_ratio(k2o: f64, mgo: f64, current_k: f64, current_mg: f64, cfg: &EngineConfig) -> Option<f64> {
    let mg = current_mg + mgo * mg_per_kg_mgo(cfg);
    if mg <= 0.0 {
        return None;
    }
    Some((current_k + k2o * k_per_kg_k2o(cfg)) / mg)
}

/// Nudge the K₂O or MgO dose so the soil K:Mg ratio moves toward the band.
///
/// Only the antagonist of the dominant nutrient is raised, by at most
/// `max_adjustment_factor`, never past the near band edge and never above
/// the annual ceiling. Doses are never lowered, so a zero dose stays zero.
pub fn correct_k_mg(
    k2o: f64,
    mgo: f64,
    current_k: f64,
    current_mg: f64,
    cfg: &EngineConfig,
) -> KMgCorrection {
    let unchanged = |ratio: Option<f64>| KMgCorrection {
        k2o,
        mgo,
        ratio,
        projected_ratio: projected_ratio(k2o, mgo, current_k, current_mg, cfg),
        corrected: false,
    };

    if current_mg <= 0.0 || !current_mg.is_finite() || !current_k.is_finite() {
        return unchanged(None);
    }

    let band = &cfg.k_mg_band;
    let ratio = current_k / current_mg;
    if band.contains(ratio) {
        return unchanged(Some(ratio));
    }

    let k_step = k_per_kg_k2o(cfg);
    let mg_step = mg_per_kg_mgo(cfg);
    let soil_k = current_k + k2o * k_step;
    let soil_mg = current_mg + mgo * mg_step;

    let (new_k2o, new_mgo) = if ratio > band.upper {
        let factor = (ratio / band.upper).min(band.max_adjustment_factor);
        let to_edge = (soil_k / band.upper - current_mg) / mg_step;
        let ceiling = cfg.max_annual_dose.mgo;
        (k2o, (mgo * factor).min(to_edge).min(ceiling).max(mgo))
    } else {
        let factor = (band.lower / ratio).min(band.max_adjustment_factor);
        let to_edge = (band.lower * soil_mg - current_k) / k_step;
        let ceiling = cfg.max_annual_dose.k2o;
        ((k2o * factor).min(to_edge).min(ceiling).max(k2o), mgo)
    };

    let corrected = new_k2o > k2o || new_mgo > mgo;

    tracing::debug!(
        ratio,
        k2o,
        mgo,
        new_k2o,
        new_mgo,
        corrected,
        "k:mg correction"
    );

    KMgCorrection {
        k2o: new_k2o,
        mgo: new_mgo,
        ratio: Some(ratio),
        projected_ratio: projected_ratio(new_k2o, new_mgo, current_k, current_mg, cfg),
        corrected,
    }
}
