use super::calculations::{kg_ha_to_mg_kg, K2O_TO_K, MGO_TO_MG, P2O5_TO_P};
use super::classify::classify_analysis;
use super::k_mg::correct_k_mg;
use super::nutrient_dose::calculate_nutrient_doses;
use crate::config::EngineConfig;
use crate::error::{FertiPlanError, Result};
use crate::models::{
    Crop, CropRotationRecord, FertilizationRecord, HistoricalInputs, LandUse, NutrientDoses,
    PlanWarning, SoilAnalysis, SoilStock, SoilTextureClass, YearProjection,
};
use chrono::Datelike;
use std::collections::BTreeSet;

/// Yield factors derived from the rotation are kept inside this range.
pub const YIELD_FACTOR_RANGE: (f64, f64) = (0.5, 2.0);

/// Crop grown in `year`. Years outside the recorded rotation repeat it
/// cyclically from the earliest record.
pub fn crop_for_year(rotation: &[CropRotationRecord], year: i32) -> Option<&CropRotationRecord> {
    if let Some(record) = rotation.iter().find(|r| r.year == year) {
        return Some(record);
    }

    let mut sorted: Vec<&CropRotationRecord> = rotation.iter().collect();
    sorted.sort_by_key(|r| r.year);
    let first = sorted.first()?.year;
    let idx = (year - first).rem_euclid(sorted.len() as i32) as usize;
    sorted.get(idx).copied()
}

/// Yield of a rotation slot and whether the crop reference had to stand in.
pub fn expected_yield(record: &CropRotationRecord) -> (f64, bool) {
    match record.yield_t_ha() {
        Some(y) if y.is_finite() && y > 0.0 => (y, false),
        _ => (record.crop.reference_yield_t_ha(), true),
    }
}

pub fn yield_factor_for(crop: Crop, yield_t_ha: f64) -> f64 {
    let (lo, hi) = YIELD_FACTOR_RANGE;
    (yield_t_ha / crop.reference_yield_t_ha()).clamp(lo, hi)
}

pub fn removal(crop: Crop, yield_t_ha: f64) -> NutrientDoses {
    let per_t = crop.removal_per_t();
    NutrientDoses {
        p2o5: per_t.p2o5 * yield_t_ha,
        k2o: per_t.k2o * yield_t_ha,
        mgo: per_t.mgo * yield_t_ha,
        s: per_t.s * yield_t_ha,
    }
}

fn reference_yield_warning(year: i32, crop: Crop) -> PlanWarning {
    PlanWarning::info(
        format!("reference_yield_{}", year),
        format!(
            "No yield recorded for {} in {}; the reference yield of {:.1} t/ha is used.",
            crop,
            year,
            crop.reference_yield_t_ha()
        ),
    )
}

pub struct ProjectionRequest<'a> {
    pub analysis: &'a SoilAnalysis,
    pub texture: SoilTextureClass,
    pub land_use: LandUse,
    pub rotation: &'a [CropRotationRecord],
    pub target_year: i32,
    /// Doses recommended for the target year; they seed the first step.
    pub target_doses: NutrientDoses,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub years: Vec<YearProjection>,
    pub warnings: Vec<PlanWarning>,
}

fn initial_stock(analysis: &SoilAnalysis) -> Result<SoilStock> {
    let need = |value: Option<f64>, name: &str| {
        value.ok_or_else(|| FertiPlanError::MissingField(format!("{} (soil analysis)", name)))
    };
    Ok(SoilStock {
        phosphorus: need(analysis.phosphorus, "P")?,
        potassium: need(analysis.potassium, "K")?,
        magnesium: need(analysis.magnesium, "Mg")?,
        sulfur: analysis.sulfur,
    })
}

/// Balance one year's dose against crop removal and move the soil stock by
/// the net element amount. Stock never drops below zero.
fn advance_stock(stock: SoilStock, dose: &NutrientDoses, removed: &NutrientDoses, soil_t_ha: f64) -> SoilStock {
    let shift = |current: f64, net_oxide: f64, factor: f64| {
        (current + kg_ha_to_mg_kg(net_oxide * factor, soil_t_ha)).max(0.0)
    };
    SoilStock {
        phosphorus: shift(stock.phosphorus, dose.p2o5 - removed.p2o5, P2O5_TO_P),
        potassium: shift(stock.potassium, dose.k2o - removed.k2o, K2O_TO_K),
        magnesium: shift(stock.magnesium, dose.mgo - removed.mgo, MGO_TO_MG),
        sulfur: stock.sulfur.map(|s| shift(s, dose.s - removed.s, 1.0)),
    }
}

/// Multi-year outlook following the target year.
///
/// Each year starts from the previous year's stock plus its dose minus its
/// removal, re-classifies it and re-derives the doses including the K:Mg
/// correction. Dose warnings of future years are not repeated; only the
/// yield fallbacks are reported.
pub fn project_years(req: &ProjectionRequest<'_>, cfg: &EngineConfig) -> Result<Projection> {
    let mut warnings = Vec::new();
    let mut stock = initial_stock(req.analysis)?;

    let mut prev_doses = req.target_doses;
    let mut prev_removal = match crop_for_year(req.rotation, req.target_year) {
        Some(record) => {
            let (y, fallback) = expected_yield(record);
            if fallback {
                warnings.push(reference_yield_warning(req.target_year, record.crop));
            }
            removal(record.crop, y)
        }
        None => NutrientDoses::default(),
    };

    let mut years = Vec::with_capacity(cfg.fertilization_projection_years as usize);
    for offset in 1..=cfg.fertilization_projection_years as i32 {
        let year = req.target_year + offset;
        stock = advance_stock(stock, &prev_doses, &prev_removal, cfg.topsoil_mass_t_ha);

        let slot = crop_for_year(req.rotation, year);
        let (crop, yield_t_ha, yield_factor) = match slot {
            Some(record) => {
                let (y, fallback) = expected_yield(record);
                if fallback {
                    warnings.push(reference_yield_warning(year, record.crop));
                }
                (Some(record.crop), Some(y), yield_factor_for(record.crop, y))
            }
            None => (None, None, 1.0),
        };

        let mut soil = SoilAnalysis::new(req.analysis.sample_date, req.analysis.ph)
            .with_phosphorus(stock.phosphorus)
            .with_potassium(stock.potassium)
            .with_magnesium(stock.magnesium);
        soil.sulfur = stock.sulfur;

        let classified = classify_analysis(&soil, req.texture);
        let result = calculate_nutrient_doses(&classified, req.land_use, yield_factor, cfg)?;
        let correction = correct_k_mg(
            result.doses.k2o,
            result.doses.mgo,
            stock.potassium,
            stock.magnesium,
            cfg,
        );
        let doses = NutrientDoses {
            k2o: correction.k2o,
            mgo: correction.mgo,
            ..result.doses
        };
        let removed = match (crop, yield_t_ha) {
            (Some(c), Some(y)) => removal(c, y),
            _ => NutrientDoses::default(),
        };

        years.push(YearProjection {
            year,
            crop,
            expected_yield_t_ha: yield_t_ha,
            soil: stock,
            categories: result.categories,
            doses,
            removal: removed,
            k_mg_corrected: correction.corrected,
        });

        prev_doses = doses;
        prev_removal = removed;
    }

    tracing::debug!(
        target_year = req.target_year,
        years = years.len(),
        "nutrient projection built"
    );

    Ok(Projection { years, warnings })
}

/// Average annual nutrient inputs over the recorded fertilization history.
pub fn historical_inputs(history: &[FertilizationRecord]) -> Option<HistoricalInputs> {
    if history.is_empty() {
        return None;
    }

    let years: BTreeSet<i32> = history.iter().map(|r| r.date.year()).collect();
    let span = years.len() as f64;

    let mut sum = NutrientDoses::default();
    let mut cao = 0.0;
    for record in history {
        let delivered = record.product.composition.delivered(record.quantity_kg_ha);
        sum.p2o5 += delivered.p2o5.unwrap_or(0.0);
        sum.k2o += delivered.k2o.unwrap_or(0.0);
        sum.mgo += delivered.mgo.unwrap_or(0.0);
        sum.s += delivered.s.unwrap_or(0.0);
        cao += record.product.acidification_factor.unwrap_or(0.0) * record.quantity_kg_ha;
    }
    let avg = sum.scaled(1.0 / span);

    Some(HistoricalInputs {
        years: years.len() as u32,
        records: history.len() as u32,
        avg_p2o5: avg.p2o5,
        avg_k2o: avg.k2o,
        avg_mgo: avg.mgo,
        avg_s: avg.s,
        avg_acidification_cao: cao / span,
    })
}
