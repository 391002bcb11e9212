use crate::config::EngineConfig;
use crate::error::{FertiPlanError, Result};
use crate::models::{
    ClassifiedAnalysis, LandUse, Nutrient, NutrientCategories, NutrientCategory, NutrientDoses,
    PlanWarning,
};
use serde::{Deserialize, Serialize};

/// Base dose per category, indexed VeryLow..VeryHigh (kg oxide/ha, S as element).
type DoseRow = [f64; 5];

fn base_row(nutrient: Nutrient, land_use: LandUse) -> DoseRow {
    use LandUse::*;
    use Nutrient::*;

    match (nutrient, land_use) {
        (Phosphorus, Arable) => [90.0, 60.0, 35.0, 15.0, 0.0],
        (Phosphorus, PermanentGrassland) => [60.0, 40.0, 25.0, 10.0, 0.0],

        (Potassium, Arable) => [150.0, 100.0, 60.0, 25.0, 0.0],
        (Potassium, PermanentGrassland) => [120.0, 80.0, 50.0, 20.0, 0.0],

        (Magnesium, Arable) => [70.0, 45.0, 25.0, 10.0, 0.0],
        (Magnesium, PermanentGrassland) => [50.0, 35.0, 20.0, 10.0, 0.0],

        (Sulfur, _) => [40.0, 30.0, 20.0, 10.0, 0.0],

        // calcium is covered by the liming plan
        (Calcium, _) => [0.0; 5],
    }
}

/// Sulfur row used when S was not measured, keyed by the phosphorus category.
fn estimated_sulfur_row(land_use: LandUse) -> DoseRow {
    match land_use {
        LandUse::Arable => [25.0, 20.0, 20.0, 15.0, 10.0],
        LandUse::PermanentGrassland => [20.0, 15.0, 15.0, 10.0, 10.0],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientDoseResult {
    pub doses: NutrientDoses,
    pub categories: NutrientCategories,
    /// True when the S dose came from the phosphorus category.
    pub sulfur_estimated: bool,
    pub warnings: Vec<PlanWarning>,
}

fn required(category: Option<NutrientCategory>, nutrient: Nutrient) -> Result<NutrientCategory> {
    category.ok_or_else(|| FertiPlanError::MissingField(format!("{} (soil analysis)", nutrient.as_str())))
}

pub(crate) fn validate_yield_factor(yield_factor: f64, cfg: &EngineConfig) -> Result<()> {
    if !yield_factor.is_finite() || yield_factor <= 0.0 || yield_factor > cfg.max_yield_factor {
        return Err(FertiPlanError::InvalidData(format!(
            "yield factor {} must be in (0, {}]",
            yield_factor, cfg.max_yield_factor
        )));
    }
    Ok(())
}

/// Annual P₂O₅, K₂O, MgO and S recommendation for one year.
///
/// Doses come from the category tables, scale linearly with `yield_factor`,
/// are clamped to the configured annual ceilings and finally zeroed for any
/// measured VeryHigh category (Decree No. 377/2013 Coll.).
pub fn calculate_nutrient_doses(
    analysis: &ClassifiedAnalysis,
    land_use: LandUse,
    yield_factor: f64,
    cfg: &EngineConfig,
) -> Result<NutrientDoseResult> {
    validate_yield_factor(yield_factor, cfg)?;

    for nutrient in [
        Nutrient::Phosphorus,
        Nutrient::Potassium,
        Nutrient::Magnesium,
        Nutrient::Sulfur,
    ] {
        if let Some(value) = analysis.analysis.value(nutrient) {
            if !value.is_finite() || value < 0.0 {
                return Err(FertiPlanError::InvalidData(format!(
                    "{} value {} mg/kg is not a valid measurement",
                    nutrient.as_str(),
                    value
                )));
            }
        }
    }

    let categories = NutrientCategories {
        phosphorus: required(analysis.phosphorus, Nutrient::Phosphorus)?,
        potassium: required(analysis.potassium, Nutrient::Potassium)?,
        magnesium: required(analysis.magnesium, Nutrient::Magnesium)?,
        sulfur: analysis.sulfur,
    };

    let pick = |nutrient: Nutrient, category: NutrientCategory| {
        base_row(nutrient, land_use)[category.index()]
    };

    let (base_s, sulfur_estimated) = match categories.sulfur {
        Some(category) => (pick(Nutrient::Sulfur, category), false),
        None => (estimated_sulfur_row(land_use)[categories.phosphorus.index()], true),
    };

    let base = NutrientDoses {
        p2o5: pick(Nutrient::Phosphorus, categories.phosphorus),
        k2o: pick(Nutrient::Potassium, categories.potassium),
        mgo: pick(Nutrient::Magnesium, categories.magnesium),
        s: base_s,
    };
    let mut doses = base.scaled(yield_factor);
    let mut warnings = Vec::new();

    let ceilings = cfg.max_annual_dose;
    for (nutrient, dose, ceiling) in [
        (Nutrient::Phosphorus, &mut doses.p2o5, ceilings.p2o5),
        (Nutrient::Potassium, &mut doses.k2o, ceilings.k2o),
        (Nutrient::Magnesium, &mut doses.mgo, ceilings.mgo),
        (Nutrient::Sulfur, &mut doses.s, ceilings.s),
    ] {
        if *dose > ceiling {
            warnings.push(PlanWarning::warning(
                format!("annual_cap_{}", nutrient.key()),
                format!(
                    "{} dose of {:.1} kg/ha exceeds the annual ceiling; capped at {:.1} kg/ha.",
                    nutrient.dose_form(),
                    *dose,
                    ceiling
                ),
            ));
            *dose = ceiling;
        }
    }

    let measured = [
        (Nutrient::Phosphorus, Some(categories.phosphorus), &mut doses.p2o5),
        (Nutrient::Potassium, Some(categories.potassium), &mut doses.k2o),
        (Nutrient::Magnesium, Some(categories.magnesium), &mut doses.mgo),
        (Nutrient::Sulfur, categories.sulfur, &mut doses.s),
    ];
    for (nutrient, category, dose) in measured {
        if category == Some(NutrientCategory::VeryHigh) {
            *dose = 0.0;
            warnings.push(
                PlanWarning::error(
                    format!("regulatory_ceiling_{}", nutrient.key()),
                    format!(
                        "{} supply is very high; no {} may be applied (Decree No. 377/2013 Coll.).",
                        nutrient.as_str(),
                        nutrient.dose_form()
                    ),
                )
                .with_recommendation("Skip this nutrient until a new analysis shows a lower category."),
            );
        }
    }

    tracing::debug!(
        yield_factor,
        p2o5 = doses.p2o5,
        k2o = doses.k2o,
        mgo = doses.mgo,
        s = doses.s,
        sulfur_estimated,
        "nutrient doses computed"
    );

    Ok(NutrientDoseResult {
        doses,
        categories,
        sulfur_estimated,
        warnings,
    })
}
