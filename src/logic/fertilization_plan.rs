use super::classify::classify_analysis;
use super::k_mg::correct_k_mg;
use super::nutrient_dose::{calculate_nutrient_doses, validate_yield_factor};
use super::projection::{
    crop_for_year, expected_yield, historical_inputs, project_years, yield_factor_for,
    ProjectionRequest,
};
use super::rules::{RuleContext, RulesEngine};
use super::tier::detect_tier;
use super::validate_parcel;
use crate::config::EngineConfig;
use crate::error::{FertiPlanError, Result};
use crate::models::{
    merge_warnings, CostEstimate, CropRotationRecord, FertilizationPlan, FertilizationRecord,
    NutrientDoses, NutrientPrices, Parcel, PlanWarning, SoilAnalysis, Tier,
};
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone)]
pub struct PlanInput<'a> {
    pub parcel: &'a Parcel,
    pub analyses: &'a [SoilAnalysis],
    pub crop_rotation: &'a [CropRotationRecord],
    pub fertilization_history: &'a [FertilizationRecord],
    pub target_year: Option<i32>,
    pub yield_factor: Option<f64>,
    pub as_of: NaiveDate,
    /// Falls back to the built-in price list when absent.
    pub prices: Option<&'a NutrientPrices>,
}

fn resolve_target_year(input: &PlanInput<'_>) -> i32 {
    if let Some(year) = input.target_year {
        return year;
    }
    let current = input.as_of.year();
    input
        .crop_rotation
        .iter()
        .map(|r| r.year)
        .filter(|y| *y >= current)
        .min()
        .unwrap_or(current)
}

/// Yield factor and a note describing where it came from.
fn resolve_yield_factor(
    input: &PlanInput<'_>,
    tier: Tier,
    target_year: i32,
    cfg: &EngineConfig,
) -> Result<(f64, String)> {
    if let Some(factor) = input.yield_factor {
        validate_yield_factor(factor, cfg)?;
        return Ok((factor, format!("Yield factor {:.2} set explicitly.", factor)));
    }

    if tier >= Tier::B {
        if let Some(record) = crop_for_year(input.crop_rotation, target_year) {
            let (y, _) = expected_yield(record);
            let factor = yield_factor_for(record.crop, y);
            return Ok((
                factor,
                format!(
                    "Yield factor {:.2} from {} at {:.1} t/ha (reference {:.1} t/ha).",
                    factor,
                    record.crop,
                    y,
                    record.crop.reference_yield_t_ha()
                ),
            ));
        }
    }

    Ok((1.0, "Yield factor 1.00: no crop data for the target year.".to_string()))
}

/// Annual fertilization recommendation for a parcel, deepened by the data
/// tier: Tier A gives the table doses, Tier B scales them to the rotation's
/// yield and Tier C adds a multi-year stock projection.
pub fn generate_fertilization_plan(input: &PlanInput<'_>, cfg: &EngineConfig) -> Result<FertilizationPlan> {
    validate_parcel(input.parcel)?;

    let analysis = input
        .analyses
        .iter()
        .max_by_key(|a| a.sample_date)
        .ok_or(FertiPlanError::NoSoilAnalysis)?;

    let tier = detect_tier(
        input.parcel,
        input.analyses,
        input.crop_rotation,
        input.fertilization_history,
        cfg,
    )?;
    let plan_type = tier.plan_type();
    let target_year = resolve_target_year(input);
    let (yield_factor, yield_note) = resolve_yield_factor(input, tier, target_year, cfg)?;

    tracing::debug!(
        parcel = %input.parcel.name,
        %tier,
        target_year,
        yield_factor,
        "fertilization inputs resolved"
    );

    let texture = input.parcel.texture;
    let land_use = input.parcel.land_use;
    let classified = classify_analysis(analysis, texture);
    let dose_result = calculate_nutrient_doses(&classified, land_use, yield_factor, cfg)?;

    let (Some(current_k), Some(current_mg)) = (analysis.potassium, analysis.magnesium) else {
        return Err(FertiPlanError::MissingField("K/Mg (soil analysis)".into()));
    };
    let correction = correct_k_mg(
        dose_result.doses.k2o,
        dose_result.doses.mgo,
        current_k,
        current_mg,
        cfg,
    );
    let doses = NutrientDoses {
        k2o: correction.k2o,
        mgo: correction.mgo,
        ..dose_result.doses
    };

    let mut notes = vec![
        format!("Tier {}: {}.", tier, tier.description()),
        yield_note,
    ];
    if correction.corrected {
        if let Some(ratio) = correction.ratio {
            notes.push(format!(
                "K:Mg ratio {:.2} outside {:.1}-{:.1}; doses adjusted toward the band.",
                ratio, cfg.k_mg_band.lower, cfg.k_mg_band.upper
            ));
        }
    }

    let mut projection_warnings: Vec<PlanWarning> = Vec::new();
    let mut predictions = Vec::new();
    let mut history = None;
    if plan_type.is_multi_year() {
        let projection = project_years(
            &ProjectionRequest {
                analysis,
                texture,
                land_use,
                rotation: input.crop_rotation,
                target_year,
                target_doses: doses,
            },
            cfg,
        )?;
        predictions = projection.years;
        projection_warnings = projection.warnings;

        history = historical_inputs(input.fertilization_history);
        if let Some(h) = &history {
            notes.push(format!(
                "History: {} records over {} years, avg {:.0} kg CaO/ha/yr consumed by acidifying fertilizers.",
                h.records, h.years, h.avg_acidification_cao
            ));
        }
    }

    let context = RuleContext {
        analysis: &classified,
        as_of: input.as_of,
        cfg,
    };
    let rule_warnings = RulesEngine::new().evaluate(&context);

    let default_prices = NutrientPrices::default();
    let prices = input.prices.unwrap_or(&default_prices);
    let area = input.parcel.area_ha;
    let cost = CostEstimate::from_doses(&doses, prices, area);

    let warnings = merge_warnings([dose_result.warnings, rule_warnings, projection_warnings]);

    tracing::info!(
        parcel = %input.parcel.name,
        %tier,
        target_year,
        total_kg_ha = doses.total(),
        warnings = warnings.len(),
        "fertilization plan generated"
    );

    Ok(FertilizationPlan {
        target_year,
        plan_type,
        tier,
        area_ha: area,
        yield_factor,
        categories: dose_result.categories,
        doses,
        totals: doses.scaled(area),
        k_mg_ratio: correction.ratio,
        k_mg_corrected: correction.corrected,
        predictions,
        historical_inputs: history,
        cost,
        warnings,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Crop, FertilizerProduct, LandUse, NutrientContent, PlanType, Severity, SoilTextureClass,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn parcel() -> Parcel {
        Parcel::new("Nad rybníkem", 10.0, SoilTextureClass::Medium, LandUse::Arable)
    }

    fn analysis() -> SoilAnalysis {
        SoilAnalysis::new(date(2025, 9, 1), 6.3)
            .with_phosphorus(100.0)
            .with_potassium(400.0)
            .with_magnesium(200.0)
            .with_sulfur(25.0)
    }

    fn input<'a>(
        parcel: &'a Parcel,
        analyses: &'a [SoilAnalysis],
        rotation: &'a [CropRotationRecord],
        history: &'a [FertilizationRecord],
    ) -> PlanInput<'a> {
        PlanInput {
            parcel,
            analyses,
            crop_rotation: rotation,
            fertilization_history: history,
            target_year: None,
            yield_factor: None,
            as_of: date(2026, 3, 1),
            prices: None,
        }
    }

    #[test]
    fn tier_a_plan_uses_table_doses() {
        let cfg = EngineConfig::default();
        let parcel = parcel();
        let analyses = vec![analysis()];
        let plan = generate_fertilization_plan(&input(&parcel, &analyses, &[], &[]), &cfg).unwrap();

        assert_eq!(plan.tier, Tier::A);
        assert_eq!(plan.plan_type, PlanType::Simple);
        assert_eq!(plan.target_year, 2026);
        assert_eq!(plan.yield_factor, 1.0);
        assert_eq!(plan.doses.p2o5, 35.0);
        assert!((plan.totals.p2o5 - 350.0).abs() < 1e-9);
        assert!(plan.predictions.is_empty());
        assert!(!plan.k_mg_corrected);
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn latest_analysis_wins() {
        let cfg = EngineConfig::default();
        let parcel = parcel();
        let old = SoilAnalysis::new(date(2019, 9, 1), 6.0)
            .with_phosphorus(30.0)
            .with_potassium(90.0)
            .with_magnesium(90.0);
        let analyses = vec![analysis(), old];
        let plan = generate_fertilization_plan(&input(&parcel, &analyses, &[], &[]), &cfg).unwrap();
        assert_eq!(plan.doses.p2o5, 35.0);
    }

    #[test]
    fn tier_b_scales_to_expected_yield() {
        let cfg = EngineConfig::default();
        let parcel = parcel();
        let analyses = vec![analysis()];
        let rotation = vec![CropRotationRecord::new(2026, Crop::WinterWheat).with_expected_yield(7.5)];
        let plan = generate_fertilization_plan(&input(&parcel, &analyses, &rotation, &[]), &cfg).unwrap();

        assert_eq!(plan.tier, Tier::B);
        assert!((plan.yield_factor - 1.25).abs() < 1e-9);
        assert!((plan.doses.p2o5 - 43.75).abs() < 1e-9);
        assert!(plan.notes.iter().any(|n| n.contains("7.5 t/ha")));
    }

    #[test]
    fn tier_c_adds_projection_and_history() {
        let cfg = EngineConfig::default();
        let parcel = parcel();
        let analyses = vec![analysis()];
        let rotation = vec![
            CropRotationRecord::new(2023, Crop::WinterRapeseed).with_actual_yield(3.4),
            CropRotationRecord::new(2024, Crop::WinterWheat).with_actual_yield(6.8),
            CropRotationRecord::new(2025, Crop::SpringBarley).with_actual_yield(5.9),
            CropRotationRecord::new(2026, Crop::GrainMaize).with_expected_yield(9.0),
        ];
        let npk = FertilizerProduct::new(
            "NPK 15-15-15",
            NutrientContent {
                n: Some(15.0),
                p2o5: Some(15.0),
                k2o: Some(15.0),
                ..Default::default()
            },
        );
        let history: Vec<FertilizationRecord> = (2023..2026)
            .map(|y| FertilizationRecord::new(date(y, 3, 20), npk.clone(), 250.0))
            .collect();

        let plan =
            generate_fertilization_plan(&input(&parcel, &analyses, &rotation, &history), &cfg).unwrap();
        assert_eq!(plan.tier, Tier::C);
        assert_eq!(plan.plan_type, PlanType::Advanced);
        assert_eq!(plan.predictions.len(), 4);
        assert_eq!(plan.predictions[0].year, 2027);
        let inputs = plan.historical_inputs.unwrap();
        assert_eq!(inputs.years, 3);
        assert!((inputs.avg_p2o5 - 37.5).abs() < 1e-9);
    }

    #[test]
    fn very_high_potassium_keeps_generating_with_error_warning() {
        let cfg = EngineConfig::default();
        let parcel = parcel();
        let analyses = vec![SoilAnalysis::new(date(2025, 9, 1), 6.3)
            .with_phosphorus(100.0)
            .with_potassium(600.0)
            .with_magnesium(300.0)
            .with_sulfur(25.0)];
        let plan = generate_fertilization_plan(&input(&parcel, &analyses, &[], &[]), &cfg).unwrap();
        assert_eq!(plan.doses.k2o, 0.0);
        assert!(plan
            .warnings
            .iter()
            .any(|w| w.key == "regulatory_ceiling_k2o" && w.severity == Severity::Error));
    }

    #[test]
    fn explicit_yield_factor_is_validated() {
        let cfg = EngineConfig::default();
        let parcel = parcel();
        let analyses = vec![analysis()];
        let mut request = input(&parcel, &analyses, &[], &[]);
        request.yield_factor = Some(4.0);
        let err = generate_fertilization_plan(&request, &cfg).unwrap_err();
        assert!(matches!(err, FertiPlanError::InvalidData(_)));
    }

    #[test]
    fn identical_input_gives_identical_plan() {
        let cfg = EngineConfig::default();
        let parcel = parcel();
        let analyses = vec![analysis()];
        let request = input(&parcel, &analyses, &[], &[]);
        assert_eq!(
            generate_fertilization_plan(&request, &cfg).unwrap(),
            generate_fertilization_plan(&request, &cfg).unwrap()
        );
    }
}
