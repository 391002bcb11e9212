use super::validate_parcel;
use crate::config::EngineConfig;
use crate::error::{FertiPlanError, Result};
use crate::models::{CropRotationRecord, FertilizationRecord, Parcel, SoilAnalysis, Tier};
use std::collections::BTreeSet;

/// Classify how much data backs a parcel's fertilization plan.
pub fn detect_tier(
    parcel: &Parcel,
    analyses: &[SoilAnalysis],
    crop_rotation: &[CropRotationRecord],
    fertilization_history: &[FertilizationRecord],
    cfg: &EngineConfig,
) -> Result<Tier> {
    validate_parcel(parcel)?;

    if analyses.is_empty() {
        return Err(FertiPlanError::NoSoilAnalysis);
    }

    let thresholds = &cfg.tiers;
    let rotation_years: BTreeSet<i32> = crop_rotation.iter().map(|r| r.year).collect();

    let tier = if crop_rotation.len() < thresholds.b_min_rotation_records.max(1) {
        Tier::A
    } else if rotation_years.len() >= thresholds.c_min_rotation_years
        && fertilization_history.len() >= thresholds.c_min_history_records
    {
        Tier::C
    } else {
        Tier::B
    };

    tracing::debug!(
        parcel = %parcel.name,
        rotation_records = crop_rotation.len(),
        rotation_years = rotation_years.len(),
        history_records = fertilization_history.len(),
        %tier,
        "data tier detected"
    );

    Ok(tier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Crop, FertilizerProduct, LandUse, NutrientContent, SoilTextureClass};
    use chrono::NaiveDate;

    fn parcel() -> Parcel {
        Parcel::new("U lesa", 4.2, SoilTextureClass::Medium, LandUse::Arable)
    }

    fn analyses() -> Vec<SoilAnalysis> {
        vec![SoilAnalysis::new(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(), 6.1)]
    }

    fn rotation(years: &[i32]) -> Vec<CropRotationRecord> {
        years
            .iter()
            .map(|y| CropRotationRecord::new(*y, Crop::WinterWheat))
            .collect()
    }

    fn history(n: u32) -> Vec<FertilizationRecord> {
        let product = FertilizerProduct::new(
            "NPK 15-15-15",
            NutrientContent {
                n: Some(15.0),
                p2o5: Some(15.0),
                k2o: Some(15.0),
                ..Default::default()
            },
        );
        (0..n)
            .map(|i| {
                FertilizationRecord::new(
                    NaiveDate::from_ymd_opt(2022 + i as i32, 3, 15).unwrap(),
                    product.clone(),
                    200.0,
                )
            })
            .collect()
    }

    #[test]
    fn analysis_only_is_tier_a() {
        let cfg = EngineConfig::default();
        let tier = detect_tier(&parcel(), &analyses(), &[], &history(5), &cfg).unwrap();
        assert_eq!(tier, Tier::A);
    }

    #[test]
    fn single_rotation_record_is_tier_b() {
        let cfg = EngineConfig::default();
        let tier = detect_tier(&parcel(), &analyses(), &rotation(&[2026]), &[], &cfg).unwrap();
        assert_eq!(tier, Tier::B);
    }

    #[test]
    fn full_history_is_tier_c() {
        let cfg = EngineConfig::default();
        let tier = detect_tier(
            &parcel(),
            &analyses(),
            &rotation(&[2023, 2024, 2025, 2026]),
            &history(3),
            &cfg,
        )
        .unwrap();
        assert_eq!(tier, Tier::C);
    }

    #[test]
    fn duplicate_rotation_years_do_not_count_twice() {
        let cfg = EngineConfig::default();
        let tier = detect_tier(
            &parcel(),
            &analyses(),
            &rotation(&[2024, 2024, 2025, 2026]),
            &history(4),
            &cfg,
        )
        .unwrap();
        assert_eq!(tier, Tier::B);
    }

    #[test]
    fn no_analysis_is_an_error() {
        let cfg = EngineConfig::default();
        let err = detect_tier(&parcel(), &[], &[], &[], &cfg).unwrap_err();
        assert!(matches!(err, FertiPlanError::NoSoilAnalysis));
    }
}
