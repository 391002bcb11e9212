use crate::error::{FertiPlanError, Result};
use crate::logic::{LimingRequest, PlanInput};
use crate::models::{
    CropRotationRecord, FertilizationRecord, LimeProduct, NutrientPrices, Parcel, Season,
    SoilAnalysis,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything known about one parcel, as exchanged with the outer layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDocument {
    pub parcel: Parcel,
    #[serde(default)]
    pub analyses: Vec<SoilAnalysis>,
    #[serde(default)]
    pub crop_rotation: Vec<CropRotationRecord>,
    #[serde(default)]
    pub fertilization_history: Vec<FertilizationRecord>,
    #[serde(default)]
    pub lime_products: Vec<LimeProduct>,
    pub as_of: NaiveDate,
    #[serde(default)]
    pub target_year: Option<i32>,
    #[serde(default)]
    pub yield_factor: Option<f64>,
    #[serde(default)]
    pub target_ph: Option<f64>,
    #[serde(default)]
    pub preferred_season: Option<Season>,
    #[serde(default)]
    pub prices: Option<NutrientPrices>,
}

impl InputDocument {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Reads JSON, or YAML when the extension says so.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        }
    }

    /// Most recent analysis by sample date.
    pub fn latest_analysis(&self) -> Result<&SoilAnalysis> {
        self.analyses
            .iter()
            .max_by_key(|a| a.sample_date)
            .ok_or(FertiPlanError::NoSoilAnalysis)
    }

    pub fn liming_request(&self) -> Result<LimingRequest<'_>> {
        Ok(LimingRequest {
            parcel: &self.parcel,
            analysis: self.latest_analysis()?,
            products: &self.lime_products,
            target_ph: self.target_ph,
            as_of: self.as_of,
            preferred_season: self.preferred_season,
        })
    }

    /// Prices in the document win over `fallback`.
    pub fn plan_input<'a>(&'a self, fallback: &'a NutrientPrices) -> PlanInput<'a> {
        PlanInput {
            parcel: &self.parcel,
            analyses: &self.analyses,
            crop_rotation: &self.crop_rotation,
            fertilization_history: &self.fertilization_history,
            target_year: self.target_year,
            yield_factor: self.yield_factor,
            as_of: self.as_of,
            prices: Some(self.prices.as_ref().unwrap_or(fallback)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Crop, LandUse, SoilTextureClass};

    const DOC: &str = r#"{
        "parcel": { "name": "Za stodolou", "area_ha": 6.5, "texture": "heavy", "land_use": "arable" },
        "analyses": [
            { "sample_date": "2021-04-10", "ph": 5.4, "phosphorus": 40, "potassium": 150, "magnesium": 90 },
            { "sample_date": "2025-09-12", "ph": 5.6, "phosphorus": 62, "potassium": 210, "magnesium": 130 }
        ],
        "crop_rotation": [ { "year": 2026, "crop": "winter_wheat", "expected_yield_t_ha": 7.0 } ],
        "lime_products": [ { "name": "Vápenec VV", "cao_percent": 50 } ],
        "as_of": "2026-03-01",
        "preferred_season": "spring"
    }"#;

    #[test]
    fn parses_partial_document() {
        let doc = InputDocument::from_json(DOC).unwrap();
        assert_eq!(doc.parcel.texture, SoilTextureClass::Heavy);
        assert_eq!(doc.crop_rotation[0].crop, Crop::WinterWheat);
        assert!(doc.fertilization_history.is_empty());
        assert_eq!(doc.preferred_season, Some(Season::Spring));
        assert_eq!(doc.lime_products[0].mgo_percent, 0.0);
    }

    #[test]
    fn latest_analysis_is_used_for_liming() {
        let doc = InputDocument::from_json(DOC).unwrap();
        let request = doc.liming_request().unwrap();
        assert_eq!(request.analysis.ph, 5.6);
    }

    #[test]
    fn document_prices_override_fallback() {
        let mut doc = InputDocument::from_json(DOC).unwrap();
        let fallback = NutrientPrices::default();
        assert_eq!(doc.plan_input(&fallback).prices.unwrap().currency, "CZK");

        doc.prices = Some(NutrientPrices {
            currency: "EUR".into(),
            ..NutrientPrices::default()
        });
        assert_eq!(doc.plan_input(&fallback).prices.unwrap().currency, "EUR");
    }

    #[test]
    fn czech_field_names_are_accepted() {
        let yaml = r#"
parcel:
  name: Za humny
  area_ha: 3.5
  texture: lehka
  land_use: orna
analyses:
  - sample_date: 2025-09-01
    ph: 5.2
crop_rotation:
  - year: 2026
    crop: psenice
  - year: 2027
    crop: repka
as_of: 2026-02-01
preferred_season: podzim
"#;
        let doc = InputDocument::from_yaml(yaml).unwrap();
        assert_eq!(doc.parcel.texture, SoilTextureClass::Light);
        assert_eq!(doc.parcel.land_use, LandUse::Arable);
        assert_eq!(doc.crop_rotation[0].crop, Crop::WinterWheat);
        assert_eq!(doc.crop_rotation[1].crop, Crop::WinterRapeseed);
        assert_eq!(doc.preferred_season, Some(Season::Autumn));
    }

    #[test]
    fn unknown_crop_is_rejected() {
        let json = DOC.replace("\"winter_wheat\"", "\"rice\"");
        let err = InputDocument::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("unknown crop 'rice'"));
    }

    #[test]
    fn empty_analyses_are_reported() {
        let mut doc = InputDocument::from_json(DOC).unwrap();
        doc.analyses.clear();
        assert!(matches!(
            doc.liming_request().unwrap_err(),
            FertiPlanError::NoSoilAnalysis
        ));
    }
}
