use super::FertilizerProduct;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Crop {
    WinterWheat,
    SpringBarley,
    WinterRapeseed,
    GrainMaize,
    SilageMaize,
    SugarBeet,
    Potatoes,
    Peas,
    GrasslandHay,
}

/// Nutrient removal by harvested product (kg per t of main product,
/// by-product removal included).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRemoval {
    pub p2o5: f64,
    pub k2o: f64,
    pub mgo: f64,
    pub s: f64,
}

impl Crop {
    pub fn as_str(&self) -> &'static str {
        match self {
            Crop::WinterWheat => "Winter Wheat",
            Crop::SpringBarley => "Spring Barley",
            Crop::WinterRapeseed => "Winter Rapeseed",
            Crop::GrainMaize => "Grain Maize",
            Crop::SilageMaize => "Silage Maize",
            Crop::SugarBeet => "Sugar Beet",
            Crop::Potatoes => "Potatoes",
            Crop::Peas => "Peas",
            Crop::GrasslandHay => "Grassland Hay",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' ', '_'], "").as_str() {
            "winterwheat" | "wheat" | "psenice" | "pšenice" => Some(Crop::WinterWheat),
            "springbarley" | "barley" | "jecmen" | "ječmen" => Some(Crop::SpringBarley),
            "winterrapeseed" | "rapeseed" | "oilseedrape" | "repka" | "řepka" => {
                Some(Crop::WinterRapeseed)
            }
            "grainmaize" | "maize" | "corn" => Some(Crop::GrainMaize),
            "silagemaize" | "silagecorn" => Some(Crop::SilageMaize),
            "sugarbeet" | "beet" => Some(Crop::SugarBeet),
            "potatoes" | "potato" | "brambory" => Some(Crop::Potatoes),
            "peas" | "pea" | "hrach" => Some(Crop::Peas),
            "grasslandhay" | "hay" | "grassland" => Some(Crop::GrasslandHay),
            _ => None,
        }
    }

    /// Average yield (t/ha) the base dose tables are calibrated for.
    pub fn reference_yield_t_ha(&self) -> f64 {
        match self {
            Crop::WinterWheat => 6.0,
            Crop::SpringBarley => 5.5,
            Crop::WinterRapeseed => 3.3,
            Crop::GrainMaize => 8.0,
            Crop::SilageMaize => 45.0,
            Crop::SugarBeet => 65.0,
            Crop::Potatoes => 30.0,
            Crop::Peas => 3.5,
            Crop::GrasslandHay => 6.0,
        }
    }

    pub fn removal_per_t(&self) -> CropRemoval {
        let (p2o5, k2o, mgo, s) = match self {
            Crop::WinterWheat => (8.0, 6.0, 2.0, 1.5),
            Crop::SpringBarley => (8.0, 6.0, 1.8, 1.5),
            Crop::WinterRapeseed => (18.0, 12.0, 5.0, 7.0),
            Crop::GrainMaize => (7.5, 5.0, 2.5, 1.2),
            Crop::SilageMaize => (1.6, 4.5, 0.8, 0.4),
            Crop::SugarBeet => (1.0, 2.5, 0.7, 0.3),
            Crop::Potatoes => (1.4, 6.0, 0.6, 0.4),
            Crop::Peas => (10.0, 13.0, 2.5, 2.0),
            Crop::GrasslandHay => (6.5, 22.0, 3.5, 2.5),
        };
        CropRemoval { p2o5, k2o, mgo, s }
    }
}

impl TryFrom<String> for Crop {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or_else(|| format!("unknown crop '{}'", value))
    }
}

impl std::fmt::Display for Crop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRotationRecord {
    pub year: i32,
    pub crop: Crop,
    #[serde(default)]
    pub expected_yield_t_ha: Option<f64>,
    #[serde(default)]
    pub actual_yield_t_ha: Option<f64>,
}

impl CropRotationRecord {
    pub fn new(year: i32, crop: Crop) -> Self {
        Self {
            year,
            crop,
            expected_yield_t_ha: None,
            actual_yield_t_ha: None,
        }
    }

    pub fn with_expected_yield(mut self, t_ha: f64) -> Self {
        self.expected_yield_t_ha = Some(t_ha);
        self
    }

    pub fn with_actual_yield(mut self, t_ha: f64) -> Self {
        self.actual_yield_t_ha = Some(t_ha);
        self
    }

    /// Expected yield, falling back to the recorded actual yield.
    pub fn yield_t_ha(&self) -> Option<f64> {
        self.expected_yield_t_ha.or(self.actual_yield_t_ha)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizationRecord {
    pub date: NaiveDate,
    pub product: FertilizerProduct,
    pub quantity_kg_ha: f64,
}

impl FertilizationRecord {
    pub fn new(date: NaiveDate, product: FertilizerProduct, quantity_kg_ha: f64) -> Self {
        Self {
            date,
            product,
            quantity_kg_ha,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_from_str_valid() {
        assert_eq!(Crop::from_str("Winter Wheat"), Some(Crop::WinterWheat));
        assert_eq!(Crop::from_str("wheat"), Some(Crop::WinterWheat));
        assert_eq!(Crop::from_str("oilseed-rape"), Some(Crop::WinterRapeseed));
        assert_eq!(Crop::from_str("silage_maize"), Some(Crop::SilageMaize));
    }

    #[test]
    fn crop_from_str_invalid() {
        assert_eq!(Crop::from_str("rice"), None);
        assert_eq!(Crop::from_str(""), None);
    }

    #[test]
    fn crop_serialized_names_parse_back() {
        let crops = [
            Crop::WinterWheat,
            Crop::SpringBarley,
            Crop::WinterRapeseed,
            Crop::GrainMaize,
            Crop::SilageMaize,
            Crop::SugarBeet,
            Crop::Potatoes,
            Crop::Peas,
            Crop::GrasslandHay,
        ];
        for crop in crops {
            let json = serde_json::to_string(&crop).unwrap();
            assert_eq!(
                serde_json::from_str::<Crop>(&json).unwrap(),
                crop,
                "Round-trip failed for {}",
                json
            );
        }
    }

    #[test]
    fn rotation_record_accepts_crop_aliases() {
        let record: CropRotationRecord =
            serde_json::from_str(r#"{"year":2027,"crop":"Sugar Beet"}"#).unwrap();
        assert_eq!(record.crop, Crop::SugarBeet);
    }

    #[test]
    fn rotation_yield_prefers_expected() {
        let record = CropRotationRecord::new(2026, Crop::WinterWheat)
            .with_actual_yield(5.2)
            .with_expected_yield(7.0);
        assert_eq!(record.yield_t_ha(), Some(7.0));

        let record = CropRotationRecord::new(2025, Crop::WinterWheat).with_actual_yield(5.2);
        assert_eq!(record.yield_t_ha(), Some(5.2));
    }
}
