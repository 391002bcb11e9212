use super::SoilTextureClass;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Phosphorus,
    Potassium,
    Magnesium,
    Calcium,
    Sulfur,
}

impl Nutrient {
    pub fn as_str(&self) -> &'static str {
        match self {
            Nutrient::Phosphorus => "P",
            Nutrient::Potassium => "K",
            Nutrient::Magnesium => "Mg",
            Nutrient::Calcium => "Ca",
            Nutrient::Sulfur => "S",
        }
    }

    /// Oxide form used for dose recommendations.
    pub fn dose_form(&self) -> &'static str {
        match self {
            Nutrient::Phosphorus => "P2O5",
            Nutrient::Potassium => "K2O",
            Nutrient::Magnesium => "MgO",
            Nutrient::Calcium => "CaO",
            Nutrient::Sulfur => "S",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Nutrient::Phosphorus => "p2o5",
            Nutrient::Potassium => "k2o",
            Nutrient::Magnesium => "mgo",
            Nutrient::Calcium => "cao",
            Nutrient::Sulfur => "s",
        }
    }
}

impl std::fmt::Display for Nutrient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Plant-available nutrient supply class (ÚKZÚZ: nízký, vyhovující, dobrý,
/// vysoký, velmi vysoký). `VeryLow` is the deficient class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutrientCategory {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl NutrientCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NutrientCategory::VeryLow => "Very Low",
            NutrientCategory::Low => "Low",
            NutrientCategory::Medium => "Medium",
            NutrientCategory::High => "High",
            NutrientCategory::VeryHigh => "Very High",
        }
    }

    /// Position in the deficient-to-excessive order, used to index dose tables.
    pub fn index(&self) -> usize {
        match self {
            NutrientCategory::VeryLow => 0,
            NutrientCategory::Low => 1,
            NutrientCategory::Medium => 2,
            NutrientCategory::High => 3,
            NutrientCategory::VeryHigh => 4,
        }
    }

    pub fn from_index(index: usize) -> Self {
        match index {
            0 => NutrientCategory::VeryLow,
            1 => NutrientCategory::Low,
            2 => NutrientCategory::Medium,
            3 => NutrientCategory::High,
            _ => NutrientCategory::VeryHigh,
        }
    }

    pub fn is_deficient(&self) -> bool {
        matches!(self, NutrientCategory::VeryLow | NutrientCategory::Low)
    }
}

impl std::fmt::Display for NutrientCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhCategory {
    ExtremelyAcidic,
    StronglyAcidic,
    Acidic,
    SlightlyAcidic,
    Neutral,
    Alkaline,
    StronglyAlkaline,
}

impl PhCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhCategory::ExtremelyAcidic => "Extremely Acidic",
            PhCategory::StronglyAcidic => "Strongly Acidic",
            PhCategory::Acidic => "Acidic",
            PhCategory::SlightlyAcidic => "Slightly Acidic",
            PhCategory::Neutral => "Neutral",
            PhCategory::Alkaline => "Alkaline",
            PhCategory::StronglyAlkaline => "Strongly Alkaline",
        }
    }
}

impl std::fmt::Display for PhCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lab result as ingested. Nutrient values are mg/kg (Mehlich 3); `None`
/// means not measured, which is different from a measured zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilAnalysis {
    pub sample_date: NaiveDate,
    #[serde(default)]
    pub lab_name: Option<String>,
    pub ph: f64,
    #[serde(default)]
    pub phosphorus: Option<f64>,
    #[serde(default)]
    pub potassium: Option<f64>,
    #[serde(default)]
    pub magnesium: Option<f64>,
    #[serde(default)]
    pub calcium: Option<f64>,
    #[serde(default)]
    pub sulfur: Option<f64>,
}

impl SoilAnalysis {
    pub fn new(sample_date: NaiveDate, ph: f64) -> Self {
        Self {
            sample_date,
            lab_name: None,
            ph,
            phosphorus: None,
            potassium: None,
            magnesium: None,
            calcium: None,
            sulfur: None,
        }
    }

    pub fn with_phosphorus(mut self, mg_kg: f64) -> Self {
        self.phosphorus = Some(mg_kg);
        self
    }

    pub fn with_potassium(mut self, mg_kg: f64) -> Self {
        self.potassium = Some(mg_kg);
        self
    }

    pub fn with_magnesium(mut self, mg_kg: f64) -> Self {
        self.magnesium = Some(mg_kg);
        self
    }

    pub fn with_sulfur(mut self, mg_kg: f64) -> Self {
        self.sulfur = Some(mg_kg);
        self
    }

    pub fn value(&self, nutrient: Nutrient) -> Option<f64> {
        match nutrient {
            Nutrient::Phosphorus => self.phosphorus,
            Nutrient::Potassium => self.potassium,
            Nutrient::Magnesium => self.magnesium,
            Nutrient::Calcium => self.calcium,
            Nutrient::Sulfur => self.sulfur,
        }
    }

    /// K:Mg ratio of the measured stocks. `None` when either is missing or
    /// magnesium is zero.
    pub fn k_mg_ratio(&self) -> Option<f64> {
        match (self.potassium, self.magnesium) {
            (Some(k), Some(mg)) if mg > 0.0 => Some(k / mg),
            _ => None,
        }
    }

    /// Whole years between sampling and `as_of`.
    pub fn age_years(&self, as_of: NaiveDate) -> i64 {
        use chrono::Datelike;
        let mut years = i64::from(as_of.year() - self.sample_date.year());
        if (as_of.month(), as_of.day()) < (self.sample_date.month(), self.sample_date.day()) {
            years -= 1;
        }
        years.max(0)
    }
}

/// Analysis with categories derived once against the parcel texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedAnalysis {
    pub analysis: SoilAnalysis,
    pub texture: SoilTextureClass,
    pub ph_category: PhCategory,
    pub phosphorus: Option<NutrientCategory>,
    pub potassium: Option<NutrientCategory>,
    pub magnesium: Option<NutrientCategory>,
    pub calcium: Option<NutrientCategory>,
    pub sulfur: Option<NutrientCategory>,
}
