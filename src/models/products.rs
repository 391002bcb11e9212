use crate::logic::calculations::MGO_TO_CAO;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reactivity {
    Low,
    Medium,
    High,
}

impl Reactivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reactivity::Low => "Low",
            Reactivity::Medium => "Medium",
            Reactivity::High => "High",
        }
    }
}

impl std::fmt::Display for Reactivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimeType {
    Calcitic,
    Dolomitic,
    Either,
}

impl LimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimeType::Calcitic => "Calcitic",
            LimeType::Dolomitic => "Dolomitic",
            LimeType::Either => "Either",
        }
    }
}

impl std::fmt::Display for LimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimeProduct {
    pub name: String,
    pub cao_percent: f64,
    #[serde(default)]
    pub mgo_percent: f64,
    #[serde(default = "default_reactivity")]
    pub reactivity: Reactivity,
}

fn default_reactivity() -> Reactivity {
    Reactivity::Medium
}

impl LimeProduct {
    pub fn new(name: &str, cao_percent: f64, mgo_percent: f64, reactivity: Reactivity) -> Self {
        Self {
            name: name.to_string(),
            cao_percent,
            mgo_percent,
            reactivity,
        }
    }

    /// Neutralizing value in % CaO-equivalent (MgO counted at 1.391).
    pub fn neutralizing_value(&self) -> f64 {
        self.cao_percent + self.mgo_percent * MGO_TO_CAO
    }

    pub fn kind(&self, dolomitic_min_mgo_percent: f64) -> LimeType {
        if self.mgo_percent >= dolomitic_min_mgo_percent {
            LimeType::Dolomitic
        } else {
            LimeType::Calcitic
        }
    }
}

/// Fixed nutrient composition record in percent of product mass. `None`
/// means the nutrient is not declared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutrientContent {
    pub n: Option<f64>,
    pub p2o5: Option<f64>,
    pub k2o: Option<f64>,
    pub mgo: Option<f64>,
    pub cao: Option<f64>,
    pub s: Option<f64>,
}

impl NutrientContent {
    /// kg of each declared nutrient delivered by `quantity_kg` of product.
    pub fn delivered(&self, quantity_kg: f64) -> NutrientContent {
        let part = |pct: Option<f64>| pct.map(|p| p / 100.0 * quantity_kg);
        NutrientContent {
            n: part(self.n),
            p2o5: part(self.p2o5),
            k2o: part(self.k2o),
            mgo: part(self.mgo),
            cao: part(self.cao),
            s: part(self.s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerProduct {
    pub name: String,
    #[serde(default)]
    pub composition: NutrientContent,
    /// kg CaO needed to neutralize 1 kg of product; negative for
    /// alkaline-reacting products.
    #[serde(default)]
    pub acidification_factor: Option<f64>,
}

impl FertilizerProduct {
    pub fn new(name: &str, composition: NutrientContent) -> Self {
        Self {
            name: name.to_string(),
            composition,
            acidification_factor: None,
        }
    }
}
