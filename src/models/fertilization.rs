use super::liming::round2;
use super::{Crop, NutrientCategory, PlanWarning};
use serde::{Deserialize, Serialize};

/// Data completeness of a parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    A,
    B,
    C,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tier::A => "soil analysis only",
            Tier::B => "soil analysis and crop rotation",
            Tier::C => "soil analysis, crop rotation and fertilization history",
        }
    }

    pub fn plan_type(&self) -> PlanType {
        match self {
            Tier::A => PlanType::Simple,
            Tier::B => PlanType::Detailed,
            Tier::C => PlanType::Advanced,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Simple,
    Detailed,
    Advanced,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Simple => "simple",
            PlanType::Detailed => "detailed",
            PlanType::Advanced => "advanced",
        }
    }

    pub fn is_multi_year(&self) -> bool {
        matches!(self, PlanType::Advanced)
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recommended nutrient doses in kg/ha (oxide form, S as element).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientDoses {
    pub p2o5: f64,
    pub k2o: f64,
    pub mgo: f64,
    pub s: f64,
}

impl NutrientDoses {
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            p2o5: self.p2o5 * factor,
            k2o: self.k2o * factor,
            mgo: self.mgo * factor,
            s: self.s * factor,
        }
    }

    pub fn total(&self) -> f64 {
        self.p2o5 + self.k2o + self.mgo + self.s
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientCategories {
    pub phosphorus: NutrientCategory,
    pub potassium: NutrientCategory,
    pub magnesium: NutrientCategory,
    pub sulfur: Option<NutrientCategory>,
}

/// Soil nutrient stock in mg/kg (element form).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilStock {
    pub phosphorus: f64,
    pub potassium: f64,
    pub magnesium: f64,
    pub sulfur: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearProjection {
    pub year: i32,
    pub crop: Option<Crop>,
    pub expected_yield_t_ha: Option<f64>,
    /// Stock at the start of the year, before this year's dose.
    pub soil: SoilStock,
    pub categories: NutrientCategories,
    pub doses: NutrientDoses,
    pub removal: NutrientDoses,
    pub k_mg_corrected: bool,
}

/// Average annual inputs derived from the fertilization history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalInputs {
    pub years: u32,
    pub records: u32,
    pub avg_p2o5: f64,
    pub avg_k2o: f64,
    pub avg_mgo: f64,
    pub avg_s: f64,
    /// CaO consumed per year to neutralize acidifying fertilizers.
    pub avg_acidification_cao: f64,
}

/// Price per kg of nutrient. Maintained outside the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutrientPrices {
    pub currency: String,
    pub p2o5_per_kg: f64,
    pub k2o_per_kg: f64,
    pub mgo_per_kg: f64,
    pub s_per_kg: f64,
}

impl Default for NutrientPrices {
    fn default() -> Self {
        Self {
            currency: "CZK".into(),
            p2o5_per_kg: 38.0,
            k2o_per_kg: 22.0,
            mgo_per_kg: 30.0,
            s_per_kg: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub currency: String,
    pub per_ha: f64,
    pub total: f64,
    pub p2o5: f64,
    pub k2o: f64,
    pub mgo: f64,
    pub s: f64,
}

impl CostEstimate {
    pub fn from_doses(doses: &NutrientDoses, prices: &NutrientPrices, area_ha: f64) -> Self {
        let p2o5 = doses.p2o5 * prices.p2o5_per_kg * area_ha;
        let k2o = doses.k2o * prices.k2o_per_kg * area_ha;
        let mgo = doses.mgo * prices.mgo_per_kg * area_ha;
        let s = doses.s * prices.s_per_kg * area_ha;
        let total = p2o5 + k2o + mgo + s;
        let per_ha = if area_ha > 0.0 { total / area_ha } else { 0.0 };
        Self {
            currency: prices.currency.clone(),
            per_ha,
            total,
            p2o5,
            k2o,
            mgo,
            s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizationPlan {
    pub target_year: i32,
    pub plan_type: PlanType,
    pub tier: Tier,
    pub area_ha: f64,
    pub yield_factor: f64,
    pub categories: NutrientCategories,
    pub doses: NutrientDoses,
    pub totals: NutrientDoses,
    pub k_mg_ratio: Option<f64>,
    pub k_mg_corrected: bool,
    pub predictions: Vec<YearProjection>,
    pub historical_inputs: Option<HistoricalInputs>,
    pub cost: CostEstimate,
    pub warnings: Vec<PlanWarning>,
    pub notes: Vec<String>,
}

impl FertilizationPlan {
    pub fn rows(&self) -> Vec<NutrientRow> {
        let mut rows = Vec::new();
        let mut push = |year: i32, nutrient: &str, category: Option<NutrientCategory>, dose: f64| {
            rows.push(NutrientRow {
                year,
                nutrient: nutrient.to_string(),
                category: category.map(|c| c.as_str().to_string()),
                dose_kg_ha: round2(dose),
                total_kg: round2(dose * self.area_ha),
            });
        };

        let c = &self.categories;
        push(self.target_year, "P2O5", Some(c.phosphorus), self.doses.p2o5);
        push(self.target_year, "K2O", Some(c.potassium), self.doses.k2o);
        push(self.target_year, "MgO", Some(c.magnesium), self.doses.mgo);
        push(self.target_year, "S", c.sulfur, self.doses.s);

        for p in &self.predictions {
            let c = &p.categories;
            push(p.year, "P2O5", Some(c.phosphorus), p.doses.p2o5);
            push(p.year, "K2O", Some(c.potassium), p.doses.k2o);
            push(p.year, "MgO", Some(c.magnesium), p.doses.mgo);
            push(p.year, "S", c.sulfur, p.doses.s);
        }
        rows
    }
}

/// Flat record for tabular and CSV rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientRow {
    pub year: i32,
    pub nutrient: String,
    pub category: Option<String>,
    pub dose_kg_ha: f64,
    pub total_kg: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_maps_to_plan_type() {
        assert_eq!(Tier::A.plan_type(), PlanType::Simple);
        assert_eq!(Tier::B.plan_type(), PlanType::Detailed);
        assert_eq!(Tier::C.plan_type(), PlanType::Advanced);
        assert!(!PlanType::Detailed.is_multi_year());
    }

    #[test]
    fn cost_multiplies_dose_price_and_area() {
        let doses = NutrientDoses {
            p2o5: 10.0,
            k2o: 20.0,
            mgo: 0.0,
            s: 5.0,
        };
        let prices = NutrientPrices {
            currency: "EUR".into(),
            p2o5_per_kg: 1.0,
            k2o_per_kg: 0.5,
            mgo_per_kg: 3.0,
            s_per_kg: 2.0,
        };
        let cost = CostEstimate::from_doses(&doses, &prices, 2.0);
        assert!((cost.per_ha - 30.0).abs() < 1e-9);
        assert!((cost.total - 60.0).abs() < 1e-9);
        assert_eq!(cost.currency, "EUR");
    }

    #[test]
    fn scaled_doses_multiply_every_nutrient() {
        let doses = NutrientDoses {
            p2o5: 10.0,
            k2o: 20.0,
            mgo: 30.0,
            s: 40.0,
        };
        assert!((doses.scaled(0.5).total() - 50.0).abs() < 1e-9);
    }
}
