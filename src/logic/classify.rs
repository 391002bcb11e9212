use crate::models::{
    ClassifiedAnalysis, Nutrient, NutrientCategory, PhCategory, SoilAnalysis, SoilTextureClass,
};

/// Inclusive upper bounds (mg/kg, Mehlich 3) of VeryLow, Low, Medium and High.
/// Anything above the last bound is VeryHigh.
type Bounds = [f64; 4];

fn nutrient_bounds(nutrient: Nutrient, texture: SoilTextureClass) -> Bounds {
    use Nutrient::*;
    use SoilTextureClass::*;

    match (nutrient, texture) {
        (Phosphorus, _) => [50.0, 80.0, 115.0, 185.0],

        (Potassium, Light) => [100.0, 160.0, 275.0, 380.0],
        (Potassium, Medium) => [105.0, 170.0, 310.0, 420.0],
        (Potassium, Heavy) => [170.0, 260.0, 350.0, 510.0],

        (Magnesium, Light) => [80.0, 135.0, 200.0, 285.0],
        (Magnesium, Medium) => [105.0, 160.0, 255.0, 330.0],
        (Magnesium, Heavy) => [120.0, 220.0, 330.0, 460.0],

        (Calcium, Light) => [700.0, 1100.0, 1700.0, 2500.0],
        (Calcium, Medium) => [1000.0, 1800.0, 2600.0, 3800.0],
        (Calcium, Heavy) => [1300.0, 2400.0, 3600.0, 5000.0],

        (Sulfur, _) => [10.0, 20.0, 30.0, 40.0],
    }
}

/// Upper bounds of the pH bands, texture-independent.
const PH_BOUNDS: [(f64, PhCategory); 6] = [
    (4.5, PhCategory::ExtremelyAcidic),
    (5.0, PhCategory::StronglyAcidic),
    (5.5, PhCategory::Acidic),
    (6.5, PhCategory::SlightlyAcidic),
    (7.2, PhCategory::Neutral),
    (7.7, PhCategory::Alkaline),
];

/// Values below the table clamp to `VeryLow`, values above it to `VeryHigh`.
pub fn classify_nutrient(
    nutrient: Nutrient,
    value: f64,
    texture: SoilTextureClass,
) -> NutrientCategory {
    nutrient_bounds(nutrient, texture)
        .iter()
        .position(|upper| value <= *upper)
        .map(NutrientCategory::from_index)
        .unwrap_or(NutrientCategory::VeryHigh)
}

pub fn classify_ph(value: f64) -> PhCategory {
    PH_BOUNDS
        .iter()
        .find(|(upper, _)| value <= *upper)
        .map(|(_, category)| *category)
        .unwrap_or(PhCategory::StronglyAlkaline)
}

pub fn classify_analysis(analysis: &SoilAnalysis, texture: SoilTextureClass) -> ClassifiedAnalysis {
    let classify = |nutrient: Nutrient| {
        analysis
            .value(nutrient)
            .map(|v| classify_nutrient(nutrient, v, texture))
    };

    ClassifiedAnalysis {
        analysis: analysis.clone(),
        texture,
        ph_category: classify_ph(analysis.ph),
        phosphorus: classify(Nutrient::Phosphorus),
        potassium: classify(Nutrient::Potassium),
        magnesium: classify(Nutrient::Magnesium),
        calcium: classify(Nutrient::Calcium),
        sulfur: classify(Nutrient::Sulfur),
    }
}
