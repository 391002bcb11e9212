use crate::config::EngineConfig;
use crate::models::{ClassifiedAnalysis, LimeProduct, LimeType, NutrientCategory, Reactivity};
use std::cmp::Ordering;

/// Chooses calcitic or dolomitic lime from the magnesium status.
///
/// - Mg very low / low: dolomitic, to supply MgO alongside CaO
/// - Mg high / very high, or K:Mg below the optimum band: calcitic only
/// - otherwise either type
pub fn select_lime_type(analysis: &ClassifiedAnalysis, cfg: &EngineConfig) -> LimeType {
    let Some(mg_category) = analysis.magnesium else {
        return LimeType::Either;
    };

    if mg_category.is_deficient() {
        return LimeType::Dolomitic;
    }

    let mg_high = mg_category >= NutrientCategory::High;
    let ratio_below_band = analysis
        .analysis
        .k_mg_ratio()
        .is_some_and(|r| r < cfg.k_mg_band.lower);

    if mg_high || ratio_below_band {
        LimeType::Calcitic
    } else {
        LimeType::Either
    }
}

pub fn filter_products<'a>(
    products: &'a [LimeProduct],
    lime_type: LimeType,
    cfg: &EngineConfig,
) -> Vec<&'a LimeProduct> {
    products
        .iter()
        .filter(|p| p.neutralizing_value() > 0.0)
        .filter(|p| match lime_type {
            LimeType::Either => true,
            wanted => p.kind(cfg.dolomitic_min_mgo_percent) == wanted,
        })
        .collect()
}

/// Most reactive product first, then highest neutralizing value, then name.
pub fn best_product<'a>(candidates: &[&'a LimeProduct]) -> Option<&'a LimeProduct> {
    candidates.iter().copied().min_by(|a, b| compare_products(a, b))
}

fn compare_products(a: &LimeProduct, b: &LimeProduct) -> Ordering {
    reactivity_rank(b.reactivity)
        .cmp(&reactivity_rank(a.reactivity))
        .then_with(|| b.neutralizing_value().total_cmp(&a.neutralizing_value()))
        .then_with(|| a.name.cmp(&b.name))
}

fn reactivity_rank(reactivity: Reactivity) -> u8 {
    match reactivity {
        Reactivity::Low => 0,
        Reactivity::Medium => 1,
        Reactivity::High => 2,
    }
}
