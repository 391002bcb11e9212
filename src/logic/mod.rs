pub mod calculations;
pub mod classify;
pub mod fertilization_plan;
pub mod k_mg;
pub mod lime_need;
pub mod lime_type;
pub mod liming_plan;
pub mod liming_schedule;
pub mod nutrient_dose;
pub mod projection;
pub mod rules;
pub mod tier;

pub use classify::{classify_analysis, classify_nutrient, classify_ph};
pub use fertilization_plan::{generate_fertilization_plan, PlanInput};
pub use k_mg::{correct_k_mg, projected_ratio, KMgCorrection};
pub use lime_need::{calculate_lime_need, LimeNeed};
pub use lime_type::{best_product, filter_products, select_lime_type};
pub use liming_plan::{generate_liming_plan, LimingRequest};
pub use liming_schedule::{schedule, ScheduleRequest};
pub use nutrient_dose::{calculate_nutrient_doses, NutrientDoseResult};
pub use rules::RulesEngine;
pub use tier::detect_tier;

use crate::error::{FertiPlanError, Result};
use crate::models::Parcel;

pub(crate) fn validate_parcel(parcel: &Parcel) -> Result<()> {
    if !parcel.area_ha.is_finite() || parcel.area_ha <= 0.0 {
        return Err(FertiPlanError::InvalidData(format!(
            "parcel '{}' area {} ha must be positive",
            parcel.name, parcel.area_ha
        )));
    }
    Ok(())
}
