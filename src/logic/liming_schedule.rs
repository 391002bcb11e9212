use super::calculations::{
    cao_for_ph_delta, is_valid_ph, kg_ha_to_mg_kg, ph_delta_for_cao, CAO_TO_CA, MGO_TO_MG,
};
use super::lime_type::best_product;
use crate::config::EngineConfig;
use crate::error::{FertiPlanError, Result};
use crate::models::{
    AcidificationStep, LandUse, LimeApplication, LimeProduct, LimeType, LimingPlan, PlanWarning,
    Season, SoilTextureClass,
};

/// Remainders at or below this are treated as an exact multiple of the cap.
const DOSE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct ScheduleRequest<'a> {
    pub total_cao_need_per_ha: f64,
    pub texture: SoilTextureClass,
    pub land_use: LandUse,
    pub current_ph: f64,
    pub target_ph: f64,
    pub candidate_products: &'a [LimeProduct],
    pub area_ha: f64,
    pub lime_type: LimeType,
    /// Current Mg status (mg/kg); MgO from dolomitic products is rolled into it.
    pub current_mg: Option<f64>,
    pub start_year: i32,
    pub preferred_season: Season,
}

/// Spreads a lime requirement over applications capped at the texture's
/// maximum single dose, spaced by the minimum interval.
///
/// Every application receives the full cap except the last, which absorbs
/// the remainder. Natural re-acidification is modelled between applications
/// and for `projection_years` after the last one; those steps are kept apart
/// from the applications and never count towards the scheduled total.
pub fn schedule(req: &ScheduleRequest<'_>, cfg: &EngineConfig) -> Result<LimingPlan> {
    validate(req, cfg)?;

    let texture = req.texture;
    let max_dose = cfg.max_dose_per_ha.get(texture);
    let coefficient = cfg.lime_coefficient.get(texture);
    let rate = cfg.acidification_rate.get(texture);
    let interval = cfg.min_interval_years.max(1);
    let maintenance = cao_for_ph_delta(rate * f64::from(interval), coefficient);

    let mut plan = LimingPlan {
        current_ph: req.current_ph,
        target_ph: req.target_ph,
        texture,
        land_use: req.land_use,
        lime_type: req.lime_type,
        area_ha: req.area_ha,
        liming_required: false,
        total_cao_need_per_ha: 0.0,
        total_cao_need: 0.0,
        total_ca_need_per_ha: 0.0,
        total_ca_need: 0.0,
        max_dose_per_ha: max_dose,
        applications: Vec::new(),
        acidification: Vec::new(),
        maintenance_cao_per_ha: maintenance,
        final_projected_ph: req.current_ph,
        warnings: Vec::new(),
    };

    let mut ph = req.current_ph;

    if req.current_ph >= req.target_ph || req.total_cao_need_per_ha <= DOSE_EPSILON {
        plan.warnings.push(PlanWarning::info(
            "no_liming_required",
            format!(
                "Soil pH {:.2} is at or above the target {:.2}; no liming is required.",
                req.current_ph, req.target_ph
            ),
        ));
        ph = project_drift(&mut plan.acidification, ph, req.start_year, cfg.projection_years, rate);
        plan.final_projected_ph = ph;
        push_maintenance_warning(&mut plan, req.start_year, interval);
        return Ok(plan);
    }

    let total = req.total_cao_need_per_ha;
    let count = application_count(total, max_dose);

    let eligible: Vec<&LimeProduct> = req
        .candidate_products
        .iter()
        .filter(|p| p.neutralizing_value() > 0.0)
        .collect();
    let product = best_product(&eligible);
    if product.is_none() {
        plan.warnings.push(
            PlanWarning::info(
                "no_lime_product",
                "No matching lime product in the catalog; doses are given as pure CaO-equivalent.",
            )
            .with_recommendation(format!(
                "Add a {} lime product to the catalog to get product quantities.",
                req.lime_type.as_str().to_lowercase()
            )),
        );
    }

    tracing::debug!(total, max_dose, count, %texture, "scheduling lime applications");

    let mut mg = req.current_mg;
    let mut last_year = req.start_year;

    for i in 0..count {
        let year = req.start_year + (i * interval) as i32;
        if i > 0 {
            ph = project_drift(&mut plan.acidification, ph, last_year, interval, rate);
        }

        let dose = if i + 1 == count {
            (total - f64::from(count - 1) * max_dose).clamp(0.0, max_dose)
        } else {
            max_dose
        };

        let (product_dose, cao, mgo) = match product {
            Some(p) => {
                let product_dose = dose / (p.neutralizing_value() / 100.0);
                (
                    product_dose,
                    product_dose * p.cao_percent / 100.0,
                    product_dose * p.mgo_percent / 100.0,
                )
            }
            None => (dose, dose, 0.0),
        };

        let mg_after = match mg {
            Some(current) if mgo > 0.0 => {
                let updated = current + kg_ha_to_mg_kg(mgo * MGO_TO_MG, cfg.topsoil_mass_t_ha);
                mg = Some(updated);
                Some(updated)
            }
            _ => None,
        };

        let ph_before = ph;
        ph += ph_delta_for_cao(dose, coefficient);

        plan.applications.push(LimeApplication {
            year,
            season: req.preferred_season,
            sequence: i + 1,
            product: product.map(|p| p.name.clone()),
            dose_per_ha: dose,
            product_dose_per_ha: product_dose,
            total_dose: dose * req.area_ha,
            total_product: product_dose * req.area_ha,
            cao_per_ha: cao,
            mgo_per_ha: mgo,
            ph_before,
            ph_after: ph,
            mg_after,
        });
        last_year = year;
    }

    ph = project_drift(&mut plan.acidification, ph, last_year, cfg.projection_years, rate);

    plan.liming_required = true;
    plan.total_cao_need_per_ha = total;
    plan.total_cao_need = total * req.area_ha;
    plan.total_ca_need_per_ha = total * CAO_TO_CA;
    plan.total_ca_need = plan.total_ca_need_per_ha * req.area_ha;
    plan.final_projected_ph = ph;
    push_maintenance_warning(&mut plan, last_year, interval);

    tracing::info!(
        applications = plan.applications.len(),
        final_ph = plan.final_projected_ph,
        "liming schedule generated"
    );

    Ok(plan)
}

/// Number of capped applications; the last one absorbs the remainder.
pub fn application_count(total: f64, max_dose: f64) -> u32 {
    if total <= DOSE_EPSILON {
        return 0;
    }
    let mut count = (total / max_dose).ceil().max(1.0);
    if count > 1.0 && total - (count - 1.0) * max_dose <= DOSE_EPSILON {
        count -= 1.0;
    }
    count as u32
}

/// Appends one drift step per year after `from_year` and returns the final pH.
fn project_drift(
    steps: &mut Vec<AcidificationStep>,
    mut ph: f64,
    from_year: i32,
    years: u32,
    rate: f64,
) -> f64 {
    for offset in 1..=years {
        let ph_end = ph - rate;
        steps.push(AcidificationStep {
            year: from_year + offset as i32,
            ph_start: ph,
            ph_end,
            rate_per_year: rate,
        });
        ph = ph_end;
    }
    ph
}

fn push_maintenance_warning(plan: &mut LimingPlan, last_year: i32, interval: u32) {
    if plan.final_projected_ph >= plan.target_ph {
        return;
    }

    // First projected year below target, if the drift window shows one.
    let below_from = plan
        .acidification
        .iter()
        .filter(|s| s.year > last_year || !plan.liming_required)
        .find(|s| s.ph_end < plan.target_ph)
        .map(|s| s.year);

    let mut message = format!(
        "Natural acidification brings pH to {:.2} by {} (target {:.2}).",
        plan.final_projected_ph,
        plan.acidification.last().map(|s| s.year).unwrap_or(last_year),
        plan.target_ph
    );
    if let Some(year) = below_from {
        message.push_str(&format!(" pH is projected below target from {}.", year));
    }

    plan.warnings.push(
        PlanWarning::info("maintenance_liming", message).with_recommendation(format!(
            "Plan maintenance liming of about {:.0} kg CaO/ha every {} years and re-test pH before each application.",
            plan.maintenance_cao_per_ha, interval
        )),
    );
}

fn validate(req: &ScheduleRequest<'_>, cfg: &EngineConfig) -> Result<()> {
    if !is_valid_ph(req.current_ph, cfg.ph_min, cfg.ph_max) {
        return Err(FertiPlanError::PhOutOfRange {
            field: "current",
            value: req.current_ph,
            min: cfg.ph_min,
            max: cfg.ph_max,
        });
    }
    if !is_valid_ph(req.target_ph, cfg.ph_min, cfg.ph_max) {
        return Err(FertiPlanError::PhOutOfRange {
            field: "target",
            value: req.target_ph,
            min: cfg.ph_min,
            max: cfg.ph_max,
        });
    }
    if !req.area_ha.is_finite() || req.area_ha <= 0.0 {
        return Err(FertiPlanError::InvalidData(format!(
            "parcel area must be positive, got {}",
            req.area_ha
        )));
    }
    if !req.total_cao_need_per_ha.is_finite() || req.total_cao_need_per_ha < 0.0 {
        return Err(FertiPlanError::InvalidData(format!(
            "lime need must be a non-negative number, got {}",
            req.total_cao_need_per_ha
        )));
    }
    let limit = cfg.max_need_per_cycle.get(req.texture);
    if req.total_cao_need_per_ha > limit + DOSE_EPSILON {
        return Err(FertiPlanError::InvalidData(format!(
            "lime need {:.0} kg CaO/ha exceeds the {:.0} kg/ha cycle limit for {} soil",
            req.total_cao_need_per_ha,
            limit,
            req.texture.as_str().to_lowercase()
        )));
    }
    Ok(())
}
