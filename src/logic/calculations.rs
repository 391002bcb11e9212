//! Unit conversions shared by the calculators.

/// CaO-equivalent of 1 kg MgO (molar mass ratio 56.08 / 40.30).
pub const MGO_TO_CAO: f64 = 1.391;
/// Elemental fractions of the oxide forms.
pub const P2O5_TO_P: f64 = 0.436;
pub const K2O_TO_K: f64 = 0.830;
pub const MGO_TO_MG: f64 = 0.603;
pub const CAO_TO_CA: f64 = 0.715;

/// Step of the lime coefficient tables.
pub const PH_STEP: f64 = 0.1;

/// Converts a per-hectare mass (kg/ha) into a concentration in the plough
/// layer (mg/kg). 1 kg spread over 1 t of soil is 1 mg/kg.
pub fn kg_ha_to_mg_kg(kg_ha: f64, topsoil_mass_t_ha: f64) -> f64 {
    kg_ha * 1000.0 / topsoil_mass_t_ha
}

/// Lime in kg CaO/ha needed to raise pH by `delta_ph`.
pub fn cao_for_ph_delta(delta_ph: f64, coefficient_per_step: f64) -> f64 {
    delta_ph / PH_STEP * coefficient_per_step
}

/// pH change produced by `cao_kg_ha`. Inverse of [`cao_for_ph_delta`].
pub fn ph_delta_for_cao(cao_kg_ha: f64, coefficient_per_step: f64) -> f64 {
    cao_kg_ha / coefficient_per_step * PH_STEP
}

pub fn is_valid_ph(ph: f64, min: f64, max: f64) -> bool {
    ph.is_finite() && (min..=max).contains(&ph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topsoil_conversion() {
        // 3000 t/ha plough layer: 3 kg/ha per mg/kg
        assert!((kg_ha_to_mg_kg(3.0, 3000.0) - 1.0).abs() < 1e-12);
        assert!((kg_ha_to_mg_kg(120.0, 4000.0) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn lime_delta_is_inverse() {
        let cao = cao_for_ph_delta(1.0, 170.0);
        assert!((cao - 1700.0).abs() < 1e-9);
        assert!((ph_delta_for_cao(cao, 170.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ph_range_check() {
        assert!(is_valid_ph(4.0, 4.0, 8.0));
        assert!(is_valid_ph(8.0, 4.0, 8.0));
        assert!(!is_valid_ph(3.99, 4.0, 8.0));
        assert!(!is_valid_ph(f64::NAN, 4.0, 8.0));
    }
}
