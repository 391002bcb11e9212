use super::{LandUse, LimeType, PlanWarning, SoilTextureClass};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Season {
    Spring,
    #[default]
    Autumn,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Autumn => "Autumn",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "spring" | "jaro" => Some(Season::Spring),
            "autumn" | "fall" | "podzim" => Some(Season::Autumn),
            _ => None,
        }
    }
}

impl TryFrom<String> for Season {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or_else(|| format!("unknown season '{}'", value))
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One scheduled liming event. Doses are kg/ha unless prefixed `total_`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimeApplication {
    pub year: i32,
    pub season: Season,
    pub sequence: u32,
    pub product: Option<String>,
    /// CaO-equivalent dose.
    pub dose_per_ha: f64,
    pub product_dose_per_ha: f64,
    pub total_dose: f64,
    pub total_product: f64,
    pub cao_per_ha: f64,
    pub mgo_per_ha: f64,
    pub ph_before: f64,
    pub ph_after: f64,
    pub mg_after: Option<f64>,
}

/// Natural re-acidification over one year. Informational only; never
/// counted as an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcidificationStep {
    pub year: i32,
    pub ph_start: f64,
    pub ph_end: f64,
    pub rate_per_year: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduleEntry<'a> {
    Application(&'a LimeApplication),
    Acidification(&'a AcidificationStep),
}

impl ScheduleEntry<'_> {
    pub fn year(&self) -> i32 {
        match self {
            ScheduleEntry::Application(app) => app.year,
            ScheduleEntry::Acidification(step) => step.year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimingPlan {
    pub current_ph: f64,
    pub target_ph: f64,
    pub texture: SoilTextureClass,
    pub land_use: LandUse,
    pub lime_type: LimeType,
    pub area_ha: f64,
    pub liming_required: bool,
    pub total_cao_need_per_ha: f64,
    pub total_cao_need: f64,
    pub total_ca_need_per_ha: f64,
    pub total_ca_need: f64,
    pub max_dose_per_ha: f64,
    pub applications: Vec<LimeApplication>,
    pub acidification: Vec<AcidificationStep>,
    pub maintenance_cao_per_ha: f64,
    pub final_projected_ph: f64,
    pub warnings: Vec<PlanWarning>,
}

impl LimingPlan {
    pub fn scheduled_cao_per_ha(&self) -> f64 {
        self.applications.iter().map(|a| a.dose_per_ha).sum()
    }

    /// Applications and drift steps in chronological order. Within a year the
    /// drift step comes first, so an application's `ph_before` follows it.
    pub fn timeline(&self) -> Vec<ScheduleEntry<'_>> {
        let mut entries: Vec<ScheduleEntry<'_>> = self
            .acidification
            .iter()
            .map(ScheduleEntry::Acidification)
            .chain(self.applications.iter().map(ScheduleEntry::Application))
            .collect();
        entries.sort_by_key(|e| {
            let order = match e {
                ScheduleEntry::Acidification(_) => 0,
                ScheduleEntry::Application(_) => 1,
            };
            (e.year(), order)
        });
        entries
    }

    pub fn rows(&self) -> Vec<LimingRow> {
        self.timeline()
            .into_iter()
            .map(|entry| match entry {
                ScheduleEntry::Application(app) => LimingRow {
                    year: app.year,
                    kind: "application".into(),
                    season: Some(app.season.as_str().to_string()),
                    sequence: Some(app.sequence),
                    product: app.product.clone(),
                    cao_eq_kg_ha: Some(round2(app.dose_per_ha)),
                    product_kg_ha: Some(round2(app.product_dose_per_ha)),
                    product_total_kg: Some(round2(app.total_product)),
                    mgo_kg_ha: Some(round2(app.mgo_per_ha)),
                    ph_start: round2(app.ph_before),
                    ph_end: round2(app.ph_after),
                    mg_after: app.mg_after.map(round2),
                },
                ScheduleEntry::Acidification(step) => LimingRow {
                    year: step.year,
                    kind: "acidification".into(),
                    season: None,
                    sequence: None,
                    product: None,
                    cao_eq_kg_ha: None,
                    product_kg_ha: None,
                    product_total_kg: None,
                    mgo_kg_ha: None,
                    ph_start: round2(step.ph_start),
                    ph_end: round2(step.ph_end),
                    mg_after: None,
                },
            })
            .collect()
    }
}

/// Flat record for tabular and CSV rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimingRow {
    pub year: i32,
    pub kind: String,
    pub season: Option<String>,
    pub sequence: Option<u32>,
    pub product: Option<String>,
    pub cao_eq_kg_ha: Option<f64>,
    pub product_kg_ha: Option<f64>,
    pub product_total_kg: Option<f64>,
    pub mgo_kg_ha: Option<f64>,
    pub ph_start: f64,
    pub ph_end: f64,
    pub mg_after: Option<f64>,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application(year: i32, sequence: u32, dose: f64) -> LimeApplication {
        LimeApplication {
            year,
            season: Season::Autumn,
            sequence,
            product: None,
            dose_per_ha: dose,
            product_dose_per_ha: dose,
            total_dose: dose,
            total_product: dose,
            cao_per_ha: dose,
            mgo_per_ha: 0.0,
            ph_before: 5.0,
            ph_after: 5.5,
            mg_after: None,
        }
    }

    fn plan() -> LimingPlan {
        LimingPlan {
            current_ph: 5.0,
            target_ph: 6.0,
            texture: SoilTextureClass::Light,
            land_use: LandUse::Arable,
            lime_type: LimeType::Either,
            area_ha: 1.0,
            liming_required: true,
            total_cao_need_per_ha: 1700.0,
            total_cao_need: 1700.0,
            total_ca_need_per_ha: 1215.0,
            total_ca_need: 1215.0,
            max_dose_per_ha: 1200.0,
            applications: vec![application(2026, 1, 1200.0), application(2029, 2, 500.0)],
            acidification: vec![
                AcidificationStep {
                    year: 2027,
                    ph_start: 5.7,
                    ph_end: 5.61,
                    rate_per_year: 0.09,
                },
                AcidificationStep {
                    year: 2029,
                    ph_start: 5.52,
                    ph_end: 5.43,
                    rate_per_year: 0.09,
                },
            ],
            maintenance_cao_per_ha: 459.0,
            final_projected_ph: 5.4,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn season_defaults_to_autumn() {
        assert_eq!(Season::default(), Season::Autumn);
        assert_eq!(Season::from_str("fall"), Some(Season::Autumn));
        assert_eq!(Season::from_str("jaro"), Some(Season::Spring));
    }

    #[test]
    fn timeline_puts_drift_before_same_year_application() {
        let plan = plan();
        let years: Vec<i32> = plan.timeline().iter().map(|e| e.year()).collect();
        assert_eq!(years, vec![2026, 2027, 2029, 2029]);
        assert!(matches!(plan.timeline()[2], ScheduleEntry::Acidification(_)));
        assert!(matches!(plan.timeline()[3], ScheduleEntry::Application(_)));
    }

    #[test]
    fn rows_flatten_both_kinds() {
        let rows = plan().rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].kind, "application");
        assert_eq!(rows[1].kind, "acidification");
        assert!(rows[1].cao_eq_kg_ha.is_none());
    }

    #[test]
    fn scheduled_total_ignores_drift() {
        assert!((plan().scheduled_cao_per_ha() - 1700.0).abs() < 1e-9);
    }
}
