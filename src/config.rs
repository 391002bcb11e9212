use crate::error::{FertiPlanError, Result};
use crate::models::{LandUse, NutrientDoses, NutrientPrices, Season, SoilTextureClass};
use dialoguer::Input;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound on the capped applications one correction cycle may need.
const MAX_APPLICATIONS_PER_CYCLE: f64 = 12.0;

/// One value per soil texture class.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct TextureTable<T> {
    pub light: T,
    pub medium: T,
    pub heavy: T,
}

impl<T: Copy> TextureTable<T> {
    pub const fn new(light: T, medium: T, heavy: T) -> Self {
        Self {
            light,
            medium,
            heavy,
        }
    }

    pub fn get(&self, texture: SoilTextureClass) -> T {
        match texture {
            SoilTextureClass::Light => self.light,
            SoilTextureClass::Medium => self.medium,
            SoilTextureClass::Heavy => self.heavy,
        }
    }

    fn values(&self) -> [T; 3] {
        [self.light, self.medium, self.heavy]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct KMgBand {
    pub lower: f64,
    pub upper: f64,
    /// Largest multiplier the corrector may apply to a base dose.
    pub max_adjustment_factor: f64,
}

impl Default for KMgBand {
    fn default() -> Self {
        Self {
            lower: 1.5,
            upper: 2.5,
            max_adjustment_factor: 1.5,
        }
    }
}

impl KMgBand {
    pub fn contains(&self, ratio: f64) -> bool {
        (self.lower..=self.upper).contains(&ratio)
    }

    /// Distance from the band, zero inside it.
    pub fn distance(&self, ratio: f64) -> f64 {
        if ratio < self.lower {
            self.lower - ratio
        } else if ratio > self.upper {
            ratio - self.upper
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TierThresholds {
    pub b_min_rotation_records: usize,
    pub c_min_rotation_years: usize,
    pub c_min_history_records: usize,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            b_min_rotation_records: 1,
            c_min_rotation_years: 4,
            c_min_history_records: 3,
        }
    }
}

/// Agronomic coefficients passed explicitly into every engine call.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ph_min: f64,
    pub ph_max: f64,
    pub target_ph_arable: TextureTable<f64>,
    pub target_ph_grassland: TextureTable<f64>,
    /// kg CaO per hectare per 0.1 pH unit.
    pub lime_coefficient: TextureTable<f64>,
    /// Largest total need accepted for one correction cycle (kg CaO/ha).
    pub max_need_per_cycle: TextureTable<f64>,
    /// Largest single application (kg CaO/ha).
    pub max_dose_per_ha: TextureTable<f64>,
    /// Natural pH decrease per year.
    pub acidification_rate: TextureTable<f64>,
    pub min_interval_years: u32,
    pub projection_years: u32,
    pub preferred_season: Season,
    pub dolomitic_min_mgo_percent: f64,
    pub topsoil_mass_t_ha: f64,
    pub k_mg_band: KMgBand,
    pub max_annual_dose: NutrientDoses,
    pub max_yield_factor: f64,
    pub resampling_interval_years: u32,
    pub tiers: TierThresholds,
    pub fertilization_projection_years: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ph_min: 4.0,
            ph_max: 8.0,
            target_ph_arable: TextureTable::new(6.0, 6.5, 6.8),
            target_ph_grassland: TextureTable::new(5.5, 6.0, 6.3),
            lime_coefficient: TextureTable::new(170.0, 250.0, 330.0),
            max_need_per_cycle: TextureTable::new(3000.0, 5000.0, 7000.0),
            max_dose_per_ha: TextureTable::new(1200.0, 2000.0, 3000.0),
            acidification_rate: TextureTable::new(0.09, 0.07, 0.04),
            min_interval_years: 3,
            projection_years: 3,
            preferred_season: Season::Autumn,
            dolomitic_min_mgo_percent: 8.0,
            topsoil_mass_t_ha: 3000.0,
            k_mg_band: KMgBand::default(),
            max_annual_dose: NutrientDoses {
                p2o5: 120.0,
                k2o: 250.0,
                mgo: 120.0,
                s: 60.0,
            },
            max_yield_factor: 3.0,
            resampling_interval_years: 4,
            tiers: TierThresholds::default(),
            fertilization_projection_years: 4,
        }
    }
}

impl EngineConfig {
    pub fn target_ph_for(&self, land_use: LandUse, texture: SoilTextureClass) -> f64 {
        match land_use {
            LandUse::Arable => self.target_ph_arable.get(texture),
            LandUse::PermanentGrassland => self.target_ph_grassland.get(texture),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ph_min >= self.ph_max {
            return Err(FertiPlanError::Config(format!(
                "ph_min ({}) must be below ph_max ({})",
                self.ph_min, self.ph_max
            )));
        }

        let tables = [
            ("lime_coefficient", &self.lime_coefficient),
            ("max_need_per_cycle", &self.max_need_per_cycle),
            ("max_dose_per_ha", &self.max_dose_per_ha),
        ];
        for (name, table) in tables {
            if table.values().iter().any(|v| !v.is_finite() || *v <= 0.0) {
                return Err(FertiPlanError::Config(format!(
                    "{} must be positive for every texture",
                    name
                )));
            }
        }

        for texture in SoilTextureClass::all() {
            let applications =
                self.max_need_per_cycle.get(*texture) / self.max_dose_per_ha.get(*texture);
            if applications > MAX_APPLICATIONS_PER_CYCLE {
                return Err(FertiPlanError::Config(format!(
                    "max_need_per_cycle for {} soil needs more than {} applications of max_dose_per_ha",
                    texture.as_str().to_lowercase(),
                    MAX_APPLICATIONS_PER_CYCLE
                )));
            }
        }

        if self
            .acidification_rate
            .values()
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(FertiPlanError::Config(
                "acidification_rate must not be negative".into(),
            ));
        }

        for table in [&self.target_ph_arable, &self.target_ph_grassland] {
            if table
                .values()
                .iter()
                .any(|v| *v < self.ph_min || *v > self.ph_max)
            {
                return Err(FertiPlanError::Config(format!(
                    "target pH values must lie within {}-{}",
                    self.ph_min, self.ph_max
                )));
            }
        }

        let band = &self.k_mg_band;
        if !(band.lower > 0.0 && band.lower < band.upper) {
            return Err(FertiPlanError::Config(format!(
                "k_mg_band lower ({}) must be positive and below upper ({})",
                band.lower, band.upper
            )));
        }
        if band.max_adjustment_factor < 1.0 {
            return Err(FertiPlanError::Config(
                "k_mg_band.max_adjustment_factor must be at least 1.0".into(),
            ));
        }

        if self.min_interval_years == 0 {
            return Err(FertiPlanError::Config(
                "min_interval_years must be at least 1".into(),
            ));
        }
        if self.topsoil_mass_t_ha <= 0.0 {
            return Err(FertiPlanError::Config(
                "topsoil_mass_t_ha must be positive".into(),
            ));
        }
        if self.max_yield_factor <= 0.0 {
            return Err(FertiPlanError::Config(
                "max_yield_factor must be positive".into(),
            ));
        }

        let ceilings = &self.max_annual_dose;
        if [ceilings.p2o5, ceilings.k2o, ceilings.mgo, ceilings.s]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(FertiPlanError::Config(
                "max_annual_dose must not be negative".into(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub prices: NutrientPrices,
}

impl AppConfig {
    /// Loads YAML (with `${VAR}` substitution) and applies `FERTIPLAN__`
    /// environment overrides on top. Falls back to built-in defaults when no
    /// file is found.
    pub fn load(config_override: Option<&Path>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => {
                if !p.exists() {
                    return Err(FertiPlanError::Config(format!(
                        "Config file not found at {:?}",
                        p
                    )));
                }
                Some(p.to_path_buf())
            }
            None => Self::find_config_path(),
        };

        let mut builder = config::Config::builder();

        if let Some(path) = &config_path {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| FertiPlanError::Config(format!("Failed to read config: {}", e)))?;
            let substituted = Self::substitute_env_vars(&raw)?;
            tracing::debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(config::File::from_str(
                &substituted,
                config::FileFormat::Yaml,
            ));
        } else {
            tracing::debug!("No config file found, using built-in defaults");
        }

        builder = builder.add_source(
            config::Environment::with_prefix("FERTIPLAN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let app: AppConfig = builder.build()?.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// First existing config in `config/fertiplan.yaml`, then the XDG config
    /// directory.
    fn find_config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("config/fertiplan.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("fertiplan").join("config.yaml"))
            .filter(|p| p.exists())
    }

    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        let p = &self.prices;
        if [p.p2o5_per_kg, p.k2o_per_kg, p.mgo_per_kg, p.s_per_kg]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(FertiPlanError::Config(
                "nutrient prices must not be negative".into(),
            ));
        }
        Ok(())
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FertiPlanError::Config("Cannot determine config directory".into()))?
            .join("fertiplan");
        Ok(config_dir.join("config.yaml"))
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Prompts for the commonly tuned values and writes the full config.
    pub fn setup_interactive(target: Option<&Path>) -> Result<(Self, PathBuf)> {
        let defaults = AppConfig::default();
        let input_err = |e: dialoguer::Error| FertiPlanError::Config(format!("Input error: {}", e));

        println!();
        println!("Liming schedule");
        let min_interval_years: u32 = Input::new()
            .with_prompt("  Minimum years between lime applications")
            .default(defaults.engine.min_interval_years)
            .interact_text()
            .map_err(input_err)?;

        let season: String = Input::new()
            .with_prompt("  Preferred application season (spring/autumn)")
            .default(defaults.engine.preferred_season.as_str().to_lowercase())
            .interact_text()
            .map_err(input_err)?;
        let preferred_season = Season::from_str(&season).ok_or_else(|| {
            FertiPlanError::Config(format!("Unknown season '{}'", season))
        })?;

        let resampling_interval_years: u32 = Input::new()
            .with_prompt("  Recommended soil resampling interval (years)")
            .default(defaults.engine.resampling_interval_years)
            .interact_text()
            .map_err(input_err)?;

        println!();
        println!("Nutrient prices (per kg)");
        let currency: String = Input::new()
            .with_prompt("  Currency")
            .default(defaults.prices.currency.clone())
            .interact_text()
            .map_err(input_err)?;
        let p2o5_per_kg: f64 = Input::new()
            .with_prompt("  P2O5")
            .default(defaults.prices.p2o5_per_kg)
            .interact_text()
            .map_err(input_err)?;
        let k2o_per_kg: f64 = Input::new()
            .with_prompt("  K2O")
            .default(defaults.prices.k2o_per_kg)
            .interact_text()
            .map_err(input_err)?;
        let mgo_per_kg: f64 = Input::new()
            .with_prompt("  MgO")
            .default(defaults.prices.mgo_per_kg)
            .interact_text()
            .map_err(input_err)?;
        let s_per_kg: f64 = Input::new()
            .with_prompt("  S")
            .default(defaults.prices.s_per_kg)
            .interact_text()
            .map_err(input_err)?;

        let config = AppConfig {
            engine: EngineConfig {
                min_interval_years,
                preferred_season,
                resampling_interval_years,
                ..defaults.engine
            },
            prices: NutrientPrices {
                currency,
                p2o5_per_kg,
                k2o_per_kg,
                mgo_per_kg,
                s_per_kg,
            },
        };
        config.validate()?;

        let config_path = match target {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };
        config.write_to(&config_path)?;

        println!();
        println!("Configuration saved to {}", config_path.display());

        Ok((config, config_path))
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = format!(
            "# fertiplan configuration\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            self.to_yaml()?
        );
        std::fs::write(path, content)?;
        Ok(())
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        let mut result = content.to_string();

        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| FertiPlanError::Config(format!("Invalid substitution pattern: {}", e)))?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn target_ph_table_lookup() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.target_ph_for(LandUse::Arable, SoilTextureClass::Medium), 6.5);
        assert_eq!(cfg.target_ph_for(LandUse::Arable, SoilTextureClass::Light), 6.0);
        assert_eq!(
            cfg.target_ph_for(LandUse::PermanentGrassland, SoilTextureClass::Heavy),
            6.3
        );
    }

    #[test]
    fn inverted_k_mg_band_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.k_mg_band.lower = 3.0;
        assert!(matches!(cfg.validate(), Err(FertiPlanError::Config(_))));
    }

    #[test]
    fn zero_dose_cap_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.max_dose_per_ha.light = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn tiny_dose_cap_against_cycle_limit_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.max_dose_per_ha.heavy = 1.0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("heavy soil"));
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut app = AppConfig::default();
        app.prices.k2o_per_kg = -1.0;
        assert!(app.validate().is_err());
    }

    #[test]
    fn band_distance() {
        let band = KMgBand::default();
        assert_eq!(band.distance(2.0), 0.0);
        assert!((band.distance(1.0) - 0.5).abs() < 1e-9);
        assert!((band.distance(3.0) - 0.5).abs() < 1e-9);
        assert!(band.contains(1.5) && band.contains(2.5));
    }

    #[test]
    fn partial_yaml_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "engine:\n  min_interval_years: 4\n  max_dose_per_ha:\n    light: 1000\n    medium: 1800\n    heavy: 2500\nprices:\n  currency: EUR"
        )
        .unwrap();

        let cfg = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.engine.min_interval_years, 4);
        assert_eq!(cfg.engine.max_dose_per_ha.light, 1000.0);
        assert_eq!(cfg.engine.projection_years, 3);
        assert_eq!(cfg.prices.currency, "EUR");
        assert_eq!(cfg.prices.k2o_per_kg, NutrientPrices::default().k2o_per_kg);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/fertiplan.yaml"))).unwrap_err();
        assert!(matches!(err, FertiPlanError::Config(_)));
    }

    #[test]
    fn env_placeholders_are_substituted() {
        std::env::set_var("FERTIPLAN_TEST_CURRENCY", "EUR");
        let out = AppConfig::substitute_env_vars("currency: ${FERTIPLAN_TEST_CURRENCY}").unwrap();
        assert_eq!(out, "currency: EUR");

        let untouched = AppConfig::substitute_env_vars("currency: ${FERTIPLAN_UNSET_VAR_XYZ}").unwrap();
        assert_eq!(untouched, "currency: ${FERTIPLAN_UNSET_VAR_XYZ}");
    }

    #[test]
    fn yaml_round_trip_through_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let mut cfg = AppConfig::default();
        cfg.engine.min_interval_years = 5;
        cfg.write_to(&path).unwrap();

        let loaded = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.engine.min_interval_years, 5);
        assert_eq!(loaded.engine.preferred_season, Season::Autumn);
    }
}
