use thiserror::Error;

#[derive(Error, Debug)]
pub enum FertiPlanError {
    #[error("{field} pH {value:.2} is outside the supported range {min:.1}-{max:.1}")]
    PhOutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Target pH {target:.2} must be above current pH {current:.2} when correction is requested")]
    TargetNotAboveCurrent { current: f64, target: f64 },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("No soil analysis available for the parcel")]
    NoSoilAnalysis,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl FertiPlanError {
    /// Validation failures abort plan generation; everything else is an
    /// environment problem of the caller.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FertiPlanError::PhOutOfRange { .. }
                | FertiPlanError::TargetNotAboveCurrent { .. }
                | FertiPlanError::MissingField(_)
                | FertiPlanError::NoSoilAnalysis
                | FertiPlanError::InvalidData(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FertiPlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_flagged() {
        assert!(FertiPlanError::NoSoilAnalysis.is_validation());
        assert!(FertiPlanError::MissingField("phosphorus".into()).is_validation());
        assert!(FertiPlanError::PhOutOfRange {
            field: "current",
            value: 9.1,
            min: 4.0,
            max: 8.0,
        }
        .is_validation());
        assert!(!FertiPlanError::Config("bad".into()).is_validation());
    }

    #[test]
    fn ph_error_message_mentions_range() {
        let err = FertiPlanError::PhOutOfRange {
            field: "current",
            value: 3.2,
            min: 4.5,
            max: 7.5,
        };
        assert!(err.to_string().contains("4.5-7.5"));
    }
}
