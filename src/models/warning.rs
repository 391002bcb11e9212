use serde::{Deserialize, Serialize};

/// Machine-stable severity tag carried by every plan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Info => "ℹ",
            Severity::Warning => "⚠",
            Severity::Error => "!",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanWarning {
    /// Stable identifier used for de-duplication, e.g. `regulatory_ceiling_p2o5`.
    pub key: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl PlanWarning {
    pub fn new(key: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            severity,
            message: message.into(),
            recommendation: None,
        }
    }

    pub fn error(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(key, Severity::Error, message)
    }

    pub fn warning(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(key, Severity::Warning, message)
    }

    pub fn info(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(key, Severity::Info, message)
    }

    pub fn with_recommendation(mut self, text: impl Into<String>) -> Self {
        self.recommendation = Some(text.into());
        self
    }
}

/// Concatenates warning lists, keeping the first warning seen for each key.
pub fn merge_warnings<I>(groups: I) -> Vec<PlanWarning>
where
    I: IntoIterator<Item = Vec<PlanWarning>>,
{
    let mut seen = std::collections::HashSet::new();
    let mut merged = Vec::new();
    for warning in groups.into_iter().flatten() {
        if seen.insert(warning.key.clone()) {
            merged.push(warning);
        }
    }
    merged
}
