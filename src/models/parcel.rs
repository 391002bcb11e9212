use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum SoilTextureClass {
    Light,
    Medium,
    Heavy,
}

impl SoilTextureClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoilTextureClass::Light => "Light",
            SoilTextureClass::Medium => "Medium",
            SoilTextureClass::Heavy => "Heavy",
        }
    }

    /// Accepts the English names as well as the ÚKZÚZ letter codes
    /// (L = lehká, S = střední, T = těžká).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" | "l" | "lehka" | "lehká" | "sandy" => Some(SoilTextureClass::Light),
            "medium" | "s" | "stredni" | "střední" | "loam" => Some(SoilTextureClass::Medium),
            "heavy" | "t" | "tezka" | "těžká" | "clay" => Some(SoilTextureClass::Heavy),
            _ => None,
        }
    }

    pub fn all() -> &'static [SoilTextureClass] {
        &[
            SoilTextureClass::Light,
            SoilTextureClass::Medium,
            SoilTextureClass::Heavy,
        ]
    }
}

impl TryFrom<String> for SoilTextureClass {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or_else(|| format!("unknown soil texture '{}'", value))
    }
}

impl std::fmt::Display for SoilTextureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum LandUse {
    Arable,
    PermanentGrassland,
}

impl LandUse {
    pub fn as_str(&self) -> &'static str {
        match self {
            LandUse::Arable => "Arable",
            LandUse::PermanentGrassland => "Permanent Grassland",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' ', '_'], "").as_str() {
            "arable" | "ornapuda" | "orna" => Some(LandUse::Arable),
            "permanentgrassland" | "grassland" | "ttp" => Some(LandUse::PermanentGrassland),
            _ => None,
        }
    }
}

impl TryFrom<String> for LandUse {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or_else(|| format!("unknown land use '{}'", value))
    }
}

impl std::fmt::Display for LandUse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub area_ha: f64,
    pub texture: SoilTextureClass,
    pub land_use: LandUse,
    #[serde(default)]
    pub cadastral_code: Option<String>,
}

impl Parcel {
    pub fn new(name: impl Into<String>, area_ha: f64, texture: SoilTextureClass, land_use: LandUse) -> Self {
        Self {
            id: None,
            name: name.into(),
            area_ha,
            texture,
            land_use,
            cadastral_code: None,
        }
    }
}
