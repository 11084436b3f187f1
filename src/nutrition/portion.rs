//! Portion sizes
//!
//! Maps the portion labels a user can pick to fixed multiplicative factors.

use serde::{Deserialize, Serialize};

pub const FACTOR_SMALL: f64 = 0.8;
pub const FACTOR_NORMAL: f64 = 1.0;
pub const FACTOR_LARGE: f64 = 1.2;

/// Reported portion size of a meal item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Portion {
    Small,
    #[default]
    Normal,
    Large,
}

impl Portion {
    pub fn factor(&self) -> f64 {
        match self {
            Portion::Small => FACTOR_SMALL,
            Portion::Normal => FACTOR_NORMAL,
            Portion::Large => FACTOR_LARGE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Portion::Small => "small",
            Portion::Normal => "normal",
            Portion::Large => "large",
        }
    }

    /// Label used in the journal files and prompts
    pub fn label(&self) -> &'static str {
        match self {
            Portion::Small => "少なめ",
            Portion::Normal => "普通",
            Portion::Large => "多め",
        }
    }

    /// Parse a recognised label, `None` for anything else
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        match trimmed {
            "少なめ" => return Some(Portion::Small),
            "普通" => return Some(Portion::Normal),
            "多め" => return Some(Portion::Large),
            _ => {}
        }
        match trimmed.to_lowercase().as_str() {
            "small" => Some(Portion::Small),
            "normal" => Some(Portion::Normal),
            "large" => Some(Portion::Large),
            _ => None,
        }
    }

    /// Parse a label, falling back to a normal portion (factor 1.0)
    pub fn from_label(label: &str) -> Self {
        Self::parse(label).unwrap_or_default()
    }
}

/// Factor for a raw label; unrecognised labels count as a normal portion
pub fn factor_for_label(label: &str) -> f64 {
    Portion::parse(label).map(|p| p.factor()).unwrap_or(FACTOR_NORMAL)
}
