//! Self-esteem scoring
//!
//! Questions {3, 5, 8, 9, 10} are reverse-scored as `7 - response`, the rest are
//! taken as given. The total ranges over [10, 60] and splits into two levels at
//! [`HIGH_THRESHOLD`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of inventory items
pub const QUESTION_COUNT: usize = 10;

/// Lowest valid response
pub const RESPONSE_MIN: i64 = 1;

/// Highest valid response
pub const RESPONSE_MAX: i64 = 6;

/// 1-based question numbers that are reverse-scored
pub const REVERSE_SCORED: [usize; 5] = [3, 5, 8, 9, 10];

/// Totals at or above this are classified as high
pub const HIGH_THRESHOLD: u32 = 35;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EsteemError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Self-esteem level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EsteemLevel {
    Low,
    High,
}

impl EsteemLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EsteemLevel::Low => "low",
            EsteemLevel::High => "high",
        }
    }

    /// Label stored in the journal files ("高" / "低")
    pub fn label(&self) -> &'static str {
        match self {
            EsteemLevel::Low => "低",
            EsteemLevel::High => "高",
        }
    }

    /// Parse either the stored label or the English name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "高" | "high" => Some(EsteemLevel::High),
            "低" | "low" => Some(EsteemLevel::Low),
            _ => None,
        }
    }

    pub fn from_total(total: u32) -> Self {
        if total >= HIGH_THRESHOLD {
            EsteemLevel::High
        } else {
            EsteemLevel::Low
        }
    }
}

/// Scored inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EsteemResult {
    pub raw_score: u32,
    pub level: EsteemLevel,
}

/// Ten validated responses, each in 1..=6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SurveyResponse([u8; QUESTION_COUNT]);

impl SurveyResponse {
    pub fn new(responses: &[i64]) -> Result<Self, EsteemError> {
        if responses.len() != QUESTION_COUNT {
            return Err(EsteemError::InvalidInput(format!(
                "expected {} responses, got {}",
                QUESTION_COUNT,
                responses.len()
            )));
        }

        let mut values = [0u8; QUESTION_COUNT];
        for (i, &r) in responses.iter().enumerate() {
            if !(RESPONSE_MIN..=RESPONSE_MAX).contains(&r) {
                return Err(EsteemError::InvalidInput(format!(
                    "response {} is {}, must be between {} and {}",
                    i + 1,
                    r,
                    RESPONSE_MIN,
                    RESPONSE_MAX
                )));
            }
            values[i] = r as u8;
        }

        Ok(Self(values))
    }

    pub fn values(&self) -> &[u8; QUESTION_COUNT] {
        &self.0
    }

    /// Score of a single item after polarity is applied
    pub fn item_score(&self, question: usize) -> u32 {
        let value = self.0[question - 1] as u32;
        if is_reverse_scored(question) {
            7 - value
        } else {
            value
        }
    }

    pub fn score(&self) -> EsteemResult {
        let raw_score: u32 = (1..=QUESTION_COUNT).map(|q| self.item_score(q)).sum();
        EsteemResult {
            raw_score,
            level: EsteemLevel::from_total(raw_score),
        }
    }
}

impl TryFrom<&[i64]> for SurveyResponse {
    type Error = EsteemError;

    fn try_from(responses: &[i64]) -> Result<Self, Self::Error> {
        Self::new(responses)
    }
}

pub fn is_reverse_scored(question: usize) -> bool {
    REVERSE_SCORED.contains(&question)
}

/// Validate and score a full set of responses
pub fn score(responses: &[i64]) -> Result<EsteemResult, EsteemError> {
    Ok(SurveyResponse::new(responses)?.score())
}
