//! Self-esteem inventory
//!
//! A 10-item, 6-point self-esteem inventory and its scoring rule.

pub mod questions;
pub mod scorer;

pub use questions::{QUESTIONS, SCALE_LABELS};
pub use scorer::{
    score, EsteemError, EsteemLevel, EsteemResult, SurveyResponse, HIGH_THRESHOLD,
    QUESTION_COUNT, REVERSE_SCORED, RESPONSE_MAX, RESPONSE_MIN,
};
