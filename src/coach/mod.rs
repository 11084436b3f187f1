//! Coaching text
//!
//! Daily mission suggestions and meal feedback from an optional text-generation
//! service, with fixed fallbacks whenever the service cannot answer.

pub mod feedback;
pub mod generator;
pub mod missions;
pub mod prompts;

pub use feedback::{generate_feedback_text, FEEDBACK_FALLBACK};
pub use generator::{
    DisabledGenerator, GenerationError, GenerationPurpose, OpenAiGenerator, TextGenerator,
};
pub use missions::{generate_missions, parse_missions, FALLBACK_MISSIONS, MISSION_COUNT};
pub use prompts::{build_feedback_prompt, build_mission_prompt, CoachContext};
