//! End-of-day meal feedback

use crate::models::DayMeals;

use super::generator::{GenerationPurpose, TextGenerator};
use super::prompts::{build_feedback_prompt, CoachContext};

pub const FEEDBACK_FALLBACK: &str =
    "フィードバックを生成できませんでした。食事改善のポイントを意識してください。";

/// Generate feedback text for a day; returns [`FEEDBACK_FALLBACK`] if generation fails
pub async fn generate_feedback_text(
    generator: &dyn TextGenerator,
    ctx: &CoachContext,
    meals: &DayMeals,
    selected_mission: Option<&str>,
) -> String {
    let prompt = build_feedback_prompt(ctx, meals, selected_mission);
    match generator.generate_text(GenerationPurpose::Feedback, &prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "feedback generation failed, using fallback text");
            FEEDBACK_FALLBACK.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::coach::generator::GenerationError;
    use crate::coach::DisabledGenerator;
    use crate::models::{MealItem, MealSlot};
    use crate::nutrition::{estimate_day, Portion};

    #[derive(Default)]
    struct RecordingGenerator {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate_text(
            &self,
            purpose: GenerationPurpose,
            prompt: &str,
        ) -> Result<String, GenerationError> {
            assert_eq!(purpose, GenerationPurpose::Feedback);
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("よくできました。明日も少しずつ続けていきましょう".to_string())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn day() -> DayMeals {
        let mut meals = DayMeals::new();
        meals.push(MealSlot::Lunch, MealItem::new("パスタ", Portion::Large));
        meals
    }

    #[tokio::test]
    async fn test_prompt_carries_meals_and_mission() {
        let generator = RecordingGenerator::default();
        let meals = day();
        let ctx = CoachContext::new(None, estimate_day(&meals));

        let text = generate_feedback_text(&generator, &ctx, &meals, Some("20分歩く")).await;
        assert!(text.ends_with("明日も少しずつ続けていきましょう"));

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("昼食: パスタ（量: 多め）"));
        assert!(prompts[0].contains("今日のミッション: 20分歩く"));
    }

    #[tokio::test]
    async fn test_fallback_text() {
        let meals = day();
        let ctx = CoachContext::new(None, estimate_day(&meals));
        let text = generate_feedback_text(&DisabledGenerator, &ctx, &meals, None).await;
        assert_eq!(text, FEEDBACK_FALLBACK);
    }
}
