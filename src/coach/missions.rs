//! Daily mission suggestions

use super::generator::{GenerationPurpose, TextGenerator};
use super::prompts::{build_mission_prompt, CoachContext};

pub const MISSION_COUNT: usize = 3;

pub const FALLBACK_MISSIONS: [&str; MISSION_COUNT] = ["野菜を1食とる", "水を1杯飲む", "20分歩く"];

const NUMBERED_PREFIXES: [&str; 6] = ["1.", "2.", "3.", "1)", "2)", "3)"];
const BULLET_NOISE: &[char] = &['.', ' ', ')', '\t', '-'];
const LEADING_NOISE: &[char] = &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', ' ', ')', '\t', '-'];

fn clean_line(line: &str) -> &str {
    if let Some(prefix) = NUMBERED_PREFIXES.iter().find(|p| line.starts_with(*p)) {
        return line[prefix.len()..].trim_start_matches(BULLET_NOISE).trim();
    }

    let mut cleaned = line;
    // "a. foo" style: one character, then ". "
    let mut chars = line.char_indices();
    if let (Some(_), Some((_, '.')), Some((space, ' '))) = (chars.next(), chars.next(), chars.next()) {
        cleaned = &line[space + 1..];
    }
    cleaned.trim_start_matches(LEADING_NOISE).trim()
}

/// Turn model output into exactly three missions.
///
/// Blank lines are dropped and list numbering is stripped. Leading digits are kept
/// after an explicit `1.`/`1)` marker so "3. 15分歩く" stays intact. Missing entries
/// are filled from [`FALLBACK_MISSIONS`] by position.
pub fn parse_missions(text: &str) -> Vec<String> {
    let mut missions: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(clean_line)
        .filter(|m| !m.is_empty())
        .take(MISSION_COUNT)
        .map(str::to_string)
        .collect();

    while missions.len() < MISSION_COUNT {
        missions.push(FALLBACK_MISSIONS[missions.len()].to_string());
    }
    missions
}

pub fn fallback_missions() -> Vec<String> {
    FALLBACK_MISSIONS.iter().map(|m| m.to_string()).collect()
}

/// Ask the generator for today's missions; never fails
pub async fn generate_missions(generator: &dyn TextGenerator, ctx: &CoachContext) -> Vec<String> {
    let prompt = build_mission_prompt(ctx);
    match generator.generate_text(GenerationPurpose::Missions, &prompt).await {
        Ok(text) => parse_missions(&text),
        Err(e) => {
            tracing::warn!(error = %e, "mission generation failed, using fallback missions");
            fallback_missions()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::generator::GenerationError;
    use crate::coach::DisabledGenerator;
    use crate::models::DayMeals;
    use crate::nutrition::estimate_day;
    use async_trait::async_trait;

    struct FixedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate_text(
            &self,
            purpose: GenerationPurpose,
            _prompt: &str,
        ) -> Result<String, GenerationError> {
            assert_eq!(purpose, GenerationPurpose::Missions);
            Ok(self.0.to_string())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn ctx() -> CoachContext {
        CoachContext::new(None, estimate_day(&DayMeals::new()))
    }

    #[test]
    fn test_parse_numbered_lines() {
        let text = "1. 野菜をもう一品追加する\n\n2) 夜に間食を控える\n3. 15分間速歩する\n4. 余分";
        assert_eq!(
            parse_missions(text),
            vec!["野菜をもう一品追加する", "夜に間食を控える", "15分間速歩する"]
        );
    }

    #[test]
    fn test_parse_other_bullets() {
        let text = "- 水を飲む\n10. 早く寝る\na. 階段を使う";
        assert_eq!(parse_missions(text), vec!["水を飲む", "早く寝る", "階段を使う"]);
    }

    #[test]
    fn test_parse_pads_from_fallback() {
        assert_eq!(parse_missions("1. ストレッチ"), vec!["ストレッチ", "水を1杯飲む", "20分歩く"]);
        assert_eq!(parse_missions(""), fallback_missions());
        assert_eq!(parse_missions("1.\n2. -"), fallback_missions());
    }

    #[tokio::test]
    async fn test_generate_uses_model_output() {
        let missions = generate_missions(&FixedGenerator("1. A\n2. B\n3. C"), &ctx()).await;
        assert_eq!(missions, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_generate_falls_back_when_unavailable() {
        let missions = generate_missions(&DisabledGenerator, &ctx()).await;
        assert_eq!(missions, fallback_missions());
    }
}
