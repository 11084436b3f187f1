//! Prompt builders

use crate::models::{DayMeals, NutrientTotals, UserProfile};
use crate::nutrition::{NutritionEstimate, Tendency};

pub const NO_MEALS_TEXT: &str = "食事記録がありません。";
pub const NO_MISSION_TEXT: &str = "なし";
pub const NO_TENDENCY_TEXT: &str = "特になし";
const UNKNOWN_TEXT: &str = "未登録";

/// Profile and nutrition facts shared by both prompts
#[derive(Debug, Clone, PartialEq)]
pub struct CoachContext {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub self_esteem: Option<String>,
    pub totals: NutrientTotals,
    pub tendencies: Vec<Tendency>,
}

impl CoachContext {
    pub fn new(profile: Option<&UserProfile>, estimate: NutritionEstimate) -> Self {
        Self {
            age: profile.map(|p| p.age),
            gender: profile.map(|p| p.gender.label().to_string()),
            self_esteem: profile
                .and_then(|p| p.self_esteem_level)
                .map(|l| l.label().to_string()),
            totals: estimate.totals,
            tendencies: estimate.tendencies,
        }
    }

    fn age_text(&self) -> String {
        self.age
            .map(|a| a.to_string())
            .unwrap_or_else(|| UNKNOWN_TEXT.to_string())
    }

    fn gender_text(&self) -> &str {
        self.gender.as_deref().unwrap_or(UNKNOWN_TEXT)
    }

    fn self_esteem_text(&self) -> &str {
        self.self_esteem.as_deref().unwrap_or(UNKNOWN_TEXT)
    }

    fn macro_line(&self) -> String {
        format!(
            "タンパク質: {:.1}g, 脂質: {:.1}g, 炭水化物: {:.1}g",
            self.totals.protein, self.totals.fat, self.totals.carbohydrate
        )
    }

    fn tendency_line(&self) -> String {
        tendency_text(&self.tendencies)
    }
}

pub fn tendency_text(tendencies: &[Tendency]) -> String {
    if tendencies.is_empty() {
        NO_TENDENCY_TEXT.to_string()
    } else {
        tendencies
            .iter()
            .map(|t| t.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One line per logged item, `slot: item（量: intake）`
pub fn meal_lines(meals: &DayMeals) -> String {
    let lines: Vec<String> = meals
        .iter()
        .flat_map(|(slot, items)| {
            items
                .iter()
                .filter(|item| !item.name.trim().is_empty())
                .map(move |item| {
                    format!("{}: {}（量: {}）", slot.label(), item.name, item.portion.label())
                })
        })
        .collect();

    if lines.is_empty() {
        NO_MEALS_TEXT.to_string()
    } else {
        lines.join("\n")
    }
}

pub fn build_mission_prompt(ctx: &CoachContext) -> String {
    format!(
        "あなたは健康行動支援の専門家です。
以下の情報をもとに、対象者が今日取り組める簡単な行動ミッションを**短く具体的に3つ**提案してください。
各ミッションは3〜7語程度にまとめてください。

【プロフィール】
- 年齢: {age}
- 性別: {gender}
- 自尊感情レベル: {esteem}

【簡易栄養（内部単位）】
{macros}

【栄養傾向】
{tendencies}

出力は1行ずつ「1. ○○」の形式で3行にしてください。
例:
1. 野菜をもう一品追加する
2. 夜に間食を控える
3. 15分間速歩する
",
        age = ctx.age_text(),
        gender = ctx.gender_text(),
        esteem = ctx.self_esteem_text(),
        macros = ctx.macro_line(),
        tendencies = ctx.tendency_line(),
    )
}

pub fn build_feedback_prompt(
    ctx: &CoachContext,
    meals: &DayMeals,
    selected_mission: Option<&str>,
) -> String {
    format!(
        "あなたは親切で実用的な栄養指導の専門家です。
以下の情報を踏まえて、5〜8文でフィードバックを作ってください。良い点・改善点・次の行動提案を必ず含めてください。最後は「明日も少しずつ続けていきましょう」で締めてください。

年齢: {age}
性別: {gender}
自尊感情レベル: {esteem}
今日のミッション: {mission}

【食事内容（量付き）】
{meals}

【推定栄養（内部単位）】
{macros}

【栄養傾向】
{tendencies}
",
        age = ctx.age_text(),
        gender = ctx.gender_text(),
        esteem = ctx.self_esteem_text(),
        mission = selected_mission.unwrap_or(NO_MISSION_TEXT),
        meals = meal_lines(meals),
        macros = ctx.macro_line(),
        tendencies = ctx.tendency_line(),
    )
}
