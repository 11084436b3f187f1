//! On-disk shapes of `user_data.json` and `app_data.json`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{MealItem, NutrientTotals};
use crate::nutrition::Portion;

pub const USER_FILE: &str = "user_data.json";
pub const APP_FILE: &str = "app_data.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserFile {
    #[serde(default)]
    pub birth: Option<String>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub self_esteem_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_esteem_score: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppFile {
    #[serde(default)]
    pub missions: BTreeMap<String, MissionEntry>,
    /// date -> slot label -> raw items; items are normalized on import and a
    /// `null` slot reads as empty
    #[serde(default)]
    pub meal_data: BTreeMap<String, BTreeMap<String, Option<Vec<Value>>>>,
    #[serde(default)]
    pub feedback: BTreeMap<String, FeedbackEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionEntry {
    #[serde(default)]
    pub auto: Vec<String>,
    #[serde(default)]
    pub custom: Vec<String>,
    #[serde(default)]
    pub selected: Option<String>,
    #[serde(default)]
    pub status: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub meta: FeedbackMetaEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackMetaEntry {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub self_esteem: Option<String>,
    #[serde(default)]
    pub selected_mission: Option<String>,
    #[serde(default)]
    pub nutrient_totals: TotalsEntry,
    #[serde(default)]
    pub tendencies: Vec<String>,
}

/// Nutrient totals keyed the way the journal files key them
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalsEntry {
    #[serde(rename = "タンパク質", alias = "p", default)]
    pub protein: f64,
    #[serde(rename = "脂質", alias = "f", default)]
    pub fat: f64,
    #[serde(rename = "炭水化物", alias = "c", default)]
    pub carbohydrate: f64,
    #[serde(rename = "cal", default)]
    pub calories: f64,
    #[serde(rename = "塩分", default)]
    pub salt: f64,
}

impl From<NutrientTotals> for TotalsEntry {
    fn from(t: NutrientTotals) -> Self {
        Self {
            protein: t.protein,
            fat: t.fat,
            carbohydrate: t.carbohydrate,
            calories: t.calories,
            salt: t.salt,
        }
    }
}

impl From<TotalsEntry> for NutrientTotals {
    fn from(t: TotalsEntry) -> Self {
        NutrientTotals::new(t.protein, t.fat, t.carbohydrate, t.calories, t.salt)
    }
}

/// Written item shape: `{"item": name, "intake": label}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealEntry {
    pub item: String,
    pub intake: String,
}

impl From<&MealItem> for MealEntry {
    fn from(item: &MealItem) -> Self {
        Self {
            item: item.name.clone(),
            intake: item.portion.label().to_string(),
        }
    }
}

fn first_text<'a>(obj: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Normalize any historical item shape into a [`MealItem`].
///
/// Accepts a bare string (normal portion) or an object naming the dish under
/// `item`, `name` or `food` and the portion under `intake`, `amount` or
/// `amount_label`. Returns None when no name can be found.
pub fn normalize_item(value: &Value) -> Option<MealItem> {
    match value {
        Value::String(name) => {
            let name = name.trim();
            (!name.is_empty()).then(|| MealItem::new(name, Portion::Normal))
        }
        Value::Object(obj) => {
            let name = first_text(obj, &["item", "name", "food"])?;
            let portion = first_text(obj, &["intake", "amount", "amount_label"])
                .map(Portion::from_label)
                .unwrap_or_default();
            Some(MealItem::new(name, portion))
        }
        _ => None,
    }
}
