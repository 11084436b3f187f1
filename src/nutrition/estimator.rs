//! Daily nutrient estimation
//!
//! Turns a day's logged meal items into rounded nutrient totals and the tendency
//! flags derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{DayMeals, MealItem, NutrientTotals};

use super::portion::factor_for_label;
use super::table::{fallback, lookup};

pub const PROTEIN_LOW_BELOW: f64 = 40.0;
pub const FAT_HIGH_ABOVE: f64 = 70.0;
pub const CARB_HIGH_ABOVE: f64 = 300.0;
pub const SALT_HIGH_ABOVE: f64 = 6.0;

/// Qualitative flag for a nutrient total crossing a fixed threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tendency {
    ProteinLow,
    FatHigh,
    CarbHigh,
    SaltHigh,
}

impl Tendency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tendency::ProteinLow => "protein_low",
            Tendency::FatHigh => "fat_high",
            Tendency::CarbHigh => "carb_high",
            Tendency::SaltHigh => "salt_high",
        }
    }

    /// Label used in prompts and the journal files
    pub fn label(&self) -> &'static str {
        match self {
            Tendency::ProteinLow => "タンパク質不足傾向",
            Tendency::FatHigh => "脂質多めの傾向",
            Tendency::CarbHigh => "炭水化物多めの傾向",
            Tendency::SaltHigh => "塩分多めの傾向",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim() {
            "タンパク質不足傾向" | "protein_low" => Some(Tendency::ProteinLow),
            "脂質多めの傾向" | "fat_high" => Some(Tendency::FatHigh),
            "炭水化物多めの傾向" | "carb_high" => Some(Tendency::CarbHigh),
            "塩分多めの傾向" | "salt_high" => Some(Tendency::SaltHigh),
            _ => None,
        }
    }
}

/// Totals plus tendencies for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEstimate {
    pub totals: NutrientTotals,
    pub tendencies: Vec<Tendency>,
}

impl NutritionEstimate {
    fn from_raw(raw: NutrientTotals) -> Self {
        let totals = raw.rounded();
        let tendencies = tendencies(&totals);
        Self { totals, tendencies }
    }
}

/// Unrounded contribution of a single item, portion factor applied.
/// Items with an empty name contribute nothing.
pub fn item_contribution(item: &MealItem) -> NutrientTotals {
    let name = item.name.trim();
    if name.is_empty() {
        return NutrientTotals::zero();
    }

    let factor = item.portion.factor();
    match lookup(name) {
        Some(entry) => entry.nutrients.scale(factor),
        None => fallback(name)
            .map(|n| n.scale(factor))
            .unwrap_or_default(),
    }
}

/// Estimate a day's totals and tendencies
pub fn estimate(meals: &DayMeals) -> (NutrientTotals, Vec<Tendency>) {
    let est = estimate_day(meals);
    (est.totals, est.tendencies)
}

pub fn estimate_day(meals: &DayMeals) -> NutritionEstimate {
    let mut raw = NutrientTotals::zero();
    for (slot, items) in meals.iter() {
        for item in items {
            if item.name.trim().is_empty() {
                tracing::debug!(slot = slot.as_str(), "skipping meal item without a name");
                continue;
            }
            raw = raw.add(&item_contribution(item));
        }
    }
    NutritionEstimate::from_raw(raw)
}

/// Estimate from a flat `name -> portion label` mapping.
///
/// Only table matches count here; keyword fallbacks are not applied.
pub fn estimate_flat(items: &BTreeMap<String, String>) -> (NutrientTotals, Vec<Tendency>) {
    let mut raw = NutrientTotals::zero();
    for (name, label) in items {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if let Some(entry) = lookup(name) {
            raw = raw.add(&entry.nutrients.scale(factor_for_label(label)));
        }
    }
    let est = NutritionEstimate::from_raw(raw);
    (est.totals, est.tendencies)
}

/// Tendencies for already rounded totals
pub fn tendencies(totals: &NutrientTotals) -> Vec<Tendency> {
    let mut out = Vec::new();
    if totals.protein < PROTEIN_LOW_BELOW {
        out.push(Tendency::ProteinLow);
    }
    if totals.fat > FAT_HIGH_ABOVE {
        out.push(Tendency::FatHigh);
    }
    if totals.carbohydrate > CARB_HIGH_ABOVE {
        out.push(Tendency::CarbHigh);
    }
    if totals.salt > SALT_HIGH_ABOVE {
        out.push(Tendency::SaltHigh);
    }
    out
}
