//! Shared nutrient data structure
//!
//! Used for the reference table, per-item contributions and daily totals.

use serde::{Deserialize, Serialize};

/// Nutrient amounts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientTotals {
    pub protein: f64,      // grams
    pub fat: f64,          // grams
    pub carbohydrate: f64, // grams
    pub calories: f64,     // kcal
    pub salt: f64,         // grams
}

impl NutrientTotals {
    pub const fn new(protein: f64, fat: f64, carbohydrate: f64, calories: f64, salt: f64) -> Self {
        Self {
            protein,
            fat,
            carbohydrate,
            calories,
            salt,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Scale every field by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            protein: self.protein * multiplier,
            fat: self.fat * multiplier,
            carbohydrate: self.carbohydrate * multiplier,
            calories: self.calories * multiplier,
            salt: self.salt * multiplier,
        }
    }

    pub fn add(&self, other: &NutrientTotals) -> Self {
        Self {
            protein: self.protein + other.protein,
            fat: self.fat + other.fat,
            carbohydrate: self.carbohydrate + other.carbohydrate,
            calories: self.calories + other.calories,
            salt: self.salt + other.salt,
        }
    }

    /// Round every field to one decimal place
    pub fn rounded(&self) -> Self {
        Self {
            protein: round1(self.protein),
            fat: round1(self.fat),
            carbohydrate: round1(self.carbohydrate),
            calories: round1(self.calories),
            salt: round1(self.salt),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
