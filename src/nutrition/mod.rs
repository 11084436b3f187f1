//! Nutrition estimation module
//!
//! Reference table lookup, portion factors and daily tendency flags.

pub mod estimator;
pub mod portion;
pub mod table;

pub use estimator::{
    estimate, estimate_day, estimate_flat, item_contribution, tendencies, NutritionEstimate,
    Tendency,
};
pub use portion::{factor_for_label, Portion};
pub use table::{lookup, FoodEntry, FOOD_TABLE};
