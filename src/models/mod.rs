//! Data models
//!
//! Rust structs representing journal entities and their SQLite rows.

mod feedback;
mod meal_item;
mod mission;
mod nutrition;
mod profile;

pub use feedback::{FeedbackMeta, FeedbackRecord};
pub use meal_item::{
    add_meal_item, delete_meal_item, get_day_meals, list_meal_dates, replace_day_meals,
    update_meal_item, DayMeals, MealItem, MealSlot,
};
pub use mission::{MissionChoice, MissionDay, MissionStatus};
pub use nutrition::NutrientTotals;
pub use profile::{
    calculate_age, is_prefecture, Gender, ProfileRegistration, UserProfile, PREFECTURES,
};
