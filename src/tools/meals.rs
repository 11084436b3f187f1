//! Meal MCP Tools
//!
//! Tools for logging meal items and reading back the day's nutrient estimate.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::{Database, DbError};
use crate::models::{self, DayMeals, MealItem, MealSlot, NutrientTotals};
use crate::nutrition::{estimate_day, estimate_flat, NutritionEstimate, Portion, Tendency};

use super::validate_date;

/// Meal item with its position in the slot
#[derive(Debug, Serialize)]
pub struct MealItemView {
    pub index: usize,
    pub name: String,
    pub portion: Portion,
    pub portion_label: &'static str,
}

/// Meals organized by slot
#[derive(Debug, Serialize)]
pub struct DayMealsView {
    pub breakfast: Vec<MealItemView>,
    pub lunch: Vec<MealItemView>,
    pub dinner: Vec<MealItemView>,
    pub snack: Vec<MealItemView>,
}

impl From<&DayMeals> for DayMealsView {
    fn from(meals: &DayMeals) -> Self {
        let view = |slot: MealSlot| -> Vec<MealItemView> {
            meals
                .slot(slot)
                .iter()
                .enumerate()
                .map(|(index, item)| MealItemView {
                    index,
                    name: item.name.clone(),
                    portion: item.portion,
                    portion_label: item.portion.label(),
                })
                .collect()
        };
        Self {
            breakfast: view(MealSlot::Breakfast),
            lunch: view(MealSlot::Lunch),
            dinner: view(MealSlot::Dinner),
            snack: view(MealSlot::Snack),
        }
    }
}

/// Totals plus tendencies, with display labels
#[derive(Debug, Serialize)]
pub struct EstimateView {
    pub totals: NutrientTotals,
    pub tendencies: Vec<Tendency>,
    pub tendency_labels: Vec<&'static str>,
}

impl From<NutritionEstimate> for EstimateView {
    fn from(est: NutritionEstimate) -> Self {
        let tendency_labels = est.tendencies.iter().map(|t| t.label()).collect();
        Self {
            totals: est.totals,
            tendencies: est.tendencies,
            tendency_labels,
        }
    }
}

/// Response for get_day_meals and the meal mutations
#[derive(Debug, Serialize)]
pub struct DayMealsResponse {
    pub date: String,
    pub item_count: usize,
    pub meals: DayMealsView,
    pub estimate: EstimateView,
}

impl DayMealsResponse {
    fn new(date: String, meals: &DayMeals) -> Self {
        Self {
            date,
            item_count: meals.item_count(),
            meals: DayMealsView::from(meals),
            estimate: estimate_day(meals).into(),
        }
    }
}

/// Response for add_meal_item
#[derive(Debug, Serialize)]
pub struct AddMealItemResponse {
    pub slot: MealSlot,
    pub index: usize,
    pub day: DayMealsResponse,
}

/// Response for delete_meal_item
#[derive(Debug, Serialize)]
pub struct DeleteMealItemResponse {
    pub deleted: bool,
    pub day: DayMealsResponse,
}

/// Day summary for listing
#[derive(Debug, Serialize)]
pub struct MealDaySummary {
    pub date: String,
    pub item_count: usize,
    pub totals: NutrientTotals,
    pub tendencies: Vec<Tendency>,
}

/// Response for list_meal_days
#[derive(Debug, Serialize)]
pub struct ListMealDaysResponse {
    pub days: Vec<MealDaySummary>,
    pub total: usize,
}

pub fn parse_slot(slot: &str) -> Result<MealSlot, String> {
    MealSlot::parse(slot).ok_or_else(|| {
        format!(
            "Invalid meal slot '{}'. Use 朝食, 昼食, 夕食, 間食 (or breakfast, lunch, dinner, snack).",
            slot
        )
    })
}

/// Portion from an optional label. Unknown labels count as a normal portion.
pub fn parse_portion(portion: Option<&str>) -> Portion {
    portion.map(Portion::from_label).unwrap_or_default()
}

fn db_error(action: &str, e: DbError) -> String {
    match e {
        DbError::InvalidInput(msg) => msg,
        other => format!("Failed to {}: {}", action, other),
    }
}

fn load_day(conn: &rusqlite::Connection, date: String) -> Result<DayMealsResponse, String> {
    let meals = models::get_day_meals(conn, &date).map_err(|e| db_error("load meals", e))?;
    Ok(DayMealsResponse::new(date, &meals))
}

pub fn get_day_meals(db: &Database, date: &str) -> Result<DayMealsResponse, String> {
    let date = validate_date(date)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    load_day(&conn, date)
}

pub fn add_meal_item(
    db: &Database,
    date: &str,
    slot: &str,
    name: &str,
    portion: Option<&str>,
) -> Result<AddMealItemResponse, String> {
    let date = validate_date(date)?;
    let slot = parse_slot(slot)?;
    let item = MealItem::new(name, parse_portion(portion));

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let index = models::add_meal_item(&mut conn, &date, slot, &item)
        .map_err(|e| db_error("add meal item", e))?;

    tracing::debug!(%date, slot = slot.as_str(), index, "meal item added");
    Ok(AddMealItemResponse {
        slot,
        index,
        day: load_day(&conn, date)?,
    })
}

/// Replace the item at `index`. Returns None if the slot has no such item.
pub fn update_meal_item(
    db: &Database,
    date: &str,
    slot: &str,
    index: usize,
    name: &str,
    portion: Option<&str>,
) -> Result<Option<DayMealsResponse>, String> {
    let date = validate_date(date)?;
    let slot = parse_slot(slot)?;
    let item = MealItem::new(name, parse_portion(portion));

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let updated = models::update_meal_item(&conn, &date, slot, index, &item)
        .map_err(|e| db_error("update meal item", e))?;
    if !updated {
        return Ok(None);
    }
    load_day(&conn, date).map(Some)
}

pub fn delete_meal_item(
    db: &Database,
    date: &str,
    slot: &str,
    index: usize,
) -> Result<DeleteMealItemResponse, String> {
    let date = validate_date(date)?;
    let slot = parse_slot(slot)?;

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let deleted = models::delete_meal_item(&mut conn, &date, slot, index)
        .map_err(|e| db_error("delete meal item", e))?;
    Ok(DeleteMealItemResponse {
        deleted,
        day: load_day(&conn, date)?,
    })
}

/// Estimate a flat `name -> portion label` mapping without storing anything
pub fn estimate_items(items: &BTreeMap<String, String>) -> EstimateView {
    let (totals, tendencies) = estimate_flat(items);
    NutritionEstimate { totals, tendencies }.into()
}

pub fn list_meal_days(
    db: &Database,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<ListMealDaysResponse, String> {
    let start = start_date.map(validate_date).transpose()?;
    let end = end_date.map(validate_date).transpose()?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let dates = models::list_meal_dates(&conn, start.as_deref(), end.as_deref())
        .map_err(|e| db_error("list meal days", e))?;

    let mut days = Vec::with_capacity(dates.len());
    for date in dates {
        let meals = models::get_day_meals(&conn, &date).map_err(|e| db_error("load meals", e))?;
        let est = estimate_day(&meals);
        days.push(MealDaySummary {
            date,
            item_count: meals.item_count(),
            totals: est.totals,
            tendencies: est.tendencies,
        });
    }

    let total = days.len();
    Ok(ListMealDaysResponse { days, total })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let database = crate::db::open_and_migrate(&dir.path().join("wellness.db")).unwrap();
        (dir, database)
    }

    #[test]
    fn test_add_returns_fresh_estimate() {
        let (_dir, db) = db();
        add_meal_item(&db, "2025-06-01", "朝食", "卵", Some("普通")).unwrap();
        let resp = add_meal_item(&db, "2025-06-01", "dinner", "魚", Some("多め")).unwrap();

        assert_eq!(resp.slot, MealSlot::Dinner);
        assert_eq!(resp.index, 0);
        assert_eq!(resp.day.item_count, 2);
        assert_eq!(resp.day.estimate.totals.protein, 30.0);
        assert_eq!(resp.day.estimate.tendency_labels, vec!["タンパク質不足傾向"]);
        assert_eq!(resp.day.meals.dinner[0].portion_label, "多め");
    }

    #[test]
    fn test_bad_input_is_rejected() {
        let (_dir, db) = db();
        assert!(add_meal_item(&db, "2025-06-01", "夜食", "ラーメン", None).is_err());
        assert!(add_meal_item(&db, "06/01", "朝食", "パン", None).is_err());
        let err = add_meal_item(&db, "2025-06-01", "朝食", "   ", None).unwrap_err();
        assert!(err.contains("must not be empty"));
    }

    #[test]
    fn test_unknown_portion_is_normal() {
        assert_eq!(parse_portion(Some("大盛り")), Portion::Normal);
        assert_eq!(parse_portion(None), Portion::Normal);
        assert_eq!(parse_portion(Some("Small")), Portion::Small);
    }

    #[test]
    fn test_update_and_delete() {
        let (_dir, db) = db();
        for name in ["ごはん", "味噌汁"] {
            add_meal_item(&db, "2025-06-01", "昼食", name, None).unwrap();
        }

        let updated = update_meal_item(&db, "2025-06-01", "昼食", 1, "サラダ", Some("少なめ"))
            .unwrap()
            .unwrap();
        assert_eq!(updated.meals.lunch[1].name, "サラダ");
        assert!(update_meal_item(&db, "2025-06-01", "昼食", 9, "x", None).unwrap().is_none());

        let resp = delete_meal_item(&db, "2025-06-01", "昼食", 0).unwrap();
        assert!(resp.deleted);
        assert_eq!(resp.day.meals.lunch.len(), 1);
        assert_eq!(resp.day.meals.lunch[0].index, 0);
        assert_eq!(resp.day.meals.lunch[0].name, "サラダ");
    }

    #[test]
    fn test_concurrent_adds_get_distinct_indexes() {
        let (_dir, db) = db();
        let workers: Vec<_> = (0..4)
            .map(|worker| {
                let db = db.clone();
                std::thread::spawn(move || {
                    (0..25)
                        .map(|n| {
                            let name = format!("item-{}-{}", worker, n);
                            add_meal_item(&db, "2025-06-01", "間食", &name, None).unwrap().index
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut indexes: Vec<usize> = workers
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        indexes.sort_unstable();
        assert_eq!(indexes, (0..100).collect::<Vec<_>>());

        let day = get_day_meals(&db, "2025-06-01").unwrap();
        assert_eq!(day.meals.snack.len(), 100);
        for (expected, item) in day.meals.snack.iter().enumerate() {
            assert_eq!(item.index, expected);
        }
    }

    #[test]
    fn test_list_days_in_range() {
        let (_dir, db) = db();
        add_meal_item(&db, "2025-06-01", "朝食", "パン", None).unwrap();
        add_meal_item(&db, "2025-06-03", "朝食", "パン", None).unwrap();

        let all = list_meal_days(&db, None, None).unwrap();
        assert_eq!(all.total, 2);
        let later = list_meal_days(&db, Some("2025-06-02"), None).unwrap();
        assert_eq!(later.days[0].date, "2025-06-03");
        assert!(list_meal_days(&db, Some("bad"), None).is_err());
    }

    #[test]
    fn test_estimate_items() {
        let mut items = BTreeMap::new();
        items.insert("肉".to_string(), "多め".to_string());
        items.insert("揚げ物".to_string(), "多め".to_string());
        items.insert("お菓子".to_string(), "多め".to_string());
        let view = estimate_items(&items);
        assert_eq!(view.totals.protein, 43.2);
        assert_eq!(view.totals.fat, 68.4);
        assert!(view.tendencies.is_empty());
    }
}
