//! Meal item model
//!
//! A named dish with a portion size, logged in one meal slot of a calendar day.
//! Items are identified only by their position within the slot.

use std::collections::BTreeMap;

use rusqlite::{params, Connection, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::nutrition::Portion;

/// Meal slot enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
        }
    }

    /// Label used in the journal files and prompts
    pub fn label(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "朝食",
            MealSlot::Lunch => "昼食",
            MealSlot::Dinner => "夕食",
            MealSlot::Snack => "間食",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        match trimmed {
            "朝食" => return Some(MealSlot::Breakfast),
            "昼食" => return Some(MealSlot::Lunch),
            "夕食" => return Some(MealSlot::Dinner),
            "間食" => return Some(MealSlot::Snack),
            _ => {}
        }
        match trimmed.to_lowercase().as_str() {
            "breakfast" => Some(MealSlot::Breakfast),
            "lunch" => Some(MealSlot::Lunch),
            "dinner" => Some(MealSlot::Dinner),
            "snack" => Some(MealSlot::Snack),
            _ => None,
        }
    }
}

/// A logged dish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealItem {
    pub name: String,
    pub portion: Portion,
}

impl MealItem {
    pub fn new(name: impl Into<String>, portion: Portion) -> Self {
        Self {
            name: name.into(),
            portion,
        }
    }
}

/// All meal items of one day, grouped by slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMeals {
    slots: BTreeMap<MealSlot, Vec<MealItem>>,
}

impl Default for DayMeals {
    fn default() -> Self {
        Self::new()
    }
}

impl DayMeals {
    /// Empty day with all four slots present
    pub fn new() -> Self {
        Self {
            slots: MealSlot::ALL.iter().map(|s| (*s, Vec::new())).collect(),
        }
    }

    pub fn push(&mut self, slot: MealSlot, item: MealItem) {
        self.slots.entry(slot).or_default().push(item);
    }

    pub fn slot(&self, slot: MealSlot) -> &[MealItem] {
        self.slots.get(&slot).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MealSlot, &Vec<MealItem>)> {
        self.slots.iter()
    }

    pub fn item_count(&self) -> usize {
        self.slots.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }
}

/// Stored meal item row
struct MealItemRow {
    slot: MealSlot,
    item: MealItem,
}

impl MealItemRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let slot_str: String = row.get("slot")?;
        let portion_str: String = row.get("portion")?;
        let slot = MealSlot::parse(&slot_str).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(
                0,
                format!("slot {}", slot_str),
                rusqlite::types::Type::Text,
            )
        })?;
        Ok(Self {
            slot,
            item: MealItem {
                name: row.get("name")?,
                portion: Portion::from_label(&portion_str),
            },
        })
    }
}

/// Load all meal items for a date
pub fn get_day_meals(conn: &Connection, date: &str) -> DbResult<DayMeals> {
    let mut stmt = conn.prepare(
        "SELECT slot, name, portion FROM meal_items WHERE date = ?1 ORDER BY slot, position",
    )?;
    let rows = stmt
        .query_map([date], MealItemRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut meals = DayMeals::new();
    for row in rows {
        meals.push(row.slot, row.item);
    }
    Ok(meals)
}

fn slot_len(conn: &Connection, date: &str, slot: MealSlot) -> DbResult<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM meal_items WHERE date = ?1 AND slot = ?2",
        params![date, slot.as_str()],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// Append an item to the end of a slot, returning its position
///
/// The position is read and written under one immediate transaction so
/// overlapping appends to the same slot serialize.
pub fn add_meal_item(
    conn: &mut Connection,
    date: &str,
    slot: MealSlot,
    item: &MealItem,
) -> DbResult<usize> {
    let name = item.name.trim();
    if name.is_empty() {
        return Err(DbError::InvalidInput("Meal item name must not be empty".to_string()));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let position = slot_len(&tx, date, slot)?;
    tx.execute(
        r#"
        INSERT INTO meal_items (date, slot, position, name, portion)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![date, slot.as_str(), position as i64, name, item.portion.as_str()],
    )?;
    tx.commit()?;
    Ok(position)
}

/// Replace the item at a position. Returns false if there is no such item.
pub fn update_meal_item(
    conn: &Connection,
    date: &str,
    slot: MealSlot,
    index: usize,
    item: &MealItem,
) -> DbResult<bool> {
    let name = item.name.trim();
    if name.is_empty() {
        return Err(DbError::InvalidInput("Meal item name must not be empty".to_string()));
    }

    let rows = conn.execute(
        r#"
        UPDATE meal_items SET name = ?1, portion = ?2, updated_at = datetime('now')
        WHERE date = ?3 AND slot = ?4 AND position = ?5
        "#,
        params![name, item.portion.as_str(), date, slot.as_str(), index as i64],
    )?;
    Ok(rows > 0)
}

/// Delete the item at a position; later items move up one place
pub fn delete_meal_item(
    conn: &mut Connection,
    date: &str,
    slot: MealSlot,
    index: usize,
) -> DbResult<bool> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let rows = tx.execute(
        "DELETE FROM meal_items WHERE date = ?1 AND slot = ?2 AND position = ?3",
        params![date, slot.as_str(), index as i64],
    )?;
    if rows == 0 {
        return Ok(false);
    }

    // Two passes through negative positions keep (date, slot, position) unique
    // while rows move.
    tx.execute(
        r#"
        UPDATE meal_items SET position = -position
        WHERE date = ?1 AND slot = ?2 AND position > ?3
        "#,
        params![date, slot.as_str(), index as i64],
    )?;
    tx.execute(
        r#"
        UPDATE meal_items SET position = -position - 1, updated_at = datetime('now')
        WHERE date = ?1 AND slot = ?2 AND position < 0
        "#,
        params![date, slot.as_str()],
    )?;
    tx.commit()?;
    Ok(true)
}

/// Replace every item logged for a date
pub fn replace_day_meals(conn: &mut Connection, date: &str, meals: &DayMeals) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM meal_items WHERE date = ?1", [date])?;
    for (slot, items) in meals.iter() {
        let mut position = 0i64;
        for item in items {
            let name = item.name.trim();
            if name.is_empty() {
                continue;
            }
            tx.execute(
                r#"
                INSERT INTO meal_items (date, slot, position, name, portion)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![date, slot.as_str(), position, name, item.portion.as_str()],
            )?;
            position += 1;
        }
    }
    tx.commit()?;
    Ok(())
}

/// Dates that have at least one meal item, ascending, optionally bounded
pub fn list_meal_dates(
    conn: &Connection,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> DbResult<Vec<String>> {
    let mut sql = String::from("SELECT DISTINCT date FROM meal_items WHERE 1=1");
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(start) = start_date {
        params_vec.push(Box::new(start.to_string()));
        sql.push_str(&format!(" AND date >= ?{}", params_vec.len()));
    }

    if let Some(end) = end_date {
        params_vec.push(Box::new(end.to_string()));
        sql.push_str(&format!(" AND date <= ?{}", params_vec.len()));
    }

    sql.push_str(" ORDER BY date ASC");

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

    let dates = stmt
        .query_map(params_refs.as_slice(), |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(dates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_slot_labels() {
        assert_eq!(MealSlot::parse("朝食"), Some(MealSlot::Breakfast));
        assert_eq!(MealSlot::parse("Dinner"), Some(MealSlot::Dinner));
        assert_eq!(MealSlot::parse("夜食"), None);
        for slot in MealSlot::ALL {
            assert_eq!(MealSlot::parse(slot.label()), Some(slot));
        }
    }

    #[test]
    fn test_new_day_has_all_slots() {
        let meals = DayMeals::new();
        assert_eq!(meals.iter().count(), 4);
        assert!(meals.is_empty());
    }

    fn positions(conn: &Connection, date: &str, slot: MealSlot) -> Vec<i64> {
        let mut stmt = conn
            .prepare(
                "SELECT position FROM meal_items WHERE date = ?1 AND slot = ?2 ORDER BY position",
            )
            .unwrap();
        stmt.query_map(params![date, slot.as_str()], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_add_and_load() {
        let mut conn = conn();
        let date = "2025-06-01";
        let pasta = MealItem::new("パスタ", Portion::Large);
        let salad = MealItem::new(" サラダ ", Portion::Small);
        assert_eq!(add_meal_item(&mut conn, date, MealSlot::Lunch, &pasta).unwrap(), 0);
        assert_eq!(add_meal_item(&mut conn, date, MealSlot::Lunch, &salad).unwrap(), 1);
        add_meal_item(&mut conn, date, MealSlot::Breakfast, &MealItem::new("卵", Portion::Normal))
            .unwrap();

        let meals = get_day_meals(&conn, date).unwrap();
        assert_eq!(meals.slot(MealSlot::Lunch).len(), 2);
        assert_eq!(meals.slot(MealSlot::Lunch)[1], MealItem::new("サラダ", Portion::Small));
        assert_eq!(meals.slot(MealSlot::Breakfast)[0].name, "卵");
        assert!(meals.slot(MealSlot::Dinner).is_empty());

        assert!(get_day_meals(&conn, "2025-06-02").unwrap().is_empty());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut conn = conn();
        let blank = MealItem::new("  ", Portion::Normal);
        let err = add_meal_item(&mut conn, "2025-06-01", MealSlot::Snack, &blank);
        assert!(matches!(err, Err(DbError::InvalidInput(_))));
        assert!(positions(&conn, "2025-06-01", MealSlot::Snack).is_empty());
    }

    #[test]
    fn test_update_by_position() {
        let mut conn = conn();
        let date = "2025-06-01";
        add_meal_item(&mut conn, date, MealSlot::Dinner, &MealItem::new("魚", Portion::Normal))
            .unwrap();

        let meat = MealItem::new("肉", Portion::Large);
        assert!(update_meal_item(&conn, date, MealSlot::Dinner, 0, &meat).unwrap());
        assert!(!update_meal_item(&conn, date, MealSlot::Dinner, 3, &meat).unwrap());

        let meals = get_day_meals(&conn, date).unwrap();
        assert_eq!(meals.slot(MealSlot::Dinner), &[MealItem::new("肉", Portion::Large)]);
    }

    #[test]
    fn test_delete_shifts_positions() {
        let mut conn = conn();
        let date = "2025-06-01";
        for name in ["ごはん", "味噌汁", "魚"] {
            add_meal_item(&mut conn, date, MealSlot::Dinner, &MealItem::new(name, Portion::Normal))
                .unwrap();
        }

        assert!(delete_meal_item(&mut conn, date, MealSlot::Dinner, 0).unwrap());
        assert!(!delete_meal_item(&mut conn, date, MealSlot::Dinner, 5).unwrap());

        let names: Vec<_> = get_day_meals(&conn, date)
            .unwrap()
            .slot(MealSlot::Dinner)
            .iter()
            .map(|i| i.name.clone())
            .collect();
        assert_eq!(names, vec!["味噌汁", "魚"]);

        // appended items land after the shifted ones
        let salad = MealItem::new("サラダ", Portion::Normal);
        assert_eq!(add_meal_item(&mut conn, date, MealSlot::Dinner, &salad).unwrap(), 2);
    }

    #[test]
    fn test_delete_from_middle_keeps_positions_dense() {
        let mut conn = conn();
        let date = "2025-06-01";
        for name in ["a", "b", "c", "d", "e"] {
            add_meal_item(&mut conn, date, MealSlot::Snack, &MealItem::new(name, Portion::Normal))
                .unwrap();
        }
        add_meal_item(&mut conn, date, MealSlot::Lunch, &MealItem::new("x", Portion::Normal))
            .unwrap();

        assert!(delete_meal_item(&mut conn, date, MealSlot::Snack, 1).unwrap());
        assert!(delete_meal_item(&mut conn, date, MealSlot::Snack, 3).unwrap());

        assert_eq!(positions(&conn, date, MealSlot::Snack), vec![0, 1, 2]);
        assert_eq!(positions(&conn, date, MealSlot::Lunch), vec![0]);
        let names: Vec<_> = get_day_meals(&conn, date)
            .unwrap()
            .slot(MealSlot::Snack)
            .iter()
            .map(|i| i.name.clone())
            .collect();
        assert_eq!(names, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_duplicate_position_rejected() {
        let mut conn = conn();
        let item = MealItem::new("x", Portion::Normal);
        add_meal_item(&mut conn, "2025-06-01", MealSlot::Lunch, &item).unwrap();
        let duplicate = conn.execute(
            "INSERT INTO meal_items (date, slot, position, name, portion)
             VALUES ('2025-06-01', 'lunch', 0, 'y', 'normal')",
            [],
        );
        assert!(duplicate.is_err());
    }

    #[test]
    fn test_replace_and_list_dates() {
        let mut conn = conn();
        let banana = MealItem::new("バナナ", Portion::Normal);
        add_meal_item(&mut conn, "2025-06-03", MealSlot::Snack, &banana).unwrap();

        let mut meals = DayMeals::new();
        meals.push(MealSlot::Breakfast, MealItem::new("パン", Portion::Normal));
        meals.push(MealSlot::Breakfast, MealItem::new("", Portion::Normal));
        replace_day_meals(&mut conn, "2025-06-01", &meals).unwrap();
        replace_day_meals(&mut conn, "2025-06-01", &meals).unwrap();

        assert_eq!(get_day_meals(&conn, "2025-06-01").unwrap().item_count(), 1);
        assert_eq!(list_meal_dates(&conn, None, None).unwrap(), vec!["2025-06-01", "2025-06-03"]);
        assert_eq!(
            list_meal_dates(&conn, Some("2025-06-02"), None).unwrap(),
            vec!["2025-06-03"]
        );
    }
}
