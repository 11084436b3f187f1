//! Food reference table
//!
//! Per-portion nutrient values for common dishes, plus the keyword categories used
//! when a name matches no table key.
//!
//! Table order is the substring-match priority. A key that contains another key is
//! listed before it (`鶏肉` before `肉`), so the most specific key wins.

use crate::models::NutrientTotals;

/// A table row
#[derive(Debug, Clone, Copy)]
pub struct FoodEntry {
    pub key: &'static str,
    pub nutrients: NutrientTotals,
}

const fn entry(key: &'static str, p: f64, f: f64, c: f64, kcal: f64, salt: f64) -> FoodEntry {
    FoodEntry {
        key,
        nutrients: NutrientTotals::new(p, f, c, kcal, salt),
    }
}

pub const FOOD_TABLE: &[FoodEntry] = &[
    entry("ごはん", 3.0, 1.0, 37.0, 168.0, 0.0),
    entry("ご飯", 3.0, 1.0, 37.0, 168.0, 0.0),
    entry("パン", 4.0, 5.0, 30.0, 200.0, 0.5),
    entry("パスタ", 6.0, 8.0, 40.0, 350.0, 0.8),
    entry("魚", 20.0, 10.0, 0.0, 240.0, 0.2),
    entry("鶏肉", 20.0, 10.0, 0.0, 220.0, 0.2),
    entry("肉", 25.0, 20.0, 0.0, 300.0, 0.3),
    entry("卵", 6.0, 5.0, 1.0, 90.0, 0.1),
    entry("サラダ", 1.0, 1.0, 3.0, 60.0, 0.1),
    entry("ヨーグルト", 4.0, 2.0, 5.0, 80.0, 0.05),
    entry("味噌汁", 3.0, 1.0, 3.0, 40.0, 1.0),
    entry("プロテイン", 20.0, 2.0, 3.0, 120.0, 0.2),
    entry("サンドイッチ", 10.0, 12.0, 35.0, 350.0, 1.0),
    entry("ハンバーグ", 18.0, 20.0, 5.0, 350.0, 0.8),
    entry("揚げ物", 8.0, 22.0, 20.0, 400.0, 0.6),
    entry("お菓子", 3.0, 15.0, 45.0, 300.0, 0.2),
    entry("バナナ", 1.0, 0.2, 22.0, 90.0, 0.0),
];

/// Keyword category applied when no table key matches
#[derive(Debug, Clone, Copy)]
pub struct FallbackRule {
    pub tokens: &'static [&'static str],
    pub increment: NutrientTotals,
}

pub const FALLBACK_RULES: &[FallbackRule] = &[
    // meat and fish
    FallbackRule {
        tokens: &["肉", "魚", "鶏", "ハンバーグ"],
        increment: NutrientTotals::new(10.0, 0.0, 0.0, 0.0, 0.0),
    },
    // oil and fried
    FallbackRule {
        tokens: &["揚げ", "バター", "油", "フライ"],
        increment: NutrientTotals::new(0.0, 5.0, 0.0, 0.0, 0.0),
    },
    // starch and grain
    FallbackRule {
        tokens: &["ごはん", "ご飯", "パン", "パスタ", "麺", "うどん", "そば"],
        increment: NutrientTotals::new(0.0, 0.0, 30.0, 0.0, 0.0),
    },
];

/// Exact key match, then the first key (in table order) contained in the name
pub fn lookup(name: &str) -> Option<&'static FoodEntry> {
    FOOD_TABLE
        .iter()
        .find(|e| e.key == name)
        .or_else(|| FOOD_TABLE.iter().find(|e| name.contains(e.key)))
}

/// Sum of every keyword category that matches the name, `None` if none does
pub fn fallback(name: &str) -> Option<NutrientTotals> {
    let mut total: Option<NutrientTotals> = None;
    for rule in FALLBACK_RULES {
        if rule.tokens.iter().any(|t| name.contains(t)) {
            total = Some(total.unwrap_or_default().add(&rule.increment));
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let e = lookup("卵").unwrap();
        assert_eq!(e.key, "卵");
        assert_eq!(e.nutrients.protein, 6.0);
    }

    #[test]
    fn test_substring_match() {
        assert_eq!(lookup("焼き魚").unwrap().key, "魚");
        assert_eq!(lookup("バナナスムージー").unwrap().key, "バナナ");
    }

    #[test]
    fn test_specific_key_wins_substring() {
        assert_eq!(lookup("鶏肉の照り焼き").unwrap().key, "鶏肉");
        assert_eq!(lookup("豚肉の生姜焼き").unwrap().key, "肉");
    }

    #[test]
    fn test_containing_keys_precede_contained_keys() {
        for (i, later) in FOOD_TABLE.iter().enumerate() {
            for earlier in &FOOD_TABLE[..i] {
                assert!(
                    !later.key.contains(earlier.key) || later.key == earlier.key,
                    "{} should be listed before {}",
                    later.key,
                    earlier.key
                );
            }
        }
    }

    #[test]
    fn test_no_match() {
        assert!(lookup("うどん").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn test_fallback_categories_combine() {
        let n = fallback("鶏の唐揚げ").unwrap();
        assert_eq!(n.protein, 10.0);
        assert_eq!(n.fat, 5.0);
        assert_eq!(n.carbohydrate, 0.0);

        let n = fallback("きつねうどん").unwrap();
        assert_eq!(n.carbohydrate, 30.0);
        assert_eq!(n.calories, 0.0);

        assert!(fallback("りんご").is_none());
    }
}
