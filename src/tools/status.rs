//! Journal Status Tool
//!
//! Runtime status of the service and the usage guide for assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::{migrations, Database};

/// Usage guide for AI assistants
pub const JOURNAL_INSTRUCTIONS: &str = r#"
# Wellness Journal Instructions

The journal keeps one profile, a self-esteem check-in, one mission per day, the
meals eaten each day and a short feedback text per day. All dates are ISO
`YYYY-MM-DD`. Ask the user for today's date if you are unsure of it.

---

## 1. Profile (once)

**Tool:** `register_profile`
- `birth`: `YYYY-MM-DD`, not in the future
- `gender`: `男性`, `女性` or `その他`
- `region`: one of the 47 prefectures, written in full (`東京都`, `大阪府`, `北海道` ...)

Age is computed from the birth date. Re-registering keeps the self-esteem result.

## 2. Self-esteem check-in

1. Call `self_esteem_questions` and show the 10 statements with the 6-point scale.
2. Collect one answer per statement, 1 (全くそう思わない) to 6 (非常にそう思う).
3. Call `submit_self_esteem` with all ten numbers in order.

Totals of 35 or more are `high`, below that `low`. Out-of-range or missing
answers are rejected; ask again rather than guessing.

## 3. Daily mission

- `get_missions(date)` returns three suggestions (generated on first call).
- `choose_mission(date, index)` picks a suggestion (0, 1 or 2), or
  `choose_mission(date, custom_text)` sets the user's own mission.
- `set_mission_status(date, achieved)` records the outcome at the end of the day.
- `mission_history` lists every day a mission was chosen.

## 4. Meals

Slots: `朝食` (breakfast), `昼食` (lunch), `夕食` (dinner), `間食` (snack).
Portions: `少なめ` (small, ×0.8), `普通` (normal, ×1.0), `多め` (large, ×1.2).

- `add_meal_item(date, slot, name, portion)` appends a dish.
- `update_meal_item` / `delete_meal_item` address a dish by its 0-based index
  within the slot, as shown by `get_day_meals`.
- `get_day_meals(date)` also returns the estimated totals and tendencies.

Estimates are rough. They come from a small table of common dishes
(ごはん, パン, 魚, 肉, 卵, 味噌汁 ...) plus keyword rules; unknown dishes count as zero.
Tendencies flag protein under 40 g, fat over 70 g, carbohydrate over 300 g and
salt over 6 g.

## 5. Feedback

- `generate_feedback(date)` writes a short review of the day from the profile,
  mission and meals. Calling it again replaces the previous text.
- `get_feedback(date)` and `feedback_history` read stored feedback.

## 6. Files and reports

- `export_journal(output_dir)` / `import_journal(input_dir)` read and write
  `user_data.json` and `app_data.json`.
- `generate_journal_report(start_date, end_date, output_path)` writes a PDF.
"#;

/// Runtime status of the journal service
#[derive(Debug, Clone, Serialize)]
pub struct JournalStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub schema_version: Option<i32>,

    /// Text generation backend ("openai" or "disabled")
    pub text_generator: String,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    text_generator: String,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, text_generator: impl Into<String>) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            text_generator: text_generator.into(),
        }
    }

    /// Get the current status
    pub fn get_status(&self, database: &Database) -> JournalStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());
        let schema_version = database
            .with_conn(|conn| migrations::get_schema_version(conn))
            .ok();

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        JournalStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            schema_version,
            text_generator: self.text_generator.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reports_schema_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wellness.db");
        let database = crate::db::open_and_migrate(&path).unwrap();

        let tracker = StatusTracker::new(path.clone(), "disabled");
        let status = tracker.get_status(&database);
        assert_eq!(status.schema_version, Some(2));
        assert!(status.database_size_bytes.is_some());
        assert_eq!(status.text_generator, "disabled");
        assert_eq!(status.process_id, std::process::id());
    }

    #[test]
    fn test_instructions_name_every_tool_family() {
        for tool in [
            "register_profile",
            "submit_self_esteem",
            "choose_mission",
            "add_meal_item",
            "generate_feedback",
            "export_journal",
        ] {
            assert!(JOURNAL_INSTRUCTIONS.contains(tool), "missing {}", tool);
        }
    }
}
