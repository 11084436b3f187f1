//! Journal file interchange
//!
//! Exports the database to the two JSON files the journal has always used and
//! imports them back, normalizing historical meal item shapes on the way in.

pub mod wire;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;

use crate::db::DbError;
use crate::esteem::EsteemLevel;
use crate::models::{
    get_day_meals, list_meal_dates, replace_day_meals, DayMeals, FeedbackMeta, FeedbackRecord,
    Gender, MealSlot, MissionDay, ProfileRegistration, UserProfile,
};

pub use wire::{normalize_item, AppFile, UserFile, APP_FILE, USER_FILE};
use wire::{FeedbackEntry, FeedbackMetaEntry, MealEntry, MissionEntry};

#[derive(Debug, Error)]
pub enum JournalFileError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("No journal files found in {0}")]
    NothingToImport(PathBuf),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportSummary {
    pub output_dir: String,
    pub profile_exported: bool,
    pub mission_days: usize,
    pub meal_days: usize,
    pub feedback_records: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub input_dir: String,
    pub profile_imported: bool,
    pub mission_days: usize,
    pub meal_days: usize,
    pub meal_items: usize,
    pub skipped_items: usize,
    pub feedback_records: usize,
    pub warnings: Vec<String>,
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), JournalFileError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| JournalFileError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| JournalFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, JournalFileError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|source| JournalFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| JournalFileError::Json {
            path: path.to_path_buf(),
            source,
        })
}

fn user_file(profile: &UserProfile) -> UserFile {
    UserFile {
        birth: Some(profile.birth.clone()),
        gender: profile.gender.label().to_string(),
        region: profile.region.clone(),
        age: profile.age,
        self_esteem_level: profile
            .self_esteem_level
            .map(|l| l.label().to_string())
            .unwrap_or_default(),
        self_esteem_score: profile.self_esteem_score,
    }
}

fn meal_entries(meals: &DayMeals) -> BTreeMap<String, Option<Vec<serde_json::Value>>> {
    MealSlot::ALL
        .iter()
        .map(|slot| {
            let items = meals
                .slot(*slot)
                .iter()
                .filter_map(|item| serde_json::to_value(MealEntry::from(item)).ok())
                .collect();
            (slot.label().to_string(), Some(items))
        })
        .collect()
}

/// Write `user_data.json` and `app_data.json` into `dir`
pub fn export_journal(conn: &Connection, dir: &Path) -> Result<ExportSummary, JournalFileError> {
    fs::create_dir_all(dir).map_err(|source| JournalFileError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let profile = UserProfile::get(conn)?;
    if let Some(profile) = &profile {
        write_json(&dir.join(USER_FILE), &user_file(profile))?;
    }

    let mut app = AppFile::default();

    for day in MissionDay::list(conn)? {
        app.missions.insert(
            day.date.clone(),
            MissionEntry {
                auto: day.auto,
                custom: day.custom,
                selected: day.selected,
                status: day.status,
            },
        );
    }

    for date in list_meal_dates(conn, None, None)? {
        let meals = get_day_meals(conn, &date)?;
        app.meal_data.insert(date, meal_entries(&meals));
    }

    for record in FeedbackRecord::list(conn)? {
        let meta = record.meta;
        app.feedback.insert(
            record.date,
            FeedbackEntry {
                text: record.text,
                meta: FeedbackMetaEntry {
                    age: meta.age,
                    gender: meta.gender,
                    self_esteem: meta.self_esteem,
                    selected_mission: meta.selected_mission,
                    nutrient_totals: meta.nutrient_totals.into(),
                    tendencies: meta.tendencies,
                },
            },
        );
    }

    write_json(&dir.join(APP_FILE), &app)?;

    let summary = ExportSummary {
        output_dir: dir.display().to_string(),
        profile_exported: profile.is_some(),
        mission_days: app.missions.len(),
        meal_days: app.meal_data.len(),
        feedback_records: app.feedback.len(),
    };
    tracing::info!(
        dir = %dir.display(),
        meal_days = summary.meal_days,
        "exported journal files"
    );
    Ok(summary)
}

fn import_profile(conn: &Connection, user: &UserFile) -> Result<(), String> {
    let birth = user
        .birth
        .as_deref()
        .ok_or_else(|| "profile has no birth date".to_string())?;
    let birth = NaiveDate::parse_from_str(birth.trim(), "%Y-%m-%d")
        .map_err(|e| format!("profile birth date '{}' is invalid: {}", birth, e))?;
    let gender = Gender::parse(&user.gender)
        .ok_or_else(|| format!("profile gender '{}' is not recognized", user.gender))?;

    let registration = ProfileRegistration {
        birth,
        gender,
        region: user.region.clone(),
        age: user.age,
    };
    let level = EsteemLevel::parse(&user.self_esteem_level);
    UserProfile::restore(conn, &registration, level, user.self_esteem_score)
        .map_err(|e| format!("profile could not be stored: {}", e))?;
    Ok(())
}

fn normalize_day(
    raw: &BTreeMap<String, Option<Vec<serde_json::Value>>>,
    summary: &mut ImportSummary,
) -> DayMeals {
    let mut meals = DayMeals::new();
    for (slot_label, items) in raw {
        let Some(slot) = MealSlot::parse(slot_label) else {
            tracing::debug!(slot = %slot_label, "ignoring unknown meal slot");
            continue;
        };
        for value in items.iter().flatten() {
            match normalize_item(value) {
                Some(item) => {
                    meals.push(slot, item);
                    summary.meal_items += 1;
                }
                None => {
                    tracing::debug!(slot = %slot_label, "skipping meal entry without a name");
                    summary.skipped_items += 1;
                }
            }
        }
    }
    meals
}

/// Read journal files from `dir`, replacing stored data for every date they contain
pub fn import_journal(
    conn: &mut Connection,
    dir: &Path,
) -> Result<ImportSummary, JournalFileError> {
    let user: Option<UserFile> = read_json(&dir.join(USER_FILE))?;
    let app: Option<AppFile> = read_json(&dir.join(APP_FILE))?;
    if user.is_none() && app.is_none() {
        return Err(JournalFileError::NothingToImport(dir.to_path_buf()));
    }

    let mut summary = ImportSummary {
        input_dir: dir.display().to_string(),
        ..Default::default()
    };

    if let Some(user) = &user {
        match import_profile(conn, user) {
            Ok(()) => summary.profile_imported = true,
            Err(warning) => {
                tracing::warn!(%warning, "profile not imported");
                summary.warnings.push(warning);
            }
        }
    }

    let app = app.unwrap_or_default();

    for (date, entry) in &app.missions {
        let day = MissionDay {
            date: date.clone(),
            auto: entry.auto.clone(),
            custom: entry.custom.clone(),
            selected: entry.selected.clone(),
            status: entry.status.clone(),
        };
        day.save(conn)?;
        summary.mission_days += 1;
    }

    for (date, raw) in &app.meal_data {
        let meals = normalize_day(raw, &mut summary);
        replace_day_meals(conn, date, &meals)?;
        summary.meal_days += 1;
    }

    for (date, entry) in &app.feedback {
        let meta = &entry.meta;
        FeedbackRecord {
            date: date.clone(),
            text: entry.text.clone(),
            meta: FeedbackMeta {
                age: meta.age,
                gender: meta.gender.clone(),
                self_esteem: meta.self_esteem.clone(),
                selected_mission: meta.selected_mission.clone(),
                nutrient_totals: meta.nutrient_totals.into(),
                tendencies: meta.tendencies.clone(),
            },
        }
        .upsert(conn)?;
        summary.feedback_records += 1;
    }

    tracing::info!(
        dir = %dir.display(),
        meal_days = summary.meal_days,
        skipped = summary.skipped_items,
        "imported journal files"
    );
    Ok(summary)
}
