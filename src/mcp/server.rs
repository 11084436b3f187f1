//! Wellness Journal MCP Server Implementation
//!
//! Implements the MCP server with all journal tools.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::coach::TextGenerator;
use crate::db::Database;
use crate::tools::status::StatusTracker;
use crate::tools::{feedback, journal, meals, missions, profile, reports};

/// Wellness Journal MCP Service
#[derive(Clone)]
pub struct WellnessService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    generator: Arc<dyn TextGenerator>,
    tool_router: ToolRouter<WellnessService>,
}

impl WellnessService {
    pub fn new(database_path: PathBuf, database: Database, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path, generator.name()))),
            database,
            generator,
            tool_router: Self::tool_router(),
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(message: &str, date: Option<&str>) -> Result<CallToolResult, McpError> {
    json_result(&serde_json::json!({ "error": message, "date": date }))
}

// ============================================================================
// Profile Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RegisterProfileParams {
    /// Birth date, YYYY-MM-DD
    pub birth: String,
    /// 男性, 女性 or その他
    pub gender: String,
    /// Prefecture name, e.g. 東京都
    pub region: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SubmitSelfEsteemParams {
    /// Ten answers in question order, each 1-6
    pub responses: Vec<i64>,
}

// ============================================================================
// Mission Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DateParams {
    /// YYYY-MM-DD
    pub date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ChooseMissionParams {
    pub date: String,
    /// 0-based index into the day's suggestions
    pub index: Option<usize>,
    /// The user's own mission text
    pub custom_text: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetMissionStatusParams {
    pub date: String,
    pub achieved: bool,
}

// ============================================================================
// Meal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddMealItemParams {
    pub date: String,
    /// 朝食, 昼食, 夕食, 間食 (or breakfast, lunch, dinner, snack)
    pub slot: String,
    pub name: String,
    /// 少なめ, 普通 or 多め. Defaults to 普通.
    pub portion: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateMealItemParams {
    pub date: String,
    pub slot: String,
    /// 0-based index within the slot
    pub index: usize,
    pub name: String,
    pub portion: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteMealItemParams {
    pub date: String,
    pub slot: String,
    pub index: usize,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EstimateItemsParams {
    /// Dish name to portion label
    pub items: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListMealDaysParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

// ============================================================================
// Report / File Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateReportParams {
    pub start_date: String,
    pub end_date: String,
    /// Where to write the PDF
    pub output_path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportJournalParams {
    pub output_dir: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImportJournalParams {
    pub input_dir: String,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl WellnessService {
    // --- Status ---

    #[tool(description = "Get the current status of the journal service including build info, database status, text generator and process information")]
    async fn journal_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        json_result(&status)
    }

    #[tool(description = "Get step-by-step instructions for using the journal. Call this when starting a session or when unsure how to use the tools.")]
    fn journal_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::JOURNAL_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(JOURNAL_INSTRUCTIONS)]))
    }

    // --- Profile ---

    #[tool(description = "Register or update the user profile (birth date, gender, prefecture). Age is computed from the birth date.")]
    fn register_profile(&self, Parameters(p): Parameters<RegisterProfileParams>) -> Result<CallToolResult, McpError> {
        let result = profile::register_profile(&self.database, &p.birth, &p.gender, &p.region)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get the registered profile including the latest self-esteem result")]
    fn get_profile(&self) -> Result<CallToolResult, McpError> {
        match profile::get_profile(&self.database).map_err(|e| McpError::internal_error(e, None))? {
            Some(p) => json_result(&p),
            None => not_found("Profile not registered", None),
        }
    }

    #[tool(description = "Get the ten self-esteem statements and the 6-point answer scale")]
    fn self_esteem_questions(&self) -> Result<CallToolResult, McpError> {
        json_result(&profile::self_esteem_questions())
    }

    #[tool(description = "Score ten self-esteem answers (each 1-6, in question order) and store the level on the profile")]
    fn submit_self_esteem(&self, Parameters(p): Parameters<SubmitSelfEsteemParams>) -> Result<CallToolResult, McpError> {
        let result = profile::submit_self_esteem(&self.database, &p.responses)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Missions ---

    #[tool(description = "Get the day's three mission suggestions, generating them on the first call for that date")]
    async fn get_missions(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = missions::get_missions(&self.database, self.generator.as_ref(), &p.date)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Choose the day's mission. Provide either index (0-2, a suggestion) OR custom_text (the user's own mission), not both.")]
    fn choose_mission(&self, Parameters(p): Parameters<ChooseMissionParams>) -> Result<CallToolResult, McpError> {
        let result = missions::choose_mission(&self.database, &p.date, p.index, p.custom_text.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Record whether the day's chosen mission was achieved")]
    fn set_mission_status(&self, Parameters(p): Parameters<SetMissionStatusParams>) -> Result<CallToolResult, McpError> {
        let result = missions::set_mission_status(&self.database, &p.date, p.achieved)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List every day with a chosen mission and its outcome, oldest first")]
    fn mission_history(&self) -> Result<CallToolResult, McpError> {
        let result = missions::mission_history(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Meals ---

    #[tool(description = "Append a dish to a meal slot. Returns the day's meals with the updated nutrient estimate.")]
    fn add_meal_item(&self, Parameters(p): Parameters<AddMealItemParams>) -> Result<CallToolResult, McpError> {
        let result = meals::add_meal_item(&self.database, &p.date, &p.slot, &p.name, p.portion.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Replace the dish at a 0-based index within a meal slot")]
    fn update_meal_item(&self, Parameters(p): Parameters<UpdateMealItemParams>) -> Result<CallToolResult, McpError> {
        let result = meals::update_meal_item(&self.database, &p.date, &p.slot, p.index, &p.name, p.portion.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(day) => json_result(&day),
            None => not_found("Meal item not found", Some(&p.date)),
        }
    }

    #[tool(description = "Remove the dish at a 0-based index within a meal slot")]
    fn delete_meal_item(&self, Parameters(p): Parameters<DeleteMealItemParams>) -> Result<CallToolResult, McpError> {
        let result = meals::delete_meal_item(&self.database, &p.date, &p.slot, p.index)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a day's meals organized by slot, with estimated nutrient totals and tendencies")]
    fn get_day_meals(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = meals::get_day_meals(&self.database, &p.date).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Estimate nutrients for a dish-to-portion mapping without storing anything")]
    fn estimate_items(&self, Parameters(p): Parameters<EstimateItemsParams>) -> Result<CallToolResult, McpError> {
        json_result(&meals::estimate_items(&p.items))
    }

    #[tool(description = "List days with logged meals, with totals and tendencies, optionally within a date range")]
    fn list_meal_days(&self, Parameters(p): Parameters<ListMealDaysParams>) -> Result<CallToolResult, McpError> {
        let result = meals::list_meal_days(&self.database, p.start_date.as_deref(), p.end_date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Feedback ---

    #[tool(description = "Generate and store the day's feedback from the profile, chosen mission and meals. Replaces any earlier feedback for the date.")]
    async fn generate_feedback(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = feedback::generate_feedback(&self.database, self.generator.as_ref(), &p.date)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get the stored feedback for a date")]
    fn get_feedback(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        match feedback::get_feedback(&self.database, &p.date).map_err(|e| McpError::internal_error(e, None))? {
            Some(record) => json_result(&record),
            None => not_found("No feedback for this date", Some(&p.date)),
        }
    }

    #[tool(description = "List all stored feedback with that day's meals, newest first")]
    fn feedback_history(&self) -> Result<CallToolResult, McpError> {
        let result = feedback::feedback_history(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Reports & Files ---

    #[tool(description = "Generate a PDF journal report with daily nutrient table, mission outcomes and a macronutrient trend chart")]
    fn generate_journal_report(&self, Parameters(p): Parameters<GenerateReportParams>) -> Result<CallToolResult, McpError> {
        let result = reports::generate_journal_report(&self.database, &p.start_date, &p.end_date, &p.output_path)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Export the journal to user_data.json and app_data.json in a directory")]
    fn export_journal(&self, Parameters(p): Parameters<ExportJournalParams>) -> Result<CallToolResult, McpError> {
        let result = journal::export_journal(&self.database, &p.output_dir)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Import user_data.json and app_data.json from a directory, replacing stored data for every imported date")]
    fn import_journal(&self, Parameters(p): Parameters<ImportJournalParams>) -> Result<CallToolResult, McpError> {
        let result = journal::import_journal(&self.database, &p.input_dir)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for WellnessService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "wellness-journal".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Wellness Journal".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Wellness Journal - self-esteem check-ins, daily missions, meal journaling and feedback. \
                 IMPORTANT: Call journal_instructions first. All dates are YYYY-MM-DD. \
                 Profile: register_profile/get_profile, self_esteem_questions/submit_self_esteem. \
                 Missions: get_missions, choose_mission, set_mission_status, mission_history. \
                 Meals: add/update/delete_meal_item, get_day_meals, estimate_items, list_meal_days. \
                 Feedback: generate_feedback/get_feedback/feedback_history. \
                 Files: generate_journal_report, export_journal, import_journal. \
                 Status: journal_status."
                    .into(),
            ),
        }
    }
}
