//! Wellness Journal
//!
//! An MCP server for self-esteem check-ins, daily missions and meal journaling.

use std::sync::Arc;

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use wellness_journal::build_info;
use wellness_journal::coach::{DisabledGenerator, OpenAiGenerator, TextGenerator};
use wellness_journal::config::AppConfig;
use wellness_journal::db;
use wellness_journal::mcp::WellnessService;

fn build_generator(config: &AppConfig) -> Arc<dyn TextGenerator> {
    let Some(llm) = config.llm.clone() else {
        eprintln!("No OpenAI API key set; missions and feedback use fallback text");
        return Arc::new(DisabledGenerator);
    };

    let model = llm.model.clone();
    match OpenAiGenerator::new(llm) {
        Ok(generator) => {
            eprintln!("Text generation: {}", model);
            Arc::new(generator)
        }
        Err(e) => {
            tracing::warn!(error = %e, "text generator unavailable, using fallbacks");
            Arc::new(DisabledGenerator)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("wellness_journal=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = AppConfig::from_env();
    eprintln!("Database path: {}", config.database_path.display());

    let database = db::open_and_migrate(&config.database_path)?;
    let generator = build_generator(&config);

    let service = WellnessService::new(config.database_path.clone(), database, generator);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
