//! Utility to import legacy `user_data.json` / `app_data.json` files
//!
//! Usage: import_journal <dir>

use tracing_subscriber::EnvFilter;
use wellness_journal::config::AppConfig;
use wellness_journal::tools::journal;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("wellness_journal=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let Some(dir) = std::env::args().nth(1) else {
        eprintln!("Usage: import_journal <dir containing user_data.json / app_data.json>");
        std::process::exit(2);
    };

    let config = AppConfig::from_env();
    println!("Database path: {}", config.database_path.display());

    let database = wellness_journal::db::open_and_migrate(&config.database_path)?;
    let summary = journal::import_journal(&database, &dir)?;

    println!("Imported from {}:", summary.input_dir);
    println!("  Profile: {}", if summary.profile_imported { "yes" } else { "no" });
    println!("  Mission days: {}", summary.mission_days);
    println!("  Meal days: {} ({} items, {} skipped)", summary.meal_days, summary.meal_items, summary.skipped_items);
    println!("  Feedback records: {}", summary.feedback_records);
    for warning in &summary.warnings {
        println!("  Warning: {}", warning);
    }

    Ok(())
}
