//! Utility to register the journal profile from the command line
//!
//! Usage: set_profile <birth YYYY-MM-DD> <gender> <prefecture>

use wellness_journal::config::AppConfig;
use wellness_journal::tools::profile;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [birth, gender, region] = args.as_slice() else {
        eprintln!("Usage: set_profile <birth YYYY-MM-DD> <男性|女性|その他> <prefecture>");
        std::process::exit(2);
    };

    let config = AppConfig::from_env();
    println!("Database path: {}", config.database_path.display());

    let database = wellness_journal::db::open_and_migrate(&config.database_path)?;
    let profile = profile::register_profile(&database, birth, gender, region)?;

    println!("Profile set:");
    println!("  Birth: {}", profile.birth);
    println!("  Age: {}", profile.age);
    println!("  Gender: {}", profile.gender.label());
    println!("  Region: {}", profile.region);
    println!("  Updated: {}", profile.updated_at);

    Ok(())
}
