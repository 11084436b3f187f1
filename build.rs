//! Build script for Wellness Journal
//!
//! Bumps the persistent build counter and exports it, with a UTC timestamp,
//! to `src/build_info.rs` through rustc environment variables.

use std::fs;
use std::path::Path;

const COUNTER_FILE: &str = "build_number.txt";

fn read_counter(path: &Path) -> u64 {
    fs::read_to_string(path)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(0)
}

fn main() {
    println!("cargo:rerun-if-changed=src");

    let counter = Path::new(COUNTER_FILE);
    let build_number = read_counter(counter) + 1;
    if let Err(e) = fs::write(counter, build_number.to_string()) {
        println!("cargo:warning=could not persist {}: {}", COUNTER_FILE, e);
    }

    let stamped_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    println!("cargo:rustc-env=WELLNESS_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=WELLNESS_BUILD_TIMESTAMP={}", stamped_at);
}
