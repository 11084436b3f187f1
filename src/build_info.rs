//! Build metadata
//!
//! `build.rs` bumps a build counter and stamps the compile time into the
//! environment; both are baked in here at compile time.

use serde::Serialize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const RAW_BUILD_NUMBER: Option<&str> = option_env!("WELLNESS_BUILD_NUMBER");
const RAW_BUILD_TIMESTAMP: Option<&str> = option_env!("WELLNESS_BUILD_TIMESTAMP");

/// Build counter, or 0 when compiled without `build.rs` output
pub const BUILD_NUMBER: u64 = match RAW_BUILD_NUMBER {
    Some(raw) => digits_to_u64(raw.as_bytes()),
    None => 0,
};

pub const BUILD_TIMESTAMP: &str = match RAW_BUILD_TIMESTAMP {
    Some(ts) => ts,
    None => "unknown",
};

/// Decimal digits to u64; anything non-numeric yields 0
const fn digits_to_u64(bytes: &[u8]) -> u64 {
    let mut value: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        if !digit.is_ascii_digit() {
            return 0;
        }
        value = value * 10 + (digit - b'0') as u64;
        i += 1;
    }
    value
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: VERSION,
            build_number: BUILD_NUMBER,
            build_timestamp: BUILD_TIMESTAMP,
        }
    }

    fn banner_lines(&self) -> [String; 3] {
        [
            format!("  Wellness Journal ({})", self.name),
            format!("  Version: {} | Build: {}", self.version, self.build_number),
            format!("  Compiled: {}", self.build_timestamp),
        ]
    }
}

/// Print the startup banner to stderr (stdout carries the MCP transport)
pub fn print_startup_banner() {
    let rule = "=".repeat(47);
    eprintln!("{}", rule);
    for line in BuildInfo::current().banner_lines() {
        eprintln!("{}", line);
    }
    eprintln!("{}", rule);
}
