//! Wellness Journal Library
//!
//! Self-esteem check-ins, daily missions, meal journaling with rough nutrient
//! estimates, and generated feedback.

pub mod build_info;
pub mod coach;
pub mod config;
pub mod db;
pub mod esteem;
pub mod journal_json;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
