//! Common test utilities module
//!
//! Provides shared utilities for tests including:
//! - Temporary directory management
//! - Raw CSV fixtures in the formats the loader reads
//! - Small panels with known structure

#![allow(dead_code)]

pub mod test_utils;

pub use test_utils::{
    linear_trend_panel, monthly_csv, test_temp_dir, write_csv, TempTestDir,
};
