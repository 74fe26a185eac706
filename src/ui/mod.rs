//! Terminal output for the command line interface.
//!
//! # Modules
//!
//! - [`display`]: Result, analysis and registry tables
//! - [`progress`]: Progress bar driven by attack snapshots

pub mod display;
pub mod progress;

pub use display::{show_algorithms, show_analysis, show_result, show_written};
