//! CLI components for the ED wait-time disparity analyzer.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
