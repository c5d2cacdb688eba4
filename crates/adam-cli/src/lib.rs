//! CLI library components for ADSL derivation.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
