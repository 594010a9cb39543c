//! CLI command layer

pub mod commands;
