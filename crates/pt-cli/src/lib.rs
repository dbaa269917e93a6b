//! Product tracker CLI library.
//!
//! This crate provides the scan station and the CLI interface for the
//! record service.

mod cli;
pub mod commands;
mod config;
pub mod station;
pub mod ticker;

pub use cli::{Cli, Commands};
pub use config::Config;
