//! CLI subcommand implementations.

pub mod classify;
pub mod count;
pub mod export;
pub mod recreate;
pub mod scan;
pub mod stats;
