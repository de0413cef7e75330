// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod flag;
mod listing;
mod project;

// Re-export all public types
pub use config::{Config, CrawlerConfig, JurisdictionConfig, RetryConfig};
pub use flag::{FlagCheck, FlagType, RedFlag};
pub use listing::ListingProject;
pub use project::Project;
