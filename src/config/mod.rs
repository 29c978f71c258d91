//! Configuration module for convenios
//!
//! This module provides configuration management including:
//! - Data directory resolution
//! - Settings persistence
//! - Server and report preferences

pub mod paths;
pub mod settings;

pub use paths::ConvenioPaths;
pub use settings::Settings;
