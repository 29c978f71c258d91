//! convenios - grant agreement management backend
//!
//! Tracks government grant agreements ("convênios") together with the
//! contracts executed under them, contract amendments and payments. Derived
//! figures (totals, balances, expiry alerts) feed a dashboard, a filtered
//! report with PDF and CSV renditions, a JSON HTTP API and a CLI.
//!
//! # Architecture
//!
//! - `config`: data directory resolution and settings
//! - `error`: custom error types
//! - `models`: domain entities, money and ids
//! - `storage`: JSON file repositories
//! - `audit`: append-only change log
//! - `services`: validation, derived figures and cascades
//! - `reports`: dashboard, filtered report, charts and PDF
//! - `export`: CSV, JSON and YAML exports
//! - `display`: terminal tables
//! - `web`: axum HTTP API
//! - `cli`: clap command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use convenios::config::{paths::ConvenioPaths, settings::Settings};
//! use convenios::storage::Storage;
//!
//! let paths = ConvenioPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::open(paths)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;
pub mod web;

pub use error::{ConvenioError, ConvenioResult};
