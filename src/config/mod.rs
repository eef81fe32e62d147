// src/config/mod.rs

//! Job file loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a job file from disk (`loader.rs`).
//! - Validate bounds and ordinals (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_from_str};
pub use model::{
    ConfigFile, EngineSection, ProcessorSection, RawConfigFile, SinkConfig, SourceConfig,
    TaskletSection,
};
