// src/engine/mod.rs

//! Reference scheduler for tasklets.
//!
//! The pure round runner lives in [`core`]; the async/IO shell that places
//! workers on Tokio tasks or blocking threads is implemented in [`runtime`].

pub mod core;
pub mod runtime;

pub use self::core::{CooperativeWorker, IdleBackoff, RoundOutcome};
pub use self::runtime::{EngineOptions, ExecutionService};
