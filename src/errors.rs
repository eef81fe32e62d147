// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Errors raised by user-supplied capabilities (processors, edge streams,
//! collectors) are plain `anyhow::Error`s and travel out of
//! [`Tasklet::tick`](crate::tasklet::Tasklet::tick) untouched. `SluiceError`
//! covers what this crate itself can reject: bad construction, bad config,
//! and a stalled engine.

use thiserror::Error;

use crate::types::Ordinal;

#[derive(Error, Debug)]
pub enum SluiceError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Tasklet '{0}' has no processor")]
    MissingProcessor(String),

    #[error("Duplicate {kind} ordinal {ordinal}")]
    DuplicateOrdinal { kind: &'static str, ordinal: Ordinal },

    #[error("Outbound ordinals must be dense: expected {expected}, found {found}")]
    OrdinalGap { expected: Ordinal, found: Ordinal },

    #[error("High-water mark must be >= 1 (got {0})")]
    InvalidHighWaterMark(usize),

    #[error("Unknown outbound ordinal {ordinal} (outbox has {bucket_count} buckets)")]
    UnknownOrdinal { ordinal: Ordinal, bucket_count: usize },

    #[error("Outbox is closed: end-of-stream was already emitted")]
    OutboxClosed,

    #[error("Engine stalled: {live} tasklet(s) made no progress for {rounds} rounds")]
    Stalled { live: usize, rounds: u64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SluiceError>;
