// src/config/model.rs

use serde::Deserialize;

use crate::types::{Ordinal, Priority, ProcessorKind, DEFAULT_HIGH_WATER_MARK};

/// Top-level job file as read from TOML, before validation.
///
/// ```toml
/// [tasklet]
/// high_water_mark = 2048
///
/// [engine]
/// idle_backoff_min_us = 25
/// idle_backoff_max_ms = 1
///
/// [processor]
/// kind = "uppercase"
///
/// [[source]]
/// name = "primary"
/// ordinal = 0
/// priority = 0
/// items = ["a", "b", "c"]
///
/// [[sink]]
/// name = "out"
/// ordinal = 0
/// ```
///
/// All sections except `[[sink]]` are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub tasklet: TaskletSection,

    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub processor: ProcessorSection,

    #[serde(default)]
    pub source: Vec<SourceConfig>,

    #[serde(default)]
    pub sink: Vec<SinkConfig>,
}

/// Validated job file.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// holding one means sink ordinals are dense and every bound is sane.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub tasklet: TaskletSection,
    pub engine: EngineSection,
    pub processor: ProcessorSection,
    pub source: Vec<SourceConfig>,
    pub sink: Vec<SinkConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            tasklet: raw.tasklet,
            engine: raw.engine,
            processor: raw.processor,
            source: raw.source,
            sink: raw.sink,
        }
    }
}

/// `[tasklet]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskletSection {
    /// Per-ordinal outbox occupancy at which the processor stops being fed.
    #[serde(default = "default_high_water_mark")]
    pub high_water_mark: usize,
}

fn default_high_water_mark() -> usize {
    DEFAULT_HIGH_WATER_MARK
}

impl Default for TaskletSection {
    fn default() -> Self {
        Self {
            high_water_mark: default_high_water_mark(),
        }
    }
}

/// `[engine]` section: idle behaviour of the reference scheduler.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// First sleep after a round in which no tasklet made progress.
    #[serde(default = "default_idle_backoff_min_us")]
    pub idle_backoff_min_us: u64,

    /// Upper bound of the doubling idle sleep.
    #[serde(default = "default_idle_backoff_max_ms")]
    pub idle_backoff_max_ms: u64,

    /// Give up after this many consecutive idle rounds; 0 waits forever.
    #[serde(default)]
    pub max_idle_rounds: u64,
}

fn default_idle_backoff_min_us() -> u64 {
    25
}

fn default_idle_backoff_max_ms() -> u64 {
    1
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            idle_backoff_min_us: default_idle_backoff_min_us(),
            idle_backoff_max_ms: default_idle_backoff_max_ms(),
            max_idle_rounds: 0,
        }
    }
}

/// `[processor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorSection {
    #[serde(default = "default_processor_name")]
    pub name: String,

    #[serde(default)]
    pub kind: ProcessorKind,

    /// Run the processor tasklet on a dedicated thread.
    #[serde(default)]
    pub blocking: bool,
}

fn default_processor_name() -> String {
    "processor".to_string()
}

impl Default for ProcessorSection {
    fn default() -> Self {
        Self {
            name: default_processor_name(),
            kind: ProcessorKind::default(),
            blocking: false,
        }
    }
}

/// `[[source]]` entry: a finite inbound stream of string items.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub name: String,

    /// Processor input slot fed by this source.
    #[serde(default)]
    pub ordinal: Ordinal,

    /// Lower values are drained to exhaustion first.
    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub items: Vec<String>,

    /// Maximum items moved into the inbox per drain.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    64
}

/// `[[sink]]` entry: an outbound edge printed to stdout.
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    pub name: String,

    /// Processor output slot feeding this sink.
    pub ordinal: Ordinal,

    /// Capacity of the channel between the processor and the sink.
    #[serde(default = "default_sink_capacity")]
    pub capacity: usize,
}

fn default_sink_capacity() -> usize {
    1024
}
