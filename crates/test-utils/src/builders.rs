#![allow(dead_code)]

use sluice::config::{
    ConfigFile, EngineSection, ProcessorSection, RawConfigFile, SinkConfig, SourceConfig,
    TaskletSection,
};
use sluice::types::{Ordinal, Priority, ProcessorKind};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                tasklet: TaskletSection::default(),
                engine: EngineSection::default(),
                processor: ProcessorSection::default(),
                source: Vec::new(),
                sink: Vec::new(),
            },
        }
    }

    pub fn with_source(mut self, source: SourceConfig) -> Self {
        self.config.source.push(source);
        self
    }

    pub fn with_sink(mut self, name: &str, ordinal: Ordinal) -> Self {
        self.config.sink.push(SinkConfig {
            name: name.to_string(),
            ordinal,
            capacity: 1024,
        });
        self
    }

    pub fn with_sink_capacity(mut self, name: &str, ordinal: Ordinal, capacity: usize) -> Self {
        self.config.sink.push(SinkConfig {
            name: name.to_string(),
            ordinal,
            capacity,
        });
        self
    }

    pub fn processor_kind(mut self, kind: ProcessorKind) -> Self {
        self.config.processor.kind = kind;
        self
    }

    pub fn blocking_processor(mut self, val: bool) -> Self {
        self.config.processor.blocking = val;
        self
    }

    pub fn high_water_mark(mut self, val: usize) -> Self {
        self.config.tasklet.high_water_mark = val;
        self
    }

    pub fn max_idle_rounds(mut self, val: u64) -> Self {
        self.config.engine.max_idle_rounds = val;
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `SourceConfig`.
pub struct SourceConfigBuilder {
    source: SourceConfig,
}

impl SourceConfigBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            source: SourceConfig {
                name: name.to_string(),
                ordinal: 0,
                priority: 0,
                items: Vec::new(),
                batch_size: 64,
            },
        }
    }

    pub fn ordinal(mut self, ordinal: Ordinal) -> Self {
        self.source.ordinal = ordinal;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.source.priority = priority;
        self
    }

    pub fn items(mut self, items: &[&str]) -> Self {
        self.source.items = items.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn batch_size(mut self, val: usize) -> Self {
        self.source.batch_size = val;
        self
    }

    pub fn build(self) -> SourceConfig {
        self.source
    }
}
