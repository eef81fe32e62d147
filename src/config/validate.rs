// src/config/validate.rs

use std::collections::BTreeSet;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SluiceError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::SluiceError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_sinks(cfg)?;
    validate_tasklet_section(cfg)?;
    validate_engine_section(cfg)?;
    validate_sources(cfg)?;
    validate_sink_ordinals(cfg)?;
    Ok(())
}

fn ensure_has_sinks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.sink.is_empty() {
        return Err(SluiceError::ConfigError(
            "config must contain at least one [[sink]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_tasklet_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.tasklet.high_water_mark == 0 {
        return Err(SluiceError::InvalidHighWaterMark(0));
    }
    Ok(())
}

fn validate_engine_section(cfg: &RawConfigFile) -> Result<()> {
    let engine = &cfg.engine;
    if engine.idle_backoff_min_us == 0 {
        return Err(SluiceError::ConfigError(
            "[engine].idle_backoff_min_us must be >= 1 (got 0)".to_string(),
        ));
    }
    if engine.idle_backoff_min_us > engine.idle_backoff_max_ms.saturating_mul(1000) {
        return Err(SluiceError::ConfigError(format!(
            "[engine].idle_backoff_min_us ({}us) exceeds idle_backoff_max_ms ({}ms)",
            engine.idle_backoff_min_us, engine.idle_backoff_max_ms
        )));
    }
    Ok(())
}

fn validate_sources(cfg: &RawConfigFile) -> Result<()> {
    let mut names = BTreeSet::new();
    for source in cfg.source.iter() {
        if source.name.trim().is_empty() {
            return Err(SluiceError::ConfigError(
                "[[source]] entries must have a non-empty name".to_string(),
            ));
        }
        if !names.insert(source.name.as_str()) {
            return Err(SluiceError::ConfigError(format!(
                "duplicate source name '{}'",
                source.name
            )));
        }
        if source.ordinal >= cfg.source.len() {
            return Err(SluiceError::ConfigError(format!(
                "source '{}' has ordinal {} (must be below the source count {})",
                source.name,
                source.ordinal,
                cfg.source.len()
            )));
        }
        if source.batch_size == 0 {
            return Err(SluiceError::ConfigError(format!(
                "source '{}' has batch_size 0 (must be >= 1)",
                source.name
            )));
        }
    }
    Ok(())
}

fn validate_sink_ordinals(cfg: &RawConfigFile) -> Result<()> {
    let mut ordinals: Vec<_> = cfg.sink.iter().map(|s| s.ordinal).collect();
    ordinals.sort_unstable();

    for (expected, &found) in ordinals.iter().enumerate() {
        if found < expected {
            return Err(SluiceError::DuplicateOrdinal {
                kind: "sink",
                ordinal: found,
            });
        }
        if found > expected {
            return Err(SluiceError::OrdinalGap { expected, found });
        }
    }

    for sink in cfg.sink.iter() {
        if sink.capacity == 0 {
            return Err(SluiceError::ConfigError(format!(
                "sink '{}' has capacity 0 (must be >= 1)",
                sink.name
            )));
        }
    }
    Ok(())
}
