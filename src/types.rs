use std::str::FromStr;

use serde::Deserialize;

/// Index of a logical input or output slot, relative to one processor.
pub type Ordinal = usize;

/// Priority of an inbound edge. Lower values are drained first.
pub type Priority = i32;

/// Default outbox high-water mark, in buffered entries per ordinal.
pub const DEFAULT_HIGH_WATER_MARK: usize = 2048;

/// Built-in processor kinds selectable from a job file.
///
/// - `Identity`: forward every item unchanged.
/// - `Uppercase`: forward every item upper-cased.
/// - `Count`: count occurrences of each item per input ordinal and emit one
///   summary line per distinct item once all input is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessorKind {
    Identity,
    Uppercase,
    Count,
}

impl Default for ProcessorKind {
    fn default() -> Self {
        ProcessorKind::Identity
    }
}

impl FromStr for ProcessorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "identity" => Ok(ProcessorKind::Identity),
            "uppercase" => Ok(ProcessorKind::Uppercase),
            "count" => Ok(ProcessorKind::Count),
            other => Err(format!(
                "invalid processor kind: {other} (expected \"identity\", \"uppercase\" or \"count\")"
            )),
        }
    }
}
