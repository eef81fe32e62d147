// src/engine/core.rs

//! Pure, synchronous round runner.
//!
//! A [`CooperativeWorker`] owns a set of tasklets and ticks each live one
//! once per round. It knows nothing about threads, timers or Tokio; the
//! async shell in [`runtime`](super::runtime) decides where a worker runs
//! and how long to wait between idle rounds.
//!
//! The core is intended to be unit tested without any runtime.

use std::fmt;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, trace};

use crate::tasklet::Tasklet;

/// What one call to [`CooperativeWorker::run_round`] observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    /// At least one tasklet made progress.
    pub made_progress: bool,
    /// Tasklets that reported done this round and were dropped.
    pub retired: usize,
    /// Tasklets still live after the round.
    pub live: usize,
}

/// Ticks a group of tasklets in turn until all of them are done.
pub struct CooperativeWorker {
    name: String,
    tasklets: Vec<Box<dyn Tasklet>>,
    initialised: bool,
    rounds: u64,
}

impl CooperativeWorker {
    pub fn new(name: impl Into<String>, tasklets: Vec<Box<dyn Tasklet>>) -> Self {
        Self {
            name: name.into(),
            tasklets,
            initialised: false,
            rounds: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn live(&self) -> usize {
        self.tasklets.len()
    }

    /// `true` once every tasklet has reported done.
    pub fn is_finished(&self) -> bool {
        self.tasklets.is_empty()
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Call `init` on every tasklet. Only the first call has any effect.
    pub fn init_all(&mut self) -> anyhow::Result<()> {
        if self.initialised {
            return Ok(());
        }
        for tasklet in self.tasklets.iter_mut() {
            let name = tasklet.name().to_string();
            tasklet
                .init()
                .with_context(|| format!("tasklet '{name}' failed to initialise"))?;
        }
        self.initialised = true;
        debug!(worker = %self.name, tasklets = self.tasklets.len(), "worker initialised");
        Ok(())
    }

    /// Tick every live tasklet once, retiring those that report done.
    ///
    /// The first error aborts the round; the failing tasklet is named in the
    /// error context and the underlying error is kept as its source.
    pub fn run_round(&mut self) -> anyhow::Result<RoundOutcome> {
        self.init_all()?;
        self.rounds += 1;

        let mut made_progress = false;
        let mut retired = 0usize;
        let mut index = 0usize;
        while index < self.tasklets.len() {
            let tasklet = &mut self.tasklets[index];
            let state = tasklet
                .tick()
                .with_context(|| format!("tasklet '{}' failed", tasklet.name()))?;
            trace!(worker = %self.name, tasklet = tasklet.name(), ?state, "ticked");

            made_progress |= state.made_progress();
            if state.is_done() {
                let done = self.tasklets.remove(index);
                debug!(worker = %self.name, tasklet = done.name(), "tasklet done");
                retired += 1;
            } else {
                index += 1;
            }
        }

        Ok(RoundOutcome {
            made_progress,
            retired,
            live: self.tasklets.len(),
        })
    }
}

impl fmt::Debug for CooperativeWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.tasklets.iter().map(|t| t.name()).collect();
        f.debug_struct("CooperativeWorker")
            .field("name", &self.name)
            .field("tasklets", &names)
            .field("rounds", &self.rounds)
            .finish()
    }
}

/// Doubling sleep between rounds that made no progress.
#[derive(Debug, Clone)]
pub struct IdleBackoff {
    min: Duration,
    max: Duration,
    next: Duration,
    idle_rounds: u64,
}

impl IdleBackoff {
    pub fn new(min: Duration, max: Duration) -> Self {
        let max = max.max(min);
        Self {
            min,
            max,
            next: min,
            idle_rounds: 0,
        }
    }

    /// A round made progress: start over from the minimum.
    pub fn reset(&mut self) {
        self.next = self.min;
        self.idle_rounds = 0;
    }

    /// Record an idle round and return how long to sleep.
    pub fn idle(&mut self) -> Duration {
        self.idle_rounds += 1;
        let current = self.next;
        self.next = (self.next * 2).min(self.max);
        current
    }

    /// Consecutive idle rounds since the last reset.
    pub fn idle_rounds(&self) -> u64 {
        self.idle_rounds
    }
}
