// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::EngineSection;
use crate::errors::{Result, SluiceError};
use crate::tasklet::Tasklet;

use super::core::{CooperativeWorker, IdleBackoff};

/// Knobs of the execution service, usually taken from `[engine]`.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub idle_backoff_min: Duration,
    pub idle_backoff_max: Duration,
    /// Fail with [`SluiceError::Stalled`] after this many consecutive idle
    /// rounds of one worker. `0` waits forever.
    pub max_idle_rounds: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from(&EngineSection::default())
    }
}

impl From<&EngineSection> for EngineOptions {
    fn from(section: &EngineSection) -> Self {
        Self {
            idle_backoff_min: Duration::from_micros(section.idle_backoff_min_us),
            idle_backoff_max: Duration::from_millis(section.idle_backoff_max_ms),
            max_idle_rounds: section.max_idle_rounds,
        }
    }
}

/// Runs tasklets to completion on the Tokio runtime.
///
/// Cooperative tasklets share one Tokio task and are ticked round by round.
/// Every blocking tasklet gets its own worker on the blocking thread pool.
/// The first failure cancels every other worker and is returned.
pub struct ExecutionService {
    options: EngineOptions,
}

impl fmt::Debug for ExecutionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionService")
            .field("options", &self.options)
            .finish()
    }
}

impl ExecutionService {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn from_config(section: &EngineSection) -> Self {
        Self::new(EngineOptions::from(section))
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Run every tasklet until it reports done.
    pub async fn run(&self, tasklets: Vec<Box<dyn Tasklet>>) -> Result<()> {
        let (blocking, cooperative): (Vec<_>, Vec<_>) =
            tasklets.into_iter().partition(|t| t.is_blocking());

        info!(
            cooperative = cooperative.len(),
            blocking = blocking.len(),
            "execution service started"
        );

        let cancelled = Arc::new(AtomicBool::new(false));
        let mut workers = JoinSet::new();

        if !cooperative.is_empty() {
            let worker = CooperativeWorker::new("cooperative", cooperative);
            workers.spawn(run_cooperative(worker, self.options, cancelled.clone()));
        }

        for tasklet in blocking {
            let worker = CooperativeWorker::new(tasklet.name().to_string(), vec![tasklet]);
            let options = self.options;
            let cancelled = cancelled.clone();
            workers.spawn_blocking(move || run_blocking(worker, options, cancelled));
        }

        while let Some(joined) = workers.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(join_err) => Err(SluiceError::Other(anyhow::anyhow!(
                    "worker panicked or was cancelled: {join_err}"
                ))),
            };
            if let Err(err) = outcome {
                warn!(error = %err, "worker failed; cancelling remaining workers");
                cancelled.store(true, Ordering::Relaxed);
                workers.abort_all();
                while workers.join_next().await.is_some() {}
                return Err(err);
            }
        }

        info!("execution service finished");
        Ok(())
    }
}

/// Outcome of an idle round: keep going after `sleep`, or give up.
fn on_idle(
    worker: &CooperativeWorker,
    backoff: &mut IdleBackoff,
    options: &EngineOptions,
) -> Result<Duration> {
    let sleep = backoff.idle();
    let rounds = backoff.idle_rounds();
    if options.max_idle_rounds > 0 && rounds >= options.max_idle_rounds {
        warn!(worker = worker.name(), live = worker.live(), rounds, "worker stalled");
        return Err(SluiceError::Stalled {
            live: worker.live(),
            rounds,
        });
    }
    Ok(sleep)
}

async fn run_cooperative(
    mut worker: CooperativeWorker,
    options: EngineOptions,
    cancelled: Arc<AtomicBool>,
) -> Result<()> {
    let mut backoff = IdleBackoff::new(options.idle_backoff_min, options.idle_backoff_max);
    worker.init_all()?;

    while !worker.is_finished() {
        if cancelled.load(Ordering::Relaxed) {
            debug!(worker = worker.name(), "worker cancelled");
            return Ok(());
        }
        let outcome = worker.run_round()?;
        if outcome.made_progress {
            backoff.reset();
            tokio::task::yield_now().await;
        } else {
            let sleep = on_idle(&worker, &mut backoff, &options)?;
            tokio::time::sleep(sleep).await;
        }
    }

    debug!(worker = worker.name(), rounds = worker.rounds(), "worker finished");
    Ok(())
}

fn run_blocking(
    mut worker: CooperativeWorker,
    options: EngineOptions,
    cancelled: Arc<AtomicBool>,
) -> Result<()> {
    let mut backoff = IdleBackoff::new(options.idle_backoff_min, options.idle_backoff_max);
    worker.init_all()?;

    while !worker.is_finished() {
        if cancelled.load(Ordering::Relaxed) {
            debug!(worker = worker.name(), "worker cancelled");
            return Ok(());
        }
        let outcome = worker.run_round()?;
        if outcome.made_progress {
            backoff.reset();
        } else {
            let sleep = on_idle(&worker, &mut backoff, &options)?;
            std::thread::sleep(sleep);
        }
    }

    debug!(worker = worker.name(), rounds = worker.rounds(), "worker finished");
    Ok(())
}
