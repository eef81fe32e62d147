// src/tasklet/mod.rs

//! The cooperative execution unit.
//!
//! A tasklet is a state-holding step function. An external scheduler calls
//! [`Tasklet::init`] once and then [`Tasklet::tick`] repeatedly; every tick
//! does a bounded amount of non-blocking work and reports what happened as a
//! [`ProgressState`].
//!
//! Concurrency contract:
//! - A tasklet is never ticked concurrently with itself (`tick` takes
//!   `&mut self`). It holds no locks and spawns nothing.
//! - Different tasklets may be ticked on different threads (`Send`).
//! - `NoProgress` means "try again later"; `Done` is returned by exactly one
//!   tick, after which every tick returns `WasAlreadyDone`.
//! - Any error is fatal to the tasklet; the scheduler should stop ticking it.
//!
//! - [`processor_tasklet`] drives one [`Processor`](crate::processor::Processor).
//! - [`builder`] assembles a [`ProcessorTasklet`] and validates its edges.

pub mod builder;
pub mod processor_tasklet;

pub use builder::ProcessorTaskletBuilder;
pub use processor_tasklet::{BoxedInbound, ProcessorTasklet};

use crate::progress::ProgressState;

/// A unit of cooperative work driven by an external scheduler.
pub trait Tasklet: Send {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Called exactly once, before the first tick.
    fn init(&mut self) -> anyhow::Result<()>;

    /// Hint that ticks may block and should run on a dedicated thread.
    fn is_blocking(&self) -> bool;

    /// Do one bounded, non-blocking step of work.
    fn tick(&mut self) -> anyhow::Result<ProgressState>;
}

impl<T: Tasklet + ?Sized> Tasklet for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn init(&mut self) -> anyhow::Result<()> {
        (**self).init()
    }

    fn is_blocking(&self) -> bool {
        (**self).is_blocking()
    }

    fn tick(&mut self) -> anyhow::Result<ProgressState> {
        (**self).tick()
    }
}
