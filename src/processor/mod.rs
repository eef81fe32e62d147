// src/processor/mod.rs

//! The processor contract and a few ready-made processors.
//!
//! - [`Processor`] is the capability a tasklet drives: it consumes an
//!   [`Inbox`], appends to an [`Outbox`], and takes part in the completion
//!   protocol.
//! - [`itemwise`] adapts a simpler one-item-at-a-time contract to
//!   [`Processor`].
//! - [`builtin`] holds map / filter / flat-map, a per-ordinal counter and a
//!   line-writing sink.

pub mod builtin;
pub mod itemwise;

pub use builtin::{filter, flat_map, map, CountPerOrdinal, WriteLines};
pub use itemwise::{ItemProcessor, Itemwise};

use crate::exchange::{Inbox, Outbox};
use crate::types::Ordinal;

/// User logic run by a tasklet.
///
/// Every method is called from the tasklet's tick, so none of them may block
/// for an unbounded time. Processors that cannot avoid blocking (file I/O,
/// synchronous clients) say so through [`is_blocking`](Self::is_blocking) and
/// the scheduler runs them on a dedicated thread.
///
/// Errors are returned as-is out of the tick; the tasklet does not retry.
pub trait Processor: Send {
    type In: Send + 'static;
    type Out: Send + 'static;

    /// Called once, before the first tick.
    fn init(&mut self, _outbox: &mut Outbox<Self::Out>) -> anyhow::Result<()> {
        Ok(())
    }

    fn is_blocking(&self) -> bool {
        false
    }

    /// Consume items that arrived on input `ordinal`.
    ///
    /// Taking only part of the inbox is allowed: the rest stays in order and
    /// is offered again on a later tick, before anything else from that
    /// input.
    fn process(
        &mut self,
        ordinal: Ordinal,
        inbox: &mut Inbox<Self::In>,
        outbox: &mut Outbox<Self::Out>,
    ) -> anyhow::Result<()>;

    /// Input `ordinal` is exhausted. Return `false` to be called again.
    fn complete_edge(
        &mut self,
        _ordinal: Ordinal,
        _outbox: &mut Outbox<Self::Out>,
    ) -> anyhow::Result<bool> {
        Ok(true)
    }

    /// All input is exhausted. Return `false` to be called again; once this
    /// returns `true` the outbox is closed and nothing more may be added.
    fn complete(&mut self, _outbox: &mut Outbox<Self::Out>) -> anyhow::Result<bool> {
        Ok(true)
    }
}
