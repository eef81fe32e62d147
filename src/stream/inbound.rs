// src/stream/inbound.rs

use crate::exchange::Inbox;
use crate::progress::ProgressState;
use crate::types::{Ordinal, Priority};

/// Receiving end of one DAG edge, as seen by the tasklet that consumes it.
///
/// Implementations wrap whatever actually carries the items (a local queue,
/// a network endpoint, a finite collection) and must never block.
pub trait InboundEdgeStream<T>: Send {
    /// Input slot of the processor this stream feeds.
    fn ordinal(&self) -> Ordinal;

    /// Lower values are drained to exhaustion before higher ones are touched.
    fn priority(&self) -> Priority;

    /// Move every item that is ready right now into `inbox`, in arrival order.
    ///
    /// Report `made_progress` when anything moved and `done` once the stream
    /// is permanently exhausted. Once a stream has reported `done` it must
    /// keep doing so and never append further items.
    fn drain_to(&mut self, inbox: &mut Inbox<T>) -> anyhow::Result<ProgressState>;
}

impl<T, S> InboundEdgeStream<T> for Box<S>
where
    S: InboundEdgeStream<T> + ?Sized,
{
    fn ordinal(&self) -> Ordinal {
        (**self).ordinal()
    }

    fn priority(&self) -> Priority {
        (**self).priority()
    }

    fn drain_to(&mut self, inbox: &mut Inbox<T>) -> anyhow::Result<ProgressState> {
        (**self).drain_to(inbox)
    }
}
