// src/stream/outbound.rs

use std::fmt;

use crate::progress::ProgressState;
use crate::types::Ordinal;

/// Downstream sink of one outbound edge.
///
/// Both operations are non-blocking. A result that is not `done` means "not
/// accepted yet": the tasklet keeps the item and offers the very same item
/// again on a later tick.
pub trait OutboundCollector<T>: Send {
    /// Try to hand `item` downstream.
    fn offer(&mut self, item: &T) -> anyhow::Result<ProgressState>;

    /// Signal that no more items will follow.
    fn close(&mut self) -> anyhow::Result<ProgressState>;
}

/// Sending end of one DAG edge: an outbound ordinal plus its collector.
pub struct OutboundEdgeStream<T> {
    ordinal: Ordinal,
    collector: Box<dyn OutboundCollector<T>>,
}

impl<T> OutboundEdgeStream<T> {
    pub fn new(ordinal: Ordinal, collector: impl OutboundCollector<T> + 'static) -> Self {
        Self {
            ordinal,
            collector: Box::new(collector),
        }
    }

    pub fn ordinal(&self) -> Ordinal {
        self.ordinal
    }

    pub fn collector(&mut self) -> &mut dyn OutboundCollector<T> {
        self.collector.as_mut()
    }
}

impl<T> fmt::Debug for OutboundEdgeStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundEdgeStream")
            .field("ordinal", &self.ordinal)
            .finish_non_exhaustive()
    }
}
