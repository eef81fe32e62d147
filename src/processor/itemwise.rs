// src/processor/itemwise.rs

use crate::exchange::{Inbox, Outbox};
use crate::types::Ordinal;

use super::Processor;

/// One-item-at-a-time processor contract.
///
/// [`try_process`](Self::try_process) returns `false` to leave the item (and
/// everything behind it) in the inbox; the same item comes back on a later
/// call. Wrap in [`Itemwise`] to obtain a [`Processor`].
pub trait ItemProcessor: Send {
    type In: Send + 'static;
    type Out: Send + 'static;

    fn init(&mut self, _outbox: &mut Outbox<Self::Out>) -> anyhow::Result<()> {
        Ok(())
    }

    fn is_blocking(&self) -> bool {
        false
    }

    fn try_process(
        &mut self,
        ordinal: Ordinal,
        item: &Self::In,
        outbox: &mut Outbox<Self::Out>,
    ) -> anyhow::Result<bool>;

    fn complete_edge(
        &mut self,
        _ordinal: Ordinal,
        _outbox: &mut Outbox<Self::Out>,
    ) -> anyhow::Result<bool> {
        Ok(true)
    }

    fn complete(&mut self, _outbox: &mut Outbox<Self::Out>) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// [`Processor`] driving an [`ItemProcessor`] over the inbox head-first.
///
/// Stops early when the item processor declines an item or when the outbox
/// reaches its high-water mark.
#[derive(Debug)]
pub struct Itemwise<P> {
    inner: P,
}

impl<P> Itemwise<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: ItemProcessor> Processor for Itemwise<P> {
    type In = P::In;
    type Out = P::Out;

    fn init(&mut self, outbox: &mut Outbox<Self::Out>) -> anyhow::Result<()> {
        self.inner.init(outbox)
    }

    fn is_blocking(&self) -> bool {
        self.inner.is_blocking()
    }

    fn process(
        &mut self,
        ordinal: Ordinal,
        inbox: &mut Inbox<Self::In>,
        outbox: &mut Outbox<Self::Out>,
    ) -> anyhow::Result<()> {
        while let Some(item) = inbox.peek() {
            if outbox.is_high_water() {
                break;
            }
            if !self.inner.try_process(ordinal, item, outbox)? {
                break;
            }
            inbox.poll();
        }
        Ok(())
    }

    fn complete_edge(
        &mut self,
        ordinal: Ordinal,
        outbox: &mut Outbox<Self::Out>,
    ) -> anyhow::Result<bool> {
        self.inner.complete_edge(ordinal, outbox)
    }

    fn complete(&mut self, outbox: &mut Outbox<Self::Out>) -> anyhow::Result<bool> {
        self.inner.complete(outbox)
    }
}
