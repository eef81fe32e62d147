// src/exchange/outbox.rs

use std::collections::VecDeque;

use tracing::trace;

use crate::errors::{Result, SluiceError};
use crate::types::Ordinal;

/// One entry of an outbound bucket.
///
/// `EndOfStream` is appended exactly once per bucket, after the processor
/// reported completion, and is always the last entry the bucket ever holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboxItem<T> {
    Data(T),
    EndOfStream,
}

/// Bounded output buffer: one FIFO bucket per outbound ordinal.
///
/// Processors append through [`add`](Self::add) / [`add_to_all`](Self::add_to_all);
/// the tasklet removes entries only after the matching collector accepted
/// them. The bound is soft: `add` never refuses an item for size reasons,
/// instead [`is_high_water`](Self::is_high_water) tells the tasklet (and
/// well-behaved processors) to stop producing until the buckets drain.
#[derive(Debug)]
pub struct Outbox<T> {
    buckets: Vec<VecDeque<OutboxItem<T>>>,
    high_water_mark: usize,
    closed: bool,
}

impl<T> Outbox<T> {
    pub fn new(bucket_count: usize, high_water_mark: usize) -> Self {
        Self {
            buckets: (0..bucket_count).map(|_| VecDeque::new()).collect(),
            high_water_mark,
            closed: false,
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    /// Number of buffered entries for `ordinal` (0 for an unknown ordinal).
    pub fn len(&self, ordinal: Ordinal) -> usize {
        self.buckets.get(ordinal).map_or(0, VecDeque::len)
    }

    /// Number of buffered entries across all buckets.
    pub fn total_len(&self) -> usize {
        self.buckets.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(VecDeque::is_empty)
    }

    /// `true` once end-of-stream has been appended to every bucket.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// `true` when any bucket holds at least `high_water_mark` entries.
    pub fn is_high_water(&self) -> bool {
        self.buckets
            .iter()
            .any(|bucket| bucket.len() >= self.high_water_mark)
    }

    pub fn is_high_water_at(&self, ordinal: Ordinal) -> bool {
        self.len(ordinal) >= self.high_water_mark
    }

    /// Append `item` to the bucket of `ordinal`.
    pub fn add(&mut self, ordinal: Ordinal, item: T) -> Result<()> {
        self.ensure_open()?;
        let bucket_count = self.buckets.len();
        let bucket = self
            .buckets
            .get_mut(ordinal)
            .ok_or(SluiceError::UnknownOrdinal {
                ordinal,
                bucket_count,
            })?;
        bucket.push_back(OutboxItem::Data(item));
        Ok(())
    }

    /// Entry at the head of `ordinal`'s bucket.
    pub(crate) fn front(&self, ordinal: Ordinal) -> Option<&OutboxItem<T>> {
        self.buckets.get(ordinal).and_then(VecDeque::front)
    }

    pub(crate) fn pop_front(&mut self, ordinal: Ordinal) -> Option<OutboxItem<T>> {
        self.buckets.get_mut(ordinal).and_then(VecDeque::pop_front)
    }

    /// Append end-of-stream to every bucket. Later calls are no-ops.
    pub(crate) fn add_end_of_stream(&mut self) {
        if self.closed {
            return;
        }
        for bucket in self.buckets.iter_mut() {
            bucket.push_back(OutboxItem::EndOfStream);
        }
        self.closed = true;
        trace!(buckets = self.buckets.len(), "appended end-of-stream to outbox");
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(SluiceError::OutboxClosed);
        }
        Ok(())
    }
}

impl<T: Clone> Outbox<T> {
    /// Append a copy of `item` to every bucket.
    pub fn add_to_all(&mut self, item: T) -> Result<()> {
        self.ensure_open()?;
        if let Some((last, rest)) = self.buckets.split_last_mut() {
            for bucket in rest {
                bucket.push_back(OutboxItem::Data(item.clone()));
            }
            last.push_back(OutboxItem::Data(item));
        }
        Ok(())
    }
}
