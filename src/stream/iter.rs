// src/stream/iter.rs

use std::iter::Fuse;

use crate::exchange::Inbox;
use crate::progress::ProgressState;
use crate::types::{Ordinal, Priority};

use super::inbound::InboundEdgeStream;

/// Inbound stream over a finite iterator, handed out in bounded batches.
///
/// Exhaustion is only discovered when the iterator returns `None`, so a
/// stream whose last batch was exactly `batch_size` items long reports
/// `Done` on the following drain.
#[derive(Debug)]
pub struct IterInboundStream<I: Iterator> {
    iter: Fuse<I>,
    ordinal: Ordinal,
    priority: Priority,
    batch_size: usize,
    exhausted: bool,
}

impl<I: Iterator> IterInboundStream<I> {
    pub fn new(
        items: impl IntoIterator<IntoIter = I>,
        ordinal: Ordinal,
        priority: Priority,
        batch_size: usize,
    ) -> Self {
        Self {
            iter: items.into_iter().fuse(),
            ordinal,
            priority,
            batch_size: batch_size.max(1),
            exhausted: false,
        }
    }
}

impl<I> InboundEdgeStream<I::Item> for IterInboundStream<I>
where
    I: Iterator + Send,
{
    fn ordinal(&self) -> Ordinal {
        self.ordinal
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn drain_to(&mut self, inbox: &mut Inbox<I::Item>) -> anyhow::Result<ProgressState> {
        if self.exhausted {
            return Ok(ProgressState::WasAlreadyDone);
        }

        let mut drained = 0usize;
        while drained < self.batch_size {
            match self.iter.next() {
                Some(item) => {
                    inbox.push(item);
                    drained += 1;
                }
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }

        Ok(ProgressState::from_facets(
            drained > 0 || self.exhausted,
            self.exhausted,
        ))
    }
}
