// src/stream/channel.rs

//! Local edges backed by a bounded `tokio::sync::mpsc` channel.
//!
//! Only the non-blocking halves of the channel API are used (`try_send` /
//! `try_recv`), so a tasklet on either side never parks its thread. Closing
//! the collector drops the sender; once the receiver has drained what was
//! buffered it observes the disconnect and reports exhaustion.

use anyhow::bail;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::debug;

use crate::exchange::Inbox;
use crate::progress::ProgressState;
use crate::types::{Ordinal, Priority};

use super::inbound::InboundEdgeStream;
use super::outbound::{OutboundCollector, OutboundEdgeStream};

/// Build both ends of a local edge.
///
/// `capacity` is clamped to at least 1. The sending end feeds outbound
/// ordinal `from_ordinal` of the upstream tasklet; the receiving end feeds
/// inbound ordinal `to_ordinal` of the downstream tasklet with `priority`.
pub fn channel_edge<T>(
    capacity: usize,
    from_ordinal: Ordinal,
    to_ordinal: Ordinal,
    priority: Priority,
) -> (OutboundEdgeStream<T>, ChannelInboundStream<T>)
where
    T: Clone + Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        OutboundEdgeStream::new(from_ordinal, ChannelCollector::new(tx)),
        ChannelInboundStream::new(rx, to_ordinal, priority),
    )
}

/// Inbound stream draining a channel receiver.
#[derive(Debug)]
pub struct ChannelInboundStream<T> {
    rx: mpsc::Receiver<T>,
    ordinal: Ordinal,
    priority: Priority,
    batch_limit: Option<usize>,
    exhausted: bool,
}

impl<T> ChannelInboundStream<T> {
    pub fn new(rx: mpsc::Receiver<T>, ordinal: Ordinal, priority: Priority) -> Self {
        Self {
            rx,
            ordinal,
            priority,
            batch_limit: None,
            exhausted: false,
        }
    }

    /// Move at most `limit` items per drain (clamped to at least 1).
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = Some(limit.max(1));
        self
    }
}

impl<T: Send> InboundEdgeStream<T> for ChannelInboundStream<T> {
    fn ordinal(&self) -> Ordinal {
        self.ordinal
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn drain_to(&mut self, inbox: &mut Inbox<T>) -> anyhow::Result<ProgressState> {
        if self.exhausted {
            return Ok(ProgressState::WasAlreadyDone);
        }

        let mut drained = 0usize;
        while self.batch_limit.is_none_or(|limit| drained < limit) {
            match self.rx.try_recv() {
                Ok(item) => {
                    inbox.push(item);
                    drained += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!(ordinal = self.ordinal, "channel inbound stream exhausted");
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

/// Collector pushing into a channel sender.
#[derive(Debug)]
pub struct ChannelCollector<T> {
    tx: Option<mpsc::Sender<T>>,
}

impl<T> ChannelCollector<T> {
    pub fn new(tx: mpsc::Sender<T>) -> Self {
        Self { tx: Some(tx) }
    }
}

impl<T: Clone + Send> OutboundCollector<T> for ChannelCollector<T> {
    fn offer(&mut self, item: &T) -> anyhow::Result<ProgressState> {
        let Some(tx) = self.tx.as_ref() else {
            bail!("item offered to a closed channel collector");
        };
        match tx.try_send(item.clone()) {
            Ok(()) => Ok(ProgressState::Done),
            Err(TrySendError::Full(_)) => Ok(ProgressState::NoProgress),
            Err(TrySendError::Closed(_)) => bail!("downstream receiver of channel edge was dropped"),
        }
    }

    fn close(&mut self) -> anyhow::Result<ProgressState> {
        match self.tx.take() {
            Some(_) => Ok(ProgressState::Done),
            None => Ok(ProgressState::WasAlreadyDone),
        }
    }
}
