// src/tasklet/processor_tasklet.rs

//! Tasklet driving one processor between its inbound and outbound edges.
//!
//! Every tick runs the same sequence:
//!
//! 1. fill the inbox from the active priority group (round robin),
//! 2. either hand the inbox to the processor, or report an exhausted input
//!    to it, or (once every input is gone) run whole-processor completion,
//! 3. flush the outbox to the collectors, ordinal by ordinal.
//!
//! Each step may stop early without blocking; the fields below always hold
//! a consistent state for the next tick to resume from.

use std::fmt;

use anyhow::bail;
use tracing::{debug, trace};

use crate::cursor::PriorityGroups;
use crate::errors::{Result, SluiceError};
use crate::exchange::{Inbox, Outbox, OutboxItem};
use crate::processor::Processor;
use crate::progress::{ProgressState, ProgressTracker};
use crate::stream::{InboundEdgeStream, OutboundEdgeStream};
use crate::types::{Ordinal, DEFAULT_HIGH_WATER_MARK};

use super::builder::ProcessorTaskletBuilder;
use super::Tasklet;

/// Type-erased inbound stream as held by a tasklet.
pub type BoxedInbound<T> = Box<dyn InboundEdgeStream<T>>;

/// The inbound stream whose items are (or were last) in the inbox.
#[derive(Debug, Clone, Copy)]
struct CurrentInstream {
    ordinal: Ordinal,
    /// The stream reported exhaustion; `complete_edge` has not yet
    /// returned `true` for it.
    exhausted: bool,
}

pub struct ProcessorTasklet<P: Processor> {
    name: String,
    processor: P,
    inbox: Inbox<P::In>,
    outbox: Outbox<P::Out>,
    tracker: ProgressTracker,
    instreams: PriorityGroups<BoxedInbound<P::In>>,
    /// Indexed by outbound ordinal.
    outstreams: Vec<OutboundEdgeStream<P::Out>>,
    current: Option<CurrentInstream>,
    processor_completed: bool,
    force_blocking: bool,
}

impl<P: Processor> ProcessorTasklet<P> {
    pub fn builder() -> ProcessorTaskletBuilder<P> {
        ProcessorTaskletBuilder::new()
    }

    /// Tasklet with the default name and high-water mark.
    ///
    /// Fails when outbound ordinals are not exactly `0..outstreams.len()`.
    pub fn new(
        processor: P,
        instreams: Vec<BoxedInbound<P::In>>,
        outstreams: Vec<OutboundEdgeStream<P::Out>>,
    ) -> Result<Self> {
        Self::from_parts(
            "tasklet".to_string(),
            processor,
            instreams,
            outstreams,
            DEFAULT_HIGH_WATER_MARK,
        )
    }

    pub(crate) fn from_parts(
        name: String,
        processor: P,
        instreams: Vec<BoxedInbound<P::In>>,
        mut outstreams: Vec<OutboundEdgeStream<P::Out>>,
        high_water_mark: usize,
    ) -> Result<Self> {
        if high_water_mark == 0 {
            return Err(SluiceError::InvalidHighWaterMark(high_water_mark));
        }

        outstreams.sort_by_key(OutboundEdgeStream::ordinal);
        for (expected, outstream) in outstreams.iter().enumerate() {
            let found = outstream.ordinal();
            if found < expected {
                return Err(SluiceError::DuplicateOrdinal {
                    kind: "outbound",
                    ordinal: found,
                });
            }
            if found > expected {
                return Err(SluiceError::OrdinalGap { expected, found });
            }
        }

        debug!(
            tasklet = %name,
            inbound = instreams.len(),
            outbound = outstreams.len(),
            high_water_mark,
            "creating processor tasklet"
        );

        Ok(Self {
            name,
            processor,
            inbox: Inbox::new(),
            outbox: Outbox::new(outstreams.len(), high_water_mark),
            tracker: ProgressTracker::new(),
            instreams: PriorityGroups::new(instreams, |stream| stream.priority()),
            outstreams,
            current: None,
            processor_completed: false,
            force_blocking: false,
        })
    }

    /// Report the tasklet as blocking even if the processor does not.
    pub(crate) fn force_blocking(mut self, force: bool) -> Self {
        self.force_blocking = force;
        self
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    pub fn into_processor(self) -> P {
        self.processor
    }

    pub fn inbox(&self) -> &Inbox<P::In> {
        &self.inbox
    }

    pub fn outbox(&self) -> &Outbox<P::Out> {
        &self.outbox
    }

    /// `true` once the processor completed and every outbound entry,
    /// end-of-stream included, was accepted downstream.
    pub fn is_finished(&self) -> bool {
        self.processor_completed && self.outbox.is_empty()
    }

    fn try_fill_inbox(&mut self) -> anyhow::Result<()> {
        let awaiting_edge_completion = self.current.is_some_and(|c| c.exhausted);
        if !self.inbox.is_empty() || awaiting_edge_completion {
            self.tracker.not_done();
            return Ok(());
        }

        let Some(cursor) = self.instreams.active() else {
            return Ok(());
        };
        self.tracker.not_done();

        // At most one pass over the streams the group holds right now.
        let budget = cursor.len();
        for _ in 0..budget {
            let Some(stream) = cursor.value_mut() else {
                break;
            };
            let ordinal = stream.ordinal();
            let result = stream.drain_to(&mut self.inbox)?;
            self.tracker.made_progress(result.made_progress());

            let exhausted = result.is_done();
            self.current = Some(CurrentInstream { ordinal, exhausted });
            if exhausted {
                cursor.remove();
                debug!(tasklet = %self.name, ordinal, "inbound stream exhausted");
            }

            if !cursor.advance() {
                self.instreams.activate_next();
                return Ok(());
            }
            if result.made_progress() || exhausted {
                break;
            }
        }
        Ok(())
    }

    fn try_process_inbox(&mut self) -> anyhow::Result<()> {
        if self.outbox.is_high_water() {
            trace!(tasklet = %self.name, "outbox at high water; not processing");
            self.tracker.not_done();
            return Ok(());
        }
        let Some(current) = self.current else {
            bail!("tasklet '{}' holds input without a current inbound stream", self.name);
        };

        self.tracker.made_progress(true);
        self.processor
            .process(current.ordinal, &mut self.inbox, &mut self.outbox)?;
        if !self.inbox.is_empty() {
            self.tracker.not_done();
        }
        Ok(())
    }

    fn complete_edge(&mut self, ordinal: Ordinal) -> anyhow::Result<()> {
        self.tracker.made_progress(true);
        if self.processor.complete_edge(ordinal, &mut self.outbox)? {
            debug!(tasklet = %self.name, ordinal, "processor completed inbound ordinal");
            self.current = None;
        }
        Ok(())
    }

    fn complete_if_needed(&mut self) -> anyhow::Result<()> {
        if self.processor_completed {
            return Ok(());
        }
        self.tracker.made_progress(true);
        if !self.processor.complete(&mut self.outbox)? {
            self.tracker.not_done();
            return Ok(());
        }
        self.processor_completed = true;
        self.outbox.add_end_of_stream();
        debug!(
            tasklet = %self.name,
            outbound = self.outstreams.len(),
            "processor completed; end-of-stream queued on every outbound ordinal"
        );
        Ok(())
    }

    fn try_flush_outbox(&mut self) -> anyhow::Result<()> {
        for (ordinal, outstream) in self.outstreams.iter_mut().enumerate() {
            while let Some(entry) = self.outbox.front(ordinal) {
                let state = match entry {
                    OutboxItem::Data(item) => outstream.collector().offer(item)?,
                    OutboxItem::EndOfStream => outstream.collector().close()?,
                };
                self.tracker.merge(state);
                if !state.is_done() {
                    break;
                }
                if let Some(OutboxItem::EndOfStream) = self.outbox.pop_front(ordinal) {
                    debug!(tasklet = %self.name, ordinal, "outbound edge closed");
                }
            }
        }
        Ok(())
    }
}

impl<P: Processor> Tasklet for ProcessorTasklet<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self) -> anyhow::Result<()> {
        debug!(tasklet = %self.name, "initialising processor");
        self.processor.init(&mut self.outbox)
    }

    fn is_blocking(&self) -> bool {
        self.force_blocking || self.processor.is_blocking()
    }

    fn tick(&mut self) -> anyhow::Result<ProgressState> {
        self.tracker.reset();
        self.try_fill_inbox()?;

        if self.tracker.is_done() {
            self.complete_if_needed()?;
        } else if !self.inbox.is_empty() {
            self.try_process_inbox()?;
        } else if let Some(current) = self.current.filter(|c| c.exhausted) {
            self.complete_edge(current.ordinal)?;
        }

        self.try_flush_outbox()?;

        let state = self.tracker.to_progress_state();
        trace!(tasklet = %self.name, ?state, "tick finished");
        Ok(state)
    }
}

impl<P: Processor> fmt::Display for ProcessorTasklet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProcessorTasklet{{processor={}}}", self.name)
    }
}

impl<P: Processor> fmt::Debug for ProcessorTasklet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorTasklet")
            .field("name", &self.name)
            .field("inbox_len", &self.inbox.len())
            .field("outbox_len", &self.outbox.total_len())
            .field("current", &self.current)
            .field("processor_completed", &self.processor_completed)
            .finish_non_exhaustive()
    }
}
