#![allow(dead_code)]

use std::collections::VecDeque;
use std::fmt::Debug;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use anyhow::bail;
use sluice::exchange::{Inbox, Outbox};
use sluice::processor::Processor;
use sluice::progress::ProgressState;
use sluice::stream::{InboundEdgeStream, OutboundCollector, OutboundEdgeStream};
use sluice::types::{Ordinal, Priority};
use tracing::trace;

/// Shared, ordered record of which scripted stream was drained when.
pub type DrainLog = Arc<Mutex<Vec<String>>>;

pub fn drain_log() -> DrainLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// One step of a scripted inbound stream, consumed per `drain_to` call.
#[derive(Debug, Clone)]
pub enum Step<T> {
    /// Deliver these items; more may follow.
    Items(Vec<T>),
    /// Deliver these items and report exhaustion in the same drain.
    Final(Vec<T>),
    /// Deliver nothing this time.
    Idle,
    /// Fail the drain with this message.
    Fail(String),
}

/// Inbound stream that replays a fixed script.
///
/// When the script runs out the stream reports exhaustion; from then on every
/// drain returns `WasAlreadyDone`.
pub struct ScriptedInboundStream<T> {
    name: String,
    ordinal: Ordinal,
    priority: Priority,
    script: VecDeque<Step<T>>,
    exhausted: bool,
    log: Option<DrainLog>,
}

impl<T> ScriptedInboundStream<T> {
    pub fn new(name: &str, ordinal: Ordinal, priority: Priority) -> Self {
        Self {
            name: name.to_string(),
            ordinal,
            priority,
            script: VecDeque::new(),
            exhausted: false,
            log: None,
        }
    }

    /// One batch of `items`, then exhaustion on the next drain.
    pub fn from_items(
        name: &str,
        ordinal: Ordinal,
        priority: Priority,
        items: impl IntoIterator<Item = T>,
    ) -> Self {
        Self::new(name, ordinal, priority).items(items)
    }

    pub fn items(mut self, items: impl IntoIterator<Item = T>) -> Self {
        self.script.push_back(Step::Items(items.into_iter().collect()));
        self
    }

    pub fn final_items(mut self, items: impl IntoIterator<Item = T>) -> Self {
        self.script.push_back(Step::Final(items.into_iter().collect()));
        self
    }

    pub fn idle(mut self) -> Self {
        self.script.push_back(Step::Idle);
        self
    }

    pub fn fail(mut self, message: &str) -> Self {
        self.script.push_back(Step::Fail(message.to_string()));
        self
    }

    pub fn with_log(mut self, log: DrainLog) -> Self {
        self.log = Some(log);
        self
    }
}

impl<T: Send> InboundEdgeStream<T> for ScriptedInboundStream<T> {
    fn ordinal(&self) -> Ordinal {
        self.ordinal
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn drain_to(&mut self, inbox: &mut Inbox<T>) -> anyhow::Result<ProgressState> {
        if let Some(log) = self.log.as_ref() {
            log.lock().unwrap().push(self.name.clone());
        }
        if self.exhausted {
            return Ok(ProgressState::WasAlreadyDone);
        }

        match self.script.pop_front() {
            Some(Step::Items(items)) => {
                let made_progress = !items.is_empty();
                inbox.extend(items);
                Ok(ProgressState::from_facets(made_progress, false))
            }
            Some(Step::Final(items)) => {
                inbox.extend(items);
                self.exhausted = true;
                Ok(ProgressState::Done)
            }
            Some(Step::Idle) => Ok(ProgressState::NoProgress),
            Some(Step::Fail(message)) => bail!("{message}"),
            None => {
                trace!(stream = %self.name, "scripted stream exhausted");
                self.exhausted = true;
                Ok(ProgressState::Done)
            }
        }
    }
}

/// What a [`RecordingCollector`] has seen, shared with the test.
#[derive(Debug)]
pub struct CollectorState<T> {
    pub items: Vec<T>,
    pub close_calls: usize,
    pub rejected_offers: usize,
    pub accepting: bool,
}

impl<T> CollectorState<T> {
    pub fn is_closed(&self) -> bool {
        self.close_calls > 0
    }
}

/// Test-side view of a [`RecordingCollector`].
#[derive(Debug)]
pub struct CollectorProbe<T> {
    state: Arc<Mutex<CollectorState<T>>>,
}

impl<T> Clone for CollectorProbe<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Clone> CollectorProbe<T> {
    pub fn items(&self) -> Vec<T> {
        self.state.lock().unwrap().items.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().is_closed()
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().unwrap().close_calls
    }

    pub fn rejected_offers(&self) -> usize {
        self.state.lock().unwrap().rejected_offers
    }

    /// Stop (or resume) accepting offers and close requests.
    pub fn set_accepting(&self, accepting: bool) {
        self.state.lock().unwrap().accepting = accepting;
    }
}

/// Collector that records every accepted item.
///
/// With a burst limit it accepts `burst` consecutive offers, then refuses the
/// next one, then accepts `burst` again, so a tasklet flushing into it only
/// gets `burst` items through per tick.
pub struct RecordingCollector<T> {
    state: Arc<Mutex<CollectorState<T>>>,
    burst: Option<usize>,
    accepted_in_burst: usize,
    fail_offer: Option<String>,
}

impl<T> RecordingCollector<T> {
    pub fn new() -> (Self, CollectorProbe<T>) {
        let state = Arc::new(Mutex::new(CollectorState {
            items: Vec::new(),
            close_calls: 0,
            rejected_offers: 0,
            accepting: true,
        }));
        let probe = CollectorProbe {
            state: Arc::clone(&state),
        };
        (
            Self {
                state,
                burst: None,
                accepted_in_burst: 0,
                fail_offer: None,
            },
            probe,
        )
    }

    pub fn with_burst(mut self, burst: usize) -> Self {
        self.burst = Some(burst.max(1));
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.fail_offer = Some(message.to_string());
        self
    }
}

impl<T: Clone + Send + 'static> RecordingCollector<T> {
    /// Wrap into an outbound edge for `ordinal`.
    pub fn edge(self, ordinal: Ordinal) -> OutboundEdgeStream<T> {
        OutboundEdgeStream::new(ordinal, self)
    }
}

impl<T: Clone + Send> OutboundCollector<T> for RecordingCollector<T> {
    fn offer(&mut self, item: &T) -> anyhow::Result<ProgressState> {
        if let Some(message) = self.fail_offer.as_ref() {
            bail!("{message}");
        }
        let mut state = self.state.lock().unwrap();
        if state.is_closed() {
            bail!("offer after close");
        }
        let over_burst = self.burst.is_some_and(|b| self.accepted_in_burst >= b);
        if !state.accepting || over_burst {
            self.accepted_in_burst = 0;
            state.rejected_offers += 1;
            trace!(rejected = state.rejected_offers, "collector refused offer");
            return Ok(ProgressState::NoProgress);
        }
        self.accepted_in_burst += 1;
        state.items.push(item.clone());
        Ok(ProgressState::Done)
    }

    fn close(&mut self) -> anyhow::Result<ProgressState> {
        let mut state = self.state.lock().unwrap();
        if !state.accepting {
            return Ok(ProgressState::NoProgress);
        }
        state.close_calls += 1;
        if state.close_calls == 1 {
            Ok(ProgressState::Done)
        } else {
            Ok(ProgressState::WasAlreadyDone)
        }
    }
}

/// One observed call into a [`RecordingProcessor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call<T> {
    Init,
    Process { ordinal: Ordinal, items: Vec<T> },
    CompleteEdge(Ordinal),
    Complete,
}

/// Processor that forwards items to every output ordinal and records every
/// call it receives.
pub struct RecordingProcessor<T> {
    calls: Vec<Call<T>>,
    fan_out: usize,
    take_per_call: Option<usize>,
    edge_refusals: usize,
    complete_refusals: usize,
    fail_on_process: Option<String>,
    blocking: bool,
}

impl<T> RecordingProcessor<T> {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            fan_out: 1,
            take_per_call: None,
            edge_refusals: 0,
            complete_refusals: 0,
            fail_on_process: None,
            blocking: false,
        }
    }

    /// Emit every item `times` times.
    pub fn fan_out(mut self, times: usize) -> Self {
        self.fan_out = times;
        self
    }

    /// Consume at most `n` items per `process` call.
    pub fn take_per_call(mut self, n: usize) -> Self {
        self.take_per_call = Some(n);
        self
    }

    /// Return `false` from the first `n` `complete_edge` calls.
    pub fn refuse_edge_completion(mut self, n: usize) -> Self {
        self.edge_refusals = n;
        self
    }

    /// Return `false` from the first `n` `complete` calls.
    pub fn refuse_completion(mut self, n: usize) -> Self {
        self.complete_refusals = n;
        self
    }

    pub fn fail_on_process(mut self, message: &str) -> Self {
        self.fail_on_process = Some(message.to_string());
        self
    }

    pub fn blocking(mut self, val: bool) -> Self {
        self.blocking = val;
        self
    }

    pub fn calls(&self) -> &[Call<T>] {
        &self.calls
    }

    pub fn complete_calls(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Complete)).count()
    }

    pub fn complete_edge_calls(&self) -> Vec<Ordinal> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::CompleteEdge(ordinal) => Some(*ordinal),
                _ => None,
            })
            .collect()
    }

    /// Items seen by `process`, in order, with the ordinal they came from.
    pub fn processed(&self) -> Vec<(Ordinal, T)>
    where
        T: Clone,
    {
        self.calls
            .iter()
            .flat_map(|c| match c {
                Call::Process { ordinal, items } => {
                    items.iter().map(|i| (*ordinal, i.clone())).collect::<Vec<_>>()
                }
                _ => Vec::new(),
            })
            .collect()
    }
}

impl<T> Default for RecordingProcessor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Processor for RecordingProcessor<T>
where
    T: Clone + Debug + Send + 'static,
{
    type In = T;
    type Out = T;

    fn init(&mut self, _outbox: &mut Outbox<T>) -> anyhow::Result<()> {
        self.calls.push(Call::Init);
        Ok(())
    }

    fn is_blocking(&self) -> bool {
        self.blocking
    }

    fn process(
        &mut self,
        ordinal: Ordinal,
        inbox: &mut Inbox<T>,
        outbox: &mut Outbox<T>,
    ) -> anyhow::Result<()> {
        if let Some(message) = self.fail_on_process.as_ref() {
            bail!("{message}");
        }
        let limit = self.take_per_call.unwrap_or(usize::MAX);
        let mut taken = Vec::new();
        while taken.len() < limit {
            let Some(item) = inbox.poll() else {
                break;
            };
            for _ in 0..self.fan_out {
                outbox.add_to_all(item.clone())?;
            }
            taken.push(item);
        }
        self.calls.push(Call::Process {
            ordinal,
            items: taken,
        });
        Ok(())
    }

    fn complete_edge(&mut self, ordinal: Ordinal, _outbox: &mut Outbox<T>) -> anyhow::Result<bool> {
        self.calls.push(Call::CompleteEdge(ordinal));
        if self.edge_refusals > 0 {
            self.edge_refusals -= 1;
            return Ok(false);
        }
        Ok(true)
    }

    fn complete(&mut self, _outbox: &mut Outbox<T>) -> anyhow::Result<bool> {
        self.calls.push(Call::Complete);
        if self.complete_refusals > 0 {
            self.complete_refusals -= 1;
            return Ok(false);
        }
        Ok(true)
    }
}

/// `Write` sink shared between a job and the test that inspects it.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock().unwrap()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
