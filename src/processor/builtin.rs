// src/processor/builtin.rs

//! Ready-made processors.
//!
//! The stateless transforms ([`map`], [`filter`], [`flat_map`]) emit every
//! result to all outbound ordinals. [`CountPerOrdinal`] and [`WriteLines`]
//! are the aggregating and terminal cases.

use std::collections::{BTreeMap, VecDeque};
use std::fmt::Display;
use std::io::Write;
use std::marker::PhantomData;

use anyhow::bail;
use tracing::debug;

use crate::exchange::Outbox;
use crate::types::Ordinal;

use super::itemwise::{ItemProcessor, Itemwise};

/// Emit `f(item)` for every item.
pub fn map<I, O, F>(f: F) -> Itemwise<Map<I, O, F>>
where
    I: Send + 'static,
    O: Clone + Send + 'static,
    F: FnMut(&I) -> O + Send,
{
    Itemwise::new(Map {
        f,
        _types: PhantomData,
    })
}

/// Emit the items for which `predicate` holds.
pub fn filter<T, F>(predicate: F) -> Itemwise<Filter<T, F>>
where
    T: Clone + Send + 'static,
    F: FnMut(&T) -> bool + Send,
{
    Itemwise::new(Filter {
        predicate,
        _types: PhantomData,
    })
}

/// Emit every element of `f(item)`.
///
/// The expansion of one item may span several ticks: emission pauses at the
/// outbox high-water mark and resumes where it stopped, and the input item
/// is only consumed once its whole expansion has been emitted.
pub fn flat_map<I, It, F>(f: F) -> Itemwise<FlatMap<I, It, F>>
where
    I: Send + 'static,
    It: IntoIterator,
    It::Item: Clone + Send + 'static,
    F: FnMut(&I) -> It + Send,
{
    Itemwise::new(FlatMap {
        f,
        pending: VecDeque::new(),
        expanded: false,
        _types: PhantomData,
    })
}

pub struct Map<I, O, F> {
    f: F,
    _types: PhantomData<fn(&I) -> O>,
}

impl<I, O, F> ItemProcessor for Map<I, O, F>
where
    I: Send + 'static,
    O: Clone + Send + 'static,
    F: FnMut(&I) -> O + Send,
{
    type In = I;
    type Out = O;

    fn try_process(
        &mut self,
        _ordinal: Ordinal,
        item: &I,
        outbox: &mut Outbox<O>,
    ) -> anyhow::Result<bool> {
        outbox.add_to_all((self.f)(item))?;
        Ok(true)
    }
}

pub struct Filter<T, F> {
    predicate: F,
    _types: PhantomData<fn(&T)>,
}

impl<T, F> ItemProcessor for Filter<T, F>
where
    T: Clone + Send + 'static,
    F: FnMut(&T) -> bool + Send,
{
    type In = T;
    type Out = T;

    fn try_process(
        &mut self,
        _ordinal: Ordinal,
        item: &T,
        outbox: &mut Outbox<T>,
    ) -> anyhow::Result<bool> {
        if (self.predicate)(item) {
            outbox.add_to_all(item.clone())?;
        }
        Ok(true)
    }
}

pub struct FlatMap<I, It: IntoIterator, F> {
    f: F,
    /// Not yet emitted part of the current item's expansion.
    pending: VecDeque<It::Item>,
    expanded: bool,
    _types: PhantomData<fn(&I) -> It>,
}

impl<I, It, F> ItemProcessor for FlatMap<I, It, F>
where
    I: Send + 'static,
    It: IntoIterator,
    It::Item: Clone + Send + 'static,
    F: FnMut(&I) -> It + Send,
{
    type In = I;
    type Out = It::Item;

    fn try_process(
        &mut self,
        _ordinal: Ordinal,
        item: &I,
        outbox: &mut Outbox<It::Item>,
    ) -> anyhow::Result<bool> {
        if !self.expanded {
            self.pending.extend((self.f)(item));
            self.expanded = true;
        }

        while !self.pending.is_empty() {
            if outbox.is_high_water() {
                return Ok(false);
            }
            if let Some(out) = self.pending.pop_front() {
                outbox.add_to_all(out)?;
            }
        }

        self.expanded = false;
        Ok(true)
    }
}

/// Highest number of inbound ordinals [`CountPerOrdinal`] keeps a slot for.
pub const MAX_COUNTED_ORDINALS: usize = 1 << 16;

/// Counts how often each distinct item arrives on each input ordinal.
///
/// On completion it emits one line per distinct item, in item order:
/// `"<item> observed [<count on 0>, <count on 1>, ..] times"`. An item on an
/// ordinal at or above [`MAX_COUNTED_ORDINALS`] is an error.
#[derive(Debug)]
pub struct CountPerOrdinal<T> {
    counts: BTreeMap<T, Vec<u64>>,
    ordinals_seen: usize,
    summary: Option<VecDeque<String>>,
}

impl<T: Ord> CountPerOrdinal<T> {
    pub fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
            ordinals_seen: 0,
            summary: None,
        }
    }

    /// Counts recorded for `item`, indexed by input ordinal.
    pub fn counts_of(&self, item: &T) -> Option<&[u64]> {
        self.counts.get(item).map(Vec::as_slice)
    }
}

impl<T: Ord> Default for CountPerOrdinal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ItemProcessor for CountPerOrdinal<T>
where
    T: Ord + Clone + Display + Send + 'static,
{
    type In = T;
    type Out = String;

    fn try_process(
        &mut self,
        ordinal: Ordinal,
        item: &T,
        _outbox: &mut Outbox<String>,
    ) -> anyhow::Result<bool> {
        let width = match ordinal.checked_add(1) {
            Some(width) if width <= MAX_COUNTED_ORDINALS => width,
            _ => bail!(
                "cannot count items on inbound ordinal {ordinal} (at most {MAX_COUNTED_ORDINALS} ordinals)"
            ),
        };
        let slots = self.counts.entry(item.clone()).or_default();
        if slots.len() < width {
            slots.resize(width, 0);
        }
        slots[ordinal] += 1;
        self.ordinals_seen = self.ordinals_seen.max(width);
        Ok(true)
    }

    fn complete(&mut self, outbox: &mut Outbox<String>) -> anyhow::Result<bool> {
        let width = self.ordinals_seen;
        let counts = &self.counts;
        let summary = self.summary.get_or_insert_with(|| {
            counts
                .iter()
                .map(|(item, slots)| {
                    let mut padded = slots.clone();
                    padded.resize(width, 0);
                    format!("{item} observed {padded:?} times")
                })
                .collect()
        });

        while !summary.is_empty() {
            if outbox.is_high_water() {
                return Ok(false);
            }
            if let Some(line) = summary.pop_front() {
                outbox.add_to_all(line)?;
            }
        }
        Ok(true)
    }
}

/// Terminal processor writing one line per item.
///
/// Declares itself blocking, since the writer may be a file or a terminal.
pub struct WriteLines<T, W> {
    writer: W,
    prefix: String,
    lines: u64,
    _types: PhantomData<fn(&T)>,
}

impl<T, W: Write> WriteLines<T, W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            prefix: String::new(),
            lines: 0,
            _types: PhantomData,
        }
    }

    /// Prefix every line with `prefix`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<T, W> ItemProcessor for WriteLines<T, W>
where
    T: Display + Send + 'static,
    W: Write + Send,
{
    type In = T;
    type Out = ();

    fn is_blocking(&self) -> bool {
        true
    }

    fn try_process(
        &mut self,
        _ordinal: Ordinal,
        item: &T,
        _outbox: &mut Outbox<()>,
    ) -> anyhow::Result<bool> {
        writeln!(self.writer, "{}{}", self.prefix, item)?;
        self.lines += 1;
        Ok(true)
    }

    fn complete(&mut self, _outbox: &mut Outbox<()>) -> anyhow::Result<bool> {
        self.writer.flush()?;
        debug!(lines = self.lines, prefix = %self.prefix, "line writer completed");
        Ok(true)
    }
}
