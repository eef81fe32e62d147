// src/exchange/inbox.rs

use std::collections::VecDeque;
use std::collections::vec_deque::{Drain, Iter};

/// Pending input items of the inbound stream currently being served.
///
/// The tasklet only appends to an empty inbox, so at any time every item in
/// it came from the same inbound ordinal, in the order the stream produced
/// them. A processor may take as many items as it likes per call; whatever
/// it leaves behind stays in front, in order, for the next call.
#[derive(Debug)]
pub struct Inbox<T> {
    items: VecDeque<T>,
}

impl<T> Inbox<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Item at the head, without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    /// Remove and return the item at the head.
    pub fn poll(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Append an item at the tail. Used by inbound streams while draining.
    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Remove and yield every item, head first.
    pub fn drain(&mut self) -> Drain<'_, T> {
        self.items.drain(..)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> Default for Inbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for Inbox<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}
