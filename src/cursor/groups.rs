// src/cursor/groups.rs

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use crate::types::Priority;

use super::circular::CircularCursor;

/// Inbound streams partitioned by priority.
///
/// Exactly one group is active at a time and is rotated through a
/// [`CircularCursor`]. Groups are activated in ascending priority order and
/// only once the previous group has lost its last stream, so nothing from a
/// lower-priority group is ever looked at while a higher-priority stream is
/// still alive.
#[derive(Debug)]
pub struct PriorityGroups<S> {
    pending: VecDeque<(Priority, Vec<S>)>,
    active: Option<CircularCursor<S>>,
    active_priority: Option<Priority>,
}

impl<S> PriorityGroups<S> {
    /// Group `streams` by `priority_of`, keeping insertion order inside each
    /// group, and activate the highest-priority group.
    pub fn new<F>(streams: impl IntoIterator<Item = S>, priority_of: F) -> Self
    where
        F: Fn(&S) -> Priority,
    {
        let mut by_priority: BTreeMap<Priority, Vec<S>> = BTreeMap::new();
        for stream in streams {
            by_priority
                .entry(priority_of(&stream))
                .or_default()
                .push(stream);
        }

        let mut groups = Self {
            pending: by_priority.into_iter().collect(),
            active: None,
            active_priority: None,
        };
        groups.activate_next();
        groups
    }

    /// Cursor over the active group, if any group is left.
    pub fn active(&mut self) -> Option<&mut CircularCursor<S>> {
        self.active.as_mut()
    }

    pub fn active_priority(&self) -> Option<Priority> {
        self.active_priority
    }

    /// Number of groups not yet activated.
    pub fn pending_groups(&self) -> usize {
        self.pending.len()
    }

    /// `true` once every group has been activated and emptied.
    pub fn is_exhausted(&self) -> bool {
        self.active.is_none()
    }

    /// Drop the active group and activate the next one in priority order.
    ///
    /// Returns `false` when there is no group left.
    pub fn activate_next(&mut self) -> bool {
        self.active = None;
        self.active_priority = None;

        while let Some((priority, streams)) = self.pending.pop_front() {
            if streams.is_empty() {
                continue;
            }
            debug!(priority, streams = streams.len(), "activating inbound priority group");
            self.active = Some(CircularCursor::new(streams));
            self.active_priority = Some(priority);
            return true;
        }
        false
    }
}
