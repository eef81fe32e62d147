// src/progress/tracker.rs

use super::state::ProgressState;

/// Accumulates the facets reported by every sub-step of one tick.
///
/// `done` is the default after [`reset`](Self::reset) and only ever gets
/// cleared: each code path that still has pending work must call
/// [`not_done`](Self::not_done).
#[derive(Debug, Clone, Copy)]
pub struct ProgressTracker {
    made_progress: bool,
    is_done: bool,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            made_progress: false,
            is_done: true,
        }
    }

    /// Back to the neutral baseline: no progress, done.
    pub fn reset(&mut self) {
        self.made_progress = false;
        self.is_done = true;
    }

    pub fn made_progress(&mut self, made_progress: bool) {
        self.made_progress |= made_progress;
    }

    pub fn not_done(&mut self) {
        self.is_done = false;
    }

    /// Merge a sub-step's outcome: its progress ORs in, and if it is not
    /// done the tick is not done either.
    pub fn merge(&mut self, state: ProgressState) {
        self.made_progress(state.made_progress());
        if !state.is_done() {
            self.not_done();
        }
    }

    pub fn is_done(&self) -> bool {
        self.is_done
    }

    pub fn to_progress_state(&self) -> ProgressState {
        ProgressState::from_facets(self.made_progress, self.is_done)
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
