// src/progress/state.rs

//! The two-facet outcome of one unit of cooperative work.

/// Outcome of a non-blocking operation or of a whole tick.
///
/// Two independent facets:
/// - *made progress*: some work advanced during the call.
/// - *done*: no further work will ever exist.
///
/// `NoProgress` tells the caller nothing happened and it may back off.
/// `Done` is reported by the call that finished the work; every later call
/// reports `WasAlreadyDone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    /// Nothing advanced, work is still pending.
    NoProgress,
    /// Something advanced, work is still pending.
    MadeProgress,
    /// Nothing advanced because everything was already finished.
    WasAlreadyDone,
    /// Something advanced and everything is now finished.
    Done,
}

impl ProgressState {
    /// Build a state from its two facets.
    pub fn from_facets(made_progress: bool, is_done: bool) -> Self {
        match (made_progress, is_done) {
            (false, false) => ProgressState::NoProgress,
            (true, false) => ProgressState::MadeProgress,
            (false, true) => ProgressState::WasAlreadyDone,
            (true, true) => ProgressState::Done,
        }
    }

    pub fn made_progress(self) -> bool {
        matches!(self, ProgressState::MadeProgress | ProgressState::Done)
    }

    pub fn is_done(self) -> bool {
        matches!(self, ProgressState::WasAlreadyDone | ProgressState::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facets_round_trip_through_every_variant() {
        for (progress, done) in [(false, false), (true, false), (false, true), (true, true)] {
            let state = ProgressState::from_facets(progress, done);
            assert_eq!(state.made_progress(), progress, "{state:?}");
            assert_eq!(state.is_done(), done, "{state:?}");
        }
    }

    #[test]
    fn only_no_progress_invites_backoff() {
        assert_eq!(ProgressState::from_facets(false, false), ProgressState::NoProgress);
        assert!(!ProgressState::WasAlreadyDone.made_progress());
        assert!(ProgressState::Done.made_progress());
    }
}
