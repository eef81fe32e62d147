// src/progress/mod.rs

//! Progress reporting for cooperative, non-blocking work.
//!
//! - [`state`] defines [`ProgressState`], the (made-progress, done) pair every
//!   non-blocking operation returns.
//! - [`tracker`] defines [`ProgressTracker`], which folds the states of all
//!   sub-steps of one tick into a single verdict.

pub mod state;
pub mod tracker;

pub use state::ProgressState;
pub use tracker::ProgressTracker;
