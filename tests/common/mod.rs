#![allow(dead_code)]

pub use sluice_test_utils::{builders, fakes, init_tracing, with_timeout};

use sluice::progress::ProgressState;
use sluice::tasklet::Tasklet;

/// `init` the tasklet, then tick it until it reports done.
///
/// Returns every state observed, the terminal one included. Panics if the
/// tasklet is still not done after `max_ticks` ticks.
pub fn run_to_completion<T: Tasklet + ?Sized>(tasklet: &mut T, max_ticks: usize) -> Vec<ProgressState> {
    tasklet.init().expect("init failed");
    tick_until_done(tasklet, max_ticks)
}

/// Tick an already initialised tasklet until it reports done.
pub fn tick_until_done<T: Tasklet + ?Sized>(tasklet: &mut T, max_ticks: usize) -> Vec<ProgressState> {
    let mut states = Vec::new();
    for _ in 0..max_ticks {
        let state = tasklet.tick().expect("tick failed");
        states.push(state);
        if state.is_done() {
            return states;
        }
    }
    panic!("tasklet not done after {max_ticks} ticks: {states:?}");
}
