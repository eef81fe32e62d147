// src/cursor/mod.rs

//! Fair iteration over inbound streams.
//!
//! - [`circular`] is an index-based round-robin cursor over an owned list.
//! - [`groups`] partitions streams by priority and activates one group at a
//!   time, in ascending priority order.

pub mod circular;
pub mod groups;

pub use circular::CircularCursor;
pub use groups::PriorityGroups;
