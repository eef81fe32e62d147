// src/exchange/mod.rs

//! Buffers exchanged between a tasklet and its processor.
//!
//! - [`inbox`] holds input items of the inbound stream currently served.
//! - [`outbox`] holds output per outbound ordinal until collectors accept it,
//!   and carries the high-water mark used for backpressure.

pub mod inbox;
pub mod outbox;

pub use inbox::Inbox;
pub use outbox::{Outbox, OutboxItem};
