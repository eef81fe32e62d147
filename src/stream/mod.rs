// src/stream/mod.rs

//! Edge-stream abstractions.
//!
//! - [`inbound`] defines [`InboundEdgeStream`], the non-blocking receiving end
//!   of an edge with its ordinal and priority.
//! - [`outbound`] defines [`OutboundCollector`] and [`OutboundEdgeStream`],
//!   the sending end of an edge.
//! - [`channel`] provides local edges over a bounded tokio mpsc channel.
//! - [`iter`] provides an inbound stream over a finite iterator.

pub mod channel;
pub mod inbound;
pub mod iter;
pub mod outbound;

pub use channel::{channel_edge, ChannelCollector, ChannelInboundStream};
pub use inbound::InboundEdgeStream;
pub use iter::IterInboundStream;
pub use outbound::{OutboundCollector, OutboundEdgeStream};
