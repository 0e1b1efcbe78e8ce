//! Inbound adapters that keep framework details at the edge.

pub mod http;
