//! HTTP inbound adapter: health probes and the injected store state.

pub mod health;
pub mod state;
