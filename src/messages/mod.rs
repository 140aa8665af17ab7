//! Message types for inter-layer communication in the actor-based architecture.
//!
//! This module defines all messages that flow between consumers, the Store and
//! the Network layers.

pub mod actions;
pub mod network;
pub mod snapshot;

pub use actions::Action;
pub use network::{NetworkCommand, NetworkResponse};
pub use snapshot::StoreSnapshot;
