//! # Gojob client
//!
//! Remote-backed state store for the Gojob job marketplace API.
//!
//! ## Features
//! - Session with restore-once persistence and expiry on 401
//! - Payments, subscriptions, statistics, jobs, flash jobs, applications,
//!   messages and automatic-application slices
//! - Request fencing: a fetch is superseded by a later run of the same fetch,
//!   mutation answers always land
//! - One typed response-envelope decoder
//! - Locally cached document lists
//!
//! ## Architecture
//! Actor-based with channels:
//! - Store Layer - owns the state tree, applies actions, publishes snapshots
//! - Network Layer (Tokio) - runs requests concurrently through a `Transport`

pub mod config;
pub mod constants;
pub mod error;
pub mod messages;
pub mod models;
pub mod network;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ApiError, StorageError};
pub use messages::{Action, NetworkCommand, NetworkResponse, StoreSnapshot};
pub use network::{HttpTransport, NetworkActor, Transport};
pub use storage::{DocumentCache, FileStore, KeyValueStore, MemoryStore, SessionStore};
pub use store::{Collection, Keyed, Remote, SliceId, Store};
