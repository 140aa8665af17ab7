//! Network layer - request mapping, envelope decoding and HTTP execution
//!
//! The Network actor receives request commands and sends back outcomes.

pub mod actor;
pub mod client;
pub mod endpoints;
pub mod envelope;

pub use actor::NetworkActor;
pub use client::{HttpTransport, Transport};
pub use endpoints::{ApiRequest, HttpMethod};
