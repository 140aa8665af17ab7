//! Network messages - communication between Store and Network layers

use serde_json::Value;

use crate::error::ApiError;
use crate::messages::Action;
use crate::network::endpoints::ApiRequest;
use crate::store::Ticket;

/// Commands sent from Store layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Execute an API request for a dispatched action
    Execute {
        ticket: Ticket,
        action: Action,
        request: ApiRequest,
        token: Option<String>,
    },

    /// Shutdown the network actor
    Shutdown,
}

/// Outcome of an executed request, echoing the ticket, action and bearer token
/// it was sent with
#[derive(Debug, Clone)]
pub struct NetworkResponse {
    pub ticket: Ticket,
    pub action: Action,
    pub token: Option<String>,
    pub result: Result<Value, ApiError>,
}

impl NetworkResponse {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}
