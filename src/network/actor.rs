//! Network actor - runs API requests in the Tokio runtime

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::Transport;

/// Network actor that executes request commands concurrently
pub struct NetworkActor {
    transport: Arc<dyn Transport>,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
}

impl NetworkActor {
    pub fn new(
        transport: Arc<dyn Transport>,
        response_tx: mpsc::UnboundedSender<NetworkResponse>,
    ) -> Self {
        NetworkActor {
            transport,
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Execute { ticket, action, request, token }) => {
                            let response_tx = self.response_tx.clone();
                            let transport = Arc::clone(&self.transport);

                            // No cancellation: a late answer is fenced by the store instead
                            self.active_requests.spawn(async move {
                                tracing::info!(
                                    slice = %ticket.slice,
                                    seq = ticket.seq,
                                    action = action.name(),
                                    method = request.method.as_str(),
                                    path = %request.path,
                                    "Executing request"
                                );
                                let result = transport.send(request, token.clone()).await;
                                let response = NetworkResponse { ticket, action, token, result };
                                tracing::info!(
                                    slice = %ticket.slice,
                                    seq = ticket.seq,
                                    ok = response.is_success(),
                                    "Request completed"
                                );
                                let _ = response_tx.send(response);
                            });
                        }

                        Some(NetworkCommand::Shutdown) | None => break,
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.active_requests.join_next() => {}
            }
        }
    }
}
