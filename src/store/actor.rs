//! Store actor - message loop applying actions and network responses

use tokio::sync::{mpsc, watch};

use crate::messages::{Action, NetworkCommand, NetworkResponse, StoreSnapshot};
use crate::store::state::StoreState;

/// Store actor that owns the state tree
pub struct StoreActor {
    state: StoreState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    snapshot_tx: watch::Sender<StoreSnapshot>,
}

impl StoreActor {
    pub fn new(
        state: StoreState,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        snapshot_tx: watch::Sender<StoreSnapshot>,
    ) -> Self {
        StoreActor {
            state,
            network_tx,
            snapshot_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut action_rx: mpsc::UnboundedReceiver<Action>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        self.publish();

        loop {
            tokio::select! {
                action = action_rx.recv() => {
                    match action {
                        Some(Action::Shutdown) | None => {
                            let _ = self.network_tx.send(NetworkCommand::Shutdown);
                            break;
                        }
                        Some(action) => {
                            // Begin is published before the request leaves
                            let command = self.state.apply(action);
                            self.publish();
                            if let Some(command) = command {
                                let _ = self.network_tx.send(command);
                            }
                        }
                    }
                }
                Some(response) = net_rx.recv() => {
                    self.state.handle_response(response);
                    self.publish();
                }
            }
        }

        tracing::info!("Store actor stopped");
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.state.to_snapshot());
    }
}
