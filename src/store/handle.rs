//! Store handle - the injected entry point consumers hold

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::messages::{Action, NetworkCommand, NetworkResponse, StoreSnapshot};
use crate::network::{NetworkActor, Transport};
use crate::storage::{KeyValueStore, SessionStore};
use crate::store::actor::StoreActor;
use crate::store::state::StoreState;

/// Handle to a running store.
///
/// Cloning is cheap; every clone talks to the same actors. Dropping the last
/// clone stops them.
#[derive(Clone)]
pub struct Store {
    action_tx: mpsc::UnboundedSender<Action>,
    snapshot_rx: watch::Receiver<StoreSnapshot>,
    dispatched: Arc<AtomicU64>,
}

impl Store {
    /// Restores the persisted session and starts the store and network actors.
    /// Must be called from within a Tokio runtime.
    pub fn spawn(transport: Arc<dyn Transport>, storage: Arc<dyn KeyValueStore>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel::<Action>();
        let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
        let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();

        let state = StoreState::new(SessionStore::new(storage));
        let (snapshot_tx, snapshot_rx) = watch::channel(state.to_snapshot());

        let network_actor = NetworkActor::new(transport, net_resp_tx);
        tokio::spawn(network_actor.run(net_cmd_rx));

        let store_actor = StoreActor::new(state, net_cmd_tx, snapshot_tx);
        tokio::spawn(store_actor.run(action_rx, net_resp_rx));

        Store {
            action_tx,
            snapshot_rx,
            dispatched: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn dispatch(&self, action: Action) {
        let counted = !matches!(action, Action::Shutdown);
        if counted {
            self.dispatched.fetch_add(1, Ordering::SeqCst);
        }
        if self.action_tx.send(action).is_err() {
            tracing::warn!("Store is stopped, action dropped");
            if counted {
                self.dispatched.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    /// Latest published state
    pub fn snapshot(&self) -> StoreSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver notified on every transition
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Waits for the first snapshot matching `predicate`. If the store stops
    /// first, the last published snapshot is returned.
    pub async fn wait_for(&self, mut predicate: impl FnMut(&StoreSnapshot) -> bool) -> StoreSnapshot {
        let mut rx = self.snapshot_rx.clone();
        let result = rx.wait_for(|snapshot| predicate(snapshot)).await.map(|s| s.clone());
        match result {
            Ok(snapshot) => snapshot,
            Err(_) => rx.borrow().clone(),
        }
    }

    /// Waits until every action dispatched so far is applied and no request is in flight
    pub async fn settled(&self) -> StoreSnapshot {
        let target = self.dispatched.load(Ordering::SeqCst);
        self.wait_for(|snapshot| snapshot.actions_applied >= target && !snapshot.any_loading())
            .await
    }

    /// Stops both actors and waits for the store to finish
    pub async fn shutdown(self) {
        self.dispatch(Action::Shutdown);
        let mut rx = self.snapshot_rx.clone();
        while rx.changed().await.is_ok() {}
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tokio::sync::oneshot;

    use super::*;
    use crate::constants::{AUTH_TOKEN_KEY, USER_DATA_KEY};
    use crate::error::ApiError;
    use crate::models::LoginPayload;
    use crate::network::ApiRequest;
    use crate::storage::tests::sample_user;
    use crate::storage::{FileStore, MemoryStore};

    /// Answers from a script keyed by `"METHOD path"`
    #[derive(Default)]
    struct ScriptedTransport {
        answers: Mutex<HashMap<String, VecDeque<Result<Value, ApiError>>>>,
        sent: Mutex<Vec<(String, Option<String>)>>,
    }

    impl ScriptedTransport {
        fn answer(self, route: &str, result: Result<Value, ApiError>) -> Self {
            self.answers
                .lock()
                .unwrap()
                .entry(route.to_string())
                .or_default()
                .push_back(result);
            self
        }

        fn sent(&self) -> Vec<(String, Option<String>)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: ApiRequest, token: Option<String>) -> Result<Value, ApiError> {
            let route = format!("{} {}", request.method.as_str(), request.path);
            self.sent.lock().unwrap().push((route.clone(), token));
            self.answers
                .lock()
                .unwrap()
                .get_mut(&route)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| Err(ApiError::Network(format!("no answer scripted for {}", route))))
        }
    }

    /// Holds every request until the test releases it
    #[derive(Default)]
    struct GatedTransport {
        gates: Mutex<VecDeque<oneshot::Receiver<Result<Value, ApiError>>>>,
    }

    impl GatedTransport {
        fn gate(&self) -> oneshot::Sender<Result<Value, ApiError>> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().push_back(rx);
            tx
        }
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn send(&self, _request: ApiRequest, _token: Option<String>) -> Result<Value, ApiError> {
            let gate = self.gates.lock().unwrap().pop_front();
            match gate {
                Some(rx) => rx.await.unwrap_or_else(|_| Err(ApiError::Timeout)),
                None => Err(ApiError::Network("unexpected request".into())),
            }
        }
    }

    fn login_action() -> Action {
        Action::Login(LoginPayload {
            email: "camille@example.com".into(),
            password: "pw".into(),
        })
    }

    fn login_answer() -> Result<Value, ApiError> {
        Ok(json!({
            "code": 200,
            "data": {"user": sample_user(), "token": "jwt-token", "refresh": "refresh-token"},
            "message": "Connexion réussie"
        }))
    }

    #[tokio::test]
    async fn test_login_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(ScriptedTransport::default().answer("POST auth/login", login_answer()));
        let store = Store::spawn(transport.clone(), Arc::new(FileStore::new(dir.path())));

        store.dispatch(login_action());
        let snapshot = store.settled().await;
        assert!(snapshot.is_authenticated());
        assert_eq!(snapshot.auth.error, None);
        store.shutdown().await;

        let offline = Arc::new(ScriptedTransport::default());
        let restarted = Store::spawn(offline.clone(), Arc::new(FileStore::new(dir.path())));
        let snapshot = restarted.snapshot();
        assert!(snapshot.is_authenticated());
        assert_eq!(snapshot.auth.data.token.as_deref(), Some("jwt-token"));
        assert_eq!(snapshot.auth.data.user, Some(sample_user()));
        assert!(offline.sent().is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_storage_when_server_fails() {
        let storage = Arc::new(MemoryStore::new());
        let transport = Arc::new(
            ScriptedTransport::default()
                .answer("POST auth/login", login_answer())
                .answer(
                    "POST auth/logout",
                    Err(ApiError::Server { status: 500, code: None, message: None }),
                ),
        );
        let store = Store::spawn(transport.clone(), storage.clone());

        store.dispatch(login_action());
        store.settled().await;
        store.dispatch(Action::Logout);
        let snapshot = store.settled().await;

        assert!(!snapshot.is_authenticated());
        assert_eq!(snapshot.auth.error, None);
        assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_DATA_KEY).unwrap(), None);

        let sent = transport.sent();
        assert_eq!(sent[0], ("POST auth/login".to_string(), None));
        assert_eq!(sent[1], ("POST auth/logout".to_string(), Some("jwt-token".to_string())));
    }

    #[tokio::test]
    async fn test_loading_is_published_before_the_answer() {
        let storage = Arc::new(MemoryStore::new());
        SessionStore::new(storage.clone())
            .persist("tok", &sample_user(), None)
            .unwrap();
        let transport = Arc::new(GatedTransport::default());
        let release = transport.gate();
        let store = Store::spawn(transport.clone(), storage);

        store.dispatch(Action::FetchSubscriptions);
        let pending = store.wait_for(|s| s.subscription.loading).await;
        assert_eq!(pending.subscription.error, None);

        release
            .send(Ok(json!({"data": {"availableSubscriptions": [{"id": 1}], "activeSubscriptions": []}})))
            .unwrap();
        let snapshot = store.settled().await;
        assert!(!snapshot.subscription.loading);
        assert_eq!(snapshot.subscription.data.available.len(), 1);
    }

    #[tokio::test]
    async fn test_late_answer_to_older_request_is_ignored() {
        let storage = Arc::new(MemoryStore::new());
        SessionStore::new(storage.clone())
            .persist("tok", &sample_user(), None)
            .unwrap();
        let transport = Arc::new(GatedTransport::default());
        let first = transport.gate();
        let second = transport.gate();
        let store = Store::spawn(transport.clone(), storage);

        store.dispatch(Action::FetchJobs);
        store.dispatch(Action::FetchJobs);
        second.send(Ok(json!([{"id": 2, "title": "Serveur"}]))).unwrap();
        let snapshot = store.wait_for(|s| s.jobs.data.listings.len() == 1).await;
        assert!(snapshot.jobs.loading);

        first.send(Ok(json!([{"id": 1}, {"id": 3}]))).unwrap();
        let snapshot = store.settled().await;
        let ids: Vec<u64> = snapshot.jobs.data.listings.items().iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![2]);
        assert!(!snapshot.jobs.loading);
    }
}
