//! Store transitions - begin on dispatch, fold or reject on response

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, StorageError};
use crate::messages::{Action, NetworkCommand, NetworkResponse};
use crate::models::{
    AiSuggestion, Application, ApplyAiConfig, ApplyOutcome, AuthResponse, AutoApplySwitch,
    ConversationDetails, Conversation, DashboardData, FavoriteToggle, FlashJob, FlashJobPage, Job,
    JobPage, JobStats, Message, Pagination, PaymentIntent, RecoveryStep, Subscription,
    SubscriptionsOverview, TokenPair, Transaction, User,
};
use crate::network::endpoints::request_for;
use crate::network::envelope::{decode, unwrap_envelope};
use crate::store::fence::{Lane, SliceId};
use crate::store::resource::Lifecycle;
use crate::store::state::StoreState;

/// List answers come paginated or as a bare list
#[derive(Deserialize)]
#[serde(untagged)]
enum Paged<T> {
    Page {
        data: Vec<T>,
        #[serde(default)]
        meta: Pagination,
    },
    List(Vec<T>),
}

impl<T> Paged<T> {
    fn into_parts(self) -> (Vec<T>, Pagination) {
        match self {
            Paged::Page { data, meta } => (data, meta),
            Paged::List(data) => {
                let meta = Pagination {
                    total: data.len() as u64,
                    ..Pagination::default()
                };
                (data, meta)
            }
        }
    }
}

/// A refused application is reported in-band with `success: false`
fn accepted(outcome: ApplyOutcome) -> Result<ApplyOutcome, ApiError> {
    if outcome.success {
        Ok(outcome)
    } else {
        Err(ApiError::Server {
            status: 200,
            code: None,
            message: outcome.message,
        })
    }
}

impl StoreState {
    // ========================
    // Dispatch
    // ========================

    /// Applies an action. Returns the request to run for remote actions.
    pub fn apply(&mut self, action: Action) -> Option<NetworkCommand> {
        self.actions_applied += 1;

        match action {
            Action::ToggleNightMode => self.ui.toggle_night_mode(),
            Action::SetNightMode(enabled) => self.ui.night_mode = enabled,
            Action::SetSearchBarVisible(visible) => self.ui.search_bar_visible = visible,
            Action::ShowNotification { message, kind } => self.ui.notify(message, kind),
            Action::HideNotification => self.ui.hide_notification(),
            Action::SetGlobalLoading(loading) => self.ui.global_loading = loading,
            Action::ClearError(slice) => {
                if let Some(lifecycle) = self.lifecycle_mut(slice) {
                    lifecycle.clear_error();
                }
            }
            Action::Shutdown => {}
            Action::Logout => return self.begin_logout(),
            remote => return self.begin_remote(remote),
        }

        None
    }

    /// Preconditions are checked before a ticket is taken, so a request that
    /// never leaves does not disturb the ones in flight
    fn begin_remote(&mut self, action: Action) -> Option<NetworkCommand> {
        let request = match request_for(&action, self.auth.data.refresh_token.as_deref()) {
            Ok(Some(request)) => request,
            Ok(None) => return None,
            Err(error) => {
                self.reject_local(&action, error);
                return None;
            }
        };

        let token = self.auth.data.token.clone();
        if action.requires_auth() && token.is_none() {
            tracing::info!(action = action.name(), "No session, request not sent");
            self.reject_local(&action, ApiError::Unauthorized { message: None });
            return None;
        }

        let slice = action.slice();
        let ticket = self.fence.issue(slice, action.lane());
        if let Some(lifecycle) = self.lifecycle_mut(slice) {
            lifecycle.begin();
        }

        let token = if request.authenticated { token } else { None };
        Some(NetworkCommand::Execute {
            ticket,
            action,
            request,
            token,
        })
    }

    /// Local sign-out happens here, before the server is told
    fn begin_logout(&mut self) -> Option<NetworkCommand> {
        // a sign-in still in flight must not bring the session back
        self.fence.supersede_all(SliceId::Auth);
        let token = self.auth.data.token.take();
        let refresh = self.auth.data.refresh_token.clone();

        self.auth.data.sign_out();
        self.auth.error = None;
        if let Err(e) = self.sessions.clear() {
            self.auth.error = Some(e.display_message());
        }
        tracing::info!("Signed out");

        let request = match (&token, request_for(&Action::Logout, refresh.as_deref())) {
            (Some(_), Ok(Some(request))) => request,
            _ => {
                self.sync_loading(SliceId::Auth);
                return None;
            }
        };
        let ticket = self.fence.issue(SliceId::Auth, Lane::Write);
        self.auth.loading = true;
        Some(NetworkCommand::Execute {
            ticket,
            action: Action::Logout,
            request,
            token,
        })
    }

    // ========================
    // Responses
    // ========================

    pub fn handle_response(&mut self, response: NetworkResponse) {
        let NetworkResponse { ticket, action, token, result } = response;
        let current = self.fence.is_current(&ticket);
        self.fence.settle(&ticket);

        if !current {
            tracing::debug!(
                slice = %ticket.slice,
                seq = ticket.seq,
                action = action.name(),
                "Discarding stale response"
            );
            self.sync_loading(ticket.slice);
            return;
        }

        if action == Action::Logout {
            if let Err(e) = &result {
                tracing::warn!(error = %e, "Remote logout failed, local session already cleared");
            }
        } else if let Err(error) = result.and_then(|payload| self.fold_success(&action, payload)) {
            self.fail(&action, token.as_deref(), error);
        }
        self.sync_loading(ticket.slice);
    }

    /// `loading` stays up while any request of the slice is outstanding
    fn sync_loading(&mut self, slice: SliceId) {
        let in_flight = self.fence.has_in_flight(slice);
        if let Some(lifecycle) = self.lifecycle_mut(slice) {
            lifecycle.set_loading(in_flight);
        }
    }

    /// Remote failure. A 401 ends the session only when the rejected request
    /// carried the token the session still holds.
    fn fail(&mut self, action: &Action, sent_token: Option<&str>, error: ApiError) {
        if error.is_unauthorized() && action.requires_auth() {
            if sent_token.is_some() && sent_token == self.auth.data.token.as_deref() {
                self.expire_session();
            } else {
                tracing::debug!(action = action.name(), "401 for a replaced token, session kept");
            }
        }
        self.reject(action, error);
    }

    /// Failure before anything was sent
    fn reject_local(&mut self, action: &Action, error: ApiError) {
        self.reject(action, error);
        self.sync_loading(action.slice());
    }

    fn reject(&mut self, action: &Action, error: ApiError) {
        let message = error.display_message(action.fallback_message());
        tracing::warn!(action = action.name(), error = %error, %message, "Operation failed");
        if let Some(lifecycle) = self.lifecycle_mut(action.slice()) {
            lifecycle.reject(message);
        }
    }

    fn expire_session(&mut self) {
        if !self.auth.data.is_authenticated {
            return;
        }
        tracing::info!("Session rejected by the server, signing out");
        if let Err(e) = self.sessions.clear() {
            tracing::warn!(error = %e, "Failed to clear expired session");
        }
        self.auth.data.sign_out();
    }

    /// A persisted session that failed to save stays valid in memory
    fn note_storage_failure(&mut self, result: Result<(), StorageError>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist session");
            self.auth.error = Some(e.display_message());
        }
    }

    /// Decodes the payload for `action` and folds it into its slice.
    /// Nothing is written when decoding fails.
    fn fold_success(&mut self, action: &Action, payload: Value) -> Result<(), ApiError> {
        match action {
            // Auth
            Action::Login(_) | Action::Register(_) => {
                let auth: AuthResponse = decode(payload)?;
                let persisted = self.sessions.persist(&auth.token, &auth.user, auth.refresh.as_deref());
                tracing::info!(user_id = auth.user.id, "Signed in");
                self.auth.resolve(|session| session.sign_in_with(auth));
                self.note_storage_failure(persisted);
            }
            Action::FetchProfile | Action::UpdateProfile(_) => {
                let user: User = decode(payload)?;
                let persisted = self.sessions.persist_user(&user);
                self.auth.resolve(|session| session.set_user(user));
                self.note_storage_failure(persisted);
            }
            Action::RefreshToken => {
                let tokens: TokenPair = decode(payload)?;
                let persisted = self.sessions.persist_tokens(&tokens.token, tokens.refresh.as_deref());
                self.auth.resolve(|session| session.rotate_tokens(tokens));
                self.note_storage_failure(persisted);
            }
            Action::ForgotPassword { email } => {
                unwrap_envelope(payload)?;
                self.auth
                    .resolve(|session| session.advance_recovery(email, RecoveryStep::VerifyOtp));
            }
            Action::VerifyOtp { email, .. } => {
                unwrap_envelope(payload)?;
                self.auth.resolve(|session| {
                    session.advance_recovery(email, RecoveryStep::ChooseNewPassword)
                });
            }
            Action::ResetPassword(reset) => {
                unwrap_envelope(payload)?;
                self.auth
                    .resolve(|session| session.advance_recovery(&reset.email, RecoveryStep::Completed));
            }

            // Payments
            Action::ProcessPayment(_) => {
                let transaction: Transaction = decode(payload)?;
                self.payment.resolve(|data| data.record_transaction(transaction));
            }
            Action::FetchPaymentHistory => {
                let history: Vec<Transaction> = decode(payload)?;
                self.payment.resolve(|data| data.history.replace(history));
            }
            Action::FetchPaymentDetails(_) => {
                let transaction: Transaction = decode(payload)?;
                self.payment.resolve(|data| data.current = Some(transaction));
            }
            Action::CreatePaymentIntent(_) => {
                let intent: PaymentIntent = decode(payload)?;
                self.payment
                    .resolve(|data| data.client_secret = Some(intent.client_secret));
            }

            // Subscriptions
            Action::FetchSubscriptions => {
                let overview: SubscriptionsOverview = decode(payload)?;
                self.subscription.resolve(|data| data.replace_all(overview));
            }
            Action::Subscribe { .. } => {
                let subscription: Subscription = decode(payload)?;
                self.subscription.resolve(|data| data.activate(subscription));
            }
            Action::CancelSubscription(id) => {
                unwrap_envelope(payload)?;
                self.subscription.resolve(|data| {
                    data.cancel(*id);
                });
            }

            // Statistics
            Action::FetchDashboard => {
                let dashboard: DashboardData = decode(payload)?;
                self.statistics.resolve(|data| data.dashboard = Some(dashboard));
            }
            Action::FetchJobStats(job_id) => {
                let stats: JobStats = decode(payload)?;
                self.statistics.resolve(|data| data.set_job_stats(*job_id, stats));
            }

            // Jobs
            Action::FetchJobs => {
                let jobs: Vec<Job> = decode(payload)?;
                self.jobs.resolve(|data| data.listings.replace(jobs));
            }
            Action::FetchJob(_) => {
                let job: Job = decode(payload)?;
                self.jobs.resolve(|data| data.current = Some(job));
            }
            Action::FetchEmployerJobs => {
                let jobs: Vec<Job> = decode(payload)?;
                self.jobs.resolve(|data| data.employer_jobs.replace(jobs));
            }
            Action::SearchJobs(search) => {
                let (data, meta) = decode::<Paged<Job>>(payload)?.into_parts();
                self.jobs
                    .resolve(|jobs| jobs.set_search_results(search.clone(), JobPage { data, meta }));
            }
            Action::PublishJob(_) => {
                let job: Job = decode(payload)?;
                self.jobs.resolve(|data| data.publish(job));
            }
            Action::UpdateJob { .. } => {
                let job: Job = decode(payload)?;
                self.jobs.resolve(|data| data.apply_update(job));
            }
            Action::DeleteJob(id) => {
                unwrap_envelope(payload)?;
                self.jobs.resolve(|data| data.remove(*id));
            }
            Action::ToggleFavorite(id) => {
                let toggle: FavoriteToggle = decode(payload)?;
                self.jobs.resolve(|data| data.set_favorite(*id, toggle.is_favorite));
            }
            Action::FetchFavorites => {
                let favorites: Vec<Job> = decode(payload)?;
                self.jobs.resolve(|data| data.set_favorite_jobs(favorites));
            }

            // Flash jobs
            Action::FetchFlashJobs { page, .. } => {
                let (data, mut meta) = decode::<Paged<FlashJob>>(payload)?.into_parts();
                meta.current_page = *page;
                self.flash_jobs
                    .resolve(|flash| flash.merge_page(FlashJobPage { data, meta }));
            }
            Action::SearchFlashJobs { .. } => {
                let (data, _) = decode::<Paged<FlashJob>>(payload)?.into_parts();
                self.flash_jobs.resolve(|flash| flash.set_search_results(data));
            }
            Action::FetchFlashJob(_) => {
                let job: FlashJob = decode(payload)?;
                self.flash_jobs.resolve(|flash| flash.current = Some(job));
            }
            Action::PublishFlashJob(_) => {
                let job: FlashJob = decode(payload)?;
                self.flash_jobs.resolve(|flash| flash.publish(job));
            }
            Action::UpdateFlashJob { .. } => {
                let job: FlashJob = decode(payload)?;
                self.flash_jobs.resolve(|flash| flash.apply_update(job));
            }
            Action::DeleteFlashJob(id) => {
                unwrap_envelope(payload)?;
                self.flash_jobs.resolve(|flash| flash.remove(*id));
            }
            Action::ApplyFlashJob(id) => {
                if let Some(outcome) = decode::<Option<ApplyOutcome>>(payload)? {
                    accepted(outcome)?;
                }
                self.flash_jobs.resolve(|flash| flash.record_application(*id));
            }

            // Applications
            Action::FetchApplications => {
                let applications: Vec<Application> = decode(payload)?;
                self.applications.resolve(|data| data.replace(applications));
            }
            Action::CreateApplication(_) => {
                let application: Application = decode(payload)?;
                self.applications.resolve(|data| data.append(application));
            }
            Action::UpdateApplicationStatus { .. } => {
                let application: Application = decode(payload)?;
                self.applications.resolve(|data| {
                    data.update(application);
                });
            }
            Action::WithdrawApplication(id) => {
                unwrap_envelope(payload)?;
                self.applications.resolve(|data| {
                    data.remove_by_id(id);
                });
            }

            // Messages
            Action::FetchConversations => {
                let conversations: Vec<Conversation> = decode(payload)?;
                self.messages.resolve(|data| data.conversations.replace(conversations));
            }
            Action::FetchMessages(_) => {
                let details: ConversationDetails = decode(payload)?;
                self.messages.resolve(|data| data.open_conversation(details));
            }
            Action::SendMessage(_) => {
                let message: Message = decode(payload)?;
                self.messages.resolve(|data| data.push_sent(message));
            }

            // Apply AI
            Action::FetchAiSuggestions => {
                let suggestions: Vec<AiSuggestion> = decode(payload)?;
                self.apply_ai.resolve(|data| data.suggestions.replace(suggestions));
            }
            Action::AutoApply(job_id) => {
                let outcome = accepted(decode(payload)?)?;
                let applied_to = outcome.job_id.unwrap_or(*job_id);
                let today = Utc::now().date_naive().to_string();
                self.apply_ai.resolve(|data| data.mark_applied(applied_to, today));
            }
            Action::FetchAutoApplyHistory => {
                let history: Vec<AiSuggestion> = decode(payload)?;
                self.apply_ai.resolve(|data| data.history.replace(history));
            }
            Action::FetchApplyAiConfig | Action::UpdateApplyAiConfig(_) => {
                let config: ApplyAiConfig = decode(payload)?;
                self.apply_ai.resolve(|data| data.config = Some(config));
            }
            Action::SetAutoApply(enabled) => {
                let switch: Option<AutoApplySwitch> = decode(payload)?;
                let enabled = switch.map_or(*enabled, |s| s.auto_apply_enabled);
                self.apply_ai.resolve(|data| data.set_auto_apply(enabled));
            }

            other => {
                tracing::warn!(action = other.name(), "Response for a local action ignored");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::constants::{AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_DATA_KEY};
    use crate::models::{LoginPayload, PaymentDetails, PaymentRequest, TransactionStatus};
    use crate::store::fence::Lane;
    use crate::storage::tests::sample_user;
    use crate::storage::{KeyValueStore, MemoryStore, SessionStore};

    fn new_state() -> (StoreState, Arc<MemoryStore>) {
        let backend = Arc::new(MemoryStore::new());
        let state = StoreState::new(SessionStore::new(backend.clone()));
        (state, backend)
    }

    fn signed_in_state() -> (StoreState, Arc<MemoryStore>) {
        let (mut state, backend) = new_state();
        state.sessions.persist("tok", &sample_user(), Some("ref")).unwrap();
        state.auth.data.sign_in("tok".into(), sample_user(), Some("ref".into()));
        (state, backend)
    }

    fn answer(command: NetworkCommand, result: Result<Value, ApiError>) -> NetworkResponse {
        match command {
            NetworkCommand::Execute { ticket, action, token, .. } => NetworkResponse {
                ticket,
                action,
                token,
                result,
            },
            NetworkCommand::Shutdown => panic!("expected a request"),
        }
    }

    fn server_error(status: u16, message: Option<&str>) -> ApiError {
        ApiError::Server {
            status,
            code: None,
            message: message.map(str::to_string),
        }
    }

    fn login() -> Action {
        Action::Login(LoginPayload {
            email: "camille@example.com".into(),
            password: "pw".into(),
        })
    }

    fn payment() -> Action {
        Action::ProcessPayment(PaymentRequest {
            package_id: "standard_pro".into(),
            payment_method: "card".into(),
            payment_details: PaymentDetails::default(),
        })
    }

    fn login_answer(token: &str) -> Result<Value, ApiError> {
        let user = serde_json::to_value(sample_user()).unwrap();
        Ok(json!({"data": {"user": user, "token": token}}))
    }

    fn tx_json(id: &str) -> Value {
        json!({
            "id": id,
            "packageId": "standard_pro",
            "paymentMethod": "card",
            "amount": "44.75",
            "date": "2025-04-06",
            "status": "completed"
        })
    }

    #[test]
    fn test_begin_sets_loading_before_response() {
        let (mut state, _) = signed_in_state();
        state.payment.error = Some("old".into());

        let command = state.apply(Action::FetchPaymentHistory).unwrap();
        assert!(state.payment.loading);
        assert_eq!(state.payment.error, None);

        match &command {
            NetworkCommand::Execute { request, token, .. } => {
                assert_eq!(request.path, "payments/history");
                assert_eq!(token.as_deref(), Some("tok"));
            }
            NetworkCommand::Shutdown => panic!("expected a request"),
        }
    }

    #[test]
    fn test_failure_keeps_data_and_reports_message() {
        let (mut state, _) = signed_in_state();
        state.subscription.data.activate(Subscription::with_id(5));
        let before = state.subscription.data.clone();

        let command = state.apply(Action::CancelSubscription(5)).unwrap();
        state.handle_response(answer(command, Err(server_error(403, Some("Abonnement verrouillé")))));
        assert!(!state.subscription.loading);
        assert_eq!(state.subscription.data, before);
        assert_eq!(state.subscription.error.as_deref(), Some("Abonnement verrouillé"));

        let command = state.apply(Action::CancelSubscription(5)).unwrap();
        state.handle_response(answer(command, Err(server_error(422, None))));
        assert_eq!(
            state.subscription.error.as_deref(),
            Some("Erreur lors de l'annulation de l'abonnement")
        );
    }

    #[test]
    fn test_cancel_subscription_filters_by_id() {
        let (mut state, _) = signed_in_state();
        for id in [5, 7, 9] {
            state.subscription.data.activate(Subscription::with_id(id));
        }

        let command = state.apply(Action::CancelSubscription(7)).unwrap();
        state.handle_response(answer(command, Ok(json!({"message": "Abonnement annulé"}))));

        let ids: Vec<u64> = state.subscription.data.active.items().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![5, 9]);
        assert!(!state.subscription.loading);
        assert_eq!(state.subscription.error, None);
    }

    #[test]
    fn test_process_payment_sets_current_and_appends_once() {
        let (mut state, _) = signed_in_state();
        let command = state.apply(payment()).unwrap();
        state.handle_response(answer(command, Ok(json!({"data": tx_json("tx1")}))));

        let current = state.payment.data.current.clone().unwrap();
        assert_eq!(current.id, "tx1");
        assert_eq!(current.status, TransactionStatus::Completed);
        assert_eq!(current.amount, "44.75");
        assert_eq!(state.payment.data.history.items(), &[current]);
    }

    #[test]
    fn test_fetch_history_replaces_instead_of_appending() {
        let (mut state, _) = signed_in_state();
        let server = json!({"code": 200, "data": [tx_json("a"), tx_json("b")], "message": "ok"});

        for _ in 0..2 {
            let command = state.apply(Action::FetchPaymentHistory).unwrap();
            state.handle_response(answer(command, Ok(server.clone())));
        }
        let ids: Vec<&str> = state.payment.data.history.items().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_login_signs_in_and_persists() {
        let (mut state, backend) = new_state();
        let command = state.apply(login()).unwrap();
        match &command {
            NetworkCommand::Execute { token, .. } => assert_eq!(token, &None),
            NetworkCommand::Shutdown => panic!("expected a request"),
        }

        let user = serde_json::to_value(sample_user()).unwrap();
        state.handle_response(answer(
            command,
            Ok(json!({"data": {"user": user, "token": "jwt", "refresh": "r"}})),
        ));

        assert!(state.auth.data.is_authenticated);
        assert_eq!(backend.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("jwt"));
        assert_eq!(backend.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("r"));
        assert!(backend.get(USER_DATA_KEY).unwrap().is_some());
    }

    #[test]
    fn test_logout_clears_even_when_remote_fails() {
        let (mut state, backend) = signed_in_state();
        let command = state.apply(Action::Logout).unwrap();

        assert!(!state.auth.data.is_authenticated);
        assert_eq!(backend.get(AUTH_TOKEN_KEY).unwrap(), None);
        assert_eq!(backend.get(USER_DATA_KEY).unwrap(), None);

        state.handle_response(answer(command, Err(server_error(500, None))));
        assert!(!state.auth.data.is_authenticated);
        assert!(!state.auth.loading);
        assert_eq!(state.auth.error, None);
    }

    #[test]
    fn test_logout_without_session_sends_nothing() {
        let (mut state, _) = new_state();
        assert!(state.apply(Action::Logout).is_none());
        assert!(!state.auth.loading);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let (mut state, _) = signed_in_state();
        let first = state.apply(Action::FetchJobs).unwrap();
        let second = state.apply(Action::FetchJobs).unwrap();

        state.handle_response(answer(second, Ok(json!([{"id": 2, "title": "récent"}]))));
        assert!(state.jobs.loading);
        state.handle_response(answer(first, Ok(json!([{"id": 1, "title": "ancien"}]))));

        let ids: Vec<u64> = state.jobs.data.listings.items().iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![2]);
        assert!(!state.jobs.loading);
    }

    #[test]
    fn test_unauthorized_expires_session() {
        let (mut state, backend) = signed_in_state();
        let command = state.apply(Action::FetchDashboard).unwrap();
        state.handle_response(answer(command, Err(ApiError::Unauthorized { message: None })));

        assert!(!state.auth.data.is_authenticated);
        assert_eq!(state.auth.data.token, None);
        assert_eq!(backend.get(AUTH_TOKEN_KEY).unwrap(), None);
        assert!(state.statistics.error.is_some());
    }

    #[test]
    fn test_login_failure_does_not_expire() {
        let (mut state, _) = signed_in_state();
        let command = state
            .apply(Action::Login(LoginPayload { email: "x@y.z".into(), password: "bad".into() }))
            .unwrap();
        state.handle_response(answer(
            command,
            Err(ApiError::Unauthorized { message: Some("Identifiants incorrects".into()) }),
        ));
        assert!(state.auth.data.is_authenticated);
        assert_eq!(state.auth.error.as_deref(), Some("Identifiants incorrects"));
    }

    #[test]
    fn test_missing_token_fails_without_request() {
        let (mut state, _) = new_state();
        assert!(state.apply(Action::FetchApplications).is_none());
        assert!(!state.applications.loading);
        assert!(state.applications.error.is_some());

        assert!(state.apply(Action::RefreshToken).is_none());
        assert_eq!(
            state.auth.error.as_deref(),
            Some("Aucun jeton de rafraîchissement disponible")
        );
    }

    #[test]
    fn test_business_error_in_success_answer() {
        let (mut state, _) = signed_in_state();
        let command = state.apply(Action::FetchConversations).unwrap();
        state.handle_response(answer(
            command,
            Ok(json!({"status": "error", "message": "Conversation introuvable"})),
        ));
        assert_eq!(state.messages.error.as_deref(), Some("Conversation introuvable"));
    }

    #[test]
    fn test_decode_error_rejects_with_fallback() {
        let (mut state, _) = signed_in_state();
        let command = state.apply(Action::FetchJob(3)).unwrap();
        state.handle_response(answer(command, Ok(json!({"data": "pas un objet"}))));
        assert_eq!(state.jobs.data.current, None);
        assert_eq!(
            state.jobs.error.as_deref(),
            Some("Impossible de charger les détails de l'offre")
        );
    }

    #[test]
    fn test_double_wrapped_search_results() {
        let (mut state, _) = signed_in_state();
        let command = state.apply(Action::SearchJobs(Default::default())).unwrap();
        state.handle_response(answer(
            command,
            Ok(json!({"data": {"data": [{"id": 8, "title": "Plongeur"}]}})),
        ));
        assert_eq!(state.jobs.data.search.results.len(), 1);
        assert_eq!(state.jobs.data.search.pagination.total, 1);
    }

    #[test]
    fn test_local_actions_and_clear_error() {
        let (mut state, _) = new_state();
        assert!(state.apply(Action::ToggleNightMode).is_none());
        assert!(!state.ui.night_mode);

        state.jobs.error = Some("boom".into());
        state.apply(Action::ClearError(SliceId::Jobs));
        assert_eq!(state.jobs.error, None);
        assert_eq!(state.actions_applied, 2);
    }

    #[test]
    fn test_recovery_steps() {
        let (mut state, _) = new_state();
        let command = state
            .apply(Action::ForgotPassword { email: "a@b.c".into() })
            .unwrap();
        state.handle_response(answer(command, Ok(json!({"message": "OTP envoyé"}))));
        let recovery = state.auth.data.recovery.clone().unwrap();
        assert_eq!(recovery.step, RecoveryStep::VerifyOtp);
        assert_eq!(recovery.email, "a@b.c");
    }

    #[test]
    fn test_success_envelope_is_unwrapped() {
        let (mut state, _) = signed_in_state();
        let command = state.apply(Action::FetchApplications).unwrap();
        state.handle_response(answer(
            command,
            Ok(json!({"success": true, "data": [{"id": 1, "status": "pending"}], "message": "ok"})),
        ));
        assert_eq!(state.applications.data.len(), 1);
        assert_eq!(state.applications.error, None);
    }

    #[test]
    fn test_success_false_is_a_business_error() {
        let (mut state, _) = signed_in_state();
        let command = state.apply(Action::FetchFavorites).unwrap();
        state.handle_response(answer(
            command,
            Ok(json!({"success": false, "data": null, "message": "Favoris indisponibles"})),
        ));
        assert_eq!(state.jobs.error.as_deref(), Some("Favoris indisponibles"));
    }

    #[test]
    fn test_history_refresh_keeps_processed_payment() {
        let (mut state, _) = signed_in_state();
        let pay = state.apply(payment()).unwrap();
        let history = state.apply(Action::FetchPaymentHistory).unwrap();

        state.handle_response(answer(history, Ok(json!([]))));
        assert!(state.payment.loading);

        state.handle_response(answer(pay, Ok(tx_json("tx1"))));
        assert!(!state.payment.loading);
        let current = state.payment.data.current.clone().unwrap();
        assert_eq!(current.id, "tx1");
        assert_eq!(state.payment.data.history.items(), &[current]);
    }

    #[test]
    fn test_fetches_only_supersede_themselves() {
        let (mut state, _) = signed_in_state();
        let details = state.apply(Action::FetchPaymentDetails("tx9".into())).unwrap();
        let history = state.apply(Action::FetchPaymentHistory).unwrap();
        match (&details, &history) {
            (
                NetworkCommand::Execute { ticket: a, .. },
                NetworkCommand::Execute { ticket: b, .. },
            ) => {
                assert_eq!(a.lane, Lane::Read("fetch_payment_details"));
                assert_eq!(b.lane, Lane::Read("fetch_payment_history"));
            }
            _ => panic!("expected requests"),
        }

        state.handle_response(answer(history, Ok(json!([tx_json("a")]))));
        state.handle_response(answer(details, Ok(tx_json("tx9"))));
        assert_eq!(state.payment.data.current.as_ref().map(|t| t.id.as_str()), Some("tx9"));
        assert_eq!(state.payment.data.history.len(), 1);
    }

    #[test]
    fn test_local_failure_leaves_login_in_flight() {
        let (mut state, _) = new_state();
        let pending = state.apply(login()).unwrap();

        assert!(state.apply(Action::RefreshToken).is_none());
        assert!(state.auth.loading);
        assert!(state.auth.error.is_some());

        state.handle_response(answer(pending, login_answer("jwt")));
        assert!(state.auth.data.is_authenticated);
        assert_eq!(state.auth.data.token.as_deref(), Some("jwt"));
        assert!(!state.auth.loading);
        assert_eq!(state.auth.error, None);
    }

    #[test]
    fn test_unauthorized_for_replaced_token_keeps_session() {
        let (mut state, backend) = signed_in_state();
        let dashboard = state.apply(Action::FetchDashboard).unwrap();
        let logout = state.apply(Action::Logout).unwrap();
        let relogin = state.apply(login()).unwrap();
        state.handle_response(answer(logout, Ok(Value::Null)));
        state.handle_response(answer(relogin, login_answer("new-token")));

        state.handle_response(answer(dashboard, Err(ApiError::Unauthorized { message: None })));
        assert!(state.auth.data.is_authenticated);
        assert_eq!(state.auth.data.token.as_deref(), Some("new-token"));
        assert_eq!(backend.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("new-token"));
        assert!(state.statistics.error.is_some());
    }

    #[test]
    fn test_logout_discards_pending_login() {
        let (mut state, _) = signed_in_state();
        let pending = state.apply(login()).unwrap();
        let logout = state.apply(Action::Logout).unwrap();

        state.handle_response(answer(pending, login_answer("late")));
        assert!(!state.auth.data.is_authenticated);
        assert!(state.auth.loading);

        state.handle_response(answer(logout, Ok(Value::Null)));
        assert!(!state.auth.loading);
    }

    #[test]
    fn test_laravel_login_answer() {
        let (mut state, backend) = new_state();
        let command = state.apply(login()).unwrap();
        let user = serde_json::to_value(sample_user()).unwrap();
        state.handle_response(answer(
            command,
            Ok(json!({
                "message": "Connexion réussie",
                "user": user,
                "access_token": "1|laravel",
                "token_type": "Bearer"
            })),
        ));
        assert!(state.auth.data.is_authenticated);
        assert_eq!(state.auth.data.token.as_deref(), Some("1|laravel"));
        assert_eq!(backend.get(REFRESH_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_fetch_favorites() {
        let (mut state, _) = signed_in_state();
        let command = state.apply(Action::FetchFavorites).unwrap();
        state.handle_response(answer(
            command,
            Ok(json!({"success": true, "data": [{"id": 4, "title": "Cuisinier"}], "message": ""})),
        ));
        assert_eq!(state.jobs.data.favorites, vec![4]);
        assert_eq!(state.jobs.data.favorite_jobs.len(), 1);
    }

    #[test]
    fn test_flash_job_pages_and_application() {
        let (mut state, _) = signed_in_state();
        let command = state.apply(Action::FetchFlashJobs { page: 1, per_page: 20 }).unwrap();
        state.handle_response(answer(
            command,
            Ok(json!({"data": {"data": [{"id": 3, "start_time": "2025-06-14T18:00:00"}], "meta": {"current_page": 1, "last_page": 2, "per_page": 20, "total": 2}}})),
        ));
        let command = state.apply(Action::FetchFlashJobs { page: 2, per_page: 20 }).unwrap();
        state.handle_response(answer(command, Ok(json!([{"id": 5, "start_time": "2025-06-15T08:00:00"}]))));
        assert_eq!(state.flash_jobs.data.listings.len(), 2);

        let command = state.apply(Action::ApplyFlashJob(3)).unwrap();
        state.handle_response(answer(
            command,
            Ok(json!({"data": {"success": false, "message": "Cet emploi flash n'est plus disponible"}})),
        ));
        assert_eq!(
            state.flash_jobs.error.as_deref(),
            Some("Cet emploi flash n'est plus disponible")
        );
        assert!(!state.flash_jobs.data.has_applied(3));

        let command = state.apply(Action::ApplyFlashJob(3)).unwrap();
        state.handle_response(answer(command, Ok(json!({"data": {"success": true, "message": "ok"}}))));
        assert!(state.flash_jobs.data.has_applied(3));
        assert_eq!(state.flash_jobs.data.listings.get(&3).map(|j| j.current_applicants), Some(1));
    }

    #[test]
    fn test_auto_apply_marks_suggestion() {
        let (mut state, _) = signed_in_state();
        let command = state.apply(Action::FetchAiSuggestions).unwrap();
        state.handle_response(answer(
            command,
            Ok(json!([{"id": 1, "titre": "Serveur", "matchPercentage": 91}, {"id": 2, "titre": "Barman"}])),
        ));

        let command = state.apply(Action::AutoApply(2)).unwrap();
        state.handle_response(answer(command, Ok(json!({"jobId": 2, "success": true}))));
        let applied = state.apply_ai.data.suggestions.get(&2).cloned().unwrap();
        assert!(applied.applied);
        assert!(applied.applied_date.is_some());
        assert!(!state.apply_ai.data.suggestions.get(&1).unwrap().applied);

        let command = state.apply(Action::SetAutoApply(true)).unwrap();
        state.handle_response(answer(command, Ok(json!({"autoApplyEnabled": true}))));
        assert!(state.apply_ai.data.config.as_ref().unwrap().auto_apply_enabled);
    }
}
