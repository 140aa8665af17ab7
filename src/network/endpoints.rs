//! Maps store actions to REST requests

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::messages::Action;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
        }
    }
}

/// A request relative to the configured API base URL
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Whether the bearer token is attached
    pub authenticated: bool,
}

impl ApiRequest {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            authenticated: true,
        }
    }

    fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::GET, path)
    }

    fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::POST, path)
    }

    fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::PUT, path)
    }

    fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::PATCH, path)
    }

    fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::DELETE, path)
    }

    fn json(mut self, body: &impl Serialize) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Local(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    fn param(mut self, key: &str, value: Option<impl ToString>) -> Self {
        if let Some(value) = value {
            self.query.push((key.to_string(), value.to_string()));
        }
        self
    }

    fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// Request for a remote action, `None` for local-only actions.
///
/// `refresh_token` is the session's refresh token, needed by refresh and logout.
pub fn request_for(action: &Action, refresh_token: Option<&str>) -> Result<Option<ApiRequest>, ApiError> {
    let request = match action {
        // Auth
        Action::Login(payload) => ApiRequest::post("auth/login").json(payload)?.anonymous(),
        Action::Register(payload) => ApiRequest::post("auth/register").json(payload)?.anonymous(),
        Action::Logout => ApiRequest::post("auth/logout").json(&json!({ "refresh": refresh_token }))?,
        Action::FetchProfile => ApiRequest::get("users/profile"),
        Action::UpdateProfile(update) => ApiRequest::put("users/profile").json(update)?,
        Action::RefreshToken => {
            let Some(refresh) = refresh_token else {
                return Err(ApiError::Local(
                    "Aucun jeton de rafraîchissement disponible".to_string(),
                ));
            };
            ApiRequest::post("auth/refresh")
                .json(&json!({ "refresh": refresh }))?
                .anonymous()
        }
        Action::ForgotPassword { email } => ApiRequest::post("auth/forgot-password")
            .json(&json!({ "email": email }))?
            .anonymous(),
        Action::VerifyOtp { email, otp } => ApiRequest::post("auth/verify-otp")
            .json(&json!({ "email": email, "otp": otp }))?
            .anonymous(),
        Action::ResetPassword(reset) => ApiRequest::post("auth/reset-password").json(reset)?.anonymous(),

        // Payments
        Action::ProcessPayment(payment) => ApiRequest::post("payments/process").json(payment)?,
        Action::FetchPaymentHistory => ApiRequest::get("payments/history"),
        Action::FetchPaymentDetails(id) => ApiRequest::get(format!("payments/{}", id)),
        Action::CreatePaymentIntent(intent) => ApiRequest::post("create-payment-intent").json(intent)?,

        // Subscriptions
        Action::FetchSubscriptions => ApiRequest::get("subscriptions"),
        Action::Subscribe { package_id } => {
            ApiRequest::post("subscriptions").json(&json!({ "packageId": package_id }))?
        }
        Action::CancelSubscription(id) => ApiRequest::delete(format!("subscriptions/{}", id)),

        // Statistics
        Action::FetchDashboard => ApiRequest::get("statistics/dashboard"),
        Action::FetchJobStats(job_id) => ApiRequest::get(format!("statistics/job/{}", job_id)),

        // Jobs
        Action::FetchJobs => ApiRequest::get("job-offers"),
        Action::FetchJob(id) => ApiRequest::get(format!("job-offers/{}", id)),
        Action::FetchEmployerJobs => ApiRequest::get("job-offers/employer"),
        Action::SearchJobs(search) => {
            let mut request = ApiRequest::get("job-offers/search");
            request.query = search.to_query();
            request
        }
        Action::PublishJob(draft) => ApiRequest::post("job-offers").json(draft)?,
        Action::UpdateJob { id, draft } => ApiRequest::put(format!("job-offers/{}", id)).json(draft)?,
        Action::DeleteJob(id) => ApiRequest::delete(format!("job-offers/{}", id)),
        Action::ToggleFavorite(id) => ApiRequest::post(format!("favorites/toggle/{}", id)),
        Action::FetchFavorites => ApiRequest::get("favorites"),

        // Flash jobs
        Action::FetchFlashJobs { page, per_page } => ApiRequest::get("flash-jobs")
            .param("page", Some(page))
            .param("per_page", Some(per_page)),
        Action::SearchFlashJobs { location, date } => ApiRequest::get("flash-jobs")
            .param("location", location.as_ref())
            .param("date", date.as_ref()),
        Action::FetchFlashJob(id) => ApiRequest::get(format!("flash-jobs/{}", id)),
        Action::PublishFlashJob(draft) => ApiRequest::post("flash-jobs").json(draft)?,
        Action::UpdateFlashJob { id, draft } => ApiRequest::put(format!("flash-jobs/{}", id)).json(draft)?,
        Action::DeleteFlashJob(id) => ApiRequest::delete(format!("flash-jobs/{}", id)),
        Action::ApplyFlashJob(id) => ApiRequest::post(format!("flash-jobs/{}/apply", id)),

        // Applications
        Action::FetchApplications => ApiRequest::get("applications"),
        Action::CreateApplication(draft) => ApiRequest::post("applications").json(draft)?,
        Action::UpdateApplicationStatus { id, status } => {
            ApiRequest::put(format!("applications/{}/status", id)).json(&json!({ "status": status }))?
        }
        Action::WithdrawApplication(id) => ApiRequest::delete(format!("applications/{}", id)),

        // Messages
        Action::FetchConversations => ApiRequest::get("messages/conversations"),
        Action::FetchMessages(conversation_id) => ApiRequest::get(format!("messages/{}", conversation_id)),
        Action::SendMessage(message) => ApiRequest::post("messages").json(message)?,

        // Apply AI
        Action::FetchAiSuggestions => ApiRequest::get("apply-ai/suggestions"),
        Action::AutoApply(job_id) => ApiRequest::post("apply-ai/apply").json(&json!({ "jobId": job_id }))?,
        Action::FetchAutoApplyHistory => ApiRequest::get("apply-ai/history"),
        Action::FetchApplyAiConfig => ApiRequest::get("apply-ai/config"),
        Action::UpdateApplyAiConfig(config) => ApiRequest::put("apply-ai/config").json(config)?,
        Action::SetAutoApply(enabled) => ApiRequest::patch("apply-ai/config/auto-apply")
            .json(&json!({ "autoApplyEnabled": enabled }))?,

        Action::ToggleNightMode
        | Action::SetNightMode(_)
        | Action::SetSearchBarVisible(_)
        | Action::ShowNotification { .. }
        | Action::HideNotification
        | Action::SetGlobalLoading(_)
        | Action::ClearError(_)
        | Action::Shutdown => return Ok(None),
    };
    Ok(Some(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApplicationStatus, JobSearch, LoginPayload};

    #[test]
    fn test_login_is_anonymous_post() {
        let action = Action::Login(LoginPayload {
            email: "a@b.c".into(),
            password: "secret".into(),
        });
        let request = request_for(&action, None).unwrap().unwrap();
        assert_eq!(request.method, HttpMethod::POST);
        assert_eq!(request.path, "auth/login");
        assert!(!request.authenticated);
        assert_eq!(request.body.unwrap()["password"], "secret");
    }

    #[test]
    fn test_subscription_requests() {
        let subscribe = request_for(&Action::Subscribe { package_id: "pro".into() }, None)
            .unwrap()
            .unwrap();
        assert_eq!(subscribe.body, Some(json!({"packageId": "pro"})));
        assert!(subscribe.authenticated);

        let cancel = request_for(&Action::CancelSubscription(7), None).unwrap().unwrap();
        assert_eq!(cancel.method, HttpMethod::DELETE);
        assert_eq!(cancel.path, "subscriptions/7");
    }

    #[test]
    fn test_refresh_needs_refresh_token() {
        assert!(matches!(
            request_for(&Action::RefreshToken, None),
            Err(ApiError::Local(_))
        ));
        let request = request_for(&Action::RefreshToken, Some("r1")).unwrap().unwrap();
        assert_eq!(request.body, Some(json!({"refresh": "r1"})));
    }

    #[test]
    fn test_search_and_status_update() {
        let search = JobSearch { keyword: Some("cuisine".into()), ..Default::default() };
        let request = request_for(&Action::SearchJobs(search), None).unwrap().unwrap();
        assert_eq!(request.query, vec![("keyword".to_string(), "cuisine".to_string())]);

        let update = Action::UpdateApplicationStatus { id: 4, status: ApplicationStatus::Accepted };
        let request = request_for(&update, None).unwrap().unwrap();
        assert_eq!(request.path, "applications/4/status");
        assert_eq!(request.body, Some(json!({"status": "accepted"})));
    }

    #[test]
    fn test_flash_job_queries() {
        let page = request_for(&Action::FetchFlashJobs { page: 2, per_page: 20 }, None)
            .unwrap()
            .unwrap();
        assert_eq!(page.path, "flash-jobs");
        assert_eq!(
            page.query,
            vec![("page".to_string(), "2".to_string()), ("per_page".to_string(), "20".to_string())]
        );

        let search = Action::SearchFlashJobs { location: Some("Lyon".into()), date: None };
        let request = request_for(&search, None).unwrap().unwrap();
        assert_eq!(request.query, vec![("location".to_string(), "Lyon".to_string())]);
    }

    #[test]
    fn test_favorites_and_auto_apply_routes() {
        let favorites = request_for(&Action::FetchFavorites, None).unwrap().unwrap();
        assert_eq!((favorites.method, favorites.path.as_str()), (HttpMethod::GET, "favorites"));

        let switch = request_for(&Action::SetAutoApply(true), None).unwrap().unwrap();
        assert_eq!(switch.method, HttpMethod::PATCH);
        assert_eq!(switch.body, Some(json!({"autoApplyEnabled": true})));

        let apply = request_for(&Action::AutoApply(12), None).unwrap().unwrap();
        assert_eq!(apply.body, Some(json!({"jobId": 12})));
    }

    #[test]
    fn test_local_actions_have_no_request() {
        assert_eq!(request_for(&Action::ToggleNightMode, None).unwrap(), None);
    }
}
