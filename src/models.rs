use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::Keyed;

// ========================
// Accounts
// ========================

/// Account role
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employer,
    Candidate,
    Admin,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Authenticated user profile
///
/// Fields the client does not model are kept in `extra` so a stored profile
/// restores exactly as the server sent it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_details: Option<ProfileDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Name to show, falling back to first/last name, then email
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            self.email.clone()
        } else {
            parts.join(" ")
        }
    }

    pub fn is_employer(&self) -> bool {
        self.role == Role::Employer
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginPayload")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl fmt::Debug for RegisterPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterPayload")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("password", &"***")
            .finish()
    }
}

/// Login / registration answer. Laravel deployments name the token `access_token`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    #[serde(alias = "access_token")]
    pub token: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Refresh answer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(alias = "access_token")]
    pub token: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordReset {
    pub email: String,
    pub otp: String,
    pub password: String,
    pub password_confirmation: String,
}

impl fmt::Debug for PasswordReset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordReset")
            .field("email", &self.email)
            .field("otp", &"***")
            .field("password", &"***")
            .finish()
    }
}

/// Where the user is in the forgotten-password flow
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStep {
    VerifyOtp,
    ChooseNewPassword,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecoveryState {
    pub email: String,
    pub step: RecoveryStep,
}

// ========================
// Payments
// ========================

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvc: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked = self.number.as_deref().map(|n| {
            let tail: String = n.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
            format!("****{}", tail)
        });
        f.debug_struct("PaymentDetails")
            .field("number", &masked)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub package_id: String,
    pub payment_method: String,
    pub payment_details: PaymentDetails,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(default)]
    pub package_id: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub date: String,
    pub status: TransactionStatus,
}

impl Keyed for Transaction {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Body of `create-payment-intent`; amount is in cents
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    pub plan_id: String,
    pub amount: u64,
    pub currency: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    #[serde(rename = "clientSecret", alias = "client_secret")]
    pub client_secret: String,
}

// ========================
// Subscriptions
// ========================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subscription {
    pub fn with_id(id: u64) -> Self {
        Subscription {
            id,
            name: String::new(),
            price: 0.0,
            description: None,
            features: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl Keyed for Subscription {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionsOverview {
    #[serde(default)]
    pub available_subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub active_subscriptions: Vec<Subscription>,
}

// ========================
// Statistics
// ========================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub values: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveJobSummary {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub cv_count: u64,
    #[serde(default)]
    pub cv_rate: f64,
}

/// Employer dashboard figures
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardData {
    pub total_applications: u64,
    pub total_views: u64,
    pub cv_rate: f64,
    pub active_jobs: u64,
    pub views_data: ChartSeries,
    pub application_data: ChartSeries,
    pub active_jobs_data: Vec<ActiveJobSummary>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyStats {
    pub labels: Vec<String>,
    pub views: Vec<u64>,
    pub applications: Vec<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub applications: u64,
    #[serde(default)]
    pub conversion_rate: f64,
    #[serde(default)]
    pub daily_stats: DailyStats,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ========================
// Jobs
// ========================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryPeriod {
    Hour,
    Month,
    /// Whole mission, used by flash jobs
    Total,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Salary {
    pub amount: f64,
    pub period: SalaryPeriod,
}

/// Job offer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<Salary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub is_urgent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Keyed for Job {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }
}

/// Body for publishing or editing a job offer
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Salary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_urgent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
}

/// Search filters, sent as query parameters
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSearch {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub contract_type: Option<String>,
    pub salary_min: Option<u64>,
    pub salary_max: Option<u64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl JobSearch {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                query.push((key.to_string(), value));
            }
        };
        push("keyword", self.keyword.clone());
        push("location", self.location.clone());
        push("contract_type", self.contract_type.clone());
        push("salary_min", self.salary_min.map(|v| v.to_string()));
        push("salary_max", self.salary_max.map(|v| v.to_string()));
        push("page", self.page.map(|v| v.to_string()));
        push("per_page", self.per_page.map(|v| v.to_string()));
        query
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            current_page: 1,
            last_page: 1,
            per_page: 20,
            total: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobPage {
    pub data: Vec<Job>,
    #[serde(default)]
    pub meta: Pagination,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FavoriteToggle {
    #[serde(rename = "isFavorite", alias = "is_favorite")]
    pub is_favorite: bool,
}

// ========================
// Flash jobs
// ========================

/// Short-notice mission: a job offer plus its time slot and head count
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlashJob {
    #[serde(default)]
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub is_filled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_applicants: Option<u32>,
    #[serde(default)]
    pub current_applicants: u32,
    #[serde(flatten)]
    pub job: Job,
}

impl Keyed for FlashJob {
    type Key = u64;

    fn key(&self) -> u64 {
        self.job.id
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub contact_methods: Vec<String>,
}

/// Body for publishing or editing a flash job. Photos are not sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlashJobDraft {
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<Salary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub contact_details: ContactDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_applicants: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlashJobPage {
    pub data: Vec<FlashJob>,
    #[serde(default)]
    pub meta: Pagination,
}

/// Answer to an application, flash or automatic
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<u64>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ========================
// Apply AI
// ========================

/// Offer proposed by the matching service
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSuggestion {
    pub id: u64,
    #[serde(rename = "titre", alias = "title", default)]
    pub title: String,
    #[serde(rename = "entreprise", alias = "company", default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub match_percentage: f64,
    #[serde(default)]
    pub match_reasons: Vec<String>,
    #[serde(default)]
    pub applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Keyed for AiSuggestion {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }
}

/// Automatic application preferences
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyAiConfig {
    #[serde(default)]
    pub job_preferences: Vec<String>,
    #[serde(default)]
    pub location_preferences: Vec<String>,
    #[serde(default)]
    pub skills_highlight: Vec<String>,
    #[serde(default)]
    pub auto_apply_enabled: bool,
    #[serde(default)]
    pub notifications_enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoApplySwitch {
    pub auto_apply_enabled: bool,
}

// ========================
// Applications
// ========================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Accepted,
    Rejected,
    Withdrawn,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<u64>,
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Keyed for Application {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDraft {
    pub job_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
}

// ========================
// Messages
// ========================

/// A message participant is sent either as a bare id or as an embedded user
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Participant {
    Id(u64),
    User(Box<User>),
}

impl Participant {
    pub fn id(&self) -> u64 {
        match self {
            Participant::Id(id) => *id,
            Participant::User(user) => user.id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub sender: Participant,
    pub receiver: Participant,
    pub content: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<Value>,
}

impl Keyed for Message {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: u64,
    pub user: Participant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
    #[serde(default)]
    pub unread_count: u64,
}

impl Keyed for Conversation {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationInfo {
    pub id: u64,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationDetails {
    pub conversation: ConversationInfo,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub receiver_id: u64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<u64>,
}

// ========================
// UI + local documents
// ========================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    #[default]
    Info,
    Warning,
}

/// Locally cached upload list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Payslip,
    Contract,
}

impl DocumentKind {
    pub fn storage_key(&self) -> &'static str {
        match self {
            DocumentKind::Payslip => crate::constants::PAYSLIPS_KEY,
            DocumentKind::Contract => crate::constants::CONTRACTS_KEY,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub added_at: DateTime<Utc>,
}
