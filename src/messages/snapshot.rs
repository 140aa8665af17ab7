//! Snapshot - read-only copy of the store published to observers

use serde::Serialize;

use crate::models::Application;
use crate::store::slices::{
    ApplyAiData, FlashJobsData, JobsData, MessagesData, PaymentData, SessionData, StatisticsData,
    SubscriptionData, UiData,
};
use crate::store::{Collection, Lifecycle, Remote, SliceId};

/// State published after every transition
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub auth: Remote<SessionData>,
    pub payment: Remote<PaymentData>,
    pub subscription: Remote<SubscriptionData>,
    pub statistics: Remote<StatisticsData>,
    pub jobs: Remote<JobsData>,
    pub applications: Remote<Collection<Application>>,
    pub messages: Remote<MessagesData>,
    pub flash_jobs: Remote<FlashJobsData>,
    pub apply_ai: Remote<ApplyAiData>,
    pub ui: UiData,
    /// Number of actions the store has applied so far
    pub actions_applied: u64,
}

impl StoreSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.auth.data.is_authenticated
    }

    pub fn is_loading(&self, slice: SliceId) -> bool {
        match slice {
            SliceId::Auth => self.auth.is_loading(),
            SliceId::Payment => self.payment.is_loading(),
            SliceId::Subscription => self.subscription.is_loading(),
            SliceId::Statistics => self.statistics.is_loading(),
            SliceId::Jobs => self.jobs.is_loading(),
            SliceId::Applications => self.applications.is_loading(),
            SliceId::Messages => self.messages.is_loading(),
            SliceId::FlashJobs => self.flash_jobs.is_loading(),
            SliceId::ApplyAi => self.apply_ai.is_loading(),
            SliceId::Ui => self.ui.global_loading,
        }
    }

    /// True while any remote slice has a request in flight
    pub fn any_loading(&self) -> bool {
        SliceId::ALL
            .iter()
            .filter(|slice| **slice != SliceId::Ui)
            .any(|slice| self.is_loading(*slice))
    }

    pub fn error(&self, slice: SliceId) -> Option<&str> {
        let error = match slice {
            SliceId::Auth => &self.auth.error,
            SliceId::Payment => &self.payment.error,
            SliceId::Subscription => &self.subscription.error,
            SliceId::Statistics => &self.statistics.error,
            SliceId::Jobs => &self.jobs.error,
            SliceId::Applications => &self.applications.error,
            SliceId::Messages => &self.messages.error,
            SliceId::FlashJobs => &self.flash_jobs.error,
            SliceId::ApplyAi => &self.apply_ai.error,
            SliceId::Ui => return None,
        };
        error.as_deref()
    }

    /// One slice as JSON, with the session tokens redacted
    pub fn slice_json(&self, slice: SliceId) -> serde_json::Result<serde_json::Value> {
        match slice {
            SliceId::Auth => {
                let mut value = serde_json::to_value(&self.auth)?;
                for key in ["token", "refresh_token"] {
                    if let Some(field) = value["data"].get_mut(key) {
                        if !field.is_null() {
                            *field = serde_json::Value::String("***".to_string());
                        }
                    }
                }
                Ok(value)
            }
            SliceId::Payment => serde_json::to_value(&self.payment),
            SliceId::Subscription => serde_json::to_value(&self.subscription),
            SliceId::Statistics => serde_json::to_value(&self.statistics),
            SliceId::Jobs => serde_json::to_value(&self.jobs),
            SliceId::Applications => serde_json::to_value(&self.applications),
            SliceId::Messages => serde_json::to_value(&self.messages),
            SliceId::FlashJobs => serde_json::to_value(&self.flash_jobs),
            SliceId::ApplyAi => serde_json::to_value(&self.apply_ai),
            SliceId::Ui => serde_json::to_value(&self.ui),
        }
    }
}
