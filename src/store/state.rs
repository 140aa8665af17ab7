//! Store state - pure data, no I/O apart from the session store

use chrono::{DateTime, Utc};

use crate::messages::StoreSnapshot;
use crate::models::Application;
use crate::storage::SessionStore;
use crate::store::fence::{SequenceFence, SliceId};
use crate::store::resource::{Collection, Lifecycle, Remote};
use crate::store::slices::{
    ApplyAiData, FlashJobsData, JobsData, MessagesData, PaymentData, SessionData, StatisticsData,
    SubscriptionData, UiData,
};

/// Whole state tree, owned by the store actor
pub struct StoreState {
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

    pub fence: SequenceFence,
    pub sessions: SessionStore,
    pub actions_applied: u64,
}

impl StoreState {
    /// Empty state with the persisted session restored, if there is a valid one
    pub fn new(sessions: SessionStore) -> Self {
        Self::restored_at(sessions, Utc::now())
    }

    pub fn restored_at(sessions: SessionStore, now: DateTime<Utc>) -> Self {
        let mut state = StoreState {
            auth: Remote::default(),
            payment: Remote::default(),
            subscription: Remote::default(),
            statistics: Remote::default(),
            jobs: Remote::default(),
            applications: Remote::default(),
            messages: Remote::default(),
            flash_jobs: Remote::default(),
            apply_ai: Remote::default(),
            ui: UiData::default(),
            fence: SequenceFence::new(),
            sessions,
            actions_applied: 0,
        };

        match state.sessions.restore(now) {
            Ok(Some(persisted)) => {
                tracing::info!(user_id = persisted.user.id, "Session restored");
                state.auth.data.restore(persisted);
            }
            Ok(None) => tracing::debug!("No stored session"),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored session");
            }
        }

        state
    }

    /// Request lifecycle of a slice; the UI slice has none
    pub fn lifecycle_mut(&mut self, slice: SliceId) -> Option<&mut dyn Lifecycle> {
        match slice {
            SliceId::Auth => Some(&mut self.auth),
            SliceId::Payment => Some(&mut self.payment),
            SliceId::Subscription => Some(&mut self.subscription),
            SliceId::Statistics => Some(&mut self.statistics),
            SliceId::Jobs => Some(&mut self.jobs),
            SliceId::Applications => Some(&mut self.applications),
            SliceId::Messages => Some(&mut self.messages),
            SliceId::FlashJobs => Some(&mut self.flash_jobs),
            SliceId::ApplyAi => Some(&mut self.apply_ai),
            SliceId::Ui => None,
        }
    }

    /// Convert to snapshot for observers
    pub fn to_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            auth: self.auth.clone(),
            payment: self.payment.clone(),
            subscription: self.subscription.clone(),
            statistics: self.statistics.clone(),
            jobs: self.jobs.clone(),
            applications: self.applications.clone(),
            messages: self.messages.clone(),
            flash_jobs: self.flash_jobs.clone(),
            apply_ai: self.apply_ai.clone(),
            ui: self.ui.clone(),
            actions_applied: self.actions_applied,
        }
    }
}
