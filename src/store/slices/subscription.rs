//! Subscription packages, available and active

use serde::{Deserialize, Serialize};

use crate::models::{Subscription, SubscriptionsOverview};
use crate::store::Collection;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionData {
    pub available: Collection<Subscription>,
    pub active: Collection<Subscription>,
}

impl SubscriptionData {
    pub fn replace_all(&mut self, overview: SubscriptionsOverview) {
        self.available.replace(overview.available_subscriptions);
        self.active.replace(overview.active_subscriptions);
    }

    pub fn activate(&mut self, subscription: Subscription) {
        self.active.append(subscription);
    }

    pub fn cancel(&mut self, id: u64) -> Option<Subscription> {
        self.active.remove_by_id(&id)
    }
}
