//! Slice data types and their success folds

pub mod apply_ai;
pub mod auth;
pub mod flash_jobs;
pub mod jobs;
pub mod messages;
pub mod payment;
pub mod statistics;
pub mod subscription;
pub mod ui;

pub use apply_ai::ApplyAiData;
pub use auth::SessionData;
pub use flash_jobs::FlashJobsData;
pub use jobs::{JobsData, SearchResults};
pub use messages::MessagesData;
pub use payment::PaymentData;
pub use statistics::StatisticsData;
pub use subscription::SubscriptionData;
pub use ui::{Notification, UiData};
