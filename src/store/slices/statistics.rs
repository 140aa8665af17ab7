//! Employer dashboard and per-offer statistics

use serde::{Deserialize, Serialize};

use crate::models::{DashboardData, JobStats};

/// Employer statistics
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsData {
    pub dashboard: Option<DashboardData>,
    pub job_stats: Option<JobStats>,
    /// Job the current `job_stats` belong to
    pub job_stats_for: Option<u64>,
}

impl StatisticsData {
    pub fn set_job_stats(&mut self, job_id: u64, stats: JobStats) {
        self.job_stats = Some(stats);
        self.job_stats_for = Some(job_id);
    }
}
