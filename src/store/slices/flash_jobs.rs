//! Flash jobs: short-notice missions, paged

use serde::{Deserialize, Serialize};

use crate::models::{FlashJob, FlashJobPage, Pagination};
use crate::store::Collection;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlashJobsData {
    pub listings: Collection<FlashJob>,
    pub pagination: Pagination,
    pub current: Option<FlashJob>,
    /// Missions the user applied to in this session
    pub applied: Vec<u64>,
}

impl FlashJobsData {
    /// Page 1 replaces the listing; later pages add the missions not yet shown
    pub fn merge_page(&mut self, page: FlashJobPage) {
        if page.meta.current_page <= 1 {
            self.listings.replace(page.data);
        } else {
            for job in page.data {
                if self.listings.get(&job.job.id).is_none() {
                    self.listings.append(job);
                }
            }
        }
        self.pagination = page.meta;
    }

    pub fn set_search_results(&mut self, jobs: Vec<FlashJob>) {
        self.pagination = Pagination {
            total: jobs.len() as u64,
            ..Pagination::default()
        };
        self.listings.replace(jobs);
    }

    pub fn publish(&mut self, job: FlashJob) {
        self.listings.prepend(job);
    }

    pub fn apply_update(&mut self, job: FlashJob) {
        if self.current.as_ref().map(|c| c.job.id) == Some(job.job.id) {
            self.current = Some(job.clone());
        }
        self.listings.update(job);
    }

    pub fn remove(&mut self, id: u64) {
        self.listings.remove_by_id(&id);
        if self.current.as_ref().map(|c| c.job.id) == Some(id) {
            self.current = None;
        }
    }

    /// Counts the new applicant on every copy of the mission
    pub fn record_application(&mut self, id: u64) {
        if self.has_applied(id) {
            return;
        }
        self.applied.push(id);
        let bump = |job: &mut FlashJob| job.current_applicants += 1;
        if let Some(mut job) = self.listings.get(&id).cloned() {
            bump(&mut job);
            self.listings.update(job);
        }
        if let Some(current) = self.current.as_mut().filter(|c| c.job.id == id) {
            bump(current);
        }
    }

    pub fn has_applied(&self, id: u64) -> bool {
        self.applied.contains(&id)
    }
}
