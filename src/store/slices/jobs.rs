//! Job listings, employer offers, search results and favourites

use serde::{Deserialize, Serialize};

use crate::models::{Job, JobPage, JobSearch, Pagination};
use crate::store::Collection;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: Option<JobSearch>,
    pub results: Collection<Job>,
    pub pagination: Pagination,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JobsData {
    /// Active job listing
    pub listings: Collection<Job>,
    /// Offers published by the signed-in employer
    pub employer_jobs: Collection<Job>,
    pub current: Option<Job>,
    pub search: SearchResults,
    /// Ids of favourite jobs, without duplicates
    pub favorites: Vec<u64>,
    /// Favourite offers as last fetched
    pub favorite_jobs: Collection<Job>,
}

impl JobsData {
    pub fn set_search_results(&mut self, query: JobSearch, page: JobPage) {
        self.search = SearchResults {
            query: Some(query),
            results: Collection::new(page.data),
            pagination: page.meta,
        };
    }

    pub fn publish(&mut self, job: Job) {
        self.employer_jobs.append(job);
    }

    /// Edited offer replaces its old version wherever it is shown
    pub fn apply_update(&mut self, job: Job) {
        self.listings.update(job.clone());
        self.employer_jobs.upsert(job.clone());
        if self.current.as_ref().map(|c| c.id) == Some(job.id) {
            self.current = Some(job);
        }
    }

    pub fn remove(&mut self, id: u64) {
        self.listings.remove_by_id(&id);
        self.employer_jobs.remove_by_id(&id);
        self.search.results.remove_by_id(&id);
        if self.current.as_ref().map(|c| c.id) == Some(id) {
            self.current = None;
        }
    }

    pub fn set_favorite(&mut self, id: u64, is_favorite: bool) {
        if is_favorite {
            if !self.favorites.contains(&id) {
                self.favorites.push(id);
            }
        } else {
            self.favorites.retain(|fav| *fav != id);
            self.favorite_jobs.remove_by_id(&id);
        }
    }

    /// The server's favourites list replaces the ids as well
    pub fn set_favorite_jobs(&mut self, jobs: Vec<Job>) {
        self.favorites = Vec::new();
        for job in &jobs {
            if !self.favorites.contains(&job.id) {
                self.favorites.push(job.id);
            }
        }
        self.favorite_jobs.replace(jobs);
    }

    pub fn is_favorite(&self, id: u64) -> bool {
        self.favorites.contains(&id)
    }
}
