//! Job listing service.
//!
//! Read paths go through the cache-aside layer; the boolean returned next to
//! each value tells whether it was served from the cache.

use crate::api::dto::{JobResponse, JobStatsResponse, Paged, SearchFiltersResponse, SkillCount};
use crate::cache::{CacheManager, keys};
use crate::error::{AppError, AppResult};
use crate::repositories::JobRepository;
use crate::search::{JobFilter, Page, SortSpec, split_skills};

/// Queries shorter than this yield no suggestions.
const MIN_SUGGESTION_LEN: usize = 2;

#[derive(Clone)]
pub struct JobService {
    repo: JobRepository,
    cache: CacheManager,
}

impl JobService {
    pub fn new(repo: JobRepository, cache: CacheManager) -> Self {
        Self { repo, cache }
    }

    async fn page_of(
        &self,
        filter: &JobFilter,
        sort: SortSpec,
        page: Page,
    ) -> AppResult<Paged<JobResponse>> {
        let (jobs, total) = self.repo.search(filter, sort, page).await?;
        Ok(Paged {
            items: jobs.into_iter().map(JobResponse::from).collect(),
            pagination: page.meta(total),
        })
    }

    /// `GET /api/jobs` listing.
    pub async fn list(
        &self,
        filter: JobFilter,
        sort: SortSpec,
        page: Page,
    ) -> AppResult<(Paged<JobResponse>, bool)> {
        let key = keys::job_list(&filter, page, sort);
        self.cache
            .get_or_compute(&key, None, self.page_of(&filter, sort, page))
            .await
    }

    /// Structured search; cached under its own namespace.
    pub async fn search(
        &self,
        filter: JobFilter,
        sort: SortSpec,
        page: Page,
    ) -> AppResult<(Paged<JobResponse>, bool)> {
        let key = keys::search(&filter, page, sort);
        self.cache
            .get_or_compute(&key, None, self.page_of(&filter, sort, page))
            .await
    }

    /// Search ranked by text score, skill overlap and age.
    pub async fn relevance(
        &self,
        filter: JobFilter,
        page: Page,
    ) -> AppResult<(Paged<JobResponse>, bool)> {
        self.cache
            .get_or_compute(&keys::relevance(&filter, page), None, async {
                let (jobs, total) = self.repo.relevance_search(&filter, page).await?;
                Ok(Paged {
                    items: jobs.into_iter().map(JobResponse::from).collect(),
                    pagination: page.meta(total),
                })
            })
            .await
    }

    pub async fn trending_skills(&self) -> AppResult<(Vec<SkillCount>, bool)> {
        self.cache
            .get_or_compute(keys::TRENDING_SKILLS, None, async {
                let skills = self.repo.trending_skills().await?;
                Ok(skills.into_iter().map(SkillCount::from).collect())
            })
            .await
    }

    /// Distinct job types, levels, skills, companies and locations on offer.
    pub async fn search_filters(&self) -> AppResult<(SearchFiltersResponse, bool)> {
        self.cache
            .get_or_compute(keys::SEARCH_FILTERS, None, async {
                Ok(SearchFiltersResponse::from(self.repo.facets().await?))
            })
            .await
    }

    /// Jobs having any of the comma separated `skills`.
    pub async fn by_skills(&self, skills: &str, page: Page) -> AppResult<(Paged<JobResponse>, bool)> {
        let skills = split_skills(skills);
        if skills.is_empty() {
            return Err(AppError::validation("skills", "At least one skill is required"));
        }
        let filter = JobFilter {
            skills,
            ..Default::default()
        };
        self.list(filter, SortSpec::default(), page).await
    }

    pub async fn remote(&self, page: Page) -> AppResult<(Paged<JobResponse>, bool)> {
        let filter = JobFilter {
            remote: Some(true),
            ..Default::default()
        };
        self.list(filter, SortSpec::default(), page).await
    }

    pub async fn stats(&self) -> AppResult<(JobStatsResponse, bool)> {
        self.cache
            .get_or_compute(keys::JOB_STATS, None, async {
                Ok(JobStatsResponse::from(self.repo.aggregates().await?))
            })
            .await
    }

    pub async fn suggestions(&self, query: &str) -> AppResult<(Vec<String>, bool)> {
        let query = query.trim();
        if query.chars().count() < MIN_SUGGESTION_LEN {
            return Ok((Vec::new(), false));
        }

        self.cache
            .get_or_compute(
                &keys::suggestions(query),
                None,
                self.repo.title_suggestions(query),
            )
            .await
    }

    /// Job detail. The body is cached; the view counter is bumped on every
    /// call, so cached bodies may lag behind by a few views.
    pub async fn get(&self, job_id: i32) -> AppResult<(JobResponse, bool)> {
        let (job, from_cache) = self
            .cache
            .get_or_compute(&keys::job_detail(job_id), None, async {
                self.repo
                    .find_active_by_id(job_id)
                    .await?
                    .map(JobResponse::from)
                    .ok_or_else(|| AppError::not_found("Job", job_id))
            })
            .await?;

        if let Err(e) = self.repo.increment_views(job_id).await {
            tracing::warn!(job_id, error = %e, "failed to record job view");
        }

        Ok((job, from_cache))
    }

    pub async fn similar(&self, job_id: i32, limit: u32) -> AppResult<(Vec<JobResponse>, bool)> {
        let limit = i64::from(limit);
        self.cache
            .get_or_compute(&keys::similar_jobs(job_id, limit), None, async {
                let job = self
                    .repo
                    .find_active_by_id(job_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Job", job_id))?;
                let similar = self.repo.find_similar(&job, limit).await?;
                Ok(similar.into_iter().map(JobResponse::from).collect())
            })
            .await
    }

    /// Liveness check of the job store.
    pub async fn ping(&self) -> AppResult<()> {
        self.repo.ping().await
    }
}
