//! Job repository: filtered listings, aggregates and counters.

use diesel::dsl::{count_star, sql};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Nullable, Text};
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::AppError;
use crate::models::{ExperienceLevel, Job, JobType};
use crate::schema::{jobs, sql_types};
use crate::search::{
    JobFilter, Page, SortSpec, apply_filter, apply_relevance_order, apply_sort, escape_like,
};

const TOP_LIMIT: i64 = 10;
const SUGGESTION_LIMIT: i64 = 10;

/// A name with the number of active jobs it occurs in.
#[derive(Debug, Clone, PartialEq, QueryableByName)]
pub struct NameCount {
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}

/// Aggregates over active jobs.
#[derive(Debug, Clone, PartialEq)]
pub struct JobAggregates {
    pub total_jobs: i64,
    pub remote_jobs: i64,
    /// Mean of the salary midpoints of jobs with both bounds, rounded
    pub avg_salary: i64,
    pub top_skills: Vec<NameCount>,
    pub top_companies: Vec<NameCount>,
}

/// Distinct values across active jobs, for building search forms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFacets {
    pub job_types: Vec<JobType>,
    pub experience_levels: Vec<ExperienceLevel>,
    pub skills: Vec<String>,
    pub companies: Vec<String>,
    /// `(city, state, country)`, at least one part non-empty
    pub locations: Vec<(String, String, String)>,
}

const TOP_SKILLS_SQL: &str = "SELECT skill AS name, COUNT(*) AS count \
     FROM jobs, unnest(skills) AS skill \
     WHERE is_active \
     GROUP BY skill ORDER BY count DESC, name ASC LIMIT $1";

fn distinct_job_types() -> jobs::BoxedQuery<'static, Pg, sql_types::JobType> {
    jobs::table
        .filter(jobs::is_active.eq(true))
        .select(jobs::job_type)
        .distinct()
        .order_by(jobs::job_type)
        .into_boxed()
}

fn distinct_experience_levels() -> jobs::BoxedQuery<'static, Pg, sql_types::ExperienceLevel> {
    jobs::table
        .filter(jobs::is_active.eq(true))
        .select(jobs::experience_level)
        .distinct()
        .order_by(jobs::experience_level)
        .into_boxed()
}

fn distinct_skills() -> jobs::BoxedQuery<'static, Pg, Text> {
    jobs::table
        .filter(jobs::is_active.eq(true))
        .select(sql::<Text>("unnest(skills)"))
        .distinct()
        .order_by(sql::<Text>("1"))
        .into_boxed()
}

fn distinct_companies() -> jobs::BoxedQuery<'static, Pg, Text> {
    jobs::table
        .filter(jobs::is_active.eq(true))
        .select(jobs::company_name)
        .distinct()
        .order_by(jobs::company_name)
        .into_boxed()
}

fn distinct_locations() -> jobs::BoxedQuery<'static, Pg, (Text, Text, Text)> {
    jobs::table
        .filter(jobs::is_active.eq(true))
        .filter(
            jobs::location_city
                .ne("")
                .or(jobs::location_state.ne(""))
                .or(jobs::location_country.ne("")),
        )
        .select((jobs::location_city, jobs::location_state, jobs::location_country))
        .distinct()
        .order_by((jobs::location_country, jobs::location_state, jobs::location_city))
        .into_boxed()
}

#[derive(Clone)]
pub struct JobRepository {
    pool: AsyncDbPool,
}

impl JobRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// One page of jobs matching `filter`, plus the total match count.
    pub async fn search(
        &self,
        filter: &JobFilter,
        sort: SortSpec,
        page: Page,
    ) -> Result<(Vec<Job>, i64), AppError> {
        let mut conn = self.pool.get().await?;

        let total: i64 = apply_filter(jobs::table.into_boxed(), filter)
            .count()
            .get_result(&mut conn)
            .await?;

        if total == 0 {
            return Ok((Vec::new(), 0));
        }

        let items = apply_sort(apply_filter(jobs::table.into_boxed(), filter), sort)
            .select(Job::as_select())
            .limit(page.limit())
            .offset(page.offset())
            .load(&mut conn)
            .await?;

        Ok((items, total))
    }

    /// One page of jobs matching `filter`, most relevant first.
    pub async fn relevance_search(
        &self,
        filter: &JobFilter,
        page: Page,
    ) -> Result<(Vec<Job>, i64), AppError> {
        let mut conn = self.pool.get().await?;

        let total: i64 = apply_filter(jobs::table.into_boxed(), filter)
            .count()
            .get_result(&mut conn)
            .await?;

        if total == 0 {
            return Ok((Vec::new(), 0));
        }

        let items = apply_relevance_order(apply_filter(jobs::table.into_boxed(), filter), filter)
            .select(Job::as_select())
            .limit(page.limit())
            .offset(page.offset())
            .load(&mut conn)
            .await?;

        Ok((items, total))
    }

    /// Number of jobs matching `filter`.
    pub async fn count(&self, filter: &JobFilter) -> Result<i64, AppError> {
        let mut conn = self.pool.get().await?;

        apply_filter(jobs::table.into_boxed(), filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn find_active_by_id(&self, job_id: i32) -> Result<Option<Job>, AppError> {
        let mut conn = self.pool.get().await?;

        jobs::table
            .find(job_id)
            .filter(jobs::is_active.eq(true))
            .select(Job::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Active jobs sharing a skill or the company with `job`, newest first.
    pub async fn find_similar(&self, job: &Job, limit: i64) -> Result<Vec<Job>, AppError> {
        let mut conn = self.pool.get().await?;

        jobs::table
            .filter(jobs::is_active.eq(true))
            .filter(jobs::id.ne(job.id))
            .filter(
                jobs::skills
                    .overlaps_with(job.skills.clone())
                    .or(jobs::company_name.eq(job.company_name.clone())),
            )
            .order((jobs::posted_date.desc(), jobs::id.desc()))
            .limit(limit)
            .select(Job::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn aggregates(&self) -> Result<JobAggregates, AppError> {
        let mut conn = self.pool.get().await?;

        let total_jobs: i64 = jobs::table
            .filter(jobs::is_active.eq(true))
            .select(count_star())
            .get_result(&mut conn)
            .await?;

        let remote_jobs: i64 = jobs::table
            .filter(jobs::is_active.eq(true))
            .filter(jobs::is_remote.eq(true))
            .select(count_star())
            .get_result(&mut conn)
            .await?;

        let avg_salary: Option<f64> = jobs::table
            .filter(jobs::is_active.eq(true))
            .filter(jobs::salary_min.is_not_null())
            .filter(jobs::salary_max.is_not_null())
            .select(sql::<Nullable<Double>>(
                "AVG((salary_min::float8 + salary_max::float8) / 2)",
            ))
            .get_result(&mut conn)
            .await?;

        let top_skills = diesel::sql_query(TOP_SKILLS_SQL)
            .bind::<BigInt, _>(TOP_LIMIT)
            .load::<NameCount>(&mut conn)
            .await?;

        let top_companies = diesel::sql_query(
            "SELECT company_name AS name, COUNT(*) AS count \
             FROM jobs WHERE is_active \
             GROUP BY company_name ORDER BY count DESC, name ASC LIMIT $1",
        )
        .bind::<BigInt, _>(TOP_LIMIT)
        .load::<NameCount>(&mut conn)
        .await?;

        Ok(JobAggregates {
            total_jobs,
            remote_jobs,
            avg_salary: avg_salary.map(|avg| avg.round() as i64).unwrap_or(0),
            top_skills,
            top_companies,
        })
    }

    /// The ten skills listed by the most active jobs.
    pub async fn trending_skills(&self) -> Result<Vec<NameCount>, AppError> {
        let mut conn = self.pool.get().await?;

        diesel::sql_query(TOP_SKILLS_SQL)
            .bind::<BigInt, _>(TOP_LIMIT)
            .load::<NameCount>(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn facets(&self) -> Result<SearchFacets, AppError> {
        let mut conn = self.pool.get().await?;

        Ok(SearchFacets {
            job_types: distinct_job_types().load(&mut conn).await?,
            experience_levels: distinct_experience_levels().load(&mut conn).await?,
            skills: distinct_skills().load(&mut conn).await?,
            companies: distinct_companies().load(&mut conn).await?,
            locations: distinct_locations().load(&mut conn).await?,
        })
    }

    /// Distinct titles of active jobs whose title, company or a skill
    /// contains `query`, most frequent first.
    pub async fn title_suggestions(&self, query: &str) -> Result<Vec<String>, AppError> {
        let mut conn = self.pool.get().await?;
        let pattern = format!("%{}%", escape_like(query));

        let rows = diesel::sql_query(
            "SELECT title AS name, COUNT(*) AS count FROM jobs \
             WHERE is_active AND (title ILIKE $1 OR company_name ILIKE $1 \
               OR EXISTS (SELECT 1 FROM unnest(skills) AS skill WHERE skill ILIKE $1)) \
             GROUP BY title ORDER BY count DESC, name ASC LIMIT $2",
        )
        .bind::<Text, _>(pattern)
        .bind::<BigInt, _>(SUGGESTION_LIMIT)
        .load::<NameCount>(&mut conn)
        .await?;

        Ok(rows.into_iter().map(|row| row.name).collect())
    }

    pub async fn increment_views(&self, job_id: i32) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;

        diesel::update(jobs::table.find(job_id))
            .set(jobs::views.eq(jobs::views + 1))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn increment_applications(&self, job_id: i32) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;

        diesel::update(jobs::table.find(job_id))
            .set(jobs::applications.eq(jobs::applications + 1))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn increment_saved_count(&self, job_id: i32) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;

        diesel::update(jobs::table.find(job_id))
            .set(jobs::saved_count.eq(jobs::saved_count + 1))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Never goes below zero.
    pub async fn decrement_saved_count(&self, job_id: i32) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;

        diesel::update(jobs::table.find(job_id).filter(jobs::saved_count.gt(0)))
            .set(jobs::saved_count.eq(jobs::saved_count - 1))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Liveness check for the health endpoint.
    pub async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;

        diesel::select(sql::<BigInt>("1::int8"))
            .get_result::<i64>(&mut conn)
            .await?;
        Ok(())
    }
}
