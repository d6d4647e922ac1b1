//! Cache key builders.
//!
//! Listing and search keys embed the JSON form of the filter, which is
//! deterministic: fields serialize in declaration order and unset ones are
//! skipped.

use crate::search::{JobFilter, Page, SortSpec};

pub const JOBS_PATTERN: &str = "jobs:*";
pub const SEARCH_PATTERN: &str = "search:*";
pub const STATS_PATTERN: &str = "stats:*";

pub const JOB_STATS: &str = "stats:jobs";
pub const TRENDING_SKILLS: &str = "search:trending";
pub const SEARCH_FILTERS: &str = "search:filters";

pub fn job_list(filter: &JobFilter, page: Page, sort: SortSpec) -> String {
    format!(
        "jobs:{}:{}:{}:{}",
        filter.cache_fragment(),
        page.page,
        page.limit,
        sort
    )
}

pub fn search(filter: &JobFilter, page: Page, sort: SortSpec) -> String {
    format!(
        "search:{}:{}:{}:{}",
        filter.cache_fragment(),
        page.page,
        page.limit,
        sort
    )
}

pub fn relevance(filter: &JobFilter, page: Page) -> String {
    format!(
        "search:relevance:{}:{}:{}",
        filter.cache_fragment(),
        page.page,
        page.limit
    )
}

pub fn job_detail(job_id: i32) -> String {
    format!("jobs:detail:{job_id}")
}

pub fn similar_jobs(job_id: i32, limit: i64) -> String {
    format!("jobs:similar:{job_id}:{limit}")
}

pub fn suggestions(query: &str) -> String {
    format!("search:suggestions:{}", query.to_lowercase())
}

pub fn user(user_id: i32, kind: &str) -> String {
    format!("user:{user_id}:{kind}")
}

pub fn user_pattern(user_id: i32) -> String {
    format!("user:{user_id}:*")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{SortField, SortOrder};

    #[test]
    fn test_listing_key_layout() {
        let filter = JobFilter {
            skills: vec!["rust".to_string()],
            remote: Some(true),
            ..Default::default()
        };
        let key = job_list(
            &filter,
            Page::new(2, 10),
            SortSpec::new(SortField::SalaryMin, SortOrder::Asc),
        );
        assert_eq!(
            key,
            r#"jobs:{"skills":["rust"],"remote":true}:2:10:jobType.salary.min:asc"#
        );
    }

    #[test]
    fn test_identical_filters_share_a_key() {
        let a = JobFilter {
            keywords: Some("backend".to_string()),
            ..Default::default()
        };
        let b = a.clone();
        let sort = SortSpec::default();
        assert_eq!(
            search(&a, Page::default(), sort),
            search(&b, Page::default(), sort)
        );
        assert_eq!(
            search(&a, Page::default(), sort),
            r#"search:{"keywords":"backend"}:1:20:postedDate:desc"#
        );
    }

    #[test]
    fn test_scoped_keys() {
        assert_eq!(job_detail(9), "jobs:detail:9");
        assert_eq!(similar_jobs(9, 5), "jobs:similar:9:5");
        assert_eq!(suggestions("RuSt"), "search:suggestions:rust");
        assert_eq!(
            relevance(
                &JobFilter {
                    skills: vec!["rust".to_string()],
                    ..Default::default()
                },
                Page::default()
            ),
            r#"search:relevance:{"skills":["rust"]}:1:20"#
        );
        assert_eq!(user(7, "saved"), "user:7:saved");
        assert_eq!(user_pattern(7), "user:7:*");
    }
}
