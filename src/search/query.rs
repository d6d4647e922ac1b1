//! Compiles a [`JobFilter`] and [`SortSpec`] into a boxed diesel query.

use diesel::dsl::{not, sql};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Array, Bool, Double, Text};

use crate::models::LocationCriterion;
use crate::schema::jobs;
use crate::search::{JobFilter, SortField, SortOrder, SortSpec};

pub type BoxedJobQuery<'a> = jobs::BoxedQuery<'a, Pg>;

type JobPredicate<'a> = Box<dyn BoxableExpression<jobs::table, Pg, SqlType = Bool> + 'a>;

/// Escapes LIKE metacharacters so user input matches literally.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn contains_pattern(input: &str) -> String {
    format!("%{}%", escape_like(input))
}

/// Adds the filter's conditions to `query`. Inactive jobs are always
/// excluded.
pub fn apply_filter<'a>(mut query: BoxedJobQuery<'a>, filter: &JobFilter) -> BoxedJobQuery<'a> {
    query = query.filter(jobs::is_active.eq(true));

    if let Some(keywords) = filter.keywords.as_deref().filter(|k| !k.trim().is_empty()) {
        query = query.filter(
            sql::<Bool>(
                "to_tsvector('english', title || ' ' || description) @@ plainto_tsquery('english', ",
            )
            .bind::<Text, _>(keywords.to_string())
            .sql(")"),
        );
    }

    if !filter.skills.is_empty() {
        query = query.filter(jobs::skills.overlaps_with(filter.skills.clone()));
    }

    if let Some(location) = filter.location.as_deref() {
        let pattern = contains_pattern(location);
        query = query.filter(
            jobs::location_city
                .ilike(pattern.clone())
                .or(jobs::location_state.ilike(pattern.clone()))
                .or(jobs::location_country.ilike(pattern)),
        );
    }

    if let Some(any_location) = locations_predicate(&filter.locations) {
        query = query.filter(any_location);
    }

    if let Some(remote) = filter.remote {
        query = query.filter(jobs::is_remote.eq(remote));
    }

    if !filter.job_types.is_empty() {
        query = query.filter(jobs::job_type.eq_any(filter.job_types.clone()));
    }

    if let Some(experience) = filter.experience {
        query = query.filter(jobs::experience_level.eq(experience));
    }

    // Both bounds select postings whose whole range sits inside them.
    if let Some(min) = filter.salary_min {
        query = query.filter(jobs::salary_min.ge(min));
    }
    if let Some(max) = filter.salary_max {
        query = query.filter(jobs::salary_max.le(max));
    }

    if let Some(company) = filter.company.as_deref() {
        query = query.filter(jobs::company_name.ilike(contains_pattern(company)));
    }

    if !filter.companies.is_empty() {
        query = query.filter(jobs::company_name.eq_any(filter.companies.clone()));
    }

    if let Some(source_site) = filter.source_site.as_deref() {
        query = query.filter(jobs::source_site.eq(source_site.to_lowercase()));
    }

    if let Some(posted_after) = filter.posted_after {
        query = query.filter(jobs::posted_date.ge(jiff_diesel::Timestamp::from(posted_after)));
    }

    for keyword in &filter.exclude_keywords {
        let pattern = contains_pattern(keyword);
        query = query.filter(not(jobs::title
            .ilike(pattern.clone())
            .or(jobs::description.ilike(pattern))));
    }

    query
}

/// OR of one group per location; a group ANDs the parts it names.
fn locations_predicate<'a>(locations: &[LocationCriterion]) -> Option<JobPredicate<'a>> {
    locations
        .iter()
        .filter_map(location_group)
        .reduce(|acc, group| Box::new(acc.or(group)))
}

fn location_group<'a>(location: &LocationCriterion) -> Option<JobPredicate<'a>> {
    let part = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(contains_pattern)
    };

    let mut parts: Vec<JobPredicate<'a>> = Vec::new();
    if let Some(city) = part(&location.city) {
        parts.push(Box::new(jobs::location_city.ilike(city)));
    }
    if let Some(state) = part(&location.state) {
        parts.push(Box::new(jobs::location_state.ilike(state)));
    }
    if let Some(country) = part(&location.country) {
        parts.push(Box::new(jobs::location_country.ilike(country)));
    }

    parts
        .into_iter()
        .reduce(|acc, next| Box::new(acc.and(next)))
}

macro_rules! order_with_tiebreak {
    ($query:expr, $column:expr, $order:expr) => {
        match $order {
            SortOrder::Asc => $query.order_by($column.asc()).then_order_by(jobs::id.asc()),
            SortOrder::Desc => $query.order_by($column.desc()).then_order_by(jobs::id.desc()),
        }
    };
}

/// Orders by the requested column, then by id in the same direction so
/// paging is stable.
pub fn apply_sort<'a>(query: BoxedJobQuery<'a>, sort: SortSpec) -> BoxedJobQuery<'a> {
    match sort.field {
        SortField::PostedDate => order_with_tiebreak!(query, jobs::posted_date, sort.order),
        SortField::Title => order_with_tiebreak!(query, jobs::title, sort.order),
        SortField::CompanyName => order_with_tiebreak!(query, jobs::company_name, sort.order),
        SortField::LocationCity => order_with_tiebreak!(query, jobs::location_city, sort.order),
        SortField::SalaryMin => order_with_tiebreak!(query, jobs::salary_min, sort.order),
    }
}

/// Orders by relevance: the full-text rank of `keywords`, plus ten for
/// every requested skill the job lists, minus one per day since posting.
pub fn apply_relevance_order<'a>(query: BoxedJobQuery<'a>, filter: &JobFilter) -> BoxedJobQuery<'a> {
    let keywords = filter.keywords.clone().unwrap_or_default();
    let score = sql::<Double>(
        "(ts_rank(to_tsvector('english', title || ' ' || description), plainto_tsquery('english', ",
    )
    .bind::<Text, _>(keywords)
    .sql("))::float8 + 10 * cardinality(ARRAY(SELECT unnest(skills) INTERSECT SELECT unnest(")
    .bind::<Array<Text>, _>(filter.skills.clone())
    .sql("::text[]))) - EXTRACT(EPOCH FROM now() - posted_date)::float8 / 86400)");

    query.order_by(score.desc()).then_order_by(jobs::id.desc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExperienceLevel, JobType};
    use proptest::prelude::*;

    fn compiled(filter: &JobFilter) -> String {
        let query = apply_filter(jobs::table.into_boxed(), filter);
        diesel::debug_query::<Pg, _>(&query).to_string()
    }

    fn ranked(filter: &JobFilter) -> String {
        let query = apply_relevance_order(apply_filter(jobs::table.into_boxed(), filter), filter);
        diesel::debug_query::<Pg, _>(&query).to_string()
    }

    fn sorted(sort: SortSpec) -> String {
        let query = apply_sort(jobs::table.into_boxed(), sort);
        diesel::debug_query::<Pg, _>(&query).to_string()
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("c_sharp"), "c\\_sharp");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("rust"), "rust");
    }

    #[test]
    fn test_empty_filter_only_active_jobs() {
        let sql = compiled(&JobFilter::default());
        assert!(sql.contains(r#""jobs"."is_active" = $1"#), "{sql}");
        assert!(!sql.contains("ILIKE"), "{sql}");
    }

    #[test]
    fn test_keywords_use_full_text_search() {
        let sql = compiled(&JobFilter {
            keywords: Some("rust developer".to_string()),
            ..Default::default()
        });
        assert!(sql.contains("to_tsvector('english', title || ' ' || description)"), "{sql}");
        assert!(sql.contains("plainto_tsquery('english', $2)"), "{sql}");
        assert!(sql.contains("rust developer"), "{sql}");
    }

    #[test]
    fn test_salary_bounds_are_containment_not_overlap() {
        let sql = compiled(&JobFilter {
            salary_min: Some(80_000),
            salary_max: Some(150_000),
            ..Default::default()
        });
        assert!(sql.contains(r#""jobs"."salary_min" >= $2"#), "{sql}");
        assert!(sql.contains(r#""jobs"."salary_max" <= $3"#), "{sql}");
        assert!(sql.contains("80000"), "{sql}");
        assert!(sql.contains("150000"), "{sql}");
    }

    #[test]
    fn test_single_salary_bound() {
        let sql = compiled(&JobFilter {
            salary_max: Some(50_000),
            ..Default::default()
        });
        assert!(sql.contains(r#""jobs"."salary_max" <= $2"#), "{sql}");
        assert!(!sql.contains(r#""jobs"."salary_min" >="#), "{sql}");
    }

    #[test]
    fn test_location_matches_any_part() {
        let sql = compiled(&JobFilter {
            location: Some("Austin".to_string()),
            ..Default::default()
        });
        assert!(sql.contains(r#""jobs"."location_city" ILIKE $2"#), "{sql}");
        assert!(sql.contains(r#""jobs"."location_state" ILIKE $3"#), "{sql}");
        assert!(sql.contains(r#""jobs"."location_country" ILIKE $4"#), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
        assert!(sql.contains("%Austin%"), "{sql}");
    }

    #[test]
    fn test_structured_locations_or_of_and_groups() {
        let sql = compiled(&JobFilter {
            locations: vec![
                LocationCriterion {
                    city: Some("Austin".to_string()),
                    state: Some("TX".to_string()),
                    country: None,
                },
                LocationCriterion {
                    country: Some("Canada".to_string()),
                    ..Default::default()
                },
                LocationCriterion::default(),
            ],
            ..Default::default()
        });
        assert!(sql.contains(" AND "), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
        assert!(sql.contains("%TX%"), "{sql}");
        assert!(sql.contains("%Canada%"), "{sql}");
    }

    #[test]
    fn test_membership_and_equality_filters() {
        let sql = compiled(&JobFilter {
            skills: vec!["rust".to_string()],
            remote: Some(true),
            job_types: vec![JobType::FullTime, JobType::Contract],
            experience: Some(ExperienceLevel::Senior),
            companies: vec!["Acme".to_string()],
            source_site: Some("LinkedIn".to_string()),
            ..Default::default()
        });
        assert!(sql.contains(r#""jobs"."skills" && $2"#), "{sql}");
        assert!(sql.contains(r#""jobs"."is_remote" = $3"#), "{sql}");
        assert!(sql.contains(r#""jobs"."job_type" = ANY($4)"#), "{sql}");
        assert!(sql.contains(r#""jobs"."experience_level" = $5"#), "{sql}");
        assert!(sql.contains(r#""jobs"."company_name" = ANY($6)"#), "{sql}");
        assert!(sql.contains(r#""jobs"."source_site" = $7"#), "{sql}");
        assert!(sql.contains("linkedin"), "{sql}");
    }

    #[test]
    fn test_company_is_partial_match() {
        let sql = compiled(&JobFilter {
            company: Some("acme_co".to_string()),
            ..Default::default()
        });
        assert!(sql.contains(r#""jobs"."company_name" ILIKE $2"#), "{sql}");
    }

    #[test]
    fn test_exclude_keywords_negate_each_term() {
        let sql = compiled(&JobFilter {
            exclude_keywords: vec!["php".to_string(), "java".to_string()],
            ..Default::default()
        });
        assert_eq!(sql.matches("NOT").count(), 2, "{sql}");
        assert!(sql.contains(r#""jobs"."title" ILIKE $2"#), "{sql}");
        assert!(sql.contains(r#""jobs"."description" ILIKE $3"#), "{sql}");
        assert!(sql.contains("%php%"), "{sql}");
        assert!(sql.contains("%java%"), "{sql}");
    }

    #[test]
    fn test_posted_after() {
        let sql = compiled(&JobFilter {
            posted_after: Some(jiff::Timestamp::UNIX_EPOCH),
            ..Default::default()
        });
        assert!(sql.contains(r#""jobs"."posted_date" >= $2"#), "{sql}");
    }

    #[test]
    fn test_sort_appends_id_in_same_direction() {
        let sql = sorted(SortSpec::default());
        assert!(
            sql.contains(r#"ORDER BY "jobs"."posted_date" DESC, "jobs"."id" DESC"#),
            "{sql}"
        );

        let sql = sorted(SortSpec::new(SortField::SalaryMin, SortOrder::Asc));
        assert!(
            sql.contains(r#"ORDER BY "jobs"."salary_min" ASC, "jobs"."id" ASC"#),
            "{sql}"
        );
    }

    #[test]
    fn test_relevance_ranks_text_skills_and_age() {
        let sql = ranked(&JobFilter {
            keywords: Some("backend".to_string()),
            skills: vec!["rust".to_string(), "tokio".to_string()],
            ..Default::default()
        });
        let order = &sql[sql.find("ORDER BY").unwrap()..];
        assert!(order.contains("ts_rank("), "{sql}");
        assert!(order.contains("10 * cardinality(ARRAY(SELECT unnest(skills) INTERSECT"), "{sql}");
        assert!(
            order.contains(r#"now() - posted_date)::float8 / 86400) DESC, "jobs"."id" DESC"#),
            "{sql}"
        );
        assert!(sql.contains(r#""jobs"."skills" && $"#), "{sql}");
    }

    #[test]
    fn test_relevance_without_keywords_still_orders_by_score() {
        let sql = ranked(&JobFilter::default());
        assert!(sql.contains("ts_rank("), "{sql}");
        assert!(!sql.contains("@@"), "{sql}");
        assert!(sql.contains(r#""jobs"."is_active" = $1"#), "{sql}");
    }

    fn arb_filter() -> impl Strategy<Value = JobFilter> {
        (
            proptest::option::of("[a-z %_]{0,12}"),
            proptest::collection::vec("[a-z]{1,8}", 0..3),
            proptest::option::of("[A-Za-z%_]{1,10}"),
            proptest::option::of(any::<bool>()),
            proptest::option::of(0..500_000i32),
            proptest::option::of(0..500_000i32),
            proptest::collection::vec("[a-z%]{1,6}", 0..3),
        )
            .prop_map(
                |(keywords, skills, location, remote, salary_min, salary_max, exclude)| JobFilter {
                    keywords,
                    skills,
                    location,
                    remote,
                    salary_min,
                    salary_max,
                    exclude_keywords: exclude,
                    ..Default::default()
                },
            )
    }

    proptest! {
        #[test]
        fn prop_every_compiled_filter_excludes_inactive_jobs(filter in arb_filter()) {
            let sql = compiled(&filter);
            prop_assert!(sql.contains(r#""jobs"."is_active" = $1"#));
        }

        #[test]
        fn prop_escaped_patterns_have_no_bare_wildcards(input in ".{0,20}") {
            let escaped = escape_like(&input);
            let mut chars = escaped.chars();
            while let Some(ch) = chars.next() {
                if ch == '\\' {
                    prop_assert!(matches!(chars.next(), Some('%' | '_' | '\\')));
                } else {
                    prop_assert!(ch != '%' && ch != '_');
                }
            }
        }
    }
}
