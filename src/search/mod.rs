//! Filter-query builder for job listings, structured search and alerts.
//!
//! Request parameters and alert criteria are first turned into a typed
//! [`JobFilter`] and [`SortSpec`], which [`apply_filter`] and [`apply_sort`]
//! then compile into a boxed diesel query.

mod filter;
mod page;
mod query;
mod sort;

pub use filter::{JobFilter, split_skills};
pub use page::{Page, PageMeta};
pub use query::{BoxedJobQuery, apply_filter, apply_relevance_order, apply_sort, escape_like};
pub use sort::{SortField, SortOrder, SortSpec};
