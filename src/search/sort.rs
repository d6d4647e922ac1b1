use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Column a job listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum SortField {
    #[default]
    #[serde(rename = "postedDate")]
    PostedDate,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "company.name")]
    CompanyName,
    #[serde(rename = "location.city")]
    LocationCity,
    #[serde(rename = "jobType.salary.min")]
    SalaryMin,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::PostedDate => "postedDate",
            SortField::Title => "title",
            SortField::CompanyName => "company.name",
            SortField::LocationCity => "location.city",
            SortField::SalaryMin => "jobType.salary.min",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Requested ordering; defaults to newest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }
}

/// Renders as `field:order`, the form used in cache keys.
impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field.as_str(), self.order.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_newest_first() {
        let sort = SortSpec::default();
        assert_eq!(sort.field, SortField::PostedDate);
        assert_eq!(sort.order, SortOrder::Desc);
        assert_eq!(sort.to_string(), "postedDate:desc");
    }

    #[test]
    fn test_sort_field_accepts_dotted_names() {
        let field: SortField = serde_json::from_str("\"jobType.salary.min\"").unwrap();
        assert_eq!(field, SortField::SalaryMin);
        let field: SortField = serde_json::from_str("\"company.name\"").unwrap();
        assert_eq!(field, SortField::CompanyName);
    }

    #[test]
    fn test_unknown_sort_field_is_rejected() {
        assert!(serde_json::from_str::<SortField>("\"password\"").is_err());
        assert!(serde_json::from_str::<SortOrder>("\"random\"").is_err());
    }
}
