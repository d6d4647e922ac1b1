use std::sync::LazyLock;

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use regex::Regex;

use crate::error::AppError;

/// `Key (email)=(a@b.com) already exists.` / `Key (job_id)=(5) is not present ...`
static KEY_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Key \((?P<field>.+?)\)=\((?P<value>.*?)\)").expect("static regex")
});

/// `null value in column "email" of relation "users" violates ...`
static QUOTED_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"column "(?P<column>[^"]+)""#).expect("static regex"));

/// `... on table "saved_jobs" ...` / `... for relation "jobs" ...`
static QUOTED_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:table|relation) "(?P<table>[^"]+)""#).expect("static regex")
});

/// Utility for converting database errors to structured AppError variants.
///
/// Postgres reports the offending key in the DETAIL line, which is preferred
/// over guessing from constraint names.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to an appropriate AppError variant.
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: &(dyn DatabaseErrorInformation + Send + Sync),
        operation: &str,
    ) -> AppError {
        let message = info.message();
        let table = info
            .table_name()
            .map(str::to_string)
            .or_else(|| capture(&QUOTED_TABLE, message, "table"))
            .or_else(|| info.constraint_name().and_then(table_from_constraint));

        match kind {
            DatabaseErrorKind::UniqueViolation => match key_value(info) {
                Some((field, value)) => AppError::Duplicate {
                    entity: table.unwrap_or_else(|| "resource".to_string()),
                    field,
                    value,
                },
                None => Self::fallback(operation, "Unique constraint violation", message),
            },
            DatabaseErrorKind::NotNullViolation => {
                match info
                    .column_name()
                    .map(str::to_string)
                    .or_else(|| capture(&QUOTED_COLUMN, message, "column"))
                {
                    Some(field) => AppError::Validation {
                        reason: format!(
                            "Field is required for {}",
                            table.unwrap_or_else(|| "resource".to_string())
                        ),
                        field,
                    },
                    None => Self::fallback(operation, "Not null constraint violation", message),
                }
            }
            DatabaseErrorKind::ForeignKeyViolation => match key_value(info) {
                Some((field, value)) => AppError::Validation {
                    reason: format!("Invalid reference with value '{}'", value),
                    field,
                },
                None => Self::fallback(operation, "Foreign key constraint violation", message),
            },
            DatabaseErrorKind::CheckViolation => {
                match info.constraint_name().and_then(field_from_check) {
                    Some(field) => AppError::Validation {
                        reason: "Check constraint failed".to_string(),
                        field,
                    },
                    None => Self::fallback(operation, "Check constraint violation", message),
                }
            }
            _ => Self::fallback(operation, "Database error", message),
        }
    }

    fn fallback(operation: &str, label: &str, message: &str) -> AppError {
        AppError::Database {
            operation: operation.to_string(),
            source: anyhow::Error::msg(format!("{}: {}", label, message)),
        }
    }
}

fn capture(re: &Regex, haystack: &str, group: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|c| c.name(group))
        .map(|m| m.as_str().to_string())
}

/// Field and value from the DETAIL line, falling back to the message.
fn key_value(info: &(dyn DatabaseErrorInformation + Send + Sync)) -> Option<(String, String)> {
    let caps = info
        .details()
        .and_then(|d| KEY_VALUE.captures(d))
        .or_else(|| KEY_VALUE.captures(info.message()))?;
    let field = column_of(caps.name("field")?.as_str());
    let value = caps.name("value")?.as_str().to_string();
    Some((field, value))
}

/// Expression indexes report e.g. `lower(email::text)`; keep the column.
fn column_of(expr: &str) -> String {
    let inner = expr.rsplit('(').next().unwrap_or(expr);
    inner
        .split([':', ')'])
        .next()
        .unwrap_or(inner)
        .trim()
        .to_string()
}

/// `saved_jobs_user_id_fkey` -> `saved_jobs` for the tables this crate owns.
fn table_from_constraint(constraint: &str) -> Option<String> {
    ["applied_jobs", "saved_jobs", "alerts", "users", "jobs"]
        .into_iter()
        .find(|table| constraint.starts_with(&format!("{table}_")))
        .map(str::to_string)
}

/// `jobs_salary_min_check` -> `salary_min`
fn field_from_check(constraint: &str) -> Option<String> {
    let table = table_from_constraint(constraint)?;
    let field = constraint
        .strip_prefix(&format!("{table}_"))?
        .strip_suffix("_check")?;
    (!field.is_empty()).then(|| field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockDatabaseErrorInfo {
        message: String,
        details: Option<String>,
        table_name: Option<String>,
        column_name: Option<String>,
        constraint_name: Option<String>,
    }

    impl DatabaseErrorInformation for MockDatabaseErrorInfo {
        fn message(&self) -> &str {
            &self.message
        }

        fn details(&self) -> Option<&str> {
            self.details.as_deref()
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            self.table_name.as_deref()
        }

        fn column_name(&self) -> Option<&str> {
            self.column_name.as_deref()
        }

        fn constraint_name(&self) -> Option<&str> {
            self.constraint_name.as_deref()
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn convert(kind: DatabaseErrorKind, info: MockDatabaseErrorInfo) -> AppError {
        DatabaseErrorConverter::convert_diesel_error(
            DieselError::DatabaseError(kind, Box::new(info)),
            "test operation",
        )
    }

    #[test]
    fn test_convert_not_found_error() {
        let result = DatabaseErrorConverter::convert_diesel_error(DieselError::NotFound, "find job");
        assert!(matches!(result, AppError::NotFound { .. }));
    }

    #[test]
    fn test_unique_violation_on_expression_index() {
        let result = convert(
            DatabaseErrorKind::UniqueViolation,
            MockDatabaseErrorInfo {
                message: "duplicate key value violates unique constraint \"users_email_key\""
                    .to_string(),
                details: Some("Key (lower(email::text))=(ada@example.com) already exists.".into()),
                table_name: Some("users".into()),
                constraint_name: Some("users_email_key".into()),
                ..Default::default()
            },
        );

        match result {
            AppError::Duplicate {
                entity,
                field,
                value,
            } => {
                assert_eq!(entity, "users");
                assert_eq!(field, "email");
                assert_eq!(value, "ada@example.com");
            }
            other => panic!("Expected Duplicate error, got: {:?}", other),
        }
    }

    #[test]
    fn test_unique_violation_with_composite_key_in_message() {
        let result = convert(
            DatabaseErrorKind::UniqueViolation,
            MockDatabaseErrorInfo {
                message: "duplicate key value violates unique constraint \"applied_jobs_user_job_key\"\nDETAIL: Key (user_id, job_id)=(7, 1) already exists.".into(),
                constraint_name: Some("applied_jobs_user_job_key".into()),
                ..Default::default()
            },
        );

        match result {
            AppError::Duplicate {
                entity,
                field,
                value,
            } => {
                assert_eq!(entity, "applied_jobs");
                assert_eq!(field, "user_id, job_id");
                assert_eq!(value, "7, 1");
            }
            other => panic!("Expected Duplicate error, got: {:?}", other),
        }
    }

    #[test]
    fn test_not_null_violation() {
        let result = convert(
            DatabaseErrorKind::NotNullViolation,
            MockDatabaseErrorInfo {
                message: "null value in column \"title\" of relation \"jobs\" violates not-null constraint".into(),
                ..Default::default()
            },
        );

        match result {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "title");
                assert_eq!(reason, "Field is required for jobs");
            }
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_foreign_key_violation() {
        let result = convert(
            DatabaseErrorKind::ForeignKeyViolation,
            MockDatabaseErrorInfo {
                message: "insert or update on table \"saved_jobs\" violates foreign key constraint \"saved_jobs_job_id_fkey\"".into(),
                details: Some("Key (job_id)=(999) is not present in table \"jobs\".".into()),
                ..Default::default()
            },
        );

        match result {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "job_id");
                assert!(reason.contains("999"));
            }
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_check_violation() {
        let result = convert(
            DatabaseErrorKind::CheckViolation,
            MockDatabaseErrorInfo {
                message: "new row for relation \"jobs\" violates check constraint \"jobs_salary_min_check\"".into(),
                constraint_name: Some("jobs_salary_min_check".into()),
                ..Default::default()
            },
        );

        match result {
            AppError::Validation { field, .. } => assert_eq!(field, "salary_min"),
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_violation_falls_back_to_database_error() {
        let result = convert(
            DatabaseErrorKind::UniqueViolation,
            MockDatabaseErrorInfo {
                message: "duplicate key".into(),
                ..Default::default()
            },
        );
        assert!(matches!(result, AppError::Database { .. }));
    }

    #[test]
    fn test_column_of() {
        assert_eq!(column_of("email"), "email");
        assert_eq!(column_of("lower(email::text)"), "email");
        assert_eq!(column_of("lower((email)::text)"), "email");
    }
}
