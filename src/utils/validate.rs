//! Extractors that deserialize and then run `validator` rules.
//!
//! Both reject with [`AppError`], so malformed input and failed rules share
//! the error envelope.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Json, Request};
use axum::http::request::Parts;
use axum_extra::extract::{Query, QueryRejection};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Repeated keys (`?skills=a&skills=b`) deserialize into sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> AppResult<Self> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| AppError::from(e))?;
        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    #[serde(rename_all = "camelCase")]
    struct NotesBody {
        #[validate(length(max = 10, message = "Notes cannot exceed 10 characters"))]
        notes: Option<String>,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct PageQuery {
        #[validate(range(min = 1, message = "Page must be a positive integer"))]
        page: Option<u32>,
        #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
        limit: Option<u32>,
    }

    fn json_request(body: &str, content_type: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/test")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn query(uri: &str) -> AppResult<ValidatedQuery<PageQuery>> {
        let (mut parts, _) = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
            .into_parts();
        ValidatedQuery::<PageQuery>::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_json() {
        let request = json_request(r#"{"notes":"great"}"#, "application/json");
        let ValidatedJson(body) = ValidatedJson::<NotesBody>::from_request(request, &())
            .await
            .unwrap();
        assert_eq!(body.notes.as_deref(), Some("great"));
    }

    #[tokio::test]
    async fn test_json_rule_violation() {
        let request = json_request(r#"{"notes":"far too long for this"}"#, "application/json");
        match ValidatedJson::<NotesBody>::from_request(request, &()).await {
            Err(AppError::ValidationErrors { errors }) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "notes");
                assert_eq!(errors[0].message, "Notes cannot exceed 10 characters");
            }
            other => panic!("Expected ValidationErrors error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let request = json_request(r#"{"notes":"#, "application/json");
        assert!(matches!(
            ValidatedJson::<NotesBody>::from_request(request, &()).await,
            Err(AppError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let request = json_request(r#"{"notes":"x"}"#, "text/plain");
        assert!(matches!(
            ValidatedJson::<NotesBody>::from_request(request, &()).await,
            Err(AppError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn test_valid_query() {
        let ValidatedQuery(q) = query("/jobs?page=2&limit=50").await.unwrap();
        assert_eq!(q.page, Some(2));
        assert_eq!(q.limit, Some(50));
    }

    #[tokio::test]
    async fn test_query_limit_out_of_range() {
        match query("/jobs?limit=500").await {
            Err(AppError::ValidationErrors { errors }) => {
                assert_eq!(errors[0].field, "limit");
            }
            other => panic!("Expected ValidationErrors error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_not_a_number() {
        assert!(matches!(
            query("/jobs?page=abc").await,
            Err(AppError::BadRequest { .. })
        ));
    }
}
