//! Error envelope for HTTP responses.

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, FromRequestParts, Path},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

/// Body of every non-record response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Build a `{"message": ...}` response with the given status.
pub fn message(status: StatusCode, text: impl Into<String>) -> (StatusCode, Json<MessageResponse>) {
    (
        status,
        Json(MessageResponse {
            message: text.into(),
        }),
    )
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Referenced project or task does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Create or rename collides with an existing name.
    #[error("{0}")]
    DuplicateName(String),

    /// Request body is not valid JSON for the expected shape.
    #[error("{0}")]
    Decode(String),

    #[error("{0}")]
    Validation(String),

    /// A path segment could not be decoded, e.g. invalid percent-encoded UTF-8.
    #[error("{0}")]
    InvalidPath(String),

    #[error(transparent)]
    Storage(StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateName(_)
            | Self::Decode(_)
            | Self::Validation(_)
            | Self::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else if err.is_duplicate() {
            Self::DuplicateName(err.to_string())
        } else {
            Self::Storage(err)
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidPath(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Storage(err) => tracing::error!(error = %err, "Storage operation failed"),
            Self::DuplicateName(msg) => tracing::warn!("{}", msg),
            _ => tracing::debug!(status = %status, "{}", self),
        }
        message(status, self.to_string()).into_response()
    }
}

/// `Path` extractor whose rejection is rendered through [`ApiError`], so a
/// malformed segment still answers with the `{"message"}` envelope.
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Decode a JSON request body.
///
/// The `Content-Type` header is not checked.
pub fn decode_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Reject empty or whitespace-only names.
pub fn require_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("Name cannot be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct NameBody {
        name: String,
    }

    #[test]
    fn test_store_errors_map_to_statuses() {
        let not_found: ApiError = StoreError::ProjectNotFound("laundry".into()).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let duplicate: ApiError = StoreError::DuplicateTask {
            project: "homework".into(),
            task: "math".into(),
        }
        .into();
        assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            duplicate.to_string(),
            "task math already exists in project homework"
        );

        let storage: ApiError = StoreError::Poisoned.into();
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_decode_body() {
        let body: NameBody = decode_body(&Bytes::from_static(br#"{"name":"homework"}"#)).unwrap();
        assert_eq!(body.name, "homework");

        let err = decode_body::<NameBody>(&Bytes::from_static(b"{name")).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = decode_body::<NameBody>(&Bytes::new()).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_path_rejection_uses_message_envelope() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/projects/%FF")
            .body(())
            .unwrap()
            .into_parts();

        // Outside a router there are no captured segments, which axum rejects.
        let err = ApiPath::<String>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidPath(_)));
        assert!(!err.to_string().is_empty());

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[test]
    fn test_require_name() {
        assert!(require_name("homework").is_ok());
        assert!(matches!(require_name(""), Err(ApiError::Validation(_))));
        assert!(matches!(require_name("   "), Err(ApiError::Validation(_))));
    }
}
