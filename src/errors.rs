use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

/// Error returned by every gateway handler.
///
/// Renders as `{"success": false, "message": ..., "error": ...}` where `error`
/// carries the raw backend text when there is one.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub error: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            error: None,
        }
    }

    /// Attach the underlying error text.
    pub fn with_error(mut self, err: impl fmt::Display) -> Self {
        self.error = Some(err.to_string());
        self
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            Some(err) => write!(f, "{}: {}", self.message, err),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = self.status.as_u16(), error = %self, "request rejected");
        }

        let body = Json(ErrorBody {
            success: false,
            message: &self.message,
            error: self.error.as_deref(),
        });

        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal("Internal server error").with_error(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn error_text_is_included_when_present() {
        let (status, body) =
            render(AppError::internal("Failed to list objects").with_error("access denied")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({
                "success": false,
                "message": "Failed to list objects",
                "error": "access denied"
            })
        );
    }

    #[tokio::test]
    async fn error_field_is_omitted_without_detail() {
        let (status, body) = render(AppError::not_found("Object not found: a.png")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({ "success": false, "message": "Object not found: a.png" })
        );
    }

    #[test]
    fn display_joins_message_and_detail() {
        let err = AppError::bad_request("No files were uploaded.").with_error("missing boundary");
        assert_eq!(err.to_string(), "No files were uploaded.: missing boundary");
    }
}
