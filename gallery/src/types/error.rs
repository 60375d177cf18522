//! Universal error handling for the gallery pages

use std::error::Error as StdError;
use std::fmt::Write as _;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::media_storage::BucketError;
use crate::views::{render, ErrorPage};

/// Application error rendered as a response
///
/// Client errors are answered with a plain text message, server errors with
/// the error page carrying the message and the chain of underlying causes.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    trace: Option<String>,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            trace: None,
        }
    }

    /// A 400 with the given message
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// A 500 describing `err` and its sources
    #[must_use]
    pub fn internal(err: &(dyn StdError + 'static)) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
            trace: Some(error_chain(err)),
        }
    }

    /// HTTP status of the response
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Human-readable error message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Formats an error followed by each of its sources, one per line
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut chain = format!("{err}");
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(chain, "\n  caused by: {cause}");
        source = cause.source();
    }
    chain
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!("Client error: {} - {}", self.status, self.message),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.status,
                self.trace.as_deref().unwrap_or(&self.message)
            ),
            _ => {}
        }

        if self.status.is_client_error() {
            return (self.status, self.message).into_response();
        }

        let page = ErrorPage {
            request_id: None,
            message: Some(self.message),
            trace: self.trace,
        };

        match render(&page) {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(err) => {
                tracing::error!("Failed to render error page: {err}");
                (self.status, page.message.unwrap_or_default()).into_response()
            }
        }
    }
}

/// Convert bucket errors to application errors
impl From<BucketError> for AppError {
    fn from(err: BucketError) -> Self {
        match &err {
            BucketError::InvalidInput(msg) => Self::bad_request(msg.clone()),
            _ => Self::internal(&err),
        }
    }
}
