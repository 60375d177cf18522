use axum::{http::HeaderMap, response::Html};
use uuid::Uuid;

use crate::{
    types::AppError,
    views::{render, ErrorPage, PrivacyPage},
};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Renders the privacy notice
///
/// # Errors
///
/// Returns a 500 if the page fails to render
pub async fn privacy() -> Result<Html<String>, AppError> {
    let html = render(&PrivacyPage {}).map_err(|e| AppError::internal(&e))?;
    Ok(Html(html))
}

/// Renders the error page for the current request id
///
/// # Errors
///
/// Returns a 500 if the page fails to render
pub async fn error(headers: HeaderMap) -> Result<Html<String>, AppError> {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), ToString::to_string);

    let page = ErrorPage {
        request_id: Some(request_id),
        message: None,
        trace: None,
    };

    let html = render(&page).map_err(|e| AppError::internal(&e))?;
    Ok(Html(html))
}
