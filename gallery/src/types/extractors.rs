//! Custom extractors for request validation

use axum::{
    extract::{rejection::FormRejection, FromRequest, Request},
    Form,
};
use validator::Validate;

use crate::types::error::AppError;

/// Form extractor that validates the payload
pub struct ValidatedForm<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedForm<T>
where
    T: serde::de::DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(payload) = Form::<T>::from_request(req, state)
            .await
            .map_err(|err| match err {
                FormRejection::InvalidFormContentType(_) => AppError::bad_request(
                    "Missing Content-Type: application/x-www-form-urlencoded header",
                ),
                _ => AppError::bad_request("Invalid form payload"),
            })?;

        payload.validate().map_err(|errors| {
            // Report the first field error that carries a message
            for field_errors in errors.field_errors().values() {
                if let Some(message) = field_errors.first().and_then(|e| e.message.as_ref()) {
                    return AppError::bad_request(message.to_string());
                }
            }
            AppError::bad_request("Invalid form payload")
        })?;

        Ok(Self(payload))
    }
}
