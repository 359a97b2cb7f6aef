//! Request body extraction with validation
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that has been deserialized and passed its `validator` rules
///
/// Any failure, malformed JSON or a failed rule alike, is a 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, response::IntoResponse, routing::post, Router};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct TokenBody {
        #[validate(length(min = 1))]
        token: String,
    }

    async fn handler(ValidatedJson(body): ValidatedJson<TokenBody>) -> impl IntoResponse {
        body.token
    }

    async fn status_for(body: &'static str) -> StatusCode {
        let app = Router::new().route("/", post(handler));
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        assert_eq!(status_for(r#"{"token":"abc"}"#).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_bad_bodies_are_400() {
        assert_eq!(status_for("not json").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_for(r#"{"other":1}"#).await, StatusCode::BAD_REQUEST);
        assert_eq!(status_for(r#"{"token":""}"#).await, StatusCode::BAD_REQUEST);
    }
}
