// src/common/json.rs

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::common::error::AppError;

/// `axum::Json` whose rejection goes through [`AppError`], so a body that
/// doesn't parse gets the same `{success:false, ...}` envelope as any other
/// failed request.
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(AppJson(value))
    }
}

/// Best guess at which input field a deserialization error is about.
///
/// serde reports either "missing field `x`" or "x: <reason>" (a path such as
/// `features[2]` for nested values). Anything else is attributed to `body`.
pub(crate) fn rejected_field(detail: &str) -> (String, bool) {
    if let Some(rest) = detail.split("missing field `").nth(1) {
        if let Some((name, _)) = rest.split_once('`') {
            return (name.to_string(), true);
        }
    }

    for segment in detail.split(": ") {
        let head = segment
            .split(['.', '['])
            .next()
            .unwrap_or_default();
        let is_path = !head.is_empty()
            && head.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && head.chars().any(|c| c.is_ascii_lowercase());
        if is_path && segment.len() < detail.len() && !segment.contains(' ') {
            return (head.to_string(), false);
        }
    }

    ("body".to_string(), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request as HttpRequest, StatusCode},
        response::IntoResponse,
    };
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use uuid::Uuid;

    #[derive(Debug, Deserialize)]
    struct Order {
        #[allow(dead_code)]
        selected_pack_id: Uuid,
    }

    fn json_request(body: &'static str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn rejection(request: Request) -> (StatusCode, serde_json::Value) {
        let err = match AppJson::<Order>::from_request(request, &()).await {
            Ok(_) => panic!("body should have been rejected"),
            Err(err) => err,
        };
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn wrong_type_is_a_field_error_in_the_envelope() {
        let (status, body) = rejection(json_request(r#"{"selected_pack_id":"not-a-uuid"}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "The given data was invalid.");
        assert!(body["errors"]["selected_pack_id"].is_array());
    }

    #[tokio::test]
    async fn missing_field_is_reported_as_required() {
        let (status, body) = rejection(json_request("{}")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["selected_pack_id"][0], "The selected_pack_id field is required.");
    }

    #[tokio::test]
    async fn syntax_errors_keep_their_status() {
        let (status, body) = rejection(json_request("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn missing_content_type_is_unsupported_media() {
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/")
            .body(Body::from("{}"))
            .unwrap();
        let (status, body) = rejection(request).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["success"], false);
    }

    #[test]
    fn field_is_taken_from_the_error_path() {
        assert_eq!(
            rejected_field("Failed to deserialize the JSON body into the target type: price: invalid type: string \"x\", expected f64 at line 1 column 12"),
            ("price".to_string(), false)
        );
        assert_eq!(
            rejected_field("Failed to deserialize the JSON body into the target type: features[1]: invalid type: integer `3`, expected a string"),
            ("features".to_string(), false)
        );
        assert_eq!(
            rejected_field("Failed to deserialize the JSON body into the target type: missing field `name` at line 1 column 2"),
            ("name".to_string(), true)
        );
        assert_eq!(
            rejected_field("Failed to deserialize the JSON body into the target type: invalid type: sequence, expected struct Order"),
            ("body".to_string(), false)
        );
    }
}
