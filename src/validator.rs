use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use campusdesk_core::AppError;

/// Flattens nested validation errors into `"field: message"` pairs.
fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .errors()
        .iter()
        .flat_map(|(field, kind)| match kind {
            ValidationErrorsKind::Field(errs) => errs
                .iter()
                .map(|e| match &e.message {
                    Some(msg) => format!("{field}: {msg}"),
                    None => format!("{field} is invalid"),
                })
                .collect::<Vec<_>>(),
            ValidationErrorsKind::Struct(inner) => vec![format_errors(inner)],
            ValidationErrorsKind::List(items) => {
                items.values().map(|inner| format_errors(inner)).collect()
            }
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

fn rejection_message(rejection: &JsonRejection) -> String {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return "Missing 'Content-Type: application/json' header".to_string();
    }

    let text = rejection.body_text();
    if let Some(field) = text
        .split("missing field `")
        .nth(1)
        .and_then(|s| s.split('`').next())
    {
        return format!("{field} is required");
    }
    if text.contains("unknown variant") || text.contains("invalid type") || text.contains("invalid value") {
        return "Invalid field value in request".to_string();
    }
    "Invalid request body".to_string()
}

/// `Json<T>` that also runs `validator` rules. Every failure is a 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(anyhow!(rejection_message(&rejection))))?;

        value
            .validate()
            .map_err(|errors| AppError::validation(anyhow!(format_errors(&errors))))?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 1, max = 5))]
        name: String,
        #[validate(range(min = 1))]
        count: i32,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let ValidatedJson(p) =
            ValidatedJson::<Payload>::from_request(json_request(r#"{"name":"ab","count":2}"#), &())
                .await
                .unwrap();
        assert_eq!(p.name, "ab");
    }

    #[tokio::test]
    async fn test_rule_violation_is_400() {
        let err = ValidatedJson::<Payload>::from_request(
            json_request(r#"{"name":"toolong","count":0}"#),
            &(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let msg = err.client_message();
        assert!(msg.contains("name"));
        assert!(msg.contains("count"));
    }

    #[tokio::test]
    async fn test_missing_field_named() {
        let err = ValidatedJson::<Payload>::from_request(json_request(r#"{"name":"ab"}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "count is required");
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let req = Request::builder()
            .body(Body::from(r#"{"name":"ab","count":2}"#))
            .unwrap();
        let err = ValidatedJson::<Payload>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
