//! JSON extractor that also runs `validator::Validate`
//!
//! Malformed bodies keep the status axum assigns to the rejection (400 for
//! syntax errors, 415 for a missing content type, 422 for wrong field types).
//! Bodies that parse but fail validation are answered with 422 and a list of
//! `field: message` pairs in the envelope's `error`.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use super::ApiResponse;

/// ```ignore
/// async fn create_member(ValidatedJson(body): ValidatedJson<CreateMemberRequest>) { .. }
/// ```
pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    Json(JsonRejection),
    Invalid(ValidationErrors),
}

/// Flatten field and struct-level errors into `field: message`, sorted by field.
fn describe(errors: &ValidationErrors) -> String {
    let mut messages: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (field, kind) in errors.errors() {
        if let ValidationErrorsKind::Field(errs) = kind {
            for e in errs {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                messages.entry(field.to_string()).or_default().push(msg);
            }
        }
    }

    if messages.is_empty() {
        return "Validation failed".to_string();
    }
    messages
        .into_iter()
        .map(|(field, msgs)| match field.as_str() {
            "__all__" => msgs.join(", "),
            _ => format!("{}: {}", field, msgs.join(", ")),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Json(rejection) => {
                let status = rejection.status();
                let body = ApiResponse::<()>::error(format!("Invalid JSON: {}", rejection.body_text()));
                (status, Json(body)).into_response()
            }
            Self::Invalid(errors) => {
                let body = ApiResponse::<()>::error(describe(&errors));
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
        }
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Json)?;
        value.validate().map_err(ValidatedJsonRejection::Invalid)?;
        Ok(ValidatedJson(value))
    }
}
