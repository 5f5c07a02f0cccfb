//! Public route handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::contact::{ContactFormInput, FieldError};
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::security::{client_identifier, rate_limit_headers};

const ACCEPTED_MESSAGE: &str =
    "お問い合わせを受け付けました。内容を確認の上、担当者よりご連絡いたします。";
const MALFORMED_MESSAGE: &str = "入力内容を確認してください。";

/// Body of every `/api/contact` response.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

pub async fn submit_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ContactFormInput>, JsonRejection>,
) -> Response {
    // Unreadable bodies never reach the limiter, so they carry no quota headers.
    // The status follows the rejection: 400 syntax, 413 too large, 415 media type.
    let Json(input) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            let status = rejection.status();
            tracing::debug!(
                request_id = %request_id(&headers),
                status = status.as_u16(),
                error = %rejection,
                "Malformed contact payload"
            );
            let body = ContactResponse {
                success: false,
                message: MALFORMED_MESSAGE,
                errors: None,
                message_id: None,
            };
            return (status, Json(body)).into_response();
        }
    };

    let client = client_identifier(&headers);
    let submission = state.contact.submit(&client, input).await;
    let quota = rate_limit_headers(&submission.rate_limit);

    match submission.result {
        Ok(receipt) => {
            let body = ContactResponse {
                success: true,
                message: ACCEPTED_MESSAGE,
                errors: None,
                message_id: Some(receipt.message_id),
            };
            (StatusCode::OK, quota, Json(body)).into_response()
        }
        Err(err) => {
            let body = ContactResponse {
                success: false,
                message: err.user_message(),
                errors: err.field_errors().map(<[FieldError]>::to_vec),
                message_id: None,
            };
            (err.status_code(), quota, Json(body)).into_response()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
