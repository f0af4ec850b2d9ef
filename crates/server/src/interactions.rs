//! The interactions webhook endpoint.
//!
//! - `POST /interactions` — signed Discord interaction payloads
//!
//! Signature verification runs over the raw request bytes before any JSON
//! parsing, so the handler takes `Bytes` rather than an extracted `Json`
//! body. Requests that fail verification get a plain-text 401 and never
//! reach dispatch.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use omfori_discord::interactions::{dispatch, Interaction};
use omfori_discord::verify::{
    RequestVerifier, VerifyError, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
use tracing::warn;

#[derive(Clone)]
pub struct InteractionsState {
    verifier: Arc<RequestVerifier>,
}

pub fn router(verifier: Arc<RequestVerifier>) -> Router {
    Router::new()
        .route("/interactions", post(interactions))
        .with_state(InteractionsState { verifier })
}

pub async fn interactions(
    State(state): State<InteractionsState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(error) = verify_request(&state.verifier, &headers, &body) {
        warn!(
            event_name = "interactions.signature_rejected",
            error = %error,
            "rejected interaction with a bad request signature"
        );
        return (StatusCode::UNAUTHORIZED, "Bad request signature").into_response();
    }

    let interaction: Interaction = match serde_json::from_slice(&body) {
        Ok(interaction) => interaction,
        Err(error) => {
            warn!(
                event_name = "interactions.malformed_payload",
                error = %error,
                "verified request carried a malformed interaction payload"
            );
            return (StatusCode::BAD_REQUEST, "Malformed interaction payload").into_response();
        }
    };

    Json(dispatch(&interaction)).into_response()
}

fn verify_request(
    verifier: &RequestVerifier,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), VerifyError> {
    let signature = header_str(headers, SIGNATURE_HEADER)
        .ok_or(VerifyError::MissingHeader(SIGNATURE_HEADER))?;
    let timestamp = header_str(headers, TIMESTAMP_HEADER)
        .ok_or(VerifyError::MissingHeader(TIMESTAMP_HEADER))?;

    verifier.verify(timestamp, body, signature)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
