use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::json;

use crate::context::PrincipalContext;

pub async fn health() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> Response {
    Json(json!({
        "user_id": principal.user_id,
        "role": principal.role,
    }))
    .into_response()
}
