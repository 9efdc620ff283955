use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use mostrador_core::DomainError;
use mostrador_store::{LedgerError, StoreError};

/// Uniform error body: `{"error": {"code", "message"}}`.
pub fn json_error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": code, "message": message } })),
    )
        .into_response()
}

pub fn domain_error_response(err: &DomainError) -> Response {
    match err {
        DomainError::NotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", &err.to_string())
        }
        DomainError::Unauthorized => {
            json_error(StatusCode::FORBIDDEN, "forbidden", &err.to_string())
        }
        _ => json_error(StatusCode::BAD_REQUEST, "validation", &err.to_string()),
    }
}

pub fn store_error_response(err: &StoreError) -> Response {
    match err {
        StoreError::Constraint(message) => {
            json_error(StatusCode::CONFLICT, "conflict", message)
        }
        StoreError::Database(_) => {
            error!(%err, "storage failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "storage failure",
            )
        }
    }
}

pub fn ledger_error_response(err: &LedgerError) -> Response {
    match err {
        LedgerError::Domain(domain) => domain_error_response(domain),
        LedgerError::InsufficientStock {
            product_id,
            requested,
            available,
        } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": {
                    "code": "insufficient_stock",
                    "message": err.to_string(),
                    "product_id": product_id,
                    "requested": requested,
                    "available": available,
                }
            })),
        )
            .into_response(),
        LedgerError::ProductNotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "not_found", &err.to_string())
        }
        LedgerError::Store(store) => store_error_response(store),
    }
}
