use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};

use mostrador_core::OrderId;

use crate::app::dto::{RecordPurchaseRequest, RecordedOrderResponse};
use crate::app::errors::{
    domain_error_response, json_error, ledger_error_response, store_error_response,
};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn record_purchase(
    Extension(services): Extension<AppServices>,
    Extension(principal): Extension<PrincipalContext>,
    Json(req): Json<RecordPurchaseRequest>,
) -> Response {
    let draft = match req.into_draft() {
        Ok(draft) => draft,
        Err(err) => return domain_error_response(&err),
    };
    match services
        .ledger
        .record_purchase(principal.user_id, draft)
        .await
    {
        Ok(order) => (
            StatusCode::CREATED,
            Json(RecordedOrderResponse::from(&order)),
        )
            .into_response(),
        Err(err) => ledger_error_response(&err),
    }
}

pub async fn list_purchases(Extension(services): Extension<AppServices>) -> Response {
    match services.store.purchases().await {
        Ok(purchases) => Json(purchases).into_response(),
        Err(err) => store_error_response(&err),
    }
}

pub async fn get_purchase(
    Extension(services): Extension<AppServices>,
    Path(id): Path<OrderId>,
) -> Response {
    match services.store.purchase(id).await {
        Ok(Some(purchase)) => Json(purchase).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "not_found", "no such purchase"),
        Err(err) => store_error_response(&err),
    }
}
