use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;

use mostrador_core::OrderId;

use crate::app::dto::{RecordSaleRequest, RecordedOrderResponse};
use crate::app::errors::{
    domain_error_response, json_error, ledger_error_response, store_error_response,
};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn record_sale(
    Extension(services): Extension<AppServices>,
    Extension(principal): Extension<PrincipalContext>,
    Json(req): Json<RecordSaleRequest>,
) -> Response {
    let draft = match req.into_draft() {
        Ok(draft) => draft,
        Err(err) => return domain_error_response(&err),
    };
    match services.ledger.record_sale(principal.user_id, draft).await {
        Ok(order) => (
            StatusCode::CREATED,
            Json(RecordedOrderResponse::from(&order)),
        )
            .into_response(),
        Err(err) => ledger_error_response(&err),
    }
}

pub async fn list_sales(Extension(services): Extension<AppServices>) -> Response {
    match services.store.sales().await {
        Ok(sales) => Json(sales).into_response(),
        Err(err) => store_error_response(&err),
    }
}

pub async fn get_sale(
    Extension(services): Extension<AppServices>,
    Path(id): Path<OrderId>,
) -> Response {
    match services.store.sale(id).await {
        Ok(Some(sale)) => Json(sale).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "not_found", "no such sale"),
        Err(err) => store_error_response(&err),
    }
}

pub async fn sales_today(Extension(services): Extension<AppServices>) -> Response {
    match services.store.sales_on(Utc::now().date_naive()).await {
        Ok(sales) => Json(sales).into_response(),
        Err(err) => store_error_response(&err),
    }
}
