use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;

use mostrador_core::ProductId;
use mostrador_products::NewProduct;

use crate::app::errors::{domain_error_response, json_error, store_error_response};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Catalog registration is admin-only; recording orders is not.
pub async fn create_product(
    Extension(services): Extension<AppServices>,
    Extension(principal): Extension<PrincipalContext>,
    Json(req): Json<NewProduct>,
) -> Response {
    if !principal.role.is_admin() {
        return json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "product registration requires the admin role",
        );
    }
    let product = match req.into_product(Utc::now()) {
        Ok(product) => product,
        Err(err) => return domain_error_response(&err),
    };
    match services.store.insert_product(&product).await {
        Ok(()) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(err) => store_error_response(&err),
    }
}

pub async fn list_products(Extension(services): Extension<AppServices>) -> Response {
    match services.store.products().await {
        Ok(products) => Json(products).into_response(),
        Err(err) => store_error_response(&err),
    }
}

pub async fn get_product(
    Extension(services): Extension<AppServices>,
    Path(id): Path<ProductId>,
) -> Response {
    match services.store.product(id).await {
        Ok(Some(product)) => Json(product).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "not_found", "no such product"),
        Err(err) => store_error_response(&err),
    }
}

pub async fn low_stock(Extension(services): Extension<AppServices>) -> Response {
    match services.store.low_stock_products().await {
        Ok(products) => Json(products).into_response(),
        Err(err) => store_error_response(&err),
    }
}
