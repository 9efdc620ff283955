pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router, middleware as axum_middleware};

use mostrador_auth::JwtValidator;

use crate::middleware::{AuthState, auth_middleware};

pub use services::AppServices;

/// Assemble the full router. `/health` is the only unauthenticated route.
pub fn build_app(services: AppServices, jwt: Arc<dyn JwtValidator>) -> Router {
    let auth = AuthState { jwt };

    let protected = Router::new()
        .route(
            "/sales",
            post(routes::sales::record_sale).get(routes::sales::list_sales),
        )
        .route("/sales/today", get(routes::sales::sales_today))
        .route("/sales/:id", get(routes::sales::get_sale))
        .route(
            "/purchases",
            post(routes::purchases::record_purchase).get(routes::purchases::list_purchases),
        )
        .route("/purchases/:id", get(routes::purchases::get_purchase))
        .route(
            "/products",
            post(routes::products::create_product).get(routes::products::list_products),
        )
        .route("/products/low-stock", get(routes::products::low_stock))
        .route("/products/:id", get(routes::products::get_product))
        .route("/whoami", get(routes::system::whoami))
        .layer(axum_middleware::from_fn_with_state(auth, auth_middleware))
        .layer(Extension(services));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}
