use std::sync::Arc;

use tracing::{info, warn};

use mostrador_api::app::{AppServices, build_app};
use mostrador_auth::Hs256JwtValidator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mostrador_observability::init();

    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        warn!("JWT_SECRET not set, using insecure development secret");
        "dev-secret".to_string()
    });

    let services = AppServices::from_env().await?;
    let app = build_app(
        services,
        Arc::new(Hs256JwtValidator::new(secret.into_bytes())),
    );

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "mostrador-api listening");
    axum::serve(listener, app).await?;
    Ok(())
}
