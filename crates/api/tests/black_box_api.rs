//! Black-box tests: the real router served over a real socket, driven with
//! reqwest and real HS256 tokens.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

use mostrador_api::app::{AppServices, build_app};
use mostrador_auth::{Hs256JwtValidator, JwtClaims, Role};
use mostrador_core::UserId;

const SECRET: &[u8] = b"test-secret";

struct TestServer {
    base: String,
    client: reqwest::Client,
}

impl TestServer {
    async fn spawn() -> Self {
        let services = AppServices::in_memory();
        let app = build_app(services, Arc::new(Hs256JwtValidator::new(SECRET.to_vec())));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base: format!("http://{addr}"),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn post(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }
}

fn mint_token(role: &str) -> String {
    mint_token_for(UserId::new(), role)
}

fn mint_token_for(user: UserId, role: &str) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user,
        role: Role::new(role.to_string()),
        issued_at: now - Duration::minutes(1),
        expires_at: now + Duration::minutes(30),
    };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap()
}

async fn create_product(server: &TestServer, admin: &str, code: &str, stock: i64) -> String {
    let resp = server
        .post(
            "/products",
            admin,
            json!({
                "code": code,
                "name": format!("{code} product"),
                "purchase_price": 150,
                "sale_price": 200,
                "stock": stock,
                "min_stock": 1,
            }),
        )
        .await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn stock_of(server: &TestServer, token: &str, product_id: &str) -> i64 {
    let resp = server.get(&format!("/products/{product_id}"), token).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    body["stock"].as_i64().unwrap()
}

#[tokio::test]
async fn health_is_open_but_everything_else_requires_a_token() {
    let server = TestServer::spawn().await;

    let health = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(health.status(), 200);

    let sales = server.client.get(server.url("/sales")).send().await.unwrap();
    assert_eq!(sales.status(), 401);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let server = TestServer::spawn().await;

    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(),
        role: Role::new("vendedor"),
        issued_at: now - Duration::hours(2),
        expires_at: now - Duration::hours(1),
    };
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap();

    let resp = server.get("/sales", &token).await;
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn whoami_echoes_the_token_identity() {
    let server = TestServer::spawn().await;
    let user = UserId::new();
    let token = mint_token_for(user, "vendedor");

    let resp = server.get("/whoami", &token).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user_id"], json!(user));
    assert_eq!(body["role"], "vendedor");
}

#[tokio::test]
async fn product_registration_is_admin_only() {
    let server = TestServer::spawn().await;
    let seller = mint_token("vendedor");

    let resp = server
        .post(
            "/products",
            &seller,
            json!({
                "code": "SKU-1",
                "name": "Yerba 1kg",
                "purchase_price": 150,
                "sale_price": 200,
            }),
        )
        .await;
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn recording_a_sale_decrements_stock_and_returns_the_receipt() {
    let server = TestServer::spawn().await;
    let admin = mint_token("admin");
    let seller = mint_token("vendedor");

    let product = create_product(&server, &admin, "SKU-1", 10).await;

    let resp = server
        .post(
            "/sales",
            &seller,
            json!({
                "lines": [{ "product_id": product, "quantity": 3, "unit_price": 200 }],
            }),
        )
        .await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 600);
    assert!(body["order_number"].as_str().unwrap().starts_with("SALE-"));

    assert_eq!(stock_of(&server, &seller, &product).await, 7);

    let sales: Value = server.get("/sales", &seller).await.json().await.unwrap();
    assert_eq!(sales.as_array().unwrap().len(), 1);

    let today: Value = server
        .get("/sales/today", &seller)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(today.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn insufficient_stock_rejects_the_sale_and_changes_nothing() {
    let server = TestServer::spawn().await;
    let admin = mint_token("admin");
    let seller = mint_token("vendedor");

    let product = create_product(&server, &admin, "SKU-1", 2).await;

    let resp = server
        .post(
            "/sales",
            &seller,
            json!({
                "lines": [{ "product_id": product, "quantity": 3, "unit_price": 200 }],
            }),
        )
        .await;
    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "insufficient_stock");
    assert_eq!(body["error"]["requested"], 3);
    assert_eq!(body["error"]["available"], 2);

    assert_eq!(stock_of(&server, &seller, &product).await, 2);
    let sales: Value = server.get("/sales", &seller).await.json().await.unwrap();
    assert!(sales.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn sale_with_empty_lines_is_a_validation_error() {
    let server = TestServer::spawn().await;
    let seller = mint_token("vendedor");

    let resp = server.post("/sales", &seller, json!({ "lines": [] })).await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn discount_beyond_subtotal_is_a_validation_error() {
    let server = TestServer::spawn().await;
    let admin = mint_token("admin");
    let seller = mint_token("vendedor");

    let product = create_product(&server, &admin, "SKU-1", 10).await;

    let resp = server
        .post(
            "/sales",
            &seller,
            json!({
                "lines": [{ "product_id": product, "quantity": 1, "unit_price": 100 }],
                "discount": 500,
            }),
        )
        .await;
    assert_eq!(resp.status(), 400);
    assert_eq!(stock_of(&server, &seller, &product).await, 10);
}

#[tokio::test]
async fn recording_a_purchase_increments_stock() {
    let server = TestServer::spawn().await;
    let admin = mint_token("admin");

    let product = create_product(&server, &admin, "SKU-1", 4).await;

    let resp = server
        .post(
            "/purchases",
            &admin,
            json!({
                "supplier_id": "0191d5a0-0000-7000-8000-000000000001",
                "lines": [{ "product_id": product, "quantity": 20, "unit_price": 150 }],
            }),
        )
        .await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 3000);
    assert!(
        body["order_number"]
            .as_str()
            .unwrap()
            .starts_with("PURCHASE-")
    );

    assert_eq!(stock_of(&server, &admin, &product).await, 24);

    let purchases: Value = server.get("/purchases", &admin).await.json().await.unwrap();
    assert_eq!(purchases.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn sale_against_unknown_product_is_not_found() {
    let server = TestServer::spawn().await;
    let seller = mint_token("vendedor");

    let resp = server
        .post(
            "/sales",
            &seller,
            json!({
                "lines": [{
                    "product_id": "0191d5a0-0000-7000-8000-00000000dead",
                    "quantity": 1,
                    "unit_price": 100,
                }],
            }),
        )
        .await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn low_stock_listing_reflects_sales() {
    let server = TestServer::spawn().await;
    let admin = mint_token("admin");
    let seller = mint_token("vendedor");

    // min_stock is 1; selling down to 1 makes it low-stock
    let product = create_product(&server, &admin, "SKU-1", 3).await;
    let resp = server
        .post(
            "/sales",
            &seller,
            json!({
                "lines": [{ "product_id": product, "quantity": 2, "unit_price": 200 }],
            }),
        )
        .await;
    assert_eq!(resp.status(), 201);

    let low: Value = server
        .get("/products/low-stock", &seller)
        .await
        .json()
        .await
        .unwrap();
    let low = low.as_array().unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0]["code"], "SKU-1");
}
