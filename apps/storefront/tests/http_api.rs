//! Drives the storefront router end to end with in-memory backends.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Local};
use ekaksha_core::{Money, Size, StockStatus};
use ekaksha_db::{Database, DbConfig, NewCoupon, NewProduct};
use ekaksha_store::{ChangeBus, MemoryStorage, CART_KEY};
use serde_json::{json, Value};
use storefront::server::router;
use storefront::state::{AppState, StorefrontConfig};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    state: AppState,
    app: Router,
    storage: Arc<MemoryStorage>,
    _objects: TempDir,
}

async fn setup() -> TestApp {
    let objects = tempfile::tempdir().unwrap();
    let config = StorefrontConfig {
        objects_dir: objects.path().to_path_buf(),
        public_base_url: "http://shop.test".to_string(),
        ..StorefrontConfig::default()
    };
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let storage = Arc::new(MemoryStorage::new());
    let state = AppState::new(config, db, storage.clone(), ChangeBus::new());

    TestApp {
        app: router(state.clone()),
        state,
        storage,
        _objects: objects,
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn kurta() -> NewProduct {
    NewProduct {
        name: "Cotton Kurta".to_string(),
        offer_quantity: 2,
        offer_price: Money::from_rupees(1000),
        sizes: vec![Size::M, Size::L],
        category: "Men".to_string(),
        description: Some("2 kurtas for ₹1000".to_string()),
        stock_status: StockStatus::InStock,
    }
}

async fn login(test: &TestApp) {
    test.state
        .db
        .inner()
        .admins()
        .insert("admin@ekaksha.in", "secret123", "admin")
        .await
        .unwrap();
    let (status, body) = send(
        &test.app,
        Method::POST,
        "/api/admin/login",
        Some(json!({ "email": "admin@ekaksha.in", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "admin@ekaksha.in");
}

#[tokio::test]
async fn cart_flow_with_coupon() {
    let test = setup().await;
    let product = test.state.db.inner().products().insert(&kurta()).await.unwrap();
    let today = Local::now().date_naive();
    test.state
        .db
        .inner()
        .coupons()
        .insert(&NewCoupon {
            code: "FESTIVE25".to_string(),
            discount_percent: 25,
            expiry_date: Some(today + Duration::days(30)),
            description: None,
        })
        .await
        .unwrap();

    let (status, body) = send(
        &test.app,
        Method::POST,
        "/api/cart/items",
        Some(json!({ "productId": product.id, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["quantityInCart"], 2);
    assert_eq!(body["summary"]["totalItems"], 4);
    assert_eq!(body["summary"]["subtotal"], 200_000);

    let uri = format!("/api/cart/items/{}/increment", product.id);
    let (status, body) = send(&test.app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["quantityInCart"], 3);

    let (status, body) = send(
        &test.app,
        Method::POST,
        "/api/cart/coupon",
        Some(json!({ "code": "festive25" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["couponCode"], "FESTIVE25");
    assert_eq!(body["summary"]["discountAmount"], 75_000);
    assert_eq!(body["summary"]["grandTotal"], 225_000);

    let (status, body) = send(&test.app, Method::DELETE, "/api/cart/coupon", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["grandTotal"], 300_000);

    let (status, body) = send(&test.app, Method::GET, "/api/coupons", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&test.app, Method::DELETE, "/api/cart", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn error_codes_reach_the_client() {
    let test = setup().await;

    let (status, body) =
        send(&test.app, Method::POST, "/api/cart/items/ghost/decrement", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = send(
        &test.app,
        Method::POST,
        "/api/cart/coupon",
        Some(json!({ "code": "NOPE" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_COUPON");

    let (status, body) = send(&test.app, Method::GET, "/api/admin/overview", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, body) = send(&test.app, Method::GET, "/api/products?size=XXXL", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn storage_failure_is_reported_but_cart_stays_usable() {
    let test = setup().await;
    let product = test.state.db.inner().products().insert(&kurta()).await.unwrap();

    test.storage.set_disabled(true);
    let (status, body) = send(
        &test.app,
        Method::POST,
        "/api/cart/items",
        Some(json!({ "productId": product.id })),
    )
    .await;
    assert_eq!(status, StatusCode::INSUFFICIENT_STORAGE);
    assert_eq!(body["code"], "PERSISTENCE_ERROR");

    let (status, body) = send(&test.app, Method::GET, "/api/cart", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn catalog_outage_keeps_cart_available() {
    let test = setup().await;
    test.state.db.inner().close().await;

    let (status, body) = send(&test.app, Method::GET, "/api/products", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "UPSTREAM_FETCH_ERROR");

    let (status, _) = send(&test.app, Method::GET, "/api/cart", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn cart_changes_are_published() {
    let test = setup().await;
    let product = test.state.db.inner().products().insert(&kurta()).await.unwrap();
    let mut events = test.state.bus.events();

    send(
        &test.app,
        Method::POST,
        "/api/cart/items",
        Some(json!({ "productId": product.id })),
    )
    .await;

    let event = events.recv().await.unwrap();
    assert_eq!(event.key, CART_KEY);
}

#[tokio::test]
async fn admin_uploads_product_image_and_it_is_served() {
    let test = setup().await;
    login(&test).await;

    let mut product = serde_json::to_value(kurta()).unwrap();
    product["name"] = json!("Silk Saree");
    let (status, body) = send(
        &test.app,
        Method::POST,
        "/api/admin/products",
        Some(json!({
            "product": product,
            "image": { "fileName": "saree.png", "data": [137, 80, 78, 71] }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let image_url = body["imageUrl"].as_str().unwrap().to_string();
    let path = image_url.trim_start_matches("http://shop.test");

    let response = test
        .app
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], &[137, 80, 78, 71]);

    let (status, body) = send(&test.app, Method::GET, "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Silk Saree");
    assert_eq!(body[0]["imageUrl"], image_url.as_str());

    let (status, _) = send(&test.app, Method::POST, "/api/admin/logout", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&test.app, Method::GET, "/api/admin/orders", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_reports_database() {
    let test = setup().await;
    let (status, body) = send(&test.app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], true);
}
