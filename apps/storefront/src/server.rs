//! # HTTP Surface
//!
//! Maps commands onto routes and streams change events over a WebSocket.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Routes                                               │
//! │                                                                         │
//! │  GET    /api/health                                                     │
//! │  GET    /api/cart                     DELETE /api/cart                  │
//! │  POST   /api/cart/items               DELETE /api/cart/items/{id}       │
//! │  POST   /api/cart/items/{id}/increment                                  │
//! │  POST   /api/cart/items/{id}/decrement                                  │
//! │  POST   /api/cart/coupon              DELETE /api/cart/coupon           │
//! │  GET    /api/coupons   /api/products   /api/categories                  │
//! │  GET    /api/images/{key}/url                                           │
//! │  GET    /storage/v1/object/public/{bucket}/{key}   (image bytes)        │
//! │  POST   /api/admin/login  /logout  /products  /categories  /coupons     │
//! │  POST   /api/admin/password                                             │
//! │  DELETE /api/admin/products/{id}                                        │
//! │  GET    /api/admin/orders  /overview                                    │
//! │  GET    /api/events   (WebSocket: {"key":"cart"} per change)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A page receiving `{"key":"cart"}` on `/api/events` re-reads
//! `GET /api/cart` before rendering again.

use std::future::Future;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use ekaksha_core::{AdminSession, Category, CouponDescriptor, Order};
use ekaksha_db::{NewCoupon, NewProduct};
use ekaksha_store::{ChangeEvent, CART_KEY};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::commands::{self, admin, cart, catalog, coupon};
use crate::error::{ApiResult, StartupError};
use crate::state::AppState;

// =============================================================================
// Request Bodies
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CouponRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub product: NewProduct,
    #[serde(default)]
    pub image: Option<admin::ImageUpload>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest {
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrdersParams {
    pub limit: Option<u32>,
}

// =============================================================================
// Router
// =============================================================================

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        // Cart
        .route("/api/cart", get(get_cart).delete(clear_cart))
        .route("/api/cart/items", post(add_to_cart))
        .route("/api/cart/items/{product_id}", delete(remove_from_cart))
        .route("/api/cart/items/{product_id}/increment", post(increment_item))
        .route("/api/cart/items/{product_id}/decrement", post(decrement_item))
        // Coupons
        .route("/api/cart/coupon", post(apply_coupon).delete(clear_coupon))
        .route("/api/coupons", get(list_coupons))
        // Catalog
        .route("/api/products", get(list_products))
        .route("/api/categories", get(list_categories))
        .route("/api/images/{key}/url", get(product_image_url))
        .route("/storage/v1/object/public/{bucket}/{key}", get(serve_object))
        // Admin
        .route("/api/admin/login", post(admin_login))
        .route("/api/admin/logout", post(admin_logout))
        .route("/api/admin/password", post(change_password))
        .route("/api/admin/products", post(create_product))
        .route("/api/admin/products/{product_id}", delete(delete_product))
        .route("/api/admin/categories", post(create_category))
        .route("/api/admin/coupons", post(create_coupon))
        .route("/api/admin/orders", get(list_orders))
        .route("/api/admin/overview", get(dashboard_overview))
        // Cross-page change signal
        .route("/api/events", get(events))
        .with_state(state)
}

/// Binds the configured address and serves until `shutdown` resolves.
pub async fn serve(
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), StartupError> {
    let addr = state.config.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Storefront listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Storefront stopped");
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = state.db.inner().health_check().await;
    Json(json!({ "status": "ok", "database": database }))
}

async fn get_cart(State(state): State<AppState>) -> Json<cart::CartResponse> {
    Json(cart::get_cart(&state.cart))
}

async fn add_to_cart(
    State(state): State<AppState>,
    Json(req): Json<AddItemRequest>,
) -> ApiResult<Json<cart::CartResponse>> {
    cart::add_to_cart(&state.db, &state.objects, &state.cart, &req.product_id, req.quantity)
        .await
        .map(Json)
}

async fn increment_item(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<Json<cart::CartResponse>> {
    cart::increment_item(&state.cart, &product_id).map(Json)
}

async fn decrement_item(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<Json<cart::CartResponse>> {
    cart::decrement_item(&state.cart, &product_id).map(Json)
}

async fn remove_from_cart(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<Json<cart::CartResponse>> {
    cart::remove_from_cart(&state.cart, &product_id).map(Json)
}

async fn clear_cart(State(state): State<AppState>) -> ApiResult<Json<cart::CartResponse>> {
    cart::clear_cart(&state.cart).map(Json)
}

async fn list_coupons(State(state): State<AppState>) -> ApiResult<Json<Vec<CouponDescriptor>>> {
    coupon::list_coupons(&state.db, commands::today()).await.map(Json)
}

async fn apply_coupon(
    State(state): State<AppState>,
    Json(req): Json<CouponRequest>,
) -> ApiResult<Json<cart::CartResponse>> {
    coupon::apply_coupon(&state.db, &state.cart, &req.code, commands::today())
        .await
        .map(Json)
}

async fn clear_coupon(State(state): State<AppState>) -> Json<cart::CartResponse> {
    Json(coupon::clear_coupon(&state.cart))
}

async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<catalog::CatalogParams>,
) -> ApiResult<Json<Vec<catalog::ProductView>>> {
    let (query, filter) = params.into_parts()?;
    catalog::list_products(&state.db, &state.objects, &query, &filter)
        .await
        .map(Json)
}

async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    catalog::list_categories(&state.db).await.map(Json)
}

async fn product_image_url(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<Value>> {
    let url = catalog::product_image_url(&state.objects, &key)?;
    Ok(Json(json!({ "url": url })))
}

/// Serves stored object bytes at their public URL.
async fn serve_object(
    State(state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    debug!(bucket = %bucket, key = %key, "serve_object");
    let bytes = state.objects.store().read_object(&bucket, &key).await?;
    Ok(([(header::CONTENT_TYPE, content_type_for(&key))], bytes))
}

async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AdminSession>> {
    admin::admin_login(&state.db, &state.session, &req.email, &req.password)
        .await
        .map(Json)
}

async fn admin_logout(State(state): State<AppState>) -> ApiResult<StatusCode> {
    admin::admin_logout(&state.session)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn change_password(
    State(state): State<AppState>,
    Json(req): Json<PasswordRequest>,
) -> ApiResult<StatusCode> {
    admin::change_password(&state.db, &state.session, &req.new_password, &req.confirm_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<catalog::ProductView>)> {
    let view =
        admin::create_product(&state.db, &state.objects, &state.session, req.product, req.image)
            .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<StatusCode> {
    admin::delete_product(&state.db, &state.objects, &state.session, &product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category =
        admin::create_category(&state.db, &state.session, &req.name, req.description.as_deref())
            .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn create_coupon(
    State(state): State<AppState>,
    Json(req): Json<NewCoupon>,
) -> ApiResult<(StatusCode, Json<CouponDescriptor>)> {
    let coupon = admin::create_coupon(&state.db, &state.session, req).await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<OrdersParams>,
) -> ApiResult<Json<Vec<Order>>> {
    admin::list_orders(&state.db, &state.session, params.limit)
        .await
        .map(Json)
}

async fn dashboard_overview(
    State(state): State<AppState>,
) -> ApiResult<Json<admin::DashboardOverview>> {
    admin::dashboard_overview(&state.db, &state.objects, &state.session)
        .await
        .map(Json)
}

// =============================================================================
// Change Events
// =============================================================================

/// WebSocket upgrade for the change stream.
///
/// The receiver is created before the upgrade completes, so nothing
/// published in between is missed.
async fn events(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let events = state.bus.events();
    ws.on_upgrade(move |socket| stream_events(socket, events))
}

async fn stream_events(socket: WebSocket, mut events: broadcast::Receiver<ChangeEvent>) {
    let (mut sender, mut receiver) = socket.split();
    debug!("Change stream opened");

    loop {
        tokio::select! {
            event = events.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Missed events collapse into one reload.
                        warn!(skipped, "Change stream lagged");
                        ChangeEvent { key: CART_KEY.to_string() }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let Ok(json) = serde_json::to_string(&event) else {
                    continue;
                };
                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    debug!("Change stream closed");
}

fn content_type_for(key: &str) -> &'static str {
    let extension = key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
