//! # Ekaksha Storefront
//!
//! Host process for the storefront and admin back-office: loads
//! configuration, wires state and serves commands over HTTP.
//!
//! ## Module Organization
//! ```text
//! storefront/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── server.rs       ◄─── axum routes + WebSocket change stream
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState and wiring
//! │   ├── db.rs       ◄─── Database + object store state
//! │   ├── cart.rs     ◄─── Cart Store + coupon selection
//! │   ├── session.rs  ◄─── Admin session gate
//! │   └── config.rs   ◄─── StorefrontConfig
//! ├── commands/
//! │   ├── cart.rs     ◄─── Cart mutations
//! │   ├── coupon.rs   ◄─── Coupon listing and selection
//! │   ├── catalog.rs  ◄─── Products, categories, image URLs
//! │   └── admin.rs    ◄─── Back-office commands
//! └── error.rs        ◄─── ApiError returned by commands
//! ```

pub mod commands;
pub mod error;
pub mod server;
pub mod state;

use tracing::info;
use tracing_subscriber::EnvFilter;

use error::StartupError;
use state::{AppState, StorefrontConfig};

/// Runs the storefront until Ctrl-C.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Load Configuration ── defaults ◄ storefront.toml ◄ EKAKSHA_* env    │
/// │  2. Connect to Database ── SQLite (WAL), run pending migrations         │
/// │  3. Open Storage ── persisted cart + admin session                      │
/// │  4. Wire State ── Cart Store subscribes to "cart" changes               │
/// │  5. Serve ── axum until Ctrl-C, then drain in-flight requests           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), StartupError> {
    info!("Starting Ekaksha storefront");

    let config = StorefrontConfig::load(None)?;
    let state = AppState::open(config).await?;
    info!("State initialized");

    server::serve(state, shutdown_signal()).await
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=ekaksha_store=trace` - Trace one crate only
/// - Default: `info,ekaksha=debug,storefront=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ekaksha=debug,storefront=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
