//! # Storefront Configuration
//!
//! Loaded once at startup, read-only afterwards.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`EKAKSHA_*`)
//! 2. Config file (`storefront.toml`, or the path in `EKAKSHA_CONFIG`)
//! 3. Defaults (this file)
//!
//! The cart and admin session are process-wide: one host serves one
//! browsing session, so the server listens on loopback by default.
//!
//! ```toml
//! # storefront.toml
//! bind_addr = "127.0.0.1:8080"
//! database_path = "/var/lib/ekaksha/ekaksha.db"
//! storage_dir = "/var/lib/ekaksha/storage"
//! objects_dir = "/var/lib/ekaksha/objects"
//! public_base_url = "https://shop.ekaksha.in"
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use ekaksha_core::{Money, IMAGE_BUCKET};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StartupError;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "EKAKSHA_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Address the HTTP server listens on.
    pub bind_addr: String,

    /// SQLite file holding catalog, coupons, orders and admins.
    pub database_path: PathBuf,

    /// Key-value storage directory for the persisted cart and admin session.
    pub storage_dir: PathBuf,

    /// Root of the object store; one sub-directory per bucket.
    pub objects_dir: PathBuf,

    /// Base URL public object links are built on.
    pub public_base_url: String,

    /// Bucket product images are uploaded to.
    pub image_bucket: String,

    pub currency_symbol: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        let data_dir = Self::default_data_dir().unwrap_or_else(|| PathBuf::from("."));
        StorefrontConfig {
            bind_addr: "127.0.0.1:8080".to_string(),
            database_path: data_dir.join("ekaksha.db"),
            storage_dir: data_dir.join("storage"),
            objects_dir: data_dir.join("objects"),
            public_base_url: "http://127.0.0.1:8080".to_string(),
            image_bucket: IMAGE_BUCKET.to_string(),
            currency_symbol: "₹".to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, StartupError> {
        let mut config = Self::default();

        let explicit = config_path.or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
        if let Some(path) = explicit.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Checks the values the server cannot start without.
    pub fn validate(&self) -> Result<(), StartupError> {
        self.socket_addr()?;

        if !self.public_base_url.starts_with("http://") && !self.public_base_url.starts_with("https://") {
            return Err(StartupError::Config(format!(
                "public_base_url must start with http:// or https://, got: {}",
                self.public_base_url
            )));
        }

        if self.image_bucket.trim().is_empty() {
            return Err(StartupError::Config("image_bucket must not be empty".into()));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, StartupError> {
        self.bind_addr
            .parse()
            .map_err(|_| StartupError::Config(format!("invalid bind_addr: {}", self.bind_addr)))
    }

    /// Formats an amount with the configured currency symbol.
    ///
    /// ```rust,ignore
    /// let config = StorefrontConfig::default();
    /// assert_eq!(config.format_price(Money::from_paise(99_950)), "₹999.50");
    /// ```
    pub fn format_price(&self, amount: Money) -> String {
        format!(
            "{}{}{}.{:02}",
            if amount.is_negative() { "-" } else { "" },
            self.currency_symbol,
            amount.rupees().abs(),
            amount.paise_part().abs()
        )
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("EKAKSHA_BIND_ADDR") {
            debug!(addr = %addr, "Overriding bind address from environment");
            self.bind_addr = addr;
        }

        if let Some(path) = std::env::var_os("EKAKSHA_DB_PATH") {
            self.database_path = PathBuf::from(path);
        }

        if let Some(dir) = std::env::var_os("EKAKSHA_STORAGE_DIR") {
            self.storage_dir = PathBuf::from(dir);
        }

        if let Some(dir) = std::env::var_os("EKAKSHA_OBJECTS_DIR") {
            self.objects_dir = PathBuf::from(dir);
        }

        if let Ok(url) = std::env::var("EKAKSHA_PUBLIC_BASE_URL") {
            debug!(url = %url, "Overriding public base URL from environment");
            self.public_base_url = url;
        }

        if let Ok(bucket) = std::env::var("EKAKSHA_IMAGE_BUCKET") {
            self.image_bucket = bucket;
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("in", "ekaksha", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }

    fn default_data_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("in", "ekaksha", "storefront")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }
}
