//! Runtime configuration read from the environment.
//!
//! Only the binary reads [`APP_CONFIG`]; library users pass an [`AppConfig`]
//! (or plain values) to the constructors that need them.

use envconfig::Envconfig;
use std::{sync::LazyLock, time::Duration};

/// Environment variables used to configure the widget backend client.
#[derive(Envconfig, Clone, Debug)]
pub struct AppConfig {
    /// Environment name. Values: "local", "dev", "staging", "prod"
    #[envconfig(default = "local")]
    pub env: String,

    /// Base URL of the storefront exposing the `/payment/turkey_pos/*` routes
    /// Example: "https://shop.example.com.tr"
    #[envconfig(default = "http://localhost:8069")]
    pub backend_url: String,

    /// Timeout applied to every backend request
    #[envconfig(default = "10")]
    pub http_timeout_secs: u64,

    /// ISO currency code the storefront prices in
    #[envconfig(default = "TRY")]
    pub currency_code: String,
}

impl AppConfig {
    /// Checks if running in production environment
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }

    /// Debug logging is honored outside production only.
    pub fn debug_logging(&self, requested: bool) -> bool {
        requested && !self.is_prod()
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Global configuration, loaded on first access.
pub static APP_CONFIG: LazyLock<AppConfig> = LazyLock::new(|| {
    AppConfig::init_from_env()
        .expect("Failed to load application configuration. Check environment variables.")
});
