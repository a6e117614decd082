use std::time::Duration;

use ajo_common::Secret;
use log::*;

pub const DEFAULT_PAYSTACK_BASE_URL: &str = "https://api.paystack.co";
pub const DEFAULT_PAYSTACK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PaystackConfig {
    /// The API root, without a trailing slash. Override this to point at a mock gateway.
    pub base_url: String,
    /// The Paystack secret key. It authenticates outbound calls and signs inbound webhooks.
    pub secret_key: Secret<String>,
    /// Upper bound for every outbound call.
    pub timeout: Duration,
}

impl Default for PaystackConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PAYSTACK_BASE_URL.to_string(),
            secret_key: Secret::default(),
            timeout: DEFAULT_PAYSTACK_TIMEOUT,
        }
    }
}

impl PaystackConfig {
    pub fn new(base_url: &str, secret_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: Secret::new(secret_key.to_string()),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("AJO_PAYSTACK_BASE_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| {
                info!("🪛️ AJO_PAYSTACK_BASE_URL not set, using {DEFAULT_PAYSTACK_BASE_URL}");
                DEFAULT_PAYSTACK_BASE_URL.to_string()
            });
        let secret_key = Secret::new(std::env::var("AJO_PAYSTACK_SECRET_KEY").unwrap_or_else(|_| {
            warn!("🪛️ AJO_PAYSTACK_SECRET_KEY not set. Gateway calls will fail and every webhook will be rejected.");
            String::default()
        }));
        let timeout = std::env::var("AJO_PAYSTACK_TIMEOUT")
            .map_err(|_| {
                info!(
                    "🪛️ AJO_PAYSTACK_TIMEOUT is not set. Using the default value of {}s.",
                    DEFAULT_PAYSTACK_TIMEOUT.as_secs()
                )
            })
            .and_then(|s| {
                s.parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for AJO_PAYSTACK_TIMEOUT. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_PAYSTACK_TIMEOUT);
        Self { base_url, secret_key, timeout }
    }
}
