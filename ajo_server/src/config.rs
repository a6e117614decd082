use std::{env, time::Duration};

use ajo_engine::DEFAULT_CALLBACK_URL;
use log::*;
use paystack_tools::PaystackConfig;

const DEFAULT_AJO_HOST: &str = "127.0.0.1";
const DEFAULT_AJO_PORT: u16 = 8460;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/ajo_ledger.db";
const DEFAULT_CYCLE_ROLL_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Where Paystack sends the contributor's browser after checkout. This must reach `/payment/callback` on this
    /// server.
    pub callback_url: String,
    /// How often every group's cycle is checked for a month change. `None` disables the worker, in which case cycles
    /// are only rolled lazily when a group is read or credited.
    pub cycle_roll_interval: Option<Duration>,
    pub paystack: PaystackConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_AJO_HOST.to_string(),
            port: DEFAULT_AJO_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            callback_url: DEFAULT_CALLBACK_URL.to_string(),
            cycle_roll_interval: Some(DEFAULT_CYCLE_ROLL_INTERVAL),
            paystack: PaystackConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("AJO_HOST").ok().unwrap_or_else(|| DEFAULT_AJO_HOST.into());
        let port = env::var("AJO_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for AJO_PORT. {e} Using the default, {DEFAULT_AJO_PORT}, instead."
                    );
                    DEFAULT_AJO_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_AJO_PORT);
        let database_url = env::var("AJO_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ AJO_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let callback_url = env::var("AJO_CALLBACK_URL").ok().unwrap_or_else(|| {
            warn!(
                "🪛️ AJO_CALLBACK_URL is not set. Contributors will be sent back to {DEFAULT_CALLBACK_URL} after \
                 checkout, which is only correct for local development."
            );
            DEFAULT_CALLBACK_URL.to_string()
        });
        let cycle_roll_interval = configure_cycle_roll_interval();
        let paystack = PaystackConfig::new_from_env_or_default();
        Self { host, port, database_url, callback_url, cycle_roll_interval, paystack }
    }
}

fn configure_cycle_roll_interval() -> Option<Duration> {
    let minutes = env::var("AJO_CYCLE_ROLL_INTERVAL")
        .map_err(|_| {
            info!(
                "🪛️ AJO_CYCLE_ROLL_INTERVAL is not set. Using the default value of {} minutes.",
                DEFAULT_CYCLE_ROLL_INTERVAL.as_secs() / 60
            )
        })
        .and_then(|s| {
            s.parse::<u64>().map_err(|e| warn!("🪛️ Invalid configuration value for AJO_CYCLE_ROLL_INTERVAL. {e}"))
        })
        .ok();
    match minutes {
        Some(0) => {
            info!("🪛️ The cycle roll worker is disabled. Cycles will only roll when groups are accessed.");
            None
        },
        Some(m) => Some(Duration::from_secs(m * 60)),
        None => Some(DEFAULT_CYCLE_ROLL_INTERVAL),
    }
}
