use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_PAYMENT_DELAY_MS: u64 = 2000;
const DEFAULT_CHECKOUT_TTL_SECS: u64 = 30 * 60;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Round trip of the simulated payment gateway.
    pub payment_delay: Duration,
    /// Idle time before an unfinished checkout is dropped.
    pub checkout_ttl: Duration,
    pub allowed_origins: Vec<String>,
    /// Enables HSTS.
    pub production: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            payment_delay: Duration::from_millis(DEFAULT_PAYMENT_DELAY_MS),
            checkout_ttl: Duration::from_secs(DEFAULT_CHECKOUT_TTL_SECS),
            allowed_origins: split_origins(DEFAULT_ALLOWED_ORIGINS),
            production: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();

        let bind_addr = parse_or("MARQUEE_BIND_ADDR", lookup("MARQUEE_BIND_ADDR"), defaults.bind_addr);
        let payment_delay = parse_or(
            "PAYMENT_DELAY_MS",
            lookup("PAYMENT_DELAY_MS"),
            DEFAULT_PAYMENT_DELAY_MS,
        );
        let checkout_ttl = parse_or(
            "CHECKOUT_TTL_SECS",
            lookup("CHECKOUT_TTL_SECS"),
            DEFAULT_CHECKOUT_TTL_SECS,
        );
        let allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|raw| split_origins(&raw))
            .unwrap_or(defaults.allowed_origins);
        let production = lookup("RUST_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        Self {
            bind_addr,
            payment_delay: Duration::from_millis(payment_delay),
            checkout_ttl: Duration::from_secs(checkout_ttl),
            allowed_origins,
            production,
        }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Config: invalid {} '{}', using {}", key, raw, default);
            default
        }),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
