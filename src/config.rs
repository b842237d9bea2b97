use std::env;
use std::fmt::Debug;
use std::str::FromStr;

use tracing::info;

// ============================================================================
// Configuration - Environment Driven
// ============================================================================

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_db_connections: u32,
    pub payment: PaymentConfig,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub merchant_id: String,
    pub session_secret: String,
    pub webhook_secret: String,
    pub sandbox: bool,
}

impl Config {
    pub fn load() -> Self {
        Self {
            host: try_load("HOST", "0.0.0.0"),
            port: try_load("PORT", "8080"),
            database_url: try_load("DATABASE_URL", "postgres://localhost/salcedo_store"),
            max_db_connections: try_load("DATABASE_MAX_CONNECTIONS", "5"),
            payment: PaymentConfig {
                merchant_id: try_load("PAYMENT_MERCHANT_ID", "456879852"),
                session_secret: try_load("PAYMENT_SESSION_SECRET", "dev_session_secret"),
                webhook_secret: try_load("PAYMENT_WEBHOOK_SECRET", "dev_webhook_secret"),
                sandbox: try_load("PAYMENT_SANDBOX", "true"),
            },
        }
    }
}

fn try_load<T>(key: &str, default: &str) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    let raw = match env::var(key) {
        Ok(value) => value,
        Err(_) => {
            info!("{} not set, defaulting to {}", key, default);
            default.to_string()
        }
    };
    raw.parse().expect("Environment misconfigured!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let config = Config::load();
        assert!(!config.host.is_empty());
        assert!(config.max_db_connections > 0);
        assert!(!config.payment.merchant_id.is_empty());
    }
}
