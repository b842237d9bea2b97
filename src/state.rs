use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::metrics::Metrics;
use crate::payment::{PaymentGateway, SandboxGateway};
use crate::store::{OrderStore, ProductStore};

/// Shared application state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<ProductStore>,
    pub orders: Arc<OrderStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub metrics: Arc<Metrics>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config, metrics: Arc<Metrics>) -> Self {
        Self {
            products: Arc::new(ProductStore::new(pool.clone())),
            orders: Arc::new(OrderStore::new(pool)),
            gateway: Arc::new(SandboxGateway),
            metrics,
            config: Arc::new(config),
        }
    }
}
