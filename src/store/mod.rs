// ============================================================================
// Store Layer - PostgreSQL Repositories
// ============================================================================
//
// Thin sqlx repositories over the `products` and `orders` tables. Anything
// that touches stock runs the domain's stock math inside a transaction with
// the affected product rows locked.
//
// ============================================================================

mod orders;
mod products;

pub use orders::OrderStore;
pub use products::ProductStore;

use crate::domain::order::OrderError;
use crate::domain::product::StockError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
