// ============================================================================
// Stock Business Rule Errors
// ============================================================================

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum StockError {
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Unknown variant size: {0}")]
    UnknownVariant(String),

    #[error("Product has size variants, a size must be selected")]
    SizeRequired,

    #[error("Product has no size variants, got size: {0}")]
    NotAVariantProduct(String),
}
