// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Pure business rules with no persistence or HTTP concerns: catalog stock
// math, cart arithmetic, checkout validation, and the order lifecycle. The
// store layer runs these inside database transactions.
//
// ============================================================================

pub mod cart;
pub mod checkout;
pub mod order;
pub mod product;
