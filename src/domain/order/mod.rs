// ============================================================================
// Order Domain - Checkout Result, Status Workflow, Line Items
// ============================================================================

mod errors;
mod model;
mod status;

pub use errors::OrderError;
pub use model::{generate_order_code, NewOrder, Order, OrderItem};
pub use status::OrderStatus;
