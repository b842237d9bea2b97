mod errors;
mod model;

pub use errors::StockError;
pub use model::{NewProduct, Product, ProductPatch, ProductVariant};
