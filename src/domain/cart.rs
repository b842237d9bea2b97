use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::order::OrderItem;
use super::product::Product;

// ============================================================================
// Cart - Client-Local Shopping State
// ============================================================================
//
// The server keeps no session cart; the cart is a plain value the client
// submits with checkout. Lines are keyed by (product, size) so the same ring
// in two sizes is two lines.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }

    pub fn into_order_item(self) -> OrderItem {
        OrderItem {
            product_id: self.product_id,
            name: self.name,
            unit_price: self.unit_price,
            quantity: self.quantity,
            size: self.size,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add units of a product. A line with the same product and size merges;
    /// the unit price is resolved once, honoring variant price overrides.
    pub fn add(&mut self, product: &Product, quantity: i32, size: Option<&str>) {
        if quantity <= 0 {
            return;
        }
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|l| l.product_id == product.id && l.size.as_deref() == size)
        {
            line.quantity += quantity;
            return;
        }
        self.items.push(CartItem {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price_for(size),
            quantity,
            size: size.map(str::to_string),
        });
    }

    pub fn remove(&mut self, product_id: Uuid, size: Option<&str>) {
        self.items
            .retain(|l| !(l.product_id == product_id && l.size.as_deref() == size));
    }

    /// Set the quantity of a line; zero or less removes it.
    pub fn update_quantity(&mut self, product_id: Uuid, quantity: i32, size: Option<&str>) {
        if quantity <= 0 {
            self.remove(product_id, size);
            return;
        }
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|l| l.product_id == product_id && l.size.as_deref() == size)
        {
            line.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn total_items(&self) -> i32 {
        self.items.iter().map(|l| l.quantity).sum()
    }

    pub fn total_price(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

}

// ============================================================================
// Unit Tests
// ============================================================================
