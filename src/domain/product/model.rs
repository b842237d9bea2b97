use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::StockError;

// ============================================================================
// Product - Catalog Entry with Simple or Variant-Based Stock
// ============================================================================
//
// A product either tracks a single `stock` counter, or carries sized
// variants. For a variant-bearing product the invariant is:
//
//     stock == sum(variant.stock)    and    in_stock == stock > 0
//
// Both stock operations below re-derive the totals so the invariant can
// never drift.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub size: String,
    pub stock: i32,
    /// Optional per-size price override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub description: String,
    pub main_image: String,
    pub additional_images: Vec<String>,
    pub featured: bool,
    pub in_stock: bool,
    pub stock: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<ProductVariant>>,
}

impl Product {
    /// Unit price for the chosen size, falling back to the base price when
    /// the variant carries no override.
    pub fn price_for(&self, size: Option<&str>) -> f64 {
        if let (Some(variants), Some(size)) = (&self.variants, size) {
            if let Some(variant) = variants.iter().find(|v| v.size == size) {
                if let Some(price) = variant.price {
                    return price;
                }
            }
        }
        self.price
    }

    /// Deduct sold units from the product.
    ///
    /// Variant products deduct from the matching size and recompute the
    /// total; simple products deduct from the single counter. Counters are
    /// clamped at zero.
    pub fn deduct(&mut self, quantity: i32, size: Option<&str>) -> Result<(), StockError> {
        if quantity <= 0 {
            return Err(StockError::InvalidQuantity(quantity));
        }

        match (&mut self.variants, size) {
            (Some(variants), Some(size)) => {
                let variant = variants
                    .iter_mut()
                    .find(|v| v.size == size)
                    .ok_or_else(|| StockError::UnknownVariant(size.to_string()))?;
                variant.stock = (variant.stock - quantity).max(0);
                self.stock = variants.iter().map(|v| v.stock).sum();
            }
            (Some(_), None) => return Err(StockError::SizeRequired),
            (None, Some(size)) => return Err(StockError::NotAVariantProduct(size.to_string())),
            (None, None) => {
                self.stock = (self.stock - quantity).max(0);
            }
        }

        self.in_stock = self.stock > 0;
        Ok(())
    }

    /// Return previously sold units to the product. Inverse of [`deduct`],
    /// used when an order or a single line item is deleted.
    ///
    /// [`deduct`]: Product::deduct
    pub fn restock(&mut self, quantity: i32, size: Option<&str>) -> Result<(), StockError> {
        if quantity <= 0 {
            return Err(StockError::InvalidQuantity(quantity));
        }

        match (&mut self.variants, size) {
            (Some(variants), Some(size)) => {
                let variant = variants
                    .iter_mut()
                    .find(|v| v.size == size)
                    .ok_or_else(|| StockError::UnknownVariant(size.to_string()))?;
                variant.stock += quantity;
                self.stock = variants.iter().map(|v| v.stock).sum();
            }
            (Some(_), None) => return Err(StockError::SizeRequired),
            (None, Some(size)) => return Err(StockError::NotAVariantProduct(size.to_string())),
            (None, None) => {
                self.stock += quantity;
            }
        }

        self.in_stock = self.stock > 0;
        Ok(())
    }
}

// ============================================================================
// Admin Payloads
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub main_image: String,
    #[serde(default)]
    pub additional_images: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub variants: Option<Vec<ProductVariant>>,
}

impl NewProduct {
    /// Totals for variant products are derived, never trusted from the
    /// client. Negative per-size counts are clamped before summing so the
    /// total always equals the sum of the variants.
    pub fn into_product(self) -> Product {
        let variants = self.variants.filter(|v| !v.is_empty()).map(clamp_variants);
        let stock = variants
            .as_ref()
            .map(|vs| vs.iter().map(|v| v.stock).sum())
            .unwrap_or(self.stock)
            .max(0);

        Product {
            id: Uuid::new_v4(),
            name: self.name,
            price: self.price,
            category: self.category,
            description: self.description,
            main_image: self.main_image,
            additional_images: self.additional_images,
            featured: self.featured,
            in_stock: stock > 0,
            stock,
            variants,
        }
    }
}

/// Partial update; omitted fields keep their current value. Sending an empty
/// variant list switches the product back to simple stock tracking.
#[derive(Debug, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub main_image: Option<String>,
    pub additional_images: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub stock: Option<i32>,
    pub variants: Option<Vec<ProductVariant>>,
}

impl ProductPatch {
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(main_image) = self.main_image {
            product.main_image = main_image;
        }
        if let Some(additional_images) = self.additional_images {
            product.additional_images = additional_images;
        }
        if let Some(featured) = self.featured {
            product.featured = featured;
        }
        if let Some(variants) = self.variants {
            product.variants = if variants.is_empty() {
                None
            } else {
                Some(clamp_variants(variants))
            };
        }
        if let Some(stock) = self.stock {
            if product.variants.is_none() {
                product.stock = stock.max(0);
            }
        }
        if let Some(variants) = &product.variants {
            product.stock = variants.iter().map(|v| v.stock).sum();
        }
        product.in_stock = product.stock > 0;
    }
}

fn clamp_variants(mut variants: Vec<ProductVariant>) -> Vec<ProductVariant> {
    for variant in &mut variants {
        variant.stock = variant.stock.max(0);
    }
    variants
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_product(stock: i32) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Collar Corazón Eterno".to_string(),
            price: 2299.0,
            category: "Collares".to_string(),
            description: String::new(),
            main_image: String::new(),
            additional_images: vec![],
            featured: false,
            in_stock: stock > 0,
            stock,
            variants: None,
        }
    }

    fn ring_with_sizes() -> Product {
        Product {
            variants: Some(vec![
                ProductVariant {
                    size: "6".to_string(),
                    stock: 3,
                    price: None,
                },
                ProductVariant {
                    size: "7".to_string(),
                    stock: 2,
                    price: Some(3799.0),
                },
            ]),
            stock: 5,
            ..simple_product(5)
        }
    }

    #[test]
    fn deduct_simple_product() {
        let mut product = simple_product(10);
        product.deduct(3, None).unwrap();
        assert_eq!(product.stock, 7);
        assert!(product.in_stock);
    }

    #[test]
    fn deduct_to_zero_marks_out_of_stock() {
        let mut product = simple_product(4);
        product.deduct(4, None).unwrap();
        assert_eq!(product.stock, 0);
        assert!(!product.in_stock);
    }

    #[test]
    fn deduct_clamps_at_zero() {
        let mut product = simple_product(2);
        product.deduct(5, None).unwrap();
        assert_eq!(product.stock, 0);
        assert!(!product.in_stock);
    }

    #[test]
    fn deduct_variant_keeps_sum_invariant() {
        let mut product = ring_with_sizes();
        product.deduct(2, Some("6")).unwrap();

        let variants = product.variants.as_ref().unwrap();
        assert_eq!(variants[0].stock, 1);
        assert_eq!(variants[1].stock, 2);
        assert_eq!(product.stock, variants.iter().map(|v| v.stock).sum::<i32>());
        assert_eq!(product.stock, 3);
    }

    #[test]
    fn deduct_unknown_size_is_rejected() {
        let mut product = ring_with_sizes();
        let err = product.deduct(1, Some("9")).unwrap_err();
        assert_eq!(err, StockError::UnknownVariant("9".to_string()));
        assert_eq!(product.stock, 5);
    }

    #[test]
    fn deduct_variant_product_requires_size() {
        let mut product = ring_with_sizes();
        assert_eq!(product.deduct(1, None).unwrap_err(), StockError::SizeRequired);
    }

    #[test]
    fn deduct_rejects_non_positive_quantity() {
        let mut product = simple_product(5);
        assert_eq!(
            product.deduct(0, None).unwrap_err(),
            StockError::InvalidQuantity(0)
        );
    }

    #[test]
    fn restock_restores_exact_quantity_to_variant() {
        let mut product = ring_with_sizes();
        product.deduct(2, Some("7")).unwrap();
        assert_eq!(product.stock, 3);
        assert!(product.in_stock);

        product.restock(2, Some("7")).unwrap();
        let variants = product.variants.as_ref().unwrap();
        assert_eq!(variants[1].stock, 2);
        assert_eq!(product.stock, 5);
    }

    #[test]
    fn restock_revives_out_of_stock_product() {
        let mut product = simple_product(1);
        product.deduct(1, None).unwrap();
        assert!(!product.in_stock);

        product.restock(1, None).unwrap();
        assert_eq!(product.stock, 1);
        assert!(product.in_stock);
    }

    #[test]
    fn price_for_uses_variant_override() {
        let product = ring_with_sizes();
        assert_eq!(product.price_for(Some("7")), 3799.0);
        assert_eq!(product.price_for(Some("6")), 2299.0);
        assert_eq!(product.price_for(None), 2299.0);
    }

    #[test]
    fn new_product_derives_stock_from_variants() {
        let new = NewProduct {
            name: "Anillo Solitario".to_string(),
            price: 3599.0,
            category: "Anillos".to_string(),
            description: String::new(),
            main_image: String::new(),
            additional_images: vec![],
            featured: true,
            stock: 99, // ignored for variant products
            variants: Some(vec![
                ProductVariant {
                    size: "6".to_string(),
                    stock: 1,
                    price: None,
                },
                ProductVariant {
                    size: "7".to_string(),
                    stock: 2,
                    price: None,
                },
            ]),
        };

        let product = new.into_product();
        assert_eq!(product.stock, 3);
        assert!(product.in_stock);
    }

    #[test]
    fn new_product_clamps_negative_variant_stock() {
        let new = NewProduct {
            name: "Anillo Solitario".to_string(),
            price: 3599.0,
            category: "Anillos".to_string(),
            description: String::new(),
            main_image: String::new(),
            additional_images: vec![],
            featured: false,
            stock: 0,
            variants: Some(vec![
                ProductVariant {
                    size: "6".to_string(),
                    stock: -5,
                    price: None,
                },
                ProductVariant {
                    size: "7".to_string(),
                    stock: 2,
                    price: None,
                },
            ]),
        };

        let product = new.into_product();
        let variants = product.variants.as_ref().unwrap();
        assert_eq!(variants[0].stock, 0);
        assert_eq!(product.stock, variants.iter().map(|v| v.stock).sum::<i32>());
        assert_eq!(product.stock, 2);
    }

    #[test]
    fn patch_clamps_negative_variant_stock() {
        let mut product = simple_product(4);
        let patch = ProductPatch {
            variants: Some(vec![ProductVariant {
                size: "S".to_string(),
                stock: -3,
                price: None,
            }]),
            ..Default::default()
        };
        patch.apply(&mut product);

        let variants = product.variants.as_ref().unwrap();
        assert_eq!(variants[0].stock, 0);
        assert_eq!(product.stock, 0);
        assert!(!product.in_stock);
    }

    #[test]
    fn patch_with_empty_variants_switches_to_simple_stock() {
        let mut product = ring_with_sizes();
        let patch = ProductPatch {
            variants: Some(vec![]),
            stock: Some(8),
            ..Default::default()
        };
        patch.apply(&mut product);

        assert!(product.variants.is_none());
        assert_eq!(product.stock, 8);
        assert!(product.in_stock);
    }

    #[test]
    fn patch_recomputes_total_from_new_variants() {
        let mut product = simple_product(4);
        let patch = ProductPatch {
            variants: Some(vec![ProductVariant {
                size: "S".to_string(),
                stock: 0,
                price: None,
            }]),
            ..Default::default()
        };
        patch.apply(&mut product);

        assert_eq!(product.stock, 0);
        assert!(!product.in_stock);
    }
}
