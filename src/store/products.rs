use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::product::{Product, ProductVariant};

// ============================================================================
// Product Store
// ============================================================================

const SELECT_COLUMNS: &str = "id, name, price, category, description, main_image, \
     additional_images, featured, in_stock, stock, variants";

#[derive(FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    price: f64,
    category: String,
    description: String,
    main_image: String,
    additional_images: Json<Vec<String>>,
    featured: bool,
    in_stock: bool,
    stock: i32,
    variants: Option<Json<Vec<ProductVariant>>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            price: row.price,
            category: row.category,
            description: row.description,
            main_image: row.main_image,
            additional_images: row.additional_images.0,
            featured: row.featured,
            in_stock: row.in_stock,
            stock: row.stock,
            variants: row.variants.map(|v| v.0),
        }
    }
}

pub struct ProductStore {
    pool: PgPool,
}

impl ProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> sqlx::Result<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products ORDER BY category, name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> sqlx::Result<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Product::from))
    }

    pub async fn featured(&self) -> sqlx::Result<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE featured ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    pub async fn by_category(&self, category: &str) -> sqlx::Result<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE category = $1 ORDER BY name"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    pub async fn most_expensive(&self, limit: i64) -> sqlx::Result<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products ORDER BY price DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    pub async fn insert(&self, product: &Product) -> sqlx::Result<()> {
        sqlx::query(
            "INSERT INTO products (id, name, price, category, description, main_image, \
             additional_images, featured, in_stock, stock, variants) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.category)
        .bind(&product.description)
        .bind(&product.main_image)
        .bind(Json(&product.additional_images))
        .bind(product.featured)
        .bind(product.in_stock)
        .bind(product.stock)
        .bind(product.variants.as_ref().map(Json))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update(&self, product: &Product) -> sqlx::Result<bool> {
        let result = sqlx::query(
            "UPDATE products SET name = $2, price = $3, category = $4, description = $5, \
             main_image = $6, additional_images = $7, featured = $8, in_stock = $9, \
             stock = $10, variants = $11 WHERE id = $1",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.category)
        .bind(&product.description)
        .bind(&product.main_image)
        .bind(Json(&product.additional_images))
        .bind(product.featured)
        .bind(product.in_stock)
        .bind(product.stock)
        .bind(product.variants.as_ref().map(Json))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Transaction Helpers (shared with the order store)
// ============================================================================

/// Fetch a product inside a transaction with its row locked, so concurrent
/// checkouts serialize their stock math per product.
pub(super) async fn fetch_for_update(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> sqlx::Result<Option<Product>> {
    let row: Option<ProductRow> = sqlx::query_as(&format!(
        "SELECT {SELECT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(row.map(Product::from))
}

/// Persist the stock-bearing columns after the domain math ran.
pub(super) async fn persist_stock(
    tx: &mut Transaction<'_, Postgres>,
    product: &Product,
) -> sqlx::Result<()> {
    sqlx::query(
        "UPDATE products SET stock = $2, variants = $3, in_stock = $4 WHERE id = $1",
    )
    .bind(product.id)
    .bind(product.stock)
    .bind(product.variants.as_ref().map(Json))
    .bind(product.in_stock)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
