use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::domain::product::{NewProduct, ProductPatch};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::store::StoreError;

// ============================================================================
// Product Endpoints - Public Catalog + Admin CRUD
// ============================================================================

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .route("", web::get().to(list))
            .route("", web::post().to(create))
            .route("/featured", web::get().to(featured))
            .route("/{id}", web::get().to(get))
            .route("/{id}", web::put().to(update))
            .route("/{id}", web::delete().to(delete)),
    );
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    category: Option<String>,
    sort: Option<String>,
    limit: Option<i64>,
}

const DEFAULT_SHOWCASE_LIMIT: i64 = 3;

async fn list(state: web::Data<AppState>, query: web::Query<ListQuery>) -> ApiResult<HttpResponse> {
    let products = if query.sort.as_deref() == Some("price_desc") {
        let limit = query.limit.unwrap_or(DEFAULT_SHOWCASE_LIMIT).max(1);
        state.products.most_expensive(limit).await
    } else if let Some(category) = &query.category {
        state.products.by_category(category).await
    } else {
        state.products.list().await
    }
    .map_err(StoreError::from)?;

    Ok(HttpResponse::Ok().json(products))
}

async fn featured(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let products = state.products.featured().await.map_err(StoreError::from)?;
    Ok(HttpResponse::Ok().json(products))
}

async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    let product = state
        .products
        .get(path.into_inner())
        .await
        .map_err(StoreError::from)?
        .ok_or(ApiError::NotFound("product"))?;
    Ok(HttpResponse::Ok().json(product))
}

async fn create(
    state: web::Data<AppState>,
    body: web::Json<NewProduct>,
) -> ApiResult<HttpResponse> {
    let product = body.into_inner().into_product();
    state.products.insert(&product).await.map_err(StoreError::from)?;
    info!(product_id = %product.id, name = %product.name, "✅ Product created");
    Ok(HttpResponse::Created().json(product))
}

async fn update(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ProductPatch>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let mut product = state
        .products
        .get(id)
        .await
        .map_err(StoreError::from)?
        .ok_or(ApiError::NotFound("product"))?;

    body.into_inner().apply(&mut product);
    state.products.update(&product).await.map_err(StoreError::from)?;
    Ok(HttpResponse::Ok().json(product))
}

async fn delete(state: web::Data<AppState>, path: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let deleted = state.products.delete(id).await.map_err(StoreError::from)?;
    if !deleted {
        return Err(ApiError::NotFound("product"));
    }
    info!(product_id = %id, "🗑️ Product deleted");
    Ok(HttpResponse::NoContent().finish())
}
