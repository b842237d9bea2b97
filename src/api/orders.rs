use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::domain::checkout::CheckoutRequest;
use crate::domain::order::OrderStatus;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Order Endpoints - Checkout, Tracking, Admin Back-Office
// ============================================================================

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/checkout", web::post().to(checkout)).service(
        web::scope("/orders")
            .route("", web::get().to(list))
            .route("/track/{code}", web::get().to(track))
            .route("/{id}/status", web::patch().to(set_status))
            .route("/{id}/items/{index}", web::delete().to(remove_item))
            .route("/{id}", web::delete().to(delete)),
    );
}

async fn checkout(
    state: web::Data<AppState>,
    body: web::Json<CheckoutRequest>,
) -> ApiResult<HttpResponse> {
    let request = body.into_inner();
    request.validate().map_err(ApiError::Validation)?;

    let order = state.orders.create(request.into_new_order()).await?;
    state.metrics.orders_created.inc();
    info!(
        order_code = %order.order_code,
        total = order.total_amount,
        items = order.items.len(),
        "✅ Order created"
    );

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "order": order,
    })))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    status: Option<String>,
}

async fn list(state: web::Data<AppState>, query: web::Query<ListQuery>) -> ApiResult<HttpResponse> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(|err| ApiError::Validation(vec![err.to_string()]))?;

    let orders = state.orders.list(status).await?;
    Ok(HttpResponse::Ok().json(orders))
}

/// Public tracking view: exposes only what a customer needs to see.
async fn track(state: web::Data<AppState>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let order = state
        .orders
        .find_by_code(&path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("order"))?;

    Ok(HttpResponse::Ok().json(json!({
        "order_code": order.order_code,
        "status": order.status,
        "customer_name": order.customer_name,
        "total_amount": order.total_amount,
        "created_at": order.created_at,
    })))
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: OrderStatus,
}

async fn set_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<StatusBody>,
) -> ApiResult<HttpResponse> {
    let order = state
        .orders
        .set_status(path.into_inner(), body.status)
        .await?;
    info!(order_code = %order.order_code, status = %order.status, "📦 Order status updated");
    Ok(HttpResponse::Ok().json(order))
}

async fn remove_item(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, usize)>,
) -> ApiResult<HttpResponse> {
    let (id, index) = path.into_inner();
    let order = state.orders.remove_item(id, index).await?;
    state.metrics.order_items_removed.inc();
    info!(order_code = %order.order_code, index, "🗑️ Order line removed, stock restored");
    Ok(HttpResponse::Ok().json(order))
}

async fn delete(state: web::Data<AppState>, path: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    let order = state.orders.delete(path.into_inner()).await?;
    state.metrics.orders_deleted.inc();
    info!(order_code = %order.order_code, "🗑️ Order deleted, stock restored");
    Ok(HttpResponse::NoContent().finish())
}
