use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::ApiResult;
use crate::state::AppState;

// ============================================================================
// HTTP API - Route Wiring
// ============================================================================

mod orders;
mod payments;
mod products;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics))
        .service(
            web::scope("/api")
                .configure(products::configure)
                .configure(orders::configure)
                .configure(payments::configure),
        );
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "salcedo-store",
    }))
}

async fn metrics(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let body = state.metrics.render()?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}
