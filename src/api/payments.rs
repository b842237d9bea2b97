use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::payment::{
    create_session, process_response, verify_signature, AuthorizeRequest, PaymentError,
    PaymentNotification, PaymentStatus, SessionRequest,
};
use crate::state::AppState;
use crate::store::StoreError;

// ============================================================================
// Payment Endpoints - Session, Authorization, Webhook
// ============================================================================

const SIGNATURE_HEADER: &str = "x-payment-signature";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("/session", web::post().to(session))
            .route("/authorize", web::post().to(authorize))
            .route("/webhook", web::post().to(webhook)),
    );
}

async fn session(
    state: web::Data<AppState>,
    body: web::Json<SessionRequest>,
) -> ApiResult<HttpResponse> {
    let session = create_session(&state.config.payment, &body)?;
    state.metrics.payment_sessions_created.inc();
    info!(
        session_id = %session.session_id,
        order_code = %session.order_code,
        "💳 Payment session created"
    );

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "session": session,
        "sandbox": state.config.payment.sandbox,
    })))
}

async fn authorize(
    state: web::Data<AppState>,
    body: web::Json<AuthorizeRequest>,
) -> ApiResult<HttpResponse> {
    let request = body.into_inner();
    if !(request.amount > 0.0) {
        return Err(ApiError::Payment(PaymentError::InvalidAmount));
    }
    if !crate::payment::is_valid_email(&request.customer_email) {
        return Err(ApiError::Payment(PaymentError::InvalidEmail(
            request.customer_email,
        )));
    }

    let response = state.gateway.authorize(&request).await?;
    let outcome = process_response(&request, response);
    state
        .metrics
        .payments_processed
        .with_label_values(&[outcome.status.as_str()])
        .inc();
    info!(
        order_code = %outcome.order_code,
        transaction_id = %outcome.transaction_id,
        status = %outcome.status.as_str(),
        "💳 Authorization processed"
    );

    Ok(HttpResponse::Ok().json(json!({
        "success": outcome.status == PaymentStatus::Approved,
        "transaction": outcome,
    })))
}

/// Out-of-band gateway notification. The raw body is checked against the
/// HMAC signature header before it is parsed.
async fn webhook(
    state: web::Data<AppState>,
    request: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let signature = request
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    if !verify_signature(&state.config.payment.webhook_secret, &body, signature) {
        warn!("🚫 Webhook rejected, signature mismatch");
        return Err(ApiError::Unauthorized);
    }

    let notification: PaymentNotification = serde_json::from_slice(&body)
        .map_err(|err| ApiError::Validation(vec![err.to_string()]))?;
    notification.validate()?;

    let status = notification.status();
    if status == PaymentStatus::Approved {
        match state.orders.confirm_paid(&notification.order_code).await {
            Ok(order) => {
                info!(
                    order_code = %order.order_code,
                    status = %order.status,
                    "✅ Payment confirmed"
                );
            }
            Err(StoreError::NotFound(_)) => {
                // Acknowledge anyway so the gateway stops retrying.
                warn!(
                    order_code = %notification.order_code,
                    "⚠️ Approved payment for unknown order"
                );
            }
            Err(err) => return Err(err.into()),
        }
    }

    state
        .metrics
        .webhook_notifications
        .with_label_values(&[status.as_str()])
        .inc();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "order_code": notification.order_code,
        "status": status,
    })))
}
