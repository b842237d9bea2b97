use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

use crate::domain::order::OrderError;
use crate::payment::PaymentError;
use crate::store::StoreError;

// ============================================================================
// API Error Mapping
// ============================================================================

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid request: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("signature verification failed")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(err) => match err {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::Stock(_) => StatusCode::CONFLICT,
                StoreError::Order(OrderError::InvalidStatusTransition { .. }) => {
                    StatusCode::CONFLICT
                }
                StoreError::Order(_) => StatusCode::BAD_REQUEST,
                StoreError::Corrupt(_) | StoreError::Database(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Payment(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self.status_code() {
            // Never leak database detail to clients.
            StatusCode::INTERNAL_SERVER_ERROR => "internal server error".to_string(),
            _ => self.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": message,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use crate::domain::product::StockError;

    #[test]
    fn validation_maps_to_400() {
        let err = ApiError::Validation(vec!["DNI must be exactly 8 digits".to_string()]);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("DNI"));
    }

    #[test]
    fn stock_conflicts_map_to_409() {
        let err = ApiError::Store(StoreError::Stock(StockError::SizeRequired));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn backward_transition_maps_to_409() {
        let err = ApiError::Store(StoreError::Order(OrderError::InvalidStatusTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Received,
        }));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn database_errors_hide_detail() {
        let err = ApiError::Store(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
