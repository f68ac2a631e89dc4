use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        let message = e.to_string();
        if e.is_business_rule() {
            log::debug!("request rejected: {}", message);
        }
        match e {
            DomainError::ProductNotFound(_)
            | DomainError::OrderNotFound(_)
            | DomainError::PaymentNotFound(_)
            | DomainError::InvoiceNotFound(_) => AppError::NotFound(message),
            DomainError::InsufficientStock { .. }
            | DomainError::DuplicatePayment { .. }
            | DomainError::InvalidTransition { .. }
            | DomainError::NotRefundable { .. } => AppError::Conflict(message),
            DomainError::EmptyCart
            | DomainError::AmountMismatch { .. }
            | DomainError::InvalidInput(_) => AppError::BadRequest(message),
            DomainError::Persistence(_) => AppError::Internal(message),
        }
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Conflict(_) => HttpResponse::Conflict().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Internal(detail) => {
                log::error!("{}", detail);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Internal server error"
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;
    use uuid::Uuid;

    fn status_of(e: DomainError) -> StatusCode {
        AppError::from(e).error_response().status()
    }

    #[test]
    fn missing_entities_return_404() {
        assert_eq!(status_of(DomainError::OrderNotFound(Uuid::nil())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(DomainError::InvoiceNotFound(Uuid::nil())), StatusCode::NOT_FOUND);
    }

    #[test]
    fn rule_conflicts_return_409() {
        assert_eq!(
            status_of(DomainError::InsufficientStock {
                product_id: Uuid::nil(),
                requested: 2,
                available: 1
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::InvalidTransition {
                from: OrderStatus::Cancelled,
                to: OrderStatus::Processing
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn bad_input_returns_400() {
        assert_eq!(status_of(DomainError::EmptyCart), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(DomainError::InvalidInput("quantity".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn persistence_error_returns_500() {
        let err = AppError::from(DomainError::Persistence("connection reset".to_string()));
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn conflict_display_keeps_the_domain_message() {
        let order_id = Uuid::nil();
        assert_eq!(
            AppError::from(DomainError::DuplicatePayment { order_id }).to_string(),
            format!("Payment already exists for order {order_id}")
        );
    }
}
