use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::Services;
use crate::domain::payment::{PaymentAttempt, PaymentMethod};
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PayOrderRequest {
    /// Must equal the order total, e.g. "19.98"
    pub amount: String,
    /// "Credit Card", "PayPal" or "Bank Transfer"
    pub method: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentOutcomeResponse {
    pub success: bool,
    pub payment_id: Uuid,
    pub status: String,
    pub order_status: String,
    /// Present when the payment was approved and the invoice issued
    pub invoice_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefundResponse {
    pub success: bool,
    pub payment_id: Uuid,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub amount: String,
    pub method: String,
    pub status: String,
    pub created_at: String,
}

impl From<PaymentAttempt> for PaymentResponse {
    fn from(p: PaymentAttempt) -> Self {
        Self {
            id: p.id,
            order_id: p.order_id,
            amount: p.amount.to_string(),
            method: p.method.to_string(),
            status: p.status.to_string(),
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// POST /orders/{id}/payments
///
/// Runs the single payment attempt for a Pending order. An approved payment
/// moves the order to Processing and issues its invoice; a declined one is
/// reported with `success: false` and leaves the order Pending.
#[utoipa::path(
    post,
    path = "/orders/{id}/payments",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = PayOrderRequest,
    responses(
        (status = 200, description = "Payment attempted", body = PaymentOutcomeResponse),
        (status = 400, description = "Bad amount or method, or amount differs from the order total"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order already has a payment or is no longer Pending"),
    ),
    tag = "payments"
)]
pub async fn pay_order(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
    body: web::Json<PayOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let amount = BigDecimal::from_str(body.amount.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid amount '{}': {}", body.amount, e)))?;
    let method: PaymentMethod = body.method.parse()?;

    let settlement = web::block(move || {
        services
            .fulfillment
            .settle_payment(order_id, &amount, method)
    })
    .await??;

    Ok(HttpResponse::Ok().json(PaymentOutcomeResponse {
        success: settlement.payment.success,
        payment_id: settlement.payment.payment_id,
        status: settlement.payment.status.to_string(),
        order_status: settlement.payment.order_status.to_string(),
        invoice_id: settlement.invoice_id,
    }))
}

/// POST /payments/{id}/refund
#[utoipa::path(
    post,
    path = "/payments/{id}/refund",
    params(
        ("id" = Uuid, Path, description = "Payment UUID"),
    ),
    responses(
        (status = 200, description = "Refund attempted", body = RefundResponse),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Payment is not Completed"),
    ),
    tag = "payments"
)]
pub async fn refund_payment(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let payment_id = path.into_inner();

    let outcome = web::block(move || services.payments.refund(payment_id)).await??;

    Ok(HttpResponse::Ok().json(RefundResponse {
        success: outcome.success,
        payment_id: outcome.payment_id,
        status: outcome.status.to_string(),
    }))
}

/// GET /payments/{id}
#[utoipa::path(
    get,
    path = "/payments/{id}",
    params(
        ("id" = Uuid, Path, description = "Payment UUID"),
    ),
    responses(
        (status = 200, description = "Payment found", body = PaymentResponse),
        (status = 404, description = "Payment not found"),
    ),
    tag = "payments"
)]
pub async fn get_payment(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let payment_id = path.into_inner();

    let payment = web::block(move || services.payments.verify_status(payment_id)).await??;

    Ok(HttpResponse::Ok().json(PaymentResponse::from(payment)))
}

/// GET /payment-methods
#[utoipa::path(
    get,
    path = "/payment-methods",
    responses(
        (status = 200, description = "Accepted payment methods", body = Vec<String>),
    ),
    tag = "payments"
)]
pub async fn list_payment_methods(services: web::Data<Services>) -> HttpResponse {
    let methods: Vec<&str> = services
        .payments
        .payment_methods()
        .iter()
        .map(|m| m.as_str())
        .collect();
    HttpResponse::Ok().json(methods)
}
