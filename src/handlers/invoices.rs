use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::Services;
use crate::domain::invoice::InvoiceDocument;
use crate::errors::AppError;

use super::orders::ShippingInfoDto;

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceCreatedResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceLineResponse {
    pub name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub subtotal: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceResponse {
    pub invoice_id: Uuid,
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub generated_at: String,
    pub order_date: String,
    pub order_status: String,
    pub ship_to: ShippingInfoDto,
    pub lines: Vec<InvoiceLineResponse>,
    pub total: String,
}

impl From<InvoiceDocument> for InvoiceResponse {
    fn from(doc: InvoiceDocument) -> Self {
        Self {
            invoice_id: doc.invoice_id,
            order_id: doc.order_id,
            customer_id: doc.customer_id,
            generated_at: doc.generated_at.to_rfc3339(),
            order_date: doc.order_date.to_rfc3339(),
            order_status: doc.order_status.to_string(),
            ship_to: doc.ship_to.into(),
            lines: doc
                .lines
                .into_iter()
                .map(|l| InvoiceLineResponse {
                    name: l.name,
                    quantity: l.quantity,
                    unit_price: l.unit_price.to_string(),
                    subtotal: l.subtotal.to_string(),
                })
                .collect(),
            total: doc.total.to_string(),
        }
    }
}

/// POST /orders/{id}/invoice
///
/// Issues the order's invoice, or returns the one already issued.
#[utoipa::path(
    post,
    path = "/orders/{id}/invoice",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Invoice id", body = InvoiceCreatedResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "invoices"
)]
pub async fn generate_invoice(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let id = web::block(move || services.invoices.generate(order_id)).await??;

    Ok(HttpResponse::Ok().json(InvoiceCreatedResponse { id }))
}

/// GET /invoices/{id}
#[utoipa::path(
    get,
    path = "/invoices/{id}",
    params(
        ("id" = Uuid, Path, description = "Invoice UUID"),
    ),
    responses(
        (status = 200, description = "Invoice document", body = InvoiceResponse),
        (status = 404, description = "Invoice not found"),
    ),
    tag = "invoices"
)]
pub async fn get_invoice(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let invoice_id = path.into_inner();

    let doc = web::block(move || services.invoices.render(invoice_id)).await??;

    Ok(HttpResponse::Ok().json(InvoiceResponse::from(doc)))
}

/// GET /invoices/{id}/print
///
/// Plain-text rendering of the invoice.
#[utoipa::path(
    get,
    path = "/invoices/{id}/print",
    params(
        ("id" = Uuid, Path, description = "Invoice UUID"),
    ),
    responses(
        (status = 200, description = "Printable invoice", body = String, content_type = "text/plain"),
        (status = 404, description = "Invoice not found"),
    ),
    tag = "invoices"
)]
pub async fn print_invoice(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let invoice_id = path.into_inner();

    let doc = web::block(move || services.invoices.render(invoice_id)).await??;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(doc.to_string()))
}
