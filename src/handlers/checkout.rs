use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::Services;
use crate::domain::cart::Cart;
use crate::errors::AppError;

use super::orders::ShippingInfoDto;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub user_id: Uuid,
    pub lines: Vec<CheckoutLineRequest>,
    pub shipping_info: ShippingInfoDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub id: Uuid,
    pub total_price: String,
    pub status: String,
}

/// POST /checkout
///
/// Fills a cart from the request at current catalog prices and places it as
/// one Pending order. Stock for every line is re-checked and decremented in
/// the same database transaction as the order insert.
#[utoipa::path(
    post,
    path = "/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = CheckoutResponse),
        (status = 400, description = "Empty cart or invalid quantity"),
        (status = 404, description = "Unknown product"),
        (status = 409, description = "Insufficient stock"),
    ),
    tag = "checkout"
)]
pub async fn checkout(
    services: web::Data<Services>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let order = web::block(move || {
        let mut cart = Cart::new(Some(body.user_id));
        for line in &body.lines {
            cart.add_line(&services.stock, line.product_id, line.quantity)?;
        }
        let checked_out =
            services
                .fulfillment
                .checkout(&mut cart, body.user_id, body.shipping_info.into())?;
        services.orders.get_details(checked_out.order_id)
    })
    .await??;

    Ok(HttpResponse::Created().json(CheckoutResponse {
        id: order.id,
        total_price: order.total_price.to_string(),
        status: order.status.to_string(),
    }))
}
