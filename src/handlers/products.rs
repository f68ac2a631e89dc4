use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::Services;
use crate::domain::product::{NewProduct, Product};
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub category: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub stock: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RepriceRequest {
    pub price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: String,
    pub stock: i32,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            category: p.category,
            price: p.price.to_string(),
            stock: p.stock,
        }
    }
}

fn parse_price(raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid price '{}': {}", raw, e)))
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid name, price or stock"),
    ),
    tag = "products"
)]
pub async fn create_product(
    services: web::Data<Services>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let product = NewProduct {
        price: parse_price(&body.price)?,
        name: body.name,
        category: body.category,
        stock: body.stock,
    };

    let created = web::block(move || services.catalog.add_product(product)).await??;

    Ok(HttpResponse::Created().json(ProductResponse::from(created)))
}

/// PATCH /products/{id}/price
///
/// Existing carts and orders keep the price they captured.
#[utoipa::path(
    patch,
    path = "/products/{id}/price",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    request_body = RepriceRequest,
    responses(
        (status = 200, description = "Product repriced", body = ProductResponse),
        (status = 400, description = "Invalid price"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn reprice_product(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
    body: web::Json<RepriceRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let price = parse_price(&body.price)?;

    let product = web::block(move || services.catalog.reprice(product_id, price)).await??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}
