use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::Services;
use crate::domain::product::StockStatus;
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct StockParams {
    /// Comma-separated product UUIDs. Omit for the whole catalog.
    pub ids: Option<String>,
    /// Only products at or below the low-stock threshold.
    #[serde(default)]
    pub low_only: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockStatusResponse {
    pub product_id: Uuid,
    pub name: String,
    pub category: String,
    pub price: String,
    pub stock: i32,
    pub low_stock: bool,
    pub in_stock: bool,
}

impl From<StockStatus> for StockStatusResponse {
    fn from(s: StockStatus) -> Self {
        Self {
            product_id: s.product_id,
            name: s.name,
            category: s.category,
            price: s.price.to_string(),
            stock: s.stock,
            low_stock: s.low_stock,
            in_stock: s.in_stock,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockReportResponse {
    pub items: Vec<StockStatusResponse>,
    pub low_stock_threshold: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RestockRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockLevelResponse {
    pub product_id: Uuid,
    pub stock: i32,
}

fn parse_ids(raw: &str) -> Result<Vec<Uuid>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s)
                .map_err(|e| AppError::BadRequest(format!("Invalid product id '{s}': {e}")))
        })
        .collect()
}

/// GET /stock
#[utoipa::path(
    get,
    path = "/stock",
    params(
        ("ids" = Option<String>, Query, description = "Comma-separated product UUIDs"),
        ("low_only" = Option<bool>, Query, description = "Only low-stock products"),
    ),
    responses(
        (status = 200, description = "Stock report", body = StockReportResponse),
        (status = 400, description = "Malformed product id"),
    ),
    tag = "stock"
)]
pub async fn get_stock(
    services: web::Data<Services>,
    query: web::Query<StockParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let ids = params.ids.as_deref().map(parse_ids).transpose()?;
    let threshold = services.stock.low_stock_threshold();

    let report = web::block(move || {
        if params.low_only {
            services.stock.low_stock_products()
        } else {
            services.stock.get_status(ids.as_deref())
        }
    })
    .await??;

    Ok(HttpResponse::Ok().json(StockReportResponse {
        items: report.into_iter().map(StockStatusResponse::from).collect(),
        low_stock_threshold: threshold,
    }))
}

/// POST /stock/{id}/restock
#[utoipa::path(
    post,
    path = "/stock/{id}/restock",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    request_body = RestockRequest,
    responses(
        (status = 200, description = "New stock level", body = StockLevelResponse),
        (status = 400, description = "Quantity not positive"),
        (status = 404, description = "Product not found"),
    ),
    tag = "stock"
)]
pub async fn restock(
    services: web::Data<Services>,
    path: web::Path<Uuid>,
    body: web::Json<RestockRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let quantity = body.quantity;

    let level = web::block(move || services.stock.increment(product_id, quantity)).await??;

    Ok(HttpResponse::Ok().json(StockLevelResponse {
        product_id: level.product_id,
        stock: level.stock,
    }))
}
