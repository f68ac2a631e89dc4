pub mod checkout;
pub mod invoices;
pub mod orders;
pub mod payments;
pub mod products;
pub mod stock;

use actix_web::web;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        checkout::checkout,
        orders::list_orders,
        orders::get_order,
        orders::update_order_status,
        payments::pay_order,
        payments::refund_payment,
        payments::get_payment,
        payments::list_payment_methods,
        invoices::generate_invoice,
        invoices::get_invoice,
        invoices::print_invoice,
        products::create_product,
        products::reprice_product,
        stock::get_stock,
        stock::restock,
    ),
    tags(
        (name = "checkout", description = "Cart checkout"),
        (name = "orders", description = "Order lifecycle"),
        (name = "payments", description = "Simulated payments and refunds"),
        (name = "invoices", description = "Invoice snapshots"),
        (name = "products", description = "Catalog maintenance"),
        (name = "stock", description = "Inventory levels"),
    )
)]
pub struct ApiDoc;

/// Registers every JSON route on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/checkout", web::post().to(checkout::checkout))
        .service(
            web::scope("/orders")
                .route("", web::get().to(orders::list_orders))
                .route("/{id}", web::get().to(orders::get_order))
                .route("/{id}/status", web::patch().to(orders::update_order_status))
                .route("/{id}/payments", web::post().to(payments::pay_order))
                .route("/{id}/invoice", web::post().to(invoices::generate_invoice)),
        )
        .service(
            web::scope("/payments")
                .route("/{id}", web::get().to(payments::get_payment))
                .route("/{id}/refund", web::post().to(payments::refund_payment)),
        )
        .route(
            "/payment-methods",
            web::get().to(payments::list_payment_methods),
        )
        .service(
            web::scope("/invoices")
                .route("/{id}", web::get().to(invoices::get_invoice))
                .route("/{id}/print", web::get().to(invoices::print_invoice)),
        )
        .service(
            web::scope("/products")
                .route("", web::post().to(products::create_product))
                .route("/{id}/price", web::patch().to(products::reprice_product)),
        )
        .service(
            web::scope("/stock")
                .route("", web::get().to(stock::get_stock))
                .route("/{id}/restock", web::post().to(stock::restock)),
        );
}
