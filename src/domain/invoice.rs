use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::order::{OrderDetails, OrderLine, OrderStatus, ShippingInfo};

/// One frozen invoice line. Serialized as part of the invoice's
/// `line_items` snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl InvoiceLine {
    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

impl From<&OrderLine> for InvoiceLine {
    fn from(line: &OrderLine) -> Self {
        Self {
            product_id: line.product_id,
            name: line.product_name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: Uuid,
    pub order_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub lines: Vec<InvoiceLine>,
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub order_id: Uuid,
    pub lines: Vec<InvoiceLine>,
}

impl NewInvoice {
    pub fn from_order(order: &OrderDetails) -> Self {
        Self {
            order_id: order.id,
            lines: order.lines.iter().map(InvoiceLine::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDocumentLine {
    pub name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub subtotal: BigDecimal,
}

/// Printable invoice: the frozen snapshot joined with order metadata.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDocument {
    pub invoice_id: Uuid,
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub order_date: DateTime<Utc>,
    pub order_status: OrderStatus,
    pub ship_to: ShippingInfo,
    pub lines: Vec<InvoiceDocumentLine>,
    pub total: BigDecimal,
}

impl InvoiceDocument {
    pub fn new(invoice: Invoice, order: &OrderDetails) -> Self {
        let lines = invoice
            .lines
            .iter()
            .map(|line| InvoiceDocumentLine {
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price.clone(),
                subtotal: line.line_total(),
            })
            .collect();
        Self {
            invoice_id: invoice.id,
            order_id: invoice.order_id,
            customer_id: order.user_id,
            generated_at: invoice.generated_at,
            order_date: order.created_at,
            order_status: order.status,
            ship_to: order.shipping_info.clone(),
            lines,
            total: order.total_price.clone(),
        }
    }
}

fn money(amount: &BigDecimal) -> String {
    format!("${}", amount.with_scale(2))
}

impl fmt::Display for InvoiceDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "INVOICE {}", self.invoice_id)?;
        writeln!(f, "Date:         {}", self.generated_at.format("%B %-d, %Y"))?;
        writeln!(f, "Order:        {}", self.order_id)?;
        writeln!(f, "Order date:   {}", self.order_date.format("%B %-d, %Y"))?;
        writeln!(f, "Order status: {}", self.order_status)?;
        writeln!(f)?;
        writeln!(f, "Ship to:")?;
        writeln!(f, "  {}", self.ship_to.name)?;
        writeln!(f, "  {}", self.ship_to.address)?;
        writeln!(
            f,
            "  {}, {} {}",
            self.ship_to.city, self.ship_to.state, self.ship_to.postal_code
        )?;
        writeln!(f, "  {}", self.ship_to.country)?;
        if let Some(phone) = &self.ship_to.phone {
            writeln!(f, "  {phone}")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:<32} {:>8} {:>12} {:>12}",
            "Product", "Qty", "Unit Price", "Subtotal"
        )?;
        for line in &self.lines {
            writeln!(
                f,
                "{:<32} {:>8} {:>12} {:>12}",
                line.name,
                line.quantity,
                money(&line.unit_price),
                money(&line.subtotal)
            )?;
        }
        writeln!(f)?;
        write!(f, "{:>67}", format!("Total: {}", money(&self.total)))
    }
}
