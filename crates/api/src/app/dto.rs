use serde::{Deserialize, Serialize};

use mostrador_core::{ClientId, DomainResult, OrderId, ProductId, SupplierId};
use mostrador_orders::{
    LineItem, PaymentMethod, PurchaseDraft, PurchaseLine, PurchaseOrder, SaleDraft, SaleOrder,
};

#[derive(Debug, Deserialize)]
pub struct SaleLineDto {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: u64,
}

#[derive(Debug, Deserialize)]
pub struct RecordSaleRequest {
    pub client_id: Option<ClientId>,
    pub lines: Vec<SaleLineDto>,
    #[serde(default)]
    pub discount: u64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

impl RecordSaleRequest {
    pub fn into_draft(self) -> DomainResult<SaleDraft> {
        let lines = self
            .lines
            .into_iter()
            .map(|l| LineItem::new(l.product_id, l.quantity, l.unit_price))
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(SaleDraft {
            client: self.client_id,
            lines,
            discount: self.discount,
            payment_method: self.payment_method,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PurchaseLineDto {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RecordPurchaseRequest {
    pub supplier_id: SupplierId,
    pub lines: Vec<PurchaseLineDto>,
    pub notes: Option<String>,
}

impl RecordPurchaseRequest {
    pub fn into_draft(self) -> DomainResult<PurchaseDraft> {
        let lines = self
            .lines
            .into_iter()
            .map(|l| PurchaseLine::new(l.product_id, l.quantity, l.unit_price))
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(PurchaseDraft {
            supplier: self.supplier_id,
            lines,
            notes: self.notes,
        })
    }
}

/// Minimal acknowledgement returned by both recording endpoints.
#[derive(Debug, Serialize)]
pub struct RecordedOrderResponse {
    pub order_id: OrderId,
    pub order_number: String,
    pub total: u64,
}

impl From<&SaleOrder> for RecordedOrderResponse {
    fn from(order: &SaleOrder) -> Self {
        Self {
            order_id: order.id,
            order_number: order.order_number.clone(),
            total: order.total,
        }
    }
}

impl From<&PurchaseOrder> for RecordedOrderResponse {
    fn from(order: &PurchaseOrder) -> Self {
        Self {
            order_id: order.id,
            order_number: order.order_number.clone(),
            total: order.total,
        }
    }
}
