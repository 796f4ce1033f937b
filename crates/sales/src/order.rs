use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use storefront_core::{CustomerId, DomainError, DomainResult, Entity, LineItemId, Money, SalesOrderId};
use storefront_parties::Classification;

/// One sold unit: descriptive fields copied onto return line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderLineItem {
    pub line_id: LineItemId,
    pub model: String,
    pub brand: String,
    pub category: String,
    pub serial_number: String,
    pub unit_price: Money,
}

/// Descriptive fields of a line before it is numbered within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDescriptor {
    pub model: String,
    pub brand: String,
    pub category: String,
    pub serial_number: String,
    pub unit_price: Money,
}

impl ItemDescriptor {
    pub fn new(
        model: impl Into<String>,
        brand: impl Into<String>,
        category: impl Into<String>,
        serial_number: impl Into<String>,
        unit_price: Money,
    ) -> Self {
        Self {
            model: model.into(),
            brand: brand.into(),
            category: category.into(),
            serial_number: serial_number.into(),
            unit_price,
        }
    }

    /// Number this descriptor as a line item.
    pub fn into_line(self, line_id: LineItemId) -> SalesOrderLineItem {
        SalesOrderLineItem {
            line_id,
            model: self.model,
            brand: self.brand,
            category: self.category,
            serial_number: self.serial_number,
            unit_price: self.unit_price,
        }
    }

    /// Reject descriptors that could not identify a returned unit.
    pub fn validate(&self) -> DomainResult<()> {
        if self.model.trim().is_empty() {
            return Err(DomainError::validation("model cannot be empty"));
        }
        if self.serial_number.trim().is_empty() {
            return Err(DomainError::validation("serial number cannot be empty"));
        }
        if self.unit_price.is_negative() {
            return Err(DomainError::validation("unit price cannot be negative"));
        }
        Ok(())
    }
}

/// A completed sale. Immutable once created; the RMA workflow only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrder {
    id: SalesOrderId,
    customer_id: CustomerId,
    date: NaiveDate,
    classification: Classification,
    lines: Vec<SalesOrderLineItem>,
}

impl SalesOrder {
    /// Build a sales order, numbering lines 1..=n in the given order.
    pub fn new(
        id: SalesOrderId,
        customer_id: CustomerId,
        date: NaiveDate,
        classification: Classification,
        items: Vec<ItemDescriptor>,
    ) -> DomainResult<Self> {
        let mut lines = Vec::with_capacity(items.len());
        let mut next = LineItemId::new(1);
        for item in items {
            item.validate()?;
            lines.push(item.into_line(next));
            next = next.next();
        }

        Ok(Self {
            id,
            customer_id,
            date,
            classification,
            lines,
        })
    }

    pub fn id_typed(&self) -> SalesOrderId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn lines(&self) -> &[SalesOrderLineItem] {
        &self.lines
    }

    pub fn line(&self, line_id: LineItemId) -> Option<&SalesOrderLineItem> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }

    pub fn total(&self) -> DomainResult<Money> {
        Money::checked_sum(self.lines.iter().map(|l| l.unit_price))
            .ok_or_else(|| DomainError::validation(format!("total of sales order {} overflows", self.id)))
    }
}

impl Entity for SalesOrder {
    type Id = SalesOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
