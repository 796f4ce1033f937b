use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{
    AggregateRoot, CustomerId, DomainError, DomainResult, LineItemId, Money, ReturnOrderId, SalesOrderId,
};
use storefront_parties::Classification;

use crate::disposition::{
    Disposition, DispositionType, RefundDisposition, RefundMethod, ReplacementDisposition,
};
use crate::event::{
    DispositionReassigned, RefundRecorded, ReplacementCompleted, ReplacementProcessing, ReturnOrderEvent,
};

/// Opaque reference to a piece of evidence (photo, document) stored elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceRef(String);

impl EvidenceRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Order-level status, derived from the line items' dispositions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnOrderStatus {
    /// Every item is still in its initial disposition state.
    Pending,
    /// Some items have progressed; not all are settled.
    Processing,
    /// Every replacement is Completed and every refund recorded.
    Completed,
}

impl core::fmt::Display for ReturnOrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            ReturnOrderStatus::Pending => "Pending",
            ReturnOrderStatus::Processing => "Processing",
            ReturnOrderStatus::Completed => "Completed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnLineItem {
    /// Line id of the originating sales order item (or draft-assigned for direct returns).
    pub line_id: LineItemId,
    pub model: String,
    pub brand: String,
    pub category: String,
    pub serial_number: String,
    pub price: Money,
    pub reason: String,
    pub evidence: Vec<EvidenceRef>,
    #[serde(flatten)]
    pub disposition: Disposition,
}

impl ReturnLineItem {
    pub fn disposition_type(&self) -> DispositionType {
        self.disposition.disposition_type()
    }

    /// Everything frozen at commit time matches; the disposition may differ.
    pub fn same_committed_fields(&self, other: &ReturnLineItem) -> bool {
        self.line_id == other.line_id
            && self.model == other.model
            && self.brand == other.brand
            && self.category == other.category
            && self.serial_number == other.serial_number
            && self.price == other.price
            && self.reason == other.reason
            && self.evidence == other.evidence
    }
}

/// Committed return order.
///
/// Identity, customer, date and item membership are fixed at construction;
/// only the per-item dispositions change afterwards, each change bumping
/// `version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnOrder {
    id: ReturnOrderId,
    customer_id: CustomerId,
    date: NaiveDate,
    classification: Classification,
    sales_order_id: Option<SalesOrderId>,
    reason: String,
    items: Vec<ReturnLineItem>,
    #[serde(default)]
    version: u64,
}

impl ReturnOrder {
    pub fn new(
        id: ReturnOrderId,
        customer_id: CustomerId,
        date: NaiveDate,
        classification: Classification,
        sales_order_id: Option<SalesOrderId>,
        reason: impl Into<String>,
        items: Vec<ReturnLineItem>,
    ) -> DomainResult<Self> {
        let order = Self {
            id,
            customer_id,
            date,
            classification,
            sales_order_id,
            reason: reason.into(),
            items,
            version: 0,
        };
        order.validate()?;
        Ok(order)
    }

    /// Structural checks a stored order must pass.
    pub fn validate(&self) -> DomainResult<()> {
        if self.items.is_empty() {
            return Err(DomainError::validation("return order must contain at least one line item"));
        }
        let mut seen = BTreeSet::new();
        for item in &self.items {
            if !seen.insert(item.line_id) {
                return Err(DomainError::validation(format!(
                    "line item {} appears more than once",
                    item.line_id
                )));
            }
        }
        Ok(())
    }

    pub fn id_typed(&self) -> ReturnOrderId {
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

    pub fn sales_order_id(&self) -> Option<SalesOrderId> {
        self.sales_order_id
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn items(&self) -> &[ReturnLineItem] {
        &self.items
    }

    pub fn item(&self, line_id: LineItemId) -> DomainResult<&ReturnLineItem> {
        self.items
            .iter()
            .find(|i| i.line_id == line_id)
            .ok_or_else(|| self.missing_line(line_id))
    }

    pub fn status(&self) -> ReturnOrderStatus {
        if self.items.iter().all(|i| i.disposition.is_initial()) {
            ReturnOrderStatus::Pending
        } else if self.items.iter().all(|i| i.disposition.is_settled()) {
            ReturnOrderStatus::Completed
        } else {
            ReturnOrderStatus::Processing
        }
    }

    /// Sum of recorded refund amounts.
    ///
    /// Fails with `Validation` when the total does not fit in `Money`.
    pub fn refund_total(&self) -> DomainResult<Money> {
        let recorded = self.items.iter().filter_map(|i| match &i.disposition {
            Disposition::Refund(r) if r.is_recorded() => Some(r.amount),
            _ => None,
        });
        Money::checked_sum(recorded)
            .ok_or_else(|| DomainError::validation(format!("refund total of return order {} overflows", self.id)))
    }

    /// True when both orders carry the same committed data, ignoring dispositions and version.
    pub fn same_identity_fields(&self, other: &ReturnOrder) -> bool {
        self.id == other.id
            && self.customer_id == other.customer_id
            && self.date == other.date
            && self.classification == other.classification
            && self.sales_order_id == other.sales_order_id
            && self.reason == other.reason
            && self.items.len() == other.items.len()
            && self.items.iter().zip(&other.items).all(|(a, b)| a.same_committed_fields(b))
    }

    pub fn mark_processing(
        &mut self,
        line_id: LineItemId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Option<ReturnOrderEvent>> {
        let id = self.id;
        let idx = self.index_of(line_id)?;
        let changed = self.items[idx].disposition.as_replacement_mut()?.mark_processing()?;
        if !changed {
            return Ok(None);
        }
        self.version += 1;
        Ok(Some(ReturnOrderEvent::ReplacementProcessing(ReplacementProcessing {
            return_order_id: id,
            line_id,
            occurred_at,
        })))
    }

    pub fn mark_completed(
        &mut self,
        line_id: LineItemId,
        is_new_unit: bool,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<ReturnOrderEvent> {
        let id = self.id;
        let idx = self.index_of(line_id)?;
        self.items[idx].disposition.as_replacement_mut()?.mark_completed(is_new_unit)?;
        self.version += 1;
        Ok(ReturnOrderEvent::ReplacementCompleted(ReplacementCompleted {
            return_order_id: id,
            line_id,
            is_new_unit,
            occurred_at,
        }))
    }

    pub fn record_refund(
        &mut self,
        line_id: LineItemId,
        amount: Money,
        method: RefundMethod,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<ReturnOrderEvent> {
        let id = self.id;
        let idx = self.index_of(line_id)?;
        self.items[idx].disposition.as_refund_mut()?.record(amount, method)?;
        self.version += 1;
        Ok(ReturnOrderEvent::RefundRecorded(RefundRecorded {
            return_order_id: id,
            line_id,
            amount,
            method,
            occurred_at,
        }))
    }

    /// Replace the item's disposition with a fresh one of type `to`.
    ///
    /// Returns `Ok(None)` when the item already has that type.
    pub fn reassign_disposition(
        &mut self,
        line_id: LineItemId,
        to: DispositionType,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Option<ReturnOrderEvent>> {
        let id = self.id;
        let idx = self.index_of(line_id)?;
        let item = &mut self.items[idx];
        let from = item.disposition.disposition_type();
        if from == to {
            return Ok(None);
        }

        let previous = core::mem::replace(
            &mut item.disposition,
            Disposition::initial(to, occurred_at.date_naive()),
        );
        self.version += 1;
        Ok(Some(ReturnOrderEvent::DispositionReassigned(DispositionReassigned {
            return_order_id: id,
            line_id,
            from,
            to,
            discarded: previous,
            occurred_at,
        })))
    }

    pub fn replacement(&self, line_id: LineItemId) -> DomainResult<&ReplacementDisposition> {
        match &self.item(line_id)?.disposition {
            Disposition::Replacement(r) => Ok(r),
            Disposition::Refund(_) => Err(DomainError::invalid_state(format!(
                "line item {line_id} of {} is routed to Refund",
                self.id
            ))),
        }
    }

    pub fn refund(&self, line_id: LineItemId) -> DomainResult<&RefundDisposition> {
        match &self.item(line_id)?.disposition {
            Disposition::Refund(r) => Ok(r),
            Disposition::Replacement(_) => Err(DomainError::invalid_state(format!(
                "line item {line_id} of {} is routed to Replacement",
                self.id
            ))),
        }
    }

    fn index_of(&self, line_id: LineItemId) -> DomainResult<usize> {
        self.items
            .iter()
            .position(|i| i.line_id == line_id)
            .ok_or_else(|| self.missing_line(line_id))
    }

    fn missing_line(&self, line_id: LineItemId) -> DomainError {
        DomainError::not_found(format!("line item {line_id} is not part of return order {}", self.id))
    }
}

impl AggregateRoot for ReturnOrder {
    type Id = ReturnOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
