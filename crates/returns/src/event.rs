use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{CustomerId, LineItemId, Money, ReturnOrderId, SalesOrderId};
use storefront_events::Event;

use crate::disposition::{Disposition, DispositionType, RefundMethod};
use crate::order::ReturnOrder;

/// Aggregate type recorded on return order event envelopes.
pub const AGGREGATE_TYPE: &str = "returns.order";

/// Event: ReturnOrderCommitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnOrderCommitted {
    pub return_order_id: ReturnOrderId,
    pub customer_id: CustomerId,
    pub sales_order_id: Option<SalesOrderId>,
    pub item_count: usize,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ReplacementProcessing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementProcessing {
    pub return_order_id: ReturnOrderId,
    pub line_id: LineItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ReplacementCompleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementCompleted {
    pub return_order_id: ReturnOrderId,
    pub line_id: LineItemId,
    pub is_new_unit: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Event: RefundRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRecorded {
    pub return_order_id: ReturnOrderId,
    pub line_id: LineItemId,
    pub amount: Money,
    pub method: RefundMethod,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DispositionReassigned. Carries the discarded sub-record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispositionReassigned {
    pub return_order_id: ReturnOrderId,
    pub line_id: LineItemId,
    pub from: DispositionType,
    pub to: DispositionType,
    pub discarded: Disposition,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnOrderEvent {
    ReturnOrderCommitted(ReturnOrderCommitted),
    ReplacementProcessing(ReplacementProcessing),
    ReplacementCompleted(ReplacementCompleted),
    RefundRecorded(RefundRecorded),
    DispositionReassigned(DispositionReassigned),
}

impl ReturnOrderEvent {
    pub fn committed(order: &ReturnOrder, occurred_at: DateTime<Utc>) -> Self {
        ReturnOrderEvent::ReturnOrderCommitted(ReturnOrderCommitted {
            return_order_id: order.id_typed(),
            customer_id: order.customer_id(),
            sales_order_id: order.sales_order_id(),
            item_count: order.items().len(),
            occurred_at,
        })
    }

    pub fn return_order_id(&self) -> ReturnOrderId {
        match self {
            ReturnOrderEvent::ReturnOrderCommitted(e) => e.return_order_id,
            ReturnOrderEvent::ReplacementProcessing(e) => e.return_order_id,
            ReturnOrderEvent::ReplacementCompleted(e) => e.return_order_id,
            ReturnOrderEvent::RefundRecorded(e) => e.return_order_id,
            ReturnOrderEvent::DispositionReassigned(e) => e.return_order_id,
        }
    }
}

impl Event for ReturnOrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ReturnOrderEvent::ReturnOrderCommitted(_) => "returns.order.committed",
            ReturnOrderEvent::ReplacementProcessing(_) => "returns.replacement.processing",
            ReturnOrderEvent::ReplacementCompleted(_) => "returns.replacement.completed",
            ReturnOrderEvent::RefundRecorded(_) => "returns.refund.recorded",
            ReturnOrderEvent::DispositionReassigned(_) => "returns.disposition.reassigned",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ReturnOrderEvent::ReturnOrderCommitted(e) => e.occurred_at,
            ReturnOrderEvent::ReplacementProcessing(e) => e.occurred_at,
            ReturnOrderEvent::ReplacementCompleted(e) => e.occurred_at,
            ReturnOrderEvent::RefundRecorded(e) => e.occurred_at,
            ReturnOrderEvent::DispositionReassigned(e) => e.occurred_at,
        }
    }
}
