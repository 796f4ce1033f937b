//! Storage boundary for committed return orders.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use storefront_core::{CustomerId, DomainResult, ExpectedVersion, ReturnOrderId, SalesOrderId};
use storefront_events::EventEnvelope;
use storefront_parties::Classification;

use crate::event::ReturnOrderEvent;
use crate::order::{ReturnOrder, ReturnOrderStatus};

/// Builds a complete order once its id is known. Called inside the repository's critical section.
pub type BuildWithId<'a> = dyn FnMut(ReturnOrderId) -> DomainResult<ReturnOrder> + 'a;

/// Optional criteria for [`ReturnOrderRepository::find_by`]; unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReturnOrderFilter {
    pub customer_id: Option<CustomerId>,
    pub sales_order_id: Option<SalesOrderId>,
    pub status: Option<ReturnOrderStatus>,
    pub classification: Option<Classification>,
}

impl ReturnOrderFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn sales_order(mut self, sales_order_id: SalesOrderId) -> Self {
        self.sales_order_id = Some(sales_order_id);
        self
    }

    pub fn status(mut self, status: ReturnOrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn classification(mut self, classification: Classification) -> Self {
        self.classification = Some(classification);
        self
    }

    pub fn matches(&self, order: &ReturnOrder) -> bool {
        self.customer_id.is_none_or(|c| order.customer_id() == c)
            && self.sales_order_id.is_none_or(|s| order.sales_order_id() == Some(s))
            && self.status.is_none_or(|s| order.status() == s)
            && self.classification.is_none_or(|c| order.classification() == c)
    }
}

/// Durable store of committed return orders.
///
/// Implementations must:
/// - hand out ids from a monotonic counter that never moves backwards, even
///   after deletions or failed inserts
/// - make id allocation and insert a single atomic step
/// - return `find_by` results newest first (id descending)
pub trait ReturnOrderRepository: Send + Sync {
    /// The id the next successful insert will receive. Does not reserve it.
    fn next_id(&self) -> DomainResult<ReturnOrderId>;

    /// Allocate the next id, build the order with it, validate and insert, atomically.
    ///
    /// If `build` or validation fails nothing is stored and the counter does not move.
    fn insert_with_next_id(
        &self,
        occurred_at: DateTime<Utc>,
        build: &mut BuildWithId<'_>,
    ) -> DomainResult<ReturnOrder>;

    /// Persist a fully-formed order under its own id.
    ///
    /// Fails with `Validation` for an order without items and `Conflict` for a duplicate id.
    fn save(&self, order: ReturnOrder) -> DomainResult<()>;

    /// Replace a stored order after a disposition change.
    ///
    /// `expected` is checked against the stored version (`Conflict` on mismatch);
    /// `event` is appended to the order's history.
    fn update(
        &self,
        order: ReturnOrder,
        expected: ExpectedVersion,
        event: ReturnOrderEvent,
    ) -> DomainResult<ReturnOrder>;

    fn delete(&self, id: ReturnOrderId) -> DomainResult<ReturnOrder>;

    fn get(&self, id: ReturnOrderId) -> DomainResult<ReturnOrder>;

    fn find_by(&self, filter: &ReturnOrderFilter) -> DomainResult<Vec<ReturnOrder>>;

    /// Audit trail of an order, oldest first.
    fn history(&self, id: ReturnOrderId) -> DomainResult<Vec<EventEnvelope<ReturnOrderEvent>>>;
}

impl<R> ReturnOrderRepository for Arc<R>
where
    R: ReturnOrderRepository + ?Sized,
{
    fn next_id(&self) -> DomainResult<ReturnOrderId> {
        (**self).next_id()
    }

    fn insert_with_next_id(
        &self,
        occurred_at: DateTime<Utc>,
        build: &mut BuildWithId<'_>,
    ) -> DomainResult<ReturnOrder> {
        (**self).insert_with_next_id(occurred_at, build)
    }

    fn save(&self, order: ReturnOrder) -> DomainResult<()> {
        (**self).save(order)
    }

    fn update(
        &self,
        order: ReturnOrder,
        expected: ExpectedVersion,
        event: ReturnOrderEvent,
    ) -> DomainResult<ReturnOrder> {
        (**self).update(order, expected, event)
    }

    fn delete(&self, id: ReturnOrderId) -> DomainResult<ReturnOrder> {
        (**self).delete(id)
    }

    fn get(&self, id: ReturnOrderId) -> DomainResult<ReturnOrder> {
        (**self).get(id)
    }

    fn find_by(&self, filter: &ReturnOrderFilter) -> DomainResult<Vec<ReturnOrder>> {
        (**self).find_by(filter)
    }

    fn history(&self, id: ReturnOrderId) -> DomainResult<Vec<EventEnvelope<ReturnOrderEvent>>> {
        (**self).history(id)
    }
}
