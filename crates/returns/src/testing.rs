//! Small in-crate fakes for unit tests. The real adapters live in `storefront-infra`.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};

use storefront_core::{
    AggregateRoot, CustomerId, DomainError, DomainResult, ExpectedVersion, LineItemId, Money, ReturnOrderId,
    SalesOrderId,
};
use storefront_events::EventEnvelope;
use storefront_parties::{Classification, Customer, CustomerDirectory};
use storefront_sales::{DateRange, ItemDescriptor, SalesOrder, SalesOrderCatalog};

use crate::event::{AGGREGATE_TYPE, ReturnOrderEvent};
use crate::order::ReturnOrder;
use crate::repository::{BuildWithId, ReturnOrderFilter, ReturnOrderRepository};

pub fn id(n: u32) -> LineItemId {
    LineItemId::new(n)
}

#[derive(Default)]
pub struct FakeCatalog {
    orders: HashMap<SalesOrderId, SalesOrder>,
}

impl FakeCatalog {
    /// One walk-in order for customer 7 with `lines` numbered items.
    pub fn with_order(id: SalesOrderId, lines: u32) -> Self {
        let items = (1..=lines)
            .map(|n| {
                ItemDescriptor::new(
                    format!("Model {n}"),
                    "Apple",
                    "Phones",
                    format!("SN-{n}"),
                    Money::from_cents(10_000 * i64::from(n)),
                )
            })
            .collect();
        let order = SalesOrder::new(
            id,
            CustomerId::new(7),
            NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            Classification::WalkIn,
            items,
        )
        .unwrap();
        let mut orders = HashMap::new();
        orders.insert(id, order);
        Self { orders }
    }
}

impl SalesOrderCatalog for FakeCatalog {
    fn get_by_id(&self, id: SalesOrderId) -> DomainResult<SalesOrder> {
        self.orders
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("sales order {id}")))
    }

    fn find_by_customer(&self, customer_id: CustomerId, range: DateRange) -> DomainResult<Vec<SalesOrder>> {
        Ok(self
            .orders
            .values()
            .filter(|o| o.customer_id() == customer_id && range.contains(o.date()))
            .cloned()
            .collect())
    }
}

pub struct FakeDirectory {
    customers: HashMap<CustomerId, Customer>,
}

impl Default for FakeDirectory {
    fn default() -> Self {
        let mut customers = HashMap::new();
        for (id, name, class) in [
            (7, "Jane Doe", Classification::WalkIn),
            (8, "Acme Corp", Classification::Contract),
        ] {
            let id = CustomerId::new(id);
            customers.insert(id, Customer::new(id, name, class));
        }
        Self { customers }
    }
}

impl CustomerDirectory for FakeDirectory {
    fn get_by_id(&self, id: CustomerId) -> DomainResult<Customer> {
        self.customers
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("customer {id}")))
    }
}

#[derive(Default)]
struct Stored {
    orders: Vec<ReturnOrder>,
    history: Vec<EventEnvelope<ReturnOrderEvent>>,
    last_id: u64,
}

/// Vec-backed repository behind a single lock.
#[derive(Default)]
pub struct FakeRepository {
    inner: Mutex<Stored>,
}

impl FakeRepository {
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().orders.len()
    }

    fn append(stored: &mut Stored, id: ReturnOrderId, event: ReturnOrderEvent) {
        let seq = stored
            .history
            .iter()
            .filter(|e| e.payload().return_order_id() == id)
            .count() as u64
            + 1;
        stored
            .history
            .push(EventEnvelope::wrap(id.to_string(), AGGREGATE_TYPE, seq, event));
    }
}

impl ReturnOrderRepository for FakeRepository {
    fn next_id(&self) -> DomainResult<ReturnOrderId> {
        Ok(ReturnOrderId::new(self.inner.lock().unwrap().last_id + 1))
    }

    fn insert_with_next_id(
        &self,
        occurred_at: DateTime<Utc>,
        build: &mut BuildWithId<'_>,
    ) -> DomainResult<ReturnOrder> {
        let mut stored = self.inner.lock().unwrap();
        let id = ReturnOrderId::new(stored.last_id + 1);
        let order = build(id)?;
        order.validate()?;
        stored.last_id = id.value();
        stored.orders.push(order.clone());
        Self::append(&mut stored, id, ReturnOrderEvent::committed(&order, occurred_at));
        Ok(order)
    }

    fn save(&self, order: ReturnOrder) -> DomainResult<()> {
        order.validate()?;
        let mut stored = self.inner.lock().unwrap();
        let id = order.id_typed();
        let seen = stored.orders.iter().any(|o| o.id_typed() == id)
            || stored.history.iter().any(|e| e.payload().return_order_id() == id);
        if seen {
            return Err(DomainError::conflict(format!("{id} already exists or was deleted")));
        }
        stored.last_id = stored.last_id.max(id.value());
        Self::append(&mut stored, id, ReturnOrderEvent::committed(&order, Utc::now()));
        stored.orders.push(order);
        Ok(())
    }

    fn update(
        &self,
        order: ReturnOrder,
        expected: ExpectedVersion,
        event: ReturnOrderEvent,
    ) -> DomainResult<ReturnOrder> {
        let mut stored = self.inner.lock().unwrap();
        let id = order.id_typed();
        let slot = stored
            .orders
            .iter_mut()
            .find(|o| o.id_typed() == id)
            .ok_or_else(|| DomainError::not_found(format!("return order {id}")))?;
        expected.check(slot.version())?;
        *slot = order.clone();
        Self::append(&mut stored, id, event);
        Ok(order)
    }

    fn delete(&self, id: ReturnOrderId) -> DomainResult<ReturnOrder> {
        let mut stored = self.inner.lock().unwrap();
        let idx = stored
            .orders
            .iter()
            .position(|o| o.id_typed() == id)
            .ok_or_else(|| DomainError::not_found(format!("return order {id}")))?;
        Ok(stored.orders.remove(idx))
    }

    fn get(&self, id: ReturnOrderId) -> DomainResult<ReturnOrder> {
        self.inner
            .lock()
            .unwrap()
            .orders
            .iter()
            .find(|o| o.id_typed() == id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("return order {id}")))
    }

    fn find_by(&self, filter: &ReturnOrderFilter) -> DomainResult<Vec<ReturnOrder>> {
        let mut found: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .orders
            .iter()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        found.sort_by_key(|o| core::cmp::Reverse(o.id_typed()));
        Ok(found)
    }

    fn history(&self, id: ReturnOrderId) -> DomainResult<Vec<EventEnvelope<ReturnOrderEvent>>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .history
            .iter()
            .filter(|e| e.payload().return_order_id() == id)
            .cloned()
            .collect())
    }
}
