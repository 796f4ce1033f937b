use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use storefront_core::{AggregateRoot, DomainError, DomainResult, ExpectedVersion, ReturnOrderId};
use storefront_events::EventEnvelope;
use storefront_returns::{
    AGGREGATE_TYPE, BuildWithId, ReturnOrder, ReturnOrderEvent, ReturnOrderFilter, ReturnOrderRepository,
};

use crate::config::RmaConfig;

#[derive(Debug, Default)]
struct State {
    orders: BTreeMap<ReturnOrderId, ReturnOrder>,
    history: HashMap<ReturnOrderId, Vec<EventEnvelope<ReturnOrderEvent>>>,
    /// Highest id ever issued or saved. Never decreases.
    last_issued: u64,
}

impl State {
    fn append(&mut self, id: ReturnOrderId, event: ReturnOrderEvent) {
        let stream = self.history.entry(id).or_default();
        let sequence_number = stream.last().map(|e| e.sequence_number()).unwrap_or(0) + 1;
        stream.push(EventEnvelope::wrap(id.to_string(), AGGREGATE_TYPE, sequence_number, event));
    }

    fn insert(&mut self, order: ReturnOrder, event: ReturnOrderEvent) {
        let id = order.id_typed();
        self.last_issued = self.last_issued.max(id.value());
        self.orders.insert(id, order);
        self.append(id, event);
    }
}

/// In-memory return order store with an append-only audit trail per order.
///
/// A single mutex guards orders, history and the id counter, so id
/// allocation and insert happen in one critical section.
#[derive(Debug, Default)]
pub struct InMemoryReturnOrderRepository {
    state: Mutex<State>,
}

impl InMemoryReturnOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the id counter after `config.id_seed`.
    pub fn with_config(config: &RmaConfig) -> Self {
        Self {
            state: Mutex::new(State {
                last_issued: config.id_seed,
                ..State::default()
            }),
        }
    }

    pub fn len(&self) -> DomainResult<usize> {
        Ok(self.lock()?.orders.len())
    }

    pub fn is_empty(&self) -> DomainResult<bool> {
        Ok(self.lock()?.orders.is_empty())
    }

    fn lock(&self) -> DomainResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| DomainError::unavailable("return order store lock poisoned"))
    }
}

impl ReturnOrderRepository for InMemoryReturnOrderRepository {
    fn next_id(&self) -> DomainResult<ReturnOrderId> {
        Ok(ReturnOrderId::new(self.lock()?.last_issued + 1))
    }

    fn insert_with_next_id(
        &self,
        occurred_at: DateTime<Utc>,
        build: &mut BuildWithId<'_>,
    ) -> DomainResult<ReturnOrder> {
        let mut state = self.lock()?;
        let id = ReturnOrderId::new(state.last_issued + 1);

        let order = build(id)?;
        if order.id_typed() != id {
            return Err(DomainError::invalid_state(format!(
                "order built for {id} carries id {}",
                order.id_typed()
            )));
        }
        order.validate()?;

        let event = ReturnOrderEvent::committed(&order, occurred_at);
        state.insert(order.clone(), event);

        tracing::info!(return_order_id = %id, items = order.items().len(), "return order stored");
        Ok(order)
    }

    fn save(&self, order: ReturnOrder) -> DomainResult<()> {
        order.validate()?;
        let id = order.id_typed();

        let mut state = self.lock()?;
        if state.orders.contains_key(&id) {
            tracing::warn!(return_order_id = %id, "duplicate return order id on save");
            return Err(DomainError::conflict(format!("return order {id} already exists")));
        }
        // History outlives deletion, so it also remembers ids that must not come back.
        if state.history.contains_key(&id) {
            tracing::warn!(return_order_id = %id, "deleted return order id reused on save");
            return Err(DomainError::conflict(format!("return order {id} was deleted and cannot be reused")));
        }

        let event = ReturnOrderEvent::committed(&order, Utc::now());
        state.insert(order, event);
        Ok(())
    }

    fn update(
        &self,
        order: ReturnOrder,
        expected: ExpectedVersion,
        event: ReturnOrderEvent,
    ) -> DomainResult<ReturnOrder> {
        let id = order.id_typed();
        if event.return_order_id() != id {
            return Err(DomainError::invalid_state(format!(
                "event for {} cannot be recorded on {id}",
                event.return_order_id()
            )));
        }

        let mut state = self.lock()?;
        let stored = state
            .orders
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("return order {id}")))?;

        if let Err(e) = expected.check(stored.version()) {
            tracing::warn!(return_order_id = %id, error = %e, "stale return order update rejected");
            return Err(e);
        }
        if !stored.same_identity_fields(&order) {
            return Err(DomainError::invalid_state(format!(
                "return order {id}: identity, customer, date and items cannot change after commit"
            )));
        }

        state.orders.insert(id, order.clone());
        state.append(id, event);
        Ok(order)
    }

    fn delete(&self, id: ReturnOrderId) -> DomainResult<ReturnOrder> {
        let removed = self
            .lock()?
            .orders
            .remove(&id)
            .ok_or_else(|| DomainError::not_found(format!("return order {id}")))?;
        tracing::info!(return_order_id = %id, "return order deleted");
        Ok(removed)
    }

    fn get(&self, id: ReturnOrderId) -> DomainResult<ReturnOrder> {
        self.lock()?
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("return order {id}")))
    }

    fn find_by(&self, filter: &ReturnOrderFilter) -> DomainResult<Vec<ReturnOrder>> {
        let state = self.lock()?;
        Ok(state
            .orders
            .values()
            .rev()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect())
    }

    /// Kept after `delete`, so the trail of a removed order stays readable.
    fn history(&self, id: ReturnOrderId) -> DomainResult<Vec<EventEnvelope<ReturnOrderEvent>>> {
        self.lock()?
            .history
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("no history for return order {id}")))
    }
}
