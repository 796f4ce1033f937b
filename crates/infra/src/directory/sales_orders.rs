use std::collections::BTreeMap;
use std::sync::RwLock;

use storefront_core::{CustomerId, DomainError, DomainResult, Entity, SalesOrderId};
use storefront_sales::{DateRange, SalesOrder, SalesOrderCatalog};

#[derive(Debug, Default)]
pub struct InMemorySalesOrderCatalog {
    orders: RwLock<BTreeMap<SalesOrderId, SalesOrder>>,
}

impl InMemorySalesOrderCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(orders: impl IntoIterator<Item = SalesOrder>) -> Self {
        Self {
            orders: RwLock::new(orders.into_iter().map(|o| (*o.id(), o)).collect()),
        }
    }

    pub fn insert(&self, order: SalesOrder) -> DomainResult<()> {
        let mut map = self
            .orders
            .write()
            .map_err(|_| DomainError::unavailable("sales order catalog lock poisoned"))?;
        map.insert(order.id_typed(), order);
        Ok(())
    }
}

impl SalesOrderCatalog for InMemorySalesOrderCatalog {
    fn get_by_id(&self, id: SalesOrderId) -> DomainResult<SalesOrder> {
        let map = self
            .orders
            .read()
            .map_err(|_| DomainError::unavailable("sales order catalog lock poisoned"))?;
        map.get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("sales order {id}")))
    }

    fn find_by_customer(&self, customer_id: CustomerId, range: DateRange) -> DomainResult<Vec<SalesOrder>> {
        let map = self
            .orders
            .read()
            .map_err(|_| DomainError::unavailable("sales order catalog lock poisoned"))?;
        let mut found: Vec<SalesOrder> = map
            .values()
            .filter(|o| o.customer_id() == customer_id && range.contains(o.date()))
            .cloned()
            .collect();
        found.sort_by_key(|o| (o.date(), o.id_typed()));
        Ok(found)
    }
}
