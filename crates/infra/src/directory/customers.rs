use std::collections::HashMap;
use std::sync::RwLock;

use storefront_core::{CustomerId, DomainError, DomainResult};
use storefront_parties::{Customer, CustomerDirectory};

#[derive(Debug, Default)]
pub struct InMemoryCustomerDirectory {
    customers: RwLock<HashMap<CustomerId, Customer>>,
}

impl InMemoryCustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customers(customers: impl IntoIterator<Item = Customer>) -> Self {
        Self {
            customers: RwLock::new(customers.into_iter().map(|c| (c.id, c)).collect()),
        }
    }

    /// Insert or replace a customer.
    pub fn insert(&self, customer: Customer) -> DomainResult<()> {
        let mut map = self
            .customers
            .write()
            .map_err(|_| DomainError::unavailable("customer directory lock poisoned"))?;
        map.insert(customer.id, customer);
        Ok(())
    }
}

impl CustomerDirectory for InMemoryCustomerDirectory {
    fn get_by_id(&self, id: CustomerId) -> DomainResult<Customer> {
        let map = self
            .customers
            .read()
            .map_err(|_| DomainError::unavailable("customer directory lock poisoned"))?;
        map.get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("customer {id}")))
    }
}
