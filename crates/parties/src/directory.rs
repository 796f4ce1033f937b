use std::sync::Arc;

use storefront_core::{CustomerId, DomainResult};

use crate::customer::Customer;

/// Read-only customer lookup consumed by the RMA workflow.
///
/// Implementations return `DomainError::NotFound` for unknown ids and
/// `DomainError::Unavailable` when the backing store cannot be read.
pub trait CustomerDirectory: Send + Sync {
    fn get_by_id(&self, id: CustomerId) -> DomainResult<Customer>;
}

impl<D> CustomerDirectory for Arc<D>
where
    D: CustomerDirectory + ?Sized,
{
    fn get_by_id(&self, id: CustomerId) -> DomainResult<Customer> {
        (**self).get_by_id(id)
    }
}
