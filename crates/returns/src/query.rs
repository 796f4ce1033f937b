//! Read side for browsing committed return orders.

use core::str::FromStr;
use std::collections::HashMap;

use serde::Serialize;

use storefront_core::{CustomerId, DomainError, DomainResult, Money, ReturnOrderId};
use storefront_parties::{Classification, CustomerDirectory};

use crate::order::{ReturnOrder, ReturnOrderStatus};
use crate::repository::{ReturnOrderFilter, ReturnOrderRepository};

/// Classification tab of the return list: everything, or one classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClassificationFilter {
    #[default]
    All,
    Only(Classification),
}

impl ClassificationFilter {
    fn as_option(self) -> Option<Classification> {
        match self {
            ClassificationFilter::All => None,
            ClassificationFilter::Only(c) => Some(c),
        }
    }
}

impl FromStr for ClassificationFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(ClassificationFilter::All);
        }
        s.parse().map(ClassificationFilter::Only)
    }
}

/// Number of committed orders per derived status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
}

impl StatusSummary {
    pub fn total(&self) -> usize {
        self.pending + self.processing + self.completed
    }
}

pub struct ReturnOrderQueryService<'a> {
    repository: &'a dyn ReturnOrderRepository,
    customers: &'a dyn CustomerDirectory,
}

impl<'a> ReturnOrderQueryService<'a> {
    pub fn new(repository: &'a dyn ReturnOrderRepository, customers: &'a dyn CustomerDirectory) -> Self {
        Self {
            repository,
            customers,
        }
    }

    /// Case-insensitive substring search over return id, customer name and
    /// sales order id, newest first. Blank text matches every order.
    pub fn search(&self, text: &str, classification: ClassificationFilter) -> DomainResult<Vec<ReturnOrder>> {
        let filter = ReturnOrderFilter {
            classification: classification.as_option(),
            ..ReturnOrderFilter::all()
        };
        let orders = self.repository.find_by(&filter)?;

        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(orders);
        }

        let mut names: HashMap<CustomerId, Option<String>> = HashMap::new();
        let mut matched = Vec::new();
        for order in orders {
            if self.matches(&order, &needle, &mut names)? {
                matched.push(order);
            }
        }
        tracing::debug!(text = %text, hits = matched.len(), "return order search");
        Ok(matched)
    }

    pub fn get(&self, id: ReturnOrderId) -> DomainResult<ReturnOrder> {
        self.repository.get(id)
    }

    pub fn status_summary(&self) -> DomainResult<StatusSummary> {
        let orders = self.repository.find_by(&ReturnOrderFilter::all())?;
        Ok(orders.iter().fold(StatusSummary::default(), |mut acc, order| {
            match order.status() {
                ReturnOrderStatus::Pending => acc.pending += 1,
                ReturnOrderStatus::Processing => acc.processing += 1,
                ReturnOrderStatus::Completed => acc.completed += 1,
            }
            acc
        }))
    }

    pub fn refund_total(&self, id: ReturnOrderId) -> DomainResult<Money> {
        self.repository.get(id)?.refund_total()
    }

    fn matches(
        &self,
        order: &ReturnOrder,
        needle: &str,
        names: &mut HashMap<CustomerId, Option<String>>,
    ) -> DomainResult<bool> {
        if order.id_typed().to_string().to_lowercase().contains(needle) {
            return Ok(true);
        }
        if order
            .sales_order_id()
            .is_some_and(|so| so.to_string().to_lowercase().contains(needle))
        {
            return Ok(true);
        }

        let customer_id = order.customer_id();
        let name = match names.get(&customer_id) {
            Some(name) => name.clone(),
            None => {
                // A customer removed from the directory simply has no name to match.
                let name = match self.customers.get_by_id(customer_id) {
                    Ok(c) => Some(c.name.to_lowercase()),
                    Err(DomainError::NotFound(_)) => None,
                    Err(e) => return Err(e),
                };
                names.insert(customer_id, name.clone());
                name
            }
        };
        Ok(name.is_some_and(|n| n.contains(needle)))
    }
}
