use std::sync::Arc;

use chrono::NaiveDate;

use storefront_core::{CustomerId, DomainResult, SalesOrderId};

use crate::order::SalesOrder;

/// Inclusive date window for sales order searches; open ends are unbounded.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|f| date >= f) && self.to.is_none_or(|t| date <= t)
    }
}

/// Read-only sales order lookup consumed by the RMA workflow.
///
/// Implementations return `DomainError::NotFound` for unknown ids and
/// `DomainError::Unavailable` when the backing store cannot be read.
pub trait SalesOrderCatalog: Send + Sync {
    fn get_by_id(&self, id: SalesOrderId) -> DomainResult<SalesOrder>;

    /// Orders placed by a customer within `range`, oldest first.
    fn find_by_customer(&self, customer_id: CustomerId, range: DateRange) -> DomainResult<Vec<SalesOrder>>;
}

impl<C> SalesOrderCatalog for Arc<C>
where
    C: SalesOrderCatalog + ?Sized,
{
    fn get_by_id(&self, id: SalesOrderId) -> DomainResult<SalesOrder> {
        (**self).get_by_id(id)
    }

    fn find_by_customer(&self, customer_id: CustomerId, range: DateRange) -> DomainResult<Vec<SalesOrder>> {
        (**self).find_by_customer(customer_id, range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, day).unwrap()
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let range = DateRange::between(d(2), d(4));
        assert!(!range.contains(d(1)));
        assert!(range.contains(d(2)));
        assert!(range.contains(d(4)));
        assert!(!range.contains(d(5)));
    }

    #[test]
    fn open_date_range_contains_everything() {
        assert!(DateRange::default().contains(d(1)));
        let from_only = DateRange { from: Some(d(3)), to: None };
        assert!(from_only.contains(d(31)));
        assert!(!from_only.contains(d(2)));
    }
}
