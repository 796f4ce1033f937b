//! Post-commit disposition lifecycle.
//!
//! Transition rules live on the disposition types; this service loads the
//! committed order, applies one transition to a copy and writes it back under
//! an exact-version expectation, so concurrent writers see `Conflict` instead
//! of silently overwriting each other.

use chrono::{DateTime, Utc};

use storefront_core::{AggregateRoot, DomainError, DomainResult, ExpectedVersion, LineItemId, Money, ReturnOrderId};

use crate::disposition::{Disposition, DispositionType, RefundMethod};
use crate::event::ReturnOrderEvent;
use crate::order::ReturnOrder;
use crate::repository::ReturnOrderRepository;

pub struct DispositionTracker<'a> {
    repository: &'a dyn ReturnOrderRepository,
}

impl<'a> DispositionTracker<'a> {
    pub fn new(repository: &'a dyn ReturnOrderRepository) -> Self {
        Self { repository }
    }

    /// Current disposition of one line item.
    pub fn disposition(&self, order_id: ReturnOrderId, line_id: LineItemId) -> DomainResult<Disposition> {
        let order = self.repository.get(order_id)?;
        Ok(order.item(line_id)?.disposition.clone())
    }

    /// Replacement `Pending -> Processing`. Already processing is a no-op.
    pub fn mark_processing(
        &self,
        order_id: ReturnOrderId,
        line_id: LineItemId,
        now: DateTime<Utc>,
    ) -> DomainResult<ReturnOrder> {
        let order = self.apply(order_id, |order| order.mark_processing(line_id, now))?;
        tracing::info!(return_order_id = %order_id, line_id = %line_id, "replacement processing");
        Ok(order)
    }

    /// Replacement to the terminal `Completed` status.
    pub fn mark_completed(
        &self,
        order_id: ReturnOrderId,
        line_id: LineItemId,
        is_new_unit: bool,
        now: DateTime<Utc>,
    ) -> DomainResult<ReturnOrder> {
        let order = self.apply(order_id, |order| {
            order.mark_completed(line_id, is_new_unit, now).map(Some)
        })?;
        tracing::info!(
            return_order_id = %order_id,
            line_id = %line_id,
            is_new_unit,
            "replacement completed"
        );
        Ok(order)
    }

    /// Record (or edit) the refund for a refund-routed item.
    pub fn record_refund(
        &self,
        order_id: ReturnOrderId,
        line_id: LineItemId,
        amount: Money,
        method: RefundMethod,
        now: DateTime<Utc>,
    ) -> DomainResult<ReturnOrder> {
        let order = self.apply(order_id, |order| {
            order.record_refund(line_id, amount, method, now).map(Some)
        })?;
        tracing::info!(
            return_order_id = %order_id,
            line_id = %line_id,
            amount = %amount,
            method = %method,
            "refund recorded"
        );
        Ok(order)
    }

    /// Like [`record_refund`](Self::record_refund), parsing the method from its display name.
    pub fn record_refund_text(
        &self,
        order_id: ReturnOrderId,
        line_id: LineItemId,
        amount: Money,
        method: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<ReturnOrder> {
        let method: RefundMethod = method.parse()?;
        self.record_refund(order_id, line_id, amount, method, now)
    }

    /// Route an item to another disposition type, discarding its current sub-record.
    pub fn reassign(
        &self,
        order_id: ReturnOrderId,
        line_id: LineItemId,
        to: DispositionType,
        now: DateTime<Utc>,
    ) -> DomainResult<ReturnOrder> {
        let mut discarded = None;
        let order = self.apply(order_id, |order| {
            let event = order.reassign_disposition(line_id, to, now)?;
            if let Some(ReturnOrderEvent::DispositionReassigned(e)) = &event {
                discarded = Some(e.discarded.clone());
            }
            Ok(event)
        })?;

        match discarded {
            Some(prior) if prior.is_settled() => tracing::warn!(
                return_order_id = %order_id,
                line_id = %line_id,
                from = %prior.disposition_type(),
                to = %to,
                prior = ?prior,
                "settled disposition reassigned"
            ),
            Some(prior) => tracing::info!(
                return_order_id = %order_id,
                line_id = %line_id,
                from = %prior.disposition_type(),
                to = %to,
                prior = ?prior,
                "disposition reassigned"
            ),
            None => tracing::debug!(return_order_id = %order_id, line_id = %line_id, "reassignment to same type ignored"),
        }
        Ok(order)
    }

    fn apply<F>(&self, order_id: ReturnOrderId, transition: F) -> DomainResult<ReturnOrder>
    where
        F: FnOnce(&mut ReturnOrder) -> DomainResult<Option<ReturnOrderEvent>>,
    {
        let mut order = self.repository.get(order_id)?;
        let expected = ExpectedVersion::Exact(order.version());

        let Some(event) = transition(&mut order)? else {
            return Ok(order);
        };

        self.repository
            .update(order, expected, event)
            .inspect_err(|e| {
                if matches!(e, DomainError::Conflict(_)) {
                    tracing::warn!(return_order_id = %order_id, error = %e, "disposition update lost a version race");
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ReturnOrderBuilder;
    use crate::disposition::ReplacementStatus;
    use crate::order::ReturnOrderStatus;
    use crate::testing::{FakeCatalog, FakeDirectory, FakeRepository, id};
    use storefront_core::SalesOrderId;

    /// Commit one order with items 1 (Replacement) and 2 (Refund).
    fn committed(repo: &FakeRepository) -> ReturnOrderId {
        let catalog = FakeCatalog::with_order(SalesOrderId::new(1001), 2);
        let customers = FakeDirectory::default();
        let mut builder = ReturnOrderBuilder::new(&catalog, &customers);
        builder.select_sales_order(SalesOrderId::new(1001)).unwrap();
        for n in [1, 2] {
            builder.begin_item_return(id(n)).unwrap();
            builder.commit_item_return(id(n), "faulty", vec![]).unwrap();
        }
        builder.set_item_disposition(id(2), DispositionType::Refund).unwrap();
        builder.commit(repo, Utc::now()).unwrap().id_typed()
    }

    #[test]
    fn replacement_lifecycle_moves_forward_only() {
        let repo = FakeRepository::default();
        let ro = committed(&repo);
        let tracker = DispositionTracker::new(&repo);

        let order = tracker.mark_processing(ro, id(1), Utc::now()).unwrap();
        assert_eq!(order.replacement(id(1)).unwrap().status, ReplacementStatus::Processing);
        assert_eq!(order.status(), ReturnOrderStatus::Processing);

        let again = tracker.mark_processing(ro, id(1), Utc::now()).unwrap();
        assert_eq!(again.version(), order.version());

        tracker.mark_completed(ro, id(1), true, Utc::now()).unwrap();
        let err = tracker.mark_completed(ro, id(1), false, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));

        let stored = repo.get(ro).unwrap();
        let replacement = stored.replacement(id(1)).unwrap();
        assert_eq!(replacement.status, ReplacementStatus::Completed);
        assert!(replacement.is_new_unit);
    }

    #[test]
    fn wrong_variant_operations_are_invalid_transitions() {
        let repo = FakeRepository::default();
        let ro = committed(&repo);
        let tracker = DispositionTracker::new(&repo);

        let err = tracker.mark_processing(ro, id(2), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));
        let err = tracker
            .record_refund(ro, id(1), Money::from_cents(100), RefundMethod::Cash, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));
        assert_eq!(repo.get(ro).unwrap().version(), 0);
    }

    #[test]
    fn refund_validation_and_method_parsing() {
        let repo = FakeRepository::default();
        let ro = committed(&repo);
        let tracker = DispositionTracker::new(&repo);

        let err = tracker
            .record_refund(ro, id(2), Money::from_cents(-5), RefundMethod::Cash, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let err = tracker
            .record_refund_text(ro, id(2), Money::from_cents(5), "Gift card", Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let order = tracker
            .record_refund_text(ro, id(2), Money::from_cents(45_645_600), "bank transfer", Utc::now())
            .unwrap();
        let refund = order.refund(id(2)).unwrap();
        assert_eq!(refund.method, Some(RefundMethod::BankTransfer));
        assert_eq!(order.refund_total().unwrap(), Money::from_cents(45_645_600));
    }

    #[test]
    fn reassign_creates_fresh_sub_record_and_records_history() {
        let repo = FakeRepository::default();
        let ro = committed(&repo);
        let tracker = DispositionTracker::new(&repo);

        tracker.mark_processing(ro, id(1), Utc::now()).unwrap();
        let before = tracker.disposition(ro, id(1)).unwrap();

        let order = tracker.reassign(ro, id(1), DispositionType::Refund, Utc::now()).unwrap();
        let refund = order.refund(id(1)).unwrap();
        assert_eq!(refund.amount, Money::ZERO);
        assert!(refund.method.is_none());
        assert_ne!(refund.id, before.id());

        let unchanged = tracker.reassign(ro, id(1), DispositionType::Refund, Utc::now()).unwrap();
        assert_eq!(unchanged.version(), order.version());

        let types: Vec<_> = repo
            .history(ro)
            .unwrap()
            .iter()
            .map(|e| e.event_type().to_string())
            .collect();
        assert_eq!(
            types,
            vec![
                "returns.order.committed",
                "returns.replacement.processing",
                "returns.disposition.reassigned",
            ]
        );
    }

    #[test]
    fn unknown_order_or_line_is_not_found() {
        let repo = FakeRepository::default();
        let ro = committed(&repo);
        let tracker = DispositionTracker::new(&repo);

        let err = tracker.disposition(ReturnOrderId::new(99), id(1)).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        let err = tracker.mark_processing(ro, id(9), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
