//! Interactive drafting of a return order.
//!
//! A [`ReturnOrderBuilder`] owns exactly one [`ReturnOrderDraft`] and borrows
//! the read-only collaborators it validates against. It belongs to a single
//! session; nothing here is shared or global.
//!
//! Every operation either applies completely or returns an error and leaves
//! the draft exactly as it was.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use storefront_core::{CustomerId, DomainError, DomainResult, LineItemId, ReturnOrderId, SalesOrderId};
use storefront_parties::{Classification, CustomerDirectory};
use storefront_sales::{ItemDescriptor, SalesOrderCatalog, SalesOrderLineItem};

use crate::disposition::{Disposition, DispositionType};
use crate::order::{EvidenceRef, ReturnLineItem, ReturnOrder};
use crate::repository::ReturnOrderRepository;

/// Limits applied while capturing items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftPolicy {
    pub max_evidence_per_item: usize,
}

impl Default for DraftPolicy {
    fn default() -> Self {
        Self {
            max_evidence_per_item: 10,
        }
    }
}

/// An item chosen for return, with everything captured for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCapture {
    pub item: SalesOrderLineItem,
    pub reason: String,
    pub evidence: Vec<EvidenceRef>,
    pub disposition_type: DispositionType,
}

/// In-progress return order.
///
/// Every known line id is in exactly one of: the available pool, the selected
/// pool, or the consumed set (already committed from this draft).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnOrderDraft {
    sales_order_id: Option<SalesOrderId>,
    customer_id: Option<CustomerId>,
    date: Option<NaiveDate>,
    classification: Option<Classification>,
    reason: String,
    /// Customer and classification of the loaded sales order.
    defaults: Option<(CustomerId, Classification)>,
    items: BTreeSet<LineItemId>,
    available: BTreeMap<LineItemId, SalesOrderLineItem>,
    selected: BTreeMap<LineItemId, ItemCapture>,
    consumed: BTreeSet<LineItemId>,
    pending_capture: Option<LineItemId>,
}

impl ReturnOrderDraft {
    pub fn sales_order_id(&self) -> Option<SalesOrderId> {
        self.sales_order_id
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn classification(&self) -> Option<Classification> {
        self.classification
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Items still available for return, in line order.
    pub fn available_items(&self) -> impl Iterator<Item = &SalesOrderLineItem> {
        self.available.values()
    }

    /// Items selected for return, in line order.
    pub fn selected_items(&self) -> impl Iterator<Item = &ItemCapture> {
        self.selected.values()
    }

    pub fn available_ids(&self) -> Vec<LineItemId> {
        self.available.keys().copied().collect()
    }

    pub fn selected_ids(&self) -> Vec<LineItemId> {
        self.selected.keys().copied().collect()
    }

    pub fn capture(&self, line_id: LineItemId) -> Option<&ItemCapture> {
        self.selected.get(&line_id)
    }

    pub fn pending_capture(&self) -> Option<LineItemId> {
        self.pending_capture
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.customer_id.is_none()
    }

    /// Pools are disjoint and together cover every known item.
    pub fn partition_holds(&self) -> bool {
        let mut seen = BTreeSet::new();
        let all = self
            .available
            .keys()
            .chain(self.selected.keys())
            .chain(self.consumed.iter());
        for id in all {
            if !seen.insert(*id) {
                return false;
            }
        }
        seen == self.items
            && self
                .pending_capture
                .is_none_or(|id| self.available.contains_key(&id))
    }

    fn locate(&self, line_id: LineItemId) -> DomainError {
        if self.selected.contains_key(&line_id) {
            DomainError::invalid_state(format!("line item {line_id} is already selected for return"))
        } else if self.consumed.contains(&line_id) {
            DomainError::invalid_state(format!("line item {line_id} was already returned from this draft"))
        } else {
            DomainError::not_found(format!("line item {line_id} is not in the available pool"))
        }
    }
}

/// Session-scoped builder for a single return order draft.
pub struct ReturnOrderBuilder<'a> {
    catalog: &'a dyn SalesOrderCatalog,
    customers: &'a dyn CustomerDirectory,
    policy: DraftPolicy,
    draft: ReturnOrderDraft,
}

impl<'a> ReturnOrderBuilder<'a> {
    pub fn new(catalog: &'a dyn SalesOrderCatalog, customers: &'a dyn CustomerDirectory) -> Self {
        Self::with_policy(catalog, customers, DraftPolicy::default())
    }

    pub fn with_policy(
        catalog: &'a dyn SalesOrderCatalog,
        customers: &'a dyn CustomerDirectory,
        policy: DraftPolicy,
    ) -> Self {
        Self {
            catalog,
            customers,
            policy,
            draft: ReturnOrderDraft::default(),
        }
    }

    pub fn draft(&self) -> &ReturnOrderDraft {
        &self.draft
    }

    pub fn policy(&self) -> DraftPolicy {
        self.policy
    }

    /// Load a sales order as the source of returnable items.
    ///
    /// Rejected while items are selected, so picked items are never stranded.
    pub fn select_sales_order(&mut self, sales_order_id: SalesOrderId) -> DomainResult<()> {
        if !self.draft.selected.is_empty() {
            return Err(DomainError::invalid_state(format!(
                "{} item(s) are selected for return; clear the selection before choosing another sales order",
                self.draft.selected.len()
            )));
        }

        let order = self.catalog.get_by_id(sales_order_id)?;

        // Items already returned from this sale stay consumed when it is reloaded.
        let consumed: BTreeSet<LineItemId> = if self.draft.sales_order_id == Some(sales_order_id) {
            order
                .lines()
                .iter()
                .map(|line| line.line_id)
                .filter(|id| self.draft.consumed.contains(id))
                .collect()
        } else {
            BTreeSet::new()
        };
        let available: BTreeMap<_, _> = order
            .lines()
            .iter()
            .filter(|line| !consumed.contains(&line.line_id))
            .map(|line| (line.line_id, line.clone()))
            .collect();

        self.draft = ReturnOrderDraft {
            sales_order_id: Some(sales_order_id),
            customer_id: Some(order.customer_id()),
            date: self.draft.date,
            classification: Some(order.classification()),
            reason: core::mem::take(&mut self.draft.reason),
            defaults: Some((order.customer_id(), order.classification())),
            items: order.lines().iter().map(|line| line.line_id).collect(),
            available,
            selected: BTreeMap::new(),
            consumed,
            pending_capture: None,
        };

        tracing::debug!(
            sales_order_id = %sales_order_id,
            items = self.draft.items.len(),
            "sales order selected for return"
        );
        Ok(())
    }

    /// Add an item to a customer-direct return (one without a sales order).
    pub fn add_direct_item(&mut self, descriptor: ItemDescriptor) -> DomainResult<LineItemId> {
        if let Some(so) = self.draft.sales_order_id {
            return Err(DomainError::invalid_state(format!(
                "draft is tied to sales order {so}; items come from that order"
            )));
        }
        descriptor.validate()?;

        let line_id = self
            .draft
            .items
            .last()
            .map(LineItemId::next)
            .unwrap_or_else(|| LineItemId::new(1));
        self.draft.items.insert(line_id);
        self.draft.available.insert(line_id, descriptor.into_line(line_id));

        tracing::debug!(line_id = %line_id, "direct return item added");
        Ok(line_id)
    }

    /// Open the reason/evidence capture for an available item.
    ///
    /// There is a single capture slot; opening it for another item replaces it.
    pub fn begin_item_return(&mut self, line_id: LineItemId) -> DomainResult<()> {
        if !self.draft.available.contains_key(&line_id) {
            return Err(self.draft.locate(line_id));
        }
        if let Some(previous) = self.draft.pending_capture.replace(line_id) {
            if previous != line_id {
                tracing::debug!(line_id = %previous, "pending capture replaced");
            }
        }
        Ok(())
    }

    /// Finish the open capture and move the item to the selected pool.
    pub fn commit_item_return(
        &mut self,
        line_id: LineItemId,
        reason: &str,
        evidence: Vec<EvidenceRef>,
    ) -> DomainResult<()> {
        if self.draft.pending_capture != Some(line_id) {
            return Err(DomainError::validation(format!(
                "no return capture is open for line item {line_id}"
            )));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::validation("return reason is required"));
        }
        if evidence.len() > self.policy.max_evidence_per_item {
            return Err(DomainError::validation(format!(
                "at most {} evidence attachments are allowed per item",
                self.policy.max_evidence_per_item
            )));
        }
        if evidence.iter().any(|e| e.as_str().trim().is_empty()) {
            return Err(DomainError::validation("evidence references cannot be blank"));
        }

        let item = self
            .draft
            .available
            .remove(&line_id)
            .ok_or_else(|| self.draft.locate(line_id))?;

        self.draft.selected.insert(
            line_id,
            ItemCapture {
                item,
                reason: reason.to_string(),
                evidence,
                disposition_type: DispositionType::Replacement,
            },
        );
        self.draft.pending_capture = None;

        tracing::debug!(line_id = %line_id, "item selected for return");
        Ok(())
    }

    /// Close the open capture without moving the item. No-op if none is open for it.
    pub fn cancel_item_return(&mut self, line_id: LineItemId) {
        if self.draft.pending_capture == Some(line_id) {
            self.draft.pending_capture = None;
        }
    }

    /// Move a selected item back to the available pool, dropping its reason and evidence.
    pub fn remove_selected_item(&mut self, line_id: LineItemId) -> DomainResult<()> {
        let capture = self.draft.selected.remove(&line_id).ok_or_else(|| {
            DomainError::not_found(format!("line item {line_id} is not selected for return"))
        })?;
        self.draft.available.insert(line_id, capture.item);

        tracing::debug!(line_id = %line_id, "item removed from return selection");
        Ok(())
    }

    /// Move every selected item back to the available pool.
    pub fn clear_selection(&mut self) {
        let selected = core::mem::take(&mut self.draft.selected);
        for (line_id, capture) in selected {
            self.draft.available.insert(line_id, capture.item);
        }
    }

    pub fn set_item_disposition(&mut self, line_id: LineItemId, ty: DispositionType) -> DomainResult<()> {
        let capture = self.draft.selected.get_mut(&line_id).ok_or_else(|| {
            DomainError::not_found(format!("line item {line_id} is not selected for return"))
        })?;
        capture.disposition_type = ty;
        Ok(())
    }

    /// Set the order-level fields. The customer must exist in the directory.
    pub fn set_overall_fields(
        &mut self,
        customer_id: CustomerId,
        date: NaiveDate,
        classification: Classification,
        reason: &str,
    ) -> DomainResult<()> {
        let customer = self.customers.get_by_id(customer_id)?;

        self.draft.customer_id = Some(customer.id);
        self.draft.date = Some(date);
        self.draft.classification = Some(classification);
        self.draft.reason = reason.trim().to_string();
        Ok(())
    }

    /// Freeze the selected pool into a committed [`ReturnOrder`].
    ///
    /// Id allocation and insert happen in one repository step. On failure the
    /// draft and the repository are unchanged. On success the selected items
    /// become consumed and the overall fields reset to the sales order's
    /// defaults; the remaining available items stay loaded.
    pub fn commit(
        &mut self,
        repository: &dyn ReturnOrderRepository,
        now: DateTime<Utc>,
    ) -> DomainResult<ReturnOrder> {
        if self.draft.selected.is_empty() {
            tracing::warn!("return order commit rejected: no items selected");
            return Err(DomainError::validation("no items selected"));
        }
        let Some(customer_id) = self.draft.customer_id else {
            tracing::warn!("return order commit rejected: customer required");
            return Err(DomainError::validation("customer required"));
        };
        let classification = self
            .draft
            .classification
            .ok_or_else(|| DomainError::validation("classification required"))?;

        let date = self.draft.date.unwrap_or_else(|| now.date_naive());
        let created = now.date_naive();
        let items: Vec<ReturnLineItem> = self
            .draft
            .selected
            .values()
            .map(|capture| freeze(capture, created))
            .collect();
        let sales_order_id = self.draft.sales_order_id;
        let reason = self.draft.reason.clone();

        let order = repository.insert_with_next_id(now, &mut |id: ReturnOrderId| {
            ReturnOrder::new(
                id,
                customer_id,
                date,
                classification,
                sales_order_id,
                reason.clone(),
                items.clone(),
            )
        })?;

        let committed = core::mem::take(&mut self.draft.selected);
        self.draft.consumed.extend(committed.into_keys());
        self.draft.pending_capture = None;
        self.draft.customer_id = self.draft.defaults.map(|(c, _)| c);
        self.draft.classification = self.draft.defaults.map(|(_, c)| c);
        self.draft.date = None;
        self.draft.reason.clear();

        tracing::info!(
            return_order_id = %order.id_typed(),
            customer_id = %customer_id,
            items = order.items().len(),
            "return order committed"
        );
        Ok(order)
    }

    /// Drop the draft entirely.
    pub fn discard(&mut self) {
        if !self.draft.is_empty() {
            tracing::debug!(
                selected = self.draft.selected.len(),
                "return order draft discarded"
            );
        }
        self.draft = ReturnOrderDraft::default();
    }
}

fn freeze(capture: &ItemCapture, created: NaiveDate) -> ReturnLineItem {
    let item = &capture.item;
    ReturnLineItem {
        line_id: item.line_id,
        model: item.model.clone(),
        brand: item.brand.clone(),
        category: item.category.clone(),
        serial_number: item.serial_number.clone(),
        price: item.unit_price,
        reason: capture.reason.clone(),
        evidence: capture.evidence.clone(),
        disposition: Disposition::initial(capture.disposition_type, created),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disposition::ReplacementStatus;
    use crate::testing::{FakeCatalog, FakeDirectory, FakeRepository, id};
    use proptest::prelude::*;
    use storefront_core::AggregateRoot;

    fn so() -> SalesOrderId {
        SalesOrderId::new(1001)
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, day).unwrap()
    }

    #[test]
    fn select_sales_order_loads_all_items_and_defaults_customer() {
        let (catalog, customers) = (FakeCatalog::with_order(so(), 2), FakeDirectory::default());
        let mut builder = ReturnOrderBuilder::new(&catalog, &customers);

        builder.select_sales_order(so()).unwrap();

        let draft = builder.draft();
        assert_eq!(draft.available_ids(), vec![id(1), id(2)]);
        assert!(draft.selected_ids().is_empty());
        assert_eq!(draft.customer_id(), Some(CustomerId::new(7)));
        assert_eq!(draft.classification(), Some(Classification::WalkIn));
        assert!(draft.partition_holds());
    }

    #[test]
    fn select_unknown_sales_order_is_not_found_and_keeps_draft() {
        let (catalog, customers) = (FakeCatalog::with_order(so(), 2), FakeDirectory::default());
        let mut builder = ReturnOrderBuilder::new(&catalog, &customers);
        builder.select_sales_order(so()).unwrap();
        let before = builder.draft().clone();

        let err = builder.select_sales_order(SalesOrderId::new(9)).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(builder.draft(), &before);
    }

    #[test]
    fn select_sales_order_with_selected_items_is_rejected() {
        let (catalog, customers) = (FakeCatalog::with_order(so(), 2), FakeDirectory::default());
        let mut builder = ReturnOrderBuilder::new(&catalog, &customers);
        builder.select_sales_order(so()).unwrap();
        builder.begin_item_return(id(1)).unwrap();
        builder.commit_item_return(id(1), "dead pixel", vec![]).unwrap();

        let err = builder.select_sales_order(so()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
        assert_eq!(builder.draft().selected_ids(), vec![id(1)]);

        builder.clear_selection();
        builder.select_sales_order(so()).unwrap();
        assert_eq!(builder.draft().available_ids(), vec![id(1), id(2)]);
    }

    #[test]
    fn commit_item_return_requires_open_capture_and_reason() {
        let (catalog, customers) = (FakeCatalog::with_order(so(), 2), FakeDirectory::default());
        let mut builder = ReturnOrderBuilder::new(&catalog, &customers);
        builder.select_sales_order(so()).unwrap();

        let err = builder.commit_item_return(id(1), "broken hinge", vec![]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        builder.begin_item_return(id(1)).unwrap();
        let err = builder.commit_item_return(id(1), "   ", vec![]).unwrap_err();
        assert_eq!(err, DomainError::validation("return reason is required"));
        assert_eq!(builder.draft().pending_capture(), Some(id(1)));
        assert_eq!(builder.draft().available_ids(), vec![id(1), id(2)]);

        builder
            .commit_item_return(id(1), "broken hinge", vec![EvidenceRef::new("hinge.jpg")])
            .unwrap();
        let capture = builder.draft().capture(id(1)).unwrap();
        assert_eq!(capture.reason, "broken hinge");
        assert_eq!(capture.disposition_type, DispositionType::Replacement);
        assert_eq!(builder.draft().pending_capture(), None);
    }

    #[test]
    fn evidence_limit_is_enforced() {
        let (catalog, customers) = (FakeCatalog::with_order(so(), 1), FakeDirectory::default());
        let policy = DraftPolicy { max_evidence_per_item: 1 };
        let mut builder = ReturnOrderBuilder::with_policy(&catalog, &customers, policy);
        builder.select_sales_order(so()).unwrap();
        builder.begin_item_return(id(1)).unwrap();

        let evidence = vec![EvidenceRef::new("a.jpg"), EvidenceRef::new("b.jpg")];
        let err = builder.commit_item_return(id(1), "scratched", evidence).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("at most 1")));
    }

    #[test]
    fn begin_on_selected_item_is_invalid_state() {
        let (catalog, customers) = (FakeCatalog::with_order(so(), 2), FakeDirectory::default());
        let mut builder = ReturnOrderBuilder::new(&catalog, &customers);
        builder.select_sales_order(so()).unwrap();
        builder.begin_item_return(id(1)).unwrap();
        builder.commit_item_return(id(1), "no power", vec![]).unwrap();

        assert!(matches!(builder.begin_item_return(id(1)).unwrap_err(), DomainError::InvalidState(_)));
        assert!(matches!(builder.begin_item_return(id(9)).unwrap_err(), DomainError::NotFound(_)));
    }

    #[test]
    fn cancel_item_return_is_idempotent() {
        let (catalog, customers) = (FakeCatalog::with_order(so(), 2), FakeDirectory::default());
        let mut builder = ReturnOrderBuilder::new(&catalog, &customers);
        builder.select_sales_order(so()).unwrap();
        builder.begin_item_return(id(2)).unwrap();

        builder.cancel_item_return(id(1));
        assert_eq!(builder.draft().pending_capture(), Some(id(2)));
        builder.cancel_item_return(id(2));
        builder.cancel_item_return(id(2));
        assert_eq!(builder.draft().pending_capture(), None);
        assert_eq!(builder.draft().available_ids(), vec![id(1), id(2)]);
    }

    #[test]
    fn remove_selected_item_restores_a_clean_item() {
        let (catalog, customers) = (FakeCatalog::with_order(so(), 2), FakeDirectory::default());
        let mut builder = ReturnOrderBuilder::new(&catalog, &customers);
        builder.select_sales_order(so()).unwrap();
        builder.begin_item_return(id(1)).unwrap();
        builder
            .commit_item_return(id(1), "cracked screen", vec![EvidenceRef::new("crack.jpg")])
            .unwrap();
        builder.set_item_disposition(id(1), DispositionType::Refund).unwrap();

        builder.remove_selected_item(id(1)).unwrap();
        assert_eq!(builder.draft().available_ids(), vec![id(1), id(2)]);
        assert!(builder.draft().capture(id(1)).is_none());

        builder.begin_item_return(id(1)).unwrap();
        builder.commit_item_return(id(1), "wrong colour", vec![]).unwrap();
        let capture = builder.draft().capture(id(1)).unwrap();
        assert_eq!(capture.reason, "wrong colour");
        assert!(capture.evidence.is_empty());
        assert_eq!(capture.disposition_type, DispositionType::Replacement);

        let err = builder.remove_selected_item(id(2)).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn set_item_disposition_requires_selected_item() {
        let (catalog, customers) = (FakeCatalog::with_order(so(), 1), FakeDirectory::default());
        let mut builder = ReturnOrderBuilder::new(&catalog, &customers);
        builder.select_sales_order(so()).unwrap();

        let err = builder.set_item_disposition(id(1), DispositionType::Refund).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn set_overall_fields_rejects_unknown_customer() {
        let (catalog, customers) = (FakeCatalog::with_order(so(), 1), FakeDirectory::default());
        let mut builder = ReturnOrderBuilder::new(&catalog, &customers);
        builder.select_sales_order(so()).unwrap();
        let before = builder.draft().clone();

        let err = builder
            .set_overall_fields(CustomerId::new(404), jan(5), Classification::Contract, "")
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(builder.draft(), &before);
    }

    #[test]
    fn commit_freezes_selection_and_keeps_remaining_items() {
        let (catalog, customers) = (FakeCatalog::with_order(so(), 2), FakeDirectory::default());
        let repo = FakeRepository::default();
        let mut builder = ReturnOrderBuilder::new(&catalog, &customers);
        builder.select_sales_order(so()).unwrap();
        builder.begin_item_return(id(1)).unwrap();
        builder.commit_item_return(id(1), "cracked screen", vec![]).unwrap();
        builder
            .set_overall_fields(CustomerId::new(7), jan(5), Classification::WalkIn, "")
            .unwrap();

        let order = builder.commit(&repo, Utc::now()).unwrap();

        assert_eq!(order.id_typed().to_string(), "#RO001");
        assert_eq!(order.date(), jan(5));
        assert_eq!(order.sales_order_id(), Some(so()));
        assert_eq!(order.version(), 0);
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.items()[0].line_id, id(1));
        assert_eq!(order.replacement(id(1)).unwrap().status, ReplacementStatus::Pending);

        assert_eq!(builder.draft().available_ids(), vec![id(2)]);
        assert!(builder.draft().selected_ids().is_empty());
        assert!(builder.draft().partition_holds());
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn reselecting_the_same_sales_order_keeps_returned_items_consumed() {
        let (catalog, customers) = (FakeCatalog::with_order(so(), 2), FakeDirectory::default());
        let repo = FakeRepository::default();
        let mut builder = ReturnOrderBuilder::new(&catalog, &customers);
        builder.select_sales_order(so()).unwrap();
        builder.begin_item_return(id(1)).unwrap();
        builder.commit_item_return(id(1), "cracked screen", vec![]).unwrap();
        builder.commit(&repo, Utc::now()).unwrap();

        builder.select_sales_order(so()).unwrap();

        assert_eq!(builder.draft().available_ids(), vec![id(2)]);
        assert!(builder.draft().partition_holds());
        let err = builder.begin_item_return(id(1)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(msg) if msg.contains("already returned")));

        builder.discard();
        builder.select_sales_order(so()).unwrap();
        assert_eq!(builder.draft().available_ids(), vec![id(1), id(2)]);
    }

    #[test]
    fn commit_without_items_changes_nothing() {
        let (catalog, customers) = (FakeCatalog::with_order(so(), 2), FakeDirectory::default());
        let repo = FakeRepository::default();
        let mut builder = ReturnOrderBuilder::new(&catalog, &customers);
        builder.select_sales_order(so()).unwrap();
        let before = builder.draft().clone();

        let err = builder.commit(&repo, Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::validation("no items selected"));
        assert_eq!(builder.draft(), &before);
        assert_eq!(repo.len(), 0);
        assert_eq!(repo.next_id().unwrap(), ReturnOrderId::new(1));
    }

    #[test]
    fn direct_return_requires_customer() {
        let (catalog, customers) = (FakeCatalog::default(), FakeDirectory::default());
        let repo = FakeRepository::default();
        let mut builder = ReturnOrderBuilder::new(&catalog, &customers);

        let line = builder
            .add_direct_item(ItemDescriptor::new(
                "L850",
                "Epson",
                "Printers",
                "EP-1",
                storefront_core::Money::from_cents(64_777_000),
            ))
            .unwrap();
        builder.begin_item_return(line).unwrap();
        builder.commit_item_return(line, "paper jam", vec![]).unwrap();
        let before = builder.draft().clone();

        let err = builder.commit(&repo, Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::validation("customer required"));
        assert_eq!(builder.draft(), &before);

        builder
            .set_overall_fields(CustomerId::new(7), jan(9), Classification::Contract, "bulk")
            .unwrap();
        let order = builder.commit(&repo, Utc::now()).unwrap();
        assert_eq!(order.sales_order_id(), None);
        assert_eq!(order.classification(), Classification::Contract);
        assert_eq!(order.reason(), "bulk");
    }

    #[test]
    fn direct_items_are_rejected_when_a_sales_order_is_selected() {
        let (catalog, customers) = (FakeCatalog::with_order(so(), 1), FakeDirectory::default());
        let mut builder = ReturnOrderBuilder::new(&catalog, &customers);
        builder.select_sales_order(so()).unwrap();

        let err = builder
            .add_direct_item(ItemDescriptor::new("X", "Y", "Z", "SN", storefront_core::Money::ZERO))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[test]
    fn discard_clears_everything() {
        let (catalog, customers) = (FakeCatalog::with_order(so(), 2), FakeDirectory::default());
        let mut builder = ReturnOrderBuilder::new(&catalog, &customers);
        builder.select_sales_order(so()).unwrap();
        builder.begin_item_return(id(1)).unwrap();
        builder.commit_item_return(id(1), "cracked screen", vec![]).unwrap();

        builder.discard();
        assert_eq!(builder.draft(), &ReturnOrderDraft::default());
        builder.discard();
    }

    #[derive(Debug, Clone)]
    enum Op {
        Begin(u32),
        CommitItem(u32, bool),
        Cancel(u32),
        Remove(u32),
        Refund(u32),
        Reselect,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u32..6).prop_map(Op::Begin),
            ((1u32..6), any::<bool>()).prop_map(|(i, ok)| Op::CommitItem(i, ok)),
            (1u32..6).prop_map(Op::Cancel),
            (1u32..6).prop_map(Op::Remove),
            (1u32..6).prop_map(Op::Refund),
            Just(Op::Reselect),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: after any sequence of draft operations the pools stay a
        /// partition of the sales order's items, and a failed operation leaves
        /// the draft untouched.
        #[test]
        fn pools_always_partition_the_sales_order(ops in prop::collection::vec(op(), 1..40)) {
            let catalog = FakeCatalog::with_order(so(), 4);
            let customers = FakeDirectory::default();
            let mut builder = ReturnOrderBuilder::new(&catalog, &customers);
            builder.select_sales_order(so()).unwrap();

            for op in ops {
                let before = builder.draft().clone();
                let result = match op {
                    Op::Begin(i) => builder.begin_item_return(id(i)),
                    Op::CommitItem(i, ok) => {
                        let reason = if ok { "faulty" } else { " " };
                        builder.commit_item_return(id(i), reason, vec![])
                    }
                    Op::Cancel(i) => {
                        builder.cancel_item_return(id(i));
                        Ok(())
                    }
                    Op::Remove(i) => builder.remove_selected_item(id(i)),
                    Op::Refund(i) => builder.set_item_disposition(id(i), DispositionType::Refund),
                    Op::Reselect => builder.select_sales_order(so()),
                };
                if result.is_err() {
                    prop_assert_eq!(builder.draft(), &before);
                }
                prop_assert!(builder.draft().partition_holds());
                let mut ids = builder.draft().available_ids();
                ids.extend(builder.draft().selected_ids());
                ids.sort();
                prop_assert_eq!(ids, vec![id(1), id(2), id(3), id(4)]);
            }
        }
    }
}
