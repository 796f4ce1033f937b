//! Return Merchandise Authorization workflow.
//!
//! - [`builder`]: drafting a return order from a sales order (or directly for a customer)
//! - [`tracker`]: per-item replacement/refund lifecycle after commit
//! - [`repository`]: storage port for committed orders and their audit trail
//! - [`query`]: search and summaries over committed orders

pub mod builder;
pub mod disposition;
pub mod event;
pub mod order;
pub mod query;
pub mod repository;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use builder::{DraftPolicy, ItemCapture, ReturnOrderBuilder, ReturnOrderDraft};
pub use disposition::{
    Disposition, DispositionType, RefundDisposition, RefundMethod, ReplacementDisposition, ReplacementStatus,
};
pub use event::{
    AGGREGATE_TYPE, DispositionReassigned, RefundRecorded, ReplacementCompleted, ReplacementProcessing,
    ReturnOrderCommitted, ReturnOrderEvent,
};
pub use order::{EvidenceRef, ReturnLineItem, ReturnOrder, ReturnOrderStatus};
pub use query::{ClassificationFilter, ReturnOrderQueryService, StatusSummary};
pub use repository::{BuildWithId, ReturnOrderFilter, ReturnOrderRepository};
pub use tracker::DispositionTracker;
