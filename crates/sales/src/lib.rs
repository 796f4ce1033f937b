//! Sales orders as seen by the RMA workflow.
//!
//! Sales orders are created elsewhere; this crate defines their read-only shape
//! and the catalog boundary used to look them up.

pub mod catalog;
pub mod order;

pub use catalog::{DateRange, SalesOrderCatalog};
pub use order::{ItemDescriptor, SalesOrder, SalesOrderLineItem};
