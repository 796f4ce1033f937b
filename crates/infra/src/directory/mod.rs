//! In-memory stand-ins for the customer and sales order collaborators.
//!
//! Both are read-only from the RMA workflow's point of view; `insert` exists
//! for seeding in tests and local runs.

mod customers;
mod sales_orders;

pub use customers::InMemoryCustomerDirectory;
pub use sales_orders::InMemorySalesOrderCatalog;
