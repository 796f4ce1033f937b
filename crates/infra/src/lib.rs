//! Infrastructure layer: in-memory adapters for the RMA ports, and configuration.

pub mod config;
pub mod directory;
pub mod return_store;

pub use config::RmaConfig;
pub use directory::{InMemoryCustomerDirectory, InMemorySalesOrderCatalog};
pub use return_store::InMemoryReturnOrderRepository;
