//! Customer records and the directory the RMA workflow reads them from.
//!
//! Customers are owned elsewhere; this crate only defines their shape and the
//! read-only lookup boundary.

pub mod customer;
pub mod directory;

pub use customer::{Classification, ContactInfo, Customer};
pub use directory::CustomerDirectory;
