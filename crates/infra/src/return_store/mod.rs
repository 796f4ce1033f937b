//! Return order storage adapters.

mod in_memory;

pub use in_memory::InMemoryReturnOrderRepository;
