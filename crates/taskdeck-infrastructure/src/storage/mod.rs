//! Token storage implementations.

mod memory_token_store;
mod token_storage;

pub use memory_token_store::MemoryTokenStore;
pub use token_storage::FileTokenStore;
