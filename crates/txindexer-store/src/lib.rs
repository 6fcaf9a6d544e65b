//! This is the txindexer-store crate - the bounded in-memory retention window

pub mod memory;
pub mod traits;
pub mod window;

pub use memory::RetentionStore;
pub use traits::TransactionStore;
pub use window::RetentionWindow;
