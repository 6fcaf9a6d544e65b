//! txindexer-indexer - polls a chain node and keeps a bounded window of
//! classified transactions queryable.

pub mod classifier;
pub mod client;
pub mod indexer;
pub mod query;

pub use classifier::{ProgramTable, TransactionClassifier};
pub use client::{ChainClient, SolanaRpcClient};
pub use indexer::{BlockchainIndexer, CycleReport};
pub use query::TransactionQuery;
