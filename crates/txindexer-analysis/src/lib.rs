//! txindexer-analysis - natural-language analysis of transactions and prices
//!
//! The backend is any OpenAI-compatible chat completion endpoint. Its answers
//! are free text; [`response`] pulls the numbered fields out on a best-effort
//! basis.

pub mod agent;
pub mod client;
pub mod context;
pub mod errors;
pub mod response;

pub use agent::{AnalysisAgent, AnalysisOutcome};
pub use client::{CompletionBackend, LmStudioClient};
pub use context::{
    AccountMetaContext, AnalysisContext, InstructionContext, PriceContext, PriceQuote,
    TransactionContext,
};
pub use errors::{AnalysisError, Result};
pub use response::{NumberedResponse, PriceAnalysis, TransactionAnalysis};
