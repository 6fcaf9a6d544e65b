use {
    crate::{
        client::CompletionBackend,
        context::{AnalysisContext, PriceContext, TransactionContext},
        errors::Result,
        response::{PriceAnalysis, TransactionAnalysis},
    },
    serde::{Deserialize, Serialize},
    std::sync::Arc,
    tracing::{error, warn},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Transaction(TransactionAnalysis),
    Price(PriceAnalysis),
}

/// Turns contexts into prompts and prompts into parsed analyses. Errors from
/// the backend are returned as-is; nothing is retried.
#[derive(Clone)]
pub struct AnalysisAgent {
    backend: Arc<dyn CompletionBackend>,
}

impl AnalysisAgent {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub async fn analyze(&self, context: &AnalysisContext) -> Result<AnalysisOutcome> {
        match context {
            AnalysisContext::Transaction(tx) => {
                self.analyze_transaction(tx).await.map(AnalysisOutcome::Transaction)
            }
            AnalysisContext::Price(price) => self.analyze_prices(price).await.map(AnalysisOutcome::Price),
        }
    }

    pub async fn analyze_transaction(&self, context: &TransactionContext) -> Result<TransactionAnalysis> {
        let prompt = format!(
            "Analyze this Solana transaction:\n{}\n\n\
             Provide:\n\
             1. Risk assessment (0-100)\n\
             2. Explanation of the transaction\n\
             3. Recommendation for the user\n",
            serde_json::to_string_pretty(context)?
        );

        let text = self.backend.complete(&prompt).await.map_err(|e| {
            error!("Error analyzing transaction: {}", e);
            e
        })?;

        let analysis = TransactionAnalysis::from_response(&text);
        if analysis == TransactionAnalysis::default() {
            warn!("Transaction analysis response did not follow the numbered format");
        }
        Ok(analysis)
    }

    pub async fn analyze_prices(&self, context: &PriceContext) -> Result<PriceAnalysis> {
        let prompt = format!(
            "Analyze these DEX prices:\n{}\n\n\
             Provide:\n\
             1. Best available price\n\
             2. Confidence in the price (0-100)\n\
             3. Recommendation for timing\n",
            serde_json::to_string_pretty(context)?
        );

        let text = self.backend.complete(&prompt).await.map_err(|e| {
            error!("Error analyzing prices: {}", e);
            e
        })?;

        let analysis = PriceAnalysis::from_response(&text);
        if analysis == PriceAnalysis::default() {
            warn!("Price analysis response did not follow the numbered format");
        }
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{client::MockCompletionBackend, errors::AnalysisError};

    #[tokio::test]
    async fn test_transaction_prompt_and_parse() {
        let mut backend = MockCompletionBackend::new();
        backend
            .expect_complete()
            .withf(|prompt| prompt.contains("\"signers\"") && prompt.contains("1. Risk assessment (0-100)"))
            .times(1)
            .returning(|_| Ok("1. Risk: 12\n2. Explanation: Transfer\n3. Recommendation: Sign".to_string()));

        let agent = AnalysisAgent::new(Arc::new(backend));
        let context = TransactionContext::new(Vec::new(), vec!["Payer".to_string()]);

        let analysis = agent.analyze_transaction(&context).await.unwrap();
        assert_eq!(analysis.risk, 12);
        assert_eq!(analysis.explanation, "Transfer");
        assert_eq!(analysis.recommendation, "Sign");
    }

    #[tokio::test]
    async fn test_price_analysis_through_enum() {
        let mut backend = MockCompletionBackend::new();
        backend
            .expect_complete()
            .withf(|prompt| prompt.contains("\"USDC\"") && prompt.contains("DEX prices"))
            .returning(|_| Ok("1. Best price: 99.5\n2. Confidence: 70\n3. Recommendation: Wait".to_string()));

        let agent = AnalysisAgent::new(Arc::new(backend));
        let context: AnalysisContext = PriceContext::new("SOL", "USDC", 2.0).with_quote("orca", 99.5).into();

        match agent.analyze(&context).await.unwrap() {
            AnalysisOutcome::Price(price) => {
                assert_eq!(price.best_price, 99.5);
                assert_eq!(price.confidence, 70);
                assert_eq!(price.recommendation, "Wait");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unstructured_reply_yields_defaults() {
        let mut backend = MockCompletionBackend::new();
        backend
            .expect_complete()
            .returning(|_| Ok("Looks fine to me!".to_string()));

        let agent = AnalysisAgent::new(Arc::new(backend));
        let analysis = agent
            .analyze_transaction(&TransactionContext::new(Vec::new(), Vec::new()))
            .await
            .unwrap();
        assert_eq!(analysis, TransactionAnalysis::default());
    }

    #[tokio::test]
    async fn test_backend_failure_surfaces_once() {
        let mut backend = MockCompletionBackend::new();
        backend.expect_complete().times(1).returning(|_| {
            Err(AnalysisError::Status {
                status: 503,
                body: "model not loaded".to_string(),
            })
        });

        let agent = AnalysisAgent::new(Arc::new(backend));
        let err = agent
            .analyze_prices(&PriceContext::new("SOL", "USDC", 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Status { status: 503, .. }));
    }
}
