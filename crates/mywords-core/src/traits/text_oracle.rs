// # Text Oracle Trait
//
// Defines the interface to the large-language-model backend.
//
// The oracle is a black box from a prompt to text. Structure is imposed on
// its output by `LookupService` and `StoryService`, never by the oracle.
//
// ## Implementations
//
// - DeepSeek chat completions: `mywords-oracle-deepseek` crate

use async_trait::async_trait;

use crate::config::OracleConfig;

/// A single synchronous generation request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instruction
    pub system: String,
    /// User message
    pub user: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

/// Trait for text oracle implementations
///
/// # Trust Level: Untrusted
///
/// One request per call. No retries, no caching, no parsing of the content.
#[async_trait]
pub trait TextOracle: Send + Sync {
    /// Generate text for a prompt
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The generated text, trimmed, never empty
    /// - `Err(Error::Backend)`: Transport failure, non-success status or empty output
    async fn complete(&self, request: &CompletionRequest) -> Result<String, crate::Error>;

    /// Get the oracle name (for logging/debugging)
    fn oracle_name(&self) -> &'static str;
}

/// Helper trait for constructing text oracles from configuration
pub trait TextOracleFactory: Send + Sync {
    /// Create a TextOracle instance from configuration
    fn create(
        &self,
        config: &OracleConfig,
    ) -> Result<std::sync::Arc<dyn TextOracle>, crate::Error>;
}
