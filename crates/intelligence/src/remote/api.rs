//! API-based merge backend using an OpenAI-compatible endpoint
//!
//! Calls `{endpoint}/chat/completions` with the instruction and the batch
//! of pairs, parses the response into merged JSON objects.

use super::parser::parse_merge_response;
use super::RemoteMergeBackend;
use crate::llm_client::LlmClientError;
use serde_json::Value;
use std::time::Duration;

/// Remote merge backend speaking the OpenAI `chat/completions` dialect.
///
/// Any server exposing that route will do (Ollama, vLLM, hosted APIs).
#[allow(dead_code)] // fields used behind #[cfg(feature = "remote")]
pub struct ApiMergeBackend {
    url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
    temperature: f32,
    max_tokens: u32,
}

/// Merges should be as repeatable as the model allows.
const DEFAULT_MERGE_TEMPERATURE: f32 = 0.0;
/// Room for a full batch of merged objects.
const DEFAULT_MERGE_MAX_TOKENS: u32 = 4096;

impl ApiMergeBackend {
    /// Backend for the server at `endpoint`, e.g. `http://localhost:11434/v1`.
    pub fn new(endpoint: &str, model: &str, api_key: Option<&str>, timeout_ms: u64) -> Self {
        Self {
            url: format!("{}/chat/completions", endpoint.trim_end_matches('/')),
            model: model.into(),
            api_key: api_key.map(Into::into),
            timeout: Duration::from_millis(timeout_ms),
            temperature: DEFAULT_MERGE_TEMPERATURE,
            max_tokens: DEFAULT_MERGE_MAX_TOKENS,
        }
    }

    /// Sampling temperature sent with each batch (default 0.0)
    pub fn temperature(self, temperature: f32) -> Self {
        Self { temperature, ..self }
    }

    /// Response token cap sent with each batch (default 4096)
    pub fn max_tokens(self, max_tokens: u32) -> Self {
        Self { max_tokens, ..self }
    }

    /// Full chat completions URL
    pub fn url(&self) -> &str {
        &self.url
    }

    #[cfg(feature = "remote")]
    fn call_api(&self, pairs: &[(Value, Value)], instruction: &str) -> Result<String, LlmClientError> {
        let request = serde_json::json!({
            "model": &self.model,
            "messages": super::prompt::build_messages(pairs, instruction),
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });
        let key = self.api_key.as_deref();
        crate::llm_client::call_chat_completions(&self.url, key, self.timeout, &request)
    }

    #[cfg(not(feature = "remote"))]
    fn call_api(
        &self,
        _pairs: &[(Value, Value)],
        _instruction: &str,
    ) -> Result<String, LlmClientError> {
        Err(LlmClientError::FeatureDisabled("remote"))
    }
}

impl RemoteMergeBackend for ApiMergeBackend {
    fn batch_merge_remote(
        &self,
        pairs: &[(Value, Value)],
        instruction: &str,
    ) -> Result<Vec<Value>, LlmClientError> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(
            target: "concord::llm_client",
            pairs = pairs.len(),
            model = %self.model,
            "Sending merge batch"
        );
        let text = self.call_api(pairs, instruction)?;
        parse_merge_response(&text, pairs.len())
    }
}
