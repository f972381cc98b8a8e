//! Shared LLM client infrastructure for the remote merge policies
//!
//! Provides the error type, the HTTP call helper, a worker-thread timeout
//! wrapper and the retry logic used by `ApiMergeBackend` and `LlmMerger`.

use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

// ============================================================================
// Errors
// ============================================================================

/// Why a remote merge call produced no usable results
#[derive(Debug)]
pub enum LlmClientError {
    /// Transport failure or non-2xx status
    Network(String),
    /// The reply did not contain the expected merged objects
    Parse(String),
    /// No reply within the merge timeout
    Timeout,
    /// The worker thread running the call could not start or died
    Worker(String),
    /// Built without the named cargo feature
    FeatureDisabled(&'static str),
}

impl fmt::Display for LlmClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "remote merge request failed: {}", msg),
            Self::Parse(msg) => write!(f, "unusable merge response: {}", msg),
            Self::Timeout => f.write_str("remote merge timed out"),
            Self::Worker(msg) => write!(f, "merge worker failed: {}", msg),
            Self::FeatureDisabled(feat) => write!(f, "built without the '{}' feature", feat),
        }
    }
}

impl std::error::Error for LlmClientError {}

// ============================================================================
// HTTP
// ============================================================================

/// POST a chat completions request and return `choices[0].message.content`.
///
/// The agent is built per call with a global timeout covering connect,
/// send and read. A non-2xx status is a `Network` error.
#[cfg(feature = "remote")]
pub fn call_chat_completions(
    url: &str,
    api_key: Option<&str>,
    timeout: Duration,
    body: &serde_json::Value,
) -> Result<String, LlmClientError> {
    let payload = serde_json::to_vec(body)
        .map_err(|e| LlmClientError::Parse(format!("request body: {}", e)))?;

    let agent = ureq::Agent::new_with_config(
        ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build(),
    );
    let mut request = agent.post(url).header("Content-Type", "application/json");
    if let Some(key) = api_key {
        request = request.header("Authorization", &format!("Bearer {}", key));
    }

    let mut response = request.send(&payload[..]).map_err(|e| match e {
        ureq::Error::Timeout(_) => LlmClientError::Timeout,
        ureq::Error::StatusCode(code) => LlmClientError::Network(format!("HTTP {}", code)),
        other => LlmClientError::Network(other.to_string()),
    })?;
    let text = response
        .body_mut()
        .read_to_string()
        .map_err(|e| LlmClientError::Network(format!("response body: {}", e)))?;

    extract_content(&text)
}

/// Pull the assistant message out of a chat completions response body.
pub fn extract_content(text: &str) -> Result<String, LlmClientError> {
    let json: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| LlmClientError::Parse(format!("response is not JSON: {}", e)))?;
    json.pointer("/choices/0/message/content")
        .and_then(|content| content.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            let snippet: String = text.chars().take(200).collect();
            LlmClientError::Parse(format!("no message content in response: {}", snippet))
        })
}

// ============================================================================
// Timeout Wrapper
// ============================================================================

/// Run `call` on a worker thread and wait at most `timeout` for its result.
///
/// On timeout the worker is detached: its eventual result is discarded and
/// the caller gets `LlmClientError::Timeout` immediately.
pub fn call_with_timeout<T, F>(timeout: Duration, call: F) -> Result<T, LlmClientError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, LlmClientError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("concord-remote-merge".to_string())
        .spawn(move || {
            // Receiver may be gone after a timeout
            let _ = tx.send(call());
        })
        .map_err(|e| LlmClientError::Worker(format!("failed to spawn: {}", e)))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(LlmClientError::Timeout),
        Err(RecvTimeoutError::Disconnected) => Err(LlmClientError::Worker(
            "worker exited without a response".to_string(),
        )),
    }
}

// ============================================================================
// Retry Helper
// ============================================================================

/// Execute an LLM call with a single retry on failure or unusable output.
///
/// 1. Calls `call_fn()` to get the raw response
/// 2. Calls `parse_fn()` to validate and convert it
/// 3. If either step fails, retries both once
///
/// `operation` is a label for tracing messages (e.g. "merge").
pub fn retry_once<R, T>(
    call_fn: impl Fn() -> Result<R, LlmClientError>,
    parse_fn: impl Fn(R) -> Result<T, LlmClientError>,
    operation: &str,
) -> Result<T, LlmClientError> {
    // First attempt
    match call_fn().and_then(&parse_fn) {
        Ok(result) => return Ok(result),
        Err(e) => {
            tracing::warn!(
                target: "concord::llm_client",
                op = operation,
                error = %e,
                "First call failed, retrying"
            );
        }
    }

    // Retry once
    call_fn().and_then(&parse_fn).map_err(|e| {
        tracing::warn!(
            target: "concord::llm_client",
            op = operation,
            error = %e,
            "Retry also failed, falling back"
        );
        e
    })
}
