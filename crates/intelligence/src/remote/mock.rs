//! Mock merge backend for deterministic testing

use super::RemoteMergeBackend;
use crate::llm_client::LlmClientError;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Mock backend that overlays each incoming object onto its existing one.
///
/// Non-null incoming fields win, so results are predictable without a
/// model. Records every instruction it receives and can be told to fail
/// the first N calls, stall, or return a short batch.
pub struct MockMergeBackend {
    calls: AtomicUsize,
    fail_first: AtomicUsize,
    delay: Option<Duration>,
    drop_last: bool,
    instructions: Mutex<Vec<String>>,
}

impl MockMergeBackend {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_first: AtomicUsize::new(0),
            delay: None,
            drop_last: false,
            instructions: Mutex::new(Vec::new()),
        }
    }

    /// Fail the next `n` calls with a network error
    pub fn failing(self, n: usize) -> Self {
        self.fail_first.store(n, Ordering::SeqCst);
        self
    }

    /// Sleep before answering
    pub fn stalling(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer with one result too few
    pub fn short(mut self) -> Self {
        self.drop_last = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn instructions(&self) -> Vec<String> {
        self.instructions.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl RemoteMergeBackend for MockMergeBackend {
    fn batch_merge_remote(
        &self,
        pairs: &[(Value, Value)],
        instruction: &str,
    ) -> Result<Vec<Value>, LlmClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.instructions.lock() {
            seen.push(instruction.to_string());
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let remaining = self.fail_first.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_first.store(remaining - 1, Ordering::SeqCst);
            return Err(LlmClientError::Network("connection refused".to_string()));
        }

        let mut merged: Vec<Value> = pairs
            .iter()
            .map(|(existing, incoming)| overlay(existing, incoming))
            .collect();
        if self.drop_last {
            merged.pop();
        }
        Ok(merged)
    }
}

fn overlay(existing: &Value, incoming: &Value) -> Value {
    match (existing, incoming) {
        (Value::Object(base), Value::Object(update)) => {
            let mut out = base.clone();
            for (field, value) in update {
                if !value.is_null() {
                    out.insert(field.clone(), value.clone());
                }
            }
            Value::Object(out)
        }
        _ => incoming.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mock_overlays_non_null_fields() {
        let backend = MockMergeBackend::new();
        let merged = backend
            .batch_merge_remote(
                &[(
                    json!({"id": 1, "name": "Alice", "age": null}),
                    json!({"id": 1, "name": null, "age": 30}),
                )],
                "merge",
            )
            .unwrap();
        assert_eq!(merged[0], json!({"id": 1, "name": "Alice", "age": 30}));
        assert_eq!(backend.instructions(), vec!["merge".to_string()]);
    }

    #[test]
    fn test_mock_fails_first_calls() {
        let backend = MockMergeBackend::new().failing(1);
        assert!(backend.batch_merge_remote(&[], "x").is_err());
        assert!(backend.batch_merge_remote(&[], "x").is_ok());
        assert_eq!(backend.calls(), 2);
    }
}
