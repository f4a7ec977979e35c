use std::collections::BTreeMap;

use crate::errors::{ErrorCode, OcsError};

/// Value a bridge operation resolves with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeValue {
    Text(String),
    Bool(bool),
    Map(BTreeMap<String, String>),
}

/// Host-side promise. Implemented by the FFI layer and by tests.
pub trait PromiseSink: Send + Sync {
    fn resolve(&self, value: BridgeValue);
    fn reject(&self, code: ErrorCode, message: String);
}

/// Single-shot completion handle for one bridge call.
///
/// Settling consumes the handle. A handle dropped unsettled rejects with the
/// generic code, so every operation completes exactly once.
pub struct Completion {
    sink: Option<Box<dyn PromiseSink>>,
    operation: &'static str,
}

impl Completion {
    pub fn new(operation: &'static str, sink: Box<dyn PromiseSink>) -> Self {
        Self {
            sink: Some(sink),
            operation,
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn resolve(mut self, value: BridgeValue) {
        if let Some(sink) = self.sink.take() {
            tracing::debug!("{} resolved", self.operation);
            sink.resolve(value);
        }
    }

    pub fn reject(mut self, error: &OcsError) {
        if let Some(sink) = self.sink.take() {
            tracing::warn!("{} rejected with {}: {error}", self.operation, error.code());
            sink.reject(error.code(), error.to_string());
        }
    }

    /// Settle from an operation result.
    pub fn settle<T: Into<BridgeValue>>(self, result: Result<T, OcsError>) {
        match result {
            Ok(value) => self.resolve(value.into()),
            Err(e) => self.reject(&e),
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            tracing::error!("{} dropped without completing", self.operation);
            sink.reject(
                ErrorCode::Generic,
                format!("{} dropped without completing", self.operation),
            );
        }
    }
}

impl From<String> for BridgeValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for BridgeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<BTreeMap<String, String>> for BridgeValue {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self::Map(map)
    }
}
