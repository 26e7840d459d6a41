// src/core/error.rs

//! Error types for the reconnaissance engine.
//!
//! Only `ScanError` is fatal. Probe and extraction failures are values that end up
//! in the report instead of aborting the run.

use serde::Serialize;
use thiserror::Error;

/// Fatal errors that stop a run before a report can be produced.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The target or the engine configuration is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The shared HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl ScanError {
    pub fn config(message: impl Into<String>) -> Self {
        ScanError::Configuration(message.into())
    }
}

/// Transport-level failure of a single probe. HTTP error statuses are never errors.
#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
#[serde(tag = "errorKind", content = "message", rename_all = "camelCase")]
pub enum ProbeError {
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// DNS failure, connection refused, TLS failure, broken body stream.
    #[error("network error: {0}")]
    Network(String),
}

impl ProbeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProbeError::Timeout(_))
    }
}

/// An extractor panicked while inspecting one probe result.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("extractor '{extractor}' failed on probe #{probe_index}: {message}")]
pub struct ExtractionError {
    pub extractor: &'static str,
    pub probe_index: usize,
    pub message: String,
}
