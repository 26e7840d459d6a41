// src/core/mod.rs

// The engine. Everything below is independent of the CLI and can be driven from tests.

/// The static candidate path list and override loading.
pub mod catalog;

pub mod config;

/// Fatal and per-probe error types.
pub mod error;

/// Stateless checks that turn probe results into signals.
pub mod extractors;

/// Static descriptions and remediation advice for every signal code.
pub mod knowledge_base;

/// Data structures shared by every stage of a run, from `Target` to `Report`.
pub mod models;

pub mod report;

pub mod risk;

/// The probe client and the run orchestrator.
pub mod scanner;
