// src/core/risk.rs

//! Folds a run's signals into one overall risk level.
//!
//! The fold is a pure function of the per-severity counts, so it does not depend on
//! the order signals were produced in. `info` signals never move the level.

use tracing::debug;

use crate::core::models::{RiskLevel, SeverityCounts, Signal};

/// At or above this many `high` signals the run is rated HIGH.
const HIGH_SIGNALS_FOR_HIGH: usize = 3;
/// At or above this many `medium` signals the run is rated MEDIUM.
const MEDIUM_SIGNALS_FOR_MEDIUM: usize = 5;

pub fn aggregate(signals: &[Signal]) -> RiskLevel {
    let counts = SeverityCounts::from_signals(signals);
    let level = risk_for_counts(&counts);
    debug!(?counts, %level, "Aggregated risk.");
    level
}

pub fn risk_for_counts(counts: &SeverityCounts) -> RiskLevel {
    if counts.critical > 0 {
        RiskLevel::Critical
    } else if counts.high >= HIGH_SIGNALS_FOR_HIGH {
        RiskLevel::High
    } else if counts.high > 0 || counts.medium >= MEDIUM_SIGNALS_FOR_MEDIUM {
        RiskLevel::Medium
    } else if counts.medium > 0 || counts.low > 0 {
        RiskLevel::Low
    } else {
        RiskLevel::Minimal
    }
}
