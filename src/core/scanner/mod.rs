// src/core/scanner/mod.rs

//! The run orchestrator.
//!
//! A run walks `Idle → ProbingRoot → ProbingCatalog → Extracting → Aggregating →
//! Reporting → Done`. Only configuration errors end in `Failed`; an unreachable endpoint
//! (the root included) is recorded in the report and the run carries on.

pub mod probe;
#[cfg(test)]
pub(crate) mod testing;

use std::pin::pin;

use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderValue, ACCEPT};
use strum::Display;
use tokio::time::Instant;
use tracing::{error, info, warn};

use self::probe::ProbeClient;
use crate::core::config::ScanConfig;
use crate::core::error::ScanError;
use crate::core::extractors::{self, Extractor};
use crate::core::models::{ProbeMethod, ProbeOutcome, ProbeRequest, Report, Target};
use crate::core::{report, risk};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RunPhase {
    Idle,
    ProbingRoot,
    ProbingCatalog,
    Extracting,
    Aggregating,
    Reporting,
    Done,
    Failed,
}

/// Drives one reconnaissance run. A scanner is single-use: `run` leaves it in `Done`
/// or `Failed`.
pub struct Scanner {
    config: ScanConfig,
    registry: Vec<Box<dyn Extractor>>,
    phase: RunPhase,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self::with_registry(config, extractors::default_registry())
    }

    pub fn with_registry(config: ScanConfig, registry: Vec<Box<dyn Extractor>>) -> Self {
        Self { config, registry, phase: RunPhase::Idle }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    fn transition(&mut self, next: RunPhase) {
        info!(from = %self.phase, to = %next, "Run phase changed.");
        self.phase = next;
    }

    /// Scans `input` and returns the report. Errors only for an invalid target or
    /// configuration; no report exists in that case.
    pub async fn run(&mut self, input: &str) -> Result<Report, ScanError> {
        match self.execute(input).await {
            Ok(report) => {
                self.transition(RunPhase::Done);
                Ok(report)
            }
            Err(e) => {
                error!(error = %e, phase = %self.phase, "Run failed.");
                self.transition(RunPhase::Failed);
                Err(e)
            }
        }
    }

    async fn execute(&mut self, input: &str) -> Result<Report, ScanError> {
        self.config.validate()?;
        let target = Target::parse(input)?;
        let client = ProbeClient::new(&self.config)?;
        let deadline = self.config.deadline.map(|d| Instant::now() + d);
        let (root, rest) = self.plan();

        info!(
            target = %target.origin(),
            probes = rest.len() + 1,
            concurrency = self.config.concurrency,
            "Starting run."
        );

        self.transition(RunPhase::ProbingRoot);
        let root_outcome = match deadline {
            Some(deadline) => {
                tokio::time::timeout_at(deadline, client.probe_outcome(&target, root.clone()))
                    .await
                    .unwrap_or(ProbeOutcome::Cancelled { request: root })
            }
            None => client.probe_outcome(&target, root).await,
        };

        let mut incomplete = false;
        let mut outcomes = vec![root_outcome];
        match &outcomes[0] {
            ProbeOutcome::Completed(result) => {
                info!(status = result.status, "Target origin answered.");
            }
            ProbeOutcome::Unreachable { error, .. } => {
                warn!(error = %error, "Target origin unreachable, probing catalog anyway.");
            }
            ProbeOutcome::Cancelled { .. } => incomplete = true,
        }

        self.transition(RunPhase::ProbingCatalog);
        if incomplete {
            outcomes.extend(rest.into_iter().map(|request| ProbeOutcome::Cancelled { request }));
        } else {
            let (catalog_outcomes, cut_short) =
                probe_all(&client, &target, rest, self.config.concurrency, deadline).await;
            outcomes.extend(catalog_outcomes);
            incomplete = cut_short;
        }
        if incomplete {
            warn!("Run deadline reached, unfinished probes were cancelled.");
        }

        self.transition(RunPhase::Extracting);
        let extraction = extractors::run_extractors(&self.registry, &target, &outcomes);

        self.transition(RunPhase::Aggregating);
        let risk_level = risk::aggregate(&extraction.signals);

        self.transition(RunPhase::Reporting);
        let report = report::build(
            &target,
            outcomes,
            extraction.signals,
            risk_level,
            incomplete,
            extraction.errors,
        );
        info!(
            risk = %report.metadata.risk_level,
            signals = report.summary.total_signals,
            completed = report.summary.probes_completed,
            unreachable = report.summary.probes_unreachable,
            cancelled = report.summary.probes_cancelled,
            "Run finished."
        );
        Ok(report)
    }

    /// The root GET, then every catalog path, then the method checks against `/`.
    fn plan(&self) -> (ProbeRequest, Vec<ProbeRequest>) {
        let timeout = self.config.timeout;
        let request = |method: ProbeMethod, path: &str| {
            ProbeRequest::new(method, path, timeout)
                .with_header(ACCEPT, HeaderValue::from_static("*/*"))
        };

        let mut rest: Vec<ProbeRequest> = self
            .config
            .paths
            .iter()
            .map(|path| request(ProbeMethod::Get, path.as_str()))
            .collect();
        if self.config.method_checks {
            rest.extend(
                ProbeMethod::PERMISSIVENESS_CHECKS
                    .iter()
                    .map(|method| request(*method, "/")),
            );
        }
        (request(ProbeMethod::Get, "/"), rest)
    }
}

/// Runs `requests` with at most `concurrency` in flight and returns their outcomes in
/// request order. When `deadline` passes, in-flight probes are dropped and every
/// unfinished request is reported as cancelled; the flag is then `true`.
async fn probe_all(
    client: &ProbeClient,
    target: &Target,
    requests: Vec<ProbeRequest>,
    concurrency: usize,
    deadline: Option<Instant>,
) -> (Vec<ProbeOutcome>, bool) {
    let mut slots: Vec<Option<ProbeOutcome>> = vec![None; requests.len()];

    let cut_short = {
        let mut pending = pin!(
            stream::iter(requests.clone().into_iter().enumerate())
                .map(|(index, request)| async move {
                    (index, client.probe_outcome(target, request).await)
                })
                .buffer_unordered(concurrency)
        );
        let collect = async {
            while let Some((index, outcome)) = pending.next().await {
                slots[index] = Some(outcome);
            }
        };
        match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, collect).await.is_err(),
            None => {
                collect.await;
                false
            }
        }
    };

    let outcomes = requests
        .into_iter()
        .zip(slots)
        .map(|(request, slot)| slot.unwrap_or(ProbeOutcome::Cancelled { request }))
        .collect();
    (outcomes, cut_short)
}
