// src/core/scanner/probe.rs

use std::error::Error as StdError;
use std::time::{Duration, Instant};

use reqwest::redirect::Policy;
use tracing::{debug, warn};

use crate::core::config::ScanConfig;
use crate::core::error::{ProbeError, ScanError};
use crate::core::models::{ProbeOutcome, ProbeRequest, ProbeResult, Target};

/// Issues single, timeout-guarded HTTP requests against a target.
///
/// Holds one `reqwest::Client` for the whole run so connections are pooled. Redirects
/// are not followed: every probe reports the status the origin actually returned.
#[derive(Debug, Clone)]
pub struct ProbeClient {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl ProbeClient {
    pub fn new(config: &ScanConfig) -> Result<Self, ScanError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(Policy::none())
            .timeout(config.timeout);

        builder = match &config.proxy {
            Some(proxy) => builder.proxy(reqwest::Proxy::all(proxy.as_str())?),
            None => builder.no_proxy(),
        };

        Ok(Self {
            client: builder.build()?,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Sends one request. Every HTTP status is a result; only transport failures
    /// (DNS, refused connection, TLS, timeout) are errors.
    pub async fn probe(
        &self,
        target: &Target,
        request: &ProbeRequest,
    ) -> Result<ProbeResult, ProbeError> {
        let url = target
            .url_for(&request.path)
            .map_err(|e| ProbeError::Network(e.to_string()))?;

        debug!(method = %request.method, url = %url, "Dispatching probe.");
        let started = Instant::now();

        let exchange = async {
            let mut response = self
                .client
                .request(request.method.to_reqwest(), url.clone())
                .headers(request.headers.clone())
                .send()
                .await?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();

            let mut body = Vec::new();
            let mut truncated = false;
            while let Some(chunk) = response.chunk().await? {
                let remaining = self.max_body_bytes.saturating_sub(body.len());
                if chunk.len() > remaining {
                    body.extend_from_slice(&chunk[..remaining]);
                    truncated = true;
                    break;
                }
                body.extend_from_slice(&chunk);
            }
            Ok::<_, reqwest::Error>((status, headers, body, truncated))
        };

        // The client timeout covers reqwest's own phases; this one also bounds the
        // body read and honours per-request overrides.
        let outcome = tokio::time::timeout(request.timeout, exchange).await;
        let elapsed = started.elapsed();

        match outcome {
            Ok(Ok((status, headers, body, truncated))) => {
                debug!(
                    method = %request.method,
                    path = %request.path,
                    status,
                    bytes = body.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Probe completed."
                );
                Ok(ProbeResult {
                    request: request.clone(),
                    status,
                    headers,
                    body,
                    truncated,
                    elapsed,
                })
            }
            Ok(Err(e)) if e.is_timeout() => Err(timeout_error(request.timeout)),
            Ok(Err(e)) => {
                warn!(method = %request.method, path = %request.path, error = %e, "Probe failed.");
                Err(ProbeError::Network(error_chain(&e)))
            }
            Err(_) => Err(timeout_error(request.timeout)),
        }
    }

    /// Like `probe`, but folds transport errors into an `Unreachable` outcome.
    pub async fn probe_outcome(&self, target: &Target, request: ProbeRequest) -> ProbeOutcome {
        match self.probe(target, &request).await {
            Ok(result) => ProbeOutcome::Completed(result),
            Err(error) => {
                debug!(path = %request.path, error = %error, "Endpoint unreachable.");
                ProbeOutcome::Unreachable { request, error }
            }
        }
    }
}

fn timeout_error(timeout: Duration) -> ProbeError {
    ProbeError::Timeout(timeout.as_millis() as u64)
}

/// reqwest's top-level message is often just "error sending request"; the useful
/// part (connection refused, dns error) sits in the source chain.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = StdError::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = StdError::source(cause);
    }
    message
}
