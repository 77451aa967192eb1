use std::time::{Duration, Instant};

use anyhow::Result;

use super::types::ProbeOutcome;

/// Hard cap on a single probe; a hung connection never stalls a cycle longer
/// than this.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Reachability prober for a single target URL
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    /// Probe the target once. Never fails: every failure mode (timeout,
    /// refused connection, malformed URL, server error) collapses into an
    /// unreachable outcome.
    async fn check(&self, target: &str) -> ProbeOutcome;
}

/// HTTP/HTTPS checker issuing one HEAD request per probe
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("aistatus/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Checker for HttpChecker {
    async fn check(&self, target: &str) -> ProbeOutcome {
        let start = Instant::now();

        // send() resolves once response headers arrive; the body is never
        // transferred, which keeps the probe lightweight.
        match self.client.head(target).send().await {
            Ok(response) => {
                let latency_ms = start.elapsed().as_millis() as u64;

                // Any response below the server-error range counts as
                // reachable: 401/403/404 still prove the host is answering.
                if response.status().as_u16() < 500 {
                    ProbeOutcome::reachable(latency_ms)
                } else {
                    tracing::debug!(target, status = %response.status(), "probe got server error");
                    ProbeOutcome::unreachable()
                }
            }
            Err(error) => {
                tracing::debug!(target, %error, "probe failed");
                ProbeOutcome::unreachable()
            }
        }
    }
}
