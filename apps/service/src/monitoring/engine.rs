use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use chrono::Utc;
use futures::future::join_all;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::checker::{Checker, HttpChecker, PROBE_TIMEOUT};
use super::history::{DEFAULT_MAX_ENTRIES, ExportFormat, StatusHistory};
use super::notifier::ChangeNotifier;
use super::types::{
    Endpoint, EndpointStatus, OverallStatus, Snapshot, StatusData, StatusTransition,
};

/// Built-in monitored services: well-known AI-provider API hosts
const BUILTIN_ENDPOINTS: &[(&str, &str)] = &[
    ("OpenAI", "https://api.openai.com/v1/models"),
    ("Anthropic", "https://api.anthropic.com/v1/messages"),
    ("Google Gemini", "https://generativelanguage.googleapis.com/v1beta/models"),
    ("Cohere", "https://api.cohere.ai/v1/generate"),
    ("Hugging Face", "https://huggingface.co/api/models"),
];

struct EngineState {
    services: Vec<Endpoint>,
    history: StatusHistory,
    notifier: ChangeNotifier,
}

/// Owner of the endpoint registry and coordinator of check cycles.
///
/// The engine is the single writer of endpoint state. A cycle fans out one
/// probe per registered endpoint, waits for every probe to resolve, then
/// commits all results, the derived overall status, the history entry and the
/// change evaluation in one critical section. Readers outside a cycle always
/// see the last fully completed cycle.
pub struct PingEngine {
    checker: Arc<dyn Checker>,
    /// Serializes cycles: a scheduled tick and a manual trigger never
    /// interleave their registry updates or history appends
    cycle_gate: tokio::sync::Mutex<()>,
    state: Mutex<EngineState>,
}

impl PingEngine {
    /// Engine with the default HTTP prober and built-in endpoint set
    pub fn new() -> Result<Self> {
        let checker = Arc::new(HttpChecker::new(PROBE_TIMEOUT)?);
        Ok(Self::with_checker(checker, Self::builtin_endpoints()))
    }

    pub fn with_checker(checker: Arc<dyn Checker>, services: Vec<Endpoint>) -> Self {
        Self {
            checker,
            cycle_gate: tokio::sync::Mutex::new(()),
            state: Mutex::new(EngineState {
                services,
                history: StatusHistory::new(DEFAULT_MAX_ENTRIES),
                notifier: ChangeNotifier::new(),
            }),
        }
    }

    pub fn builtin_endpoints() -> Vec<Endpoint> {
        BUILTIN_ENDPOINTS.iter().map(|(name, url)| Endpoint::new(*name, *url)).collect()
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().expect("engine state lock poisoned")
    }

    /// Append endpoints to the registry. The registry only ever grows, and
    /// entries are kept verbatim, duplicates included.
    pub fn add_endpoints<'a>(&self, endpoints: impl IntoIterator<Item = (&'a str, &'a str)>) {
        let mut state = self.state();
        for (name, url) in endpoints {
            info!(name, url, "registering endpoint");
            state.services.push(Endpoint::new(name, url));
        }
    }

    /// Run one full check cycle and return its snapshot.
    ///
    /// Probes every registered endpoint concurrently and waits for all of
    /// them; wall clock is bounded by the slowest probe, capped at the probe
    /// timeout. Shared with the scheduler path, so manual triggers get the
    /// same history and notification side effects.
    pub async fn check_now(&self) -> Snapshot {
        let _cycle = self.cycle_gate.lock().await;

        let targets: Vec<String> =
            self.state().services.iter().map(|s| s.url.clone()).collect();

        debug!(count = targets.len(), "starting check cycle");
        let outcomes = join_all(targets.iter().map(|url| self.checker.check(url))).await;

        let now = Utc::now();
        let mut state = self.state();

        // The registry is append-only, so the first `outcomes.len()` services
        // are exactly the ones probed above even if an endpoint was
        // registered mid-cycle; a fresh endpoint stays `Checking` until the
        // next cycle picks it up.
        for (service, outcome) in state.services.iter_mut().zip(&outcomes) {
            service.status =
                if outcome.success { EndpointStatus::Online } else { EndpointStatus::Offline };
            service.latency_ms = outcome.latency_ms;
            service.last_checked = Some(now);
        }

        let overall_status = OverallStatus::from_services(&state.services);
        let snapshot =
            Snapshot { timestamp: now, services: state.services.clone(), overall_status };

        state.history.append(snapshot.clone());
        state.notifier.observe(&snapshot);

        debug!(%overall_status, "check cycle complete");
        snapshot
    }

    /// Current status view: endpoint states from the last completed cycle
    /// plus the derived overall and previous overall status
    pub fn status(&self) -> StatusData {
        let state = self.state();
        StatusData {
            overall_status: OverallStatus::from_services(&state.services),
            previous_status: state.notifier.previous(),
            services: state.services.clone(),
            last_checked: Utc::now(),
        }
    }

    /// Retained history, oldest snapshot first
    pub fn history(&self) -> Vec<Snapshot> {
        self.state().history.all()
    }

    pub fn export_logs(&self, format: ExportFormat) -> Result<String> {
        self.state().history.export(format)
    }

    /// Subscribe to overall-status transitions. Events are delivered after
    /// the triggering cycle has fully committed.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusTransition> {
        self.state().notifier.subscribe()
    }
}
