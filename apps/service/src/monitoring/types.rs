use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reachability of a single monitored endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointStatus {
    Online,
    Offline,
    /// Initial state before the first check cycle has completed
    Checking,
}

impl std::fmt::Display for EndpointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointStatus::Online => write!(f, "online"),
            EndpointStatus::Offline => write!(f, "offline"),
            EndpointStatus::Checking => write!(f, "checking"),
        }
    }
}

/// Aggregate availability across the whole endpoint set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Online,
    Partial,
    Offline,
}

impl OverallStatus {
    /// Classify a set of endpoints: all reachable is `Online`, none is
    /// `Offline`, anything in between is `Partial`. An empty set counts as
    /// `Offline` (nothing confirmed reachable).
    pub fn from_services(services: &[Endpoint]) -> Self {
        let online = services.iter().filter(|s| s.status == EndpointStatus::Online).count();

        if online == 0 {
            OverallStatus::Offline
        } else if online == services.len() {
            OverallStatus::Online
        } else {
            OverallStatus::Partial
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverallStatus::Online => write!(f, "online"),
            OverallStatus::Partial => write!(f, "partial"),
            OverallStatus::Offline => write!(f, "offline"),
        }
    }
}

/// One monitored remote service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub name: String,

    pub url: String,

    /// Outcome of the most recent completed check cycle
    pub status: EndpointStatus,

    /// Request-to-response-headers time; absent while unchecked or unreachable
    pub latency_ms: Option<u64>,

    pub last_checked: Option<DateTime<Utc>>,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            status: EndpointStatus::Checking,
            latency_ms: None,
            last_checked: None,
        }
    }
}

/// Result of probing one URL once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub success: bool,

    /// Milliseconds from dispatch to response headers; `None` on any failure
    pub latency_ms: Option<u64>,
}

impl ProbeOutcome {
    pub fn reachable(latency_ms: u64) -> Self {
        Self { success: true, latency_ms: Some(latency_ms) }
    }

    pub fn unreachable() -> Self {
        Self { success: false, latency_ms: None }
    }
}

/// Immutable capture of every endpoint's state at the end of one check cycle.
///
/// Holds endpoints by value so later registry mutation cannot reach into
/// retained history entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub services: Vec<Endpoint>,
    pub overall_status: OverallStatus,
}

/// Current status view handed to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusData {
    pub services: Vec<Endpoint>,
    pub overall_status: OverallStatus,
    pub previous_status: OverallStatus,
    pub last_checked: DateTime<Utc>,
}

/// Emitted when the overall status differs from the previous cycle's
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTransition {
    pub previous: OverallStatus,
    pub current: OverallStatus,
    pub snapshot: Snapshot,
}

impl StatusTransition {
    /// Names of the services that were unreachable in the triggering cycle
    pub fn offline_services(&self) -> Vec<&str> {
        self.snapshot
            .services
            .iter()
            .filter(|s| s.status == EndpointStatus::Offline)
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Human-readable one-liner suitable for a desktop notification
    pub fn headline(&self) -> String {
        match self.current {
            OverallStatus::Offline => "All AI services are currently unreachable.".to_string(),
            OverallStatus::Online if self.previous == OverallStatus::Offline => {
                "AI services are back online.".to_string()
            }
            OverallStatus::Online => "All AI services are reachable.".to_string(),
            OverallStatus::Partial => {
                format!("Some services are down: {}", self.offline_services().join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(name: &str, status: EndpointStatus) -> Endpoint {
        Endpoint { status, ..Endpoint::new(name, format!("https://{name}.test")) }
    }

    #[test]
    fn all_online_is_online() {
        let services =
            vec![endpoint("a", EndpointStatus::Online), endpoint("b", EndpointStatus::Online)];
        assert_eq!(OverallStatus::from_services(&services), OverallStatus::Online);
    }

    #[test]
    fn none_online_is_offline() {
        let services =
            vec![endpoint("a", EndpointStatus::Offline), endpoint("b", EndpointStatus::Offline)];
        assert_eq!(OverallStatus::from_services(&services), OverallStatus::Offline);
    }

    #[test]
    fn mixed_is_partial() {
        let services =
            vec![endpoint("a", EndpointStatus::Online), endpoint("b", EndpointStatus::Offline)];
        assert_eq!(OverallStatus::from_services(&services), OverallStatus::Partial);
    }

    #[test]
    fn unchecked_endpoints_count_as_unreachable() {
        let services =
            vec![endpoint("a", EndpointStatus::Online), endpoint("b", EndpointStatus::Checking)];
        assert_eq!(OverallStatus::from_services(&services), OverallStatus::Partial);
    }

    #[test]
    fn empty_set_is_offline_by_convention() {
        assert_eq!(OverallStatus::from_services(&[]), OverallStatus::Offline);
    }

    #[test]
    fn partial_headline_names_offline_services() {
        let snapshot = Snapshot {
            timestamp: Utc::now(),
            services: vec![
                endpoint("OpenAI", EndpointStatus::Online),
                endpoint("Cohere", EndpointStatus::Offline),
                endpoint("Anthropic", EndpointStatus::Offline),
            ],
            overall_status: OverallStatus::Partial,
        };
        let transition = StatusTransition {
            previous: OverallStatus::Online,
            current: OverallStatus::Partial,
            snapshot,
        };

        assert_eq!(transition.offline_services(), vec!["Cohere", "Anthropic"]);
        assert_eq!(transition.headline(), "Some services are down: Cohere, Anthropic");
    }

    #[test]
    fn recovery_headline_mentions_restoration() {
        let snapshot = Snapshot {
            timestamp: Utc::now(),
            services: vec![endpoint("OpenAI", EndpointStatus::Online)],
            overall_status: OverallStatus::Online,
        };
        let transition = StatusTransition {
            previous: OverallStatus::Offline,
            current: OverallStatus::Online,
            snapshot,
        };

        assert_eq!(transition.headline(), "AI services are back online.");
    }

    #[test]
    fn statuses_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&OverallStatus::Partial).unwrap(), "\"partial\"");
        assert_eq!(serde_json::to_string(&EndpointStatus::Checking).unwrap(), "\"checking\"");
    }
}
