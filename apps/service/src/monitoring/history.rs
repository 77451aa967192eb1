use std::collections::VecDeque;
use std::str::FromStr;

use anyhow::Result;
use chrono::SecondsFormat;

use super::types::Snapshot;

/// Default retention bound for the in-memory status history
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Serialization format for exported history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(anyhow::anyhow!("unknown export format: {other}")),
        }
    }
}

/// Bounded, chronologically ordered log of check-cycle snapshots.
///
/// Appends evict from the front once the bound is reached, so the retained
/// entries are always the most recent ones and `len() <= max_entries` holds
/// after every append.
#[derive(Debug)]
pub struct StatusHistory {
    entries: VecDeque<Snapshot>,
    max_entries: usize,
}

impl StatusHistory {
    pub fn new(max_entries: usize) -> Self {
        Self { entries: VecDeque::with_capacity(max_entries.min(DEFAULT_MAX_ENTRIES)), max_entries }
    }

    pub fn append(&mut self, snapshot: Snapshot) {
        self.entries.push_back(snapshot);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    /// Retained snapshots, oldest first
    pub fn all(&self) -> Vec<Snapshot> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the full retained history.
    ///
    /// JSON is a structural dump of the snapshot array; CSV emits one row per
    /// (snapshot, endpoint) pair with `N/A` standing in for absent latencies.
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Json => Ok(serde_json::to_string_pretty(&self.entries)?),
            ExportFormat::Csv => {
                let mut csv = String::from("Timestamp,Service,Status,Latency\n");
                for entry in &self.entries {
                    let timestamp = entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
                    for service in &entry.services {
                        let latency = service
                            .latency_ms
                            .map(|ms| ms.to_string())
                            .unwrap_or_else(|| "N/A".to_string());
                        csv.push_str(&format!(
                            "{timestamp},{},{},{latency}\n",
                            service.name, service.status
                        ));
                    }
                }
                Ok(csv)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::{Endpoint, EndpointStatus, OverallStatus};
    use chrono::Utc;

    fn snapshot(tag: usize, services: Vec<Endpoint>) -> Snapshot {
        let overall_status = OverallStatus::from_services(&services);
        let mut snapshot = Snapshot { timestamp: Utc::now(), services, overall_status };
        // Distinguishable timestamps without sleeping
        snapshot.timestamp += chrono::Duration::seconds(tag as i64);
        snapshot
    }

    fn service(name: &str, status: EndpointStatus, latency_ms: Option<u64>) -> Endpoint {
        Endpoint {
            status,
            latency_ms,
            last_checked: Some(Utc::now()),
            ..Endpoint::new(name, format!("https://{name}.test"))
        }
    }

    #[test]
    fn append_is_bounded_and_keeps_most_recent() {
        let mut history = StatusHistory::new(3);
        for i in 0..5 {
            let name = format!("cycle-{i}");
            history.append(snapshot(i, vec![service(&name, EndpointStatus::Online, Some(10))]));
        }

        assert_eq!(history.len(), 3);
        let names: Vec<String> =
            history.all().iter().map(|s| s.services[0].name.clone()).collect();
        assert_eq!(names, ["cycle-2", "cycle-3", "cycle-4"]);
    }

    #[test]
    fn append_below_bound_retains_everything() {
        let mut history = StatusHistory::new(10);
        for i in 0..4 {
            history.append(snapshot(i, vec![service("a", EndpointStatus::Online, Some(10))]));
        }
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn csv_export_has_one_row_per_snapshot_endpoint_pair() {
        let mut history = StatusHistory::new(100);
        for i in 0..2 {
            history.append(snapshot(
                i,
                vec![
                    service("OpenAI", EndpointStatus::Online, Some(42)),
                    service("Anthropic", EndpointStatus::Offline, None),
                    service("Cohere", EndpointStatus::Online, Some(87)),
                ],
            ));
        }

        let csv = history.export(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "Timestamp,Service,Status,Latency");
        assert!(lines[2].ends_with(",Anthropic,offline,N/A"));
        assert!(lines[1].ends_with(",OpenAI,online,42"));
    }

    #[test]
    fn json_export_is_a_parseable_snapshot_array() {
        let mut history = StatusHistory::new(100);
        history.append(snapshot(0, vec![service("OpenAI", EndpointStatus::Online, Some(42))]));

        let json = history.export(ExportFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let entries = parsed.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["overallStatus"], "online");
        assert_eq!(entries[0]["services"][0]["latencyMs"], 42);
    }

    #[test]
    fn export_format_parses_case_insensitively() {
        assert_eq!(ExportFormat::from_str("JSON").unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::from_str("csv").unwrap(), ExportFormat::Csv);
        assert!(ExportFormat::from_str("xml").is_err());
    }
}
