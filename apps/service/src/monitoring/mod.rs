/// Health-check engine module
///
/// This module is responsible for:
/// - Probing every registered endpoint concurrently once per cycle
/// - Deriving the overall availability status from per-endpoint results
/// - Retaining a bounded history of cycle snapshots and exporting it
/// - Emitting an event whenever the overall status changes
/// - Driving cycles on a configurable fixed interval
pub mod checker;
pub mod engine;
pub mod history;
pub mod notifier;
pub mod scheduler;
pub mod types;


pub use engine::PingEngine;
pub use history::ExportFormat;
pub use scheduler::CheckScheduler;
pub use types::{OverallStatus, StatusData, StatusTransition};
