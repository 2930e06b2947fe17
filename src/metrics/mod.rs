use crate::logging::{LogEvent, LogFields, LogLevel};
use crate::layout::LayoutNotice;
use serde_json::json;
use std::time::Duration;

/// Counters describing container activity since creation.
#[derive(Debug, Default, Clone)]
pub struct GridMetrics {
    items_added: u64,
    items_removed: u64,
    drags: u64,
    resizes: u64,
    cascade_passes: u64,
    cascade_moves: u64,
    displacements: u64,
    config_changes: u64,
}

impl GridMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_added(&mut self) {
        self.items_added = self.items_added.saturating_add(1);
    }

    pub fn record_removed(&mut self) {
        self.items_removed = self.items_removed.saturating_add(1);
    }

    pub fn record_drag(&mut self) {
        self.drags = self.drags.saturating_add(1);
    }

    pub fn record_resize(&mut self) {
        self.resizes = self.resizes.saturating_add(1);
    }

    pub fn record_cascade(&mut self) {
        self.cascade_passes = self.cascade_passes.saturating_add(1);
    }

    pub fn record_config_change(&mut self) {
        self.config_changes = self.config_changes.saturating_add(1);
    }

    pub fn record_notices(&mut self, notices: &[LayoutNotice]) {
        for notice in notices {
            match notice {
                LayoutNotice::Cascaded(_) => {
                    self.cascade_moves = self.cascade_moves.saturating_add(1)
                }
                LayoutNotice::Displaced(_) => {
                    self.displacements = self.displacements.saturating_add(1)
                }
            }
        }
    }

    pub fn snapshot(&self, uptime: Duration, widgets: usize) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            widgets: widgets as u64,
            items_added: self.items_added,
            items_removed: self.items_removed,
            drags: self.drags,
            resizes: self.resizes,
            cascade_passes: self.cascade_passes,
            cascade_moves: self.cascade_moves,
            displacements: self.displacements,
            config_changes: self.config_changes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub widgets: u64,
    pub items_added: u64,
    pub items_removed: u64,
    pub drags: u64,
    pub resizes: u64,
    pub cascade_passes: u64,
    pub cascade_moves: u64,
    pub displacements: u64,
    pub config_changes: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "grid_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("widgets".to_string(), json!(self.widgets));
        map.insert("items_added".to_string(), json!(self.items_added));
        map.insert("items_removed".to_string(), json!(self.items_removed));
        map.insert("drags".to_string(), json!(self.drags));
        map.insert("resizes".to_string(), json!(self.resizes));
        map.insert("cascade_passes".to_string(), json!(self.cascade_passes));
        map.insert("cascade_moves".to_string(), json!(self.cascade_moves));
        map.insert("displacements".to_string(), json!(self.displacements));
        map.insert("config_changes".to_string(), json!(self.config_changes));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::METRICS_TARGET;

    #[test]
    fn notices_are_split_by_kind() {
        let mut metrics = GridMetrics::new();
        metrics.record_added();
        metrics.record_cascade();
        metrics.record_notices(&[
            LayoutNotice::Cascaded("a".to_string()),
            LayoutNotice::Displaced("b".to_string()),
            LayoutNotice::Cascaded("b".to_string()),
        ]);
        let snapshot = metrics.snapshot(Duration::from_millis(5), 2);
        assert_eq!(snapshot.cascade_passes, 1);
        assert_eq!(snapshot.cascade_moves, 2);
        assert_eq!(snapshot.displacements, 1);
        assert_eq!(snapshot.items_added, 1);
        assert_eq!(snapshot.widgets, 2);
    }

    #[test]
    fn snapshot_becomes_a_log_event() {
        let snapshot = GridMetrics::new().snapshot(Duration::from_millis(12), 0);
        let event = snapshot.to_log_event(METRICS_TARGET);
        assert_eq!(event.message, "grid_metrics");
        assert_eq!(event.target, METRICS_TARGET);
        assert_eq!(event.field("uptime_ms"), Some(&json!(12)));
    }
}
