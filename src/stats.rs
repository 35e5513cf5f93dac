//! Server statistics module
//!
//! Process-lifetime counters shared by every connection task.
//! Increments are atomic; reads are independent and carry no snapshot guarantee.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Timestamp layout used by every JSON field (local time, microseconds)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Live counters
#[derive(Debug)]
pub struct ServerStats {
    start_time: DateTime<Local>,
    requests_count: AtomicU64,
    files_served: AtomicU64,
    // Part of the exposed shape; nothing increments these
    mining_sessions: AtomicU64,
    active_connections: AtomicU64,
}

/// JSON body of `/api/stats`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub start_time: String,
    pub requests_count: u64,
    pub files_served: u64,
    pub mining_sessions: u64,
    pub active_connections: u64,
    pub uptime: String,
    pub timestamp: String,
}

impl ServerStats {
    pub fn new() -> Self {
        Self::started_at(Local::now())
    }

    pub const fn started_at(start_time: DateTime<Local>) -> Self {
        Self {
            start_time,
            requests_count: AtomicU64::new(0),
            files_served: AtomicU64::new(0),
            mining_sessions: AtomicU64::new(0),
            active_connections: AtomicU64::new(0),
        }
    }

    /// Count one inbound request (any route, any method)
    pub fn record_request(&self) {
        self.requests_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one request satisfied by the static file resolver
    pub fn record_file_served(&self) {
        self.files_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests_count(&self) -> u64 {
        self.requests_count.load(Ordering::Relaxed)
    }

    pub fn files_served(&self) -> u64 {
        self.files_served.load(Ordering::Relaxed)
    }

    pub const fn start_time(&self) -> DateTime<Local> {
        self.start_time
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.snapshot_at(Local::now())
    }

    /// Build a snapshot as seen at `now`
    pub fn snapshot_at(&self, now: DateTime<Local>) -> StatsSnapshot {
        let uptime = (now - self.start_time).to_std().unwrap_or_default();
        StatsSnapshot {
            start_time: self.start_time.format(TIMESTAMP_FORMAT).to_string(),
            requests_count: self.requests_count(),
            files_served: self.files_served(),
            mining_sessions: self.mining_sessions.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            uptime: format_uptime(uptime),
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable duration truncated to whole seconds
///
/// `0:05:07` below a day, `1 day, 2:03:04` / `3 days, 0:00:00` beyond.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let clock = format!("{hours}:{minutes:02}:{seconds:02}");
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0:00:00");
        assert_eq!(format_uptime(Duration::from_millis(5_999)), "0:00:05");
        assert_eq!(format_uptime(Duration::from_secs(307)), "0:05:07");
        assert_eq!(format_uptime(Duration::from_secs(36_000)), "10:00:00");
        assert_eq!(format_uptime(Duration::from_secs(93_784)), "1 day, 2:03:04");
        assert_eq!(format_uptime(Duration::from_secs(3 * 86_400)), "3 days, 0:00:00");
    }

    #[test]
    fn test_snapshot_fields() {
        let start = Local::now() - chrono::Duration::seconds(65);
        let stats = ServerStats::started_at(start);
        stats.record_request();
        stats.record_request();
        stats.record_file_served();

        let snap = stats.snapshot_at(start + chrono::Duration::seconds(65));
        assert_eq!(snap.requests_count, 2);
        assert_eq!(snap.files_served, 1);
        assert_eq!(snap.mining_sessions, 0);
        assert_eq!(snap.active_connections, 0);
        assert_eq!(snap.uptime, "0:01:05");
        assert_eq!(snap.start_time, start.format(TIMESTAMP_FORMAT).to_string());
    }

    #[test]
    fn test_snapshot_json_shape() {
        let snap = ServerStats::new().snapshot();
        let value = serde_json::to_value(&snap).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "start_time",
            "requests_count",
            "files_served",
            "mining_sessions",
            "active_connections",
            "uptime",
            "timestamp",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj.len(), 7);
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let stats = Arc::new(ServerStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        stats.record_request();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(stats.requests_count(), 8_000);
        assert_eq!(stats.files_served(), 0);
    }
}
