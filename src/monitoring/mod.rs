//! Monitoring log of balancing outcomes.
//!
//! Keeps a short rolling history of recent splits in a JSONL file and
//! derives dashboard statistics and alerts from it. Legacy line shapes are
//! normalized on load and the file is rewritten in canonical form.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calculate::{mean, population_std_dev};
use crate::config::MonitoringConfig;
use crate::models::{MonitoringEntry, StoredEntry, TeamAssignment};
use crate::storage::{JsonlReader, JsonlWriter, StorageError};

/// Errors that can occur while reading or writing the monitoring log.
#[derive(Debug, Error)]
pub enum MonitoringError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Rolling monitoring log backed by a JSONL file.
pub struct MonitoringLog {
    path: PathBuf,
    max_entries: usize,
}

impl MonitoringLog {
    pub fn new(path: PathBuf, max_entries: usize) -> Self {
        Self { path, max_entries }
    }

    /// Load all entries in canonical form, oldest first.
    ///
    /// Legacy lines are migrated and the file is rewritten when any were found.
    pub fn load(&self) -> Result<Vec<MonitoringEntry>, MonitoringError> {
        let stored = JsonlReader::<StoredEntry>::new(self.path.clone()).read_all()?;

        let mut migrated = 0;
        let mut entries = Vec::with_capacity(stored.len());
        for line in stored {
            let was_canonical = line.is_canonical();
            match line.into_canonical() {
                Some(entry) => {
                    if !was_canonical {
                        migrated += 1;
                    }
                    entries.push(entry);
                }
                None => {
                    migrated += 1;
                    warn!("Dropping monitoring entry with unparsable timestamp");
                }
            }
        }

        if migrated > 0 {
            JsonlWriter::new(self.path.clone()).write_all(&entries)?;
            info!(
                "Migrated {} legacy monitoring entries in {:?}",
                migrated, self.path
            );
        }

        Ok(entries)
    }

    /// Append an outcome and trim the log to the most recent entries.
    pub fn record(&self, assignment: &TeamAssignment) -> Result<MonitoringEntry, MonitoringError> {
        self.record_at(assignment, Utc::now())
    }

    /// Like [`record`](Self::record) with an explicit timestamp.
    pub fn record_at(
        &self,
        assignment: &TeamAssignment,
        timestamp: DateTime<Utc>,
    ) -> Result<MonitoringEntry, MonitoringError> {
        let entry = MonitoringEntry::from_assignment(assignment, timestamp);
        let mut entries = self.load()?;
        entries.push(entry.clone());

        let writer = JsonlWriter::new(self.path.clone());
        if entries.len() > self.max_entries {
            let excess = entries.len() - self.max_entries;
            entries.drain(..excess);
            writer.write_all(&entries)?;
            debug!("Trimmed {} old monitoring entries", excess);
        } else {
            writer.append(&entry)?;
        }

        Ok(entry)
    }
}

/// Dashboard thresholds.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// Largest tolerated `|pA - 0.5|`
    pub imbalance_threshold: f64,
    /// Player count every split with teams should have
    pub expected_players: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            imbalance_threshold: 0.15,
            expected_players: 8,
        }
    }
}

impl From<&MonitoringConfig> for Thresholds {
    fn from(config: &MonitoringConfig) -> Self {
        Self {
            imbalance_threshold: config.imbalance_threshold,
            expected_players: config.expected_players,
        }
    }
}

/// A problem found in one monitoring entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MonitoringAlert {
    WrongPlayerCount {
        timestamp: DateTime<Utc>,
        players: Vec<String>,
        expected: usize,
    },
    DuplicatePlayers {
        timestamp: DateTime<Utc>,
        players: Vec<String>,
    },
    Unbalanced {
        timestamp: DateTime<Utc>,
        p_a: f64,
        p_b: f64,
    },
}

impl std::fmt::Display for MonitoringAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitoringAlert::WrongPlayerCount {
                players, expected, ..
            } => write!(
                f,
                "Wrong player count ({} instead of {}): {}",
                players.len(),
                expected,
                players.join(", ")
            ),
            MonitoringAlert::DuplicatePlayers { players, .. } => {
                write!(f, "Duplicate players: {}", players.join(", "))
            }
            MonitoringAlert::Unbalanced { p_a, p_b, .. } => {
                write!(f, "Unbalanced win probability: {:.2} / {:.2}", p_a, p_b)
            }
        }
    }
}

/// Aggregate view over the monitoring log.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringSummary {
    pub total_entries: usize,
    pub mean_p_a: Option<f64>,
    pub std_dev_p_a: Option<f64>,
    pub percent_unbalanced: f64,
    pub anomalies: usize,
    pub alerts: Vec<MonitoringAlert>,
}

impl MonitoringSummary {
    pub fn from_entries(entries: &[MonitoringEntry], thresholds: Thresholds) -> Self {
        let mut alerts = Vec::new();

        for entry in entries {
            if entry.has_teams() {
                let players = entry.players();

                if players.len() != thresholds.expected_players {
                    alerts.push(MonitoringAlert::WrongPlayerCount {
                        timestamp: entry.timestamp,
                        players: players.iter().map(|p| p.to_string()).collect(),
                        expected: thresholds.expected_players,
                    });
                }

                let unique: HashSet<&str> = players.iter().copied().collect();
                if unique.len() != players.len() {
                    alerts.push(MonitoringAlert::DuplicatePlayers {
                        timestamp: entry.timestamp,
                        players: players.iter().map(|p| p.to_string()).collect(),
                    });
                }
            }

            if is_unbalanced(entry.p_a, thresholds) {
                alerts.push(MonitoringAlert::Unbalanced {
                    timestamp: entry.timestamp,
                    p_a: entry.p_a,
                    p_b: entry.p_b,
                });
            }
        }

        let probabilities: Vec<f64> = entries.iter().map(|e| e.p_a).collect();
        let unbalanced = probabilities
            .iter()
            .filter(|&&p| is_unbalanced(p, thresholds))
            .count();
        let percent_unbalanced = if probabilities.is_empty() {
            0.0
        } else {
            unbalanced as f64 / probabilities.len() as f64 * 100.0
        };

        Self {
            total_entries: entries.len(),
            mean_p_a: mean(&probabilities),
            std_dev_p_a: population_std_dev(&probabilities),
            percent_unbalanced,
            anomalies: alerts.len(),
            alerts,
        }
    }

    /// Returns true if no entry raised an alert.
    pub fn is_healthy(&self) -> bool {
        self.alerts.is_empty()
    }
}

fn is_unbalanced(p_a: f64, thresholds: Thresholds) -> bool {
    (p_a - 0.5).abs() > thresholds.imbalance_threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryOrigin;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn assignment(team_a: &[&str], team_b: &[&str], p_a: f64) -> TeamAssignment {
        TeamAssignment {
            team_a: team_a.iter().map(|s| s.to_string()).collect(),
            team_b: team_b.iter().map(|s| s.to_string()).collect(),
            avg_a: 0.5,
            avg_b: 0.5,
            p_a,
            diff: 0.01,
            unresolved: Vec::new(),
            duplicates: Vec::new(),
        }
    }

    fn balanced() -> TeamAssignment {
        assignment(&["A", "C", "E", "G"], &["B", "D", "F", "H"], 0.52)
    }

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 12, minute, 0).unwrap()
    }

    #[test]
    fn test_record_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let log = MonitoringLog::new(temp_dir.path().join("logs/monitoring.jsonl"), 10);

        log.record_at(&balanced(), ts(0)).unwrap();
        log.record_at(&balanced(), ts(1)).unwrap();

        let entries = log.load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].timestamp, ts(0));
        assert_eq!(entries[1].origin, EntryOrigin::Native);
    }

    #[test]
    fn test_retention_keeps_most_recent() {
        let temp_dir = TempDir::new().unwrap();
        let log = MonitoringLog::new(temp_dir.path().join("monitoring.jsonl"), 3);

        for minute in 0..5 {
            log.record_at(&balanced(), ts(minute)).unwrap();
        }

        let entries = log.load().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].timestamp, ts(2));
        assert_eq!(entries[2].timestamp, ts(4));
    }

    #[test]
    fn test_load_migrates_legacy_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("monitoring.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"timestamp": "2025-09-30T14:03:27.123456", "results": {"pA": 0.51, "pB": 0.49, "diff": 0.01}}"#,
                "\n\n",
                "corrupted line\n",
                r#"{"timestamp": "2025-09-30T15:00:00", "best_split": {"teamA": ["A","B","C","D"], "teamB": ["E","F","G","H"], "pA": 0.7, "diff": 0.2}}"#,
                "\n",
            ),
        )
        .unwrap();

        let log = MonitoringLog::new(path.clone(), 10);
        let entries = log.load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].origin, EntryOrigin::LegacyResults);
        assert_eq!(entries[1].origin, EntryOrigin::LegacyBestSplit);

        // File now holds canonical lines only
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.lines().count(), 2);
        assert!(raw.lines().all(|l| l.contains("\"schema\":\"balance/v1\"")));

        let reloaded = log.load().unwrap();
        assert_eq!(reloaded, entries);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let log = MonitoringLog::new(temp_dir.path().join("missing.jsonl"), 10);
        assert!(log.load().unwrap().is_empty());
    }

    #[test]
    fn test_summary_empty() {
        let summary = MonitoringSummary::from_entries(&[], Thresholds::default());
        assert_eq!(summary.total_entries, 0);
        assert!(summary.mean_p_a.is_none());
        assert_eq!(summary.percent_unbalanced, 0.0);
        assert!(summary.is_healthy());
    }

    #[test]
    fn test_summary_statistics() {
        let entries = vec![
            MonitoringEntry::from_assignment(&assignment(&["A"], &["B"], 0.4), ts(0)),
            MonitoringEntry::from_assignment(&assignment(&["A"], &["B"], 0.6), ts(1)),
        ];
        let thresholds = Thresholds {
            imbalance_threshold: 0.15,
            expected_players: 2,
        };

        let summary = MonitoringSummary::from_entries(&entries, thresholds);
        assert_eq!(summary.total_entries, 2);
        assert!((summary.mean_p_a.unwrap() - 0.5).abs() < 1e-12);
        assert!((summary.std_dev_p_a.unwrap() - 0.1).abs() < 1e-12);
        assert!(summary.is_healthy());
    }

    #[test]
    fn test_summary_alerts() {
        let entries = vec![
            MonitoringEntry::from_assignment(&balanced(), ts(0)),
            MonitoringEntry::from_assignment(&assignment(&["A", "B"], &["C"], 0.5), ts(1)),
            MonitoringEntry::from_assignment(
                &assignment(&["A", "B", "C", "D"], &["A", "F", "G", "H"], 0.5),
                ts(2),
            ),
            MonitoringEntry::from_assignment(&assignment(&["A", "C", "E", "G"], &["B", "D", "F", "H"], 0.9), ts(3)),
        ];

        let summary = MonitoringSummary::from_entries(&entries, Thresholds::default());
        assert_eq!(summary.anomalies, 3);
        assert!(matches!(
            summary.alerts[0],
            MonitoringAlert::WrongPlayerCount { expected: 8, .. }
        ));
        assert!(matches!(summary.alerts[1], MonitoringAlert::DuplicatePlayers { .. }));
        assert!(matches!(summary.alerts[2], MonitoringAlert::Unbalanced { .. }));
        assert!((summary.percent_unbalanced - 25.0).abs() < 1e-12);
        assert!(!summary.is_healthy());
    }

    #[test]
    fn test_legacy_entries_skip_player_checks() {
        let line = r#"{"timestamp": "2025-09-30T14:03:27", "results": {"pA": 0.5, "diff": 0.0}}"#;
        let entry = serde_json::from_str::<StoredEntry>(line)
            .unwrap()
            .into_canonical()
            .unwrap();

        let summary = MonitoringSummary::from_entries(&[entry], Thresholds::default());
        assert!(summary.is_healthy());
    }

    #[test]
    fn test_alert_display() {
        let alert = MonitoringAlert::Unbalanced {
            timestamp: ts(0),
            p_a: 0.7,
            p_b: 0.3,
        };
        assert_eq!(alert.to_string(), "Unbalanced win probability: 0.70 / 0.30");
    }
}
