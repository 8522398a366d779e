//! Monitoring log records.
//!
//! Every entry is stored in one canonical shape, tagged with its schema.
//! Older deployments wrote two other shapes; [`StoredEntry`] accepts all of
//! them so they can be normalized when the log is loaded.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TeamAssignment;

/// Schema tag written on every canonical entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EntrySchema {
    #[default]
    #[serde(rename = "balance/v1")]
    BalanceV1,
}

/// Where an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrigin {
    /// Written by this service
    #[default]
    Native,
    /// Migrated from `{timestamp, results: {...}}`
    LegacyResults,
    /// Migrated from `{timestamp, best_split: {...}}`
    LegacyBestSplit,
}

/// One balancing outcome as recorded in the monitoring log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringEntry {
    pub schema: EntrySchema,

    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub origin: EntryOrigin,

    /// Team A player names (empty when the source did not record teams)
    #[serde(rename = "teamA", default)]
    pub team_a: Vec<String>,

    /// Team B player names
    #[serde(rename = "teamB", default)]
    pub team_b: Vec<String>,

    #[serde(rename = "pA")]
    pub p_a: f64,

    #[serde(rename = "pB")]
    pub p_b: f64,

    pub diff: f64,
}

impl MonitoringEntry {
    /// Record a fresh balancing outcome.
    pub fn from_assignment(assignment: &TeamAssignment, timestamp: DateTime<Utc>) -> Self {
        Self {
            schema: EntrySchema::BalanceV1,
            timestamp,
            origin: EntryOrigin::Native,
            team_a: assignment.team_a.clone(),
            team_b: assignment.team_b.clone(),
            p_a: assignment.p_a,
            p_b: assignment.p_b(),
            diff: assignment.diff,
        }
    }

    /// Returns true if the entry carries team rosters.
    pub fn has_teams(&self) -> bool {
        !self.team_a.is_empty() || !self.team_b.is_empty()
    }

    /// All player names on both teams.
    pub fn players(&self) -> Vec<&str> {
        self.team_a
            .iter()
            .chain(self.team_b.iter())
            .map(String::as_str)
            .collect()
    }
}

/// Probability block of the `results` legacy shape.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyResults {
    #[serde(rename = "pA")]
    pub p_a: f64,
    #[serde(rename = "pB")]
    pub p_b: Option<f64>,
    pub diff: f64,
}

/// Partition block of the `best_split` legacy shape.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyBestSplit {
    #[serde(rename = "teamA", default)]
    pub team_a: Vec<String>,
    #[serde(rename = "teamB", default)]
    pub team_b: Vec<String>,
    #[serde(rename = "pA")]
    pub p_a: f64,
    #[serde(rename = "pB")]
    pub p_b: Option<f64>,
    pub diff: f64,
}

/// Any line that may appear in a monitoring log file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredEntry {
    Canonical(MonitoringEntry),
    Results {
        timestamp: String,
        results: LegacyResults,
    },
    BestSplit {
        timestamp: String,
        best_split: LegacyBestSplit,
    },
}

impl StoredEntry {
    /// Returns true if this line is already in canonical form.
    pub fn is_canonical(&self) -> bool {
        matches!(self, StoredEntry::Canonical(_))
    }

    /// Convert into the canonical shape.
    ///
    /// Returns `None` when a legacy timestamp cannot be parsed.
    pub fn into_canonical(self) -> Option<MonitoringEntry> {
        match self {
            StoredEntry::Canonical(entry) => Some(entry),
            StoredEntry::Results { timestamp, results } => Some(MonitoringEntry {
                schema: EntrySchema::BalanceV1,
                timestamp: parse_legacy_timestamp(&timestamp)?,
                origin: EntryOrigin::LegacyResults,
                team_a: Vec::new(),
                team_b: Vec::new(),
                p_a: results.p_a,
                p_b: results.p_b.unwrap_or(1.0 - results.p_a),
                diff: results.diff,
            }),
            StoredEntry::BestSplit {
                timestamp,
                best_split,
            } => Some(MonitoringEntry {
                schema: EntrySchema::BalanceV1,
                timestamp: parse_legacy_timestamp(&timestamp)?,
                origin: EntryOrigin::LegacyBestSplit,
                p_b: best_split.p_b.unwrap_or(1.0 - best_split.p_a),
                p_a: best_split.p_a,
                diff: best_split.diff,
                team_a: best_split.team_a,
                team_b: best_split.team_b,
            }),
        }
    }
}

/// Parse an RFC 3339 timestamp, or a naive ISO-8601 one taken as UTC.
pub fn parse_legacy_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
