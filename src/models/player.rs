//! Player records and their performance statistics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a player's statistics cannot be scored.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("Invalid stat `{field}` for player {player}: {reason}")]
    InvalidPlayerStats {
        player: String,
        field: &'static str,
        reason: String,
    },
}

/// Observed performance statistics for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    /// Win rate (0.0 to 1.0)
    pub winrate: f64,

    /// Kill/death ratio
    pub kd: f64,

    /// Average damage per match
    pub avg_damage: f64,

    /// Average assists per match
    pub assists: f64,
}

impl PlayerStats {
    pub fn new(winrate: f64, kd: f64, avg_damage: f64, assists: f64) -> Self {
        Self {
            winrate,
            kd,
            avg_damage,
            assists,
        }
    }

    /// Check every field, naming the first one that is unusable for scoring.
    pub fn validate(&self, player: &str) -> Result<(), StatsError> {
        let fields = [
            ("winrate", self.winrate),
            ("kd", self.kd),
            ("avgDamage", self.avg_damage),
            ("assists", self.assists),
        ];

        for (field, value) in fields {
            if !value.is_finite() {
                return Err(invalid(player, field, format!("{} is not a finite number", value)));
            }
            if value < 0.0 {
                return Err(invalid(player, field, format!("{} is negative", value)));
            }
        }

        if self.winrate > 1.0 {
            return Err(invalid(
                player,
                "winrate",
                format!("{} is above 1.0", self.winrate),
            ));
        }

        Ok(())
    }
}

fn invalid(player: &str, field: &'static str, reason: String) -> StatsError {
    StatsError::InvalidPlayerStats {
        player: player.to_string(),
        field,
        reason,
    }
}

/// Identity and statistics for one roster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Unique identifier
    pub id: String,

    /// Display name, also usable as a lookup key
    pub name: String,

    pub stats: PlayerStats,

    /// Rank tier (e.g. "Diamond"), descriptive only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,

    /// Team-of-origin label, descriptive only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

impl PlayerRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, stats: PlayerStats) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stats,
            rank: None,
            team: None,
        }
    }

    pub fn with_rank(mut self, rank: impl Into<String>) -> Self {
        self.rank = Some(rank.into());
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    /// Validate this record's statistics.
    pub fn validate(&self) -> Result<(), StatsError> {
        self.stats.validate(&self.name)
    }
}

/// A player paired with its composite skill score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPlayer<'a> {
    pub player: &'a PlayerRecord,
    pub calculated_score: f64,
}

impl<'a> ScoredPlayer<'a> {
    pub fn name(&self) -> &'a str {
        &self.player.name
    }

    pub fn winrate(&self) -> f64 {
        self.player.stats.winrate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> PlayerStats {
        PlayerStats::new(0.6, 1.5, 1800.0, 12.0)
    }

    #[test]
    fn test_valid_stats() {
        assert!(stats().validate("Niko").is_ok());
    }

    #[test]
    fn test_stats_above_nominal_range_are_valid() {
        let s = PlayerStats::new(1.0, 4.5, 3200.0, 25.0);
        assert!(s.validate("Niko").is_ok());
    }

    #[test]
    fn test_negative_kd_rejected() {
        let mut s = stats();
        s.kd = -0.5;

        let err = s.validate("Niko").unwrap_err();
        assert_eq!(
            err,
            StatsError::InvalidPlayerStats {
                player: "Niko".to_string(),
                field: "kd",
                reason: "-0.5 is negative".to_string(),
            }
        );
    }

    #[test]
    fn test_winrate_above_one_rejected() {
        let mut s = stats();
        s.winrate = 1.2;

        match s.validate("Eny") {
            Err(StatsError::InvalidPlayerStats { field, .. }) => assert_eq!(field, "winrate"),
            other => panic!("expected winrate error, got {:?}", other),
        }
    }

    #[test]
    fn test_nan_damage_rejected() {
        let mut s = stats();
        s.avg_damage = f64::NAN;

        let err = s.validate("Eny").unwrap_err();
        assert!(err.to_string().contains("avgDamage"));
    }

    #[test]
    fn test_infinite_assists_rejected() {
        let mut s = stats();
        s.assists = f64::INFINITY;

        match s.validate("Eny") {
            Err(StatsError::InvalidPlayerStats { field, .. }) => assert_eq!(field, "assists"),
            other => panic!("expected assists error, got {:?}", other),
        }
    }

    #[test]
    fn test_player_record_json_shape() {
        let json = r#"{
            "id": "1",
            "name": "SRDxNiko",
            "stats": {"winrate": 0.72, "kd": 2.4, "avgDamage": 1850, "assists": 12.5},
            "rank": "Diamond",
            "team": "SRD"
        }"#;

        let record: PlayerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "1");
        assert_eq!(record.stats.avg_damage, 1850.0);
        assert_eq!(record.rank.as_deref(), Some("Diamond"));

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["stats"]["avgDamage"], 1850.0);
    }

    #[test]
    fn test_descriptive_fields_optional() {
        let json = r#"{"id":"9","name":"Solo","stats":{"winrate":0.5,"kd":1,"avgDamage":1000,"assists":5}}"#;
        let record: PlayerRecord = serde_json::from_str(json).unwrap();
        assert!(record.rank.is_none());
        assert!(record.team.is_none());

        let out = serde_json::to_string(&record).unwrap();
        assert!(!out.contains("rank"));
    }
}
