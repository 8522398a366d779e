//! Read-only player roster.
//!
//! The roster is the lookup table a balancing request resolves its selection
//! against. Players are found by id first, then by name; both keys share one
//! namespace so a lookup is never ambiguous.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::calculate::calculate_player_score;
use crate::models::{PlayerRecord, ScoredPlayer, StatsError};
use crate::storage::{JsonlReader, StorageError};

/// Errors that can occur while building or loading a roster.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error("Duplicate roster key `{key}` (players {first} and {second})")]
    DuplicateKey {
        key: String,
        first: String,
        second: String,
    },

    #[error("Malformed roster entry {entry}: {message}")]
    Malformed { entry: usize, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Stat fields every roster entry must carry as JSON numbers.
const STAT_FIELDS: [&str; 4] = ["winrate", "kd", "avgDamage", "assists"];

/// Outcome of looking up one selected identifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    /// Matched a player not yet selected
    Resolved(&'a PlayerRecord),
    /// Matched nothing
    Unresolved(&'a str),
    /// Matched a player already selected earlier in the list
    Duplicate(&'a str),
}

/// Validated, immutable collection of players.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    players: Vec<PlayerRecord>,
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl Roster {
    /// Build a roster, validating stats and key uniqueness.
    pub fn new(players: Vec<PlayerRecord>) -> Result<Self, RosterError> {
        let mut by_id = HashMap::with_capacity(players.len());
        let mut by_name = HashMap::with_capacity(players.len());
        let mut owners: HashMap<&str, usize> = HashMap::with_capacity(players.len() * 2);

        for (idx, player) in players.iter().enumerate() {
            player.validate()?;

            let mut keys = vec![player.id.as_str()];
            if player.name != player.id {
                keys.push(player.name.as_str());
            }

            for key in keys {
                if let Some(&other) = owners.get(key) {
                    return Err(RosterError::DuplicateKey {
                        key: key.to_string(),
                        first: players[other].name.clone(),
                        second: player.name.clone(),
                    });
                }
                owners.insert(key, idx);
            }

            by_id.insert(player.id.clone(), idx);
            by_name.insert(player.name.clone(), idx);
        }

        debug!("Built roster with {} players", players.len());

        Ok(Self {
            players,
            by_id,
            by_name,
        })
    }

    /// Load a roster from a JSON array (`.json`) or JSON Lines file.
    ///
    /// Any entry that cannot be read fails the whole load; a stat with the
    /// wrong type or a missing stat is reported by field name.
    pub fn load(path: &Path) -> Result<Self, RosterError> {
        if !path.exists() {
            return Err(StorageError::PathNotFound(path.to_path_buf()).into());
        }

        let is_json_array = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let entries: Vec<Value> = if is_json_array {
            let contents = std::fs::read_to_string(path).map_err(StorageError::Io)?;
            serde_json::from_str(&contents).map_err(StorageError::Json)?
        } else {
            JsonlReader::new(path.to_path_buf()).read_all_strict()?
        };

        let players = entries
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| parse_player(entry, idx + 1))
            .collect::<Result<Vec<_>, _>>()?;

        let roster = Self::new(players)?;
        info!("Loaded {} players from {:?}", roster.len(), path);
        Ok(roster)
    }

    /// Find a player by id, falling back to name.
    pub fn lookup(&self, key: &str) -> Option<&PlayerRecord> {
        self.by_id
            .get(key)
            .or_else(|| self.by_name.get(key))
            .map(|&idx| &self.players[idx])
    }

    /// Resolve each selected identifier in order.
    pub fn resolve<'a, S: AsRef<str>>(&'a self, selection: &'a [S]) -> Vec<Resolution<'a>> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(selection.len());

        selection
            .iter()
            .map(|key| {
                let key = key.as_ref();
                match self.lookup(key) {
                    Some(player) if seen.insert(player.id.as_str()) => {
                        Resolution::Resolved(player)
                    }
                    Some(_) => Resolution::Duplicate(key),
                    None => Resolution::Unresolved(key),
                }
            })
            .collect()
    }

    /// Every player with its calculated score, in roster order.
    pub fn scored(&self) -> Vec<ScoredPlayer<'_>> {
        self.players
            .iter()
            .map(|player| ScoredPlayer {
                player,
                calculated_score: calculate_player_score(&player.stats),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Deserialize one roster entry (1-based position `entry`).
fn parse_player(value: Value, entry: usize) -> Result<PlayerRecord, RosterError> {
    if !value.is_object() {
        return Err(RosterError::Malformed {
            entry,
            message: format!("expected a JSON object, found {}", value),
        });
    }
    check_stat_fields(&value, entry)?;

    serde_json::from_value(value).map_err(|e| RosterError::Malformed {
        entry,
        message: e.to_string(),
    })
}

fn check_stat_fields(value: &Value, entry: usize) -> Result<(), StatsError> {
    let player = value
        .get("name")
        .or_else(|| value.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", entry));

    let invalid = |field: &'static str, reason: String| StatsError::InvalidPlayerStats {
        player: player.clone(),
        field,
        reason,
    };

    let stats = match value.get("stats") {
        Some(Value::Object(stats)) => stats,
        Some(other) => return Err(invalid("stats", format!("expected an object, found {}", other))),
        None => return Err(invalid("stats", "missing".to_string())),
    };

    for field in STAT_FIELDS {
        match stats.get(field) {
            Some(Value::Number(_)) => {}
            Some(other) => return Err(invalid(field, format!("expected a number, found {}", other))),
            None => return Err(invalid(field, "missing".to_string())),
        }
    }

    Ok(())
}
