//! Team balancing.
//!
//! Splits a selection of roster players into two teams:
//! 1. Resolve each identifier against the roster
//! 2. Score every resolved player
//! 3. Stable-sort by score, highest first
//! 4. Alternate assignment: even sorted positions to team A, odd to team B
//! 5. Aggregate win rates, score gap and win probability

use std::cmp::Ordering;

use thiserror::Error;
use tracing::{debug, warn};

use crate::calculate::{calculate_player_score, calculate_win_probability, mean};
use crate::models::{PlayerRecord, ScoredPlayer, StatsError, TeamAssignment};
use crate::roster::{Resolution, Roster};

/// Smallest selection that leaves both teams non-empty.
pub const MIN_PLAYERS: usize = 2;

/// Errors that can occur while balancing a selection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BalanceError {
    #[error("Insufficient players: {resolved} resolved, at least {required} required")]
    InsufficientPlayers { resolved: usize, required: usize },

    #[error("Unresolved player identifiers: {}", .0.join(", "))]
    UnresolvedIdentifiers(Vec<String>),

    #[error(transparent)]
    InvalidStats(#[from] StatsError),
}

/// Knobs for a balancing request.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceOptions {
    /// Fail instead of warning when an identifier matches no player.
    pub strict_selection: bool,
}

/// Balance a selection of roster identifiers into two teams.
pub fn balance_teams<S: AsRef<str>>(
    roster: &Roster,
    selection: &[S],
    options: BalanceOptions,
) -> Result<TeamAssignment, BalanceError> {
    let mut players: Vec<&PlayerRecord> = Vec::with_capacity(selection.len());
    let mut unresolved = Vec::new();
    let mut duplicates = Vec::new();

    for resolution in roster.resolve(selection) {
        match resolution {
            Resolution::Resolved(player) => players.push(player),
            Resolution::Unresolved(key) => unresolved.push(key.to_string()),
            Resolution::Duplicate(key) => duplicates.push(key.to_string()),
        }
    }

    if !unresolved.is_empty() {
        if options.strict_selection {
            return Err(BalanceError::UnresolvedIdentifiers(unresolved));
        }
        warn!(
            "Dropping {} unresolved identifier(s): {}",
            unresolved.len(),
            unresolved.join(", ")
        );
    }
    if !duplicates.is_empty() {
        warn!(
            "Dropping {} duplicate identifier(s): {}",
            duplicates.len(),
            duplicates.join(", ")
        );
    }

    let mut assignment = balance_players(&players)?;
    assignment.unresolved = unresolved;
    assignment.duplicates = duplicates;
    Ok(assignment)
}

/// Balance already-resolved players, validating their stats first.
pub fn balance_players(players: &[&PlayerRecord]) -> Result<TeamAssignment, BalanceError> {
    for player in players {
        player.validate()?;
    }

    let scored = score_players(players);
    let (team_a, team_b) = partition(scored);
    summarize(&team_a, &team_b)
}

/// Score each player, keeping input order.
fn score_players<'a>(players: &[&'a PlayerRecord]) -> Vec<ScoredPlayer<'a>> {
    players
        .iter()
        .map(|&player| ScoredPlayer {
            player,
            calculated_score: calculate_player_score(&player.stats),
        })
        .collect()
}

/// Sort by score descending and deal players alternately into two teams.
///
/// The sort is stable, so equal scores keep their input order. Scores
/// compare numerically, so `-0.0` and `0.0` tie.
fn partition<'a>(
    mut scored: Vec<ScoredPlayer<'a>>,
) -> (Vec<ScoredPlayer<'a>>, Vec<ScoredPlayer<'a>>) {
    scored.sort_by(|a, b| {
        b.calculated_score
            .partial_cmp(&a.calculated_score)
            .unwrap_or(Ordering::Equal)
    });

    let mut team_a = Vec::with_capacity(scored.len().div_ceil(2));
    let mut team_b = Vec::with_capacity(scored.len() / 2);

    for (idx, player) in scored.into_iter().enumerate() {
        if idx % 2 == 0 {
            team_a.push(player);
        } else {
            team_b.push(player);
        }
    }

    (team_a, team_b)
}

/// Aggregate two teams into a [`TeamAssignment`].
///
/// `avgA`/`avgB` are mean win rates; `pA` and `diff` come from mean scores.
fn summarize(
    team_a: &[ScoredPlayer<'_>],
    team_b: &[ScoredPlayer<'_>],
) -> Result<TeamAssignment, BalanceError> {
    let insufficient = || BalanceError::InsufficientPlayers {
        resolved: team_a.len() + team_b.len(),
        required: MIN_PLAYERS,
    };

    let avg_a = mean(&winrates(team_a)).ok_or_else(insufficient)?;
    let avg_b = mean(&winrates(team_b)).ok_or_else(insufficient)?;
    let mean_score_a = mean(&scores(team_a)).ok_or_else(insufficient)?;
    let mean_score_b = mean(&scores(team_b)).ok_or_else(insufficient)?;

    let p_a = calculate_win_probability(mean_score_a, mean_score_b);
    let diff = (mean_score_a - mean_score_b).abs();

    debug!(
        "Balanced {} vs {} players: mean scores {:.4} / {:.4}, pA {:.4}",
        team_a.len(),
        team_b.len(),
        mean_score_a,
        mean_score_b,
        p_a
    );

    Ok(TeamAssignment {
        team_a: team_a.iter().map(|p| p.name().to_string()).collect(),
        team_b: team_b.iter().map(|p| p.name().to_string()).collect(),
        avg_a,
        avg_b,
        p_a,
        diff,
        unresolved: Vec::new(),
        duplicates: Vec::new(),
    })
}

fn winrates(team: &[ScoredPlayer<'_>]) -> Vec<f64> {
    team.iter().map(|p| p.winrate()).collect()
}

fn scores(team: &[ScoredPlayer<'_>]) -> Vec<f64> {
    team.iter().map(|p| p.calculated_score).collect()
}
