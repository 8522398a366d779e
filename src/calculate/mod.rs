//! Scoring and probability engine.
//!
//! Computes derived metrics for a team split:
//! - Composite skill score per player
//! - Team means
//! - Win probability from the score gap
//! - Balance quality from the score gap

use crate::models::{BalanceAssessment, PlayerStats};

/// Weight of the win rate term.
pub const WINRATE_WEIGHT: f64 = 0.4;
/// Weight of the K/D term.
pub const KD_WEIGHT: f64 = 0.3;
/// Weight of the damage term.
pub const DAMAGE_WEIGHT: f64 = 0.2;
/// Weight of the assists term.
pub const ASSISTS_WEIGHT: f64 = 0.1;

/// K/D ratio treated as a full-strength contribution.
pub const KD_SCALE: f64 = 3.0;
/// Average damage treated as a full-strength contribution.
pub const DAMAGE_SCALE: f64 = 2000.0;
/// Average assists treated as a full-strength contribution.
pub const ASSISTS_SCALE: f64 = 20.0;

/// How sharply a score gap skews the win probability.
pub const PROBABILITY_SENSITIVITY: f64 = 10.0;

/// Calculate the composite skill score for a player.
///
/// Terms are not clamped, so standout stats can push the score above 1.0.
pub fn calculate_player_score(stats: &PlayerStats) -> f64 {
    WINRATE_WEIGHT * stats.winrate
        + KD_WEIGHT * (stats.kd / KD_SCALE)
        + DAMAGE_WEIGHT * (stats.avg_damage / DAMAGE_SCALE)
        + ASSISTS_WEIGHT * (stats.assists / ASSISTS_SCALE)
}

/// The logistic function `1 / (1 + e^-x)`.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Probability that team A wins given each team's mean calculated score.
pub fn calculate_win_probability(mean_score_a: f64, mean_score_b: f64) -> f64 {
    sigmoid(PROBABILITY_SENSITIVITY * (mean_score_a - mean_score_b))
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation, or `None` for an empty slice.
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Classify a raw score gap.
pub fn assess_balance(diff: f64) -> BalanceAssessment {
    BalanceAssessment::from_diff(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BalanceQuality;

    #[test]
    fn test_weights_sum_to_one() {
        let total = WINRATE_WEIGHT + KD_WEIGHT + DAMAGE_WEIGHT + ASSISTS_WEIGHT;
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_calculate_player_score() {
        // 0.4*0.5 + 0.3*(1.5/3) + 0.2*(1000/2000) + 0.1*(10/20) = 0.2 + 0.15 + 0.1 + 0.05
        let stats = PlayerStats::new(0.5, 1.5, 1000.0, 10.0);
        assert!((calculate_player_score(&stats) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_score_at_scale_is_one() {
        let stats = PlayerStats::new(1.0, 3.0, 2000.0, 20.0);
        assert!((calculate_player_score(&stats) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_score_not_clamped() {
        let stats = PlayerStats::new(1.0, 6.0, 4000.0, 40.0);
        let score = calculate_player_score(&stats);
        assert!((score - 1.6).abs() < 1e-12);
    }

    #[test]
    fn test_zero_stats_score_zero() {
        let stats = PlayerStats::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(calculate_player_score(&stats), 0.0);
    }

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!((sigmoid(0.5) - 0.622_459_3).abs() < 1e-6);
        assert!(sigmoid(50.0) <= 1.0);
        assert!(sigmoid(-50.0) >= 0.0);
    }

    #[test]
    fn test_win_probability() {
        let p = calculate_win_probability(0.75, 0.70);
        assert!((p - 0.6225).abs() < 1e-4);

        // Mirror
        let q = calculate_win_probability(0.70, 0.75);
        assert!((p + q - 1.0).abs() < 1e-12);

        assert_eq!(calculate_win_probability(0.6, 0.6), 0.5);
    }

    #[test]
    fn test_win_probability_extreme_gap_stays_in_range() {
        let p = calculate_win_probability(500.0, 0.0);
        assert!((0.0..=1.0).contains(&p));
        let p = calculate_win_probability(0.0, 500.0);
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[0.5]), Some(0.5));
        assert!((mean(&[0.9, 0.8, 0.7, 0.6]).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_population_std_dev() {
        assert_eq!(population_std_dev(&[]), None);
        assert_eq!(population_std_dev(&[0.4, 0.4]), Some(0.0));
        let sd = population_std_dev(&[0.4, 0.6]).unwrap();
        assert!((sd - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_assess_balance() {
        assert_eq!(assess_balance(0.0149).quality, BalanceQuality::Excellent);
        assert_eq!(assess_balance(0.07).quality, BalanceQuality::Poor);
    }
}
