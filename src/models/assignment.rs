//! Team assignment produced by the balancer.

use serde::{Deserialize, Serialize};

/// Two disjoint teams plus their aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAssignment {
    /// Player names on team A, in sorted-score order
    #[serde(rename = "teamA")]
    pub team_a: Vec<String>,

    /// Player names on team B, in sorted-score order
    #[serde(rename = "teamB")]
    pub team_b: Vec<String>,

    /// Mean win rate of team A
    #[serde(rename = "avgA")]
    pub avg_a: f64,

    /// Mean win rate of team B
    #[serde(rename = "avgB")]
    pub avg_b: f64,

    /// Estimated probability that team A wins
    #[serde(rename = "pA")]
    pub p_a: f64,

    /// Absolute gap between mean calculated scores
    pub diff: f64,

    /// Selected identifiers that matched no roster entry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,

    /// Selected identifiers naming a player already selected
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub duplicates: Vec<String>,
}

impl TeamAssignment {
    /// Estimated probability that team B wins.
    pub fn p_b(&self) -> f64 {
        1.0 - self.p_a
    }

    /// Total number of players across both teams.
    pub fn player_count(&self) -> usize {
        self.team_a.len() + self.team_b.len()
    }

    /// All player names, team A first.
    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.team_a
            .iter()
            .chain(self.team_b.iter())
            .map(String::as_str)
    }

    /// The same split seen from team B's side.
    pub fn swapped(&self) -> Self {
        Self {
            team_a: self.team_b.clone(),
            team_b: self.team_a.clone(),
            avg_a: self.avg_b,
            avg_b: self.avg_a,
            p_a: self.p_b(),
            diff: self.diff,
            unresolved: self.unresolved.clone(),
            duplicates: self.duplicates.clone(),
        }
    }

    /// Returns true if any selected identifier was not used.
    pub fn has_warnings(&self) -> bool {
        !self.unresolved.is_empty() || !self.duplicates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> TeamAssignment {
        TeamAssignment {
            team_a: vec!["A1".to_string(), "A2".to_string()],
            team_b: vec!["B1".to_string(), "B2".to_string()],
            avg_a: 0.6,
            avg_b: 0.5,
            p_a: 0.7,
            diff: 0.085,
            unresolved: Vec::new(),
            duplicates: Vec::new(),
        }
    }

    #[test]
    fn test_external_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["teamA"][0], "A1");
        assert_eq!(json["teamB"][1], "B2");
        assert_eq!(json["avgA"], 0.6);
        assert_eq!(json["pA"], 0.7);
        assert_eq!(json["diff"], 0.085);
        assert!(json.get("unresolved").is_none());
        assert!(json.get("duplicates").is_none());
    }

    #[test]
    fn test_unresolved_serialized_when_present() {
        let mut a = sample();
        a.unresolved.push("ghost".to_string());

        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["unresolved"][0], "ghost");
        assert!(a.has_warnings());
    }

    #[test]
    fn test_swapped_mirrors_probability() {
        let a = sample();
        let b = a.swapped();

        assert_eq!(b.team_a, a.team_b);
        assert_eq!(b.avg_a, a.avg_b);
        assert!((b.p_a - (1.0 - a.p_a)).abs() < 1e-12);
        assert_eq!(b.diff, a.diff);

        let back = b.swapped();
        assert_eq!(back.team_a, a.team_a);
        assert!((back.p_a - a.p_a).abs() < 1e-12);
    }

    #[test]
    fn test_players_iterates_team_a_first() {
        let assignment = sample();
        let names: Vec<&str> = assignment.players().collect();
        assert_eq!(names, vec!["A1", "A2", "B1", "B2"]);
        assert_eq!(assignment.player_count(), 4);
    }
}
