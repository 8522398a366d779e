use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::models::{PlayerStats, ScoredPlayer};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub id: String,
    pub name: String,
    pub rank: Option<String>,
    pub team: Option<String>,
    pub stats: PlayerStats,
    pub calculated_score: f64,
}

impl From<ScoredPlayer<'_>> for PlayerSummary {
    fn from(scored: ScoredPlayer<'_>) -> Self {
        let player = scored.player;
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            rank: player.rank.clone(),
            team: player.team.clone(),
            stats: player.stats.clone(),
            calculated_score: scored.calculated_score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlayersResponse {
    pub players: Vec<PlayerSummary>,
}

pub async fn list_players(State(state): State<AppState>) -> Json<PlayersResponse> {
    let players = state
        .roster
        .scored()
        .into_iter()
        .map(PlayerSummary::from)
        .collect();

    Json(PlayersResponse { players })
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::state::AppState;
    use crate::config::AppConfig;
    use crate::models::{PlayerRecord, PlayerStats};
    use crate::roster::Roster;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn test_list_players_includes_score() {
        let tmp = tempfile::tempdir().unwrap();
        let roster = Roster::new(vec![
            PlayerRecord::new("1", "Niko", PlayerStats::new(0.5, 1.5, 1000.0, 10.0))
                .with_rank("Diamond")
                .with_team("SRD"),
            PlayerRecord::new("2", "Eny", PlayerStats::new(0.6, 2.0, 1650.0, 15.2)),
        ])
        .unwrap();
        let config = AppConfig {
            data_dir: tmp.path().to_path_buf(),
            ..AppConfig::default()
        };
        let app = build_router(AppState::new(config, roster));

        let resp = app
            .oneshot(Request::builder().uri("/api/players").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        let players = json["players"].as_array().unwrap();

        assert_eq!(players.len(), 2);
        assert_eq!(players[0]["name"], "Niko");
        assert_eq!(players[0]["rank"], "Diamond");
        assert!((players[0]["calculatedScore"].as_f64().unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(players[1]["stats"]["avgDamage"], 1650.0);
    }
}
