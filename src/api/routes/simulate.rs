use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::balance::balance_teams;
use crate::calculate::assess_balance;
use crate::models::{BalanceAssessment, TeamAssignment};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub selected_player_ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    #[serde(flatten)]
    pub assignment: TeamAssignment,
    pub assessment: BalanceAssessment,
}

pub async fn simulate(
    State(state): State<AppState>,
    Json(request): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let selection = request
        .selected_player_ids
        .ok_or_else(|| ApiError::BadRequest("selectedPlayerIds is required".to_string()))?;

    let assignment = balance_teams(
        &state.roster,
        &selection,
        state.config.balancing.options(),
    )?;
    let assessment = assess_balance(assignment.diff);

    info!(
        "Balanced {} players: pA {:.4}, diff {:.4} ({})",
        assignment.player_count(),
        assignment.p_a,
        assignment.diff,
        assessment.quality
    );

    if state.config.balancing.log_results {
        let log = state.monitoring.lock().await;
        if let Err(e) = log.record(&assignment) {
            warn!("Failed to record monitoring entry: {}", e);
        }
    }

    Ok(Json(SimulateResponse {
        assignment,
        assessment,
    }))
}
