use axum::extract::State;
use axum::Json;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::MonitoringEntry;
use crate::monitoring::{MonitoringSummary, Thresholds};

/// Canonical monitoring entries, oldest first.
pub async fn list_entries(
    State(state): State<AppState>,
) -> Result<Json<Vec<MonitoringEntry>>, ApiError> {
    let entries = state.monitoring.lock().await.load()?;
    Ok(Json(entries))
}

pub async fn summary(State(state): State<AppState>) -> Result<Json<MonitoringSummary>, ApiError> {
    let entries = state.monitoring.lock().await.load()?;
    let thresholds = Thresholds::from(&state.config.monitoring);
    Ok(Json(MonitoringSummary::from_entries(&entries, thresholds)))
}
