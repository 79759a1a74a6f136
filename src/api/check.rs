use axum::{ extract::State, Json };

use crate::error::Result;
use crate::services::CycleReport;

use super::AppState;

/// Manual trigger for one check cycle. The scheduler calls the same
/// engine; callers are expected not to overlap invocations.
pub async fn run_check(State(state): State<AppState>) -> Result<Json<CycleReport>> {
    let report = state.engine.run_check_cycle().await?;
    Ok(Json(report))
}
