use axum::extract::State;
use axum::Json;

use learnessence_core::UserStats;

use crate::auth::AuthUser;
use crate::{ApiError, AppState};

/// Dashboard counts for the caller.
pub async fn get_stats(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserStats>, ApiError> {
    let stats = state.stats.user_stats(auth.user_id).await?;
    Ok(Json(stats))
}
