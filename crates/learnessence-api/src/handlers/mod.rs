//! HTTP handlers, one module per resource.

pub mod flashcards;
pub mod health;
pub mod notes;
pub mod stats;
pub mod summaries;
pub mod transcribe;

use axum::Json;
use serde::{Deserialize, Serialize};

use learnessence_core::Page;

use crate::auth::AuthUser;
use crate::ApiError;

/// `?userId&limit&offset` as accepted by every list route.
///
/// Values are kept as strings so malformed numbers produce a JSON 400
/// instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub user_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListQuery {
    /// Validate against the caller and resolve the page.
    ///
    /// A `userId` naming anyone but the caller is forbidden.
    pub fn page_for(&self, auth: &AuthUser) -> Result<Page, ApiError> {
        if let Some(user_id) = self.user_id.as_deref().filter(|u| !u.is_empty()) {
            if user_id != auth.user_id.to_string() {
                return Err(ApiError::Forbidden);
            }
        }
        let limit = parse_number(self.limit.as_deref(), "limit")?;
        let offset = parse_number(self.offset.as_deref(), "offset")?;
        Ok(Page::new(limit, offset)?)
    }
}

fn parse_number(raw: Option<&str>, name: &str) -> Result<Option<i64>, ApiError> {
    raw.filter(|v| !v.is_empty())
        .map(|v| {
            v.trim()
                .parse::<i64>()
                .map_err(|_| ApiError::BadRequest(format!("{} must be an integer", name)))
        })
        .transpose()
}

/// `{"success": true}` body returned by deletes.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

pub(crate) fn success() -> Json<SuccessResponse> {
    Json(SuccessResponse { success: true })
}

/// Treat blank strings as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
