use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{PlayerDocument, SearchHit, NAME_FIELD};
use crate::store::PlayerQuery;

use super::decode_views;

/// Autocomplete results returned when `limit` is missing or unusable.
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<String>,
}

/// Parse the `limit` query value, falling back to the default for anything
/// missing, non-numeric or below 1.
pub fn parse_limit(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n >= 1)
        .map_or(DEFAULT_SEARCH_LIMIT, |n| u32::try_from(n).unwrap_or(u32::MAX))
}

/// Case-insensitive substring search on player names.
///
/// `q` is handed to the store as a pattern without escaping, so `.` and `*`
/// act as wildcards.
pub async fn search_players(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let pattern = params.q.unwrap_or_default();
    if pattern.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }

    let store = state.store()?;
    let query = PlayerQuery::new()
        .matches(NAME_FIELD, pattern)
        .project(&[NAME_FIELD])
        .limit(parse_limit(params.limit.as_deref()));

    let docs = store.find(&query).await?;
    Ok(Json(decode_views::<SearchHit>(&docs, "search")))
}

/// Full record for an exact name match.
pub async fn get_player(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PlayerDocument>, ApiError> {
    let store = state.store()?;
    match store.find_by_name(&name).await? {
        Some(player) => Ok(Json(player)),
        None => Err(ApiError::NotFound { player_name: name }),
    }
}
