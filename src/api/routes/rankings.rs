//! Top-N ranking endpoints.
//!
//! Every ranking drops players whose ranked field is absent or null rather
//! than sorting them as zero.

use axum::extract::State;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::rank_defenders;
use crate::models::{
    AssistEntry, DefenderEntry, DefenderLine, GoalkeeperEntry, ScorerEntry, TouchesEntry,
    CUTOUT_FIELD, DEFENSIVE_POSITIONS, NAME_FIELD, POSITION_FIELD,
};
use crate::store::PlayerQuery;

use super::decode_views;

/// Entries returned by every ranking.
pub const TOP_N: u32 = 20;

/// Defenders need strictly more attempted tackles than this to qualify.
pub const MIN_DEFENDER_TACKLES: i64 = 20;

/// Store-side top-N by a single numeric field.
async fn top_by<T: DeserializeOwned>(
    state: &AppState,
    field: &'static str,
) -> Result<Vec<T>, ApiError> {
    let store = state.store()?;
    let query = PlayerQuery::new()
        .exists(field)
        .project(&[NAME_FIELD, CUTOUT_FIELD, field])
        .sort_desc(field)
        .limit(TOP_N);

    let docs = store.find(&query).await?;
    tracing::debug!("Ranking by {} returned {} players", field, docs.len());

    Ok(decode_views(&docs, field))
}

pub async fn top_scorers(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScorerEntry>>, ApiError> {
    top_by(&state, "Gls").await.map(Json)
}

pub async fn top_goalkeepers(
    State(state): State<AppState>,
) -> Result<Json<Vec<GoalkeeperEntry>>, ApiError> {
    top_by(&state, "CS").await.map(Json)
}

pub async fn top_touches(
    State(state): State<AppState>,
) -> Result<Json<Vec<TouchesEntry>>, ApiError> {
    top_by(&state, "Touches").await.map(Json)
}

pub async fn top_assists(
    State(state): State<AppState>,
) -> Result<Json<Vec<AssistEntry>>, ApiError> {
    top_by(&state, "Ast").await.map(Json)
}

/// Defenders by tackle efficiency.
///
/// Efficiency is derived, so all qualifying defenders are fetched and the
/// sort and cap happen here.
pub async fn top_defenders(
    State(state): State<AppState>,
) -> Result<Json<Vec<DefenderEntry>>, ApiError> {
    let store = state.store()?;
    let query = PlayerQuery::new()
        .one_of(POSITION_FIELD, DEFENSIVE_POSITIONS)
        .greater_than("Tkl", MIN_DEFENDER_TACKLES)
        .exists("TklW")
        .project(&[NAME_FIELD, CUTOUT_FIELD, "Tkl", "TklW", POSITION_FIELD]);

    let docs = store.find(&query).await?;
    let lines = decode_views::<DefenderLine>(&docs, "top-defensas");

    Ok(Json(rank_defenders(lines, TOP_N as usize)))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::state::AppState;
    use crate::models::PlayerDocument;
    use crate::store::{MemoryPlayerStore, StoreHandle};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn app_with(players: Vec<Value>) -> axum::Router {
        let docs = players
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => PlayerDocument::new(map),
                _ => panic!("expected object"),
            })
            .collect();
        let store = Arc::new(MemoryPlayerStore::new(docs));
        build_router(AppState::new(StoreHandle::ready(store)))
    }

    fn field_values(json: &Value, field: &str) -> Vec<f64> {
        json.as_array()
            .unwrap()
            .iter()
            .map(|v| v[field].as_f64().unwrap())
            .collect()
    }

    fn assert_non_increasing(values: &[f64]) {
        assert!(values.windows(2).all(|w| w[0] >= w[1]), "{:?}", values);
    }

    #[tokio::test]
    async fn test_top_scorers_shape_and_order() {
        let app = app_with(vec![
            json!({"strPlayer": "A", "strCutout": "a.png", "Gls": 4, "Ast": 2}),
            json!({"strPlayer": "B", "strCutout": "b.png", "Gls": 11}),
            json!({"strPlayer": "C", "strCutout": "c.png", "Gls": null}),
            json!({"strPlayer": "D", "strCutout": "d.png"}),
            json!({"strPlayer": "E", "strCutout": "e.png", "Gls": 0}),
        ]);

        let (status, json) = get_json(app, "/api/top-goleadores").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!([
                {"strPlayer": "B", "strCutout": "b.png", "Gls": 11},
                {"strPlayer": "A", "strCutout": "a.png", "Gls": 4},
                {"strPlayer": "E", "strCutout": "e.png", "Gls": 0},
            ])
        );
    }

    #[tokio::test]
    async fn test_rankings_cap_at_twenty() {
        let players: Vec<Value> = (0..35)
            .map(|i| {
                json!({
                    "strPlayer": format!("P{}", i),
                    "strCutout": "x.png",
                    "Gls": i % 7,
                    "CS": i,
                    "Touches": 1000 + i,
                    "Ast": 35 - i,
                })
            })
            .collect();

        for (uri, field) in [
            ("/api/top-goleadores", "Gls"),
            ("/api/top-goleros", "CS"),
            ("/api/top-touches", "Touches"),
            ("/api/top-asistidores", "Ast"),
        ] {
            let (status, json) = get_json(app_with(players.clone()), uri).await;
            assert_eq!(status, StatusCode::OK);
            let values = field_values(&json, field);
            assert_eq!(values.len(), 20, "{}", uri);
            assert_non_increasing(&values);
        }
    }

    #[tokio::test]
    async fn test_goalkeepers_exclude_missing() {
        let app = app_with(vec![
            json!({"strPlayer": "Keeper", "strCutout": "k.png", "CS": 9}),
            json!({"strPlayer": "Striker", "strCutout": "s.png", "Gls": 9}),
        ]);

        let (_, json) = get_json(app, "/api/top-goleros").await;
        assert_eq!(json, json!([{"strPlayer": "Keeper", "strCutout": "k.png", "CS": 9}]));
    }

    #[tokio::test]
    async fn test_touches_and_assists_shapes() {
        let app = app_with(vec![json!({
            "strPlayer": "Mid",
            "strCutout": "m.png",
            "Touches": 2100,
            "Ast": 8,
            "Gls": 2,
        })]);

        let (_, json) = get_json(app.clone(), "/api/top-touches").await;
        assert_eq!(json, json!([{"strPlayer": "Mid", "strCutout": "m.png", "Touches": 2100}]));

        let (_, json) = get_json(app, "/api/top-asistidores").await;
        assert_eq!(json, json!([{"strPlayer": "Mid", "strCutout": "m.png", "Ast": 8}]));
    }

    #[tokio::test]
    async fn test_empty_collection_returns_empty_arrays() {
        for uri in [
            "/api/top-goleadores",
            "/api/top-goleros",
            "/api/top-defensas",
            "/api/top-touches",
            "/api/top-asistidores",
        ] {
            let (status, json) = get_json(app_with(vec![]), uri).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json, json!([]));
        }
    }

    #[tokio::test]
    async fn test_mixed_type_record_does_not_fail_ranking() {
        let app = app_with(vec![
            json!({"strPlayer": "A", "strCutout": "a", "Gls": 9}),
            json!({"strPlayer": "B", "strCutout": 7, "Gls": 3}),
            json!({"strPlayer": "C", "strCutout": "c", "Gls": "many"}),
        ]);

        let (status, json) = get_json(app, "/api/top-goleadores").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!([
                {"strPlayer": "A", "strCutout": "a", "Gls": 9},
                {"strPlayer": "B", "strCutout": 7, "Gls": 3},
            ])
        );
    }

    #[tokio::test]
    async fn test_defenders_skip_undecodable_row() {
        let app = app_with(vec![
            json!({"strPlayer": "A", "strCutout": null, "strPosition": "Center-Back", "Tkl": 25, "TklW": 10}),
            json!({"strPlayer": "Odd", "strPosition": "Left-Back", "Tkl": 30, "TklW": "n/a"}),
        ]);

        let (status, json) = get_json(app, "/api/top-defensas").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!([{
                "strPlayer": "A",
                "strCutout": null,
                "tackleEfficiency": "40.00",
                "Tkl": 25,
                "TklW": 10,
                "strPosition": "Center-Back",
            }])
        );
    }

    #[tokio::test]
    async fn test_top_defenders() {
        let app = app_with(vec![
            json!({"strPlayer": "A", "strCutout": "a.png", "strPosition": "Center-Back", "Tkl": 25, "TklW": 10}),
            json!({"strPlayer": "B", "strCutout": "b.png", "strPosition": "Left-Back", "Tkl": 21, "TklW": 21}),
            json!({"strPlayer": "Edge", "strPosition": "Center-Back", "Tkl": 20, "TklW": 20}),
            json!({"strPlayer": "Mid", "strPosition": "Defensive Midfield", "Tkl": 60, "TklW": 50}),
            json!({"strPlayer": "NoWon", "strPosition": "Right-Back", "Tkl": 40}),
            json!({"strPlayer": "NullWon", "strPosition": "Right-Back", "Tkl": 40, "TklW": null}),
        ]);

        let (status, json) = get_json(app, "/api/top-defensas").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!([
                {
                    "strPlayer": "B",
                    "strCutout": "b.png",
                    "tackleEfficiency": "100.00",
                    "Tkl": 21,
                    "TklW": 21,
                    "strPosition": "Left-Back",
                },
                {
                    "strPlayer": "A",
                    "strCutout": "a.png",
                    "tackleEfficiency": "40.00",
                    "Tkl": 25,
                    "TklW": 10,
                    "strPosition": "Center-Back",
                },
            ])
        );
    }

    #[tokio::test]
    async fn test_top_defenders_examines_all_then_caps() {
        // The best defenders come last in store order.
        let players: Vec<Value> = (0..40)
            .map(|i| {
                json!({
                    "strPlayer": format!("D{}", i),
                    "strPosition": "Right-Back",
                    "Tkl": 50,
                    "TklW": i,
                })
            })
            .collect();

        let (_, json) = get_json(app_with(players), "/api/top-defensas").await;
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[0]["strPlayer"], "D39");
        assert_eq!(rows[0]["tackleEfficiency"], "78.00");

        let efficiencies: Vec<f64> = rows
            .iter()
            .map(|r| r["tackleEfficiency"].as_str().unwrap().parse().unwrap())
            .collect();
        assert_non_increasing(&efficiencies);
    }
}
