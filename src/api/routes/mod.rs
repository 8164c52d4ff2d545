//! Route handlers.

pub mod players;
pub mod rankings;

use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::PlayerDocument;

#[derive(Debug, Serialize)]
pub struct HelloResponse {
    pub message: &'static str,
}

pub async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello from Express backend!",
    })
}

/// Decode each document into its response view. A document that does not fit
/// the view is skipped with a warning so the rest of the list still returns.
pub(crate) fn decode_views<T: DeserializeOwned>(
    docs: &[PlayerDocument],
    endpoint: &str,
) -> Vec<T> {
    docs.iter()
        .filter_map(|doc| match doc.view::<T>() {
            Ok(view) => Some(view),
            Err(e) => {
                tracing::warn!(
                    "{}: skipping player {:?}: {}",
                    endpoint,
                    doc.name().unwrap_or("<unnamed>"),
                    e
                );
                None
            }
        })
        .collect()
}
