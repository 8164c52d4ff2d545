//! Player documents and the typed ranking views read out of them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Field holding the player's full name.
pub const NAME_FIELD: &str = "strPlayer";
pub const CUTOUT_FIELD: &str = "strCutout";
pub const POSITION_FIELD: &str = "strPosition";

/// Positions that count as defenders for the tackle ranking.
pub const DEFENSIVE_POSITIONS: [&str; 3] = ["Center-Back", "Left-Back", "Right-Back"];

/// One player record exactly as the store holds it.
///
/// Field presence is heterogeneous: any statistic may be missing or null.
/// Typed access goes through [`PlayerDocument::view`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerDocument(Map<String, Value>);

impl PlayerDocument {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// True when the field is present and not null.
    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_some_and(|v| !v.is_null())
    }

    pub fn name(&self) -> Option<&str> {
        self.get(NAME_FIELD).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Keep only the listed fields.
    pub fn project(self, fields: &[&str]) -> Self {
        Self(
            self.0
                .into_iter()
                .filter(|(k, _)| fields.contains(&k.as_str()))
                .collect(),
        )
    }

    /// Deserialize a typed view over this document.
    pub fn view<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }
}

impl From<Map<String, Value>> for PlayerDocument {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Passthrough field: absent stays `None`, anything present (null included)
/// is kept as stored.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Autocomplete result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(
        rename = "strPlayer",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub str_player: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerEntry {
    #[serde(
        rename = "strPlayer",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub str_player: Option<Value>,
    #[serde(
        rename = "strCutout",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub str_cutout: Option<Value>,
    #[serde(rename = "Gls")]
    pub gls: Number,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalkeeperEntry {
    #[serde(
        rename = "strPlayer",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub str_player: Option<Value>,
    #[serde(
        rename = "strCutout",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub str_cutout: Option<Value>,
    #[serde(rename = "CS")]
    pub cs: Number,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchesEntry {
    #[serde(
        rename = "strPlayer",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub str_player: Option<Value>,
    #[serde(
        rename = "strCutout",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub str_cutout: Option<Value>,
    #[serde(rename = "Touches")]
    pub touches: Number,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistEntry {
    #[serde(
        rename = "strPlayer",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub str_player: Option<Value>,
    #[serde(
        rename = "strCutout",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub str_cutout: Option<Value>,
    #[serde(rename = "Ast")]
    pub ast: Number,
}

/// A defender row as fetched, before efficiency is derived.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DefenderLine {
    #[serde(rename = "strPlayer", default, deserialize_with = "present")]
    pub str_player: Option<Value>,
    #[serde(rename = "strCutout", default, deserialize_with = "present")]
    pub str_cutout: Option<Value>,
    #[serde(rename = "Tkl")]
    pub tkl: Number,
    #[serde(rename = "TklW")]
    pub tkl_w: Number,
    #[serde(rename = "strPosition")]
    pub str_position: String,
}

/// A ranked defender.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefenderEntry {
    #[serde(rename = "strPlayer", skip_serializing_if = "Option::is_none")]
    pub str_player: Option<Value>,
    #[serde(rename = "strCutout", skip_serializing_if = "Option::is_none")]
    pub str_cutout: Option<Value>,
    /// Two-decimal percentage, e.g. `"40.00"`.
    #[serde(rename = "tackleEfficiency")]
    pub tackle_efficiency: String,
    #[serde(rename = "Tkl")]
    pub tkl: Number,
    #[serde(rename = "TklW")]
    pub tkl_w: Number,
    #[serde(rename = "strPosition")]
    pub str_position: String,
}
