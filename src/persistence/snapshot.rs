//! Snapshot record format
//!
//! A snapshot is a JSON array of records:
//! `[{"text": "...", "x": 10, "y": 20, "vx": 1.5, "vy": -2, "visualVariant": "piano-black"}]`
//! Every field except `text` is optional; absent fields are re-rolled on restore.

use serde::{Deserialize, Deserializer, Serialize};

use super::PersistError;
use crate::sim::{Idea, IdeaId, Variant};

/// One serialized idea
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<IdeaId>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vx: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vy: Option<f32>,
    #[serde(
        default,
        alias = "currentModeClass",
        deserialize_with = "variant_from_class",
        skip_serializing_if = "Option::is_none"
    )]
    pub visual_variant: Option<Variant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
}

impl IdeaRecord {
    /// Full record of a live idea
    pub fn from_idea(idea: &Idea) -> Self {
        Self {
            id: Some(idea.id.clone()),
            text: idea.text().to_string(),
            x: Some(idea.pos.x),
            y: Some(idea.pos.y),
            vx: Some(idea.vel.x),
            vy: Some(idea.vel.y),
            visual_variant: Some(idea.variant),
            font_size: idea.font_size(),
        }
    }

    /// Both coordinates present and usable
    pub fn position(&self) -> Option<(f32, f32)> {
        match (self.x, self.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
            _ => None,
        }
    }

    /// Both velocity components present and usable
    pub fn velocity(&self) -> Option<(f32, f32)> {
        match (self.vx, self.vy) {
            (Some(vx), Some(vy)) if vx.is_finite() && vy.is_finite() => Some((vx, vy)),
            _ => None,
        }
    }
}

// Accepts "piano-black", a whole class list, an empty string or null
fn variant_from_class<'de, D>(deserializer: D) -> Result<Option<Variant>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Variant::from_class_list))
}

pub fn encode_snapshot(records: &[IdeaRecord]) -> Result<String, PersistError> {
    serde_json::to_string(records).map_err(PersistError::Encode)
}

/// Decode a snapshot blob. A blob that isn't a JSON array is an error;
/// individual unreadable entries are dropped with a warning.
pub fn decode_snapshot(blob: &str) -> Result<Vec<IdeaRecord>, PersistError> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(blob).map_err(PersistError::Decode)?;
    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<IdeaRecord>(entry) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping unreadable snapshot entry {}: {}", index, e),
        }
    }
    Ok(records)
}
