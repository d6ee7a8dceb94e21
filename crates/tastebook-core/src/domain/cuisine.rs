//! Cuisine Record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Entity, RecordId};
use super::schema::{FieldKind, FieldSpec, Schema, SortOrder};

pub static CUISINE_SCHEMA: Schema = Schema {
    table: "cuisines",
    noun: "cuisine",
    plural: "cuisines",
    title: "Cuisine",
    title_plural: "Cuisines",
    order: SortOrder::descending("created_at"),
    upload_prefix: None,
    admin_empty_state: "No cuisines yet. Add your first cuisine above!",
    fields: &[
        FieldSpec::new("name", "Cuisine Name", FieldKind::Text)
            .required()
            .placeholder("e.g., Italian, Asian, Mexican"),
        FieldSpec::new("description", "Description", FieldKind::LongText)
            .required()
            .placeholder("Brief description of the cuisine"),
        FieldSpec::new("flag_emoji", "Flag Emoji", FieldKind::Text)
            .max_chars(10)
            .placeholder("e.g., 🇮🇹 🇨🇳 🇲🇽"),
    ],
};

/// A cuisine shown on the public site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cuisine {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub flag_emoji: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Cuisine {
    /// Name prefixed with the flag, when there is one
    pub fn display_name(&self) -> String {
        match self.flag_emoji.as_deref().filter(|f| !f.trim().is_empty()) {
            Some(flag) => format!("{} {}", flag, self.name),
            None => self.name.clone(),
        }
    }
}

impl Entity for Cuisine {
    fn id(&self) -> RecordId {
        self.id
    }

    fn schema() -> &'static Schema {
        &CUISINE_SCHEMA
    }
}
