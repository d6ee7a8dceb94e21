//! Recipe Record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Entity, RecordId};
use super::schema::{FieldKind, FieldSpec, Schema, SortOrder};

pub static RECIPE_SCHEMA: Schema = Schema {
    table: "recipes",
    noun: "recipe",
    plural: "recipes",
    title: "Recipe",
    title_plural: "Recipes",
    order: SortOrder::descending("created_at"),
    upload_prefix: Some("recipe"),
    admin_empty_state: "No recipes yet. Add your first recipe above!",
    fields: &[
        FieldSpec::new("title", "Recipe Title", FieldKind::Text)
            .required()
            .placeholder("e.g., Classic Margherita Pizza"),
        FieldSpec::new("category", "Category", FieldKind::Text)
            .required()
            .placeholder("e.g., Italian, Asian"),
        FieldSpec::new("cook_time", "Cook Time", FieldKind::Text)
            .required()
            .placeholder("e.g., 30 mins"),
        FieldSpec::new("servings", "Servings", FieldKind::Integer)
            .required()
            .placeholder("e.g., 4"),
        FieldSpec::new("description", "Description", FieldKind::LongText)
            .required()
            .placeholder("Brief description of the recipe"),
        FieldSpec::new("image_url", "Recipe Image", FieldKind::ImageUrl),
    ],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecordId,
    pub title: String,
    pub category: String,
    pub description: String,
    pub cook_time: String,
    pub servings: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Recipe {
    /// Image URL, treating an empty string as absent
    pub fn image(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.is_empty())
    }
}

impl Entity for Recipe {
    fn id(&self) -> RecordId {
        self.id
    }

    fn schema() -> &'static Schema {
        &RECIPE_SCHEMA
    }
}
