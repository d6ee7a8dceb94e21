//! List View Projection
//!
//! Pure rendering model for a collection. The public pages and the admin
//! list share it; only the empty-state text and the `editable` flag differ.

use crate::domain::{BlogPost, Cuisine, Entity, Recipe, RecordId, Schema};

/// Who the list is rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Public,
    /// Cards carry edit/delete controls
    Admin,
}

/// One visual unit per record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: RecordId,
    pub heading: String,
    /// Small label above the heading: category, date
    pub badge: Option<String>,
    pub body: String,
    pub image_url: Option<String>,
    pub meta: Vec<String>,
    /// Long-form markdown shown below the card body
    pub detail: Option<String>,
    pub editable: bool,
}

/// How a record turns into a card
pub trait CardSource: Entity {
    fn card(&self) -> Card;
}

impl CardSource for Cuisine {
    fn card(&self) -> Card {
        Card {
            id: self.id,
            heading: self.display_name(),
            badge: None,
            body: self.description.clone(),
            image_url: None,
            meta: Vec::new(),
            detail: None,
            editable: false,
        }
    }
}

impl CardSource for Recipe {
    fn card(&self) -> Card {
        Card {
            id: self.id,
            heading: self.title.clone(),
            badge: Some(self.category.clone()),
            body: self.description.clone(),
            image_url: self.image().map(str::to_string),
            meta: vec![
                format!("⏱️ {}", self.cook_time),
                format!("👥 {} servings", self.servings),
            ],
            detail: None,
            editable: false,
        }
    }
}

impl CardSource for BlogPost {
    fn card(&self) -> Card {
        Card {
            id: self.id,
            heading: self.title.clone(),
            badge: Some(self.display_date()),
            body: self.excerpt.clone(),
            image_url: self.image().map(str::to_string),
            meta: vec![format!("By {}", self.author)],
            detail: self.body().map(str::to_string),
            editable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Loading(String),
    Empty(String),
    Cards(Vec<Card>),
}

impl ListView {
    pub fn cards(&self) -> &[Card] {
        match self {
            ListView::Cards(cards) => cards,
            _ => &[],
        }
    }
}

/// Render `records` in collection order.
///
/// While `loading` the list is never shown, even if records from an earlier
/// load are still held.
pub fn project<R: CardSource>(records: &[R], loading: bool, audience: Audience) -> ListView {
    let schema = R::schema();
    if loading {
        return ListView::Loading(schema.loading_placeholder());
    }
    if records.is_empty() {
        let message = match audience {
            Audience::Public => schema.public_empty_state(),
            Audience::Admin => schema.admin_empty_state.to_string(),
        };
        return ListView::Empty(message);
    }
    let editable = audience == Audience::Admin;
    ListView::Cards(
        records
            .iter()
            .map(|record| Card {
                editable,
                ..record.card()
            })
            .collect(),
    )
}

/// Admin list heading, e.g. "All Recipes (3)"
pub fn list_header(schema: &Schema, count: usize) -> String {
    format!("All {} ({})", schema.title_plural, count)
}
