//! Blog Post Record
//!
//! Ordered by publication `date` rather than creation time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Entity, RecordId};
use super::schema::{FieldDefault, FieldKind, FieldSpec, Schema, SortOrder};

pub static BLOG_POST_SCHEMA: Schema = Schema {
    table: "blog_posts",
    noun: "blog post",
    plural: "blog posts",
    title: "Blog Post",
    title_plural: "Blog Posts",
    order: SortOrder::descending("date"),
    upload_prefix: Some("blog"),
    admin_empty_state: "No blog posts yet. Add your first post above!",
    fields: &[
        FieldSpec::new("title", "Post Title", FieldKind::Text)
            .required()
            .placeholder("e.g., 10 Essential Kitchen Tools for Home Cooks"),
        FieldSpec::new("date", "Date", FieldKind::Date)
            .required()
            .default_to(FieldDefault::Today),
        FieldSpec::new("author", "Author", FieldKind::Text)
            .required()
            .placeholder("e.g., Admin")
            .default_to(FieldDefault::Literal("Admin")),
        FieldSpec::new("excerpt", "Excerpt", FieldKind::LongText)
            .required()
            .placeholder("Short summary that appears on the blog listing (1-2 sentences)"),
        FieldSpec::new("content", "Full Content", FieldKind::LongText)
            .placeholder("Full blog post content (optional)"),
        FieldSpec::new("image_url", "Featured Image", FieldKind::ImageUrl),
    ],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: RecordId,
    pub title: String,
    pub excerpt: String,
    #[serde(default)]
    pub content: Option<String>,
    pub date: NaiveDate,
    pub author: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl BlogPost {
    /// Long-form date as shown on the blog, e.g. "November 1, 2025"
    pub fn display_date(&self) -> String {
        self.date.format("%B %-d, %Y").to_string()
    }

    pub fn image(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn body(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }
}

impl Entity for BlogPost {
    fn id(&self) -> RecordId {
        self.id
    }

    fn schema() -> &'static Schema {
        &BLOG_POST_SCHEMA
    }
}
