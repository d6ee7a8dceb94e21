//! Domain Layer
//!
//! Records, their schema descriptors and the editable form draft.
//! Nothing in here talks to the network.

mod blog_post;
mod cuisine;
mod draft;
mod entity;
mod error;
mod recipe;
mod schema;

pub use blog_post::{BlogPost, BLOG_POST_SCHEMA};
pub use cuisine::{Cuisine, CUISINE_SCHEMA};
pub use draft::{parse_leading_int, FormDraft};
pub use entity::{decode_rows, Entity, RecordId};
pub use error::{CmsError, CmsResult, GatewayError, GatewayResult};
pub use recipe::{Recipe, RECIPE_SCHEMA};
pub use schema::{FieldDefault, FieldKind, FieldSpec, Schema, SortOrder};
