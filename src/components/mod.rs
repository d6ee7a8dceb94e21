//! UI Components
//!
//! Reusable Leptos components.

mod card_grid;
mod delete_confirm_button;
mod form_field;
mod image_field;
mod notice_banner;
mod public_site;
mod resource_panel;

pub use card_grid::{CardActions, CardGrid};
pub use delete_confirm_button::DeleteConfirmButton;
pub use form_field::FormField;
pub use image_field::ImageField;
pub use notice_banner::NoticeBanner;
pub use public_site::PublicSite;
pub use resource_panel::ResourcePanel;
