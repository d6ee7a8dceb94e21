//! Manager Layer
//!
//! One generic [`ResourceManager`] per collection owns the loaded records,
//! the single shared edit form, transient notices and the image upload step.

mod resource_manager;
mod state;
mod upload;

#[cfg(test)]
mod tests;

pub use resource_manager::{ManagerSettings, ResourceManager};
pub use state::{EditingTarget, FormState, ManagerSnapshot, Notice, NoticeKind, UploadState};
pub use upload::{storage_key, SelectedFile, UploadCoordinator, UploadTicket};
