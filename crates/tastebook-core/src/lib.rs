//! Tastebook Core
//!
//! Layered architecture:
//! - domain: records, schema descriptors and the editable form draft
//! - gateway: the remote collection/object store contract and its implementations
//! - manager: one generic resource manager per collection, with notices and uploads
//! - projection: read-only list rendering shared by the public site and the admin

pub mod config;
pub mod domain;
pub mod gateway;
pub mod manager;
pub mod projection;

pub use config::{CmsConfig, ConfigError};
pub use domain::{
    decode_rows, BlogPost, CmsError, CmsResult, Cuisine, Entity, FieldKind, FieldSpec, FormDraft,
    GatewayError, GatewayResult, Recipe, RecordId, Schema, SortOrder,
};
pub use gateway::{Gateway, MemoryGateway, Operation, RestGateway, Row};
pub use manager::{
    EditingTarget, FormState, ManagerSettings, ManagerSnapshot, Notice, NoticeKind,
    ResourceManager, SelectedFile, UploadCoordinator, UploadState, UploadTicket,
};
pub use projection::{list_header, project, Audience, Card, CardSource, ListView};
