//! Gateway Layer - Core Trait
//!
//! Rows travel as untyped JSON objects; typing happens in the domain layer,
//! which keeps this trait object-safe and shared by every collection.

use async_trait::async_trait;

use crate::domain::{GatewayResult, RecordId, SortOrder};

/// One backend row
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Remote collection and object store
///
/// All operations are async; none can be cancelled once issued.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Gateway: Send + Sync {
    /// Fetch every row of `table` in the given order
    async fn fetch_all(&self, table: &str, order: SortOrder) -> GatewayResult<Vec<Row>>;

    /// Insert a row without id; returns the stored row with its new id
    async fn insert(&self, table: &str, row: Row) -> GatewayResult<Row>;

    /// Overwrite the given fields of the row with `id`
    async fn update(&self, table: &str, id: RecordId, patch: Row) -> GatewayResult<()>;

    /// Delete the row with `id`
    async fn delete(&self, table: &str, id: RecordId) -> GatewayResult<()>;

    /// Store `bytes` under `key` and return its public URL
    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> GatewayResult<String>;
}
