//! Domain Layer - Core Record Trait
//!
//! Every managed collection stores records that carry a backend-assigned id
//! and describe themselves through a static [`Schema`].

use std::fmt;

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::Schema;
use crate::gateway::Row;

/// Opaque record identifier assigned by the backend on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId(value)
    }
}

/// Core trait for all managed records
///
/// Records round-trip through the gateway as JSON rows, so they must be
/// (de)serializable. The schema drives the form, ordering and notices.
pub trait Entity: Sized + Send + Sync + Clone + Serialize + DeserializeOwned + 'static {
    /// Returns the record's unique identifier
    fn id(&self) -> RecordId;

    /// Static description of this record's collection and fields
    fn schema() -> &'static Schema;
}

/// Decode raw gateway rows into typed records, preserving their order.
///
/// A row that doesn't decode is logged and skipped so one bad record can't
/// hide the rest of its collection.
pub fn decode_rows<R: Entity>(rows: Vec<Row>) -> Vec<R> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.get("id").cloned().unwrap_or(Value::Null);
            match serde_json::from_value(Value::Object(row)) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("skipping malformed {} row {}: {}", R::schema().noun, id, e);
                    None
                }
            }
        })
        .collect()
}
