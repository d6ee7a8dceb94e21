//! In-Memory Gateway
//!
//! Keeps tables and objects in process memory. Ids and `created_at` are
//! assigned on insert the way the real backend does. Failures can be queued
//! per operation so callers can exercise their error paths.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use super::traits::{Gateway, Row};
use crate::domain::{GatewayError, GatewayResult, RecordId, SortOrder};

/// Gateway operations, used to queue failures and count calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchAll,
    Insert,
    Update,
    Delete,
    Upload,
}

#[derive(Default)]
struct Store {
    tables: HashMap<String, Vec<Row>>,
    objects: HashMap<(String, String), Vec<u8>>,
    next_id: i64,
    last_created: Option<DateTime<Utc>>,
    failures: HashMap<Operation, VecDeque<GatewayError>>,
    calls: HashMap<Operation, usize>,
}

impl Store {
    /// Record a call and pop a queued failure, if any
    fn enter(&mut self, op: Operation) -> GatewayResult<()> {
        *self.calls.entry(op).or_default() += 1;
        match self.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn allocate_id(&mut self) -> RecordId {
        self.next_id += 1;
        RecordId(self.next_id)
    }

    /// Strictly increasing creation time so ordering by it is total
    fn creation_time(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_created {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        self.last_created = Some(stamp);
        stamp
    }

    fn stamp(&mut self, mut row: Row) -> (Row, RecordId) {
        let id = match row.get("id").and_then(Value::as_i64) {
            Some(id) => {
                self.next_id = self.next_id.max(id);
                RecordId(id)
            }
            None => self.allocate_id(),
        };
        row.insert("id".to_string(), Value::from(id.0));
        if !matches!(row.get("created_at"), Some(Value::String(_))) {
            let created = self.creation_time();
            row.insert("created_at".to_string(), Value::String(created.to_rfc3339()));
        }
        (row, id)
    }
}

/// Process-local gateway
pub struct MemoryGateway {
    store: Mutex<Store>,
    public_base: String,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::with_public_base("memory://objects")
    }

    /// Public URLs are `<base>/<bucket>/<key>`
    pub fn with_public_base(base: impl Into<String>) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            public_base: base.into().trim_end_matches('/').to_string(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a row directly, bypassing failure injection. A row carrying
    /// an `id` keeps it; otherwise one is assigned.
    pub fn seed(&self, table: &str, row: Row) -> RecordId {
        let mut store = self.lock();
        let (row, id) = store.stamp(row);
        store.tables.entry(table.to_string()).or_default().push(row);
        id
    }

    /// Make the next call of `op` fail with a rejection carrying `message`
    pub fn fail_next(&self, op: Operation, message: impl Into<String>) {
        self.lock()
            .failures
            .entry(op)
            .or_default()
            .push_back(GatewayError::Rejected(message.into()));
    }

    /// Raw rows of `table` in insertion order
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.lock()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Keys stored in `bucket`, sorted
    pub fn object_keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .lock()
            .objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn call_count(&self, op: Operation) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }
}

fn row_id(row: &Row) -> Option<i64> {
    row.get("id").and_then(Value::as_i64)
}

/// Order JSON values: missing/null first, then numbers, then strings
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn sort_rows(rows: &mut [Row], order: SortOrder) {
    rows.sort_by(|a, b| {
        let ordering = compare_values(a.get(order.field), b.get(order.field))
            .then_with(|| row_id(a).cmp(&row_id(b)));
        if order.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Gateway for MemoryGateway {
    async fn fetch_all(&self, table: &str, order: SortOrder) -> GatewayResult<Vec<Row>> {
        let mut store = self.lock();
        store.enter(Operation::FetchAll)?;
        let mut rows = store.tables.get(table).cloned().unwrap_or_default();
        sort_rows(&mut rows, order);
        Ok(rows)
    }

    async fn insert(&self, table: &str, mut row: Row) -> GatewayResult<Row> {
        let mut store = self.lock();
        store.enter(Operation::Insert)?;
        row.remove("id");
        row.remove("created_at");
        let (row, _) = store.stamp(row);
        store.tables.entry(table.to_string()).or_default().push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, id: RecordId, patch: Row) -> GatewayResult<()> {
        let mut store = self.lock();
        store.enter(Operation::Update)?;
        let row = store
            .tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|row| row_id(row) == Some(id.0)))
            .ok_or_else(|| GatewayError::NotFound(format!("no row with id {} in {}", id, table)))?;
        for (key, value) in patch {
            if key != "id" && key != "created_at" {
                row.insert(key, value);
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, id: RecordId) -> GatewayResult<()> {
        let mut store = self.lock();
        store.enter(Operation::Delete)?;
        let rows = store.tables.entry(table.to_string()).or_default();
        let before = rows.len();
        rows.retain(|row| row_id(row) != Some(id.0));
        if rows.len() == before {
            return Err(GatewayError::NotFound(format!("no row with id {} in {}", id, table)));
        }
        Ok(())
    }

    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        _content_type: Option<&str>,
    ) -> GatewayResult<String> {
        let mut store = self.lock();
        store.enter(Operation::Upload)?;
        let slot = (bucket.to_string(), key.to_string());
        if store.objects.contains_key(&slot) {
            return Err(GatewayError::Rejected(format!("The resource already exists: {}", key)));
        }
        store.objects.insert(slot, bytes);
        Ok(format!("{}/{}/{}", self.public_base, bucket, key))
    }
}
