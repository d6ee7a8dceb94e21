//! REST Gateway
//!
//! Speaks the PostgREST table conventions and the storage object API:
//! - `GET    /rest/v1/{table}?select=*&order={field}.{asc|desc}`
//! - `POST   /rest/v1/{table}` with `Prefer: return=representation`
//! - `PATCH  /rest/v1/{table}?id=eq.{id}`
//! - `DELETE /rest/v1/{table}?id=eq.{id}`
//! - `POST   /storage/v1/object/{bucket}/{key}`, public at
//!   `/storage/v1/object/public/{bucket}/{key}`

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use super::traits::{Gateway, Row};
use crate::config::CmsConfig;
use crate::domain::{GatewayError, GatewayResult, RecordId, SortOrder};

/// Characters escaped inside a single path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub struct RestGateway {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestGateway {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &CmsConfig) -> Self {
        Self::new(config.api_url.clone(), config.api_key.clone())
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, encode(table))
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, encode(bucket), encode(key))
    }

    /// Publicly addressable URL of a stored object
    pub fn public_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            encode(bucket),
            encode(key)
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

/// Pull the human-readable message out of an error body
fn error_message(status: u16, body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let message = parsed.as_ref().and_then(|v| {
        ["message", "error_description", "error", "msg"]
            .iter()
            .find_map(|key| v.get(key).and_then(Value::as_str))
            .map(str::to_string)
    });
    match message {
        Some(msg) => msg,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => format!("request failed with status {}", status),
    }
}

async fn check(response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(status.as_u16(), &body);
    if status.as_u16() == 404 {
        Err(GatewayError::NotFound(message))
    } else {
        Err(GatewayError::Rejected(message))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Gateway for RestGateway {
    async fn fetch_all(&self, table: &str, order: SortOrder) -> GatewayResult<Vec<Row>> {
        let direction = if order.ascending { "asc" } else { "desc" };
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*".to_string()), ("order", format!("{}.{}", order.field, direction))]);
        let response = check(self.authorized(request).send().await.map_err(transport)?).await?;
        response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn insert(&self, table: &str, row: Row) -> GatewayResult<Row> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&[row]);
        let response = check(self.authorized(request).send().await.map_err(transport)?).await?;
        let mut rows = response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        if rows.is_empty() {
            return Err(GatewayError::Decode(format!("insert into {} returned no row", table)));
        }
        Ok(rows.swap_remove(0))
    }

    async fn update(&self, table: &str, id: RecordId, patch: Row) -> GatewayResult<()> {
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{}", id))])
            .json(&patch);
        check(self.authorized(request).send().await.map_err(transport)?).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, id: RecordId) -> GatewayResult<()> {
        let request = self
            .client
            .delete(self.table_url(table))
            .query(&[("id", format!("eq.{}", id))]);
        check(self.authorized(request).send().await.map_err(transport)?).await?;
        Ok(())
    }

    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> GatewayResult<String> {
        let request = self
            .client
            .post(self.object_url(bucket, key))
            .header("Content-Type", content_type.unwrap_or("application/octet-stream"))
            .header("x-upsert", "false")
            .body(bytes);
        check(self.authorized(request).send().await.map_err(transport)?).await?;
        Ok(self.public_url(bucket, key))
    }
}
