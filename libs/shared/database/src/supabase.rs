use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;

/// `column=eq.value` filter with the value URL-encoded.
pub fn eq(column: &str, value: &str) -> String {
    format!("{}=eq.{}", column, urlencoding::encode(value))
}

/// `id=in.(a,b,c)` filter.
pub fn in_list(column: &str, ids: &[Uuid]) -> String {
    let joined = ids
        .iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("{}=in.({})", column, joined)
}

/// A write rejected by a unique constraint (HTTP 409 or Postgres code 23505).
#[derive(Debug, thiserror::Error)]
#[error("Store conflict: {0}")]
pub struct StoreConflict(pub String);

/// Whether a store error was a unique-constraint violation.
pub fn is_conflict(err: &anyhow::Error) -> bool {
    err.downcast_ref::<StoreConflict>().is_some()
}

/// Thin PostgREST client used as the document store by every cell.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.service_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.service_key))?,
        );

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Store error ({}): {}", status, error_text);

            if status.as_u16() == 409 || error_text.contains("23505") {
                return Err(StoreConflict(error_text).into());
            }

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Store authentication error: {}", error_text),
                404 => anyhow!("Store resource not found: {}", error_text),
                _ => anyhow!("Store error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    fn representation() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    /// Rows of `table` matching every filter.
    pub async fn select<T>(&self, table: &str, filters: &[String]) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let path = if filters.is_empty() {
            format!("/rest/v1/{}", table)
        } else {
            format!("/rest/v1/{}?{}", table, filters.join("&"))
        };

        self.request(Method::GET, &path, None).await
    }

    pub async fn select_by_id<T>(&self, table: &str, id: Uuid) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let rows: Vec<T> = self.select(table, &[eq("id", &id.to_string())]).await?;
        Ok(rows.into_iter().next())
    }

    /// Rows whose id is in `ids`. Ids without a row are silently absent.
    pub async fn select_by_ids<T>(&self, table: &str, ids: &[Uuid]) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.select(table, &[in_list("id", ids)]).await
    }

    pub async fn insert<T>(&self, table: &str, row: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}", table);
        let result: Vec<T> = self
            .request_with_headers(Method::POST, &path, Some(row), Some(Self::representation()))
            .await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Store returned no row for insert into {}", table))
    }

    pub async fn update_by_id<T>(&self, table: &str, id: Uuid, changes: Value) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}?{}", table, eq("id", &id.to_string()));
        let result: Vec<T> = self
            .request_with_headers(Method::PATCH, &path, Some(changes), Some(Self::representation()))
            .await?;

        Ok(result.into_iter().next())
    }

    pub async fn delete_by_id<T>(&self, table: &str, id: Uuid) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}?{}", table, eq("id", &id.to_string()));
        let result: Vec<T> = self
            .request_with_headers(Method::DELETE, &path, None, Some(Self::representation()))
            .await?;

        Ok(result.into_iter().next())
    }

    /// Atomically append `reference` to the uuid list `column` of one row.
    /// Returns the updated row, or `None` when the row does not exist.
    pub async fn push_reference<T>(
        &self,
        table: &str,
        id: Uuid,
        column: &str,
        reference: Uuid,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        debug!("Pushing {} onto {}.{} of {}", reference, table, column, id);
        self.reference_rpc("push_reference", table, id, column, reference).await
    }

    /// Atomically remove every occurrence of `reference` from the uuid list `column`.
    pub async fn pull_reference<T>(
        &self,
        table: &str,
        id: Uuid,
        column: &str,
        reference: Uuid,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        debug!("Pulling {} from {}.{} of {}", reference, table, column, id);
        self.reference_rpc("pull_reference", table, id, column, reference).await
    }

    async fn reference_rpc<T>(
        &self,
        function: &str,
        table: &str,
        id: Uuid,
        column: &str,
        reference: Uuid,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/rpc/{}", function);
        let body = json!({
            "target_table": table,
            "target_id": id,
            "target_column": column,
            "reference": reference,
        });

        self.request(Method::POST, &path, Some(body)).await
    }
}
