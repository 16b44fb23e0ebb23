//! Supabase PostgREST client.
//!
//! Typed REST access to the project's tables:
//! - apikey plus bearer auth, using the signed-in user's access token
//! - HTTP client tuning (pooling, timeouts)
//! - Exponential backoff with jitter on reads

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;

use crate::error::{SupabaseError, SupabaseResult};
use crate::retry::RetryConfig;

// =============================================================================
// Configuration
// =============================================================================

/// Supabase client configuration.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// Project anon key, sent as `apikey` on every request
    pub anon_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
}

impl SupabaseConfig {
    /// Create config from environment variables.
    pub fn from_env() -> SupabaseResult<Self> {
        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| SupabaseError::auth_error("SUPABASE_URL must be set"))?;
        Url::parse(&url).map_err(|e| {
            SupabaseError::auth_error(format!("SUPABASE_URL is not a valid URL: {}", e))
        })?;

        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| SupabaseError::auth_error("SUPABASE_ANON_KEY must be set"))?;
        if anon_key.is_empty() {
            return Err(SupabaseError::auth_error("SUPABASE_ANON_KEY cannot be empty"));
        }

        let connect_timeout_secs: u64 = std::env::var("SUPABASE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryConfig::from_env(),
        })
    }
}

// =============================================================================
// Client
// =============================================================================

/// Supabase PostgREST client.
pub struct SupabaseClient {
    http: Client,
    config: SupabaseConfig,
    rest_url: String,
    access_token: Arc<RwLock<Option<String>>>,
}

impl Clone for SupabaseClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
            rest_url: self.rest_url.clone(),
            access_token: Arc::clone(&self.access_token),
        }
    }
}

impl SupabaseClient {
    /// Create a new Supabase client.
    pub fn new(config: SupabaseConfig) -> SupabaseResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("cmill-supabase/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SupabaseError::Network)?;

        let rest_url = format!("{}/rest/v1", config.url.trim_end_matches('/'));

        Ok(Self {
            http,
            config,
            rest_url,
            access_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> SupabaseResult<Self> {
        Self::new(SupabaseConfig::from_env()?)
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    /// Install or clear the signed-in user's access token.
    ///
    /// With no token the anon key doubles as the bearer, which is what
    /// row-level security expects for anonymous reads.
    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    async fn bearer(&self) -> String {
        self.access_token
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.config.anon_key.clone())
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    async fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer().await)
    }

    // =========================================================================
    // Table Operations
    // =========================================================================

    /// Fetch at most one row matching `column=eq.value` filters.
    ///
    /// An empty result set is `Ok(None)`: a missing row is data, not an
    /// error.
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, &str)],
    ) -> SupabaseResult<Option<T>> {
        let rows = self.select_rows(table, filters, None, Some(1), None).await?;
        Ok(rows.into_iter().next())
    }

    /// Fetch a page of rows.
    ///
    /// `order` uses PostgREST syntax, e.g. `created_at.desc`.
    pub async fn select_list<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, &str)],
        order: Option<&str>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> SupabaseResult<Vec<T>> {
        self.select_rows(table, filters, order, limit, offset).await
    }

    async fn select_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, &str)],
        order: Option<&str>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> SupabaseResult<Vec<T>> {
        let url = self.table_url(table);

        let mut query: Vec<(String, String)> = vec![("select".to_string(), "*".to_string())];
        for (column, value) in filters {
            query.push(((*column).to_string(), format!("eq.{}", value)));
        }
        if let Some(order) = order {
            query.push(("order".to_string(), order.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = offset {
            query.push(("offset".to_string(), offset.to_string()));
        }

        let response = self
            .authed(self.http.get(&url))
            .await
            .query(&query)
            .send()
            .await?;

        self.decode_rows(table, response).await
    }

    /// Insert one row and return it as stored.
    pub async fn insert<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        row: &T,
    ) -> SupabaseResult<R> {
        let url = self.table_url(table);

        let response = self
            .authed(self.http.post(&url))
            .await
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        let rows: Vec<R> = self.decode_rows(table, response).await?;
        rows.into_iter().next().ok_or_else(|| {
            SupabaseError::invalid_response(format!("insert into {} returned no row", table))
        })
    }

    /// Insert, or update the existing row on `on_conflict` key collision.
    pub async fn upsert<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        on_conflict: &str,
        row: &T,
    ) -> SupabaseResult<R> {
        let url = self.table_url(table);

        let response = self
            .authed(self.http.post(&url))
            .await
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(row)
            .send()
            .await?;

        let rows: Vec<R> = self.decode_rows(table, response).await?;
        rows.into_iter().next().ok_or_else(|| {
            SupabaseError::invalid_response(format!("upsert into {} returned no row", table))
        })
    }

    /// Update matching rows and return them as stored.
    pub async fn update<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, &str)],
        patch: &T,
    ) -> SupabaseResult<Vec<R>> {
        let url = self.table_url(table);
        let query: Vec<(String, String)> = filters
            .iter()
            .map(|(column, value)| ((*column).to_string(), format!("eq.{}", value)))
            .collect();

        let response = self
            .authed(self.http.patch(&url))
            .await
            .query(&query)
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;

        self.decode_rows(table, response).await
    }

    /// Delete matching rows.
    pub async fn delete(&self, table: &str, filters: &[(&str, &str)]) -> SupabaseResult<()> {
        let url = self.table_url(table);
        let query: Vec<(String, String)> = filters
            .iter()
            .map(|(column, value)| ((*column).to_string(), format!("eq.{}", value)))
            .collect();

        let response = self
            .authed(self.http.delete(&url))
            .await
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_for(status, table, response).await);
        }
        Ok(())
    }

    /// Execute with retry.
    pub async fn with_retry<T, F, Fut>(&self, operation: &str, op: F) -> SupabaseResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = SupabaseResult<T>>,
    {
        crate::retry::with_retry(&self.config.retry, operation, op).await
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    async fn decode_rows<T: DeserializeOwned>(
        &self,
        context: &str,
        response: reqwest::Response,
    ) -> SupabaseResult<Vec<T>> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_for(status, context, response).await);
        }
        let rows: Vec<T> = response.json().await?;
        Ok(rows)
    }

    async fn error_for(
        status: StatusCode,
        context: &str,
        response: reqwest::Response,
    ) -> SupabaseError {
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(1000);
            return SupabaseError::RateLimited(retry_after_ms);
        }

        let body = response.text().await.unwrap_or_default();
        SupabaseError::from_http_status(status.as_u16(), format!("{} failed: {}", context, body))
    }
}

// =============================================================================
// Tests
// =============================================================================
