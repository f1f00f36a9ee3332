//! HTTP client for the Elasticsearch SQL endpoint.

use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::sql::{self, Filters, FilterValue, Rows, SqlRequest, SqlResponse};

/// Parameters of a single [`QueryClient::fetch_results`] call.
///
/// Defaults to a limit of 1 (the newest matching row), no filters and no
/// date bounds.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    fields: Vec<String>,
    filters: Filters,
    limit: u64,
    start_date: Option<String>,
    end_date: Option<String>,
    verbose: bool,
}

impl FetchRequest {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            filters: Filters::new(),
            limit: 1,
            start_date: None,
            end_date: None,
            verbose: false,
        }
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(key, value);
        self
    }

    pub fn filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Maximum number of rows; 0 means unbounded.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Inclusive lower bound on `ts_created`.
    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    /// Inclusive upper bound on `ts_created`.
    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    /// Log the SQL request body at `info` level (target `kquery::client`)
    /// instead of `debug`. It shows up wherever the caller's tracing
    /// subscriber writes; the CLI sends it to stderr.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Render the SQL text for `index`.
    pub fn to_sql(&self, index: &str) -> String {
        let where_body = sql::where_clause(
            &self.filters,
            self.start_date.as_deref(),
            self.end_date.as_deref(),
        );
        sql::build_query(index, &self.fields, &where_body, self.limit)
    }
}

/// Query client bound to one index pattern.
///
/// Calls are issued one at a time; the client holds no state besides the
/// HTTP connection pool.
pub struct QueryClient {
    client: Client,
    base_url: String,
    index: String,
}

impl QueryClient {
    pub fn new(host: &str, timeout_ms: u64, index: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::new(host, timeout_ms, index))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.host.trim_end_matches('/').to_string(),
            index: config.index.clone(),
        })
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// URL of the index existence check. The index is pushed as a single
    /// percent-encoded path segment after any path prefix of the host.
    fn index_url(&self) -> Result<url::Url> {
        let mut url = url::Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("host {} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push(&self.index);
        Ok(url)
    }

    /// Check whether the configured index (or any index matching the
    /// pattern) exists.
    pub async fn index_exists(&self) -> Result<bool> {
        let url = self.index_url()?;
        tracing::debug!("Checking index {} at {}", self.index, url);

        let response = self.client.head(url).send().await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(Error::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    /// Run the query described by `request` and return its rows, newest
    /// first.
    ///
    /// Fails with [`Error::IndexNotFound`] before any SQL is sent when the
    /// index does not exist. Transport and engine errors are returned as-is;
    /// nothing is retried.
    pub async fn fetch_results(&self, request: &FetchRequest) -> Result<Rows> {
        if request.fields.is_empty() {
            return Err(Error::EmptyFieldList);
        }

        if !self.index_exists().await? {
            tracing::warn!("Index {} not exists", self.index);
            return Err(Error::IndexNotFound(self.index.clone()));
        }

        let query = request.to_sql(&self.index);
        let body = SqlRequest::new(&query);

        if request.verbose {
            tracing::info!("SQL request: query={:?} fetch_size={}", body.query, body.fetch_size);
        } else {
            tracing::debug!("SQL query: {}", query);
        }

        let response = self
            .client
            .post(format!("{}/_xpack/sql", self.base_url))
            .query(&[("format", "json")])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status { status, body });
        }

        let sql_response: SqlResponse = response.json().await?;
        tracing::debug!("SQL query returned {} rows", sql_response.rows.len());

        Ok(sql_response.rows)
    }

    /// Release the connection pool. The client cannot be used afterwards.
    pub fn close(self) {
        tracing::debug!("Closing connection to {}", self.base_url);
        drop(self.client);
    }
}
