//! [`TourStore`] over a PostgREST endpoint (`{base}/rest/v1/{table}`).
//!
//! Every request carries the service key both as `apikey` and as a bearer
//! token, so row-level security is bypassed.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    DbError, NewProvider, NewScrapeLog, NewTour, ProviderRow, ScrapeLogRow, TourRow,
    TourSignalsUpdate, TourStore,
};

const TOURS: &str = "tours";
const PROVIDERS: &str = "tour_providers";
const SCRAPE_LOGS: &str = "scrape_logs";

pub struct RestStore {
    client: Client,
    base_url: String,
}

impl RestStore {
    /// # Errors
    ///
    /// Returns [`DbError::InvalidServiceKey`] if `service_key` cannot be sent
    /// as a header, or [`DbError::Http`] if the client cannot be built.
    pub fn new(base_url: &str, service_key: &str, timeout: Duration) -> Result<Self, DbError> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(service_key).map_err(|_| DbError::InvalidServiceKey)?;
        key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {service_key}"))
            .map_err(|_| DbError::InvalidServiceKey)?;
        bearer.set_sensitive(true);
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &'static str,
        request: RequestBuilder,
    ) -> Result<Vec<T>, DbError> {
        let response = check_status(table, request.send().await?).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| DbError::Deserialize { table, source })
    }

    async fn insert_returning<T, B>(&self, table: &'static str, body: &B) -> Result<T, DbError>
    where
        T: DeserializeOwned,
        B: serde::Serialize + Sync,
    {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(body);
        self.fetch_rows::<T>(table, request)
            .await?
            .into_iter()
            .next()
            .ok_or(DbError::EmptyInsertResponse { table })
    }
}

async fn check_status(table: &'static str, response: Response) -> Result<Response, DbError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DbError::UnexpectedStatus {
        table,
        status: status.as_u16(),
        body,
    })
}

/// Quotes a value for use inside a PostgREST `or=(...)` list.
fn or_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[async_trait]
impl TourStore for RestStore {
    async fn find_tour(&self, source_id: &str, slug: &str) -> Result<Option<TourRow>, DbError> {
        let filter = if source_id.is_empty() {
            ("slug".to_string(), format!("eq.{slug}"))
        } else {
            (
                "or".to_string(),
                format!(
                    "(source_id.eq.{},slug.eq.{})",
                    or_value(source_id),
                    or_value(slug)
                ),
            )
        };
        let request = self
            .client
            .get(self.table_url(TOURS))
            .query(&[filter])
            .query(&[("select", "*"), ("limit", "1")]);
        let rows = self.fetch_rows::<TourRow>(TOURS, request).await?;
        Ok(rows.into_iter().next())
    }

    async fn update_tour_signals(
        &self,
        id: Uuid,
        update: &TourSignalsUpdate,
    ) -> Result<(), DbError> {
        let response = self
            .client
            .patch(self.table_url(TOURS))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(update)
            .send()
            .await?;
        check_status(TOURS, response).await?;
        Ok(())
    }

    async fn insert_tour(&self, tour: &NewTour) -> Result<TourRow, DbError> {
        self.insert_returning(TOURS, tour).await
    }

    async fn find_provider_by_slug(&self, slug: &str) -> Result<Option<ProviderRow>, DbError> {
        let request = self
            .client
            .get(self.table_url(PROVIDERS))
            .query(&[
                ("slug", format!("eq.{slug}")),
                ("select", "*".to_string()),
                ("limit", "1".to_string()),
            ]);
        let rows = self.fetch_rows::<ProviderRow>(PROVIDERS, request).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_provider(&self, provider: &NewProvider) -> Result<ProviderRow, DbError> {
        self.insert_returning(PROVIDERS, provider).await
    }

    async fn insert_scrape_log(&self, log: &NewScrapeLog) -> Result<(), DbError> {
        let response = self
            .client
            .post(self.table_url(SCRAPE_LOGS))
            .header("Prefer", "return=minimal")
            .json(log)
            .send()
            .await?;
        check_status(SCRAPE_LOGS, response).await?;
        Ok(())
    }

    async fn list_scrape_logs(&self, limit: u32) -> Result<Vec<ScrapeLogRow>, DbError> {
        let request = self.client.get(self.table_url(SCRAPE_LOGS)).query(&[
            ("select", "*".to_string()),
            ("order", "started_at.desc".to_string()),
            ("limit", limit.to_string()),
        ]);
        self.fetch_rows(SCRAPE_LOGS, request).await
    }
}
