// Supabase (PostgREST) reading source
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::application::reading_source::{ChangeEvent, ChangeKind, ChangeStream, ReadingSource};
use crate::domain::error::SourceError;
use crate::domain::reading::Reading;
use crate::infrastructure::config::{FeedSettings, SourceCredentials};

#[derive(Debug, Clone)]
pub struct SupabaseRepository {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    table: String,
    window: usize,
    poll_interval: Duration,
    request_timeout: Duration,
}

/// Row count plus a digest of the rows the dashboard shows. Any insert,
/// update or delete inside the window moves the digest.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    count: Option<u64>,
    digest: [u8; 32],
}

impl Fingerprint {
    fn of(count: Option<u64>, body: &[u8]) -> Self {
        Self {
            count,
            digest: Sha256::digest(body).into(),
        }
    }

    fn change_kind(&self, previous: &Fingerprint) -> ChangeKind {
        match (self.count, previous.count) {
            (Some(now), Some(before)) if now > before => ChangeKind::Insert,
            (Some(now), Some(before)) if now < before => ChangeKind::Delete,
            (Some(_), Some(_)) => ChangeKind::Update,
            _ => ChangeKind::Unknown,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            SourceError::Http {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}

impl SupabaseRepository {
    pub fn new(credentials: SourceCredentials, feed: &FeedSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: credentials.url.trim_end_matches('/').to_string(),
            api_key: credentials.api_key,
            table: credentials.table,
            window: feed.history_limit,
            poll_interval: feed.poll_interval(),
            request_timeout: feed.fetch_timeout(),
        }
    }

    fn build_query_url(&self, select: &str, limit: usize) -> String {
        format!(
            "{}/rest/v1/{}?select={}&order=created_at.desc&limit={}",
            self.base_url,
            urlencoding::encode(&self.table),
            urlencoding::encode(select),
            limit
        )
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, SourceError> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Http { status, body });
        }

        Ok(response)
    }

    async fn fetch_fingerprint(&self) -> Result<Fingerprint, SourceError> {
        let url = self.build_query_url("*", self.window);
        let response = self
            .send(self.get(&url).header("Prefer", "count=exact"))
            .await?;

        let count = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_total);

        let body = response.bytes().await?;
        Ok(Fingerprint::of(count, &body))
    }

    /// `fetch_fingerprint` bounded by the request timeout.
    async fn poll_fingerprint(&self) -> Result<Fingerprint, SourceError> {
        tokio::time::timeout(self.request_timeout, self.fetch_fingerprint())
            .await
            .unwrap_or_else(|_| Err(SourceError::Timeout(self.request_timeout)))
    }
}

/// Total row count from a PostgREST `Content-Range` header (`0-0/57`, `*/0`).
fn parse_total(content_range: &str) -> Option<u64> {
    content_range.rsplit_once('/')?.1.trim().parse().ok()
}

/// Decode rows one by one; a malformed row is logged and skipped.
fn decode_rows(rows: Vec<serde_json::Value>) -> Vec<Reading> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<Reading>(row) {
            Ok(reading) => Some(reading),
            Err(e) => {
                tracing::warn!("Skipping undecodable reading: {}", e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl ReadingSource for SupabaseRepository {
    async fn fetch_latest(&self, limit: usize) -> Result<Vec<Reading>, SourceError> {
        let url = self.build_query_url("*", limit);
        tracing::debug!("Fetching up to {} readings from {}", limit, self.table);

        let response = self.send(self.get(&url)).await?;
        let rows = response.json::<Vec<serde_json::Value>>().await?;
        let readings = decode_rows(rows);

        tracing::debug!("Fetched {} readings", readings.len());
        Ok(readings)
    }

    /// Polls the table fingerprint and yields an event whenever it moves.
    async fn subscribe(&self) -> Result<ChangeStream, SourceError> {
        let baseline = self
            .poll_fingerprint()
            .await
            .map_err(|e| SourceError::Subscription(e.to_string()))?;
        let repo = self.clone();

        let stream = async_stream::stream! {
            let mut previous = baseline;
            let mut ticker = tokio::time::interval(repo.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match repo.poll_fingerprint().await {
                    Ok(current) if current != previous => {
                        let kind = current.change_kind(&previous);
                        tracing::debug!("Table {} changed: {:?}", repo.table, kind);
                        previous = current;
                        yield ChangeEvent::new(kind);
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Change poll for {} failed: {}", repo.table, e),
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
