pub mod models;

pub use models::{Anime, AnimeVideos, Quote};

use crate::config::Config;
use crate::rate_limit::{ApiSource, RateLimiter};
use models::{AnimeChanEnvelope, JikanEnvelope, LegacyQuote, QuotePayload};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Truncation caps applied to list payloads, upstream order preserved.
pub const AIRING_LIMIT: usize = 10;
pub const TOP_LIMIT: usize = 5;
pub const SEARCH_LIMIT: usize = 5;

/// Jikan can be slow under load; everything else uses the client default.
const JIKAN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no result for that query")]
    NotFound,
}

/// Adapter over the upstream anime and quote APIs.
///
/// Every public operation rate-limits its source, then converts any failure
/// (network, timeout, non-success status, malformed payload) into an empty
/// result. Failures are logged here and never surface to callers.
pub struct AnimeApi {
    client: reqwest::Client,
    limiter: RateLimiter,
    jikan_base: String,
    animechan_base: String,
    quotes_base: String,
}

impl AnimeApi {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            limiter: RateLimiter::new(),
            jikan_base: config.jikan_api_base.clone(),
            animechan_base: config.animechan_api_base.clone(),
            quotes_base: config.quotes_api_base.clone(),
        }
    }

    /// Top of the currently-airing season, at most [`AIRING_LIMIT`] entries.
    pub async fn currently_airing(&self) -> Vec<Anime> {
        self.limiter.acquire(ApiSource::Jikan).await;
        match self.fetch_airing().await {
            Ok(list) => list,
            Err(e) => {
                warn!("Failed to fetch currently airing anime: {e}");
                Vec::new()
            }
        }
    }

    pub async fn anime_by_id(&self, id: i64) -> Option<Anime> {
        self.limiter.acquire(ApiSource::Jikan).await;
        match self.fetch_anime(id).await {
            Ok(anime) => Some(anime),
            Err(e) => {
                warn!("Failed to fetch anime {id}: {e}");
                None
            }
        }
    }

    pub async fn anime_videos(&self, id: i64) -> Option<AnimeVideos> {
        self.limiter.acquire(ApiSource::Jikan).await;
        match self.fetch_videos(id).await {
            Ok(videos) => Some(videos),
            Err(e) => {
                warn!("Failed to fetch videos for anime {id}: {e}");
                None
            }
        }
    }

    /// Top-rated anime, at most [`TOP_LIMIT`] entries.
    pub async fn top_anime(&self) -> Vec<Anime> {
        self.limiter.acquire(ApiSource::Jikan).await;
        match self.fetch_top().await {
            Ok(list) => list,
            Err(e) => {
                warn!("Failed to fetch top anime: {e}");
                Vec::new()
            }
        }
    }

    /// Title search, at most [`SEARCH_LIMIT`] entries.
    pub async fn search(&self, query: &str) -> Vec<Anime> {
        self.limiter.acquire(ApiSource::Jikan).await;
        match self.fetch_search(query).await {
            Ok(list) => list,
            Err(e) => {
                warn!("Failed to search anime for {query:?}: {e}");
                Vec::new()
            }
        }
    }

    /// A quote, optionally filtered to one anime. A failed filtered lookup
    /// retries once against the unfiltered endpoint before giving up.
    pub async fn anime_quote(&self, anime: Option<&str>) -> Option<Quote> {
        self.limiter.acquire(ApiSource::AnimeChan).await;

        let first = match anime {
            Some(name) => self.fetch_filtered_quote(name).await,
            None => self.fetch_random_quote().await,
        };
        match first {
            Ok(quote) => Some(quote),
            Err(e) if anime.is_some() => {
                warn!("Filtered quote fetch failed ({e}), retrying unfiltered");
                match self.fetch_random_quote().await {
                    Ok(quote) => Some(quote),
                    Err(e) => {
                        warn!("Unfiltered quote fetch failed: {e}");
                        None
                    }
                }
            }
            Err(e) => {
                warn!("Quote fetch failed: {e}");
                None
            }
        }
    }

    /// A quote from the legacy unfiltered endpoint (the scheduled-post path).
    pub async fn generic_quote(&self) -> Option<Quote> {
        self.limiter.acquire(ApiSource::Quotes).await;
        match self.fetch_generic_quote().await {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!("Generic quote fetch failed: {e}");
                None
            }
        }
    }

    async fn fetch_airing(&self) -> Result<Vec<Anime>, ApiError> {
        let url = format!("{}/seasons/now", self.jikan_base);
        let body: JikanEnvelope<Vec<Anime>> = self
            .client
            .get(&url)
            .timeout(JIKAN_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(truncated(body.data, AIRING_LIMIT))
    }

    async fn fetch_anime(&self, id: i64) -> Result<Anime, ApiError> {
        let url = format!("{}/anime/{id}", self.jikan_base);
        let body: JikanEnvelope<Anime> = self
            .client
            .get(&url)
            .timeout(JIKAN_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body.data)
    }

    async fn fetch_videos(&self, id: i64) -> Result<AnimeVideos, ApiError> {
        let url = format!("{}/anime/{id}/videos", self.jikan_base);
        let body: JikanEnvelope<AnimeVideos> = self
            .client
            .get(&url)
            .timeout(JIKAN_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body.data)
    }

    async fn fetch_top(&self) -> Result<Vec<Anime>, ApiError> {
        let url = format!("{}/top/anime", self.jikan_base);
        let body: JikanEnvelope<Vec<Anime>> = self
            .client
            .get(&url)
            .timeout(JIKAN_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(truncated(body.data, TOP_LIMIT))
    }

    async fn fetch_search(&self, query: &str) -> Result<Vec<Anime>, ApiError> {
        let url = format!("{}/anime", self.jikan_base);
        let body: JikanEnvelope<Vec<Anime>> = self
            .client
            .get(&url)
            .timeout(JIKAN_TIMEOUT)
            .query(&[("q", query), ("limit", "5")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(truncated(body.data, SEARCH_LIMIT))
    }

    async fn fetch_filtered_quote(&self, anime: &str) -> Result<Quote, ApiError> {
        let url = format!("{}/quotes/random", self.animechan_base);
        let response = self
            .client
            .get(&url)
            .query(&[("anime", anime)])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        let payload: QuotePayload = response.error_for_status()?.json().await?;
        Ok(payload.into())
    }

    async fn fetch_random_quote(&self) -> Result<Quote, ApiError> {
        let url = format!("{}/quotes/random", self.animechan_base);
        let body: AnimeChanEnvelope = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if body.status != "success" {
            return Err(ApiError::NotFound);
        }
        body.data.map(Quote::from).ok_or(ApiError::NotFound)
    }

    async fn fetch_generic_quote(&self) -> Result<Quote, ApiError> {
        let url = format!("{}/random", self.quotes_base);
        let body: LegacyQuote = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body.into())
    }
}

fn truncated<T>(mut items: Vec<T>, cap: usize) -> Vec<T> {
    items.truncate(cap);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anime_list_json(count: usize) -> String {
        let entries: Vec<String> = (0..count)
            .map(|i| format!(r#"{{"mal_id": {i}, "title": "Anime {i}"}}"#))
            .collect();
        format!(r#"{{"data": [{}]}}"#, entries.join(","))
    }

    #[test]
    fn test_search_payload_truncated_in_upstream_order() {
        let body: JikanEnvelope<Vec<Anime>> =
            serde_json::from_str(&anime_list_json(7)).unwrap();
        let results = truncated(body.data, SEARCH_LIMIT);

        assert_eq!(results.len(), 5);
        let ids: Vec<i64> = results.iter().map(|a| a.mal_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_short_payload_is_untouched() {
        let body: JikanEnvelope<Vec<Anime>> =
            serde_json::from_str(&anime_list_json(3)).unwrap();
        let results = truncated(body.data, AIRING_LIMIT);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_animechan_envelope_without_success_is_not_found() {
        let body: AnimeChanEnvelope =
            serde_json::from_str(r#"{"status": "error"}"#).unwrap();
        assert_eq!(body.status, "error");
        assert!(body.data.is_none());
    }
}
