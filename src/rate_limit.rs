use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Upstream households sharing one rate-limit slot each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiSource {
    /// Jikan (MyAnimeList) REST API.
    Jikan,
    /// AnimeChan v1 quote API.
    AnimeChan,
    /// Legacy unfiltered quote endpoint.
    Quotes,
}

impl ApiSource {
    pub fn min_interval(self) -> Duration {
        match self {
            ApiSource::Jikan => Duration::from_millis(1000),
            ApiSource::AnimeChan => Duration::from_millis(500),
            ApiSource::Quotes => Duration::from_millis(100),
        }
    }

    fn all() -> [ApiSource; 3] {
        [ApiSource::Jikan, ApiSource::AnimeChan, ApiSource::Quotes]
    }
}

/// Spaces calls to each upstream source at least `min_interval` apart.
///
/// Each source has its own slot; waiting on one source never delays another.
/// Same-source callers serialize through the slot's lock, which is held
/// across the wait so consecutive acquires observe the full interval.
pub struct RateLimiter {
    slots: HashMap<ApiSource, Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        let slots = ApiSource::all()
            .into_iter()
            .map(|source| (source, Mutex::new(None)))
            .collect();
        Self { slots }
    }

    /// Waits out the source's interval, then stamps the new call time.
    /// Never errors; worst case it delays.
    pub async fn acquire(&self, source: ApiSource) {
        let mut last_call = self.slots[&source].lock().await;
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            let interval = source.min_interval();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
