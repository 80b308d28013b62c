use crate::api::Quote;
use rand::seq::SliceRandom;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// How long a cached quote stays fresh.
pub const QUOTE_FRESHNESS_WINDOW: Duration = Duration::from_secs(3600);

/// Literary fallbacks for when every quote source is down.
const FALLBACK_QUOTES: &[(&str, &str, &str)] = &[
    (
        "To know sorrow is not terrifying. What is terrifying is to know you can't go back to happiness you could have.",
        "Matsumoto Rangiku",
        "Bleach",
    ),
    (
        "No one knows what the future holds. That's why its potential is infinite.",
        "Rintarou Okabe",
        "Steins;Gate",
    ),
    (
        "It's not the face that makes someone a monster; it's the choices they make with their lives.",
        "Naruto Uzumaki",
        "Naruto",
    ),
];

pub fn fallback_quote() -> Quote {
    let (text, character, anime) = FALLBACK_QUOTES
        .choose(&mut rand::thread_rng())
        .expect("fallback quote list is non-empty");
    Quote {
        text: text.to_string(),
        character: character.to_string(),
        anime: anime.to_string(),
    }
}

/// Single-slot cache for the scheduled quote post.
///
/// Avoids a redundant upstream call when a scheduled job fires close to
/// another quote fetch. A failed fetch falls through to the hardcoded
/// fallbacks without touching the slot, so the next call retries upstream.
pub struct QuoteCache {
    slot: Mutex<Option<(Quote, Instant)>>,
    freshness_window: Duration,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::with_window(QUOTE_FRESHNESS_WINDOW)
    }

    pub fn with_window(freshness_window: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            freshness_window,
        }
    }

    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Quote
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<Quote>>,
    {
        if let Some(quote) = self.fresh() {
            return quote;
        }
        match fetch().await {
            Some(quote) => {
                let mut slot = self.slot.lock().unwrap();
                *slot = Some((quote.clone(), Instant::now()));
                quote
            }
            None => fallback_quote(),
        }
    }

    fn fresh(&self) -> Option<Quote> {
        let slot = self.slot.lock().unwrap();
        slot.as_ref().and_then(|(quote, fetched_at)| {
            (fetched_at.elapsed() < self.freshness_window).then(|| quote.clone())
        })
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn quote(text: &str) -> Quote {
        Quote {
            text: text.to_string(),
            character: "Spike Spiegel".to_string(),
            anime: "Cowboy Bebop".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_quote_is_reused() {
        let cache = QuoteCache::new();
        let fetches = AtomicUsize::new(0);

        let fetch = || {
            fetches.fetch_add(1, Ordering::SeqCst);
            async { Some(quote("first")) }
        };

        let first = cache.get_or_fetch(fetch).await;
        tokio::time::sleep(Duration::from_secs(1800)).await;
        let second = cache
            .get_or_fetch(|| {
                fetches.fetch_add(1, Ordering::SeqCst);
                async { Some(quote("second")) }
            })
            .await;

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_quote_is_refetched() {
        let cache = QuoteCache::new();
        let fetches = AtomicUsize::new(0);

        cache
            .get_or_fetch(|| {
                fetches.fetch_add(1, Ordering::SeqCst);
                async { Some(quote("first")) }
            })
            .await;

        tokio::time::sleep(QUOTE_FRESHNESS_WINDOW + Duration::from_secs(1)).await;

        let refreshed = cache
            .get_or_fetch(|| {
                fetches.fetch_add(1, Ordering::SeqCst);
                async { Some(quote("second")) }
            })
            .await;

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
        assert_eq!(refreshed.text, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_falls_back_without_caching() {
        let cache = QuoteCache::new();

        let fallback = cache.get_or_fetch(|| async { None }).await;
        assert!(FALLBACK_QUOTES
            .iter()
            .any(|(text, _, _)| *text == fallback.text));

        // The failure was not cached: the next call fetches again.
        let fetched = cache
            .get_or_fetch(|| async { Some(quote("recovered")) })
            .await;
        assert_eq!(fetched.text, "recovered");
    }
}
