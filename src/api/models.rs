use serde::Deserialize;

/// Jikan wraps every payload in a `data` envelope.
#[derive(Debug, Deserialize)]
pub struct JikanEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Anime {
    pub mal_id: i64,
    pub title: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub episodes: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub rank: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub images: Option<AnimeImages>,
}

impl Anime {
    pub fn large_image_url(&self) -> Option<&str> {
        self.images
            .as_ref()?
            .jpg
            .as_ref()?
            .large_image_url
            .as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AnimeImages {
    #[serde(default)]
    pub jpg: Option<ImageSet>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ImageSet {
    #[serde(default)]
    pub large_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimeVideos {
    #[serde(default)]
    pub promo: Vec<PromoVideo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromoVideo {
    #[serde(default)]
    pub title: Option<String>,
    pub trailer: Trailer,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Trailer {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub images: Option<ImageSet>,
}

/// AnimeChan v1 envelope for the unfiltered random endpoint.
#[derive(Debug, Deserialize)]
pub struct AnimeChanEnvelope {
    pub status: String,
    #[serde(default)]
    pub data: Option<QuotePayload>,
}

/// AnimeChan v1 quote body. The anime-filtered endpoint returns this shape
/// directly, without the envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct QuotePayload {
    pub content: String,
    #[serde(default)]
    pub anime: Option<NamedRef>,
    #[serde(default)]
    pub character: Option<NamedRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

/// Legacy flat quote body from the unauthenticated random endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyQuote {
    pub anime: String,
    pub character: String,
    pub quote: String,
}

/// What the rest of the bot sees, regardless of which endpoint produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub text: String,
    pub character: String,
    pub anime: String,
}

impl From<QuotePayload> for Quote {
    fn from(payload: QuotePayload) -> Self {
        Quote {
            text: payload.content,
            character: payload
                .character
                .map(|c| c.name)
                .unwrap_or_else(|| "Unknown".to_string()),
            anime: payload
                .anime
                .map(|a| a.name)
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

impl From<LegacyQuote> for Quote {
    fn from(payload: LegacyQuote) -> Self {
        Quote {
            text: payload.quote,
            character: payload.character,
            anime: payload.anime,
        }
    }
}
