use crate::api::{Anime, Quote};
use async_trait::async_trait;
use serde::Serialize;
use serenity::all::{ChannelId, ChannelType, CreateEmbed, CreateMessage, Timestamp};
use serenity::cache::Cache;
use serenity::http::Http;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelRef {
    pub id: String,
    pub name: String,
}

/// A scheduled message, independent of how the sink renders it.
#[derive(Debug, Clone)]
pub enum Notification {
    DailyQuote(Quote),
    AiringSpotlight(Anime),
    WeeklyTopAnime(Vec<Anime>),
}

/// The Discord sink boundary the dispatcher talks to.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn list_guilds(&self) -> Vec<GuildRef>;
    async fn list_text_channels(&self, guild_id: &str) -> Vec<ChannelRef>;
    async fn send_message(
        &self,
        channel_id: &str,
        notification: &Notification,
    ) -> anyhow::Result<()>;
}

/// Gateway backed by the serenity cache/http pair.
pub struct DiscordGateway {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }
}

#[async_trait]
impl Gateway for DiscordGateway {
    async fn list_guilds(&self) -> Vec<GuildRef> {
        let mut guilds = Vec::new();
        for guild_id in self.cache.guilds() {
            if let Some(guild) = self.cache.guild(guild_id) {
                guilds.push(GuildRef {
                    id: guild_id.to_string(),
                    name: guild.name.clone(),
                });
            }
        }
        guilds
    }

    async fn list_text_channels(&self, guild_id: &str) -> Vec<ChannelRef> {
        let Ok(id) = guild_id.parse::<u64>() else {
            return Vec::new();
        };
        let Some(guild) = self.cache.guild(id) else {
            return Vec::new();
        };
        guild
            .channels
            .values()
            .filter(|channel| channel.kind == ChannelType::Text)
            .map(|channel| ChannelRef {
                id: channel.id.to_string(),
                name: channel.name.clone(),
            })
            .collect()
    }

    async fn send_message(
        &self,
        channel_id: &str,
        notification: &Notification,
    ) -> anyhow::Result<()> {
        let id: u64 = channel_id
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid channel id '{channel_id}'"))?;

        debug!("Sending {} to channel {channel_id}", notification.label());
        let builder = CreateMessage::new().embed(render(notification));
        ChannelId::new(id).send_message(&self.http, builder).await?;
        Ok(())
    }
}

impl Notification {
    pub fn label(&self) -> &'static str {
        match self {
            Notification::DailyQuote(_) => "daily quote",
            Notification::AiringSpotlight(_) => "airing spotlight",
            Notification::WeeklyTopAnime(_) => "weekly top anime",
        }
    }
}

fn render(notification: &Notification) -> CreateEmbed {
    match notification {
        Notification::DailyQuote(quote) => CreateEmbed::new()
            .title("✨ Daily Anime Quote")
            .description(format!("*\"{}\"*", quote.text))
            .field("Character", quote.character.clone(), true)
            .field("Anime", quote.anime.clone(), true)
            .color(0x7F00FF)
            .timestamp(Timestamp::now()),
        Notification::AiringSpotlight(anime) => {
            let mut embed = CreateEmbed::new()
                .title("📺 Anime Update")
                .description(format!("**{}** is currently airing!", anime.title))
                .field(
                    "Status",
                    anime.status.clone().unwrap_or_else(|| "Unknown".to_string()),
                    true,
                )
                .field("Score", format_score(anime.score), true)
                .field(
                    "Episodes",
                    anime
                        .episodes
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "Ongoing".to_string()),
                    true,
                )
                .color(0xFFD93D)
                .timestamp(Timestamp::now());
            if let Some(image) = anime.large_image_url() {
                embed = embed.image(image);
            }
            embed
        }
        Notification::WeeklyTopAnime(list) => {
            let mut embed = CreateEmbed::new()
                .title("🏆 Weekly Top Anime")
                .description("Here are this week's top-rated anime:")
                .color(0x6C5CE7)
                .timestamp(Timestamp::now());
            for (index, anime) in list.iter().enumerate() {
                embed = embed.field(
                    format!("{}. {}", index + 1, anime.title),
                    format!(
                        "**Score:** {}\n**Rank:** #{}",
                        format_score(anime.score),
                        anime
                            .rank
                            .map(|r| r.to_string())
                            .unwrap_or_else(|| "N/A".to_string())
                    ),
                    true,
                );
            }
            embed
        }
    }
}

fn format_score(score: Option<f64>) -> String {
    score
        .map(|s| s.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}
