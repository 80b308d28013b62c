use crate::settings::GuildSettings;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

/// View current server settings
#[poise::command(slash_command, required_permissions = "MANAGE_GUILD", guild_only)]
pub async fn settings(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;

    let stored = ctx.data().settings.get(&guild_id.to_string()).await?;
    let Some(stored) = stored else {
        ctx.say("No settings found for this server. Use `/setup` to configure the bot.")
            .await?;
        return Ok(());
    };

    let embed = serenity::CreateEmbed::new()
        .title("⚙️ Server Settings")
        .field(
            "Notification Channel",
            channel_mention(&stored.notification_channel),
            true,
        )
        .field("Daily Quotes", feature_line(&stored, Feature::DailyQuotes), true)
        .field(
            "Airing Alerts",
            feature_line(&stored, Feature::AiringAlerts),
            true,
        )
        .field(
            "Trailer Notifications",
            feature_line(&stored, Feature::TrailerNotifications),
            true,
        )
        .field(
            "Top Anime Rankings",
            feature_line(&stored, Feature::TopAnimeRankings),
            true,
        )
        .field("Anime Search", feature_line(&stored, Feature::AnimeSearch), true)
        .color(0x74B9FF)
        .timestamp(serenity::Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

enum Feature {
    DailyQuotes,
    AiringAlerts,
    TrailerNotifications,
    TopAnimeRankings,
    AnimeSearch,
}

fn feature_line(settings: &GuildSettings, feature: Feature) -> String {
    let (enabled, channel) = match feature {
        Feature::DailyQuotes => (settings.daily_quotes_enabled, &settings.daily_quotes_channel),
        Feature::AiringAlerts => (
            settings.airing_alerts_enabled,
            &settings.airing_alerts_channel,
        ),
        Feature::TrailerNotifications => (
            settings.trailer_notifications_enabled,
            &settings.trailer_notifications_channel,
        ),
        Feature::TopAnimeRankings => (
            settings.top_anime_rankings_enabled,
            &settings.top_anime_rankings_channel,
        ),
        Feature::AnimeSearch => (settings.anime_search_enabled, &settings.anime_search_channel),
    };
    let state = if enabled { "✅ Enabled" } else { "❌ Disabled" };
    format!("{state}\n{}", channel_mention(channel))
}

fn channel_mention(channel: &Option<String>) -> String {
    match channel {
        Some(id) => format!("<#{id}>"),
        None => "Not set".to_string(),
    }
}
