use crate::api::Anime;
use crate::{Context, Error};
use poise::serenity_prelude::{CreateEmbed, Timestamp};

/// Get an anime quote (random or from a specific anime)
#[poise::command(slash_command)]
pub async fn quote(
    ctx: Context<'_>,
    #[description = "Specific anime to get a quote from (optional)"] anime: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;

    let Some(quote) = ctx.data().api.anime_quote(anime.as_deref()).await else {
        ctx.say("Could not fetch an anime quote at this time. Please try again later.")
            .await?;
        return Ok(());
    };

    let embed = CreateEmbed::new()
        .title("🎌 Anime Quote")
        .description(format!("> \"{}\"", quote.text))
        .field("Character", quote.character, true)
        .field("Anime", quote.anime, true)
        .color(0x7F00FF)
        .timestamp(Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Check currently airing anime
#[poise::command(slash_command)]
pub async fn airing(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;

    let airing = ctx.data().api.currently_airing().await;
    if airing.is_empty() {
        ctx.say("Could not fetch currently airing anime. Please try again later.")
            .await?;
        return Ok(());
    }

    let mut embed = CreateEmbed::new()
        .title("📺 Currently Airing Anime")
        .description("Here are the top currently airing anime:")
        .color(0xFFD93D)
        .timestamp(Timestamp::now());
    for (index, anime) in airing.iter().take(5).enumerate() {
        embed = embed.field(
            format!("#{} • {}", index + 1, anime.title),
            summary_line(anime),
            true,
        );
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Get the top anime list
#[poise::command(slash_command, rename = "top-anime")]
pub async fn top_anime(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;

    let top = ctx.data().api.top_anime().await;
    if top.is_empty() {
        ctx.say("Could not fetch top anime. Please try again later.")
            .await?;
        return Ok(());
    }

    let mut embed = CreateEmbed::new()
        .title("🏆 Top Anime")
        .description("Here are the top-rated anime:")
        .color(0x6C5CE7)
        .timestamp(Timestamp::now());
    for (index, anime) in top.iter().enumerate() {
        embed = embed.field(
            format!("#{} • {}", index + 1, anime.title),
            format!(
                "**Score:** {}\n**Rank:** #{}",
                score_text(anime),
                anime
                    .rank
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "N/A".to_string())
            ),
            true,
        );
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Search for anime
#[poise::command(slash_command)]
pub async fn search(
    ctx: Context<'_>,
    #[description = "Anime to search for"] query: String,
) -> Result<(), Error> {
    ctx.defer().await?;

    let results = ctx.data().api.search(&query).await;
    if results.is_empty() {
        ctx.say(format!("No anime found for \"{query}\".")).await?;
        return Ok(());
    }

    let mut embed = CreateEmbed::new()
        .title(format!("🔍 Search Results for \"{query}\""))
        .color(0xA29BFE)
        .timestamp(Timestamp::now());
    for (index, anime) in results.iter().enumerate() {
        embed = embed.field(
            format!("{}. {}", index + 1, anime.title),
            summary_line(anime),
            true,
        );
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Get an anime trailer
#[poise::command(slash_command)]
pub async fn trailer(
    ctx: Context<'_>,
    #[description = "Anime name to get a trailer for"] anime: String,
) -> Result<(), Error> {
    ctx.defer().await?;

    let results = ctx.data().api.search(&anime).await;
    let Some(found) = results.first() else {
        ctx.say(format!("No anime found for \"{anime}\".")).await?;
        return Ok(());
    };

    let videos = ctx.data().api.anime_videos(found.mal_id).await;
    let promo = videos.and_then(|v| v.promo.into_iter().next());
    let Some(promo) = promo else {
        ctx.say(format!("No trailers found for \"{}\".", found.title))
            .await?;
        return Ok(());
    };

    let mut embed = CreateEmbed::new()
        .title(format!("🎬 {} - Trailer", found.title))
        .description(promo.title.unwrap_or_else(|| "Promotional video".to_string()))
        .color(0xFF7675)
        .timestamp(Timestamp::now());
    if let Some(url) = promo.trailer.url {
        embed = embed.url(url);
    }
    if let Some(image) = promo
        .trailer
        .images
        .and_then(|images| images.large_image_url)
    {
        embed = embed.image(image);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

fn summary_line(anime: &Anime) -> String {
    format!(
        "**Score:** {}\n**Episodes:** {}\n**Status:** {}",
        score_text(anime),
        anime
            .episodes
            .map(|n| n.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        anime.status.as_deref().unwrap_or("Unknown")
    )
}

fn score_text(anime: &Anime) -> String {
    anime
        .score
        .map(|s| s.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}
