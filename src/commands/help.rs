use crate::{Context, Error};
use poise::serenity_prelude::{CreateEmbed, Timestamp};

/// Show all available commands
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let embed = CreateEmbed::new()
        .title("📖 OtakuPulse Help")
        .description("Here are all available commands:")
        .field("/setup", "Set up the bot for your server (Admin only)", false)
        .field(
            "/quote [anime]",
            "Get a random anime quote, or one from a specific anime",
            false,
        )
        .field("/airing", "Show currently airing anime", false)
        .field("/top-anime", "Show top-rated anime", false)
        .field("/search <query>", "Search for anime", false)
        .field("/trailer <anime>", "Get an anime trailer", false)
        .field("/settings", "View server settings (Admin only)", false)
        .field(
            "Dashboard",
            format!(
                "Feature and channel selection lives on the web dashboard \
                 (`{}`).",
                ctx.data().config.dashboard_addr
            ),
            false,
        )
        .color(0x00CEC9)
        .timestamp(Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
