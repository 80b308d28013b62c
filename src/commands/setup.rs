use crate::settings::GuildSettings;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use tracing::info;

/// Set up OtakuPulse for this server
#[poise::command(slash_command, required_permissions = "MANAGE_GUILD", guild_only)]
pub async fn setup(
    ctx: Context<'_>,
    #[description = "Channel for notifications"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;
    ctx.defer().await?;

    let settings = GuildSettings::all_enabled(&channel.id.to_string());
    ctx.data()
        .settings
        .upsert(&guild_id.to_string(), settings)
        .await?;

    info!(
        "Guild {} configured with notification channel {}",
        guild_id, channel.id
    );

    let embed = serenity::CreateEmbed::new()
        .title("✅ Setup Complete!")
        .description(format!(
            "OtakuPulse has been configured for this server.\n\n\
             **Notification Channel:** <#{}>\n\
             All notification types are enabled. Fine-tune them on the web \
             dashboard or view them with `/settings`.",
            channel.id
        ))
        .color(0x00FF00)
        .timestamp(serenity::Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
