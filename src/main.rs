use otakupulse::commands::{anime, help, settings, setup};
use otakupulse::config::Config;
use otakupulse::{api, cache, db, dispatcher, gateway, scheduler, services, web, Data, Error};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let discord_token = config.discord_token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                setup::setup(),
                anime::quote(),
                anime::airing(),
                anime::top_anime(),
                anime::search(),
                anime::trailer(),
                settings::settings(),
                help::help(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready!");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                // Set bot status
                ctx.set_activity(Some(serenity::ActivityData::custom(&config.status_message)));

                let db = db::Database::new(&config)?;
                db.execute_init()?;
                let settings = services::settings::SettingsService::new(db.clone());
                let api = Arc::new(api::AnimeApi::new(&config, reqwest::Client::new()));
                let quote_cache = Arc::new(cache::QuoteCache::new());

                // Scheduled notification fan-out
                let discord: Arc<dyn gateway::Gateway> = Arc::new(gateway::DiscordGateway::new(
                    ctx.http.clone(),
                    ctx.cache.clone(),
                ));
                let content = Arc::new(dispatcher::ContentProvider::new(
                    api.clone(),
                    quote_cache.clone(),
                ));
                let jobs = Arc::new(dispatcher::Dispatcher::new(
                    settings.clone(),
                    discord.clone(),
                    content,
                ));
                scheduler::start_scheduler(jobs).await?;

                // Dashboard endpoints
                let dashboard = Arc::new(web::DashboardState {
                    settings: settings.clone(),
                    gateway: discord,
                });
                let addr = config.dashboard_addr.clone();
                tokio::spawn(async move {
                    if let Err(e) = web::serve(dashboard, &addr).await {
                        error!("Dashboard server error: {e}");
                    }
                });

                Ok(Data {
                    config,
                    api,
                    settings,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}

/// Commands always answer, even on failure, with a generic message; raw
/// error detail stays in the logs.
async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Command /{} failed: {error}", ctx.command().name);
            let _ = ctx
                .say("Something went wrong while handling that command. Please try again later.")
                .await;
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}
