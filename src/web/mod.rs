use crate::gateway::{ChannelRef, Gateway};
use crate::services::settings::SettingsService;
use crate::settings::{GuildSettings, SettingsForm};
use axum::extract::State;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared state for the dashboard endpoints.
pub struct DashboardState {
    pub settings: SettingsService,
    pub gateway: Arc<dyn Gateway>,
}

pub fn router(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/guilds", get(guild_overview))
        .route("/dashboard/settings", post(save_settings))
        .with_state(state)
}

pub async fn serve(state: Arc<DashboardState>, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Dashboard listening on {addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Everything the dashboard page needs to render one guild card.
#[derive(Serialize)]
struct GuildOverview {
    id: String,
    name: String,
    configured: bool,
    text_channels: Vec<ChannelRef>,
    settings: Option<GuildSettings>,
}

async fn guild_overview(State(state): State<Arc<DashboardState>>) -> Json<Vec<GuildOverview>> {
    let mut overview = Vec::new();
    for guild in state.gateway.list_guilds().await {
        let settings = match state.settings.get(&guild.id).await {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to load settings for guild {}: {e}", guild.id);
                None
            }
        };
        let text_channels = state.gateway.list_text_channels(&guild.id).await;
        overview.push(GuildOverview {
            configured: settings.is_some(),
            settings,
            text_channels,
            id: guild.id,
            name: guild.name,
        });
    }
    Json(overview)
}

/// Feature-selection form submit. Always bounces back to the dashboard;
/// error detail never reaches the browser.
async fn save_settings(
    State(state): State<Arc<DashboardState>>,
    Form(form): Form<SettingsForm>,
) -> Redirect {
    match state.settings.save_form(&form).await {
        Ok(Some(_)) => info!(
            "Dashboard settings saved for guild {}",
            form.guild_id().unwrap_or_default()
        ),
        Ok(None) => warn!("Dashboard submission without a guild id rejected"),
        Err(e) => error!("Dashboard settings save failed: {e}"),
    }
    Redirect::to("/dashboard")
}
