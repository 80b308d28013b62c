use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub dashboard_addr: String,
    pub jikan_api_base: String,
    pub animechan_api_base: String,
    pub quotes_api_base: String,
    pub status_message: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "data/otakupulse.db".to_string()),
            dashboard_addr: env::var("DASHBOARD_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            jikan_api_base: env::var("JIKAN_API_BASE")
                .unwrap_or_else(|_| "https://api.jikan.moe/v4".to_string()),
            animechan_api_base: env::var("ANIMECHAN_API_BASE")
                .unwrap_or_else(|_| "https://api.animechan.io/v1".to_string()),
            quotes_api_base: env::var("QUOTES_API_BASE")
                .unwrap_or_else(|_| "https://animechan.vercel.app/api".to_string()),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "Watching the airing charts".to_string()),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("database_url", &self.database_url)
            .field("dashboard_addr", &self.dashboard_addr)
            .field("jikan_api_base", &self.jikan_api_base)
            .field("animechan_api_base", &self.animechan_api_base)
            .field("quotes_api_base", &self.quotes_api_base)
            .field("status_message", &self.status_message)
            .finish()
    }
}
