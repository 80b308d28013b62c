use crate::db::Database;
use crate::settings::{merge, GuildSettings, SettingsForm};

/// Async facade over the blocking guild-settings store.
#[derive(Clone)]
pub struct SettingsService {
    db: Database,
}

impl SettingsService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn get(&self, guild_id: &str) -> anyhow::Result<Option<GuildSettings>> {
        let guild_id = guild_id.to_string();
        self.db
            .run_blocking(move |db| db.get_guild_settings(&guild_id))
            .await
    }

    pub async fn upsert(&self, guild_id: &str, settings: GuildSettings) -> anyhow::Result<()> {
        let guild_id = guild_id.to_string();
        self.db
            .run_blocking(move |db| db.upsert_guild_settings(&guild_id, &settings))
            .await
    }

    /// Merges a dashboard submission with the stored record and persists the
    /// result. Returns `None` (nothing saved) when the form names no guild.
    pub async fn save_form(&self, form: &SettingsForm) -> anyhow::Result<Option<GuildSettings>> {
        let Some(guild_id) = form.guild_id() else {
            return Ok(None);
        };
        let existing = self.get(guild_id).await?;
        let merged = merge(existing, form);
        self.upsert(guild_id, merged.clone()).await?;
        Ok(Some(merged))
    }
}
