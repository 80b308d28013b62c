use crate::config::Config;
use crate::settings::GuildSettings;
use rusqlite::{Connection, OptionalExtension, Result};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(config: &Config) -> Result<Self> {
        let conn = Connection::open(&config.database_url)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn execute_init(&self) -> anyhow::Result<()> {
        info!("Database: Initializing schema...");
        let sql = "
            CREATE TABLE IF NOT EXISTS guild_settings (
                guild_id TEXT PRIMARY KEY,
                notification_channel TEXT,
                daily_quotes_channel TEXT,
                airing_alerts_channel TEXT,
                trailer_notifications_channel TEXT,
                top_anime_rankings_channel TEXT,
                anime_search_channel TEXT,
                daily_quotes BOOLEAN NOT NULL DEFAULT FALSE,
                airing_alerts BOOLEAN NOT NULL DEFAULT FALSE,
                trailer_notifications BOOLEAN NOT NULL DEFAULT FALSE,
                top_anime_rankings BOOLEAN NOT NULL DEFAULT FALSE,
                anime_search BOOLEAN NOT NULL DEFAULT FALSE
            );
        ";
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(sql)?;
        debug!("Database: Schema initialized successfully");
        Ok(())
    }

    pub fn get_guild_settings(&self, guild_id: &str) -> anyhow::Result<Option<GuildSettings>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT notification_channel, daily_quotes_channel, airing_alerts_channel,
                    trailer_notifications_channel, top_anime_rankings_channel,
                    anime_search_channel, daily_quotes, airing_alerts,
                    trailer_notifications, top_anime_rankings, anime_search
             FROM guild_settings WHERE guild_id = ?1",
        )?;

        let settings = stmt
            .query_row([guild_id], |row| {
                Ok(GuildSettings {
                    notification_channel: row.get(0)?,
                    daily_quotes_channel: row.get(1)?,
                    airing_alerts_channel: row.get(2)?,
                    trailer_notifications_channel: row.get(3)?,
                    top_anime_rankings_channel: row.get(4)?,
                    anime_search_channel: row.get(5)?,
                    daily_quotes_enabled: row.get(6)?,
                    airing_alerts_enabled: row.get(7)?,
                    trailer_notifications_enabled: row.get(8)?,
                    top_anime_rankings_enabled: row.get(9)?,
                    anime_search_enabled: row.get(10)?,
                })
            })
            .optional()?;

        Ok(settings)
    }

    /// Full replace-or-insert. Merging happens before this call.
    pub fn upsert_guild_settings(
        &self,
        guild_id: &str,
        settings: &GuildSettings,
    ) -> anyhow::Result<()> {
        debug!("Database: Upserting settings for guild {}", guild_id);
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO guild_settings (
                guild_id, notification_channel, daily_quotes_channel,
                airing_alerts_channel, trailer_notifications_channel,
                top_anime_rankings_channel, anime_search_channel,
                daily_quotes, airing_alerts, trailer_notifications,
                top_anime_rankings, anime_search
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(guild_id) DO UPDATE SET
                notification_channel = excluded.notification_channel,
                daily_quotes_channel = excluded.daily_quotes_channel,
                airing_alerts_channel = excluded.airing_alerts_channel,
                trailer_notifications_channel = excluded.trailer_notifications_channel,
                top_anime_rankings_channel = excluded.top_anime_rankings_channel,
                anime_search_channel = excluded.anime_search_channel,
                daily_quotes = excluded.daily_quotes,
                airing_alerts = excluded.airing_alerts,
                trailer_notifications = excluded.trailer_notifications,
                top_anime_rankings = excluded.top_anime_rankings,
                anime_search = excluded.anime_search",
            (
                guild_id,
                &settings.notification_channel,
                &settings.daily_quotes_channel,
                &settings.airing_alerts_channel,
                &settings.trailer_notifications_channel,
                &settings.top_anime_rankings_channel,
                &settings.anime_search_channel,
                settings.daily_quotes_enabled,
                settings.airing_alerts_enabled,
                settings.trailer_notifications_enabled,
                settings.top_anime_rankings_enabled,
                settings.anime_search_enabled,
            ),
        )?;
        Ok(())
    }

    #[cfg(test)]
    pub fn open_in_memory_for_tests() -> Self {
        let db = Self {
            conn: Arc::new(Mutex::new(Connection::open_in_memory().unwrap())),
        };
        db.execute_init().unwrap();
        db
    }

    /// Runs a blocking store operation on the blocking pool.
    pub async fn run_blocking<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(&db)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory_for_tests()
    }

    #[test]
    fn test_init_is_idempotent() {
        let db = test_db();
        db.execute_init().unwrap();
        db.execute_init().unwrap();
    }

    #[test]
    fn test_unconfigured_guild_is_absent() {
        let db = test_db();
        assert_eq!(db.get_guild_settings("g1").unwrap(), None);
    }

    #[test]
    fn test_upsert_round_trip() {
        let db = test_db();
        let settings = GuildSettings {
            notification_channel: Some("C0".to_string()),
            daily_quotes_enabled: true,
            daily_quotes_channel: Some("C1".to_string()),
            ..Default::default()
        };

        db.upsert_guild_settings("g1", &settings).unwrap();

        let stored = db.get_guild_settings("g1").unwrap().unwrap();
        assert_eq!(stored, settings);
    }

    #[test]
    fn test_upsert_is_full_replace() {
        let db = test_db();
        db.upsert_guild_settings("g1", &GuildSettings::all_enabled("C1"))
            .unwrap();

        // A second upsert with a sparse record clears what it omits.
        let sparse = GuildSettings {
            notification_channel: Some("C2".to_string()),
            airing_alerts_enabled: true,
            ..Default::default()
        };
        db.upsert_guild_settings("g1", &sparse).unwrap();

        let stored = db.get_guild_settings("g1").unwrap().unwrap();
        assert_eq!(stored, sparse);
        assert!(!stored.daily_quotes_enabled);
        assert_eq!(stored.daily_quotes_channel, None);
    }

    #[test]
    fn test_guilds_are_independent() {
        let db = test_db();
        db.upsert_guild_settings("g1", &GuildSettings::all_enabled("C1"))
            .unwrap();

        assert!(db.get_guild_settings("g1").unwrap().is_some());
        assert_eq!(db.get_guild_settings("g2").unwrap(), None);
    }
}
