use crate::api::{Anime, AnimeApi, Quote};
use crate::cache::QuoteCache;
use crate::gateway::{Gateway, GuildRef, Notification};
use crate::services::settings::SettingsService;
use crate::settings::GuildSettings;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Scheduled job kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    DailyQuote,
    AiringCheck,
    WeeklyTop,
}

impl JobKind {
    pub const ALL: [JobKind; 3] = [JobKind::DailyQuote, JobKind::AiringCheck, JobKind::WeeklyTop];

    pub fn label(self) -> &'static str {
        match self {
            JobKind::DailyQuote => "daily-quote",
            JobKind::AiringCheck => "airing-check",
            JobKind::WeeklyTop => "weekly-top",
        }
    }

    /// Central gating policy. Daily quotes and airing alerts honor their
    /// enabled flag. The weekly ranking deliberately has no enabled gate
    /// and goes to every configured guild; keep that rule here, not in
    /// job bodies.
    pub fn enabled_for(self, settings: &GuildSettings) -> bool {
        match self {
            JobKind::DailyQuote => settings.daily_quotes_enabled,
            JobKind::AiringCheck => settings.airing_alerts_enabled,
            JobKind::WeeklyTop => true,
        }
    }

    /// Feature channel if set, else the guild's fallback channel.
    pub fn target_channel(self, settings: &GuildSettings) -> Option<String> {
        let feature_channel = match self {
            JobKind::DailyQuote => &settings.daily_quotes_channel,
            JobKind::AiringCheck => &settings.airing_alerts_channel,
            JobKind::WeeklyTop => &settings.top_anime_rankings_channel,
        };
        feature_channel
            .clone()
            .or_else(|| settings.notification_channel.clone())
    }
}

/// One run's worth of content, fetched once and shared across guilds.
#[derive(Debug, Clone)]
pub enum JobContent {
    Quote(Quote),
    Airing(Vec<Anime>),
    TopList(Vec<Anime>),
}

/// Where a job's content comes from; swapped out in tests.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn job_content(&self, kind: JobKind) -> Option<JobContent>;
}

/// Production content source: the upstream adapter plus the quote cache.
pub struct ContentProvider {
    api: Arc<AnimeApi>,
    quote_cache: Arc<QuoteCache>,
}

impl ContentProvider {
    pub fn new(api: Arc<AnimeApi>, quote_cache: Arc<QuoteCache>) -> Self {
        Self { api, quote_cache }
    }
}

#[async_trait]
impl ContentSource for ContentProvider {
    async fn job_content(&self, kind: JobKind) -> Option<JobContent> {
        match kind {
            JobKind::DailyQuote => {
                let api = self.api.clone();
                let quote = self
                    .quote_cache
                    .get_or_fetch(move || async move { api.generic_quote().await })
                    .await;
                Some(JobContent::Quote(quote))
            }
            JobKind::AiringCheck => {
                let list = self.api.currently_airing().await;
                (!list.is_empty()).then_some(JobContent::Airing(list))
            }
            JobKind::WeeklyTop => {
                let list = self.api.top_anime().await;
                (!list.is_empty()).then_some(JobContent::TopList(list))
            }
        }
    }
}

/// Fans a job's content out to every eligible guild.
///
/// Per-guild failures (store read, channel resolution, delivery) are logged
/// and never abort the remaining guilds. At most one run per job kind is in
/// flight; an overlapping fire of the same kind is skipped.
pub struct Dispatcher {
    settings: SettingsService,
    gateway: Arc<dyn Gateway>,
    content: Arc<dyn ContentSource>,
    in_flight: HashMap<JobKind, Mutex<()>>,
}

impl Dispatcher {
    pub fn new(
        settings: SettingsService,
        gateway: Arc<dyn Gateway>,
        content: Arc<dyn ContentSource>,
    ) -> Self {
        let in_flight = JobKind::ALL
            .into_iter()
            .map(|kind| (kind, Mutex::new(())))
            .collect();
        Self {
            settings,
            gateway,
            content,
            in_flight,
        }
    }

    pub async fn run_job(&self, kind: JobKind) {
        let _guard = match self.in_flight[&kind].try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("{} job is still running, skipping this fire", kind.label());
                return;
            }
        };

        let Some(content) = self.content.job_content(kind).await else {
            warn!("{} job has no content to send, skipping this run", kind.label());
            return;
        };

        let guilds = self.gateway.list_guilds().await;
        info!("{} job: fanning out to {} guilds", kind.label(), guilds.len());

        let mut delivered = 0usize;
        for guild in &guilds {
            match self.dispatch_to_guild(kind, guild, &content).await {
                Ok(true) => delivered += 1,
                Ok(false) => {}
                Err(e) => {
                    error!(
                        "{} job: guild {} ({}) failed: {e}",
                        kind.label(),
                        guild.id,
                        guild.name
                    );
                }
            }
        }
        info!(
            "{} job: delivered to {delivered}/{} guilds",
            kind.label(),
            guilds.len()
        );
    }

    async fn dispatch_to_guild(
        &self,
        kind: JobKind,
        guild: &GuildRef,
        content: &JobContent,
    ) -> anyhow::Result<bool> {
        // Absent record means the guild never configured the bot.
        let Some(settings) = self.settings.get(&guild.id).await? else {
            return Ok(false);
        };
        if !kind.enabled_for(&settings) {
            return Ok(false);
        }
        let Some(channel_id) = kind.target_channel(&settings) else {
            debug!(
                "{} job: guild {} has no target channel, skipping",
                kind.label(),
                guild.id
            );
            return Ok(false);
        };

        let channels = self.gateway.list_text_channels(&guild.id).await;
        if !channels.iter().any(|channel| channel.id == channel_id) {
            warn!(
                "{} job: channel {} not visible in guild {}, skipping",
                kind.label(),
                channel_id,
                guild.id
            );
            return Ok(false);
        }

        let notification = build_notification(content);
        self.gateway.send_message(&channel_id, &notification).await?;
        Ok(true)
    }
}

/// The airing spotlight picks one of the top five per guild; everything
/// else is shared verbatim.
fn build_notification(content: &JobContent) -> Notification {
    match content {
        JobContent::Quote(quote) => Notification::DailyQuote(quote.clone()),
        JobContent::Airing(list) => {
            let pool = &list[..list.len().min(5)];
            let pick = pool
                .choose(&mut rand::thread_rng())
                .expect("airing pool is non-empty");
            Notification::AiringSpotlight(pick.clone())
        }
        JobContent::TopList(list) => Notification::WeeklyTopAnime(list.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::gateway::ChannelRef;
    use std::collections::HashSet;
    use std::sync::Mutex as StdMutex;

    struct MockGateway {
        guilds: Vec<GuildRef>,
        channels: HashMap<String, Vec<ChannelRef>>,
        failing_channels: HashSet<String>,
        sent: StdMutex<Vec<String>>,
    }

    impl MockGateway {
        fn new(guilds: &[(&str, Vec<&str>)]) -> Self {
            let channels = guilds
                .iter()
                .map(|(guild_id, channel_ids)| {
                    let refs = channel_ids
                        .iter()
                        .map(|id| ChannelRef {
                            id: id.to_string(),
                            name: format!("chan-{id}"),
                        })
                        .collect();
                    (guild_id.to_string(), refs)
                })
                .collect();
            let guilds = guilds
                .iter()
                .map(|(guild_id, _)| GuildRef {
                    id: guild_id.to_string(),
                    name: format!("guild-{guild_id}"),
                })
                .collect();
            Self {
                guilds,
                channels,
                failing_channels: HashSet::new(),
                sent: StdMutex::new(Vec::new()),
            }
        }

        fn failing(mut self, channel_id: &str) -> Self {
            self.failing_channels.insert(channel_id.to_string());
            self
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Gateway for MockGateway {
        async fn list_guilds(&self) -> Vec<GuildRef> {
            self.guilds.clone()
        }

        async fn list_text_channels(&self, guild_id: &str) -> Vec<ChannelRef> {
            self.channels.get(guild_id).cloned().unwrap_or_default()
        }

        async fn send_message(
            &self,
            channel_id: &str,
            _notification: &Notification,
        ) -> anyhow::Result<()> {
            if self.failing_channels.contains(channel_id) {
                anyhow::bail!("delivery refused");
            }
            self.sent.lock().unwrap().push(channel_id.to_string());
            Ok(())
        }
    }

    struct StaticContent(Option<JobContent>);

    #[async_trait]
    impl ContentSource for StaticContent {
        async fn job_content(&self, _kind: JobKind) -> Option<JobContent> {
            self.0.clone()
        }
    }

    fn anime(id: i64) -> Anime {
        Anime {
            mal_id: id,
            title: format!("Anime {id}"),
            score: Some(8.1),
            episodes: Some(12),
            status: Some("Currently Airing".to_string()),
            rank: Some(id),
            url: None,
            images: None,
        }
    }

    fn airing_content() -> JobContent {
        JobContent::Airing(vec![anime(1), anime(2), anime(3)])
    }

    fn settings_service() -> SettingsService {
        SettingsService::new(Database::open_in_memory_for_tests())
    }

    fn airing_settings(channel: &str) -> GuildSettings {
        GuildSettings {
            notification_channel: Some(channel.to_string()),
            airing_alerts_enabled: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unconfigured_guilds_get_nothing() {
        let gateway = Arc::new(MockGateway::new(&[("g1", vec!["c1"]), ("g2", vec!["c2"])]));
        let dispatcher = Dispatcher::new(
            settings_service(),
            gateway.clone(),
            Arc::new(StaticContent(Some(airing_content()))),
        );

        for kind in JobKind::ALL {
            dispatcher.run_job(kind).await;
        }
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_channel_does_not_abort_the_run() {
        let settings = settings_service();
        settings.upsert("g1", airing_settings("c1")).await.unwrap();
        settings
            .upsert("g2", airing_settings("missing"))
            .await
            .unwrap();
        settings.upsert("g3", airing_settings("c3")).await.unwrap();

        let gateway = Arc::new(MockGateway::new(&[
            ("g1", vec!["c1"]),
            ("g2", vec!["c2"]),
            ("g3", vec!["c3"]),
        ]));
        let dispatcher = Dispatcher::new(
            settings,
            gateway.clone(),
            Arc::new(StaticContent(Some(airing_content()))),
        );

        dispatcher.run_job(JobKind::AiringCheck).await;

        assert_eq!(gateway.sent(), vec!["c1".to_string(), "c3".to_string()]);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_isolated_per_guild() {
        let settings = settings_service();
        for (guild, channel) in [("g1", "c1"), ("g2", "c2"), ("g3", "c3")] {
            settings
                .upsert(guild, airing_settings(channel))
                .await
                .unwrap();
        }

        let gateway = Arc::new(
            MockGateway::new(&[("g1", vec!["c1"]), ("g2", vec!["c2"]), ("g3", vec!["c3"])])
                .failing("c2"),
        );
        let dispatcher = Dispatcher::new(
            settings,
            gateway.clone(),
            Arc::new(StaticContent(Some(airing_content()))),
        );

        dispatcher.run_job(JobKind::AiringCheck).await;

        assert_eq!(gateway.sent(), vec!["c1".to_string(), "c3".to_string()]);
    }

    #[tokio::test]
    async fn test_disabled_flag_skips_the_guild() {
        let settings = settings_service();
        let mut disabled = airing_settings("c1");
        disabled.airing_alerts_enabled = false;
        settings.upsert("g1", disabled).await.unwrap();

        let gateway = Arc::new(MockGateway::new(&[("g1", vec!["c1"])]));
        let dispatcher = Dispatcher::new(
            settings,
            gateway.clone(),
            Arc::new(StaticContent(Some(airing_content()))),
        );

        dispatcher.run_job(JobKind::AiringCheck).await;
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn test_weekly_top_ignores_its_enabled_flag() {
        let settings = settings_service();
        // Configured record, everything disabled.
        settings
            .upsert(
                "g1",
                GuildSettings {
                    notification_channel: Some("c1".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let gateway = Arc::new(MockGateway::new(&[("g1", vec!["c1"]), ("g2", vec!["c2"])]));
        let dispatcher = Dispatcher::new(
            settings,
            gateway.clone(),
            Arc::new(StaticContent(Some(JobContent::TopList(vec![anime(1)])))),
        );

        dispatcher.run_job(JobKind::WeeklyTop).await;

        // g1 has a record so it receives the ranking; g2 has none and is
        // skipped even though weekly-top carries no enabled gate.
        assert_eq!(gateway.sent(), vec!["c1".to_string()]);
    }

    #[tokio::test]
    async fn test_feature_channel_overrides_fallback() {
        let settings = settings_service();
        let mut record = airing_settings("c-fallback");
        record.airing_alerts_channel = Some("c-airing".to_string());
        settings.upsert("g1", record).await.unwrap();

        let gateway = Arc::new(MockGateway::new(&[("g1", vec!["c-fallback", "c-airing"])]));
        let dispatcher = Dispatcher::new(
            settings,
            gateway.clone(),
            Arc::new(StaticContent(Some(airing_content()))),
        );

        dispatcher.run_job(JobKind::AiringCheck).await;
        assert_eq!(gateway.sent(), vec!["c-airing".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_content_skips_the_run() {
        let settings = settings_service();
        settings.upsert("g1", airing_settings("c1")).await.unwrap();

        let gateway = Arc::new(MockGateway::new(&[("g1", vec!["c1"])]));
        let dispatcher = Dispatcher::new(
            settings,
            gateway.clone(),
            Arc::new(StaticContent(None)),
        );

        dispatcher.run_job(JobKind::AiringCheck).await;
        assert!(gateway.sent().is_empty());
    }

    #[test]
    fn test_airing_pick_stays_within_top_five() {
        let list: Vec<Anime> = (1..=10).map(anime).collect();
        let content = JobContent::Airing(list);
        for _ in 0..50 {
            match build_notification(&content) {
                Notification::AiringSpotlight(pick) => assert!(pick.mal_id <= 5),
                other => panic!("unexpected notification {other:?}"),
            }
        }
    }
}
