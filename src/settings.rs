use serde::{Deserialize, Serialize};

/// Per-guild notification configuration.
///
/// A row exists only once a guild has been configured through `/setup` or a
/// dashboard save; an absent row means "not configured", not "disabled".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GuildSettings {
    /// Fallback target for any feature without its own channel.
    pub notification_channel: Option<String>,
    pub daily_quotes_enabled: bool,
    pub daily_quotes_channel: Option<String>,
    pub airing_alerts_enabled: bool,
    pub airing_alerts_channel: Option<String>,
    pub trailer_notifications_enabled: bool,
    pub trailer_notifications_channel: Option<String>,
    pub top_anime_rankings_enabled: bool,
    pub top_anime_rankings_channel: Option<String>,
    pub anime_search_enabled: bool,
    pub anime_search_channel: Option<String>,
}

impl GuildSettings {
    /// `/setup` seeds every feature enabled and pointed at a single channel.
    pub fn all_enabled(channel_id: &str) -> Self {
        let channel = Some(channel_id.to_string());
        Self {
            notification_channel: channel.clone(),
            daily_quotes_enabled: true,
            daily_quotes_channel: channel.clone(),
            airing_alerts_enabled: true,
            airing_alerts_channel: channel.clone(),
            trailer_notifications_enabled: true,
            trailer_notifications_channel: channel.clone(),
            top_anime_rankings_enabled: true,
            top_anime_rankings_channel: channel.clone(),
            anime_search_enabled: true,
            anime_search_channel: channel,
        }
    }
}

/// Flat dashboard form submission. Checkboxes arrive as `"on"` when checked
/// and are absent otherwise; channel selects may arrive empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsForm {
    pub guild_id: Option<String>,
    pub daily_quotes: Option<String>,
    pub airing_alerts: Option<String>,
    pub trailer_notifications: Option<String>,
    pub top_anime_rankings: Option<String>,
    pub anime_search: Option<String>,
    pub daily_quotes_channel: Option<String>,
    pub airing_alerts_channel: Option<String>,
    pub trailer_notifications_channel: Option<String>,
    pub top_anime_rankings_channel: Option<String>,
    pub anime_search_channel: Option<String>,
}

impl SettingsForm {
    /// The guild this submission targets; `None` rejects the whole request.
    pub fn guild_id(&self) -> Option<&str> {
        self.guild_id.as_deref().filter(|id| !id.is_empty())
    }
}

fn checked(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

fn channel(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

/// Reconciles a form submission with the stored record.
///
/// Enabled flags are a full replace in both branches: an unchecked box means
/// disabled. For an already-configured guild, an omitted channel selection
/// resets that feature to the guild's `notification_channel`, not to the
/// feature's previous channel.
pub fn merge(existing: Option<GuildSettings>, form: &SettingsForm) -> GuildSettings {
    let daily_quotes_channel = channel(&form.daily_quotes_channel);
    let airing_alerts_channel = channel(&form.airing_alerts_channel);
    let trailer_notifications_channel = channel(&form.trailer_notifications_channel);
    let top_anime_rankings_channel = channel(&form.top_anime_rankings_channel);
    let anime_search_channel = channel(&form.anime_search_channel);

    match existing {
        None => GuildSettings {
            // First save: the fallback channel is the first submitted
            // selection, in feature order.
            notification_channel: daily_quotes_channel
                .clone()
                .or_else(|| airing_alerts_channel.clone())
                .or_else(|| trailer_notifications_channel.clone())
                .or_else(|| top_anime_rankings_channel.clone())
                .or_else(|| anime_search_channel.clone()),
            daily_quotes_enabled: checked(&form.daily_quotes),
            daily_quotes_channel,
            airing_alerts_enabled: checked(&form.airing_alerts),
            airing_alerts_channel,
            trailer_notifications_enabled: checked(&form.trailer_notifications),
            trailer_notifications_channel,
            top_anime_rankings_enabled: checked(&form.top_anime_rankings),
            top_anime_rankings_channel,
            anime_search_enabled: checked(&form.anime_search),
            anime_search_channel,
        },
        Some(existing) => {
            let fallback = existing.notification_channel.clone();
            GuildSettings {
                notification_channel: existing.notification_channel,
                daily_quotes_enabled: checked(&form.daily_quotes),
                daily_quotes_channel: daily_quotes_channel.or_else(|| fallback.clone()),
                airing_alerts_enabled: checked(&form.airing_alerts),
                airing_alerts_channel: airing_alerts_channel.or_else(|| fallback.clone()),
                trailer_notifications_enabled: checked(&form.trailer_notifications),
                trailer_notifications_channel: trailer_notifications_channel
                    .or_else(|| fallback.clone()),
                top_anime_rankings_enabled: checked(&form.top_anime_rankings),
                top_anime_rankings_channel: top_anime_rankings_channel
                    .or_else(|| fallback.clone()),
                anime_search_enabled: checked(&form.anime_search),
                anime_search_channel: anime_search_channel.or(fallback),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SettingsForm {
        SettingsForm::default()
    }

    #[test]
    fn test_merge_first_save_picks_fallback_by_priority() {
        let mut incoming = form();
        incoming.daily_quotes_channel = Some("C1".to_string());
        incoming.airing_alerts_channel = Some("C2".to_string());

        let merged = merge(None, &incoming);

        assert_eq!(merged.notification_channel.as_deref(), Some("C1"));
        assert_eq!(merged.daily_quotes_channel.as_deref(), Some("C1"));
        assert_eq!(merged.airing_alerts_channel.as_deref(), Some("C2"));
        assert!(!merged.daily_quotes_enabled);
        assert!(!merged.airing_alerts_enabled);
        assert_eq!(merged.trailer_notifications_channel, None);
    }

    #[test]
    fn test_merge_first_save_priority_skips_missing_slots() {
        let mut incoming = form();
        incoming.top_anime_rankings_channel = Some("C9".to_string());

        let merged = merge(None, &incoming);
        assert_eq!(merged.notification_channel.as_deref(), Some("C9"));
    }

    #[test]
    fn test_merge_omitted_channel_resets_to_fallback() {
        let existing = GuildSettings {
            notification_channel: Some("C0".to_string()),
            daily_quotes_enabled: true,
            daily_quotes_channel: Some("C1".to_string()),
            ..Default::default()
        };
        let mut incoming = form();
        incoming.daily_quotes = Some("on".to_string());

        let merged = merge(Some(existing), &incoming);

        // Not the previous per-type channel: the guild's fallback.
        assert_eq!(merged.daily_quotes_channel.as_deref(), Some("C0"));
        assert!(merged.daily_quotes_enabled);
        assert_eq!(merged.notification_channel.as_deref(), Some("C0"));
    }

    #[test]
    fn test_merge_unchecked_box_disables() {
        let existing = GuildSettings {
            notification_channel: Some("C0".to_string()),
            airing_alerts_enabled: true,
            airing_alerts_channel: Some("C2".to_string()),
            ..Default::default()
        };
        let merged = merge(Some(existing), &form());

        assert!(!merged.airing_alerts_enabled);
        assert_eq!(merged.airing_alerts_channel.as_deref(), Some("C0"));
    }

    #[test]
    fn test_merge_submitted_channel_wins_over_fallback() {
        let existing = GuildSettings {
            notification_channel: Some("C0".to_string()),
            ..Default::default()
        };
        let mut incoming = form();
        incoming.trailer_notifications_channel = Some("C7".to_string());

        let merged = merge(Some(existing), &incoming);
        assert_eq!(
            merged.trailer_notifications_channel.as_deref(),
            Some("C7")
        );
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let mut incoming = form();
        incoming.guild_id = Some(String::new());
        incoming.daily_quotes = Some(String::new());
        incoming.daily_quotes_channel = Some(String::new());

        assert_eq!(incoming.guild_id(), None);

        let merged = merge(None, &incoming);
        assert!(!merged.daily_quotes_enabled);
        assert_eq!(merged.daily_quotes_channel, None);
        assert_eq!(merged.notification_channel, None);
    }

    #[test]
    fn test_all_enabled_points_everything_at_one_channel() {
        let settings = GuildSettings::all_enabled("C42");
        assert_eq!(settings.notification_channel.as_deref(), Some("C42"));
        assert!(settings.daily_quotes_enabled);
        assert!(settings.anime_search_enabled);
        assert_eq!(settings.top_anime_rankings_channel.as_deref(), Some("C42"));
    }
}
