pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod db;
pub mod dispatcher;
pub mod gateway;
pub mod rate_limit;
pub mod scheduler;
pub mod services;
pub mod settings;
pub mod web;

use std::sync::Arc;

/// Custom data passed to all commands
pub struct Data {
    pub config: config::Config,
    pub api: Arc<api::AnimeApi>,
    pub settings: services::settings::SettingsService,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
