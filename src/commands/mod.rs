pub mod anime;
pub mod help;
pub mod settings;
pub mod setup;
