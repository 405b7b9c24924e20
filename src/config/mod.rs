//! Configuration management module.

pub mod loader;
pub mod paths;
pub mod schema;
pub mod validation;

pub use loader::{ConfigError, load_config, load_default_config};
pub use paths::{PathError, Paths};
pub use schema::{
    Config, DiscordConfig, LoggingConfig, NotificationsConfig, NtfyConfig, SlackConfig,
    TelegramConfig, WebhookConfig,
};
pub use validation::{ValidationError, ValidationResult, ValidationWarning, validate_config};
