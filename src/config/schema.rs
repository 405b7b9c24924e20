use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::notify::slack::SlackTextMode;
use crate::notify::telegram::ParseMode;

/// Root configuration for herald.
///
/// Example:
/// ```toml
/// [logging]
/// level = "info"
///
/// [notifications]
/// enabled = true
///
/// [notifications.telegram]
/// api_token = "123456:ABC"
/// chat_ids = [-1001234567890]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Logging configuration section.
    /// Example: [logging]
    pub logging: LoggingConfig,
    /// Notification service configuration section.
    /// Example: [notifications]
    pub notifications: NotificationsConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    /// Example: level = "info"
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    /// Example: json = false
    pub json: bool,
    /// Also append logs to `herald.log` in the state directory.
    /// Example: log_file = false
    pub log_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_file: false,
        }
    }
}

/// Notification service configuration.
///
/// Services are registered in the order telegram, discord, slack, ntfy, webhook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Master switch; when false every send is silently dropped.
    /// Example: enabled = true
    pub enabled: bool,
    /// Telegram bot configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<TelegramConfig>,
    /// Discord webhook configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<DiscordConfig>,
    /// Slack webhook configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slack: Option<SlackConfig>,
    /// ntfy.sh configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ntfy: Option<NtfyConfig>,
    /// Generic JSON webhook configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookConfig>,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            telegram: None,
            discord: None,
            slack: None,
            ntfy: None,
            webhook: None,
        }
    }
}

impl NotificationsConfig {
    pub fn configured_services(&self) -> usize {
        [
            self.telegram.is_some(),
            self.discord.is_some(),
            self.slack.is_some(),
            self.ntfy.is_some(),
            self.webhook.is_some(),
        ]
        .into_iter()
        .filter(|configured| *configured)
        .count()
    }
}

/// Telegram bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelegramConfig {
    /// Bot API token from @BotFather.
    /// Example: api_token = "123456:ABC-DEF"
    pub api_token: String,
    /// Chats to deliver to.
    /// Example: chat_ids = [-1001234567890, 42]
    #[serde(default)]
    pub chat_ids: Vec<i64>,
    /// Message markup (HTML, Markdown, MarkdownV2, plain).
    /// Example: parse_mode = "HTML"
    #[serde(default)]
    pub parse_mode: ParseMode,
    /// Custom Bot API server.
    /// Example: api_url = "https://api.telegram.org"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

/// Discord webhook configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscordConfig {
    /// Discord webhook URLs.
    /// Example: webhook_urls = ["https://discord.com/api/webhooks/..."]
    #[serde(default)]
    pub webhook_urls: Vec<String>,
}

/// Slack incoming-webhook configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlackConfig {
    /// Slack webhook URLs.
    /// Example: webhook_urls = ["https://hooks.slack.com/services/..."]
    #[serde(default)]
    pub webhook_urls: Vec<String>,
    /// Message body rendering (mrkdwn or plain_text).
    /// Example: text_mode = "mrkdwn"
    #[serde(default)]
    pub text_mode: SlackTextMode,
}

/// ntfy.sh configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NtfyConfig {
    /// ntfy topic names.
    /// Example: topics = ["deploys"]
    #[serde(default)]
    pub topics: Vec<String>,
    /// Custom ntfy server (default: ntfy.sh).
    /// Example: server = "https://ntfy.sh"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Notification priority.
    /// Example: priority = "high"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Render the message body as Markdown.
    /// Example: markdown = false
    #[serde(default)]
    pub markdown: bool,
}

/// Generic webhook configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebhookConfig {
    /// Webhook URLs.
    /// Example: urls = ["https://example.com/hooks"]
    #[serde(default)]
    pub urls: Vec<String>,
    /// Optional custom headers.
    /// Example: headers = { Authorization = "Bearer token" }
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}
