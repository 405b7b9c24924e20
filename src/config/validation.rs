use crate::config::schema::{Config, NotificationsConfig};
use crate::notify::ntfy::priority_level;

#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Debug)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

pub fn validate_config(config: &Config) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    validate_log_level(&config.logging.level, &mut errors);
    validate_notifications(&config.notifications, &mut errors, &mut warnings);

    ValidationResult { errors, warnings }
}

fn validate_notifications(
    notifications: &NotificationsConfig,
    errors: &mut Vec<ValidationError>,
    warnings: &mut Vec<ValidationWarning>,
) {
    if notifications.enabled && notifications.configured_services() == 0 {
        warnings.push(ValidationWarning {
            field: "notifications".to_string(),
            message: "Notifications enabled but no services configured".to_string(),
        });
    }

    if let Some(ref telegram) = notifications.telegram {
        if telegram.api_token.trim().is_empty() {
            errors.push(ValidationError {
                field: "notifications.telegram.api_token".to_string(),
                message: "Telegram API token cannot be empty".to_string(),
                suggestion: Some("Create a bot with @BotFather and copy its token".to_string()),
            });
        }
        if let Some(ref api_url) = telegram.api_url {
            validate_url("notifications.telegram.api_url", api_url, errors);
        }
        warn_if_no_receivers(
            "notifications.telegram.chat_ids",
            telegram.chat_ids.is_empty(),
            warnings,
        );
    }

    if let Some(ref discord) = notifications.discord {
        for (index, url) in discord.webhook_urls.iter().enumerate() {
            validate_url(
                &format!("notifications.discord.webhook_urls[{index}]"),
                url,
                errors,
            );
        }
        warn_if_no_receivers(
            "notifications.discord.webhook_urls",
            discord.webhook_urls.is_empty(),
            warnings,
        );
    }

    if let Some(ref slack) = notifications.slack {
        for (index, url) in slack.webhook_urls.iter().enumerate() {
            validate_url(
                &format!("notifications.slack.webhook_urls[{index}]"),
                url,
                errors,
            );
        }
        warn_if_no_receivers(
            "notifications.slack.webhook_urls",
            slack.webhook_urls.is_empty(),
            warnings,
        );
    }

    if let Some(ref ntfy) = notifications.ntfy {
        for (index, topic) in ntfy.topics.iter().enumerate() {
            if topic.trim().is_empty() {
                errors.push(ValidationError {
                    field: format!("notifications.ntfy.topics[{index}]"),
                    message: "ntfy topic cannot be empty".to_string(),
                    suggestion: None,
                });
            }
        }
        if let Some(ref server) = ntfy.server {
            if !is_http_url(server) {
                errors.push(ValidationError {
                    field: "notifications.ntfy.server".to_string(),
                    message: "ntfy server must start with http:// or https://".to_string(),
                    suggestion: None,
                });
            }
        }
        if let Some(ref priority) = ntfy.priority {
            if priority_level(priority).is_none() {
                errors.push(ValidationError {
                    field: "notifications.ntfy.priority".to_string(),
                    message: format!("Unknown ntfy priority '{priority}'"),
                    suggestion: Some("Use min, low, default, high, max or 1-5".to_string()),
                });
            }
        }
        warn_if_no_receivers("notifications.ntfy.topics", ntfy.topics.is_empty(), warnings);
    }

    if let Some(ref webhook) = notifications.webhook {
        for (index, url) in webhook.urls.iter().enumerate() {
            validate_url(&format!("notifications.webhook.urls[{index}]"), url, errors);
        }
        warn_if_no_receivers("notifications.webhook.urls", webhook.urls.is_empty(), warnings);
    }
}

fn validate_log_level(level: &str, errors: &mut Vec<ValidationError>) {
    let level = level.trim().to_lowercase();
    let valid = ["trace", "debug", "info", "warn", "error"];
    if !valid.iter().any(|value| *value == level) {
        errors.push(ValidationError {
            field: "logging.level".to_string(),
            message: format!("Invalid log level: {level}"),
            suggestion: Some(format!("Valid levels: {}", valid.join(", "))),
        });
    }
}

fn validate_url(field: &str, url: &str, errors: &mut Vec<ValidationError>) {
    if !is_http_url(url) {
        errors.push(ValidationError {
            field: field.to_string(),
            message: "URL must start with http:// or https://".to_string(),
            suggestion: None,
        });
    }
}

fn warn_if_no_receivers(field: &str, empty: bool, warnings: &mut Vec<ValidationWarning>) {
    if empty {
        warnings.push(ValidationWarning {
            field: field.to_string(),
            message: "Service configured without receivers; sends will be no-ops".to_string(),
        });
    }
}

fn is_http_url(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value.starts_with("http://") || value.starts_with("https://")
}
