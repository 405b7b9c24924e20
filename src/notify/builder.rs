use std::sync::Arc;

use tracing::info;

use crate::config::schema::NotificationsConfig;
use crate::notify::discord::DiscordService;
use crate::notify::dispatcher::{DispatchOption, Dispatcher};
use crate::notify::error::NotifyError;
use crate::notify::ntfy::NtfyService;
use crate::notify::service::Notifier;
use crate::notify::slack::SlackService;
use crate::notify::telegram::Telegram;
use crate::notify::webhook::WebhookService;

/// Builds the services described by `config`, in the order telegram, discord,
/// slack, ntfy, webhook.
pub async fn build_services(
    config: &NotificationsConfig,
) -> Result<Vec<Arc<dyn Notifier>>, NotifyError> {
    let mut services: Vec<Arc<dyn Notifier>> = Vec::new();

    if let Some(telegram) = &config.telegram {
        services.push(Arc::new(Telegram::from_config(telegram).await?));
    }
    if let Some(discord) = &config.discord {
        services.push(Arc::new(DiscordService::new(discord)));
    }
    if let Some(slack) = &config.slack {
        services.push(Arc::new(SlackService::new(slack)));
    }
    if let Some(ntfy) = &config.ntfy {
        services.push(Arc::new(NtfyService::new(ntfy)));
    }
    if let Some(webhook) = &config.webhook {
        services.push(Arc::new(WebhookService::new(webhook)));
    }

    Ok(services)
}

/// Builds a dispatcher from configuration. Services are built even when
/// notifications are disabled so the dispatcher can be enabled later.
pub async fn build_dispatcher(config: &NotificationsConfig) -> Result<Dispatcher, NotifyError> {
    let option = if config.enabled {
        DispatchOption::Enable
    } else {
        DispatchOption::Disable
    };
    let dispatcher = Dispatcher::with_options([option]);
    dispatcher.use_services(build_services(config).await?);

    info!(
        enabled = dispatcher.is_enabled(),
        services = ?dispatcher.service_names(),
        "Notification dispatcher ready"
    );
    Ok(dispatcher)
}
