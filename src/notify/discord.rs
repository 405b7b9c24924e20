use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::schema::DiscordConfig;
use crate::notify::context::Context;
use crate::notify::error::NotifyError;
use crate::notify::service::{Notifier, WebhookUrl, deliver_each};

const CHANNEL: &str = "discord";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const EMBED_COLOR: u32 = 0x5865F2;

pub struct DiscordService {
    webhook_urls: Vec<WebhookUrl>,
    client: Client,
}

impl DiscordService {
    pub fn new(config: &DiscordConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Failed to build discord client; using defaults");
                Client::new()
            });

        Self {
            webhook_urls: config.webhook_urls.iter().cloned().map(WebhookUrl::from).collect(),
            client,
        }
    }

    pub fn add_receivers<I, S>(&mut self, webhook_urls: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<WebhookUrl>,
    {
        self.webhook_urls.extend(webhook_urls.into_iter().map(Into::into));
    }

    pub fn receivers(&self) -> &[WebhookUrl] {
        &self.webhook_urls
    }

    async fn post(
        &self,
        webhook_url: &WebhookUrl,
        payload: &DiscordWebhookPayload,
    ) -> Result<(), String> {
        let response = self
            .client
            .post(webhook_url.as_str())
            .json(payload)
            .send()
            .await
            .map_err(|err| format!("discord request error: {}", err.without_url()))?;

        if !response.status().is_success() {
            return Err(format!("discord returned status {}", response.status()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for DiscordService {
    fn name(&self) -> &str {
        CHANNEL
    }

    async fn send(&self, ctx: &Context, subject: &str, message: &str) -> Result<(), NotifyError> {
        let payload = build_payload(subject, message, chrono::Utc::now());
        let payload = &payload;

        deliver_each(ctx, CHANNEL, &self.webhook_urls, move |url| self.post(url, payload)).await?;

        debug!(
            channel = CHANNEL,
            webhooks = self.webhook_urls.len(),
            "Discord notification sent"
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct DiscordWebhookPayload {
    embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    color: u32,
    timestamp: String,
}

fn build_payload(
    subject: &str,
    message: &str,
    timestamp: chrono::DateTime<chrono::Utc>,
) -> DiscordWebhookPayload {
    DiscordWebhookPayload {
        embeds: vec![DiscordEmbed {
            title: subject.to_string(),
            description: message.to_string(),
            color: EMBED_COLOR,
            timestamp: timestamp.to_rfc3339(),
        }],
    }
}
