use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::schema::SlackConfig;
use crate::notify::context::Context;
use crate::notify::error::NotifyError;
use crate::notify::service::{Notifier, WebhookUrl, deliver_each};

const CHANNEL: &str = "slack";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How the message body is rendered inside the section block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlackTextMode {
    #[default]
    Mrkdwn,
    PlainText,
}

impl SlackTextMode {
    fn block_type(self) -> &'static str {
        match self {
            SlackTextMode::Mrkdwn => "mrkdwn",
            SlackTextMode::PlainText => "plain_text",
        }
    }
}

pub struct SlackService {
    webhook_urls: Vec<WebhookUrl>,
    text_mode: SlackTextMode,
    client: Client,
}

impl SlackService {
    pub fn new(config: &SlackConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Failed to build slack client; using defaults");
                Client::new()
            });

        Self {
            webhook_urls: config.webhook_urls.iter().cloned().map(WebhookUrl::from).collect(),
            text_mode: config.text_mode,
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
        payload: &SlackWebhookPayload,
    ) -> Result<(), String> {
        let response = self
            .client
            .post(webhook_url.as_str())
            .json(payload)
            .send()
            .await
            .map_err(|err| format!("slack request error: {}", err.without_url()))?;

        if !response.status().is_success() {
            return Err(format!("slack returned status {}", response.status()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackService {
    fn name(&self) -> &str {
        CHANNEL
    }

    async fn send(&self, ctx: &Context, subject: &str, message: &str) -> Result<(), NotifyError> {
        let payload = build_payload(subject, message, self.text_mode);
        let payload = &payload;

        deliver_each(ctx, CHANNEL, &self.webhook_urls, move |url| self.post(url, payload)).await?;

        debug!(
            channel = CHANNEL,
            webhooks = self.webhook_urls.len(),
            "Slack notification sent"
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct SlackWebhookPayload {
    /// Fallback shown in push notifications.
    text: String,
    blocks: Vec<SlackBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum SlackBlock {
    #[serde(rename = "header")]
    Header { text: SlackText },
    #[serde(rename = "section")]
    Section { text: SlackText },
}

#[derive(Debug, Serialize)]
struct SlackText {
    #[serde(rename = "type")]
    text_type: &'static str,
    text: String,
}

fn build_payload(subject: &str, message: &str, text_mode: SlackTextMode) -> SlackWebhookPayload {
    SlackWebhookPayload {
        text: subject.to_string(),
        blocks: vec![
            SlackBlock::Header {
                text: SlackText {
                    text_type: "plain_text",
                    text: subject.to_string(),
                },
            },
            SlackBlock::Section {
                text: SlackText {
                    text_type: text_mode.block_type(),
                    text: message.to_string(),
                },
            },
        ],
    }
}
