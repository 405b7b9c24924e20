//! Telegram Bot API service.
//!
//! Messages are delivered with `sendMessage`, one request per registered chat.
//! The bot token is checked with `getMe` when the service is created.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::schema::TelegramConfig;
use crate::notify::context::Context;
use crate::notify::error::NotifyError;
use crate::notify::service::{Notifier, deliver_each, render_message};

const CHANNEL: &str = "telegram";
const DEFAULT_API_URL: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How Telegram should interpret markup in the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParseMode {
    #[default]
    #[serde(rename = "HTML", alias = "html")]
    Html,
    #[serde(alias = "markdown")]
    Markdown,
    #[serde(alias = "markdownv2")]
    MarkdownV2,
    #[serde(rename = "plain")]
    Plain,
}

impl ParseMode {
    fn as_api_value(self) -> Option<&'static str> {
        match self {
            ParseMode::Html => Some("HTML"),
            ParseMode::Markdown => Some("Markdown"),
            ParseMode::MarkdownV2 => Some("MarkdownV2"),
            ParseMode::Plain => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelegramOptions {
    pub parse_mode: ParseMode,
    pub api_url: String,
}

impl Default for TelegramOptions {
    fn default() -> Self {
        Self {
            parse_mode: ParseMode::default(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl TelegramOptions {
    pub fn with_parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

pub struct Telegram {
    client: Client,
    endpoint: String,
    chat_ids: Vec<i64>,
    parse_mode: ParseMode,
    bot_username: Option<String>,
}

impl Telegram {
    /// Connects to the Bot API and verifies `api_token`.
    pub async fn new(api_token: &str, options: TelegramOptions) -> Result<Self, NotifyError> {
        let api_token = api_token.trim();
        if api_token.is_empty() {
            return Err(construction_error("API token cannot be empty"));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| construction_error(format!("failed to build HTTP client: {err}")))?;
        let endpoint = format!("{}/bot{}", options.api_url.trim_end_matches('/'), api_token);

        let response = client
            .get(format!("{endpoint}/getMe"))
            .send()
            .await
            .map_err(|err| construction_error(format!("getMe request error: {}", err.without_url())))?;
        let bot: Option<BotUser> = read_api_response(response)
            .await
            .map_err(construction_error)?;
        let bot_username = bot.and_then(|bot| bot.username);

        info!(
            bot = bot_username.as_deref().unwrap_or("unknown"),
            parse_mode = ?options.parse_mode,
            "Telegram service connected"
        );

        Ok(Self {
            client,
            endpoint,
            chat_ids: Vec::new(),
            parse_mode: options.parse_mode,
            bot_username,
        })
    }

    pub async fn from_config(config: &TelegramConfig) -> Result<Self, NotifyError> {
        let mut options = TelegramOptions::default().with_parse_mode(config.parse_mode);
        if let Some(api_url) = &config.api_url {
            options = options.with_api_url(api_url.clone());
        }

        let mut telegram = Self::new(&config.api_token, options).await?;
        telegram.add_receivers(config.chat_ids.iter().copied());
        Ok(telegram)
    }

    /// Adds chats that every later `send` delivers to.
    pub fn add_receivers<I>(&mut self, chat_ids: I)
    where
        I: IntoIterator<Item = i64>,
    {
        self.chat_ids.extend(chat_ids);
    }

    pub fn receivers(&self) -> &[i64] {
        &self.chat_ids
    }

    pub fn parse_mode(&self) -> ParseMode {
        self.parse_mode
    }

    pub fn bot_username(&self) -> Option<&str> {
        self.bot_username.as_deref()
    }

    async fn send_to(&self, chat_id: i64, text: &str) -> Result<(), String> {
        let payload = SendMessage {
            chat_id,
            text,
            parse_mode: self.parse_mode.as_api_value(),
        };

        let response = self
            .client
            .post(format!("{}/sendMessage", self.endpoint))
            .json(&payload)
            .send()
            .await
            .map_err(|err| format!("telegram request error: {}", err.without_url()))?;

        read_api_response::<serde_json::Value>(response)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl Notifier for Telegram {
    fn name(&self) -> &str {
        CHANNEL
    }

    async fn send(&self, ctx: &Context, subject: &str, message: &str) -> Result<(), NotifyError> {
        let text = render_message(subject, message);
        let text = text.as_str();

        deliver_each(ctx, CHANNEL, &self.chat_ids, move |chat_id| {
            self.send_to(*chat_id, text)
        })
        .await?;

        debug!(
            channel = CHANNEL,
            chats = self.chat_ids.len(),
            "Telegram notification sent"
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct BotUser {
    username: Option<String>,
}

async fn read_api_response<T: DeserializeOwned>(response: Response) -> Result<Option<T>, String> {
    let status = response.status();
    let body: ApiResponse<T> = response
        .json()
        .await
        .map_err(|err| format!("telegram returned status {status}: {}", err.without_url()))?;

    if body.ok && status.is_success() {
        return Ok(body.result);
    }

    Err(match body.description {
        Some(description) => format!("telegram returned status {status}: {description}"),
        None => format!("telegram returned status {status}"),
    })
}

fn construction_error(message: impl Into<String>) -> NotifyError {
    NotifyError::Construction {
        channel: CHANNEL,
        message: message.into(),
    }
}
