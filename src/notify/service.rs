use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::notify::context::Context;
use crate::notify::error::NotifyError;

/// A notification service: anything that can deliver a subject and message.
///
/// Services own their destinations and formatting; the same `send` shape is
/// shared by [`crate::notify::Dispatcher`], so dispatchers nest.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;
    async fn send(&self, ctx: &Context, subject: &str, message: &str) -> Result<(), NotifyError>;
}

/// Subject on the first line, message below it.
pub fn render_message(subject: &str, message: &str) -> String {
    format!("{subject}\n{message}")
}

/// A webhook URL whose `Display` and `Debug` output hide the secret parts.
///
/// Webhook URLs usually carry their credential as the last path segment, so
/// that segment, any query string and any userinfo are left out. Use
/// [`WebhookUrl::as_str`] to reach the real URL.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookUrl(String);

impl WebhookUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for WebhookUrl {
    fn from(url: String) -> Self {
        Self(url)
    }
}

impl From<&str> for WebhookUrl {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}

impl fmt::Display for WebhookUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(url) = Url::parse(&self.0) else {
            return f.write_str("<invalid url>");
        };

        write!(f, "{}://{}", url.scheme(), url.host_str().unwrap_or_default())?;
        if let Some(port) = url.port() {
            write!(f, ":{port}")?;
        }
        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|segment| !segment.is_empty()).collect())
            .unwrap_or_default();
        if let Some((_, visible)) = segments.split_last() {
            for segment in visible {
                write!(f, "/{segment}")?;
            }
            f.write_str("/***")?;
        }
        Ok(())
    }
}

impl fmt::Debug for WebhookUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WebhookUrl")
            .field(&format_args!("{self}"))
            .finish()
    }
}

/// Runs one delivery per receiver, in order.
///
/// The context is checked before every delivery. The first failure is wrapped
/// with the receiver it was aimed at and ends the loop.
pub async fn deliver_each<'a, R, F, Fut>(
    ctx: &Context,
    channel: &'static str,
    receivers: &'a [R],
    mut deliver: F,
) -> Result<(), NotifyError>
where
    R: fmt::Display,
    F: FnMut(&'a R) -> Fut,
    Fut: Future<Output = Result<(), String>>,
{
    for receiver in receivers {
        ctx.check()?;
        if let Err(message) = deliver(receiver).await {
            return Err(NotifyError::Delivery {
                channel,
                receiver: receiver.to_string(),
                message,
            });
        }
        debug!(channel, receiver = %receiver, "Notification delivered");
    }
    Ok(())
}
