use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::schema::NtfyConfig;
use crate::notify::context::Context;
use crate::notify::error::NotifyError;
use crate::notify::service::{Notifier, deliver_each};

const CHANNEL: &str = "ntfy";
const DEFAULT_SERVER: &str = "https://ntfy.sh";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Publishes through ntfy's JSON endpoint, one request per topic.
///
/// The subject travels in the body rather than the `Title` header, so
/// multi-line and non-ASCII subjects are delivered unchanged.
pub struct NtfyService {
    topics: Vec<String>,
    server: String,
    priority: Option<u8>,
    markdown: bool,
    client: Client,
}

impl NtfyService {
    pub fn new(config: &NtfyConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build ntfy client; using defaults");
                Client::new()
            });

        let priority = config.priority.as_deref().and_then(|priority| {
            let level = priority_level(priority);
            if level.is_none() {
                warn!(priority, "Unknown ntfy priority; using server default");
            }
            level
        });

        Self {
            topics: config.topics.clone(),
            server: config
                .server
                .clone()
                .unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            priority,
            markdown: config.markdown,
            client,
        }
    }

    pub fn add_receivers<I, S>(&mut self, topics: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics.extend(topics.into_iter().map(Into::into));
    }

    pub fn receivers(&self) -> &[String] {
        &self.topics
    }

    fn publish_url(&self) -> String {
        format!("{}/", self.server.trim_end_matches('/'))
    }

    async fn publish(&self, topic: &str, subject: &str, message: &str) -> Result<(), String> {
        let payload = NtfyMessage {
            topic: topic.trim_start_matches('/'),
            title: subject,
            message,
            priority: self.priority,
            markdown: self.markdown,
        };

        let response = self
            .client
            .post(self.publish_url())
            .json(&payload)
            .send()
            .await
            .map_err(|err| format!("ntfy request error: {}", err.without_url()))?;

        if !response.status().is_success() {
            return Err(format!("ntfy returned status {}", response.status()));
        }
        Ok(())
    }
}

/// Maps an ntfy priority name or number to its 1..=5 level.
pub(crate) fn priority_level(priority: &str) -> Option<u8> {
    match priority.trim().to_ascii_lowercase().as_str() {
        "1" | "min" => Some(1),
        "2" | "low" => Some(2),
        "3" | "default" => Some(3),
        "4" | "high" => Some(4),
        "5" | "max" | "urgent" => Some(5),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct NtfyMessage<'a> {
    topic: &'a str,
    title: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<u8>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    markdown: bool,
}

#[async_trait]
impl Notifier for NtfyService {
    fn name(&self) -> &str {
        CHANNEL
    }

    async fn send(&self, ctx: &Context, subject: &str, message: &str) -> Result<(), NotifyError> {
        deliver_each(ctx, CHANNEL, &self.topics, move |topic| {
            self.publish(topic, subject, message)
        })
        .await?;

        debug!(channel = CHANNEL, topics = self.topics.len(), "ntfy notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: Option<String>, topics: &[&str]) -> NtfyConfig {
        NtfyConfig {
            topics: topics.iter().map(|topic| topic.to_string()).collect(),
            server,
            priority: None,
            markdown: false,
        }
    }

    #[test]
    fn publish_url_is_server_root() {
        let ntfy = NtfyService::new(&config(Some("https://push.example.com/".to_string()), &[]));
        assert_eq!(ntfy.publish_url(), "https://push.example.com/");
    }

    #[test]
    fn default_server_is_ntfy_sh() {
        let ntfy = NtfyService::new(&config(None, &["alerts"]));
        assert_eq!(ntfy.publish_url(), "https://ntfy.sh/");
    }

    #[test]
    fn priority_accepts_names_and_numbers() {
        assert_eq!(priority_level("high"), Some(4));
        assert_eq!(priority_level("URGENT"), Some(5));
        assert_eq!(priority_level("2"), Some(2));
        assert_eq!(priority_level("loud"), None);
    }

    #[tokio::test]
    async fn send_publishes_title_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_json(json!({
                "topic": "deploys",
                "title": "Deploy",
                "message": "v1.2 is live",
                "priority": 4,
                "markdown": true
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let ntfy = NtfyService::new(&NtfyConfig {
            topics: vec!["deploys".to_string()],
            server: Some(server.uri()),
            priority: Some("high".to_string()),
            markdown: true,
        });

        let result = ntfy.send(&Context::background(), "Deploy", "v1.2 is live").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn send_keeps_multiline_and_non_ascii_subjects() {
        let server = MockServer::start().await;
        for title in ["Line1\nLine2", "Déploiement ✅"] {
            Mock::given(method("POST"))
                .and(path("/"))
                .and(body_partial_json(json!({ "topic": "deploys", "title": title })))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(&server)
                .await;
        }

        let ntfy = NtfyService::new(&config(Some(server.uri()), &["deploys"]));

        ntfy.send(&Context::background(), "Line1\nLine2", "ok")
            .await
            .unwrap();
        ntfy.send(&Context::background(), "Déploiement ✅", "ok")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn send_reports_failing_topic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "topic": "ok" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "topic": "forbidden" })))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let mut ntfy = NtfyService::new(&config(Some(server.uri()), &["ok"]));
        ntfy.add_receivers(["forbidden"]);

        let err = ntfy
            .send(&Context::background(), "Subject", "Body")
            .await
            .unwrap_err();

        match err {
            NotifyError::Delivery {
                receiver, message, ..
            } => {
                assert_eq!(receiver, "forbidden");
                assert!(message.contains("403"));
            }
            other => panic!("expected delivery error, got {other:?}"),
        }
    }
}
