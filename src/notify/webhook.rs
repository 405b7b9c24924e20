use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderName, HeaderValue};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::schema::WebhookConfig;
use crate::notify::context::Context;
use crate::notify::error::NotifyError;
use crate::notify::service::{Notifier, WebhookUrl, deliver_each};

const CHANNEL: &str = "webhook";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts `{"subject": ..., "message": ...}` as JSON to each URL.
pub struct WebhookService {
    urls: Vec<WebhookUrl>,
    headers: Option<HashMap<String, String>>,
    client: Client,
}

impl WebhookService {
    pub fn new(config: &WebhookConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build webhook client; using defaults");
                Client::new()
            });

        Self {
            urls: config.urls.iter().cloned().map(WebhookUrl::from).collect(),
            headers: config.headers.clone(),
            client,
        }
    }

    pub fn add_receivers<I, S>(&mut self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<WebhookUrl>,
    {
        self.urls.extend(urls.into_iter().map(Into::into));
    }

    pub fn receivers(&self) -> &[WebhookUrl] {
        &self.urls
    }

    async fn post(&self, url: &WebhookUrl, payload: &WebhookPayload<'_>) -> Result<(), String> {
        let request = self.client.post(url.as_str()).json(payload);
        let request = apply_headers(request, self.headers.as_ref());

        match request.send().await {
            Ok(response) => {
                if response.status().is_success() {
                    Ok(())
                } else {
                    Err(format!("Unexpected status: {}", response.status()))
                }
            }
            Err(err) => Err(format!("Request error: {}", err.without_url())),
        }
    }
}

#[async_trait]
impl Notifier for WebhookService {
    fn name(&self) -> &str {
        CHANNEL
    }

    async fn send(&self, ctx: &Context, subject: &str, message: &str) -> Result<(), NotifyError> {
        let payload = WebhookPayload { subject, message };
        let payload = &payload;

        deliver_each(ctx, CHANNEL, &self.urls, move |url| self.post(url, payload)).await?;

        debug!(channel = CHANNEL, urls = self.urls.len(), "Webhook notification sent");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    subject: &'a str,
    message: &'a str,
}

fn apply_headers(
    request: reqwest::RequestBuilder,
    headers: Option<&HashMap<String, String>>,
) -> reqwest::RequestBuilder {
    let Some(headers) = headers else {
        return request;
    };

    let mut request = request;
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes());
        let value = HeaderValue::from_str(value);
        match (name, value) {
            (Ok(name), Ok(value)) => {
                request = request.header(name, value);
            }
            _ => {
                warn!(header = %key, "Invalid webhook header; skipping");
            }
        }
    }
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn send_posts_json_with_custom_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hooks"))
            .and(header("Authorization", "Bearer token"))
            .and(body_json(json!({ "subject": "Deploy", "message": "v1.2 is live" })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer token".to_string());
        headers.insert("bad header".to_string(), "skipped".to_string());
        let webhook = WebhookService::new(&WebhookConfig {
            urls: vec![format!("{}/hooks", server.uri())],
            headers: Some(headers),
        });

        let result = webhook
            .send(&Context::background(), "Deploy", "v1.2 is live")
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn send_does_not_retry_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hooks"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let mut webhook = WebhookService::new(&WebhookConfig {
            urls: Vec::new(),
            headers: None,
        });
        webhook.add_receivers([format!("{}/hooks", server.uri())]);

        let err = webhook
            .send(&Context::background(), "Subject", "Body")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Unexpected status: 503"));
        assert_eq!(webhook.receivers().len(), 1);
    }
}
