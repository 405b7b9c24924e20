use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use herald::config::WebhookConfig;
use herald::notify::telegram::{ParseMode, Telegram, TelegramOptions};
use herald::notify::webhook::WebhookService;
use herald::notify::{Context, Dispatcher, Notifier};

const TOKEN: &str = "123:abc";

async fn mount_get_me(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/bot{TOKEN}/getMe")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "id": 123, "is_bot": true, "username": "ops_bot" }
        })))
        .mount(server)
        .await;
}

async fn telegram(server: &MockServer, chat_ids: &[i64]) -> Telegram {
    let options = TelegramOptions::default()
        .with_api_url(server.uri())
        .with_parse_mode(ParseMode::Plain);
    let mut telegram = Telegram::new(TOKEN, options).await.expect("telegram");
    telegram.add_receivers(chat_ids.iter().copied());
    telegram
}

fn webhook(server: &MockServer) -> WebhookService {
    WebhookService::new(&WebhookConfig {
        urls: vec![format!("{}/hook", server.uri())],
        headers: None,
    })
}

#[tokio::test]
async fn dispatcher_delivers_through_telegram_then_webhook() {
    let server = MockServer::start().await;
    mount_get_me(&server).await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .and(body_partial_json(json!({ "text": "Backup\nDone in 4m" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_partial_json(json!({ "subject": "Backup", "message": "Done in 4m" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = Dispatcher::new();
    dispatcher
        .use_service(telegram(&server, &[10, 20]).await)
        .use_service(webhook(&server));

    dispatcher
        .send(&Context::background(), "Backup", "Done in 4m")
        .await
        .unwrap();
}

#[tokio::test]
async fn telegram_failure_skips_webhook() {
    let server = MockServer::start().await;
    mount_get_me(&server).await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "ok": false,
            "error_code": 403,
            "description": "Forbidden: bot was blocked by the user"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let services: Vec<Arc<dyn Notifier>> = vec![
        Arc::new(telegram(&server, &[77, 88]).await),
        Arc::new(webhook(&server)),
    ];
    let dispatcher = Dispatcher::new();
    dispatcher.use_services(services);

    let err = dispatcher
        .send(&Context::background(), "Subject", "Body")
        .await
        .unwrap_err();

    let text = err.to_string();
    assert_eq!(err.failed_service(), Some("telegram"));
    assert!(text.contains("'77'"));
    assert!(text.contains("bot was blocked"));
    assert!(!text.contains(TOKEN));
}
