use std::net::TcpListener;

use inquiry_relay::{
    configuration::{RecordBackend, Settings, get_configuration},
    email_client::EmailClient,
    startup::{build_record_store, run},
    telemetry::{get_subscriber, init_subscriber},
};
use once_cell::sync::Lazy;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber).expect("Failed to init tracing subscriber");
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber).expect("Failed to init tracing subscriber");
    }
});

pub struct TestApp {
    pub address: String,
    pub email_server: MockServer,
    pub record_server: MockServer,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_submission(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/submit-form", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_raw_submission(&self, body: &'static str) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/submit-form", &self.address))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn email_provider_answers(&self, status: u16) {
        Mock::given(path("/emails"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                "id": "49a3999c-0ce1-4ea6-ab68-afcd6dc2e794"
            })))
            .expect(1)
            .mount(&self.email_server)
            .await;
    }

    pub async fn webhook_answers(&self, status: u16, result: &str) {
        Mock::given(path("/exec"))
            .and(method("POST"))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(serde_json::json!({ "result": result })),
            )
            .expect(1)
            .mount(&self.record_server)
            .await;
    }
}

pub fn valid_submission() -> serde_json::Value {
    serde_json::json!({
        "name": "Ann",
        "email": "ann@x.com",
        "details": "need a site"
    })
}

/// An address nothing listens on.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port.");
    let port = listener.local_addr().unwrap().port();
    format!("http://127.0.0.1:{port}/exec")
}

/// A server relaying to a webhook record store on `record_server`.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_, _| {}).await
}

pub async fn spawn_app_with(customise: impl FnOnce(&mut Settings, &MockServer)) -> TestApp {
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;
    let record_server = MockServer::start().await;

    let mut config = get_configuration().expect("Failed to read configuration");
    config.email_client.base_url = email_server.uri();
    config.email_client.sender_email = Some("noreply@inquiry-relay.test".into());
    config.email_client.recipient_email = Some("owner@inquiry-relay.test".into());
    config.email_client.timeout_ms = Some(2_000);
    config.record_store.backend = RecordBackend::Webhook;
    config.record_store.webhook.url = Some(format!("{}/exec", record_server.uri()));
    customise(&mut config, &record_server);

    let email_client = EmailClient::new(
        &config.email_client.base_url,
        config.email_client.api_key.clone(),
        config.email_client.timeout(),
    )
    .expect("Failed to build the email client.");
    let record_store =
        build_record_store(&config.record_store).expect("Failed to build the record store.");

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port.");
    let port = listener.local_addr().unwrap().port();
    let server = run(
        listener,
        email_client,
        config.email_client.mailboxes(),
        record_store,
    )
    .expect("Failed to bind address.");

    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{port}"),
        email_server,
        record_server,
        api_client: reqwest::Client::new(),
    }
}
