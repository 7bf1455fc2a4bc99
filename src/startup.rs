use std::net::TcpListener;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use chrono::FixedOffset;
use reqwest::Url;
use tracing_actix_web::TracingLogger;

use crate::configuration::{RecordBackend, RecordStoreSettings, Settings};
use crate::email_client::{EmailClient, Mailboxes};
use crate::record_store::{GoogleSheetsRecordStore, RecordStore, SheetTarget, WebhookRecordStore};
use crate::routes::{health_check, reject_malformed_json, submit_form};

pub struct Application {
    port: u16,
    server: Server,
}

/// The configured record store, or `None` when submissions are only emailed.
pub struct RecordStoreBackend(pub Option<Arc<dyn RecordStore>>);

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let email_client = EmailClient::new(
            &config.email_client.base_url,
            config.email_client.api_key.clone(),
            config.email_client.timeout(),
        )?;
        let mailboxes = config.email_client.mailboxes();
        if mailboxes.resolve().is_none() {
            tracing::warn!(
                "No sender or recipient email address is configured. \
                Submissions will be rejected with a configuration error."
            );
        }

        let record_store = build_record_store(&config.record_store)?;

        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind {address}."))?;
        let port = listener.local_addr()?.port();
        let server = run(listener, email_client, mailboxes, record_store)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    email_client: EmailClient,
    mailboxes: Mailboxes,
    record_store: RecordStoreBackend,
) -> Result<Server, anyhow::Error> {
    let email_client = web::Data::new(email_client);
    let mailboxes = web::Data::new(mailboxes);
    let record_store = web::Data::new(record_store);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(reject_malformed_json))
            .route("/health_check", web::get().to(health_check))
            .route("/api/submit-form", web::post().to(submit_form))
            .app_data(email_client.clone())
            .app_data(mailboxes.clone())
            .app_data(record_store.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn build_record_store(
    settings: &RecordStoreSettings,
) -> Result<RecordStoreBackend, anyhow::Error> {
    let http_client = reqwest::Client::new();

    let store: Arc<dyn RecordStore> = match settings.backend {
        RecordBackend::Disabled => return Ok(RecordStoreBackend(None)),
        RecordBackend::Webhook => {
            let url = settings
                .webhook
                .url
                .as_deref()
                .context("The webhook record store needs `record_store.webhook.url`.")?;
            let url = Url::parse(url).context("Failed parsing the sheets webhook url.")?;
            Arc::new(WebhookRecordStore::new(http_client, url))
        }
        RecordBackend::GoogleSheets => {
            let sheets = &settings.google_sheets;
            let target = match SheetTarget::from_settings(sheets) {
                Ok(target) => Some(target),
                Err(e) => {
                    tracing::warn!(
                        error.cause_chain = ?e,
                        error.message = %e,
                        "Google Sheets is not usable. \
                        Submissions will be rejected until it is configured."
                    );
                    None
                }
            };
            let base_url =
                Url::parse(&sheets.base_url).context("Failed parsing the Sheets API url.")?;
            let utc_offset = sheets
                .utc_offset_minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .context("`utc_offset_minutes` is outside of +/- 24 hours.")?;
            Arc::new(GoogleSheetsRecordStore::new(
                http_client,
                base_url,
                target,
                utc_offset,
            ))
        }
    };

    Ok(RecordStoreBackend(Some(store)))
}
