use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde_aux::field_attributes::{
    deserialize_number_from_string, deserialize_option_number_from_string,
};

use crate::email_client::Mailboxes;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
    pub record_store: RecordStoreSettings,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub api_key: SecretString,
    pub sender_email: Option<String>,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    pub recipient_email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub timeout_ms: Option<u64>,
}

fn default_sender_name() -> String {
    "Website Inquiry".into()
}

impl EmailClientSettings {
    pub fn mailboxes(&self) -> Mailboxes {
        Mailboxes {
            sender_name: self.sender_name.clone(),
            sender_email: non_blank(self.sender_email.as_deref()),
            recipient_email: non_blank(self.recipient_email.as_deref()),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecordBackend {
    GoogleSheets,
    Webhook,
    Disabled,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct RecordStoreSettings {
    pub backend: RecordBackend,
    #[serde(default)]
    pub google_sheets: GoogleSheetsSettings,
    #[serde(default)]
    pub webhook: WebhookSettings,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct GoogleSheetsSettings {
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,
    pub spreadsheet_id: Option<String>,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    pub credentials_path: Option<PathBuf>,
    pub credentials_base64: Option<SecretString>,
    #[serde(default, deserialize_with = "deserialize_number_from_string")]
    pub utc_offset_minutes: i32,
}

impl Default for GoogleSheetsSettings {
    fn default() -> Self {
        Self {
            base_url: default_sheets_base_url(),
            spreadsheet_id: None,
            sheet_name: default_sheet_name(),
            credentials_path: None,
            credentials_base64: None,
            utc_offset_minutes: 0,
        }
    }
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com".into()
}

fn default_sheet_name() -> String {
    "Form Submissions".into()
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
pub struct WebhookSettings {
    pub url: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "{other} is not supported environment. Try to use `local` or `production`",
            )),
        }
    }
}

/// Plain deployment variables mapped onto their settings keys.
/// Applied last, so they win over files and `APP_*` variables.
const DEPLOYMENT_VARIABLES: &[(&str, &str)] = &[
    ("PORT", "application.port"),
    ("RESEND_API_KEY", "email_client.api_key"),
    ("FROM_EMAIL", "email_client.sender_email"),
    ("TO_EMAIL", "email_client.recipient_email"),
    ("SPREADSHEET_ID", "record_store.google_sheets.spreadsheet_id"),
    ("SHEET_NAME", "record_store.google_sheets.sheet_name"),
    (
        "GOOGLE_APPLICATION_CREDENTIALS",
        "record_store.google_sheets.credentials_path",
    ),
    (
        "GOOGLE_CREDENTIALS_BASE64",
        "record_store.google_sheets.credentials_base64",
    ),
    ("RECORD_BACKEND", "record_store.backend"),
    ("SHEETS_WEBHOOK_URL", "record_store.webhook.url"),
];

pub fn get_configuration() -> Result<Settings, anyhow::Error> {
    let base_path = std::env::current_dir()?;
    let conf_dir = base_path.join("configuration");
    let env: Environment = std::env::var("APP_ENV")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    load_configuration(&conf_dir, env)
}

/// Reads `base.yaml` and the environment's file from `conf_dir`, then layers
/// `APP_*` and deployment variables on top.
pub fn load_configuration(conf_dir: &Path, env: Environment) -> Result<Settings, anyhow::Error> {
    let mut builder = config::Config::builder()
        .add_source(config::File::from(conf_dir.join("base.yaml")).required(true))
        .add_source(
            config::File::from(conf_dir.join(format!("{}.yaml", env.as_str()))).required(true),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .prefix_separator("_"),
        );

    for (variable, key) in DEPLOYMENT_VARIABLES {
        builder = builder.set_override_option(*key, std::env::var(variable).ok())?;
    }

    let settings = builder.build()?.try_deserialize::<Settings>()?;
    Ok(settings)
}
