use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct EmailClient {
    http_client: Client,
    base_url: Url,
    api_key: SecretString,
}

/// Sender and recipient of inquiry notifications, as configured.
#[derive(Debug, Clone)]
pub struct Mailboxes {
    pub sender_name: String,
    pub sender_email: Option<String>,
    pub recipient_email: Option<String>,
}

/// Both ends of a notification, known to be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMailboxes {
    pub from: String,
    pub to: String,
}

impl Mailboxes {
    pub fn resolve(&self) -> Option<ResolvedMailboxes> {
        let sender = self.sender_email.as_deref()?;
        let recipient = self.recipient_email.as_deref()?;
        Some(ResolvedMailboxes {
            from: format!("{} <{}>", self.sender_name, sender),
            to: recipient.to_owned(),
        })
    }
}

pub struct EmailMessage<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub reply_to: &'a str,
    pub subject: &'a str,
    pub html: &'a str,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
    reply_to: &'a str,
}

#[derive(Deserialize)]
struct ProviderError {
    message: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum SendEmailError {
    #[error("Failed to reach the email provider.")]
    Transport(#[from] reqwest::Error),
    #[error("The email provider rejected the message ({status}): {message}")]
    Rejected {
        status: reqwest::StatusCode,
        message: String,
    },
}

impl EmailClient {
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        timeout: Option<Duration>,
    ) -> Result<Self, anyhow::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http_client: builder.build().context("Failed to build the email HTTP client.")?,
            base_url: Url::parse(base_url).context("Failed parsing base email api url.")?,
            api_key,
        })
    }

    pub async fn send_email(&self, message: &EmailMessage<'_>) -> Result<(), SendEmailError> {
        let url = self.endpoint();

        let body = SendEmailRequest {
            from: message.from,
            to: vec![message.to],
            subject: message.subject,
            html: message.html,
            reply_to: message.reply_to,
        };

        let response = self
            .http_client
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response
            .json::<ProviderError>()
            .await
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| "no details provided".into());

        Err(SendEmailError::Rejected { status, message })
    }

    fn endpoint(&self) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("emails");
        }
        url
    }
}
