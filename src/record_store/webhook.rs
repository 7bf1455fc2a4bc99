use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use super::{RecordStore, RecordStoreError};
use crate::domain::FormSubmission;

/// Hands each submission to an automation endpoint that writes the row.
#[derive(Debug, Clone)]
pub struct WebhookRecordStore {
    http_client: Client,
    url: Url,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

#[derive(Deserialize)]
struct WebhookReply {
    result: Option<String>,
}

impl WebhookRecordStore {
    pub fn new(http_client: Client, url: Url) -> Self {
        Self { http_client, url }
    }
}

#[async_trait]
impl RecordStore for WebhookRecordStore {
    #[tracing::instrument(name = "Posting submission to the sheets webhook", skip_all)]
    async fn append(&self, submission: &FormSubmission) -> Result<(), RecordStoreError> {
        let payload = WebhookPayload {
            name: submission.name(),
            email: submission.email(),
            message: submission.details(),
        };

        let response = self
            .http_client
            .post(self.url.clone())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecordStoreError::UnexpectedStatus(status));
        }

        let body = response.bytes().await?;
        match serde_json::from_slice::<WebhookReply>(&body) {
            Ok(WebhookReply {
                result: Some(result),
            }) if result == "success" => Ok(()),
            _ => Err(RecordStoreError::NotConfirmed),
        }
    }
}
