use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use reqwest::{Client, Url};
use secrecy::ExposeSecret;
use serde::Serialize;

use super::{RecordStore, RecordStoreError, ServiceAccountKey};
use crate::configuration::GoogleSheetsSettings;
use crate::domain::FormSubmission;

/// Where rows go, and as whom they are written.
#[derive(Debug)]
pub struct SheetTarget {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub account: ServiceAccountKey,
}

/// Appends `[timestamp, name, email, details]` rows through the Sheets API.
///
/// A store without a target reports itself as not configured and never
/// reaches the network.
#[derive(Debug)]
pub struct GoogleSheetsRecordStore {
    http_client: Client,
    base_url: Url,
    target: Option<SheetTarget>,
    utc_offset: FixedOffset,
}

#[derive(Serialize)]
struct ValueRange<'a> {
    values: [[&'a str; 4]; 1],
}

impl SheetTarget {
    /// Resolves the spreadsheet and its credential from settings.
    ///
    /// An inline base64 credential takes precedence over a key file.
    pub fn from_settings(settings: &GoogleSheetsSettings) -> Result<Self, anyhow::Error> {
        let spreadsheet_id = settings
            .spreadsheet_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .context("No spreadsheet id is configured.")?;

        let account = match (&settings.credentials_base64, &settings.credentials_path) {
            (Some(encoded), _) => ServiceAccountKey::from_base64(encoded)?,
            (None, Some(path)) => ServiceAccountKey::from_file(path)?,
            (None, None) => anyhow::bail!("No service-account credential is configured."),
        };

        Ok(Self {
            spreadsheet_id: spreadsheet_id.to_owned(),
            sheet_name: settings.sheet_name.clone(),
            account,
        })
    }
}

impl GoogleSheetsRecordStore {
    pub fn new(
        http_client: Client,
        base_url: Url,
        target: Option<SheetTarget>,
        utc_offset: FixedOffset,
    ) -> Self {
        Self {
            http_client,
            base_url,
            target,
            utc_offset,
        }
    }

    fn append_url(&self, target: &SheetTarget) -> Result<Url, RecordStoreError> {
        // A1 notation quotes sheet names and doubles any apostrophe inside them.
        let range = format!("'{}'!A:D:append", target.sheet_name.replace('\'', "''"));
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("The Sheets API base url cannot carry a path."))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                target.spreadsheet_id.as_str(),
                "values",
                range.as_str(),
            ]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        Ok(url)
    }
}

/// Renders `instant` as `M/D/YYYY, h:MM:SS AM` at the given offset.
pub fn format_timestamp(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant
        .with_timezone(&offset)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

#[async_trait]
impl RecordStore for GoogleSheetsRecordStore {
    fn ensure_configured(&self) -> Result<(), RecordStoreError> {
        match self.target {
            Some(_) => Ok(()),
            None => Err(RecordStoreError::NotConfigured(
                "Google Sheets not configured".into(),
            )),
        }
    }

    #[tracing::instrument(name = "Appending submission to Google Sheets", skip_all)]
    async fn append(&self, submission: &FormSubmission) -> Result<(), RecordStoreError> {
        let target = self.target.as_ref().ok_or_else(|| {
            RecordStoreError::NotConfigured("Google Sheets not configured".into())
        })?;

        let access_token = target.account.access_token(&self.http_client).await?;

        let timestamp = format_timestamp(Utc::now(), self.utc_offset);
        let body = ValueRange {
            values: [[
                timestamp.as_str(),
                submission.name(),
                submission.email(),
                submission.details(),
            ]],
        };

        let response = self
            .http_client
            .post(self.append_url(target)?)
            .bearer_auth(access_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecordStoreError::UnexpectedStatus(status));
        }

        Ok(())
    }
}
