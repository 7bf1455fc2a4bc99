mod google_sheets;
mod service_account;
mod webhook;

use async_trait::async_trait;

use crate::domain::FormSubmission;

pub use google_sheets::{GoogleSheetsRecordStore, SheetTarget};
pub use service_account::ServiceAccountKey;
pub use webhook::WebhookRecordStore;

#[derive(thiserror::Error, Debug)]
pub enum RecordStoreError {
    #[error("The record store is not configured: {0}")]
    NotConfigured(String),
    #[error("Failed to reach the record store.")]
    Transport(#[from] reqwest::Error),
    #[error("The record store answered with status {0}.")]
    UnexpectedStatus(reqwest::StatusCode),
    #[error("The record store did not confirm the write.")]
    NotConfirmed,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// A place where each submission is appended as one row.
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    /// Checked before any outbound call is made for a submission.
    ///
    /// # Errors
    /// Returns `RecordStoreError::NotConfigured` when the backend lacks the
    /// settings it needs to accept writes.
    fn ensure_configured(&self) -> Result<(), RecordStoreError> {
        Ok(())
    }

    async fn append(&self, submission: &FormSubmission) -> Result<(), RecordStoreError>;
}
