use actix_web::{HttpResponse, http::StatusCode, web};
use anyhow::Context;

use super::{
    errors::SubmitError,
    helpers::{get_email_html, get_email_subject},
};
use crate::{
    domain::{DispatchOutcome, FormSubmission, MissingFields},
    email_client::{EmailClient, EmailMessage, Mailboxes, ResolvedMailboxes},
    record_store::RecordStore,
    startup::RecordStoreBackend,
};

#[derive(serde::Deserialize)]
pub struct FormData {
    pub name: Option<String>,
    pub email: Option<String>,
    pub details: Option<String>,
}

impl TryFrom<FormData> for FormSubmission {
    type Error = MissingFields;

    fn try_from(value: FormData) -> Result<Self, Self::Error> {
        FormSubmission::parse(value.name, value.email, value.details)
    }
}

#[tracing::instrument(
    name = "Relaying a project inquiry",
    skip(form, email_client, mailboxes, record_store),
    fields(
        inquirer_email = tracing::field::Empty,
        inquirer_name = tracing::field::Empty
    )
)]
pub async fn submit_form(
    form: web::Json<FormData>,
    email_client: web::Data<EmailClient>,
    mailboxes: web::Data<Mailboxes>,
    record_store: web::Data<RecordStoreBackend>,
) -> Result<HttpResponse, SubmitError> {
    let submission: FormSubmission = form
        .into_inner()
        .try_into()
        .map_err(SubmitError::ValidationError)?;
    tracing::Span::current()
        .record("inquirer_email", tracing::field::display(submission.email()))
        .record("inquirer_name", tracing::field::display(submission.name()));

    let mailboxes = mailboxes.resolve().ok_or_else(|| {
        SubmitError::ConfigurationError(anyhow::anyhow!(
            "The sender or recipient email address is not configured."
        ))
    })?;

    let record_store = record_store.0.as_deref();
    if let Some(store) = record_store {
        store
            .ensure_configured()
            .map_err(SubmitError::RecordStoreNotConfigured)?;
    }

    let (email, sheet) = tokio::join!(
        notify_owner(&email_client, &mailboxes, &submission),
        async {
            match record_store {
                Some(store) => Some(record_submission(store, &submission).await),
                None => None,
            }
        }
    );

    let report = DispatchOutcome { email, sheet }.report();
    let status = if report.is_failure() {
        tracing::error!("No side effect of the inquiry landed.");
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    Ok(HttpResponse::build(status).json(report))
}

#[tracing::instrument(name = "Notifying the site owner of a new inquiry", skip_all)]
async fn notify_owner(
    email_client: &EmailClient,
    mailboxes: &ResolvedMailboxes,
    submission: &FormSubmission,
) -> bool {
    match send_notification(email_client, mailboxes, submission).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to send the inquiry notification."
            );
            false
        }
    }
}

async fn send_notification(
    email_client: &EmailClient,
    mailboxes: &ResolvedMailboxes,
    submission: &FormSubmission,
) -> Result<(), anyhow::Error> {
    let html = get_email_html(submission).context("Failed to render the inquiry email.")?;
    let subject = get_email_subject(submission);

    email_client
        .send_email(&EmailMessage {
            from: &mailboxes.from,
            to: &mailboxes.to,
            reply_to: submission.email(),
            subject: &subject,
            html: &html,
        })
        .await
        .context("Failed to send the inquiry email.")
}

#[tracing::instrument(name = "Recording the inquiry", skip_all)]
async fn record_submission(store: &dyn RecordStore, submission: &FormSubmission) -> bool {
    match store.append(submission).await {
        Ok(()) => true,
        Err(e) => {
            let e = anyhow::Error::new(e);
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to record the inquiry."
            );
            false
        }
    }
}
