use super::super::helpers::render_html_template;
use crate::domain::FormSubmission;

const NEW_INQUIRY_TEMPLATE: &str = include_str!("../../../views/new_inquiry.html");

pub fn get_email_subject(submission: &FormSubmission) -> String {
    format!("New Project Inquiry from {}", submission.name())
}

/// Every submitted field is HTML-escaped by the template engine.
pub fn get_email_html(submission: &FormSubmission) -> Result<String, tera::Error> {
    render_html_template(
        &[
            ("name", submission.name()),
            ("email", submission.email()),
            ("details", submission.details()),
        ],
        NEW_INQUIRY_TEMPLATE,
    )
}
