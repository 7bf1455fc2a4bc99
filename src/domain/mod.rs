mod dispatch_outcome;
mod form_submission;

pub use dispatch_outcome::{DispatchOutcome, SubmissionReport};
pub use form_submission::{FormSubmission, MissingFields};
