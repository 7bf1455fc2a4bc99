mod errors;
mod handler;
mod helpers;

pub use errors::{SubmitError, reject_malformed_json};
pub use handler::{FormData, submit_form};
