mod health_check;
mod helpers;
mod submit_form;

pub use health_check::health_check;
pub use helpers::error_chain_fmt;
pub use submit_form::{FormData, SubmitError, reject_malformed_json, submit_form};
