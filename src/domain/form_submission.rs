/// A project inquiry with every required field present and non-empty.
///
/// Values are kept verbatim; escaping is the job of whoever renders them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    name: String,
    email: String,
    details: String,
}

/// The fields that were absent or empty in a submission.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Missing required fields: {}", .0.join(", "))]
pub struct MissingFields(pub Vec<&'static str>);

impl FormSubmission {
    pub fn parse(
        name: Option<String>,
        email: Option<String>,
        details: Option<String>,
    ) -> Result<Self, MissingFields> {
        let mut missing = Vec::new();
        let name = required("name", name, &mut missing);
        let email = required("email", email, &mut missing);
        let details = required("details", details, &mut missing);

        match (name, email, details) {
            (Some(name), Some(email), Some(details)) => Ok(Self {
                name,
                email,
                details,
            }),
            _ => Err(MissingFields(missing)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn details(&self) -> &str {
        &self.details
    }
}

fn required(
    field: &'static str,
    value: Option<String>,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            missing.push(field);
            None
        }
    }
}
