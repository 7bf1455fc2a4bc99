use serde::Serialize;

/// What happened to the two side effects of a submission.
///
/// `sheet` is `None` when no record store is configured; the report then
/// depends on the email alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub email: bool,
    pub sheet: Option<bool>,
}

/// The JSON body returned for a submission that reached the dispatchers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SubmissionReport {
    Delivered {
        message: &'static str,
        email: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        sheet: Option<bool>,
    },
    Failed {
        error: &'static str,
        email: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        sheet: Option<bool>,
    },
}

impl DispatchOutcome {
    /// Any side effect that landed makes the submission a success.
    pub fn report(self) -> SubmissionReport {
        let Self { email, sheet } = self;
        let delivered = |message| SubmissionReport::Delivered {
            message,
            email,
            sheet,
        };
        let failed = |error| SubmissionReport::Failed {
            error,
            email,
            sheet,
        };

        match (email, sheet) {
            (true, Some(true)) => delivered("Success! Data saved and email sent."),
            (true, Some(false)) => delivered("Email sent but failed to save to sheet."),
            (false, Some(true)) => delivered("Data saved to sheet but email failed to send."),
            (false, Some(false)) => failed("Both email and sheet operations failed."),
            (true, None) => delivered("Success!"),
            (false, None) => failed("Email failed to send"),
        }
    }
}

impl SubmissionReport {
    pub fn is_failure(&self) -> bool {
        matches!(self, SubmissionReport::Failed { .. })
    }
}
