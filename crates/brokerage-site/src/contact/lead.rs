use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::ContactRequest;
use super::form::FormId;

/// Record handed to the lead-capture system once a form completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSubmission {
    pub form_id: FormId,
    pub request: ContactRequest,
    pub submitted_at: DateTime<Utc>,
}

/// Outbound boundary to whatever stores contact leads (CRM, mailbox, spreadsheet).
///
/// Called once per accepted submission and never retried by the form.
pub trait LeadSink: Send + Sync {
    fn submit_lead(&self, lead: LeadSubmission) -> Result<(), LeadError>;
}

/// Lead hand-off failure.
#[derive(Debug, thiserror::Error)]
pub enum LeadError {
    #[error("lead capture unavailable: {0}")]
    Transport(String),
    #[error("lead rejected: {0}")]
    Rejected(String),
}
