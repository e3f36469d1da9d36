use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::domain::{ContactRequest, FieldEdit, FieldErrors};
use super::lead::{LeadSink, LeadSubmission};
use super::validation::validate;
use crate::config::ContactConfig;

/// Identifier wrapper for an open contact form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormId(pub String);

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a form sits in its submission lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Submitted,
    /// The lead hand-off failed; the request is kept so the visitor can send it again.
    Failed { reason: String },
}

impl SubmissionState {
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Submitted => "submitted",
            SubmissionState::Failed { .. } => "failed",
        }
    }

    /// Idle and Failed forms accept edits and submits.
    pub fn is_editable(&self) -> bool {
        matches!(self, SubmissionState::Idle | SubmissionState::Failed { .. })
    }
}

/// Result of a submit action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation passed and the form moved to Submitting.
    Accepted,
    /// Validation failed; the form stays where it was and shows these errors.
    Invalid(FieldErrors),
    /// A submission is already in flight or being displayed.
    Busy(SubmissionState),
}

/// Error raised when an edit arrives while the request is frozen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("form is {} and cannot be edited", .0.label())]
    Busy(SubmissionState),
}

/// Serializable snapshot of a form for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub form_id: FormId,
    #[serde(flatten)]
    pub state: SubmissionState,
    pub request: ContactRequest,
    pub errors: FieldErrors,
}

#[derive(Debug, Default)]
struct FormState {
    request: ContactRequest,
    errors: FieldErrors,
    state: SubmissionState,
}

struct Shared {
    form: Mutex<FormState>,
    status: watch::Sender<SubmissionState>,
}

impl Shared {
    fn lock(&self) -> std::sync::MutexGuard<'_, FormState> {
        self.form.lock().expect("contact form mutex poisoned")
    }

    fn transition(&self, form: &mut FormState, next: SubmissionState) {
        form.state = next.clone();
        self.status.send_replace(next);
    }
}

/// One visitor's contact form: request, inline errors, and submission lifecycle.
///
/// Timers run on a task owned by the form. Closing or dropping the form aborts the task, so
/// no transition ever lands on a form that is gone.
pub struct ContactForm<S> {
    id: FormId,
    shared: Arc<Shared>,
    sink: Arc<S>,
    timers: ContactConfig,
    pending: Option<JoinHandle<()>>,
}

impl<S> ContactForm<S>
where
    S: LeadSink + 'static,
{
    pub fn new(id: FormId, sink: Arc<S>, timers: ContactConfig) -> Self {
        let (status, _) = watch::channel(SubmissionState::Idle);
        Self {
            id,
            shared: Arc::new(Shared {
                form: Mutex::new(FormState::default()),
                status,
            }),
            sink,
            timers,
            pending: None,
        }
    }

    pub fn id(&self) -> &FormId {
        &self.id
    }

    pub fn state(&self) -> SubmissionState {
        self.shared.lock().state.clone()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.shared.status.subscribe()
    }

    pub fn view(&self) -> FormView {
        let form = self.shared.lock();
        FormView {
            form_id: self.id.clone(),
            state: form.state.clone(),
            request: form.request.clone(),
            errors: form.errors.clone(),
        }
    }

    /// Applies a field edit and drops that field's error, if any. Other errors stay put.
    pub fn edit(&mut self, edit: FieldEdit) -> Result<(), FormError> {
        let mut form = self.shared.lock();
        if !form.state.is_editable() {
            return Err(FormError::Busy(form.state.clone()));
        }

        let field = form.request.apply(edit);
        form.errors.clear(field);

        if matches!(form.state, SubmissionState::Failed { .. }) {
            self.shared.transition(&mut form, SubmissionState::Idle);
        }
        Ok(())
    }

    /// Validates the request and, when clean, starts the submission round trip.
    pub fn submit(&mut self) -> SubmitOutcome {
        let mut form = self.shared.lock();
        if !form.state.is_editable() {
            return SubmitOutcome::Busy(form.state.clone());
        }

        let errors = validate(&form.request);
        if !errors.is_empty() {
            debug!(form_id = %self.id, invalid = errors.len(), "contact form rejected");
            form.errors = errors.clone();
            return SubmitOutcome::Invalid(errors);
        }

        form.errors = FieldErrors::new();
        self.shared.transition(&mut form, SubmissionState::Submitting);
        drop(form);

        self.cancel_pending();
        let task = run_submission(
            self.id.clone(),
            self.shared.clone(),
            self.sink.clone(),
            self.timers,
        );
        self.pending = Some(tokio::spawn(task));

        info!(form_id = %self.id, "contact form submitting");
        SubmitOutcome::Accepted
    }

    /// Discards the form. Any scheduled transition is cancelled.
    pub fn close(mut self) {
        self.cancel_pending();
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<S> Drop for ContactForm<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
            debug!(form_id = %self.id, "pending contact transition cancelled");
        }
    }
}

async fn run_submission<S>(id: FormId, shared: Arc<Shared>, sink: Arc<S>, timers: ContactConfig)
where
    S: LeadSink + 'static,
{
    tokio::time::sleep(timers.submit_latency).await;

    let request = {
        let form = shared.lock();
        if form.state != SubmissionState::Submitting {
            return;
        }
        form.request.clone()
    };

    let lead = LeadSubmission {
        form_id: id.clone(),
        request,
        submitted_at: Utc::now(),
    };

    if let Err(err) = sink.submit_lead(lead) {
        warn!(form_id = %id, error = %err, "lead hand-off failed");
        let mut form = shared.lock();
        shared.transition(
            &mut form,
            SubmissionState::Failed {
                reason: err.to_string(),
            },
        );
        return;
    }

    {
        let mut form = shared.lock();
        shared.transition(&mut form, SubmissionState::Submitted);
    }
    info!(form_id = %id, "contact form submitted");

    tokio::time::sleep(timers.reset_delay).await;

    let mut form = shared.lock();
    form.request = ContactRequest::default();
    form.errors = FieldErrors::new();
    shared.transition(&mut form, SubmissionState::Idle);
    debug!(form_id = %id, "contact form reset");
}
