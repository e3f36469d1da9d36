use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use super::domain::FieldEdit;
use super::form::{ContactForm, FormError, FormId, FormView, SubmitOutcome};
use super::lead::LeadSink;
use crate::config::ContactConfig;

static FORM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);

fn next_form_id() -> FormId {
    let id = FORM_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    FormId(format!("form-{id:06}"))
}

struct Entry<S> {
    form: ContactForm<S>,
    last_seen: Instant,
}

type Forms<S> = HashMap<FormId, Entry<S>>;

/// Open contact forms keyed by id, all sharing one lead sink and one set of timers.
///
/// A visitor who navigates away never closes their form, so forms untouched for longer than
/// `form_ttl` are evicted: on every `open`, and periodically once [`FormRegistry::spawn_sweeper`]
/// is running.
pub struct FormRegistry<S> {
    forms: Mutex<Forms<S>>,
    sink: Arc<S>,
    timers: ContactConfig,
}

impl<S> FormRegistry<S>
where
    S: LeadSink + 'static,
{
    pub fn new(sink: Arc<S>, timers: ContactConfig) -> Self {
        Self {
            forms: Mutex::new(HashMap::new()),
            sink,
            timers,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Forms<S>> {
        self.forms.lock().expect("form registry mutex poisoned")
    }

    /// Opens an empty form and returns its first view.
    pub fn open(&self) -> FormView {
        let id = next_form_id();
        let form = ContactForm::new(id.clone(), self.sink.clone(), self.timers);
        let view = form.view();

        let now = Instant::now();
        let mut forms = self.lock();
        self.evict_locked(&mut forms, now);
        forms.insert(
            id.clone(),
            Entry {
                form,
                last_seen: now,
            },
        );
        drop(forms);

        debug!(form_id = %id, "contact form opened");
        view
    }

    pub fn view(&self, id: &FormId) -> Result<FormView, RegistryError> {
        let mut forms = self.lock();
        let entry = touch(&mut forms, id)?;
        Ok(entry.form.view())
    }

    pub fn edit(&self, id: &FormId, edit: FieldEdit) -> Result<FormView, RegistryError> {
        let mut forms = self.lock();
        let entry = touch(&mut forms, id)?;
        entry.form.edit(edit)?;
        Ok(entry.form.view())
    }

    pub fn submit(&self, id: &FormId) -> Result<(SubmitOutcome, FormView), RegistryError> {
        let mut forms = self.lock();
        let entry = touch(&mut forms, id)?;
        let outcome = entry.form.submit();
        Ok((outcome, entry.form.view()))
    }

    /// Removes the form; its pending transitions are cancelled with it.
    pub fn close(&self, id: &FormId) -> Result<(), RegistryError> {
        let entry = self.lock().remove(id).ok_or(RegistryError::NotFound)?;
        entry.form.close();
        debug!(form_id = %id, "contact form closed");
        Ok(())
    }

    /// Closes every form idle for at least `form_ttl`; returns how many were evicted.
    pub fn evict_idle(&self) -> usize {
        let mut forms = self.lock();
        self.evict_locked(&mut forms, Instant::now())
    }

    fn evict_locked(&self, forms: &mut Forms<S>, now: Instant) -> usize {
        let ttl = self.timers.form_ttl;
        let expired: Vec<FormId> = forms
            .iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.last_seen) >= ttl)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            if let Some(entry) = forms.remove(id) {
                entry.form.close();
            }
        }

        if !expired.is_empty() {
            info!(evicted = expired.len(), "abandoned contact forms evicted");
        }
        expired.len()
    }

    /// Starts a background task that evicts idle forms every `form_ttl` (at least once a second).
    /// The task ends once the registry is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let registry: Weak<Self> = Arc::downgrade(self);
        let period = self.timers.form_ttl.max(MIN_SWEEP_PERIOD);

        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            ticks.tick().await;
            loop {
                ticks.tick().await;
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                registry.evict_idle();
            }
        })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

fn touch<'a, S>(forms: &'a mut Forms<S>, id: &FormId) -> Result<&'a mut Entry<S>, RegistryError> {
    let entry = forms.get_mut(id).ok_or(RegistryError::NotFound)?;
    entry.last_seen = Instant::now();
    Ok(entry)
}

/// Error raised by registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("contact form not found")]
    NotFound,
    #[error(transparent)]
    Form(#[from] FormError),
}
