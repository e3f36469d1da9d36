use brokerage_site::contact::{LeadError, LeadSink, LeadSubmission};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Keeps captured leads in memory so the admin area can list them.
#[derive(Default, Clone)]
pub(crate) struct InMemoryLeadSink {
    leads: Arc<Mutex<Vec<LeadSubmission>>>,
}

impl LeadSink for InMemoryLeadSink {
    fn submit_lead(&self, lead: LeadSubmission) -> Result<(), LeadError> {
        info!(
            form_id = %lead.form_id,
            service = lead.request.service.map(|s| s.value()).unwrap_or("unselected"),
            "lead captured"
        );
        self.leads.lock().expect("lead mutex poisoned").push(lead);
        Ok(())
    }
}

impl InMemoryLeadSink {
    /// Newest first.
    pub(crate) fn leads(&self) -> Vec<LeadSubmission> {
        let mut leads = self.leads.lock().expect("lead mutex poisoned").clone();
        leads.reverse();
        leads
    }
}

/// Sink that refuses every lead, used to show the failure path.
#[derive(Default, Clone, Copy)]
pub(crate) struct RejectingLeadSink;

impl LeadSink for RejectingLeadSink {
    fn submit_lead(&self, _lead: LeadSubmission) -> Result<(), LeadError> {
        Err(LeadError::Transport("lead capture disabled for this run".to_string()))
    }
}
