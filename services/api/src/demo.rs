use crate::infra::{InMemoryLeadSink, RejectingLeadSink};
use brokerage_site::config::ContactConfig;
use brokerage_site::contact::{
    validate, ContactField, ContactForm, ContactRequest, FieldEdit, FieldErrors, FormId,
    LeadSink, RegistryError, ServiceCategory, SubmissionState, SubmitOutcome,
};
use brokerage_site::error::AppError;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub(crate) struct ContactValidateArgs {
    /// JSON file holding a contact request; field flags override its values
    #[arg(long)]
    pub(crate) json: Option<PathBuf>,
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long)]
    pub(crate) email: Option<String>,
    #[arg(long)]
    pub(crate) phone: Option<String>,
    #[arg(long)]
    pub(crate) subject: Option<String>,
    #[arg(long)]
    pub(crate) message: Option<String>,
    /// Service category (buying, selling, renting, property-management, investment, ...)
    #[arg(long)]
    pub(crate) service: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Simulated submission latency in milliseconds
    #[arg(long, default_value_t = 300)]
    pub(crate) latency_ms: u64,
    /// How long the confirmation stays up before the form resets, in milliseconds
    #[arg(long, default_value_t = 700)]
    pub(crate) reset_ms: u64,
    /// Refuse the lead to show the failure path
    #[arg(long)]
    pub(crate) fail_lead_capture: bool,
}

/// Prints validation results; returns whether the request is valid.
pub(crate) fn run_contact_validate(args: ContactValidateArgs) -> Result<bool, AppError> {
    let request = contact_request_from_args(args)?;
    let errors = validate(&request);
    render_errors(&errors);
    Ok(errors.is_empty())
}

fn contact_request_from_args(args: ContactValidateArgs) -> Result<ContactRequest, AppError> {
    let ContactValidateArgs {
        json,
        name,
        email,
        phone,
        subject,
        message,
        service,
    } = args;

    let mut request = match json {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str(&raw)?
        }
        None => ContactRequest::default(),
    };

    let edits = [
        (ContactField::Name, name),
        (ContactField::Email, email),
        (ContactField::Phone, phone),
        (ContactField::Subject, subject),
        (ContactField::Message, message),
        (ContactField::Service, service),
    ];
    for (field, value) in edits {
        if let Some(value) = value {
            request.apply(FieldEdit::new(field, value));
        }
    }

    Ok(request)
}

fn render_errors(errors: &FieldErrors) {
    if errors.is_empty() {
        println!("Contact request is valid");
        return;
    }

    println!("Contact request has {} problem(s)", errors.len());
    for (field, message) in errors.iter() {
        println!("- {}: {}", field.as_str(), message);
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let timers = ContactConfig {
        submit_latency: Duration::from_millis(args.latency_ms),
        reset_delay: Duration::from_millis(args.reset_ms),
        ..ContactConfig::default()
    };

    println!("Contact form lifecycle demo");
    println!(
        "Timers: submit latency {}ms, reset delay {}ms",
        args.latency_ms, args.reset_ms
    );

    if args.fail_lead_capture {
        drive_form(Arc::new(RejectingLeadSink), timers).await
    } else {
        let sink = Arc::new(InMemoryLeadSink::default());
        drive_form(sink.clone(), timers).await?;
        println!("\nLeads captured: {}", sink.leads().len());
        Ok(())
    }
}

async fn drive_form<S>(sink: Arc<S>, timers: ContactConfig) -> Result<(), AppError>
where
    S: LeadSink + 'static,
{
    let mut form = ContactForm::new(FormId("form-demo".to_string()), sink, timers);

    println!("\nSubmitting an empty form");
    if let SubmitOutcome::Invalid(errors) = form.submit() {
        render_errors(&errors);
    }

    println!("\nFilling in the form");
    for edit in demo_edits() {
        println!("- {} = {:?}", edit.field.as_str(), edit.value);
        form.edit(edit).map_err(RegistryError::from)?;
    }
    println!("Remaining errors: {}", form.view().errors.len());

    let outcome = form.submit();
    println!("\nSubmit outcome: {outcome:?}");
    if outcome != SubmitOutcome::Accepted {
        return Ok(());
    }

    let mut status = form.subscribe();
    println!("State: {}", form.state().label());
    loop {
        if status.changed().await.is_err() {
            break;
        }
        let state = status.borrow_and_update().clone();
        match &state {
            SubmissionState::Failed { reason } => {
                println!("State: failed ({reason})");
                break;
            }
            SubmissionState::Idle => {
                let cleared = form.view().request == ContactRequest::default();
                println!("State: idle (request cleared: {cleared})");
                break;
            }
            other => println!("State: {}", other.label()),
        }
    }

    form.close();
    Ok(())
}

fn demo_edits() -> Vec<FieldEdit> {
    vec![
        FieldEdit::new(ContactField::Name, "Riley Chen"),
        FieldEdit::new(ContactField::Email, "riley.chen@example.com"),
        FieldEdit::new(ContactField::Subject, "First-time buyer questions"),
        FieldEdit::new(
            ContactField::Message,
            "We are pre-approved and looking at three-bedroom homes.",
        ),
        FieldEdit::new(ContactField::Service, ServiceCategory::Buying.value()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_args() -> ContactValidateArgs {
        ContactValidateArgs {
            json: None,
            name: None,
            email: None,
            phone: None,
            subject: None,
            message: None,
            service: None,
        }
    }

    #[test]
    fn flags_build_a_request() {
        let args = ContactValidateArgs {
            name: Some("Riley".to_string()),
            email: Some("riley@example.com".to_string()),
            subject: Some("Hello".to_string()),
            message: Some("Hi there".to_string()),
            service: Some("investment".to_string()),
            ..empty_args()
        };

        assert!(run_contact_validate(args).expect("validates"));
    }

    #[test]
    fn missing_flags_are_invalid() {
        let args = ContactValidateArgs {
            email: Some("a@b".to_string()),
            ..empty_args()
        };

        let request = contact_request_from_args(args).expect("request builds");
        let errors = validate(&request);
        assert_eq!(errors.get(ContactField::Email), Some("Invalid email address"));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn unreadable_json_surfaces_io_error() {
        let args = ContactValidateArgs {
            json: Some(PathBuf::from("/nonexistent/contact.json")),
            ..empty_args()
        };

        assert!(matches!(
            contact_request_from_args(args),
            Err(AppError::Io(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn demo_runs_to_completion() {
        let args = DemoArgs {
            latency_ms: 10,
            reset_ms: 10,
            fail_lead_capture: false,
        };
        run_demo(args).await.expect("demo completes");
    }

    #[tokio::test(start_paused = true)]
    async fn demo_reports_failed_capture() {
        let args = DemoArgs {
            latency_ms: 10,
            reset_ms: 10,
            fail_lead_capture: true,
        };
        run_demo(args).await.expect("demo completes");
    }
}
