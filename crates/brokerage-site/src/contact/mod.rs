//! Contact form validation, submission lifecycle, and HTTP endpoints.

pub mod domain;
pub mod form;
pub mod lead;
pub mod registry;
pub mod router;
pub mod validation;

pub use domain::{ContactField, ContactRequest, FieldEdit, FieldErrors, ServiceCategory};
pub use form::{ContactForm, FormError, FormId, FormView, SubmissionState, SubmitOutcome};
pub use lead::{LeadError, LeadSink, LeadSubmission};
pub use registry::{FormRegistry, RegistryError};
pub use router::contact_router;
pub use validation::{is_valid_email, validate};
