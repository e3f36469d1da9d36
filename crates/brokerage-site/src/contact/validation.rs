use std::sync::OnceLock;

use regex::Regex;

use super::domain::{ContactField, ContactRequest, FieldErrors};

const EMAIL_PATTERN: &str = r"(?i-u)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$";

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

/// Whether `email` looks like `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Runs every field rule and collects the failures. All rules run; none short-circuit.
pub fn validate(request: &ContactRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if is_blank(&request.name) {
        errors.insert(ContactField::Name, "Name is required");
    }

    if is_blank(&request.email) {
        errors.insert(ContactField::Email, "Email is required");
    } else if !is_valid_email(&request.email) {
        errors.insert(ContactField::Email, "Invalid email address");
    }

    if is_blank(&request.subject) {
        errors.insert(ContactField::Subject, "Subject is required");
    }

    if is_blank(&request.message) {
        errors.insert(ContactField::Message, "Message is required");
    }

    if request.service.is_none() {
        errors.insert(ContactField::Service, "Please select a service");
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::domain::ServiceCategory;

    fn complete_request() -> ContactRequest {
        ContactRequest {
            name: "Marisol Vega".to_string(),
            email: "marisol.vega@example.com".to_string(),
            phone: None,
            subject: "Two-bedroom near the river".to_string(),
            message: "Could we schedule a showing this weekend?".to_string(),
            service: Some(ServiceCategory::Buying),
        }
    }

    #[test]
    fn complete_request_has_no_errors() {
        assert!(validate(&complete_request()).is_empty());
    }

    #[test]
    fn reports_blank_name_and_malformed_email_together() {
        let request = ContactRequest {
            name: String::new(),
            email: "a@b".to_string(),
            phone: None,
            subject: "hi".to_string(),
            message: "hi".to_string(),
            service: Some(ServiceCategory::Buying),
        };

        let errors = validate(&request);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get(ContactField::Name), Some("Name is required"));
        assert_eq!(errors.get(ContactField::Email), Some("Invalid email address"));
    }

    #[test]
    fn empty_form_flags_every_required_field() {
        let errors = validate(&ContactRequest::default());

        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(
            fields,
            vec![
                ContactField::Name,
                ContactField::Email,
                ContactField::Subject,
                ContactField::Message,
                ContactField::Service,
            ]
        );
        assert_eq!(errors.get(ContactField::Email), Some("Email is required"));
        assert_eq!(
            errors.get(ContactField::Service),
            Some("Please select a service")
        );
        assert!(!errors.contains(ContactField::Phone));
    }

    #[test]
    fn whitespace_only_values_count_as_blank() {
        let mut request = complete_request();
        request.subject = " \t ".to_string();
        request.message = "\n".to_string();
        request.email = "   ".to_string();

        let errors = validate(&request);
        assert_eq!(errors.get(ContactField::Subject), Some("Subject is required"));
        assert_eq!(errors.get(ContactField::Message), Some("Message is required"));
        assert_eq!(errors.get(ContactField::Email), Some("Email is required"));
        assert!(!errors.contains(ContactField::Name));
    }

    #[test]
    fn only_missing_fields_are_reported() {
        let mut request = complete_request();
        request.message.clear();
        request.service = None;

        let errors = validate(&request);
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(fields, vec![ContactField::Message, ContactField::Service]);
    }

    #[test]
    fn accepts_pattern_conforming_addresses() {
        for email in [
            "agent@brokerage.com",
            "First.Last+listings@mail.example.co",
            "oneil@example.io",
            "UPPER_CASE%tag@SUB.DOMAIN.ORG",
            "x-1@a-b.cd",
        ] {
            assert!(is_valid_email(email), "{email} should be accepted");
        }
    }

    #[test]
    fn rejects_addresses_without_at_or_tld() {
        for email in [
            "plainaddress",
            "missing-at.example.com",
            "a@b",
            "user@domain.c",
            "user@domain.",
            "user@.c0",
            "user name@example.com",
            "@example.com",
            "user@example.\u{17F}\u{212A}",
            "\u{212A}evin@example.com",
        ] {
            assert!(!is_valid_email(email), "{email} should be rejected");
        }
    }

    #[test]
    fn case_folding_stays_ascii() {
        let mut request = complete_request();
        request.email = "agent@example.\u{17F}\u{212A}".to_string();

        let errors = validate(&request);
        assert_eq!(errors.get(ContactField::Email), Some("Invalid email address"));
    }

    #[test]
    fn phone_is_never_validated() {
        let mut request = complete_request();
        request.phone = Some("call me maybe".to_string());
        assert!(validate(&request).is_empty());
    }
}
