use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Services a visitor can ask the brokerage about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceCategory {
    Buying,
    Selling,
    Renting,
    PropertyManagement,
    Investment,
    Consultation,
    Other,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 7] = [
        ServiceCategory::Buying,
        ServiceCategory::Selling,
        ServiceCategory::Renting,
        ServiceCategory::PropertyManagement,
        ServiceCategory::Investment,
        ServiceCategory::Consultation,
        ServiceCategory::Other,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            ServiceCategory::Buying => "buying",
            ServiceCategory::Selling => "selling",
            ServiceCategory::Renting => "renting",
            ServiceCategory::PropertyManagement => "property-management",
            ServiceCategory::Investment => "investment",
            ServiceCategory::Consultation => "consultation",
            ServiceCategory::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServiceCategory::Buying => "Buying a Home",
            ServiceCategory::Selling => "Selling a Property",
            ServiceCategory::Renting => "Renting",
            ServiceCategory::PropertyManagement => "Property Management",
            ServiceCategory::Investment => "Investment Properties",
            ServiceCategory::Consultation => "General Consultation",
            ServiceCategory::Other => "Other",
        }
    }

    /// Looks up a category by its form value. Blank and unknown values are unselected.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.value().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// Contact form payload as typed by the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "deserialize_service")]
    pub service: Option<ServiceCategory>,
}

fn deserialize_service<'de, D>(deserializer: D) -> Result<Option<ServiceCategory>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(ServiceCategory::parse))
}

impl ContactRequest {
    /// Applies a single field edit. Returns the field that changed.
    pub fn apply(&mut self, edit: FieldEdit) -> ContactField {
        let FieldEdit { field, value } = edit;
        match field {
            ContactField::Name => self.name = value,
            ContactField::Email => self.email = value,
            ContactField::Phone => {
                self.phone = if value.trim().is_empty() {
                    None
                } else {
                    Some(value)
                }
            }
            ContactField::Subject => self.subject = value,
            ContactField::Message => self.message = value,
            ContactField::Service => self.service = ServiceCategory::parse(&value),
        }
        field
    }
}

/// Named inputs of the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Email,
    Phone,
    Subject,
    Message,
    Service,
}

impl ContactField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Subject => "subject",
            ContactField::Message => "message",
            ContactField::Service => "service",
        }
    }
}

/// One keystroke-level change coming from the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEdit {
    pub field: ContactField,
    #[serde(default)]
    pub value: String,
}

impl FieldEdit {
    pub fn new(field: ContactField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Per-field validation messages. A missing key means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<ContactField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: ContactField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Removes one entry, leaving the rest untouched.
    pub fn clear(&mut self, field: ContactField) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn get(&self, field: ContactField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: ContactField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = ContactField> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContactField, &str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}
