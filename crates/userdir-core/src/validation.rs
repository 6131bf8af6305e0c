//! Form validation
//!
//! Checks a candidate `UserForm` against static rules (required fields,
//! lengths, email/phone/URL shape) and uniqueness of username and email
//! among existing records. Results are returned as data; nothing here is an
//! error and nothing here touches the network.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{UserForm, UserRecord};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_RE is a valid regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9][0-9]{0,15}$").expect("PHONE_RE is a valid regex"));

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?([0-9a-z.-]+)\.([a-z.]{2,6})([/A-Za-z0-9_ .-]*)*/?$").expect("URL_RE is a valid regex")
});

/// Length limits, counted in characters of the trimmed value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRules {
    #[serde(default = "default_min_name_length")]
    pub min_name_length: usize,
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
    #[serde(default = "default_max_email_length")]
    pub max_email_length: usize,
    #[serde(default = "default_max_phone_length")]
    pub max_phone_length: usize,
    #[serde(default = "default_max_website_length")]
    pub max_website_length: usize,
    #[serde(default = "default_max_department_length")]
    pub max_department_length: usize,
}

fn default_min_name_length() -> usize {
    2
}
fn default_max_name_length() -> usize {
    50
}
fn default_max_email_length() -> usize {
    100
}
fn default_max_phone_length() -> usize {
    20
}
fn default_max_website_length() -> usize {
    200
}
fn default_max_department_length() -> usize {
    50
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_name_length: default_min_name_length(),
            max_name_length: default_max_name_length(),
            max_email_length: default_max_email_length(),
            max_phone_length: default_max_phone_length(),
            max_website_length: default_max_website_length(),
            max_department_length: default_max_department_length(),
        }
    }
}

/// A form field, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    LastName,
    Username,
    Email,
    Phone,
    Website,
    Department,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::FirstName,
        Field::LastName,
        Field::Username,
        Field::Email,
        Field::Phone,
        Field::Website,
        Field::Department,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Username => "username",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Website => "website",
            Field::Department => "department",
        }
    }

    /// Value of this field in `form`
    pub fn value<'a>(&self, form: &'a UserForm) -> &'a str {
        match self {
            Field::FirstName => &form.first_name,
            Field::LastName => &form.last_name,
            Field::Username => &form.username,
            Field::Email => &form.email,
            Field::Phone => &form.phone,
            Field::Website => &form.website,
            Field::Department => &form.department,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown field '{}'", s))
    }
}

/// One rule a field value breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    Required,
    TooShort { min: usize },
    TooLong { max: usize },
    InvalidEmail,
    InvalidPhone,
    InvalidUrl,
    DuplicateUsername,
    DuplicateEmail,
}

impl Violation {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Violation::Required => "REQUIRED_FIELD",
            Violation::TooShort { .. } => "MIN_LENGTH",
            Violation::TooLong { .. } => "MAX_LENGTH",
            Violation::InvalidEmail => "INVALID_EMAIL",
            Violation::InvalidPhone => "INVALID_PHONE",
            Violation::InvalidUrl => "INVALID_URL",
            Violation::DuplicateUsername => "DUPLICATE_USERNAME",
            Violation::DuplicateEmail => "DUPLICATE_EMAIL",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Required => f.write_str("This field is required."),
            Violation::TooShort { min } => write!(f, "Must be at least {} characters long.", min),
            Violation::TooLong { max } => write!(f, "Must be no more than {} characters long.", max),
            Violation::InvalidEmail => f.write_str("Please enter a valid email address."),
            Violation::InvalidPhone => f.write_str("Please enter a valid phone number."),
            Violation::InvalidUrl => f.write_str("Please enter a valid website URL."),
            Violation::DuplicateUsername => f.write_str("Username already exists."),
            Violation::DuplicateEmail => f.write_str("Email already exists."),
        }
    }
}

impl Serialize for Violation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Violations keyed by field; valid iff empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationResult {
    errors: BTreeMap<Field, Vec<Violation>>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &BTreeMap<Field, Vec<Violation>> {
        &self.errors
    }

    /// All violations for `field`, in rule order
    pub fn field_errors(&self, field: Field) -> &[Violation] {
        self.errors.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The violation a form shows next to `field`
    pub fn first_error(&self, field: Field) -> Option<&Violation> {
        self.field_errors(field).first()
    }

    fn insert(&mut self, field: Field, violations: Vec<Violation>) {
        if !violations.is_empty() {
            self.errors.insert(field, violations);
        }
    }
}

/// Applies `ValidationRules` to forms and single fields
#[derive(Debug, Clone, Default)]
pub struct Validator {
    rules: ValidationRules,
}

impl Validator {
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Check one field against every rule and against `existing` records
    pub fn validate_field(&self, field: Field, value: &str, existing: &[UserRecord]) -> Vec<Violation> {
        let others: Vec<&UserRecord> = existing.iter().collect();
        self.check(field, value, &others)
    }

    /// Like `validate_field`, by field name; unknown names have no rules
    pub fn validate_named_field(&self, name: &str, value: &str, existing: &[UserRecord]) -> Vec<Violation> {
        match name.parse::<Field>() {
            Ok(field) => self.validate_field(field, value, existing),
            Err(_) => Vec::new(),
        }
    }

    /// Check every field of `form`
    ///
    /// The record with id `exclude_id` (the one being edited) is ignored by
    /// the uniqueness checks.
    pub fn validate_form(
        &self,
        form: &UserForm,
        existing: &[UserRecord],
        exclude_id: Option<i64>,
    ) -> ValidationResult {
        let others: Vec<&UserRecord> = existing
            .iter()
            .filter(|record| Some(record.id) != exclude_id)
            .collect();

        let mut result = ValidationResult::default();
        for field in Field::ALL {
            result.insert(field, self.check(field, field.value(form), &others));
        }
        result
    }

    fn check(&self, field: Field, value: &str, others: &[&UserRecord]) -> Vec<Violation> {
        let value = value.trim();
        match field {
            Field::FirstName | Field::LastName => self.check_name(value),
            Field::Username => {
                let mut violations = self.check_name(value);
                if !value.is_empty() && others.iter().any(|u| eq_ignore_case(&u.username, value)) {
                    violations.push(Violation::DuplicateUsername);
                }
                violations
            }
            Field::Email => self.check_email(value, others),
            Field::Phone => self.check_optional(value, &PHONE_RE, Violation::InvalidPhone, self.rules.max_phone_length),
            Field::Website => {
                self.check_optional(value, &URL_RE, Violation::InvalidUrl, self.rules.max_website_length)
            }
            Field::Department => max_length(value, self.rules.max_department_length)
                .into_iter()
                .collect(),
        }
    }

    fn check_name(&self, value: &str) -> Vec<Violation> {
        if value.is_empty() {
            return vec![Violation::Required];
        }

        let mut violations = Vec::new();
        let len = value.chars().count();
        if len < self.rules.min_name_length {
            violations.push(Violation::TooShort {
                min: self.rules.min_name_length,
            });
        }
        violations.extend(max_length(value, self.rules.max_name_length));
        violations
    }

    fn check_email(&self, value: &str, others: &[&UserRecord]) -> Vec<Violation> {
        if value.is_empty() {
            return vec![Violation::Required];
        }

        let mut violations = Vec::new();
        if !EMAIL_RE.is_match(value) {
            violations.push(Violation::InvalidEmail);
        }
        violations.extend(max_length(value, self.rules.max_email_length));
        if others.iter().any(|u| eq_ignore_case(&u.email, value)) {
            violations.push(Violation::DuplicateEmail);
        }
        violations
    }

    fn check_optional(&self, value: &str, pattern: &Regex, invalid: Violation, max: usize) -> Vec<Violation> {
        if value.is_empty() {
            return Vec::new();
        }

        let mut violations = Vec::new();
        if !pattern.is_match(value) {
            violations.push(invalid);
        }
        violations.extend(max_length(value, max));
        violations
    }
}

fn max_length(value: &str, max: usize) -> Option<Violation> {
    (value.chars().count() > max).then_some(Violation::TooLong { max })
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
