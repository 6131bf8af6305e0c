//! Data models for userdir
//!
//! Defines the wire shape of a user record as served by the backing
//! REST API, the draft sent on create/update, and the flat form the
//! console edits.

use serde::{Deserialize, Serialize};

/// Department stored when a form leaves it empty
pub const DEFAULT_DEPARTMENT: &str = "Not specified";

/// Organization a user belongs to (the "department")
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catch_phrase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bs: Option<String>,
}

impl Company {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catch_phrase: None,
            bs: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Geo {
    #[serde(default)]
    pub lat: String,
    #[serde(default)]
    pub lng: String,
}

/// Postal address; the console never edits it
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub suite: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zipcode: String,
    #[serde(default)]
    pub geo: Geo,
}

impl Address {
    /// Empty address sent with every create/update
    pub fn placeholder() -> Self {
        Self {
            geo: Geo {
                lat: "0".to_string(),
                lng: "0".to_string(),
            },
            ..Self::default()
        }
    }
}

/// A user record as held by the backing API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    /// Identifier assigned by the backing store
    pub id: i64,
    /// Display name ("First Last")
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl UserRecord {
    /// Create a record with just the identifying fields set
    pub fn new(
        id: i64,
        name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            username: username.into(),
            email: email.into(),
            phone: None,
            website: None,
            company: None,
            address: None,
        }
    }

    /// Set the department (stored as the organization name)
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.company = Some(Company::named(department));
        self
    }

    /// First token of the display name
    pub fn first_name(&self) -> &str {
        split_name(&self.name).0
    }

    /// Everything after the first space of the display name
    pub fn last_name(&self) -> &str {
        split_name(&self.name).1
    }

    /// Organization name, or an empty string when absent
    pub fn department(&self) -> &str {
        self.company.as_ref().map(|c| c.name.as_str()).unwrap_or("")
    }
}

/// Split a display name on its first space into (first, last)
///
/// Both the filter and the form-editing paths derive names through here.
pub fn split_name(full_name: &str) -> (&str, &str) {
    full_name.split_once(' ').unwrap_or((full_name, ""))
}

/// A record body sent to the API on create/update (no id)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDraft {
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub company: Company,
    pub address: Address,
}

impl UserDraft {
    /// Attach an identity, producing the stored record
    pub fn into_record(self, id: i64) -> UserRecord {
        UserRecord {
            id,
            name: self.name,
            username: self.username,
            email: self.email,
            phone: self.phone,
            website: self.website,
            company: Some(self.company),
            address: Some(self.address),
        }
    }
}

/// Flat user form as entered in the console
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub department: String,
}

impl UserForm {
    /// Populate a form from a stored record (for editing)
    pub fn from_record(record: &UserRecord) -> Self {
        let (first_name, last_name) = split_name(&record.name);
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            username: record.username.clone(),
            email: record.email.clone(),
            phone: record.phone.clone().unwrap_or_default(),
            website: record.website.clone().unwrap_or_default(),
            department: record.department().to_string(),
        }
    }

    /// Format the form into the API's wire shape
    pub fn to_draft(&self) -> UserDraft {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string();
        let department = match self.department.trim() {
            "" => DEFAULT_DEPARTMENT,
            d => d,
        };

        UserDraft {
            name,
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: non_empty(&self.phone),
            website: non_empty(&self.website),
            company: Company::named(department),
            address: Address::placeholder(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
