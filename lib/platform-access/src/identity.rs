//! The identity held by a session.
//!
//! An identity is the subset of the account record the UI needs: who is
//! logged in and how to address them. Doctors additionally carry a
//! specialty, staff a department.

use medicare_core::RecordId;
use serde::{Deserialize, Serialize};

/// The logged-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Backend identifier of the account.
    id: RecordId,
    /// Login email address.
    email: String,
    /// Name shown in the header and on dashboards.
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    department: Option<String>,
}

impl Identity {
    /// Creates an identity with no optional fields set.
    #[must_use]
    pub fn new(id: RecordId, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            phone: None,
            specialty: None,
            department: None,
        }
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: Option<String>) -> Self {
        self.phone = phone;
        self
    }

    /// Sets the medical specialty.
    #[must_use]
    pub fn with_specialty(mut self, specialty: Option<String>) -> Self {
        self.specialty = specialty;
        self
    }

    /// Sets the department.
    #[must_use]
    pub fn with_department(mut self, department: Option<String>) -> Self {
        self.department = department;
        self
    }

    #[must_use]
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    #[must_use]
    pub fn specialty(&self) -> Option<&str> {
        self.specialty.as_deref()
    }

    #[must_use]
    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    /// Merges a partial update into this identity.
    ///
    /// Only fields present in the patch are changed. The id is never changed.
    pub fn apply(&mut self, patch: IdentityPatch) {
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone);
        }
        if let Some(specialty) = patch.specialty {
            self.specialty = Some(specialty);
        }
        if let Some(department) = patch.department {
            self.department = Some(department);
        }
    }
}

/// A partial identity update, as submitted from the profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub department: Option<String>,
}

impl IdentityPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.name.is_none()
            && self.phone.is_none()
            && self.specialty.is_none()
            && self.department.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Identity {
        Identity::new(RecordId::new("p-1"), "patient@demo.com", "Pat Demo")
    }

    #[test]
    fn new_identity_has_no_optional_fields() {
        let identity = sample();
        assert_eq!(identity.id().as_str(), "p-1");
        assert_eq!(identity.email(), "patient@demo.com");
        assert_eq!(identity.name(), "Pat Demo");
        assert!(identity.phone().is_none());
        assert!(identity.specialty().is_none());
        assert!(identity.department().is_none());
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let mut identity = sample().with_phone(Some("555-0100".to_string()));
        identity.apply(IdentityPatch {
            name: Some("Patricia Demo".to_string()),
            department: Some("Cardiology".to_string()),
            ..IdentityPatch::default()
        });

        assert_eq!(identity.name(), "Patricia Demo");
        assert_eq!(identity.email(), "patient@demo.com");
        assert_eq!(identity.phone(), Some("555-0100"));
        assert_eq!(identity.department(), Some("Cardiology"));
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(IdentityPatch::default().is_empty());
        let patch = IdentityPatch {
            phone: Some("1".to_string()),
            ..IdentityPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let json = serde_json::to_value(sample()).expect("serialize");
        assert!(json.get("phone").is_none());
        assert_eq!(json["name"], "Pat Demo");
    }

    #[test]
    fn decodes_with_missing_optional_fields() {
        let identity: Identity =
            serde_json::from_str(r#"{"id":7,"email":"a@b.c","name":"A"}"#).expect("deserialize");
        assert_eq!(identity.id().as_str(), "7");
        assert!(identity.specialty().is_none());
    }
}
