use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use crate::domain::account::models::Role;

/// Error for parsing access vocabulary from its wire names
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessParseError {
    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    #[error("Unknown resource category '{0}'")]
    UnknownCategory(String),

    #[error("Unknown field '{0}'")]
    UnknownField(String),
}

/// Kind of clinical resource a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceCategory {
    PatientProfile,
    ClinicalNote,
    Document,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 3] = [
        ResourceCategory::PatientProfile,
        ResourceCategory::ClinicalNote,
        ResourceCategory::Document,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceCategory::PatientProfile => "patient_profile",
            ResourceCategory::ClinicalNote => "clinical_note",
            ResourceCategory::Document => "document",
        }
    }
}

impl FromStr for ResourceCategory {
    type Err = AccessParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| AccessParseError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// Actions that act on an existing resource and are subject to scope.
    pub fn is_scoped(&self) -> bool {
        matches!(self, Action::Update | Action::Delete)
    }
}

impl FromStr for Action {
    type Err = AccessParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| AccessParseError::UnknownAction(s.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editable field of a clinical resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Diagnosis,
    Stage,
    CancerType,
    Allergies,
    CurrentMedications,
    EmergencyContacts,
    Operations,
    TreatmentSummary,
    NoteContent,
    DocumentTitle,
    DocumentDescription,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Diagnosis,
        Field::Stage,
        Field::CancerType,
        Field::Allergies,
        Field::CurrentMedications,
        Field::EmergencyContacts,
        Field::Operations,
        Field::TreatmentSummary,
        Field::NoteContent,
        Field::DocumentTitle,
        Field::DocumentDescription,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Diagnosis => "diagnosis",
            Field::Stage => "stage",
            Field::CancerType => "cancer_type",
            Field::Allergies => "allergies",
            Field::CurrentMedications => "current_medications",
            Field::EmergencyContacts => "emergency_contacts",
            Field::Operations => "operations",
            Field::TreatmentSummary => "treatment_summary",
            Field::NoteContent => "note_content",
            Field::DocumentTitle => "document_title",
            Field::DocumentDescription => "document_description",
        }
    }

    /// Category this field belongs to.
    pub fn category(&self) -> ResourceCategory {
        match self {
            Field::Diagnosis
            | Field::Stage
            | Field::CancerType
            | Field::Allergies
            | Field::CurrentMedications
            | Field::EmergencyContacts
            | Field::Operations
            | Field::TreatmentSummary => ResourceCategory::PatientProfile,
            Field::NoteContent => ResourceCategory::ClinicalNote,
            Field::DocumentTitle | Field::DocumentDescription => ResourceCategory::Document,
        }
    }
}

impl FromStr for Field {
    type Err = AccessParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| AccessParseError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which resources of a category a role may modify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only resources whose owner is the actor
    Own,
    All,
}

/// Resource targeted by a request.
///
/// `owner_id` is the identifier of the account that created the resource,
/// absent for resources that do not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub category: ResourceCategory,
    pub owner_id: Option<String>,
}

impl Resource {
    pub fn new(category: ResourceCategory) -> Self {
        Self {
            category,
            owner_id: None,
        }
    }

    pub fn owned_by(category: ResourceCategory, owner_id: impl Into<String>) -> Self {
        Self {
            category,
            owner_id: Some(owner_id.into()),
        }
    }
}

/// Question put to the access policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
    pub action: Action,
    pub resource: Resource,
    pub field: Option<Field>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The role may not perform this action on this category
    ActionNotPermitted,
    /// The action is allowed but the field is not whitelisted
    FieldNotPermitted,
    /// The resource belongs to someone else and the role is limited to its own
    OutOfScope,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialReason::ActionNotPermitted => "action_not_permitted",
            DenialReason::FieldNotPermitted => "field_not_permitted",
            DenialReason::OutOfScope => "out_of_scope",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied(DenialReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }
}
