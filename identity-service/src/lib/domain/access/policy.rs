//! Role-scoped access policy for clinical resources.
//!
//! Pure and synchronous: the table is fixed at compile time and checked once
//! when the policy is built. Anything not listed is denied.

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::access::models::AccessDecision;
use crate::domain::access::models::AccessRequest;
use crate::domain::access::models::Action;
use crate::domain::access::models::DenialReason;
use crate::domain::access::models::Field;
use crate::domain::access::models::Resource;
use crate::domain::access::models::ResourceCategory;
use crate::domain::access::models::Role;
use crate::domain::access::models::Scope;

const PATIENT_PROFILE_DOCTOR_FIELDS: &[Field] = &[
    Field::Diagnosis,
    Field::Stage,
    Field::CancerType,
    Field::Allergies,
    Field::CurrentMedications,
    Field::EmergencyContacts,
    Field::Operations,
    Field::TreatmentSummary,
];

const PATIENT_PROFILE_NURSE_FIELDS: &[Field] = &[
    Field::Allergies,
    Field::CurrentMedications,
    Field::EmergencyContacts,
];

const NOTE_FIELDS: &[Field] = &[Field::NoteContent];

const DOCUMENT_FIELDS: &[Field] = &[Field::DocumentTitle, Field::DocumentDescription];

const READ_UPDATE: &[Action] = &[Action::Read, Action::Update];

const ALL_ACTIONS: &[Action] = &[Action::Read, Action::Create, Action::Update, Action::Delete];

const READ_CREATE_DELETE: &[Action] = &[Action::Read, Action::Create, Action::Delete];

/// Permissions of one role on one resource category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyEntry {
    pub actions: &'static [Action],
    pub fields: &'static [Field],
    pub scope: Scope,
}

impl PolicyEntry {
    fn allows_action(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    fn allows_field(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }
}

/// Policy table inconsistency detected at startup
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Policy for {role} on {category} whitelists field {field} of another category")]
    ForeignField {
        role: Role,
        category: ResourceCategory,
        field: Field,
    },
}

fn entry_for(role: Role, category: ResourceCategory) -> Option<PolicyEntry> {
    match (role, category) {
        (Role::Doctor, ResourceCategory::PatientProfile) => Some(PolicyEntry {
            actions: READ_UPDATE,
            fields: PATIENT_PROFILE_DOCTOR_FIELDS,
            scope: Scope::All,
        }),
        (Role::Doctor, ResourceCategory::ClinicalNote) => Some(PolicyEntry {
            actions: ALL_ACTIONS,
            fields: NOTE_FIELDS,
            scope: Scope::All,
        }),
        (Role::Doctor, ResourceCategory::Document) => Some(PolicyEntry {
            actions: READ_CREATE_DELETE,
            fields: DOCUMENT_FIELDS,
            scope: Scope::All,
        }),
        (Role::Nurse, ResourceCategory::PatientProfile) => Some(PolicyEntry {
            actions: READ_UPDATE,
            fields: PATIENT_PROFILE_NURSE_FIELDS,
            scope: Scope::All,
        }),
        (Role::Nurse, ResourceCategory::ClinicalNote) => Some(PolicyEntry {
            actions: ALL_ACTIONS,
            fields: NOTE_FIELDS,
            scope: Scope::Own,
        }),
        (Role::Nurse, ResourceCategory::Document) => Some(PolicyEntry {
            actions: READ_CREATE_DELETE,
            fields: DOCUMENT_FIELDS,
            scope: Scope::Own,
        }),
        (Role::Patient | Role::Guardian, _) => None,
    }
}

/// Access policy lookup table.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    entries: HashMap<(Role, ResourceCategory), PolicyEntry>,
}

impl AccessPolicy {
    /// Build the policy table.
    ///
    /// # Errors
    /// * `ForeignField` - An entry whitelists a field of a different category
    pub fn new() -> Result<Self, PolicyError> {
        let mut entries = HashMap::new();
        for role in Role::ALL {
            for category in ResourceCategory::ALL {
                let Some(entry) = entry_for(role, category) else {
                    continue;
                };
                if let Some(field) = entry.fields.iter().find(|f| f.category() != category) {
                    return Err(PolicyError::ForeignField {
                        role,
                        category,
                        field: *field,
                    });
                }
                entries.insert((role, category), entry);
            }
        }
        Ok(Self { entries })
    }

    pub fn entry(&self, role: Role, category: ResourceCategory) -> Option<&PolicyEntry> {
        self.entries.get(&(role, category))
    }

    /// Whether `role` may perform `action` on `category`, optionally touching `field`.
    ///
    /// An update must name a field on categories with a field whitelist.
    pub fn can_perform(
        &self,
        role: Role,
        action: Action,
        category: ResourceCategory,
        field: Option<Field>,
    ) -> bool {
        self.check_permission(role, action, category, field).is_none()
    }

    /// Whether `resource` is within the scope `role` has on its category.
    ///
    /// Own scope requires the owner id to equal `actor_id` exactly.
    pub fn is_in_scope(&self, role: Role, actor_id: &str, resource: &Resource) -> bool {
        match self.entry(role, resource.category).map(|e| e.scope) {
            Some(Scope::All) => true,
            Some(Scope::Own) => resource.owner_id.as_deref() == Some(actor_id),
            None => false,
        }
    }

    /// Evaluate a full request: permission first, then scope for actions on
    /// existing resources.
    pub fn evaluate(&self, role: Role, actor_id: &str, request: &AccessRequest) -> AccessDecision {
        if let Some(reason) = self.check_permission(
            role,
            request.action,
            request.resource.category,
            request.field,
        ) {
            return AccessDecision::Denied(reason);
        }

        if request.action.is_scoped() && !self.is_in_scope(role, actor_id, &request.resource) {
            return AccessDecision::Denied(DenialReason::OutOfScope);
        }

        AccessDecision::Allowed
    }

    fn check_permission(
        &self,
        role: Role,
        action: Action,
        category: ResourceCategory,
        field: Option<Field>,
    ) -> Option<DenialReason> {
        let Some(entry) = self.entry(role, category) else {
            return Some(DenialReason::ActionNotPermitted);
        };
        if !entry.allows_action(action) {
            return Some(DenialReason::ActionNotPermitted);
        }
        match field {
            Some(field) if !entry.allows_field(field) => Some(DenialReason::FieldNotPermitted),
            // Edits are granted per field; an edit naming none is not covered
            None if action == Action::Update && !entry.fields.is_empty() => {
                Some(DenialReason::FieldNotPermitted)
            }
            _ => None,
        }
    }
}
