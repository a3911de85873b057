use serde::de::DeserializeOwned;

use crate::domain::account::models::Account;
use crate::domain::account::models::Profile;
use crate::domain::account::models::Role;

/// Decode a JSON-encoded auxiliary field, falling back to `T::default()`.
///
/// A missing or empty value is not an error. A value that fails to decode is
/// logged once and replaced by the default.
///
/// # Returns
/// The decoded value and whether the stored value was usable
pub fn parse_or_default<T>(field: &str, raw: Option<&str>) -> (T, bool)
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        return (T::default(), true);
    };

    match serde_json::from_str(raw) {
        Ok(value) => (value, true),
        Err(e) => {
            tracing::warn!(field, error = %e, "Stored profile field is not valid JSON, using default");
            (T::default(), false)
        }
    }
}

fn decode<T>(field: &str, raw: Option<&str>) -> T
where
    T: DeserializeOwned + Default,
{
    parse_or_default(field, raw).0
}

impl From<Account> for Profile {
    fn from(account: Account) -> Self {
        let (search_history, assigned_patients, patient_ids) = match account.role {
            Role::Doctor | Role::Nurse => (
                decode("search_history", account.search_history.as_deref()),
                decode("assigned_patients", account.assigned_patients.as_deref()),
                Vec::new(),
            ),
            Role::Guardian => (
                Vec::new(),
                Vec::new(),
                decode("patient_ids", account.patient_ids.as_deref()),
            ),
            Role::Patient => (Vec::new(), Vec::new(), Vec::new()),
        };

        Profile {
            id: account.id,
            name: account.name.as_str().to_string(),
            email: account.email.as_str().to_string(),
            national_id: account.national_id.as_str().to_string(),
            role: account.role,
            department: account.department,
            license: account.license,
            search_history,
            assigned_patients,
            patient_ids,
            created_at: account.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::account::models::AccountId;
    use crate::domain::account::models::DisplayName;
    use crate::domain::account::models::EmailAddress;
    use crate::domain::account::models::NationalId;

    fn account(role: Role) -> Account {
        Account {
            id: AccountId::new(),
            name: DisplayName::new("Ana".to_string()).unwrap(),
            email: EmailAddress::new("ana@x.cl".to_string()).unwrap(),
            password_hash: "$argon2id$stub".to_string(),
            national_id: NationalId::new("12.345.678-5".to_string()).unwrap(),
            role,
            department: None,
            license: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
            search_history: None,
            assigned_patients: None,
            patient_ids: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_or_default() {
        let (ids, valid): (Vec<String>, bool) =
            parse_or_default("patient_ids", Some(r#"["p1","p2"]"#));
        assert_eq!(ids, vec!["p1".to_string(), "p2".to_string()]);
        assert!(valid);

        let (missing, valid): (Vec<String>, bool) = parse_or_default("patient_ids", None);
        assert!(missing.is_empty());
        assert!(valid);

        let (empty, valid): (Vec<String>, bool) = parse_or_default("patient_ids", Some("  "));
        assert!(empty.is_empty());
        assert!(valid);

        let (corrupt, valid): (Vec<String>, bool) =
            parse_or_default("patient_ids", Some("[not json"));
        assert!(corrupt.is_empty());
        assert!(!valid);
    }

    #[test]
    fn test_staff_profile_decodes_history_and_assignments() {
        let mut doctor = account(Role::Doctor);
        doctor.search_history = Some(r#"[{"rut":"12.345.678-5"}]"#.to_string());
        doctor.assigned_patients = Some(r#"["p1"]"#.to_string());
        doctor.patient_ids = Some(r#"["ignored"]"#.to_string());

        let profile = Profile::from(doctor);
        assert_eq!(profile.search_history.len(), 1);
        assert_eq!(profile.assigned_patients, vec!["p1".to_string()]);
        assert!(profile.patient_ids.is_empty());
    }

    #[test]
    fn test_guardian_profile_decodes_patient_ids() {
        let mut guardian = account(Role::Guardian);
        guardian.patient_ids = Some(r#"["p1","p2"]"#.to_string());

        let profile = Profile::from(guardian);
        assert_eq!(profile.patient_ids.len(), 2);
        assert!(profile.search_history.is_empty());
    }

    #[test]
    fn test_corrupt_field_does_not_fail_profile() {
        let mut nurse = account(Role::Nurse);
        nurse.assigned_patients = Some("{broken".to_string());

        let profile = Profile::from(nurse);
        assert!(profile.assigned_patients.is_empty());
        assert_eq!(profile.email, "ana@x.cl");
    }
}
