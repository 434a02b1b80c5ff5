use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Patient sex, as recorded at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Intersex,
    #[serde(rename = "Non-Binary")]
    NonBinary,
    Other,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Intersex => "Intersex",
            Sex::NonBinary => "Non-Binary",
            Sex::Other => "Other",
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Sex::Male),
            "Female" => Ok(Sex::Female),
            "Intersex" => Ok(Sex::Intersex),
            "Non-Binary" => Ok(Sex::NonBinary),
            "Other" => Ok(Sex::Other),
            other => Err(format!("unknown sex value: {other}")),
        }
    }
}

/// Owner kind for an address. Patients are the only owners today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressOwnerType {
    #[default]
    Patient,
}

impl AddressOwnerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressOwnerType::Patient => "patient",
        }
    }
}

impl FromStr for AddressOwnerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patient" => Ok(AddressOwnerType::Patient),
            other => Err(format!("unknown address owner type: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub nhs_number: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub sex: Sex,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    pub owner_type: AddressOwnerType,
    pub owner_id: i64,
    pub line1: String,
    pub line2: String,
    pub town: String,
    pub county: String,
    /// Stored in canonical "OUTWARD INWARD" form.
    pub postcode: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    /// Set at most once, never both this and `cancelled_at`.
    pub attended_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub is_cancelled: bool,
    pub created_at: DateTime<Utc>,
}

/// Candidate for patient creation. The service validates the NHS number
/// and name before persisting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub nhs_number: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub sex: Sex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAddress {
    #[serde(default)]
    pub owner_type: AddressOwnerType,
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    pub town: String,
    pub county: String,
    pub postcode: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// Partial update for a patient. `Some(value)` applies the field,
/// `None` leaves it untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientPatch {
    pub nhs_number: Option<String>,
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub sex: Option<Sex>,
}

/// Partial update for an appointment. `attended_at`, `cancelled_at` and
/// `is_cancelled` are deliberately absent: those only move through
/// `cancel_appointment` / `mark_attended`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppointmentPatch {
    pub patient_id: Option<i64>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sex_serialization() {
        assert_eq!(serde_json::to_value(Sex::Male).unwrap(), json!("Male"));
        assert_eq!(
            serde_json::to_value(Sex::NonBinary).unwrap(),
            json!("Non-Binary")
        );

        let parsed: Sex = serde_json::from_value(json!("Non-Binary")).unwrap();
        assert_eq!(parsed, Sex::NonBinary);
    }

    #[test]
    fn test_sex_from_str_roundtrip() {
        for sex in [
            Sex::Male,
            Sex::Female,
            Sex::Intersex,
            Sex::NonBinary,
            Sex::Other,
        ] {
            assert_eq!(sex.as_str().parse::<Sex>().unwrap(), sex);
        }
        assert!("male".parse::<Sex>().is_err());
    }

    #[test]
    fn test_owner_type_serialization() {
        assert_eq!(
            serde_json::to_value(AddressOwnerType::Patient).unwrap(),
            json!("patient")
        );
    }

    #[test]
    fn test_patient_patch_defaults_to_no_changes() {
        let patch: PatientPatch = serde_json::from_value(json!({})).unwrap();
        assert!(patch.nhs_number.is_none());
        assert!(patch.name.is_none());
        assert!(patch.date_of_birth.is_none());
        assert!(patch.sex.is_none());
    }

    #[test]
    fn test_new_address_line2_defaults_empty() {
        let new: NewAddress = serde_json::from_value(json!({
            "line1": "69 Pendragon Crescent",
            "town": "Newquay",
            "county": "Cornwall",
            "postcode": "TR7 2SS",
            "country": "UK"
        }))
        .unwrap();
        assert_eq!(new.line2, "");
        assert_eq!(new.owner_type, AddressOwnerType::Patient);
    }
}
