use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::{
    Address, Appointment, NewAddress, NewAppointment, NewPatient, Patient,
};

/// Storage port consumed by [`RecordService`](crate::service::RecordService).
///
/// Implementations assign ids on insert and report backend failures as
/// `PandaError::Storage`; the service interprets absent/present results
/// into `NotFound` / `Conflict` outcomes. List operations return records
/// in insertion order.
pub trait RecordStore: Send + Sync {
    fn insert_patient(&self, new: &NewPatient, created_at: DateTime<Utc>) -> Result<Patient>;

    fn get_patient(&self, id: i64) -> Result<Option<Patient>>;

    fn find_patient_by_nhs_number(&self, nhs_number: &str) -> Result<Option<Patient>>;

    /// `name_query` filters on a case-insensitive name substring.
    fn list_patients(
        &self,
        name_query: Option<&str>,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Patient>>;

    /// Writes the whole record; the caller has already applied its patch.
    fn update_patient(&self, patient: &Patient) -> Result<()>;

    /// Returns false when no such patient exists. Deleting a patient also
    /// removes its addresses; appointments keep their `patient_id` as-is.
    fn delete_patient(&self, id: i64) -> Result<bool>;

    fn insert_address(
        &self,
        owner_id: i64,
        new: &NewAddress,
        created_at: DateTime<Utc>,
    ) -> Result<Address>;

    fn get_address(&self, id: i64) -> Result<Option<Address>>;

    fn list_addresses(&self, offset: u32, limit: u32) -> Result<Vec<Address>>;

    fn list_addresses_by_owner(&self, owner_id: i64) -> Result<Vec<Address>>;

    fn insert_appointment(
        &self,
        new: &NewAppointment,
        created_at: DateTime<Utc>,
    ) -> Result<Appointment>;

    fn get_appointment(&self, id: i64) -> Result<Option<Appointment>>;

    fn list_appointments(&self, offset: u32, limit: u32) -> Result<Vec<Appointment>>;

    fn update_appointment(&self, appointment: &Appointment) -> Result<()>;
}
