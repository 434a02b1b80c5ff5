//! Lifecycle operations over Patient, Address and Appointment records.
//!
//! Every operation runs its guards before touching the store; a failed
//! guard leaves the store unmodified. The order of guards is observable
//! through the returned error and is part of the contract.

use crate::clock::Clock;
use crate::error::{Entity, PandaError, Result};
use crate::model::{
    Address, Appointment, AppointmentPatch, NewAddress, NewAppointment, NewPatient, Patient,
    PatientPatch,
};
use crate::nhs_number::is_valid_nhs_number;
use crate::postcode::normalize_postcode;
use crate::store::RecordStore;

pub struct RecordService<S, C> {
    store: S,
    clock: C,
}

impl<S: RecordStore, C: Clock> RecordService<S, C> {
    /// Store and clock are owned by the caller; there is no ambient state.
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    // --- Patients ---

    pub fn create_patient(&self, new: &NewPatient) -> Result<Patient> {
        check_nhs_number(&new.nhs_number)?;
        check_name(&new.name)?;
        if self
            .store
            .find_patient_by_nhs_number(&new.nhs_number)?
            .is_some()
        {
            return Err(PandaError::Conflict {
                nhs_number: new.nhs_number.clone(),
            });
        }

        let patient = self.store.insert_patient(new, self.clock.now())?;
        tracing::debug!(id = patient.id, "created patient");
        Ok(patient)
    }

    pub fn get_patient(&self, id: i64) -> Result<Patient> {
        self.store
            .get_patient(id)?
            .ok_or_else(|| PandaError::not_found(Entity::Patient, id))
    }

    pub fn get_patient_by_nhs_number(&self, nhs_number: &str) -> Result<Patient> {
        self.store
            .find_patient_by_nhs_number(nhs_number)?
            .ok_or_else(|| PandaError::not_found(Entity::Patient, nhs_number))
    }

    pub fn list_patients(
        &self,
        name_query: Option<&str>,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Patient>> {
        self.store.list_patients(name_query, offset, limit)
    }

    /// Partial update. Renumbering onto an NHS number held by a different
    /// patient is a conflict; re-supplying the patient's own number is not.
    pub fn update_patient(&self, id: i64, patch: &PatientPatch) -> Result<Patient> {
        let mut patient = self.get_patient(id)?;

        if let Some(nhs_number) = &patch.nhs_number {
            check_nhs_number(nhs_number)?;
            if let Some(holder) = self.store.find_patient_by_nhs_number(nhs_number)?
                && holder.id != patient.id
            {
                return Err(PandaError::Conflict {
                    nhs_number: nhs_number.clone(),
                });
            }
            patient.nhs_number = nhs_number.clone();
        }
        if let Some(name) = &patch.name {
            check_name(name)?;
            patient.name = name.clone();
        }
        if let Some(date_of_birth) = patch.date_of_birth {
            patient.date_of_birth = date_of_birth;
        }
        if let Some(sex) = patch.sex {
            patient.sex = sex;
        }

        self.store.update_patient(&patient)?;
        Ok(patient)
    }

    /// Removes the patient and, by cascade, its addresses. Appointments
    /// referencing the patient are left as-is; that asymmetry is a known
    /// gap, kept rather than papered over.
    pub fn delete_patient(&self, id: i64) -> Result<()> {
        if !self.store.delete_patient(id)? {
            return Err(PandaError::not_found(Entity::Patient, id));
        }
        tracing::debug!(id, "deleted patient");
        Ok(())
    }

    // --- Addresses ---

    pub fn create_address_for_owner(&self, owner_id: i64, new: &NewAddress) -> Result<Address> {
        if self.store.get_patient(owner_id)?.is_none() {
            return Err(PandaError::not_found(Entity::Patient, owner_id));
        }
        let mut candidate = new.clone();
        candidate.postcode = normalize_postcode(&candidate.postcode)?;
        self.store
            .insert_address(owner_id, &candidate, self.clock.now())
    }

    pub fn get_address(&self, id: i64) -> Result<Address> {
        self.store
            .get_address(id)?
            .ok_or_else(|| PandaError::not_found(Entity::Address, id))
    }

    pub fn list_addresses(&self, offset: u32, limit: u32) -> Result<Vec<Address>> {
        self.store.list_addresses(offset, limit)
    }

    /// NotFound when the owner itself is absent; an owner with no
    /// addresses yields an empty Vec.
    pub fn list_addresses_by_owner(&self, owner_id: i64) -> Result<Vec<Address>> {
        if self.store.get_patient(owner_id)?.is_none() {
            return Err(PandaError::not_found(Entity::Patient, owner_id));
        }
        self.store.list_addresses_by_owner(owner_id)
    }

    // --- Appointments ---

    pub fn create_appointment(&self, new: &NewAppointment) -> Result<Appointment> {
        if self.store.get_patient(new.patient_id)?.is_none() {
            return Err(PandaError::not_found(Entity::Patient, new.patient_id));
        }
        let appointment = self.store.insert_appointment(new, self.clock.now())?;
        tracing::debug!(id = appointment.id, "created appointment");
        Ok(appointment)
    }

    pub fn get_appointment(&self, id: i64) -> Result<Appointment> {
        self.store
            .get_appointment(id)?
            .ok_or_else(|| PandaError::not_found(Entity::Appointment, id))
    }

    pub fn list_appointments(&self, offset: u32, limit: u32) -> Result<Vec<Appointment>> {
        self.store.list_appointments(offset, limit)
    }

    /// Guard order: missing appointment, cancelled, missing patient,
    /// attended. The patient check covers the effective patient, so an
    /// appointment orphaned by a patient delete cannot be updated.
    /// Nothing is written until all guards pass.
    pub fn update_appointment(&self, id: i64, patch: &AppointmentPatch) -> Result<Appointment> {
        let mut appointment = self.get_appointment(id)?;

        if appointment.is_cancelled {
            return Err(PandaError::Forbidden(format!(
                "Cannot edit a cancelled appointment ID: {id}"
            )));
        }
        let patient_id = patch.patient_id.unwrap_or(appointment.patient_id);
        if self.store.get_patient(patient_id)?.is_none() {
            return Err(PandaError::not_found(Entity::Patient, patient_id));
        }
        if appointment.attended_at.is_some() {
            return Err(PandaError::Forbidden(format!(
                "Cannot alter an attended appointment, ID: {id}"
            )));
        }

        if let Some(patient_id) = patch.patient_id {
            appointment.patient_id = patient_id;
        }
        if let Some(start_at) = patch.start_at {
            appointment.start_at = start_at;
        }
        if let Some(end_at) = patch.end_at {
            appointment.end_at = end_at;
        }

        self.store.update_appointment(&appointment)?;
        Ok(appointment)
    }

    /// Guard order: missing appointment, attended, already cancelled.
    /// `is_cancelled` and `cancelled_at` move together in one write.
    pub fn cancel_appointment(&self, id: i64) -> Result<Appointment> {
        let mut appointment = self.get_appointment(id)?;

        if appointment.attended_at.is_some() {
            return Err(PandaError::Forbidden(format!(
                "Cannot alter an attended appointment, ID: {id}"
            )));
        }
        if appointment.is_cancelled {
            return Err(PandaError::Forbidden(format!(
                "Appointment is already cancelled ID: {id}"
            )));
        }

        appointment.is_cancelled = true;
        appointment.cancelled_at = Some(self.clock.now());
        self.store.update_appointment(&appointment)?;
        tracing::debug!(id, "cancelled appointment");
        Ok(appointment)
    }

    /// Guard order: missing appointment, cancelled, past end time,
    /// already attended. Attending before `start_at` is allowed.
    pub fn mark_attended(&self, id: i64) -> Result<Appointment> {
        let mut appointment = self.get_appointment(id)?;

        if appointment.is_cancelled {
            return Err(PandaError::Forbidden(format!(
                "Cannot mark a cancelled appointment as attended ID: {id}"
            )));
        }
        let now = self.clock.now();
        if now > appointment.end_at {
            return Err(PandaError::Forbidden(format!(
                "Cannot mark an appointment as attended after the end time, ID: {id}"
            )));
        }
        if appointment.attended_at.is_some() {
            return Err(PandaError::Forbidden(format!(
                "Appointment already marked as attended, ID: {id}"
            )));
        }

        appointment.attended_at = Some(now);
        self.store.update_appointment(&appointment)?;
        tracing::debug!(id, "marked appointment attended");
        Ok(appointment)
    }
}

fn check_nhs_number(nhs_number: &str) -> Result<()> {
    if !is_valid_nhs_number(nhs_number)? {
        return Err(PandaError::Format(format!(
            "NHS Number failed validation, NHS No.: {nhs_number}"
        )));
    }
    Ok(())
}

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PandaError::Format(
            "Patient name must not be empty".to_string(),
        ));
    }
    Ok(())
}
