//! In-process record storage.
//!
//! Keeps the same contract as the SQLite backend, including address
//! cascade on patient delete. BTreeMaps keyed by id preserve insertion
//! order for the list operations.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use panda_core::{
    Address, Appointment, NewAddress, NewAppointment, NewPatient, Patient, RecordStore,
    Result,
};

#[derive(Default)]
struct Inner {
    patients: BTreeMap<i64, Patient>,
    addresses: BTreeMap<i64, Address>,
    appointments: BTreeMap<i64, Appointment>,
    next_patient_id: i64,
    next_address_id: i64,
    next_appointment_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn insert_patient(&self, new: &NewPatient, created_at: DateTime<Utc>) -> Result<Patient> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_patient_id += 1;
        let patient = Patient {
            id: inner.next_patient_id,
            nhs_number: new.nhs_number.clone(),
            name: new.name.clone(),
            date_of_birth: new.date_of_birth,
            sex: new.sex,
            created_at,
        };
        inner.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    fn get_patient(&self, id: i64) -> Result<Option<Patient>> {
        Ok(self.inner.lock().unwrap().patients.get(&id).cloned())
    }

    fn find_patient_by_nhs_number(&self, nhs_number: &str) -> Result<Option<Patient>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .patients
            .values()
            .find(|p| p.nhs_number == nhs_number)
            .cloned())
    }

    fn list_patients(
        &self,
        name_query: Option<&str>,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Patient>> {
        let inner = self.inner.lock().unwrap();
        let query = name_query.map(|q| q.to_lowercase());
        Ok(inner
            .patients
            .values()
            .filter(|p| match &query {
                Some(q) => p.name.to_lowercase().contains(q),
                None => true,
            })
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn update_patient(&self, patient: &Patient) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.patients.insert(patient.id, patient.clone());
        Ok(())
    }

    fn delete_patient(&self, id: i64) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        if inner.patients.remove(&id).is_none() {
            return Ok(false);
        }
        // Address cascade; appointments are left untouched.
        inner.addresses.retain(|_, a| a.owner_id != id);
        Ok(true)
    }

    fn insert_address(
        &self,
        owner_id: i64,
        new: &NewAddress,
        created_at: DateTime<Utc>,
    ) -> Result<Address> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_address_id += 1;
        let address = Address {
            id: inner.next_address_id,
            owner_type: new.owner_type,
            owner_id,
            line1: new.line1.clone(),
            line2: new.line2.clone(),
            town: new.town.clone(),
            county: new.county.clone(),
            postcode: new.postcode.clone(),
            country: new.country.clone(),
            created_at,
        };
        inner.addresses.insert(address.id, address.clone());
        Ok(address)
    }

    fn get_address(&self, id: i64) -> Result<Option<Address>> {
        Ok(self.inner.lock().unwrap().addresses.get(&id).cloned())
    }

    fn list_addresses(&self, offset: u32, limit: u32) -> Result<Vec<Address>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .addresses
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn list_addresses_by_owner(&self, owner_id: i64) -> Result<Vec<Address>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .addresses
            .values()
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn insert_appointment(
        &self,
        new: &NewAppointment,
        created_at: DateTime<Utc>,
    ) -> Result<Appointment> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_appointment_id += 1;
        let appointment = Appointment {
            id: inner.next_appointment_id,
            patient_id: new.patient_id,
            start_at: new.start_at,
            end_at: new.end_at,
            attended_at: None,
            cancelled_at: None,
            is_cancelled: false,
            created_at,
        };
        inner.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    fn get_appointment(&self, id: i64) -> Result<Option<Appointment>> {
        Ok(self.inner.lock().unwrap().appointments.get(&id).cloned())
    }

    fn list_appointments(&self, offset: u32, limit: u32) -> Result<Vec<Appointment>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .appointments
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn update_appointment(&self, appointment: &Appointment) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .appointments
            .insert(appointment.id, appointment.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use panda_core::Sex;

    #[test]
    fn test_ids_are_sequential_and_order_is_insertion() {
        let store = MemoryStore::new();
        let now = Utc::now();

        for (i, number) in ["4609571471", "4524408592"].iter().enumerate() {
            let patient = store
                .insert_patient(
                    &NewPatient {
                        nhs_number: number.to_string(),
                        name: format!("Patient {i}"),
                        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                        sex: Sex::Other,
                    },
                    now,
                )
                .unwrap();
            assert_eq!(patient.id, i as i64 + 1);
        }

        let listed = store.list_patients(None, 0, 10).unwrap();
        assert_eq!(listed[0].name, "Patient 0");
        assert_eq!(listed[1].name, "Patient 1");
    }

    #[test]
    fn test_delete_cascades_addresses() {
        let store = MemoryStore::new();
        let now = Utc::now();

        let patient = store
            .insert_patient(
                &NewPatient {
                    nhs_number: "4959181745".to_string(),
                    name: "Cascade Case".to_string(),
                    date_of_birth: NaiveDate::from_ymd_opt(1975, 6, 1).unwrap(),
                    sex: Sex::Female,
                },
                now,
            )
            .unwrap();
        let address = store
            .insert_address(
                patient.id,
                &NewAddress {
                    owner_type: Default::default(),
                    line1: "1 High Street".to_string(),
                    line2: String::new(),
                    town: "Truro".to_string(),
                    county: "Cornwall".to_string(),
                    postcode: "TR1 2AB".to_string(),
                    country: "UK".to_string(),
                },
                now,
            )
            .unwrap();

        assert!(store.delete_patient(patient.id).unwrap());
        assert!(store.get_address(address.id).unwrap().is_none());
    }
}
