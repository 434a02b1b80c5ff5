//! SQLite-backed record storage.
//!
//! Schema:
//!   - patients: unique NHS number
//!   - addresses: owner_id references patients, ON DELETE CASCADE
//!   - appointments: patient_id is a bare column, not a foreign key —
//!     deleting a patient leaves its appointments in place (a recorded
//!     gap, kept deliberately)

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use panda_core::{
    Address, AddressOwnerType, Appointment, NewAddress, NewAppointment, NewPatient, Patient,
    RecordStore, Sex,
};

use crate::error::Result;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the store (create if not exists).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL for read-write concurrency; FK enforcement drives the
        // address cascade.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS patients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nhs_number TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                date_of_birth TEXT NOT NULL,
                sex TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS addresses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_type TEXT NOT NULL,
                owner_id INTEGER NOT NULL
                    REFERENCES patients(id) ON DELETE CASCADE,
                line1 TEXT NOT NULL,
                line2 TEXT NOT NULL DEFAULT '',
                town TEXT NOT NULL,
                county TEXT NOT NULL,
                postcode TEXT NOT NULL,
                country TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS appointments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id INTEGER NOT NULL,
                start_at TEXT NOT NULL,
                end_at TEXT NOT NULL,
                attended_at TEXT,
                cancelled_at TEXT,
                is_cancelled INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_addresses_owner ON addresses(owner_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_appointments_patient ON appointments(patient_id)",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn insert_patient_impl(&self, new: &NewPatient, created_at: DateTime<Utc>) -> Result<Patient> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO patients (nhs_number, name, date_of_birth, sex, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                new.nhs_number,
                new.name,
                new.date_of_birth,
                new.sex.as_str(),
                created_at
            ],
        )?;
        Ok(Patient {
            id: conn.last_insert_rowid(),
            nhs_number: new.nhs_number.clone(),
            name: new.name.clone(),
            date_of_birth: new.date_of_birth,
            sex: new.sex,
            created_at,
        })
    }

    fn get_patient_impl(&self, id: i64) -> Result<Option<Patient>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, nhs_number, name, date_of_birth, sex, created_at
             FROM patients WHERE id = ?",
        )?;
        match stmt.query_row(params![id], patient_from_row) {
            Ok(patient) => Ok(Some(patient)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn find_patient_by_nhs_number_impl(&self, nhs_number: &str) -> Result<Option<Patient>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, nhs_number, name, date_of_birth, sex, created_at
             FROM patients WHERE nhs_number = ?",
        )?;
        match stmt.query_row(params![nhs_number], patient_from_row) {
            Ok(patient) => Ok(Some(patient)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list_patients_impl(
        &self,
        name_query: Option<&str>,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Patient>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, nhs_number, name, date_of_birth, sex, created_at
             FROM patients
             WHERE ?1 IS NULL OR name LIKE '%' || ?1 || '%'
             ORDER BY id LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt.query_map(params![name_query, limit, offset], patient_from_row)?;
        rows.map(|r| r.map_err(Into::into)).collect()
    }

    fn update_patient_impl(&self, patient: &Patient) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE patients SET nhs_number = ?, name = ?, date_of_birth = ?, sex = ?
             WHERE id = ?",
            params![
                patient.nhs_number,
                patient.name,
                patient.date_of_birth,
                patient.sex.as_str(),
                patient.id
            ],
        )?;
        Ok(())
    }

    fn delete_patient_impl(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute("DELETE FROM patients WHERE id = ?", params![id])?;
        Ok(rows > 0)
    }

    fn insert_address_impl(
        &self,
        owner_id: i64,
        new: &NewAddress,
        created_at: DateTime<Utc>,
    ) -> Result<Address> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO addresses
                (owner_type, owner_id, line1, line2, town, county, postcode, country, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                new.owner_type.as_str(),
                owner_id,
                new.line1,
                new.line2,
                new.town,
                new.county,
                new.postcode,
                new.country,
                created_at
            ],
        )?;
        Ok(Address {
            id: conn.last_insert_rowid(),
            owner_type: new.owner_type,
            owner_id,
            line1: new.line1.clone(),
            line2: new.line2.clone(),
            town: new.town.clone(),
            county: new.county.clone(),
            postcode: new.postcode.clone(),
            country: new.country.clone(),
            created_at,
        })
    }

    fn get_address_impl(&self, id: i64) -> Result<Option<Address>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = ?"
        ))?;
        match stmt.query_row(params![id], address_from_row) {
            Ok(address) => Ok(Some(address)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list_addresses_impl(&self, offset: u32, limit: u32) -> Result<Vec<Address>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses ORDER BY id LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt.query_map(params![limit, offset], address_from_row)?;
        rows.map(|r| r.map_err(Into::into)).collect()
    }

    fn list_addresses_by_owner_impl(&self, owner_id: i64) -> Result<Vec<Address>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE owner_id = ? ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![owner_id], address_from_row)?;
        rows.map(|r| r.map_err(Into::into)).collect()
    }

    fn insert_appointment_impl(
        &self,
        new: &NewAppointment,
        created_at: DateTime<Utc>,
    ) -> Result<Appointment> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO appointments (patient_id, start_at, end_at, is_cancelled, created_at)
             VALUES (?, ?, ?, 0, ?)",
            params![new.patient_id, new.start_at, new.end_at, created_at],
        )?;
        Ok(Appointment {
            id: conn.last_insert_rowid(),
            patient_id: new.patient_id,
            start_at: new.start_at,
            end_at: new.end_at,
            attended_at: None,
            cancelled_at: None,
            is_cancelled: false,
            created_at,
        })
    }

    fn get_appointment_impl(&self, id: i64) -> Result<Option<Appointment>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?"
        ))?;
        match stmt.query_row(params![id], appointment_from_row) {
            Ok(appointment) => Ok(Some(appointment)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list_appointments_impl(&self, offset: u32, limit: u32) -> Result<Vec<Appointment>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY id LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt.query_map(params![limit, offset], appointment_from_row)?;
        rows.map(|r| r.map_err(Into::into)).collect()
    }

    fn update_appointment_impl(&self, appointment: &Appointment) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE appointments
             SET patient_id = ?, start_at = ?, end_at = ?,
                 attended_at = ?, cancelled_at = ?, is_cancelled = ?
             WHERE id = ?",
            params![
                appointment.patient_id,
                appointment.start_at,
                appointment.end_at,
                appointment.attended_at,
                appointment.cancelled_at,
                appointment.is_cancelled,
                appointment.id
            ],
        )?;
        Ok(())
    }
}

const ADDRESS_COLUMNS: &str =
    "id, owner_type, owner_id, line1, line2, town, county, postcode, country, created_at";

const APPOINTMENT_COLUMNS: &str =
    "id, patient_id, start_at, end_at, attended_at, cancelled_at, is_cancelled, created_at";

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    let sex_raw: String = row.get(4)?;
    let sex: Sex = sex_raw.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(Patient {
        id: row.get(0)?,
        nhs_number: row.get(1)?,
        name: row.get(2)?,
        date_of_birth: row.get(3)?,
        sex,
        created_at: row.get(5)?,
    })
}

fn address_from_row(row: &Row<'_>) -> rusqlite::Result<Address> {
    let owner_type_raw: String = row.get(1)?;
    let owner_type: AddressOwnerType = owner_type_raw.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(Address {
        id: row.get(0)?,
        owner_type,
        owner_id: row.get(2)?,
        line1: row.get(3)?,
        line2: row.get(4)?,
        town: row.get(5)?,
        county: row.get(6)?,
        postcode: row.get(7)?,
        country: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        start_at: row.get(2)?,
        end_at: row.get(3)?,
        attended_at: row.get(4)?,
        cancelled_at: row.get(5)?,
        is_cancelled: row.get(6)?,
        created_at: row.get(7)?,
    })
}

impl RecordStore for SqliteStore {
    fn insert_patient(
        &self,
        new: &NewPatient,
        created_at: DateTime<Utc>,
    ) -> panda_core::Result<Patient> {
        Ok(self.insert_patient_impl(new, created_at)?)
    }

    fn get_patient(&self, id: i64) -> panda_core::Result<Option<Patient>> {
        Ok(self.get_patient_impl(id)?)
    }

    fn find_patient_by_nhs_number(&self, nhs_number: &str) -> panda_core::Result<Option<Patient>> {
        Ok(self.find_patient_by_nhs_number_impl(nhs_number)?)
    }

    fn list_patients(
        &self,
        name_query: Option<&str>,
        offset: u32,
        limit: u32,
    ) -> panda_core::Result<Vec<Patient>> {
        Ok(self.list_patients_impl(name_query, offset, limit)?)
    }

    fn update_patient(&self, patient: &Patient) -> panda_core::Result<()> {
        Ok(self.update_patient_impl(patient)?)
    }

    fn delete_patient(&self, id: i64) -> panda_core::Result<bool> {
        Ok(self.delete_patient_impl(id)?)
    }

    fn insert_address(
        &self,
        owner_id: i64,
        new: &NewAddress,
        created_at: DateTime<Utc>,
    ) -> panda_core::Result<Address> {
        Ok(self.insert_address_impl(owner_id, new, created_at)?)
    }

    fn get_address(&self, id: i64) -> panda_core::Result<Option<Address>> {
        Ok(self.get_address_impl(id)?)
    }

    fn list_addresses(&self, offset: u32, limit: u32) -> panda_core::Result<Vec<Address>> {
        Ok(self.list_addresses_impl(offset, limit)?)
    }

    fn list_addresses_by_owner(&self, owner_id: i64) -> panda_core::Result<Vec<Address>> {
        Ok(self.list_addresses_by_owner_impl(owner_id)?)
    }

    fn insert_appointment(
        &self,
        new: &NewAppointment,
        created_at: DateTime<Utc>,
    ) -> panda_core::Result<Appointment> {
        Ok(self.insert_appointment_impl(new, created_at)?)
    }

    fn get_appointment(&self, id: i64) -> panda_core::Result<Option<Appointment>> {
        Ok(self.get_appointment_impl(id)?)
    }

    fn list_appointments(&self, offset: u32, limit: u32) -> panda_core::Result<Vec<Appointment>> {
        Ok(self.list_appointments_impl(offset, limit)?)
    }

    fn update_appointment(&self, appointment: &Appointment) -> panda_core::Result<()> {
        Ok(self.update_appointment_impl(appointment)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_patient(nhs_number: &str) -> NewPatient {
        NewPatient {
            nhs_number: nhs_number.to_string(),
            name: "David Winch".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1988, 12, 25).unwrap(),
            sex: Sex::Male,
        }
    }

    fn sample_address() -> NewAddress {
        NewAddress {
            owner_type: AddressOwnerType::Patient,
            line1: "69 Pendragon Crescent".to_string(),
            line2: String::new(),
            town: "Newquay".to_string(),
            county: "Cornwall".to_string(),
            postcode: "TR7 2SS".to_string(),
            country: "UK".to_string(),
        }
    }

    #[test]
    fn test_patient_roundtrip() {
        let store = SqliteStore::open(":memory:").unwrap();
        let now = Utc::now();

        let created = store
            .insert_patient_impl(&sample_patient("4609571471"), now)
            .unwrap();
        assert!(created.id > 0);

        let fetched = store.get_patient_impl(created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.sex, Sex::Male);

        let by_number = store
            .find_patient_by_nhs_number_impl("4609571471")
            .unwrap()
            .unwrap();
        assert_eq!(by_number.id, created.id);
    }

    #[test]
    fn test_duplicate_nhs_number_rejected_by_schema() {
        let store = SqliteStore::open(":memory:").unwrap();
        let now = Utc::now();

        store
            .insert_patient_impl(&sample_patient("4609571471"), now)
            .unwrap();
        assert!(store
            .insert_patient_impl(&sample_patient("4609571471"), now)
            .is_err());
    }

    #[test]
    fn test_delete_patient_cascades_addresses_only() {
        let store = SqliteStore::open(":memory:").unwrap();
        let now = Utc::now();

        let patient = store
            .insert_patient_impl(&sample_patient("4524408592"), now)
            .unwrap();
        store
            .insert_address_impl(patient.id, &sample_address(), now)
            .unwrap();
        let appointment = store
            .insert_appointment_impl(
                &NewAppointment {
                    patient_id: patient.id,
                    start_at: now,
                    end_at: now + chrono::Duration::hours(1),
                },
                now,
            )
            .unwrap();

        assert!(store.delete_patient_impl(patient.id).unwrap());

        assert!(store
            .list_addresses_by_owner_impl(patient.id)
            .unwrap()
            .is_empty());
        // Appointments keep their patient_id; there is no cascade for them.
        assert!(store
            .get_appointment_impl(appointment.id)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_delete_missing_patient_returns_false() {
        let store = SqliteStore::open(":memory:").unwrap();
        assert!(!store.delete_patient_impl(999).unwrap());
    }

    #[test]
    fn test_list_patients_name_filter_and_paging() {
        let store = SqliteStore::open(":memory:").unwrap();
        let now = Utc::now();

        for (number, name) in [
            ("4609571471", "Alice Martin"),
            ("4524408592", "Bob Martins"),
            ("4959181745", "Carol Jones"),
        ] {
            let mut new = sample_patient(number);
            new.name = name.to_string();
            store.insert_patient_impl(&new, now).unwrap();
        }

        let all = store.list_patients_impl(None, 0, 100).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "Alice Martin");

        let martins = store.list_patients_impl(Some("Martin"), 0, 100).unwrap();
        assert_eq!(martins.len(), 2);

        let page = store.list_patients_impl(None, 1, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "Bob Martins");
    }

    #[test]
    fn test_appointment_update_roundtrip() {
        let store = SqliteStore::open(":memory:").unwrap();
        let now = Utc::now();

        let patient = store
            .insert_patient_impl(&sample_patient("1565022955"), now)
            .unwrap();
        let mut appointment = store
            .insert_appointment_impl(
                &NewAppointment {
                    patient_id: patient.id,
                    start_at: now,
                    end_at: now + chrono::Duration::hours(1),
                },
                now,
            )
            .unwrap();

        appointment.is_cancelled = true;
        appointment.cancelled_at = Some(now);
        store.update_appointment_impl(&appointment).unwrap();

        let fetched = store.get_appointment_impl(appointment.id).unwrap().unwrap();
        assert!(fetched.is_cancelled);
        assert_eq!(fetched.cancelled_at, appointment.cancelled_at);
        assert!(fetched.attended_at.is_none());
    }
}
