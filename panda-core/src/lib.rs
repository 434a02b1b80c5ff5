pub mod clock;
pub mod error;
pub mod model;
pub mod nhs_number;
pub mod postcode;
pub mod service;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Entity, PandaError, Result};
pub use model::{
    Address, AddressOwnerType, Appointment, AppointmentPatch, NewAddress, NewAppointment,
    NewPatient, Patient, PatientPatch, Sex,
};
pub use nhs_number::is_valid_nhs_number;
pub use postcode::normalize_postcode;
pub use service::RecordService;
pub use store::RecordStore;
