use std::fmt;

use thiserror::Error;

/// Record kind named in `NotFound` errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Patient,
    Address,
    Appointment,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Patient => "patient",
            Entity::Address => "address",
            Entity::Appointment => "appointment",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum PandaError {
    #[error("No {entity} found for ID: {id}")]
    NotFound { entity: Entity, id: String },

    #[error("There is already a patient with this NHS Number, NHS No.: {nhs_number}")]
    Conflict { nhs_number: String },

    /// A state-machine guard rejected the operation.
    #[error("{0}")]
    Forbidden(String),

    /// Malformed input caught by a validator (NHS number or postcode).
    #[error("{0}")]
    Format(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl PandaError {
    pub fn not_found(entity: Entity, id: impl fmt::Display) -> Self {
        PandaError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PandaError>;
