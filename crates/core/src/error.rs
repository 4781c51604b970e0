use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum Form033Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid value: {0}")]
    InvalidValue(#[from] form033_types::TypesError),
    #[error("patient not found: {0}")]
    UnknownPatient(Uuid),
    #[error("patient {0} has no teeth recorded")]
    EmptyToothSet(Uuid),
    #[error("failed to load patient {patient_id}: {reason}")]
    PatientSource { patient_id: Uuid, reason: String },
}

pub type Form033Result<T> = std::result::Result<T, Form033Error>;
