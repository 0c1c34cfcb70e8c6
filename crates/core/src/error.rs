use records::AppointmentStatus;

#[derive(Debug, thiserror::Error)]
pub enum CareError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),

    #[error("failed to create record directory: {0}")]
    RecordDirCreation(std::io::Error),

    #[error("failed to write record file: {0}")]
    FileWrite(std::io::Error),

    #[error("failed to read record file: {0}")]
    FileRead(std::io::Error),

    #[error("failed to remove record: {0}")]
    RecordRemoval(std::io::Error),

    #[error("record error: {0}")]
    Records(#[from] records::RecordsError),

    #[error("identifier error: {0}")]
    Uuid(#[from] carebook_uuid::UuidError),

    #[error("attachment storage error: {0}")]
    Files(#[from] carebook_files::FilesError),

    #[error("text validation error: {0}")]
    Text(#[from] carebook_types::TextError),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("appointment not found: {0}")]
    AppointmentNotFound(String),

    #[error("caregiver request not found for patient {0}")]
    RequestNotFound(String),

    #[error("an account already exists for {0}")]
    EmailAlreadyRegistered(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("appointment status cannot change from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("attachments cannot be added while the appointment is {0}")]
    AttachmentsNotAllowed(AppointmentStatus),

    #[error("attachment not found: {0}")]
    AttachmentNotFound(String),

    #[error("only pending appointments can be cancelled")]
    NotCancellable,

    #[error("{0} is not permitted for this account")]
    NotAuthorised(&'static str),
}

pub type CareResult<T> = std::result::Result<T, CareError>;
