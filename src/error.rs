use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid birthday '{0}': expected DD-MM-YY")]
    InvalidBirthday(String),
    #[error("Invalid amount '{0}': expected a positive number")]
    InvalidAmount(String),
    #[error("Amount {0} would take the balance out of range")]
    BalanceOverflow(String),
    #[error("No profile for user {0}")]
    MissingProfile(String),
    #[error("Expense {0} not found")]
    ExpenseNotFound(u64),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl LedgerError {
    /// Whether the error left the durable store in doubt, as opposed to a
    /// problem with the user's input or a lookup miss.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            LedgerError::IoError(_)
                | LedgerError::SerializationError(_)
                | LedgerError::InternalError(_)
        )
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LedgerError {
    fn from(err: rocksdb::Error) -> Self {
        LedgerError::InternalError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
