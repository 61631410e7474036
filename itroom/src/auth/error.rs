use sled::transaction::TransactionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Permission record not found")]
    PermissionRecordNotFound,

    #[error("Password does not meet strength requirements")]
    WeakPassword,

    #[error("Cannot delete user's own account")]
    CannotDeleteSelf,

    #[error("Permissions of an elevated role cannot be configured")]
    ElevatedRolePermissions,

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Permission store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Password hashing error: {0}")]
    PasswordHashError(String),
}

impl AuthError {
    /// True when the error comes from the infrastructure rather than from policy or input.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AuthError::StoreUnavailable(_)
                | AuthError::SerializationError(_)
                | AuthError::PasswordHashError(_)
        )
    }
}

impl From<sled::Error> for AuthError {
    fn from(err: sled::Error) -> Self {
        AuthError::StoreUnavailable(err.to_string())
    }
}

impl From<TransactionError<AuthError>> for AuthError {
    fn from(err: TransactionError<AuthError>) -> Self {
        match err {
            TransactionError::Abort(e) => e,
            TransactionError::Storage(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::SerializationError(err.to_string())
    }
}
