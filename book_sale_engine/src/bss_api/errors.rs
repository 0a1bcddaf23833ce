use thiserror::Error;

use crate::traits::StoreError;

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    /// Covers every reason a privileged action is refused. The reasons are deliberately not told apart.
    #[error("Insufficient permissions")]
    InsufficientPermissions,
}

impl From<StoreError> for AuthApiError {
    fn from(e: StoreError) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}
