use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use book_sale_engine::{db_types::DocumentIdError, AuthApiError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request query: {0}")]
    InvalidRequestQuery(String),
    #[error("Invalid identifier. {0}")]
    InvalidIdentifier(#[from] DocumentIdError),
    #[error("{0}")]
    InsufficientPermissions(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestQuery(_) => StatusCode::BAD_REQUEST,
            Self::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "message": self.to_string() }).to_string())
    }
}

/// The reasons a bearer token could not be turned into a principal. These are logged and then discarded.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Identity token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Identity token signature is invalid. {0}")]
    ValidationError(String),
    #[error("Identity token has expired or carries no expiry. {0}")]
    Expired(String),
    #[error("Identity token does not carry an email claim.")]
    MissingEmail,
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        Self::BackendError(e.to_string())
    }
}

pub const ADMIN_DENIED_MESSAGE: &str = "you do not have access to make admin";

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            AuthApiError::InsufficientPermissions => Self::InsufficientPermissions(ADMIN_DENIED_MESSAGE.to_string()),
        }
    }
}
