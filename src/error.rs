use actix_web::http::StatusCode;
use actix_web::ResponseError;

use thiserror::Error;

use crate::repo::UpdateError;
use crate::validation::ValidationErrors;

pub type RestResult<T> = Result<T, RestError>;

#[derive(Debug, Error)]
pub enum RestError {
    /// Body or path that could not be decoded at all
    #[error("{0}")]
    MalformedInput(String),

    #[error("{0}")]
    ValidationFailed(ValidationErrors),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    /// Details are logged, never sent to the client
    #[error("Internal Server Error")]
    StoreFailure(sqlx::Error),
}

impl From<ValidationErrors> for RestError {
    fn from(errors: ValidationErrors) -> Self {
        tracing::warn!(%errors, "Validation failed");
        Self::ValidationFailed(errors)
    }
}

impl From<UpdateError> for RestError {
    fn from(e: UpdateError) -> Self {
        match e {
            UpdateError::NoFieldsToUpdate => Self::NoFieldsToUpdate,
            UpdateError::InvalidDateFormat(_) => Self::MalformedInput(e.to_string()),
        }
    }
}

impl From<sqlx::Error> for RestError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error.cause_chain = ?e, "Database error");
        Self::StoreFailure(e)
    }
}

impl ResponseError for RestError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedInput(_) | Self::ValidationFailed(_) | Self::NoFieldsToUpdate => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::StoreFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
