use crate::models::{FieldError, TaskId};
use axum::http::StatusCode;
use std::fmt;

#[derive(Debug)]
pub enum ClientError {
    /// No usable response: transport failure or a body that could not be read.
    Network(String),
    Server { status: u16, message: Option<String> },
    Validation { fields: Vec<FieldError> },
    NotFound { id: TaskId },
}

impl ClientError {
    pub fn server(status: u16, message: Option<String>) -> Self {
        Self::Server { status, message }
    }

    pub fn validation(fields: Vec<FieldError>) -> Self {
        Self::Validation { fields }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation { fields } => fields,
            _ => &[],
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(message) => write!(f, "network error: {message}"),
            Self::Server {
                status,
                message: Some(message),
            } => write!(f, "server error {status}: {message}"),
            Self::Server {
                status,
                message: None,
            } => write!(f, "server error {status}"),
            Self::Validation { fields } => {
                write!(f, "validation failed")?;
                for (index, error) in fields.iter().enumerate() {
                    let sep = if index == 0 { ": " } else { "; " };
                    write!(f, "{sep}{} {}", error.field, error.message)?;
                }
                Ok(())
            }
            Self::NotFound { id } => write!(f, "task {id} not found"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    /// Covers transport failures and unreadable bodies alike; statuses are
    /// classified before any body is decoded.
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

#[derive(Debug)]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.key, self.message)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        let status = match &err {
            ClientError::Network(_) | ClientError::Server { .. } => StatusCode::BAD_GATEWAY,
            ClientError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ClientError::NotFound { .. } => StatusCode::NOT_FOUND,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
