// errors.rs
use thiserror::Error;

use crate::listings::ListingsError;

/// Errors originating from either the server logic
/// (routing, bad parameters) or the listings layer below it.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Upstream Error: {0}")]
    Upstream(#[from] ListingsError),

    #[error("Internal Server Error")]
    InternalError,
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::Upstream(_) => 502,
            ServerError::InternalError => 500,
        }
    }
}
