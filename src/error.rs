//! Error kinds shared by both protocol sides

use serde::{Deserialize, Serialize};

/// Failure of a panel event or device command.
///
/// `Unhandled` is not a failure: it tells the caller to offer the request to
/// the next handler (or pass it through to the transport).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Parameter list is malformed or too short
    #[error("invalid request")]
    InvalidRequest,
    /// Parameter outside the accepted domain (unknown color, key id, ...)
    #[error("invalid parameter")]
    InvalidParameter,
    /// Well-formed parameter rejected by the current state
    #[error("parameter out of range")]
    ParameterOutOfRange,
    /// Operation requires an operational connection
    #[error("device error")]
    DeviceError,
    /// Operation intentionally unsupported
    #[error("not implemented")]
    NotImplemented,
    #[error("not handled")]
    Unhandled,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Status code returned to the panel transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Continue,
    InvalidRequest,
    InvalidParameter,
    ParameterOutOfRange,
    DeviceError,
    NotImplemented,
}

impl Status {
    /// Numeric code used when a status travels inside a parameter list
    pub fn code(self) -> i64 {
        match self {
            Status::Success => 0,
            Status::Continue => 1,
            Status::InvalidRequest => 2,
            Status::InvalidParameter => 3,
            Status::ParameterOutOfRange => 4,
            Status::DeviceError => 5,
            Status::NotImplemented => 6,
        }
    }

    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

impl From<Error> for Status {
    fn from(error: Error) -> Self {
        match error {
            Error::InvalidRequest => Status::InvalidRequest,
            Error::InvalidParameter => Status::InvalidParameter,
            Error::ParameterOutOfRange => Status::ParameterOutOfRange,
            Error::DeviceError => Status::DeviceError,
            Error::NotImplemented => Status::NotImplemented,
            Error::Unhandled => Status::Continue,
        }
    }
}

impl<T> From<&Result<T>> for Status {
    fn from(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(e) => (*e).into(),
        }
    }
}
