use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use serde::{Deserialize, Serialize};

/// A position outside the valid degree ranges. Never leaves the service as a
/// fault; it becomes the invalid-coordinate sentinel result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateError {
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl Display for CoordinateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateError::LatitudeOutOfRange(lat) =>
                write!(f, "latitude {} is outside [-90, 90]", lat),
            CoordinateError::LongitudeOutOfRange(lon) =>
                write!(f, "longitude {} is outside [-180, 180]", lon),
        }
    }
}

impl Error for CoordinateError {}

/// Failures that abort a call instead of producing a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    UnrecognizedUnit(String),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::UnrecognizedUnit(unit) =>
                write!(f, "unrecognized unit {:?}, expected \"km\", \"nm\" or empty", unit),
        }
    }
}

impl Error for ServiceError {}

#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    MessagePackDecode(rmp_serde::decode::Error),
    MessagePackEncode(rmp_serde::encode::Error),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::Json(e) => write!(f, "json: {}", e),
            CodecError::MessagePackDecode(e) => write!(f, "msgpack: {}", e),
            CodecError::MessagePackEncode(e) => write!(f, "msgpack: {}", e),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CodecError::Json(e) => Some(e),
            CodecError::MessagePackDecode(e) => Some(e),
            CodecError::MessagePackEncode(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(e: serde_json::Error) -> Self {
        CodecError::Json(e)
    }
}

impl From<rmp_serde::decode::Error> for CodecError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        CodecError::MessagePackDecode(e)
    }
}

impl From<rmp_serde::encode::Error> for CodecError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        CodecError::MessagePackEncode(e)
    }
}

/// Call status carried in the `rpc-status` header, numbered like gRPC codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RpcStatus {
    Ok,
    Unknown,
    InvalidArgument,
}

impl RpcStatus {
    pub fn code(&self) -> u16 {
        match self {
            RpcStatus::Ok => 0,
            RpcStatus::Unknown => 2,
            RpcStatus::InvalidArgument => 3,
        }
    }
}

/// Body returned in place of a response payload when a call fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcFault {
    pub code: RpcStatus,
    pub message: String,
}

impl RpcFault {
    pub fn unknown(cause: impl Display) -> Self {
        Self {
            code: RpcStatus::Unknown,
            message: format!("Exception calling application: {}", cause),
        }
    }

    pub fn invalid_argument(cause: impl Display) -> Self {
        Self {
            code: RpcStatus::InvalidArgument,
            message: format!("Error deserializing request: {}", cause),
        }
    }
}
