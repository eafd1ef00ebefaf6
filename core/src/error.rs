//! Error types for the wrapper.
//!
//! # Design
//! Two channels stay apart. `ClientError` is returned as `Err` and covers
//! failures that make the client unusable (no engine compiled in) or that
//! happen while decoding a stored response. `TransferError` is never
//! returned from a request method: it is recorded in the context after each
//! transfer and read back through the numeric code and message.

use std::fmt;

/// Hard failures surfaced as `Err`.
#[derive(Debug)]
pub enum ClientError {
    /// No native transfer engine is available in this build.
    EngineUnavailable,

    /// The stored response body could not be decoded as JSON.
    DeserializationError(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::EngineUnavailable => {
                write!(f, "no HTTP transfer engine is compiled in (enable the `ureq` feature)")
            }
            ClientError::DeserializationError(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
        }
    }
}

impl std::error::Error for ClientError {}

/// Category of a transport failure. Codes follow libcurl's numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferErrorKind {
    UnsupportedProtocol,
    /// The engine handle is missing, e.g. after `close`.
    FailedInit,
    UrlMalformed,
    CouldntResolveHost,
    CouldntConnect,
    /// The header consumer reported a short count.
    WriteError,
    OperationTimedOut,
    SslConnectError,
    BadFunctionArgument,
    TooManyRedirects,
    RecvError,
}

impl TransferErrorKind {
    pub fn code(&self) -> u32 {
        match self {
            TransferErrorKind::UnsupportedProtocol => 1,
            TransferErrorKind::FailedInit => 2,
            TransferErrorKind::UrlMalformed => 3,
            TransferErrorKind::CouldntResolveHost => 6,
            TransferErrorKind::CouldntConnect => 7,
            TransferErrorKind::WriteError => 23,
            TransferErrorKind::OperationTimedOut => 28,
            TransferErrorKind::SslConnectError => 35,
            TransferErrorKind::BadFunctionArgument => 43,
            TransferErrorKind::TooManyRedirects => 47,
            TransferErrorKind::RecvError => 56,
        }
    }
}

/// A failed transfer as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferError {
    pub kind: TransferErrorKind,
    pub message: String,
}

impl TransferError {
    pub fn new(kind: TransferErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transfer failed ({}): {}", self.code(), self.message)
    }
}

impl std::error::Error for TransferError {}
