use thiserror::Error;

use crate::messages::{FailureType, MessageType};

/// Errors raised by a [`Transport`](crate::transport::Transport) implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("device disconnected")]
    Disconnected,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("transport error: {0}")]
    Other(String),
}

/// Errors in the frame codec.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("frame truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("unknown message type {0}")]
    UnknownType(u16),
    #[error("payload of {0} bytes does not fit in a frame")]
    Oversized(usize),
    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("protobuf encode error: {0}")]
    Encode(#[from] prost::EncodeError),
}

/// High-level category for a [`SessionError`], for callers that branch on
/// the failure class without matching every variant.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SessionErrorKind {
    /// The device reported a failure other than a user cancellation.
    Device,
    /// Communication with the device broke down (including removal).
    Transport,
    /// The device sent something this session did not expect.
    Protocol,
    /// The caller supplied an unusable argument.
    Validation,
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// A device `Failure` whose code is not a cancellation. Displays as the
    /// device-supplied text.
    #[error("{message}")]
    Device {
        code: Option<FailureType>,
        message: String,
    },
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("wire error: {0}")]
    Wire(#[from] WireError),
    #[error("unexpected response from device: {0:?}")]
    UnexpectedMessage(MessageType),
    #[error("malformed response from device: {0}")]
    MalformedResponse(String),
    #[error("invalid derivation path: {0}")]
    InvalidPath(String),
    #[error("invalid extended private key: {0}")]
    InvalidExtendedKey(String),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

impl SessionError {
    pub fn kind(&self) -> SessionErrorKind {
        match self {
            Self::Device { .. } => SessionErrorKind::Device,
            Self::Transport(_) => SessionErrorKind::Transport,
            Self::Wire(_) | Self::UnexpectedMessage(_) | Self::MalformedResponse(_) => {
                SessionErrorKind::Protocol
            }
            Self::InvalidPath(_) | Self::InvalidExtendedKey(_) => SessionErrorKind::Validation,
        }
    }
}

/// Result of a device operation that the user may decline.
///
/// A declined PIN, passphrase or button prompt unwinds the operation as
/// [`Outcome::Cancelled`] rather than as an error, so callers never have to
/// tell a deliberate cancel apart from a real failure by inspecting an error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    Done(T),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Done(value) => Outcome::Done(f(value)),
            Self::Cancelled => Outcome::Cancelled,
        }
    }

    pub fn done(self) -> Option<T> {
        match self {
            Self::Done(value) => Some(value),
            Self::Cancelled => None,
        }
    }
}
