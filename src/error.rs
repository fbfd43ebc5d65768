//! Error taxonomy.
//!
//! Kept deliberately hand-rolled: plain enums, manual `Display`/`Error`
//! impls, and a `From<io::Error>` at each I/O boundary. Nothing here is
//! allowed to unwind across a worker-thread boundary: transport and
//! protocol errors are caught inside the workers and folded into a
//! `Disconnected` event instead.

use std::fmt;
use std::io;

/// Synchronous input-validation errors, surfaced directly to the caller.
#[derive(Debug, Eq, PartialEq)]
pub enum ConnectError {
    EmptyHost,
    EmptyTag,
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectError::EmptyHost => write!(f, "host must not be empty"),
            ConnectError::EmptyTag => write!(f, "client tag must not be empty"),
        }
    }
}

impl std::error::Error for ConnectError {}

/// Errors thrown synchronously from a config setter.
#[derive(Debug, Eq, PartialEq)]
pub enum ConfigError {
    ClientCertMissingPrivateKey,
    ClientCertExpired,
    ClientCertNotYetValid,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ClientCertMissingPrivateKey => {
                write!(f, "TLS client certificate has no associated private key")
            }
            ConfigError::ClientCertExpired => write!(f, "TLS client certificate has expired"),
            ConfigError::ClientCertNotYetValid => {
                write!(f, "TLS client certificate is not yet valid")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors internal to the transport engine. These never escape the worker
/// threads; they are logged and the connection transitions to `Disconnected`.
#[derive(Debug)]
pub enum TransportError {
    Io(io::Error),
    Protocol(ProtocolError),
    Tls(String),
    NoSuitableAddress,
}

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum ProtocolError {
    /// Frame length prefix was zero or exceeded `MAX_MESSAGE_SIZE`.
    LengthOutOfRange(u32),
    /// Stream ended mid-frame.
    Truncated,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::LengthOutOfRange(len) => {
                write!(f, "frame length {} out of range", len)
            }
            ProtocolError::Truncated => write!(f, "frame body truncated"),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Io(e) => write!(f, "I/O error: {}", e),
            TransportError::Protocol(e) => write!(f, "protocol error: {}", e),
            TransportError::Tls(msg) => write!(f, "TLS error: {}", msg),
            TransportError::NoSuitableAddress => write!(f, "no suitable address for host"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        TransportError::Io(e)
    }
}

impl From<ProtocolError> for TransportError {
    fn from(e: ProtocolError) -> Self {
        TransportError::Protocol(e)
    }
}

/// Per-message authentication / cryptographic failure. Does not terminate
/// the connection; the secure codec logs and drops the message.
#[derive(Debug, Eq, PartialEq)]
pub enum CryptoError {
    AuthenticationFailed,
    CounterOverflow,
    InvalidKeyLength,
    InputTooShort,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::AuthenticationFailed => write!(f, "authentication tag mismatch"),
            CryptoError::CounterOverflow => write!(f, "chacha20 block counter would overflow"),
            CryptoError::InvalidKeyLength => write!(f, "invalid cipher key length"),
            CryptoError::InputTooShort => write!(f, "ciphertext shorter than minimum overhead"),
        }
    }
}

impl std::error::Error for CryptoError {}
