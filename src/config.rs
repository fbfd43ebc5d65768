//! Configuration constants and structures.
//!
//! Plain `serde`-derived structs. The library never reads these from disk
//! itself; a host application may, if it wants to.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// Largest application message accepted by `send()` or a received frame.
pub const MAX_MESSAGE_SIZE: usize = 16384;
/// Largest batch the send worker will coalesce into a single `write`.
pub const MAX_SEND_BUFFER: usize = 65536;
/// Cap on the retained per-thread send scratch buffer.
pub const MAX_THREAD_STATIC_BUFFER: usize = 65536;
/// Soft warning threshold for event queue depth.
pub const RECV_QUEUE_WARN: usize = 1000;
/// Hard cap on event queue depth; newly received messages are dropped past this.
pub const MAX_RECV_QUEUE: usize = 10000;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum AddressFamily {
    V4Only,
    V6Only,
    /// Prefer AAAA if present, else A ("happy eyeballs, lite").
    Unspecified,
}

impl Default for AddressFamily {
    fn default() -> Self {
        AddressFamily::Unspecified
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum TlsProtocol {
    Tls12,
    Tls13,
}

impl Default for TlsProtocol {
    fn default() -> Self {
        TlsProtocol::Tls12
    }
}

/// An in-memory client certificate plus its validity window, checked at
/// configuration time rather than at handshake time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCertificate {
    /// PKCS#12 bundle bytes (certificate + private key).
    pub pkcs12: Vec<u8>,
    pub pkcs12_password: String,
    pub not_before_unix: i64,
    pub not_after_unix: i64,
    pub has_private_key: bool,
}

impl ClientCertificate {
    /// Validate the certificate against the current time: a missing private
    /// key, an expired cert, or a not-yet-valid cert are all configuration
    /// errors thrown synchronously by the setter.
    pub fn validate(&self, now_unix: i64) -> Result<(), ConfigError> {
        if !self.has_private_key {
            return Err(ConfigError::ClientCertMissingPrivateKey);
        }
        if now_unix > self.not_after_unix {
            return Err(ConfigError::ClientCertExpired);
        }
        if now_unix < self.not_before_unix {
            return Err(ConfigError::ClientCertNotYetValid);
        }
        Ok(())
    }
}

/// TLS configuration. `None` on `ClientConfig::tls` means a plain TCP
/// connection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TlsOptions {
    pub protocols: TlsProtocol,
    pub check_certificate_revocation: bool,
    pub client_certificate: Option<ClientCertificate>,
    /// `true` to accept whatever certificate the peer presents (testing only).
    pub accept_invalid_certs: bool,
}

impl TlsOptions {
    pub fn new() -> Self {
        TlsOptions {
            protocols: TlsProtocol::Tls12,
            check_certificate_revocation: true,
            client_certificate: None,
            accept_invalid_certs: false,
        }
    }

    /// Install a client certificate, validating it eagerly.
    pub fn with_client_certificate(
        mut self,
        cert: ClientCertificate,
        now_unix: i64,
    ) -> Result<Self, ConfigError> {
        cert.validate(now_unix)?;
        self.client_certificate = Some(cert);
        Ok(self)
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub max_message_size: usize,
    pub max_send_buffer: usize,
    pub max_thread_static_buffer: usize,
    pub recv_queue_warn: usize,
    pub max_recv_queue: usize,
    pub no_delay: bool,
    pub send_timeout: Duration,
    pub address_family: AddressFamily,
    pub tls: Option<TlsOptions>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            max_message_size: MAX_MESSAGE_SIZE,
            max_send_buffer: MAX_SEND_BUFFER,
            max_thread_static_buffer: MAX_THREAD_STATIC_BUFFER,
            recv_queue_warn: RECV_QUEUE_WARN,
            max_recv_queue: MAX_RECV_QUEUE,
            no_delay: true,
            send_timeout: Duration::from_millis(5000),
            address_family: AddressFamily::Unspecified,
            tls: None,
        }
    }
}
