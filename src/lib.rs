//! Client-side TCP networking for interactive games: long-lived,
//! event-driven, framed byte-stream connections with optional TLS and an
//! optional authenticated application cipher.

mod bytes_ext;
pub mod cipher;
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod framing;
pub mod packet;
mod pool;
mod queue;
pub mod secure_codec;
pub mod stream;
pub mod tls;
pub mod transport;

pub use cipher::Cipher;
pub use client::Client;
pub use config::{AddressFamily, ClientCertificate, ClientConfig, TlsOptions, TlsProtocol};
pub use error::{ConfigError, ConnectError, CryptoError, ProtocolError, TransportError};
pub use event::{Event, EventBuffer};
pub use packet::Packet;
pub use secure_codec::SecureCodec;
