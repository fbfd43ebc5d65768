//! Uniform `read`/`write`/`close` over plain and TLS streams.
//!
//! A small enum rather than a generic wrapper, since a `Client` needs to
//! switch between plain and TLS at runtime depending on `TlsOptions`, not
//! at compile time.

use std::io::{self, Read, Write};
use std::net::TcpStream;

use native_tls::TlsStream;

/// The stream the transport engine reads and writes through once connected.
pub enum ManagedStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl ManagedStream {
    pub fn try_clone(&self) -> io::Result<ManagedStream> {
        match self {
            ManagedStream::Plain(s) => Ok(ManagedStream::Plain(s.try_clone()?)),
            ManagedStream::Tls(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "TLS streams cannot be cloned; the transport keeps a single handle",
            )),
        }
    }

    pub fn shutdown(&self) -> io::Result<()> {
        match self {
            ManagedStream::Plain(s) => s.shutdown(std::net::Shutdown::Both),
            ManagedStream::Tls(s) => s.get_ref().shutdown(std::net::Shutdown::Both),
        }
    }

    /// Set the blocking-read timeout so the receive worker can periodically
    /// check its cancellation token without blocking forever on a quiet
    /// connection.
    pub fn set_read_timeout(&self, timeout: Option<std::time::Duration>) -> io::Result<()> {
        match self {
            ManagedStream::Plain(s) => s.set_read_timeout(timeout),
            ManagedStream::Tls(s) => s.get_ref().set_read_timeout(timeout),
        }
    }
}

impl Read for ManagedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            ManagedStream::Plain(s) => s.read(buf),
            ManagedStream::Tls(s) => s.read(buf),
        }
    }
}

impl Write for ManagedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            ManagedStream::Plain(s) => s.write(buf),
            ManagedStream::Tls(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            ManagedStream::Plain(s) => s.flush(),
            ManagedStream::Tls(s) => s.flush(),
        }
    }
}
