//! Length-prefix framing codec.
//!
//! Wire format: `[length: u32 big-endian][payload: length bytes]`, where
//! `length` is the payload size alone (the 4-byte prefix is not counted).

use bytes::{BufMut, BytesMut};
use std::io::{self, Read, Write};

use crate::error::ProtocolError;

pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Outcome of a blocking read-exactly: either the bytes arrived, or the
/// stream ended (which is not an error).
pub enum ReadOutcome<T> {
    Ok(T),
    Closed,
}

/// Block until exactly `buf.len()` bytes are read, or the stream ends.
///
/// Returns `Closed` (not an `Err`) when the peer closes cleanly mid-read or
/// zero bytes are ever produced; returns `Err` only on a genuine I/O failure.
pub fn read_exactly<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<ReadOutcome<()>> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Ok(ReadOutcome::Closed),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(ReadOutcome::Ok(()))
}

/// Read one length-prefixed frame from `reader`, enforcing
/// `1 <= len <= max_message_size`. Allocates the payload buffer via
/// `alloc_payload` so callers can source it from a pool.
pub fn read_frame<R: Read>(
    reader: &mut R,
    max_message_size: usize,
    mut alloc_payload: impl FnMut(usize) -> Vec<u8>,
) -> io::Result<ReadOutcome<Vec<u8>>> {
    let mut len_buf = [0u8; LENGTH_PREFIX_SIZE];
    match read_exactly(reader, &mut len_buf)? {
        ReadOutcome::Closed => return Ok(ReadOutcome::Closed),
        ReadOutcome::Ok(()) => {}
    }

    let len = crate::bytes_ext::read_u32_be(&len_buf);
    if len == 0 || len as usize > max_message_size {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            ProtocolError::LengthOutOfRange(len),
        ));
    }

    let mut payload = alloc_payload(len as usize);
    match read_exactly(reader, &mut payload)? {
        ReadOutcome::Ok(()) => Ok(ReadOutcome::Ok(payload)),
        ReadOutcome::Closed => Err(io::Error::new(io::ErrorKind::UnexpectedEof, ProtocolError::Truncated)),
    }
}

/// Encode one message as `be32(len) ‖ payload` into `out`.
pub fn encode_message(out: &mut BytesMut, payload: &[u8]) {
    out.put_u32(payload.len() as u32);
    out.put_slice(payload);
}

/// Split a batch of messages into consecutive wire-ready buffers, each
/// `<= max_batch` bytes, while keeping every message contiguous and in
/// order. A single message larger than `max_batch` gets a batch of its own,
/// since it can never be coalesced with anything else and still fit.
pub fn build_batches<'a>(messages: &[&'a [u8]], max_batch: usize) -> Vec<BytesMut> {
    let mut batches = Vec::new();
    let mut current = BytesMut::new();

    for msg in messages {
        let framed_len = LENGTH_PREFIX_SIZE + msg.len();
        if !current.is_empty() && current.len() + framed_len > max_batch {
            batches.push(std::mem::take(&mut current));
        }
        current.reserve(framed_len);
        encode_message(&mut current, msg);
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}

/// Write every batch to `writer` in order, each as one `write_all` call.
pub fn write_batches<W: Write>(writer: &mut W, batches: &[BytesMut]) -> io::Result<()> {
    for batch in batches {
        writer.write_all(batch)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn messages_that_together_fit_the_cap_coalesce_into_one_batch() {
        let a = vec![0u8; 100];
        let b = vec![1u8; 200];
        let c = vec![2u8; 63000];
        let msgs: Vec<&[u8]> = vec![&a, &b, &c];

        // (4+100) + (4+200) + (4+63000) = 63312, which still fits under the
        // 65536 cap, so all three land in a single batch, in order.
        let batches = build_batches(&msgs, 65536);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), (4 + 100) + (4 + 200) + (4 + 63000));
    }

    #[test]
    fn a_message_that_would_overflow_the_cap_starts_a_new_batch() {
        let a = vec![0u8; 100];
        let b = vec![1u8; 200];
        let c = vec![2u8; 63000];
        let msgs: Vec<&[u8]> = vec![&a, &b, &c];

        // With a tighter cap, the third message no longer fits alongside
        // the first two and spills into its own batch.
        let batches = build_batches(&msgs, 400);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), (4 + 100) + (4 + 200));
        assert_eq!(batches[1].len(), 4 + 63000);
    }

    #[test]
    fn round_trip_batch_through_stream() {
        let a = vec![5u8; 10];
        let b = vec![6u8; 20];
        let msgs: Vec<&[u8]> = vec![&a, &b];
        let batches = build_batches(&msgs, 65536);

        let mut wire = Vec::new();
        write_batches(&mut wire, &batches).unwrap();

        let mut cursor = Cursor::new(wire);
        let first = match read_frame(&mut cursor, 16384, |n| vec![0u8; n]).unwrap() {
            ReadOutcome::Ok(buf) => buf,
            ReadOutcome::Closed => panic!("unexpected close"),
        };
        let second = match read_frame(&mut cursor, 16384, |n| vec![0u8; n]).unwrap() {
            ReadOutcome::Ok(buf) => buf,
            ReadOutcome::Closed => panic!("unexpected close"),
        };
        assert_eq!(first, a);
        assert_eq!(second, b);
    }

    #[test]
    fn zero_length_frame_is_protocol_error() {
        let mut cursor = Cursor::new(vec![0, 0, 0, 0]);
        let err = read_frame(&mut cursor, 16384, |n| vec![0u8; n]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn oversize_frame_is_protocol_error() {
        let mut len_buf = [0u8; 4];
        crate::bytes_ext::write_u32_be(&mut len_buf, 16385);
        let mut cursor = Cursor::new(len_buf.to_vec());
        let err = read_frame(&mut cursor, 16384, |n| vec![0u8; n]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn partial_body_then_close_is_closed_not_error() {
        let mut len_buf = [0u8; 4];
        crate::bytes_ext::write_u32_be(&mut len_buf, 10);
        let mut wire = len_buf.to_vec();
        wire.extend_from_slice(&[1, 2, 3]); // only 3 of 10 body bytes
        let mut cursor = Cursor::new(wire);
        match read_frame(&mut cursor, 16384, |n| vec![0u8; n]) {
            Err(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            Ok(_) => panic!("expected truncation to surface"),
        }
    }

    #[test]
    fn clean_close_before_any_bytes_is_closed() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        match read_frame(&mut cursor, 16384, |n| vec![0u8; n]).unwrap() {
            ReadOutcome::Closed => {}
            ReadOutcome::Ok(_) => panic!("expected Closed"),
        }
    }
}
