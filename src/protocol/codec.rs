//! Protocol codec
//!
//! Recursive-descent decoding and per-variant encoding of wire frames.
//!
//! Decoding is total over well-formed input and fails with a
//! [`NimbusError::Protocol`] on truncated input, non-numeric length headers,
//! or unknown type tags. It never panics and never partially mutates caller
//! state. Encoding never fails for a well-formed [`Value`].

use std::io::{BufRead, Cursor, ErrorKind, Read, Write};

use crate::error::{NimbusError, Result};
use super::Value;

/// Frame type tags
const SIMPLE: u8 = b'+';
const ERROR: u8 = b'-';
const INTEGER: u8 = b':';
const BULK: u8 = b'$';
const ARRAY: u8 = b'*';

// =============================================================================
// Decoding
// =============================================================================

/// Decode one frame from a byte slice.
///
/// Returns the decoded value and the number of bytes consumed. A truncated
/// prefix of a valid encoding fails with a protocol error rather than
/// decoding to wrong data.
pub fn decode(input: &[u8]) -> Result<(Value, usize)> {
    let mut cursor = Cursor::new(input);
    let value = read_value(&mut cursor).map_err(|e| match e {
        NimbusError::Io(ref io) if io.kind() == ErrorKind::UnexpectedEof => {
            NimbusError::Protocol("truncated frame".to_string())
        }
        other => other,
    })?;
    Ok((value, cursor.position() as usize))
}

/// Read one complete frame from a buffered stream.
///
/// End-of-stream before the first byte surfaces as an
/// [`std::io::ErrorKind::UnexpectedEof`] I/O error so connection loops can
/// distinguish a clean disconnect from a malformed frame.
pub fn read_value<R: BufRead>(reader: &mut R) -> Result<Value> {
    let tag = read_byte(reader)?;
    match tag {
        SIMPLE => Ok(Value::Simple(read_line(reader)?)),
        ERROR => Ok(Value::Error(read_line(reader)?)),
        INTEGER => Ok(Value::Integer(read_header_number(reader)?)),
        BULK => read_bulk(reader),
        ARRAY => read_array(reader),
        other => Err(NimbusError::Protocol(format!(
            "unknown frame tag 0x{:02x}",
            other
        ))),
    }
}

/// Decode a bulk body after its `$` tag
fn read_bulk<R: BufRead>(reader: &mut R) -> Result<Value> {
    let len = read_header_number(reader)?;
    if len == -1 {
        return Ok(Value::Null);
    }
    if len < 0 {
        return Err(NimbusError::Protocol(format!(
            "invalid bulk length: {}",
            len
        )));
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).map_err(map_truncation)?;

    // Trailing CRLF after the payload
    let mut crlf = [0u8; 2];
    reader.read_exact(&mut crlf).map_err(map_truncation)?;
    if crlf != *b"\r\n" {
        return Err(NimbusError::Protocol(
            "bulk payload not terminated by CRLF".to_string(),
        ));
    }

    let payload = String::from_utf8(payload)
        .map_err(|_| NimbusError::Protocol("bulk payload is not valid UTF-8".to_string()))?;
    Ok(Value::Bulk(payload))
}

/// Decode an array body after its `*` tag
fn read_array<R: BufRead>(reader: &mut R) -> Result<Value> {
    let count = read_header_number(reader)?;
    if count == -1 {
        return Ok(Value::Null);
    }
    if count < 0 {
        return Err(NimbusError::Protocol(format!(
            "invalid array count: {}",
            count
        )));
    }

    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        items.push(read_value(reader).map_err(|e| match e {
            NimbusError::Io(ref io) if io.kind() == ErrorKind::UnexpectedEof => {
                NimbusError::Protocol("truncated frame inside array".to_string())
            }
            other => other,
        })?);
    }
    Ok(Value::Array(items))
}

/// Read a single byte
fn read_byte<R: BufRead>(reader: &mut R) -> Result<u8> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    Ok(byte[0])
}

/// Read a CRLF-terminated line, returning it without the terminator
fn read_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = Vec::new();
    let n = reader.read_until(b'\n', &mut line)?;
    if n == 0 || !line.ends_with(b"\r\n") {
        return Err(NimbusError::Io(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            "line not terminated by CRLF",
        )));
    }
    line.truncate(line.len() - 2);
    String::from_utf8(line)
        .map_err(|_| NimbusError::Protocol("header line is not valid UTF-8".to_string()))
}

/// Parse the numeric header line after a `:`/`$`/`*` tag
fn read_header_number<R: BufRead>(reader: &mut R) -> Result<i64> {
    let line = read_line(reader)?;
    line.parse::<i64>()
        .map_err(|_| NimbusError::Protocol(format!("non-numeric header: {:?}", line)))
}

/// Mid-frame truncation is a protocol defect, not a clean disconnect
fn map_truncation(err: std::io::Error) -> NimbusError {
    if err.kind() == ErrorKind::UnexpectedEof {
        NimbusError::Protocol("truncated frame".to_string())
    } else {
        NimbusError::Io(err)
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a value to its wire representation
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(value, &mut out);
    out
}

fn encode_into(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Simple(text) => {
            out.push(SIMPLE);
            out.extend_from_slice(text.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        Value::Error(message) => {
            out.push(ERROR);
            out.extend_from_slice(message.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        // Integers reuse bulk framing in this protocol variant
        Value::Integer(n) => encode_bulk(&n.to_string(), out),
        Value::Bulk(payload) => encode_bulk(payload, out),
        Value::Null => out.extend_from_slice(b"$-1\r\n"),
        Value::Array(items) => {
            out.push(ARRAY);
            out.extend_from_slice(items.len().to_string().as_bytes());
            out.extend_from_slice(b"\r\n");
            for item in items {
                encode_into(item, out);
            }
        }
    }
}

fn encode_bulk(payload: &str, out: &mut Vec<u8>) {
    out.push(BULK);
    out.extend_from_slice(payload.len().to_string().as_bytes());
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(payload.as_bytes());
    out.extend_from_slice(b"\r\n");
}

/// Write one encoded frame to a stream and flush it
pub fn write_value<W: Write>(writer: &mut W, value: &Value) -> Result<()> {
    writer.write_all(&encode(value))?;
    writer.flush()?;
    Ok(())
}
