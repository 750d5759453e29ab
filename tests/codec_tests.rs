//! Codec Tests
//!
//! Round-trip and failure-mode tests for the wire protocol.

use nimbuskv::protocol::{decode, encode, Value};
use nimbuskv::NimbusError;

// =============================================================================
// Round-trip Tests
// =============================================================================

#[test]
fn test_roundtrip_simple_string() {
    let value = Value::Simple("OK".to_string());
    let encoded = encode(&value);
    assert_eq!(encoded, b"+OK\r\n");

    let (decoded, consumed) = decode(&encoded).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(consumed, encoded.len());
}

#[test]
fn test_roundtrip_error() {
    let value = Value::error("ERR something went wrong");
    let (decoded, consumed) = decode(&encode(&value)).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(consumed, encode(&value).len());
}

#[test]
fn test_roundtrip_bulk() {
    let value = Value::bulk("hello world");
    let encoded = encode(&value);
    assert_eq!(encoded, b"$11\r\nhello world\r\n");

    let (decoded, _) = decode(&encoded).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_roundtrip_empty_bulk() {
    let value = Value::bulk("");
    let (decoded, _) = decode(&encode(&value)).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_roundtrip_null() {
    let encoded = encode(&Value::Null);
    assert_eq!(encoded, b"$-1\r\n");

    let (decoded, consumed) = decode(&encoded).unwrap();
    assert_eq!(decoded, Value::Null);
    assert_eq!(consumed, 5);
}

#[test]
fn test_roundtrip_array_of_bulks() {
    let value = Value::Array(vec![
        Value::bulk("SET"),
        Value::bulk("key"),
        Value::bulk("val"),
    ]);
    let encoded = encode(&value);
    assert_eq!(&encoded[..4], b"*3\r\n");

    let (decoded, consumed) = decode(&encoded).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(consumed, encoded.len());
}

#[test]
fn test_roundtrip_nested_array() {
    let value = Value::Array(vec![
        Value::Array(vec![Value::bulk("a"), Value::Null]),
        Value::bulk("b"),
    ]);
    let (decoded, _) = decode(&encode(&value)).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_integer_encodes_as_bulk_digits() {
    // Integers reuse bulk framing in this protocol variant
    let encoded = encode(&Value::Integer(42));
    assert_eq!(encoded, b"$2\r\n42\r\n");

    let (decoded, _) = decode(&encoded).unwrap();
    assert_eq!(decoded, Value::bulk("42"));
}

#[test]
fn test_decode_integer_tag() {
    let (decoded, consumed) = decode(b":123\r\n").unwrap();
    assert_eq!(decoded, Value::Integer(123));
    assert_eq!(consumed, 6);

    let (decoded, _) = decode(b":-7\r\n").unwrap();
    assert_eq!(decoded, Value::Integer(-7));
}

#[test]
fn test_decode_reports_bytes_consumed_with_trailing_data() {
    let mut input = encode(&Value::bulk("abc"));
    input.extend_from_slice(b"+OK\r\n");

    let (decoded, consumed) = decode(&input).unwrap();
    assert_eq!(decoded, Value::bulk("abc"));
    assert_eq!(consumed, input.len() - 5);

    let (next, _) = decode(&input[consumed..]).unwrap();
    assert_eq!(next, Value::Simple("OK".to_string()));
}

// =============================================================================
// Failure Modes
// =============================================================================

#[test]
fn test_truncated_prefixes_fail_instead_of_misdecoding() {
    let value = Value::Array(vec![Value::bulk("ZADD"), Value::bulk("1"), Value::bulk("a")]);
    let encoded = encode(&value);

    for cut in 1..encoded.len() {
        match decode(&encoded[..cut]) {
            Err(NimbusError::Protocol(_)) => {}
            other => panic!("prefix of {} bytes should fail, got {:?}", cut, other),
        }
    }
}

#[test]
fn test_unknown_tag_is_a_protocol_error() {
    assert!(matches!(
        decode(b"?3\r\nabc\r\n"),
        Err(NimbusError::Protocol(_))
    ));
}

#[test]
fn test_non_numeric_length_header_is_a_protocol_error() {
    assert!(matches!(decode(b"$abc\r\nxyz\r\n"), Err(NimbusError::Protocol(_))));
    assert!(matches!(decode(b"*x\r\n"), Err(NimbusError::Protocol(_))));
}

#[test]
fn test_negative_lengths_other_than_null_marker_fail() {
    assert!(matches!(decode(b"$-2\r\n"), Err(NimbusError::Protocol(_))));
    assert!(matches!(decode(b"*-2\r\n"), Err(NimbusError::Protocol(_))));
}

#[test]
fn test_bulk_without_crlf_terminator_fails() {
    assert!(matches!(decode(b"$3\r\nabcXY"), Err(NimbusError::Protocol(_))));
}

#[test]
fn test_empty_input_fails() {
    assert!(decode(b"").is_err());
}
