use fleece::{decode, DecodeError, Unsupported, Value};
use proptest::prelude::*;

fn short_int_bytes(n: i64) -> [u8; 2] {
    let raw = (n as u16) & 0x0fff;
    raw.to_be_bytes()
}

/// Extended int at offset 0 (padded) followed by a narrow root pointer.
fn extended_int(unsigned: bool, payload: &[u8]) -> Vec<u8> {
    let unsigned_bit = if unsigned { 0x08 } else { 0x00 };
    let mut buf = vec![0x10 | unsigned_bit | (payload.len() as u8 - 1)];
    buf.extend_from_slice(payload);
    if buf.len() % 2 == 1 {
        buf.push(0x00);
    }
    let magnitude = (buf.len() / 2) as u16;
    buf.extend_from_slice(&(0x8000 | magnitude).to_be_bytes());
    buf
}

proptest! {
    #[test]
    fn short_ints_round_trip(n in -2048i64..=2047) {
        prop_assert_eq!(decode(&short_int_bytes(n), None), Ok(Value::Int(n)));
    }

    #[test]
    fn unsigned_extended_ints_all_widths(size in 1usize..=8, raw in any::<u64>()) {
        let value = if size == 8 { raw >> 1 } else { raw & ((1u64 << (8 * size)) - 1) };
        let bytes = value.to_le_bytes();
        prop_assert_eq!(
            decode(&extended_int(true, &bytes[..size]), None),
            Ok(Value::Int(value as i64))
        );
    }

    #[test]
    fn signed_extended_ints_all_widths(size in 1usize..=8, raw in any::<u64>()) {
        // Keep the sign bit of the most significant payload byte clear.
        let value = raw & ((1u64 << (8 * size - 1)) - 1);
        let bytes = value.to_le_bytes();
        prop_assert_eq!(
            decode(&extended_int(false, &bytes[..size]), None),
            Ok(Value::Int(value as i64))
        );
    }

    #[test]
    fn signed_extended_ints_with_sign_bit_are_rejected(size in 1usize..=8, raw in any::<u64>()) {
        let mut payload = raw.to_le_bytes()[..size].to_vec();
        payload[size - 1] |= 0x80;
        prop_assert_eq!(
            decode(&extended_int(false, &payload), None),
            Err(DecodeError::UnsupportedEncoding { offset: 0, kind: Unsupported::NegativeInt })
        );
    }

    #[test]
    fn arbitrary_input_never_panics(buf in proptest::collection::vec(any::<u8>(), 0..64)) {
        let snapshot = buf.clone();
        let first = decode(&buf, None);
        let second = decode(&buf, None);
        // Debug output compares NaN payloads as equal.
        prop_assert_eq!(format!("{first:?}"), format!("{second:?}"));
        prop_assert_eq!(buf, snapshot);
    }
}
