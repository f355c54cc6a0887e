use std::sync::Arc;
use std::thread;

use fleece::{decode_record, DecodeError, KeyError, SharedKeys, Value};

/// `["id", "tags"]` as a store would persist it.
const HEADER: [u8; 18] = [
    0x42, b'i', b'd', 0x00, // 0: "id"
    0x44, b't', b'a', b'g', b's', 0x00, // 4: "tags"
    0x60, 0x02, 0x80, 0x06, 0x80, 0x05, // 10: [-> 0, -> 4]
    0x80, 0x03, // 16: root pointer to 10
];

/// `{id: 42, tags: [1, "abc"]}` with both keys shared.
const RECORD: [u8; 22] = [
    0x43, b'a', b'b', b'c', // 0: "abc"
    0x60, 0x02, 0x00, 0x01, 0x80, 0x04, // 4: [1, -> 0]
    0x70, 0x02, 0x00, 0x00, 0x00, 0x2a, 0x00, 0x01, 0x80, 0x07, // 10: dict
    0x80, 0x05, // 20: root pointer to 10
];

#[test]
fn header_decodes_to_table() {
    let keys = SharedKeys::from_header(&HEADER).unwrap();
    assert_eq!(keys.len(), 2);
    assert!(!keys.is_empty());
    assert_eq!(keys.get(0), Some("id"));
    assert_eq!(keys.get(1), Some("tags"));
    assert_eq!(keys.get(2), None);
    assert_eq!(keys.iter().collect::<Vec<_>>(), vec!["id", "tags"]);
    assert_eq!(keys, SharedKeys::new(vec!["id".into(), "tags".into()]));
}

#[test]
fn record_decodes_against_header_table() {
    let keys = SharedKeys::from_header(&HEADER).unwrap();
    let doc = decode_record(&RECORD, &keys).unwrap();
    assert_eq!(doc.get("id"), Some(&Value::Int(42)));
    assert_eq!(
        doc.get("tags"),
        Some(&Value::Array(vec![Value::Int(1), Value::Str("abc".into())]))
    );
}

#[test]
fn record_against_smaller_table_fails() {
    let keys: SharedKeys = vec!["id".to_owned()].into_iter().collect();
    assert_eq!(
        decode_record(&RECORD, &keys),
        Err(DecodeError::KeyResolution {
            offset: 16,
            reason: KeyError::IndexOutOfRange { index: 1, len: 1 }
        })
    );
}

#[test]
fn empty_table_header() {
    let keys = SharedKeys::from_header(&[0x60, 0x00]).unwrap();
    assert!(keys.is_empty());
    assert_eq!(keys, SharedKeys::default());
}

#[test]
fn malformed_headers() {
    // Root is an int.
    assert_eq!(
        SharedKeys::from_header(&[0x00, 0x01]),
        Err(DecodeError::KeyResolution {
            offset: 0,
            reason: KeyError::MalformedTable("root is not an array")
        })
    );
    // Array holding an int.
    assert_eq!(
        SharedKeys::from_header(&[0x60, 0x01, 0x00, 0x01, 0x80, 0x02]),
        Err(DecodeError::KeyResolution {
            offset: 4,
            reason: KeyError::MalformedTable("entry is not a string")
        })
    );
    // Truncated buffers surface the decoder's own error.
    assert!(matches!(
        SharedKeys::from_header(&[0x60]),
        Err(DecodeError::OutOfBounds { .. })
    ));
}

#[test]
fn table_is_shared_across_threads() {
    let keys = Arc::new(SharedKeys::from_header(&HEADER).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let keys = Arc::clone(&keys);
            thread::spawn(move || decode_record(&RECORD, &keys))
        })
        .collect();
    let expected = decode_record(&RECORD, &keys).unwrap();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(expected.clone()));
    }
}
