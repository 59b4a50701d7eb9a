use std::io::Cursor;

use super::sample_tree;
use super::wire::Wire;
use crate::binary::{from_bytes, from_reader, to_bytes, to_writer};
use crate::error::Error;
use crate::{Compression, TagType};

fn assert_round_trip(compression: Compression) {
    let tree = sample_tree();
    let bytes = to_bytes(&tree, compression).unwrap();
    let back = from_bytes(&bytes, compression).unwrap();
    assert_eq!(back, tree);
}

#[test]
fn round_trip_uncompressed() {
    assert_round_trip(Compression::None);
}

#[test]
fn round_trip_fast() {
    assert_round_trip(Compression::Fast);
}

#[test]
fn round_trip_small() {
    assert_round_trip(Compression::Small);
}

#[test]
fn round_trip_through_writer_and_reader() {
    let tree = sample_tree();
    let mut buf = Vec::new();
    to_writer(&mut buf, &tree, Compression::Small).unwrap();
    let back = from_reader(Cursor::new(buf), Compression::Small).unwrap();
    assert_eq!(back, tree);
}

#[test]
fn framing_magic_bytes() {
    let tree = sample_tree();
    let fast = to_bytes(&tree, Compression::Fast).unwrap();
    assert_eq!(&fast[..4], &[0x04, 0x22, 0x4d, 0x18], "lz4 frame magic");
    let small = to_bytes(&tree, Compression::Small).unwrap();
    assert_eq!(&small[..2], &[0x1f, 0x8b], "gzip magic");
}

#[test]
fn wire_layout_is_stable() {
    let tree = crate::Builder::new("root")
        .int("a", 5)
        .string("b", "hi")
        .finish()
        .unwrap();
    let expected = Wire::new()
        .start_compound("root")
        .int("a", 5)
        .string("b", "hi")
        .end_compound()
        .build();
    assert_eq!(to_bytes(&tree, Compression::None).unwrap(), expected);
}

#[test]
fn gzip_document_requested_as_fast_falls_back() {
    let tree = sample_tree();
    let gzipped = to_bytes(&tree, Compression::Small).unwrap();
    let back = from_bytes(&gzipped, Compression::Fast).unwrap();
    assert_eq!(back, tree);
}

#[test]
fn corrupt_document_requested_as_fast_fails_after_retry() {
    let result = from_bytes(&[0xde, 0xad, 0xbe, 0xef], Compression::Fast);
    assert!(matches!(result, Err(Error::Format(_))));
}

#[test]
fn truncated_document_is_a_format_error() {
    let tree = sample_tree();
    let mut bytes = to_bytes(&tree, Compression::None).unwrap();
    bytes.pop();
    assert!(matches!(
        from_bytes(&bytes, Compression::None),
        Err(Error::Format(_))
    ));
}

#[test]
fn truncated_mid_payload_is_a_format_error() {
    let tree = sample_tree();
    let bytes = to_bytes(&tree, Compression::None).unwrap();
    assert!(matches!(
        from_bytes(&bytes[..bytes.len() / 2], Compression::None),
        Err(Error::Format(_))
    ));
}

#[test]
fn unknown_type_byte_is_a_format_error() {
    let bytes = Wire::new()
        .start_compound("root")
        .raw_tag(77)
        .name("x")
        .build();
    assert!(matches!(
        from_bytes(&bytes, Compression::None),
        Err(Error::Format(_))
    ));
}

#[test]
fn root_must_be_a_compound() {
    let bytes = Wire::new().tag(TagType::Int).name("x").int_payload(5).build();
    assert!(matches!(
        from_bytes(&bytes, Compression::None),
        Err(Error::Format(_))
    ));
}

#[test]
fn nonempty_list_of_end_is_a_format_error() {
    let bytes = Wire::new()
        .start_compound("root")
        .start_list("xs", TagType::End, 3)
        .end_compound()
        .build();
    assert!(matches!(
        from_bytes(&bytes, Compression::None),
        Err(Error::Format(_))
    ));
}

#[test]
fn overdeep_nesting_is_a_format_error() {
    let mut w = Wire::new();
    for _ in 0..600 {
        w = w.start_compound("c");
    }
    assert!(matches!(
        from_bytes(&w.build(), Compression::None),
        Err(Error::Format(_))
    ));
}

#[test]
fn empty_root_name_round_trips() {
    let tree = crate::Builder::new("").int("a", 1).finish().unwrap();
    let bytes = to_bytes(&tree, Compression::None).unwrap();
    let back = from_bytes(&bytes, Compression::None).unwrap();
    assert_eq!(back.root().name(), Some(""));
    assert_eq!(back, tree);
}

#[test]
fn empty_list_keeps_its_element_type() {
    let tree = crate::Builder::new("root")
        .list("xs", TagType::Long)
        .end()
        .finish()
        .unwrap();
    let bytes = to_bytes(&tree, Compression::None).unwrap();
    let back = from_bytes(&bytes, Compression::None).unwrap();
    assert_eq!(
        back.root().list("xs").unwrap().element_type(),
        Some(TagType::Long)
    );
}
