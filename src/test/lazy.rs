use super::sample_tree;
use super::wire::Wire;
use crate::binary::{to_bytes, Compression};
use crate::error::Error;
use crate::lazy::LazyDocument;
use crate::{TagType, Value};

fn sample_bytes() -> Vec<u8> {
    to_bytes(&sample_tree(), Compression::None).unwrap()
}

#[test]
fn every_field_matches_the_eager_decode() {
    let tree = sample_tree();
    let bytes = sample_bytes();
    let doc = LazyDocument::new(&bytes).unwrap();

    assert_eq!(doc.root_name(), "save");
    let lazy_root = doc.root();
    let eager_root = tree.root();

    assert_eq!(lazy_root.len(), eager_root.len());
    for child in eager_root.children() {
        let name = child.name().unwrap();
        assert_eq!(
            lazy_root.value(name).unwrap(),
            child.to_value(),
            "field {:?} resolved differently",
            name
        );
    }
}

#[test]
fn scalars_resolve_on_demand() {
    let bytes = sample_bytes();
    let doc = LazyDocument::new(&bytes).unwrap();
    let root = doc.root();

    assert_eq!(root.byte("flag").unwrap(), 1);
    assert_eq!(root.short("depth").unwrap(), -300);
    assert_eq!(root.int("version").unwrap(), 3);
    assert_eq!(root.long("seed").unwrap(), 77_000_000_001);
    assert_eq!(root.float("scale").unwrap(), 1.5);
    assert_eq!(root.double("spawn_x").unwrap(), -12.25);
    assert_eq!(root.string("map").unwrap(), "ridges");
}

#[test]
fn arrays_resolve_on_demand() {
    let bytes = sample_bytes();
    let doc = LazyDocument::new(&bytes).unwrap();
    let root = doc.root();

    assert_eq!(root.byte_array("mask").unwrap(), vec![1, -2, 3]);
    assert_eq!(root.int_array("counts").unwrap(), vec![7, -8]);
    assert_eq!(root.long_array("stamps").unwrap(), vec![1, -(1 << 40)]);
    assert_eq!(root.short_array("heights").unwrap(), vec![312, -4]);
    assert_eq!(root.float_array("speeds").unwrap(), vec![0.5, -1.5]);
}

#[test]
fn fixed_width_list_elements_have_offsets_too() {
    let bytes = sample_bytes();
    let doc = LazyDocument::new(&bytes).unwrap();

    let spawn = doc.root().list("spawn").unwrap();
    assert_eq!(spawn.len(), 2);
    assert_eq!(spawn.element_type(), TagType::Double);
    assert_eq!(spawn.value_at(0).unwrap(), Value::Double(14.5));
    assert_eq!(spawn.value_at(1).unwrap(), Value::Double(-3.25));
}

#[test]
fn string_and_collection_list_elements_resolve() {
    let bytes = sample_bytes();
    let doc = LazyDocument::new(&bytes).unwrap();
    let root = doc.root();

    let names = root.list("names").unwrap();
    assert_eq!(names.value_at(1).unwrap(), Value::String("two".to_owned()));

    let items = root.list("items").unwrap();
    assert_eq!(items.element_type(), TagType::Compound);
    assert_eq!(items.compound_at(0).unwrap().int("id").unwrap(), 1);
    assert_eq!(items.compound_at(1).unwrap().string("tag").unwrap(), "b");

    let grid = root.list("grid").unwrap();
    assert_eq!(grid.list_at(0).unwrap().value_at(1).unwrap(), Value::Int(2));
    assert_eq!(grid.list_at(1).unwrap().len(), 1);

    let empty = root.list("empty").unwrap();
    assert_eq!(empty.len(), 0);
    assert_eq!(empty.element_type(), TagType::End);
}

#[test]
fn nested_compounds_navigate_without_decoding() {
    let bytes = sample_bytes();
    let doc = LazyDocument::new(&bytes).unwrap();

    let player = doc.root().compound("player").unwrap();
    assert_eq!(player.double("health").unwrap(), 19.5);
    assert_eq!(player.compound("pos").unwrap().int("x").unwrap(), 4);
    assert!(doc.root().compound("extras").unwrap().is_empty());
}

#[test]
fn names_and_membership() {
    let bytes = sample_bytes();
    let doc = LazyDocument::new(&bytes).unwrap();
    let root = doc.root();

    assert!(root.has("version"));
    assert!(!root.has("missing"));
    assert_eq!(root.tag_type("names").unwrap(), TagType::List);
    let names: Vec<&str> = root.names().collect();
    assert_eq!(names[0], "flag");
    assert!(names.contains(&"player"));
}

#[test]
fn missing_and_wrong_typed_fields() {
    let bytes = sample_bytes();
    let doc = LazyDocument::new(&bytes).unwrap();
    let root = doc.root();

    assert!(matches!(root.int("missing"), Err(Error::MissingField(_))));
    assert!(matches!(root.int("map"), Err(Error::MissingField(_))));
    assert!(matches!(root.list("version"), Err(Error::MissingField(_))));

    let spawn = doc.root().list("spawn").unwrap();
    assert!(matches!(spawn.value_at(5), Err(Error::MissingField(_))));
    assert!(matches!(spawn.compound_at(0), Err(Error::Format(_))));
}

#[test]
fn truncated_document_fails_at_indexing() {
    let bytes = sample_bytes();
    assert!(matches!(
        LazyDocument::new(&bytes[..bytes.len() - 1]),
        Err(Error::Format(_))
    ));
    assert!(matches!(
        LazyDocument::new(&bytes[..bytes.len() / 2]),
        Err(Error::Format(_))
    ));
}

#[test]
fn unknown_type_byte_fails_at_indexing() {
    let bytes = Wire::new()
        .start_compound("root")
        .raw_tag(99)
        .name("x")
        .build();
    assert!(matches!(LazyDocument::new(&bytes), Err(Error::Format(_))));
}

#[test]
fn root_must_be_a_compound() {
    let bytes = Wire::new().tag(TagType::Int).name("x").int_payload(5).build();
    assert!(matches!(LazyDocument::new(&bytes), Err(Error::Format(_))));
}
