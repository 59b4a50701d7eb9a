use crate::error::Error;
use crate::{Builder, TagType, Tree, Value};

#[test]
fn typed_accessor_raises_or_defaults() {
    let tree = Builder::new("root").int("width", 800).finish().unwrap();
    let root = tree.root();

    assert_eq!(root.int("width").unwrap(), 800);
    assert!(matches!(root.int("missing"), Err(Error::MissingField(_))));
    assert_eq!(root.int_or("missing", 7), 7);
    assert_eq!(root.int_or("width", 7), 800);
}

#[test]
fn wrong_typed_member_counts_as_missing() {
    let tree = Builder::new("root")
        .string("label", "hello")
        .finish()
        .unwrap();
    let root = tree.root();

    assert!(matches!(root.int("label"), Err(Error::MissingField(_))));
    assert_eq!(root.int_or("label", 3), 3);
    assert_eq!(root.string("label").unwrap(), "hello");
}

#[test]
fn every_accessor_kind() {
    let tree = Builder::new("root")
        .byte("b", -1)
        .short("s", 300)
        .long("l", 1 << 40)
        .float("f", 0.5)
        .double("d", -2.25)
        .byte_array("ba", &[1, -2])
        .int_array("ia", &[10, 20])
        .long_array("la", &[-1, 1])
        .short_array("sa", &[7])
        .float_array("fa", &[1.5])
        .finish()
        .unwrap();
    let root = tree.root();

    assert_eq!(root.byte("b").unwrap(), -1);
    assert_eq!(root.short("s").unwrap(), 300);
    assert_eq!(root.long("l").unwrap(), 1 << 40);
    assert_eq!(root.float("f").unwrap(), 0.5);
    assert_eq!(root.double("d").unwrap(), -2.25);
    assert_eq!(root.byte_array("ba").unwrap(), &[1, -2]);
    assert_eq!(root.int_array("ia").unwrap(), &[10, 20]);
    assert_eq!(root.long_array("la").unwrap(), &[-1, 1]);
    assert_eq!(root.short_array("sa").unwrap(), &[7]);
    assert_eq!(root.float_array("fa").unwrap(), &[1.5]);
    assert_eq!(root.byte_array_or("nope", &[9]), &[9]);
}

#[test]
fn list_rejects_mismatched_element() {
    let mut tree = Tree::new("root");
    let root = tree.root_id();
    let list = tree.put(root, "xs", Value::list(TagType::Int)).unwrap();

    let err = tree.push(list, Value::Byte(1)).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    // tree unchanged
    assert_eq!(tree.get(list).unwrap().len(), 0);

    tree.push(list, Value::Int(5)).unwrap();
    assert_eq!(tree.get(list).unwrap().len(), 1);
}

#[test]
fn nested_list_values_are_checked_too() {
    let mut tree = Tree::new("root");
    let root = tree.root_id();
    let bad = Value::List(TagType::Int, vec![Value::Int(1), Value::Byte(2)]);

    let err = tree.put(root, "xs", bad).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(!tree.root().has("xs"));
}

#[test]
fn push_into_compound_is_a_validation_error() {
    let mut tree = Tree::new("root");
    let root = tree.root_id();

    let err = tree.push(root, Value::Int(1)).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(tree.root().is_empty());
}

#[test]
fn put_sets_parent_and_last_write_wins() {
    let mut tree = Tree::new("root");
    let root = tree.root_id();
    tree.put(root, "x", Value::Int(1)).unwrap();
    let second = tree.put(root, "x", Value::Int(2)).unwrap();

    let root_ref = tree.root();
    assert_eq!(root_ref.len(), 1);
    assert_eq!(root_ref.int("x").unwrap(), 2);
    let x = tree.get(second).unwrap();
    assert_eq!(x.parent().unwrap().id(), root);
    assert_eq!(x.name(), Some("x"));
}

#[test]
fn remove_by_identity() {
    let mut tree = Tree::new("root");
    let root = tree.root_id();
    let a = tree.put(root, "a", Value::Int(1)).unwrap();
    tree.put(root, "b", Value::Int(2)).unwrap();

    assert!(tree.remove(a));
    assert!(!tree.root().has("a"));
    assert!(tree.root().has("b"));
    assert!(!tree.remove(a));
    assert!(!tree.remove(root));
}

#[test]
fn removing_a_list_element_shifts_the_rest() {
    let mut tree = Tree::new("root");
    let root = tree.root_id();
    let list = tree.put(root, "xs", Value::list(TagType::Int)).unwrap();
    tree.push(list, Value::Int(10)).unwrap();
    let mid = tree.push(list, Value::Int(20)).unwrap();
    tree.push(list, Value::Int(30)).unwrap();

    assert!(tree.remove(mid));
    let list_ref = tree.get(list).unwrap();
    assert_eq!(list_ref.len(), 2);
    assert_eq!(list_ref.at(0).unwrap().to_value(), Value::Int(10));
    assert_eq!(list_ref.at(1).unwrap().to_value(), Value::Int(30));
}

#[test]
fn recycled_slots_never_show_stale_state() {
    let mut tree = Tree::new("root");
    let root = tree.root_id();
    let old = tree.put(root, "gone", Value::String("stale".into())).unwrap();
    assert!(tree.remove(old));

    let new = tree.put(root, "fresh", Value::Int(1)).unwrap();
    let fresh = tree.get(new).unwrap();
    assert_eq!(fresh.name(), Some("fresh"));
    assert_eq!(fresh.to_value(), Value::Int(1));
    assert!(!tree.root().has("gone"));
}

#[test]
fn structural_equality_ignores_identity() {
    let build = || {
        Builder::new("root")
            .int("a", 1)
            .list("xs", TagType::String)
            .elem_string("one")
            .end()
            .compound("sub")
            .byte("flag", 1)
            .end()
            .finish()
            .unwrap()
    };
    let a = build();
    let b = build();
    assert_eq!(a, b);

    let mut c = build();
    let root = c.root_id();
    c.put(root, "a", Value::Int(2)).unwrap();
    assert_ne!(a, c);
}

#[test]
fn equality_considers_names_and_root_name() {
    let a = Builder::new("root").int("a", 1).finish().unwrap();
    let b = Builder::new("other").int("a", 1).finish().unwrap();
    assert_ne!(a, b);
}

#[test]
fn to_value_extracts_deeply() {
    let tree = Builder::new("root")
        .list("xs", TagType::Int)
        .elem_int(4)
        .elem_int(5)
        .end()
        .finish()
        .unwrap();
    let xs = tree.root().list("xs").unwrap().to_value();
    assert_eq!(
        xs,
        Value::List(TagType::Int, vec![Value::Int(4), Value::Int(5)])
    );
}

#[test]
fn list_of_checks_element_type() {
    let tree = Builder::new("root")
        .list("xs", TagType::Int)
        .end()
        .finish()
        .unwrap();
    assert!(tree.root().list_of("xs", TagType::Int).is_ok());
    assert!(matches!(
        tree.root().list_of("xs", TagType::Byte),
        Err(Error::MissingField(_))
    ));
}

#[test]
fn check_name_validates() {
    let tree = Tree::new("level");
    assert!(tree.root().check_name("level").is_ok());
    assert!(matches!(
        tree.root().check_name("other"),
        Err(Error::Validation(_))
    ));
}

#[test]
fn deep_nesting_is_rejected() {
    let mut tree = Tree::new("root");
    let mut cursor = tree.root_id();
    let mut hit_limit = false;
    for _ in 0..600 {
        match tree.put(cursor, "c", Value::compound()) {
            Ok(id) => cursor = id,
            Err(e) => {
                assert!(matches!(e, Error::Validation(_)));
                hit_limit = true;
                break;
            }
        }
    }
    assert!(hit_limit);
}

#[test]
fn empty_list_may_hold_end_element_type() {
    let mut tree = Tree::new("root");
    let root = tree.root_id();
    let list = tree.put(root, "xs", Value::list(TagType::End)).unwrap();
    // nothing can ever be pushed onto it
    assert!(tree.push(list, Value::Int(1)).is_err());
    assert_eq!(tree.get(list).unwrap().element_type(), Some(TagType::End));
}
