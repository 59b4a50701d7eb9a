use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::{TagType, Value, MAX_DEPTH};

/// Identity of one tag within its [`Tree`].
///
/// Ids are indices into the tree's arena: unique among live tags, assigned
/// in construction order, and recycled only after the old tag has been
/// freed. An id from one tree means nothing to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagId(u32);

impl TagId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// In-tree payload. Collections hold child ids; ownership lives in the
/// arena, so the parent back-reference on each node is never an owner.
#[derive(Debug)]
pub(crate) enum Payload {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List { element: TagType, items: Vec<TagId> },
    Compound(IndexMap<String, TagId>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    ShortArray(Vec<i16>),
    FloatArray(Vec<f32>),
}

impl Payload {
    pub(crate) fn tag_type(&self) -> TagType {
        match self {
            Payload::Byte(_) => TagType::Byte,
            Payload::Short(_) => TagType::Short,
            Payload::Int(_) => TagType::Int,
            Payload::Long(_) => TagType::Long,
            Payload::Float(_) => TagType::Float,
            Payload::Double(_) => TagType::Double,
            Payload::ByteArray(_) => TagType::ByteArray,
            Payload::String(_) => TagType::String,
            Payload::List { .. } => TagType::List,
            Payload::Compound(_) => TagType::Compound,
            Payload::IntArray(_) => TagType::IntArray,
            Payload::LongArray(_) => TagType::LongArray,
            Payload::ShortArray(_) => TagType::ShortArray,
            Payload::FloatArray(_) => TagType::FloatArray,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) name: Option<String>,
    pub(crate) parent: Option<TagId>,
    pub(crate) payload: Payload,
}

/// A tag tree: one root compound plus an arena of nodes.
///
/// All mutation goes through the tree ([`put`][Tree::put],
/// [`push`][Tree::push], [`remove`][Tree::remove]); reading goes through
/// copyable [`TagRef`] views. Vacated arena slots are cleared and recycled,
/// so a `TagId` held across a [`remove`][Tree::remove] of its tag must not
/// be reused by the caller.
#[derive(Debug)]
pub struct Tree {
    slots: Vec<Option<Node>>,
    free: Vec<u32>,
    root: TagId,
}

impl Tree {
    /// A fresh tree whose root is an empty compound named `root_name`
    /// (the name may be empty).
    pub fn new(root_name: &str) -> Tree {
        let root = Node {
            name: Some(root_name.to_owned()),
            parent: None,
            payload: Payload::Compound(IndexMap::new()),
        };
        Tree {
            slots: vec![Some(root)],
            free: Vec::new(),
            root: TagId(0),
        }
    }

    /// The root compound.
    pub fn root(&self) -> TagRef<'_> {
        TagRef {
            tree: self,
            id: self.root,
        }
    }

    pub fn root_id(&self) -> TagId {
        self.root
    }

    /// The tag with this id, if it is still alive in this tree.
    pub fn get(&self, id: TagId) -> Option<TagRef<'_>> {
        match self.slots.get(id.index()) {
            Some(Some(_)) => Some(TagRef { tree: self, id }),
            _ => None,
        }
    }

    /// Add a named child to a compound. Collection values are inserted
    /// recursively; a previous child of the same name is replaced and
    /// freed (last write wins). The new child's parent reference is set
    /// here and nowhere else.
    pub fn put(&mut self, compound: TagId, name: &str, value: Value) -> Result<TagId> {
        match self.get(compound) {
            None => return Err(Error::dead_tag()),
            Some(r) if r.tag_type() != TagType::Compound => {
                return Err(Error::not_a(TagType::Compound, r.tag_type()))
            }
            Some(_) => {}
        }
        let height = checked_height(&value)?;
        if self.depth_of(compound) + height > MAX_DEPTH {
            return Err(Error::Validation(format!(
                "tree would nest deeper than {} levels",
                MAX_DEPTH
            )));
        }
        let id = self.build_subtree(Some(name.to_owned()), value, compound);
        let old = match &mut self.node_mut(compound).payload {
            Payload::Compound(map) => map.insert(name.to_owned(), id),
            _ => None,
        };
        if let Some(old) = old {
            self.free_subtree(old);
        }
        Ok(id)
    }

    /// Append an unnamed element to a list. The value's kind must match
    /// the list's fixed element kind; on mismatch the tree is unchanged.
    pub fn push(&mut self, list: TagId, value: Value) -> Result<TagId> {
        let element = match self.get(list) {
            None => return Err(Error::dead_tag()),
            Some(r) => match r.element_type() {
                Some(e) => e,
                None => return Err(Error::not_a(TagType::List, r.tag_type())),
            },
        };
        if value.tag_type() != element {
            return Err(Error::element_mismatch(element, value.tag_type()));
        }
        let height = checked_height(&value)?;
        if self.depth_of(list) + height > MAX_DEPTH {
            return Err(Error::Validation(format!(
                "tree would nest deeper than {} levels",
                MAX_DEPTH
            )));
        }
        let id = self.build_subtree(None, value, list);
        if let Payload::List { items, .. } = &mut self.node_mut(list).payload {
            items.push(id);
        }
        Ok(id)
    }

    /// Remove a tag by identity, detaching it from its parent and
    /// recursively freeing its subtree. Returns whether the tag was found;
    /// the root cannot be removed.
    pub fn remove(&mut self, id: TagId) -> bool {
        if id == self.root {
            return false;
        }
        let parent = match self.slots.get(id.index()).and_then(|s| s.as_ref()) {
            Some(n) => n.parent,
            None => return false,
        };
        let parent = match parent {
            Some(p) => p,
            None => return false,
        };
        let detached = match &mut self.node_mut(parent).payload {
            Payload::List { items, .. } => match items.iter().position(|&c| c == id) {
                Some(i) => {
                    items.remove(i);
                    true
                }
                None => false,
            },
            Payload::Compound(map) => {
                let key = map
                    .iter()
                    .find(|(_, &c)| c == id)
                    .map(|(k, _)| k.clone());
                match key {
                    Some(k) => {
                        map.shift_remove(&k);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        };
        if detached {
            self.free_subtree(id);
        }
        detached
    }

    /// Query the whole tree; see [`TagRef::query`].
    pub fn query(&self, q: &str) -> Result<Vec<TagRef<'_>>> {
        self.root().query(q)
    }

    /// Rebuild a tree from a decoded root: used by the codec read paths.
    pub(crate) fn from_named_root(name: String, value: Value) -> Result<Tree> {
        let map = match value {
            Value::Compound(m) => m,
            v => return Err(Error::tag_mismatch(TagType::Compound, v.tag_type())),
        };
        let mut tree = Tree::new(&name);
        let root = tree.root_id();
        for (k, v) in map {
            tree.put(root, &k, v)?;
        }
        Ok(tree)
    }

    pub(crate) fn node(&self, id: TagId) -> &Node {
        self.slots[id.index()].as_ref().expect("stale tag id")
    }

    fn node_mut(&mut self, id: TagId) -> &mut Node {
        self.slots[id.index()].as_mut().expect("stale tag id")
    }

    pub(crate) fn children_of(&self, id: TagId) -> Vec<TagId> {
        match &self.node(id).payload {
            Payload::List { items, .. } => items.clone(),
            Payload::Compound(map) => map.values().copied().collect(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn is_collection(&self, id: TagId) -> bool {
        matches!(
            self.node(id).payload,
            Payload::List { .. } | Payload::Compound(_)
        )
    }

    fn depth_of(&self, id: TagId) -> usize {
        let mut depth = 0;
        let mut cur = self.node(id).parent;
        while let Some(p) = cur {
            depth += 1;
            cur = self.node(p).parent;
        }
        depth
    }

    fn alloc(&mut self, node: Node) -> TagId {
        match self.free.pop() {
            Some(i) => {
                self.slots[i as usize] = Some(node);
                TagId(i)
            }
            None => {
                self.slots.push(Some(node));
                TagId((self.slots.len() - 1) as u32)
            }
        }
    }

    // Slots are cleared before going back on the free list, so a recycled
    // slot can never leak the previous tag's state.
    fn free_subtree(&mut self, id: TagId) {
        let node = match self.slots.get_mut(id.index()).and_then(|s| s.take()) {
            Some(n) => n,
            None => return,
        };
        self.free.push(id.0);
        match node.payload {
            Payload::List { items, .. } => {
                for c in items {
                    self.free_subtree(c);
                }
            }
            Payload::Compound(map) => {
                for (_, c) in map {
                    self.free_subtree(c);
                }
            }
            _ => {}
        }
    }

    fn build_subtree(&mut self, name: Option<String>, value: Value, parent: TagId) -> TagId {
        match value {
            Value::List(element, values) => {
                let id = self.alloc(Node {
                    name,
                    parent: Some(parent),
                    payload: Payload::List {
                        element,
                        items: Vec::with_capacity(values.len()),
                    },
                });
                for v in values {
                    let child = self.build_subtree(None, v, id);
                    if let Payload::List { items, .. } = &mut self.node_mut(id).payload {
                        items.push(child);
                    }
                }
                id
            }
            Value::Compound(map) => {
                let id = self.alloc(Node {
                    name,
                    parent: Some(parent),
                    payload: Payload::Compound(IndexMap::with_capacity(map.len())),
                });
                for (k, v) in map {
                    let child = self.build_subtree(Some(k.clone()), v, id);
                    if let Payload::Compound(m) = &mut self.node_mut(id).payload {
                        m.insert(k, child);
                    }
                }
                id
            }
            leaf => {
                let payload = match leaf {
                    Value::Byte(v) => Payload::Byte(v),
                    Value::Short(v) => Payload::Short(v),
                    Value::Int(v) => Payload::Int(v),
                    Value::Long(v) => Payload::Long(v),
                    Value::Float(v) => Payload::Float(v),
                    Value::Double(v) => Payload::Double(v),
                    Value::ByteArray(v) => Payload::ByteArray(v),
                    Value::String(v) => Payload::String(v),
                    Value::IntArray(v) => Payload::IntArray(v),
                    Value::LongArray(v) => Payload::LongArray(v),
                    Value::ShortArray(v) => Payload::ShortArray(v),
                    Value::FloatArray(v) => Payload::FloatArray(v),
                    Value::List(..) | Value::Compound(_) => unreachable!(),
                };
                self.alloc(Node {
                    name,
                    parent: Some(parent),
                    payload,
                })
            }
        }
    }
}

/// Validates list homogeneity throughout `value` and returns its height
/// in levels, without touching any tree.
fn checked_height(value: &Value) -> Result<usize> {
    match value {
        Value::List(element, items) => {
            if *element == TagType::End && !items.is_empty() {
                return Err(Error::list_of_end());
            }
            let mut h = 0;
            for item in items {
                if item.tag_type() != *element {
                    return Err(Error::element_mismatch(*element, item.tag_type()));
                }
                h = h.max(checked_height(item)?);
            }
            Ok(h + 1)
        }
        Value::Compound(map) => {
            let mut h = 0;
            for v in map.values() {
                h = h.max(checked_height(v)?);
            }
            Ok(h + 1)
        }
        _ => Ok(1),
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Tree) -> bool {
        tag_eq(self, self.root, other, other.root)
    }
}

impl std::fmt::Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&crate::text::render(self))
    }
}

fn tag_eq(at: &Tree, a: TagId, bt: &Tree, b: TagId) -> bool {
    let (na, nb) = (at.node(a), bt.node(b));
    na.name == nb.name && payload_eq(at, &na.payload, bt, &nb.payload)
}

fn payload_eq(at: &Tree, pa: &Payload, bt: &Tree, pb: &Payload) -> bool {
    use Payload::*;
    match (pa, pb) {
        (Byte(x), Byte(y)) => x == y,
        (Short(x), Short(y)) => x == y,
        (Int(x), Int(y)) => x == y,
        (Long(x), Long(y)) => x == y,
        (Float(x), Float(y)) => x == y,
        (Double(x), Double(y)) => x == y,
        (ByteArray(x), ByteArray(y)) => x == y,
        (String(x), String(y)) => x == y,
        (IntArray(x), IntArray(y)) => x == y,
        (LongArray(x), LongArray(y)) => x == y,
        (ShortArray(x), ShortArray(y)) => x == y,
        (FloatArray(x), FloatArray(y)) => x == y,
        (
            List {
                element: e1,
                items: i1,
            },
            List {
                element: e2,
                items: i2,
            },
        ) => {
            e1 == e2
                && i1.len() == i2.len()
                && i1.iter().zip(i2).all(|(&x, &y)| tag_eq(at, x, bt, y))
        }
        (Compound(m1), Compound(m2)) => {
            m1.len() == m2.len()
                && m1
                    .iter()
                    .all(|(k, &x)| m2.get(k).map_or(false, |&y| tag_eq(at, x, bt, y)))
        }
        _ => false,
    }
}

macro_rules! scalar_accessors {
    ($(($getter:ident, $or_getter:ident, $ty:ty, $variant:ident)),* $(,)?) => {
        $(
            #[doc = concat!("The `", stringify!($variant), "` member named `name`.")]
            ///
            /// Errors with [`Error::MissingField`] when the name is absent
            /// or holds a different kind.
            pub fn $getter(&self, name: &str) -> Result<$ty> {
                match self.member_payload(name)? {
                    Payload::$variant(v) => Ok(*v),
                    p => Err(Error::wrong_type(name, TagType::$variant, p.tag_type())),
                }
            }

            #[doc = concat!("The `", stringify!($variant), "` member named `name`, or `default`.")]
            pub fn $or_getter(&self, name: &str, default: $ty) -> $ty {
                match self.member_payload(name) {
                    Ok(Payload::$variant(v)) => *v,
                    _ => default,
                }
            }
        )*
    };
}

macro_rules! array_accessors {
    ($lt:lifetime, $(($getter:ident, $or_getter:ident, $ty:ty, $variant:ident)),* $(,)?) => {
        $(
            #[doc = concat!("The `", stringify!($variant), "` member named `name`.")]
            ///
            /// Errors with [`Error::MissingField`] when the name is absent
            /// or holds a different kind.
            pub fn $getter(&self, name: &str) -> Result<&$lt [$ty]> {
                match self.member_payload(name)? {
                    Payload::$variant(v) => Ok(v.as_slice()),
                    p => Err(Error::wrong_type(name, TagType::$variant, p.tag_type())),
                }
            }

            #[doc = concat!("The `", stringify!($variant), "` member named `name`, or `default`.")]
            pub fn $or_getter<'a>(&self, name: &str, default: &'a [$ty]) -> &'a [$ty]
            where
                $lt: 'a,
            {
                match self.member_payload(name) {
                    Ok(Payload::$variant(v)) => v.as_slice(),
                    _ => default,
                }
            }
        )*
    };
}

/// A borrowed view of one tag. Copyable; all reads go through here.
///
/// Comparison with `==` is *structural* (same kind, name and payload,
/// identity ignored); dedup by position uses [`TagRef::id`].
#[derive(Clone, Copy)]
pub struct TagRef<'t> {
    tree: &'t Tree,
    id: TagId,
}

impl<'t> TagRef<'t> {
    pub fn id(&self) -> TagId {
        self.id
    }

    pub fn tree(&self) -> &'t Tree {
        self.tree
    }

    pub fn tag_type(&self) -> TagType {
        self.tree.node(self.id).payload.tag_type()
    }

    pub fn name(&self) -> Option<&'t str> {
        self.tree.node(self.id).name.as_deref()
    }

    /// The owning collection, if this tag has been added to one.
    pub fn parent(&self) -> Option<TagRef<'t>> {
        self.tree.node(self.id).parent.map(|id| TagRef {
            tree: self.tree,
            id,
        })
    }

    /// Number of children for collections; 0 for leaves.
    pub fn len(&self) -> usize {
        match &self.tree.node(self.id).payload {
            Payload::List { items, .. } => items.len(),
            Payload::Compound(map) => map.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Children in order (list order, or compound insertion order).
    pub fn children(&self) -> Vec<TagRef<'t>> {
        self.tree
            .children_of(self.id)
            .into_iter()
            .map(|id| TagRef {
                tree: self.tree,
                id,
            })
            .collect()
    }

    /// The fixed element kind, for lists.
    pub fn element_type(&self) -> Option<TagType> {
        match &self.tree.node(self.id).payload {
            Payload::List { element, .. } => Some(*element),
            _ => None,
        }
    }

    /// The list element at `index`.
    pub fn at(&self, index: usize) -> Option<TagRef<'t>> {
        match &self.tree.node(self.id).payload {
            Payload::List { items, .. } => items.get(index).map(|&id| TagRef {
                tree: self.tree,
                id,
            }),
            _ => None,
        }
    }

    /// Extract this subtree as an owned [`Value`].
    pub fn to_value(&self) -> Value {
        value_of(self.tree, self.id)
    }

    /// Errors with [`Error::Validation`] unless this tag is named exactly
    /// `expected`.
    pub fn check_name(&self, expected: &str) -> Result<()> {
        if self.name() == Some(expected) {
            Ok(())
        } else {
            Err(Error::name_mismatch(expected, self.name()))
        }
    }

    /// Whether this compound has a member of this name.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The member of this name, if this tag is a compound holding one.
    pub fn get(&self, name: &str) -> Option<TagRef<'t>> {
        match &self.tree.node(self.id).payload {
            Payload::Compound(map) => map.get(name).map(|&id| TagRef {
                tree: self.tree,
                id,
            }),
            _ => None,
        }
    }

    /// The member of this name, of whatever kind, or
    /// [`Error::MissingField`].
    pub fn get_tag(&self, name: &str) -> Result<TagRef<'t>> {
        let map = match &self.tree.node(self.id).payload {
            Payload::Compound(map) => map,
            p => return Err(Error::not_a(TagType::Compound, p.tag_type())),
        };
        match map.get(name) {
            Some(&id) => Ok(TagRef {
                tree: self.tree,
                id,
            }),
            None => Err(Error::missing(name)),
        }
    }

    /// Run a structural query over this subtree; see the [`query`]
    /// module for the expression syntax. Results are deduplicated by
    /// identity and never include this tag itself.
    ///
    /// [`query`]: crate::query
    pub fn query(&self, q: &str) -> Result<Vec<TagRef<'t>>> {
        let steps = crate::query::parse_query(q)?;
        Ok(crate::query::run(self.tree, self.id, &steps)
            .into_iter()
            .map(|id| TagRef {
                tree: self.tree,
                id,
            })
            .collect())
    }

    fn member_payload(&self, name: &str) -> Result<&'t Payload> {
        let map = match &self.tree.node(self.id).payload {
            Payload::Compound(map) => map,
            p => return Err(Error::not_a(TagType::Compound, p.tag_type())),
        };
        match map.get(name) {
            Some(&id) => Ok(&self.tree.node(id).payload),
            None => Err(Error::missing(name)),
        }
    }

    scalar_accessors![
        (byte, byte_or, i8, Byte),
        (short, short_or, i16, Short),
        (int, int_or, i32, Int),
        (long, long_or, i64, Long),
        (float, float_or, f32, Float),
        (double, double_or, f64, Double),
    ];

    array_accessors![
        't,
        (byte_array, byte_array_or, i8, ByteArray),
        (int_array, int_array_or, i32, IntArray),
        (long_array, long_array_or, i64, LongArray),
        (short_array, short_array_or, i16, ShortArray),
        (float_array, float_array_or, f32, FloatArray),
    ];

    /// The `String` member named `name`.
    ///
    /// Errors with [`Error::MissingField`] when the name is absent or
    /// holds a different kind.
    pub fn string(&self, name: &str) -> Result<&'t str> {
        match self.member_payload(name)? {
            Payload::String(s) => Ok(s.as_str()),
            p => Err(Error::wrong_type(name, TagType::String, p.tag_type())),
        }
    }

    /// The `String` member named `name`, or `default`.
    pub fn string_or<'a>(&self, name: &str, default: &'a str) -> &'a str
    where
        't: 'a,
    {
        match self.member_payload(name) {
            Ok(Payload::String(s)) => s.as_str(),
            _ => default,
        }
    }

    /// The `List` member named `name`.
    pub fn list(&self, name: &str) -> Result<TagRef<'t>> {
        let r = self.get_tag(name)?;
        match r.tag_type() {
            TagType::List => Ok(r),
            t => Err(Error::wrong_type(name, TagType::List, t)),
        }
    }

    /// The `List` member named `name`, additionally checked to hold
    /// `element` tags.
    pub fn list_of(&self, name: &str, element: TagType) -> Result<TagRef<'t>> {
        let r = self.list(name)?;
        match r.element_type() {
            Some(e) if e == element => Ok(r),
            Some(e) => Err(Error::MissingField(format!(
                "list \"{}\" holds {} elements, not {}",
                name, e, element
            ))),
            None => Err(Error::wrong_type(name, TagType::List, r.tag_type())),
        }
    }

    /// The `Compound` member named `name`.
    pub fn compound(&self, name: &str) -> Result<TagRef<'t>> {
        let r = self.get_tag(name)?;
        match r.tag_type() {
            TagType::Compound => Ok(r),
            t => Err(Error::wrong_type(name, TagType::Compound, t)),
        }
    }
}

impl PartialEq for TagRef<'_> {
    fn eq(&self, other: &TagRef<'_>) -> bool {
        tag_eq(self.tree, self.id, other.tree, other.id)
    }
}

impl std::fmt::Debug for TagRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagRef")
            .field("id", &self.id)
            .field("type", &self.tag_type())
            .field("name", &self.name())
            .finish()
    }
}

fn value_of(tree: &Tree, id: TagId) -> Value {
    match &tree.node(id).payload {
        Payload::Byte(v) => Value::Byte(*v),
        Payload::Short(v) => Value::Short(*v),
        Payload::Int(v) => Value::Int(*v),
        Payload::Long(v) => Value::Long(*v),
        Payload::Float(v) => Value::Float(*v),
        Payload::Double(v) => Value::Double(*v),
        Payload::ByteArray(v) => Value::ByteArray(v.clone()),
        Payload::String(v) => Value::String(v.clone()),
        Payload::IntArray(v) => Value::IntArray(v.clone()),
        Payload::LongArray(v) => Value::LongArray(v.clone()),
        Payload::ShortArray(v) => Value::ShortArray(v.clone()),
        Payload::FloatArray(v) => Value::FloatArray(v.clone()),
        Payload::List { element, items } => Value::List(
            *element,
            items.iter().map(|&c| value_of(tree, c)).collect(),
        ),
        Payload::Compound(map) => Value::Compound(
            map.iter()
                .map(|(k, &c)| (k.clone(), value_of(tree, c)))
                .collect(),
        ),
    }
}
