//! An index-only reader over a raw (uncompressed) binary document.
//!
//! [`LazyDocument::new`] makes a single linear pass over the blob,
//! recording for every compound and list member its payload byte offset
//! and declared size. No scalar, string or array data is decoded during
//! the pass; callers resolve individual fields on demand through
//! [`LazyCompound`] and [`LazyList`], which seek to the recorded offset
//! and decode just that one field. Offsets are recorded uniformly for
//! every list element kind, fixed-width ones included.
//!
//! The document is read-only over its backing buffer; there is no
//! mutation path. For whole-tree work use
//! [`binary::from_bytes`](crate::binary::from_bytes) instead: the trade
//! here is cheap indexing of large documents against per-field decode
//! cost.

use byteorder::{BigEndian, ByteOrder};
use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::{TagType, Value, MAX_DEPTH};

/// An indexed binary document. Holds name-to-offset structure only.
pub struct LazyDocument<'a> {
    data: &'a [u8],
    root_name: String,
    root: RawCompound,
}

#[derive(Debug)]
enum RawNode {
    /// Fixed-width scalar payload at `offset`.
    Scalar { tag: TagType, offset: usize },
    /// UTF-8 bytes at `offset`, `len` bytes long.
    Str { offset: usize, len: usize },
    /// `count` fixed-width elements starting at `offset`.
    Array {
        tag: TagType,
        offset: usize,
        count: usize,
    },
    Compound(RawCompound),
    List(RawList),
}

#[derive(Debug, Default)]
struct RawCompound {
    entries: IndexMap<String, RawNode>,
}

#[derive(Debug)]
struct RawList {
    element: TagType,
    children: Vec<RawNode>,
}

impl RawNode {
    fn tag_type(&self) -> TagType {
        match self {
            RawNode::Scalar { tag, .. } => *tag,
            RawNode::Str { .. } => TagType::String,
            RawNode::Array { tag, .. } => *tag,
            RawNode::Compound(_) => TagType::Compound,
            RawNode::List(_) => TagType::List,
        }
    }
}

impl<'a> LazyDocument<'a> {
    /// Index a raw binary document. The whole structure is walked once;
    /// truncated or malformed input fails here, not at resolution time.
    pub fn new(data: &'a [u8]) -> Result<LazyDocument<'a>> {
        let mut scanner = Scanner { data, pos: 0 };
        let type_byte = scanner.u8()?;
        let tag =
            TagType::from_id(type_byte).ok_or_else(|| Error::unknown_tag_type(type_byte))?;
        if tag != TagType::Compound {
            return Err(Error::tag_mismatch(TagType::Compound, tag));
        }
        let root_name = scanner.string()?;
        let root = scan_compound(&mut scanner, 0)?;
        Ok(LazyDocument {
            data,
            root_name,
            root,
        })
    }

    /// The root compound's name.
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// The root compound.
    pub fn root(&self) -> LazyCompound<'_> {
        LazyCompound {
            data: self.data,
            raw: &self.root,
        }
    }
}

/// A view of one indexed compound; resolves members on demand.
#[derive(Clone, Copy)]
pub struct LazyCompound<'d> {
    data: &'d [u8],
    raw: &'d RawCompound,
}

impl<'d> LazyCompound<'d> {
    pub fn len(&self) -> usize {
        self.raw.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.entries.is_empty()
    }

    pub fn has(&self, name: &str) -> bool {
        self.raw.entries.contains_key(name)
    }

    /// Member names in document order.
    pub fn names(&self) -> impl Iterator<Item = &'d str> {
        self.raw.entries.keys().map(|k| k.as_str())
    }

    /// The kind of the member named `name`.
    pub fn tag_type(&self, name: &str) -> Result<TagType> {
        Ok(self.node(name)?.tag_type())
    }

    pub fn byte(&self, name: &str) -> Result<i8> {
        let offset = self.scalar_offset(name, TagType::Byte)?;
        Ok(self.slice(offset, 1)?[0] as i8)
    }

    pub fn short(&self, name: &str) -> Result<i16> {
        let offset = self.scalar_offset(name, TagType::Short)?;
        Ok(BigEndian::read_i16(self.slice(offset, 2)?))
    }

    pub fn int(&self, name: &str) -> Result<i32> {
        let offset = self.scalar_offset(name, TagType::Int)?;
        Ok(BigEndian::read_i32(self.slice(offset, 4)?))
    }

    pub fn long(&self, name: &str) -> Result<i64> {
        let offset = self.scalar_offset(name, TagType::Long)?;
        Ok(BigEndian::read_i64(self.slice(offset, 8)?))
    }

    pub fn float(&self, name: &str) -> Result<f32> {
        let offset = self.scalar_offset(name, TagType::Float)?;
        Ok(BigEndian::read_f32(self.slice(offset, 4)?))
    }

    pub fn double(&self, name: &str) -> Result<f64> {
        let offset = self.scalar_offset(name, TagType::Double)?;
        Ok(BigEndian::read_f64(self.slice(offset, 8)?))
    }

    /// The string member named `name`, borrowed straight from the buffer.
    pub fn string(&self, name: &str) -> Result<&'d str> {
        match self.node(name)? {
            RawNode::Str { offset, len } => {
                let bytes = self.slice(*offset, *len)?;
                std::str::from_utf8(bytes).map_err(|_| Error::nonunicode())
            }
            n => Err(Error::wrong_type(name, TagType::String, n.tag_type())),
        }
    }

    pub fn byte_array(&self, name: &str) -> Result<Vec<i8>> {
        let (offset, count) = self.array_info(name, TagType::ByteArray)?;
        let bytes = self.slice(offset, count)?;
        Ok(bytes.iter().map(|&b| b as i8).collect())
    }

    pub fn short_array(&self, name: &str) -> Result<Vec<i16>> {
        let (offset, count) = self.array_info(name, TagType::ShortArray)?;
        let bytes = self.slice(offset, count * 2)?;
        Ok(bytes.chunks_exact(2).map(BigEndian::read_i16).collect())
    }

    pub fn int_array(&self, name: &str) -> Result<Vec<i32>> {
        let (offset, count) = self.array_info(name, TagType::IntArray)?;
        let bytes = self.slice(offset, count * 4)?;
        Ok(bytes.chunks_exact(4).map(BigEndian::read_i32).collect())
    }

    pub fn long_array(&self, name: &str) -> Result<Vec<i64>> {
        let (offset, count) = self.array_info(name, TagType::LongArray)?;
        let bytes = self.slice(offset, count * 8)?;
        Ok(bytes.chunks_exact(8).map(BigEndian::read_i64).collect())
    }

    pub fn float_array(&self, name: &str) -> Result<Vec<f32>> {
        let (offset, count) = self.array_info(name, TagType::FloatArray)?;
        let bytes = self.slice(offset, count * 4)?;
        Ok(bytes.chunks_exact(4).map(BigEndian::read_f32).collect())
    }

    /// Navigate into a nested compound without decoding anything.
    pub fn compound(&self, name: &str) -> Result<LazyCompound<'d>> {
        match self.node(name)? {
            RawNode::Compound(raw) => Ok(LazyCompound {
                data: self.data,
                raw,
            }),
            n => Err(Error::wrong_type(name, TagType::Compound, n.tag_type())),
        }
    }

    /// Navigate into a nested list without decoding anything.
    pub fn list(&self, name: &str) -> Result<LazyList<'d>> {
        match self.node(name)? {
            RawNode::List(raw) => Ok(LazyList {
                data: self.data,
                raw,
            }),
            n => Err(Error::wrong_type(name, TagType::List, n.tag_type())),
        }
    }

    /// Fully materialize the member named `name` (recursively for
    /// collections).
    pub fn value(&self, name: &str) -> Result<Value> {
        resolve_node(self.data, self.node(name)?)
    }

    fn node(&self, name: &str) -> Result<&'d RawNode> {
        self.raw.entries.get(name).ok_or_else(|| Error::missing(name))
    }

    fn scalar_offset(&self, name: &str, tag: TagType) -> Result<usize> {
        match self.node(name)? {
            RawNode::Scalar { tag: t, offset } if *t == tag => Ok(*offset),
            n => Err(Error::wrong_type(name, tag, n.tag_type())),
        }
    }

    fn array_info(&self, name: &str, tag: TagType) -> Result<(usize, usize)> {
        match self.node(name)? {
            RawNode::Array {
                tag: t,
                offset,
                count,
            } if *t == tag => Ok((*offset, *count)),
            n => Err(Error::wrong_type(name, tag, n.tag_type())),
        }
    }

    fn slice(&self, offset: usize, len: usize) -> Result<&'d [u8]> {
        self.data.get(offset..offset + len).ok_or_else(Error::eof)
    }
}

/// A view of one indexed list; resolves elements on demand.
#[derive(Clone, Copy)]
pub struct LazyList<'d> {
    data: &'d [u8],
    raw: &'d RawList,
}

impl<'d> LazyList<'d> {
    pub fn len(&self) -> usize {
        self.raw.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.children.is_empty()
    }

    /// The homogeneous element kind.
    pub fn element_type(&self) -> TagType {
        self.raw.element
    }

    /// Fully materialize the element at `index`.
    pub fn value_at(&self, index: usize) -> Result<Value> {
        resolve_node(self.data, self.node(index)?)
    }

    /// Navigate into the compound element at `index`.
    pub fn compound_at(&self, index: usize) -> Result<LazyCompound<'d>> {
        match self.node(index)? {
            RawNode::Compound(raw) => Ok(LazyCompound {
                data: self.data,
                raw,
            }),
            n => Err(Error::tag_mismatch(TagType::Compound, n.tag_type())),
        }
    }

    /// Navigate into the list element at `index`.
    pub fn list_at(&self, index: usize) -> Result<LazyList<'d>> {
        match self.node(index)? {
            RawNode::List(raw) => Ok(LazyList {
                data: self.data,
                raw,
            }),
            n => Err(Error::tag_mismatch(TagType::List, n.tag_type())),
        }
    }

    fn node(&self, index: usize) -> Result<&'d RawNode> {
        self.raw
            .children
            .get(index)
            .ok_or_else(|| Error::MissingField(format!("no element at index {}", index)))
    }
}

struct Scanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or_else(Error::eof)?;
        let bytes = self.data.get(self.pos..end).ok_or_else(Error::eof)?;
        self.pos = end;
        Ok(bytes)
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    fn string(&mut self) -> Result<String> {
        let len = self.u16()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| Error::nonunicode())
    }
}

fn scan_node(scanner: &mut Scanner<'_>, tag: TagType, depth: usize) -> Result<RawNode> {
    if depth > MAX_DEPTH {
        return Err(Error::depth_limit());
    }
    match tag {
        TagType::End => Err(Error::Format("unexpected End tag".to_owned())),
        TagType::Byte
        | TagType::Short
        | TagType::Int
        | TagType::Long
        | TagType::Float
        | TagType::Double => {
            let offset = scanner.pos;
            scanner.skip(tag.width())?;
            Ok(RawNode::Scalar { tag, offset })
        }
        TagType::String => {
            let len = scanner.u16()? as usize;
            let offset = scanner.pos;
            scanner.skip(len)?;
            Ok(RawNode::Str { offset, len })
        }
        TagType::ByteArray
        | TagType::IntArray
        | TagType::LongArray
        | TagType::ShortArray
        | TagType::FloatArray => {
            let count = scanner.u32()? as usize;
            let offset = scanner.pos;
            let bytes = count.checked_mul(tag.width()).ok_or_else(Error::eof)?;
            scanner.skip(bytes)?;
            Ok(RawNode::Array { tag, offset, count })
        }
        TagType::Compound => Ok(RawNode::Compound(scan_compound(scanner, depth)?)),
        TagType::List => Ok(RawNode::List(scan_list(scanner, depth)?)),
    }
}

fn scan_compound(scanner: &mut Scanner<'_>, depth: usize) -> Result<RawCompound> {
    if depth > MAX_DEPTH {
        return Err(Error::depth_limit());
    }
    let mut entries = IndexMap::new();
    loop {
        let type_byte = scanner.u8()?;
        if type_byte == 0 {
            break;
        }
        let tag =
            TagType::from_id(type_byte).ok_or_else(|| Error::unknown_tag_type(type_byte))?;
        let name = scanner.string()?;
        let node = scan_node(scanner, tag, depth + 1)?;
        entries.insert(name, node);
    }
    Ok(RawCompound { entries })
}

fn scan_list(scanner: &mut Scanner<'_>, depth: usize) -> Result<RawList> {
    let element_byte = scanner.u8()?;
    let element = TagType::from_id(element_byte)
        .ok_or_else(|| Error::unknown_tag_type(element_byte))?;
    let count = scanner.u32()? as usize;
    if element == TagType::End && count > 0 {
        return Err(Error::list_of_end());
    }
    let mut children = Vec::with_capacity(count.min(4096));
    for _ in 0..count {
        children.push(scan_node(scanner, element, depth + 1)?);
    }
    Ok(RawList { element, children })
}

fn resolve_node(data: &[u8], node: &RawNode) -> Result<Value> {
    match node {
        RawNode::Scalar { tag, offset } => scalar_value(data, *tag, *offset),
        RawNode::Str { offset, len } => {
            let bytes = data.get(*offset..*offset + *len).ok_or_else(Error::eof)?;
            let s = std::str::from_utf8(bytes).map_err(|_| Error::nonunicode())?;
            Ok(Value::String(s.to_owned()))
        }
        RawNode::Array { tag, offset, count } => array_value(data, *tag, *offset, *count),
        RawNode::Compound(raw) => {
            let mut map = IndexMap::with_capacity(raw.entries.len());
            for (name, child) in &raw.entries {
                map.insert(name.clone(), resolve_node(data, child)?);
            }
            Ok(Value::Compound(map))
        }
        RawNode::List(raw) => {
            let mut items = Vec::with_capacity(raw.children.len());
            for child in &raw.children {
                items.push(resolve_node(data, child)?);
            }
            Ok(Value::List(raw.element, items))
        }
    }
}

fn scalar_value(data: &[u8], tag: TagType, offset: usize) -> Result<Value> {
    let bytes = data
        .get(offset..offset + tag.width())
        .ok_or_else(Error::eof)?;
    Ok(match tag {
        TagType::Byte => Value::Byte(bytes[0] as i8),
        TagType::Short => Value::Short(BigEndian::read_i16(bytes)),
        TagType::Int => Value::Int(BigEndian::read_i32(bytes)),
        TagType::Long => Value::Long(BigEndian::read_i64(bytes)),
        TagType::Float => Value::Float(BigEndian::read_f32(bytes)),
        TagType::Double => Value::Double(BigEndian::read_f64(bytes)),
        t => return Err(Error::Format(format!("{} is not a scalar tag", t))),
    })
}

fn array_value(data: &[u8], tag: TagType, offset: usize, count: usize) -> Result<Value> {
    let bytes = data
        .get(offset..offset + count * tag.width())
        .ok_or_else(Error::eof)?;
    Ok(match tag {
        TagType::ByteArray => Value::ByteArray(bytes.iter().map(|&b| b as i8).collect()),
        TagType::ShortArray => {
            Value::ShortArray(bytes.chunks_exact(2).map(BigEndian::read_i16).collect())
        }
        TagType::IntArray => {
            Value::IntArray(bytes.chunks_exact(4).map(BigEndian::read_i32).collect())
        }
        TagType::LongArray => {
            Value::LongArray(bytes.chunks_exact(8).map(BigEndian::read_i64).collect())
        }
        TagType::FloatArray => {
            Value::FloatArray(bytes.chunks_exact(4).map(BigEndian::read_f32).collect())
        }
        t => return Err(Error::Format(format!("{} is not an array tag", t))),
    })
}
