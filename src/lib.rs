//! tagtree is a self-describing, hierarchical binary tag format: typed
//! scalar and array leaves organized under ordered lists and named
//! compounds, in the lineage of "named binary tag" save formats.
//!
//! * For the node tree and typed accessors, see [`Tree`] and [`TagRef`].
//! * For the big-endian wire codec and compression framing, see [`binary`].
//! * For the human-readable rendering and its parser, see [`text`].
//! * For the structural query language, see [`query`].
//! * For indexing a binary blob without materializing a tree, see [`lazy`].
//!
//! ```toml
//! [dependencies]
//! tagtree = "0.4"
//! ```
//!
//! # Quick example
//!
//! Build a small document, write it with fast compression, read it back and
//! pull fields out of the root compound:
//!
//! ```
//! use tagtree::{binary, Builder, Compression, TagType};
//!
//! # fn main() -> tagtree::error::Result<()> {
//! let tree = Builder::new("save")
//!     .int("version", 3)
//!     .string("map", "ridges")
//!     .list("spawn", TagType::Double)
//!     .elem_double(14.5)
//!     .elem_double(-3.25)
//!     .end()
//!     .finish()?;
//!
//! let bytes = binary::to_bytes(&tree, Compression::Fast)?;
//! let back = binary::from_bytes(&bytes, Compression::Fast)?;
//!
//! let root = back.root();
//! assert_eq!(root.int("version")?, 3);
//! assert_eq!(root.string("map")?, "ridges");
//! assert_eq!(root.int_or("difficulty", 2), 2);
//! # Ok(())
//! # }
//! ```

pub mod binary;
pub mod error;
pub mod lazy;
pub mod query;
pub mod text;

mod builder;
mod tree;
mod value;

pub use binary::Compression;
pub use builder::Builder;
pub use error::{Error, Result};
pub use query::Filter;
pub use tree::{TagId, TagRef, Tree};
pub use value::Value;

#[cfg(test)]
mod test;

/// Maximum nesting depth accepted by the codecs and the tree API. Input
/// nested deeper than this is rejected rather than risking the call stack.
pub const MAX_DEPTH: usize = 512;

/// One of the 15 tag kinds. Carries the stable one-byte wire code and the
/// fixed per-element byte width (0 for End, List and Compound, whose
/// sizes are not per-element-fixed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagType {
    /// Terminates a Compound on the wire. Never present as a tree node.
    End = 0,
    /// An i8.
    Byte = 1,
    /// An i16.
    Short = 2,
    /// An i32.
    Int = 3,
    /// An i64.
    Long = 4,
    /// An f32.
    Float = 5,
    /// An f64.
    Double = 6,
    /// An array of i8.
    ByteArray = 7,
    /// A UTF-8 string.
    String = 8,
    /// An ordered list of same-typed, unnamed tags.
    List = 9,
    /// A mapping from name to tag.
    Compound = 10,
    /// An array of i32.
    IntArray = 11,
    /// An array of i64.
    LongArray = 12,
    /// An array of i16.
    ShortArray = 13,
    /// An array of f32.
    FloatArray = 14,
}

/// Every tag kind, in wire-code order.
pub const TAG_TYPES: [TagType; 15] = [
    TagType::End,
    TagType::Byte,
    TagType::Short,
    TagType::Int,
    TagType::Long,
    TagType::Float,
    TagType::Double,
    TagType::ByteArray,
    TagType::String,
    TagType::List,
    TagType::Compound,
    TagType::IntArray,
    TagType::LongArray,
    TagType::ShortArray,
    TagType::FloatArray,
];

// Crates exist to generate these mappings, but the tag set essentially
// never changes, so they are written out by hand to save compile time.
impl TagType {
    /// The one-byte wire code.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// The kind for a wire code, or `None` for an unknown byte.
    pub fn from_id(id: u8) -> Option<TagType> {
        use TagType::*;
        Some(match id {
            0 => End,
            1 => Byte,
            2 => Short,
            3 => Int,
            4 => Long,
            5 => Float,
            6 => Double,
            7 => ByteArray,
            8 => String,
            9 => List,
            10 => Compound,
            11 => IntArray,
            12 => LongArray,
            13 => ShortArray,
            14 => FloatArray,
            _ => return None,
        })
    }

    /// Per-element byte width on the wire. 0 for End, List and Compound,
    /// which are not fixed-width per element.
    pub fn width(self) -> usize {
        use TagType::*;
        match self {
            End | List | Compound => 0,
            Byte | ByteArray | String => 1,
            Short | ShortArray => 2,
            Int | Float | IntArray | FloatArray => 4,
            Long | Double | LongArray => 8,
        }
    }

    /// The keyword used by the text format and the query language.
    pub fn name(self) -> &'static str {
        use TagType::*;
        match self {
            End => "End",
            Byte => "Byte",
            Short => "Short",
            Int => "Int",
            Long => "Long",
            Float => "Float",
            Double => "Double",
            ByteArray => "ByteArray",
            String => "String",
            List => "List",
            Compound => "Compound",
            IntArray => "IntArray",
            LongArray => "LongArray",
            ShortArray => "ShortArray",
            FloatArray => "FloatArray",
        }
    }

    /// Look a kind up by keyword, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<TagType> {
        TAG_TYPES
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for TagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
