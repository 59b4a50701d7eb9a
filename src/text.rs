//! The text codec: an indented, human-readable rendering of a tag tree
//! and a line-oriented parser for it.
//!
//! Each tag occupies one line, `Type("name"): value` for scalars and
//! arrays, `Type("name"): N entries[ of type X]` for collections, whose
//! children follow between `{` and `}` lines indented two spaces per
//! level. List elements carry no name. The root line must be a Compound.
//!
//! ```text
//! Compound("save"): 2 entries
//! {
//!   Int("version"): 3
//!   List("spawn"): 2 entries of type Double
//!   {
//!     Double: 14.5
//!     Double: -3.25
//!   }
//! }
//! ```

use std::fmt::Write as _;
use std::io::Read;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::tree::Payload;
use crate::{TagId, TagType, Tree, Value, MAX_DEPTH};

/// Render a whole tree to its text form.
pub fn render(tree: &Tree) -> String {
    let mut out = String::new();
    // writes into a String cannot fail
    let _ = render_tag(&mut out, tree, tree.root_id(), 0);
    out
}

/// Render a tree to an io writer.
pub fn write_text<W: std::io::Write>(mut writer: W, tree: &Tree) -> Result<()> {
    writer.write_all(render(tree).as_bytes())?;
    Ok(())
}

fn render_tag(out: &mut String, tree: &Tree, id: TagId, indent: usize) -> std::fmt::Result {
    let node = tree.node(id);
    for _ in 0..indent {
        out.push_str("  ");
    }
    write!(out, "{}", node.payload.tag_type())?;
    if let Some(name) = node.name.as_deref() {
        write!(out, "(\"{}\")", name)?;
    }
    out.push_str(": ");
    match &node.payload {
        Payload::Byte(v) => writeln!(out, "{}", v)?,
        Payload::Short(v) => writeln!(out, "{}", v)?,
        Payload::Int(v) => writeln!(out, "{}", v)?,
        Payload::Long(v) => writeln!(out, "{}", v)?,
        Payload::Float(v) => writeln!(out, "{}", v)?,
        Payload::Double(v) => writeln!(out, "{}", v)?,
        Payload::String(s) => writeln!(out, "\"{}\"", s)?,
        Payload::ByteArray(v) => render_array(out, v)?,
        Payload::IntArray(v) => render_array(out, v)?,
        Payload::LongArray(v) => render_array(out, v)?,
        Payload::ShortArray(v) => render_array(out, v)?,
        Payload::FloatArray(v) => render_array(out, v)?,
        Payload::List { element, items } => {
            writeln!(out, "{} entries of type {}", items.len(), element)?;
            render_block(out, tree, items, indent)?;
        }
        Payload::Compound(map) => {
            writeln!(out, "{} entries", map.len())?;
            let items: Vec<TagId> = map.values().copied().collect();
            render_block(out, tree, &items, indent)?;
        }
    }
    Ok(())
}

fn render_array<T: std::fmt::Display>(out: &mut String, values: &[T]) -> std::fmt::Result {
    out.push('[');
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write!(out, "{}", v)?;
    }
    out.push_str("]\n");
    Ok(())
}

fn render_block(out: &mut String, tree: &Tree, items: &[TagId], indent: usize) -> std::fmt::Result {
    for _ in 0..indent {
        out.push_str("  ");
    }
    out.push_str("{\n");
    for &item in items {
        render_tag(out, tree, item, indent + 1)?;
    }
    for _ in 0..indent {
        out.push_str("  ");
    }
    out.push_str("}\n");
    Ok(())
}

// One expression per line: type keyword, optional quoted name, then either
// an entry count (with an element type for lists) or a literal value; or a
// lone brace.
static LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?:([A-Za-z]+)(?:\("([^"]*)"\))?: ?(?:(\d+) entries(?: of type ([A-Za-z]+))?|(.*))|\{|\})$"#,
    )
    .unwrap()
});

/// Parse a tree from a reader of text-format data.
pub fn read_text<R: Read>(mut reader: R) -> Result<Tree> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    parse(&input)
}

/// Parse a tree from its text form. Errors carry the offending 1-based
/// line number.
pub fn parse(input: &str) -> Result<Tree> {
    let mut lines = input.lines();

    // the first line carries the root
    let first = lines
        .next()
        .ok_or_else(|| Error::text_parse(1, "empty input"))?;
    let caps = LINE_RE
        .captures(first.trim())
        .ok_or_else(|| Error::text_parse(1, "unrecognized line"))?;
    if caps.get(1).map(|m| m.as_str()) != Some("Compound") {
        return Err(Error::text_parse(1, "root tag must be a Compound"));
    }
    let mut tree = Tree::new(caps.get(2).map(|m| m.as_str()).unwrap_or(""));
    let mut last: Option<TagId> = Some(tree.root_id());
    let mut parent: Option<TagId> = None;
    let mut stack: Vec<TagId> = Vec::new();

    for (index, raw) in lines.enumerate() {
        let lineno = index + 2;
        let line = raw.trim();
        let caps = LINE_RE
            .captures(line)
            .ok_or_else(|| Error::text_parse(lineno, "unrecognized line"))?;

        match line {
            "{" => {
                let opened = match last {
                    Some(id) if tree.is_collection(id) => id,
                    _ => return Err(Error::text_parse(lineno, "invalid parent tag")),
                };
                if stack.len() >= MAX_DEPTH {
                    return Err(Error::text_parse(lineno, "nesting too deep"));
                }
                if let Some(p) = parent {
                    stack.push(p);
                }
                parent = Some(opened);
            }
            "}" => {
                parent = stack.pop();
            }
            _ => {
                let keyword = match caps.get(1) {
                    Some(m) => m.as_str(),
                    None => return Err(Error::text_parse(lineno, "unrecognized line")),
                };
                let tag = TagType::from_name(keyword)
                    .ok_or_else(|| Error::text_parse(lineno, "unknown tag type"))?;
                let name = caps.get(2).map(|m| m.as_str());
                let element = caps.get(4).map(|m| m.as_str());
                let literal = caps.get(5).map(|m| m.as_str());
                let value = parse_value(tag, element, literal, lineno)?;

                let target = match parent {
                    Some(p) => p,
                    None => return Err(Error::text_parse(lineno, "tag outside any collection")),
                };
                let added = match tree.get(target).map(|r| r.tag_type()) {
                    Some(TagType::Compound) => {
                        let name = name.ok_or_else(|| {
                            Error::text_parse(lineno, "compound members must be named")
                        })?;
                        tree.put(target, name, value)
                    }
                    _ => tree.push(target, value),
                }
                .map_err(|e| Error::text_parse(lineno, e.to_string()))?;
                last = Some(added);
            }
        }
    }

    Ok(tree)
}

fn parse_value(
    tag: TagType,
    element: Option<&str>,
    literal: Option<&str>,
    lineno: usize,
) -> Result<Value> {
    match tag {
        TagType::List => {
            let keyword =
                element.ok_or_else(|| Error::text_parse(lineno, "list missing element type"))?;
            let element = TagType::from_name(keyword)
                .ok_or_else(|| Error::text_parse(lineno, "unknown element type"))?;
            Ok(Value::list(element))
        }
        TagType::Compound => Ok(Value::compound()),
        TagType::End => Err(Error::text_parse(lineno, "End tag not allowed here")),
        _ => {
            let literal = match literal {
                Some(v) if !v.is_empty() => v,
                _ => return Err(Error::text_parse(lineno, "missing value")),
            };
            match tag {
                TagType::Byte => Ok(Value::Byte(parse_literal(literal, lineno)?)),
                TagType::Short => Ok(Value::Short(parse_literal(literal, lineno)?)),
                TagType::Int => Ok(Value::Int(parse_literal(literal, lineno)?)),
                TagType::Long => Ok(Value::Long(parse_literal(literal, lineno)?)),
                TagType::Float => Ok(Value::Float(parse_literal(literal, lineno)?)),
                TagType::Double => Ok(Value::Double(parse_literal(literal, lineno)?)),
                TagType::String => {
                    let inner = literal
                        .strip_prefix('"')
                        .and_then(|s| s.strip_suffix('"'))
                        .ok_or_else(|| Error::text_parse(lineno, "expected quoted string"))?;
                    Ok(Value::String(inner.to_owned()))
                }
                TagType::ByteArray => Ok(Value::ByteArray(parse_array(literal, lineno)?)),
                TagType::IntArray => Ok(Value::IntArray(parse_array(literal, lineno)?)),
                TagType::LongArray => Ok(Value::LongArray(parse_array(literal, lineno)?)),
                TagType::ShortArray => Ok(Value::ShortArray(parse_array(literal, lineno)?)),
                TagType::FloatArray => Ok(Value::FloatArray(parse_array(literal, lineno)?)),
                _ => unreachable!("collections handled above"),
            }
        }
    }
}

fn parse_literal<T: std::str::FromStr>(literal: &str, lineno: usize) -> Result<T> {
    literal
        .parse::<T>()
        .map_err(|_| Error::text_parse(lineno, format!("invalid literal \"{}\"", literal)))
}

fn parse_array<T: std::str::FromStr>(literal: &str, lineno: usize) -> Result<Vec<T>> {
    let inner = literal
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| Error::text_parse(lineno, "expected array literal"))?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|part| parse_literal(part.trim(), lineno))
        .collect()
}
