use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::{Error, Result};
use crate::tree::Payload;
use crate::{TagId, Tree};

/// Write one whole document: the root compound as a named tag.
pub(crate) fn write_document<W: Write>(writer: &mut W, tree: &Tree) -> Result<()> {
    write_named(writer, tree, tree.root_id())
}

fn write_named<W: Write>(writer: &mut W, tree: &Tree, id: TagId) -> Result<()> {
    let node = tree.node(id);
    writer.write_u8(node.payload.tag_type().id())?;
    write_string(writer, node.name.as_deref().unwrap_or(""))?;
    write_payload(writer, tree, id)
}

fn write_string<W: Write>(writer: &mut W, s: &str) -> Result<()> {
    let len = u16::try_from(s.len()).map_err(|_| Error::oversized_string(s.len()))?;
    writer.write_u16::<BigEndian>(len)?;
    writer.write_all(s.as_bytes())?;
    Ok(())
}

fn write_payload<W: Write>(writer: &mut W, tree: &Tree, id: TagId) -> Result<()> {
    match &tree.node(id).payload {
        Payload::Byte(v) => writer.write_i8(*v)?,
        Payload::Short(v) => writer.write_i16::<BigEndian>(*v)?,
        Payload::Int(v) => writer.write_i32::<BigEndian>(*v)?,
        Payload::Long(v) => writer.write_i64::<BigEndian>(*v)?,
        Payload::Float(v) => writer.write_f32::<BigEndian>(*v)?,
        Payload::Double(v) => writer.write_f64::<BigEndian>(*v)?,
        Payload::ByteArray(v) => {
            writer.write_u32::<BigEndian>(v.len() as u32)?;
            for b in v {
                writer.write_i8(*b)?;
            }
        }
        Payload::String(s) => write_string(writer, s)?,
        Payload::List { element, items } => {
            writer.write_u8(element.id())?;
            writer.write_u32::<BigEndian>(items.len() as u32)?;
            for &item in items {
                write_payload(writer, tree, item)?;
            }
        }
        Payload::Compound(map) => {
            for &child in map.values() {
                write_named(writer, tree, child)?;
            }
            writer.write_u8(0)?;
        }
        Payload::IntArray(v) => {
            writer.write_u32::<BigEndian>(v.len() as u32)?;
            for i in v {
                writer.write_i32::<BigEndian>(*i)?;
            }
        }
        Payload::LongArray(v) => {
            writer.write_u32::<BigEndian>(v.len() as u32)?;
            for i in v {
                writer.write_i64::<BigEndian>(*i)?;
            }
        }
        Payload::ShortArray(v) => {
            writer.write_u32::<BigEndian>(v.len() as u32)?;
            for i in v {
                writer.write_i16::<BigEndian>(*i)?;
            }
        }
        Payload::FloatArray(v) => {
            writer.write_u32::<BigEndian>(v.len() as u32)?;
            for f in v {
                writer.write_f32::<BigEndian>(*f)?;
            }
        }
    }
    Ok(())
}
