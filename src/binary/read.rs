use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};
use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::{TagType, Tree, Value, MAX_DEPTH};

// Largest element count worth trusting before any data has actually been
// read; keeps a forged count from preallocating gigabytes.
const PREALLOC_CAP: usize = 4096;

/// Read one whole document: a named root compound.
pub(crate) fn read_document<R: Read>(reader: &mut R) -> Result<Tree> {
    let type_byte = reader.read_u8()?;
    let tag = TagType::from_id(type_byte).ok_or_else(|| Error::unknown_tag_type(type_byte))?;
    if tag != TagType::Compound {
        return Err(Error::tag_mismatch(TagType::Compound, tag));
    }
    let name = read_string(reader)?;
    let root = read_payload(reader, TagType::Compound, 0)?;
    Tree::from_named_root(name, root)
}

fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let len = reader.read_u16::<BigEndian>()? as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|_| Error::nonunicode())
}

fn read_payload<R: Read>(reader: &mut R, tag: TagType, depth: usize) -> Result<Value> {
    if depth > MAX_DEPTH {
        return Err(Error::depth_limit());
    }
    Ok(match tag {
        TagType::End => return Err(Error::Format("unexpected End tag".to_owned())),
        TagType::Byte => Value::Byte(reader.read_i8()?),
        TagType::Short => Value::Short(reader.read_i16::<BigEndian>()?),
        TagType::Int => Value::Int(reader.read_i32::<BigEndian>()?),
        TagType::Long => Value::Long(reader.read_i64::<BigEndian>()?),
        TagType::Float => Value::Float(reader.read_f32::<BigEndian>()?),
        TagType::Double => Value::Double(reader.read_f64::<BigEndian>()?),
        TagType::ByteArray => {
            let count = reader.read_u32::<BigEndian>()? as usize;
            let mut data = Vec::with_capacity(count.min(PREALLOC_CAP));
            for _ in 0..count {
                data.push(reader.read_i8()?);
            }
            Value::ByteArray(data)
        }
        TagType::String => Value::String(read_string(reader)?),
        TagType::List => {
            let element_byte = reader.read_u8()?;
            let element = TagType::from_id(element_byte)
                .ok_or_else(|| Error::unknown_tag_type(element_byte))?;
            let count = reader.read_u32::<BigEndian>()? as usize;
            if element == TagType::End && count > 0 {
                return Err(Error::list_of_end());
            }
            let mut items = Vec::with_capacity(count.min(PREALLOC_CAP));
            for _ in 0..count {
                items.push(read_payload(reader, element, depth + 1)?);
            }
            Value::List(element, items)
        }
        TagType::Compound => {
            let mut map = IndexMap::new();
            loop {
                let type_byte = reader.read_u8()?;
                if type_byte == 0 {
                    break;
                }
                let child = TagType::from_id(type_byte)
                    .ok_or_else(|| Error::unknown_tag_type(type_byte))?;
                let name = read_string(reader)?;
                let value = read_payload(reader, child, depth + 1)?;
                map.insert(name, value);
            }
            Value::Compound(map)
        }
        TagType::IntArray => {
            let count = reader.read_u32::<BigEndian>()? as usize;
            let mut data = Vec::with_capacity(count.min(PREALLOC_CAP));
            for _ in 0..count {
                data.push(reader.read_i32::<BigEndian>()?);
            }
            Value::IntArray(data)
        }
        TagType::LongArray => {
            let count = reader.read_u32::<BigEndian>()? as usize;
            let mut data = Vec::with_capacity(count.min(PREALLOC_CAP));
            for _ in 0..count {
                data.push(reader.read_i64::<BigEndian>()?);
            }
            Value::LongArray(data)
        }
        TagType::ShortArray => {
            let count = reader.read_u32::<BigEndian>()? as usize;
            let mut data = Vec::with_capacity(count.min(PREALLOC_CAP));
            for _ in 0..count {
                data.push(reader.read_i16::<BigEndian>()?);
            }
            Value::ShortArray(data)
        }
        TagType::FloatArray => {
            let count = reader.read_u32::<BigEndian>()? as usize;
            let mut data = Vec::with_capacity(count.min(PREALLOC_CAP));
            for _ in 0..count {
                data.push(reader.read_f32::<BigEndian>()?);
            }
            Value::FloatArray(data)
        }
    })
}
