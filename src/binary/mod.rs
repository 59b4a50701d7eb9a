//! The binary codec: depth-first pre-order serialization of a tree to the
//! big-endian wire format, with selectable compression framing.
//!
//! Wire format, per tag: `TypeByte [NameLen:u16 NameUTF8]? Payload`.
//! Scalars are written in their natural width; arrays are prefixed with a
//! `u32` element count, strings with a `u16` byte length. Lists write
//! their element type byte and a `u32` count, then each element's payload
//! with no per-element header. Compounds write their named children in
//! sequence and terminate with a lone `0x00`. A document is one named
//! root compound (the name may be empty).
//!
//! Documents written under [`Compression::Fast`] by an older codec used
//! gzip framing; reading such a document as `Fast` falls back to gzip
//! after the LZ4 attempt fails, once, before giving up.

mod read;
mod write;

use std::io::{Cursor, Read, Seek, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::warn;
use lz4_flex::frame::{BlockSize, FrameDecoder, FrameEncoder, FrameInfo};

use crate::error::{Error, Result};
use crate::Tree;

/// Compression framing around a binary document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Raw stream.
    None,
    /// LZ4 frame with block checksums: high throughput, larger output.
    Fast,
    /// Gzip stream: smaller output, slower.
    Small,
}

/// Serialize a tree into a byte vector.
pub fn to_bytes(tree: &Tree, compression: Compression) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    to_writer(&mut out, tree, compression)?;
    Ok(out)
}

/// Serialize a tree to a writer under the chosen framing. The encoder is
/// finished explicitly so compression trailers and flush failures surface
/// here rather than being lost in a drop.
pub fn to_writer<W: Write>(mut writer: W, tree: &Tree, compression: Compression) -> Result<()> {
    match compression {
        Compression::None => {
            write::write_document(&mut writer, tree)?;
            writer.flush()?;
        }
        Compression::Fast => {
            let info = FrameInfo::new()
                .block_size(BlockSize::Max4MB)
                .block_checksums(true);
            let mut enc = FrameEncoder::with_frame_info(info, writer);
            write::write_document(&mut enc, tree)?;
            enc.finish()
                .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
                .flush()?;
        }
        Compression::Small => {
            let mut enc = GzEncoder::new(writer, flate2::Compression::default());
            write::write_document(&mut enc, tree)?;
            enc.finish()?.flush()?;
        }
    }
    Ok(())
}

/// Deserialize a document from a byte slice.
pub fn from_bytes(data: &[u8], compression: Compression) -> Result<Tree> {
    from_reader(Cursor::new(data), compression)
}

/// Deserialize a document from a seekable reader under the chosen framing.
///
/// A `Fast` read that fails to decode rewinds the input and retries once
/// assuming gzip framing, accommodating documents written by an older
/// codec. The superseded LZ4 error is logged; if the gzip retry fails too,
/// its error is the one returned.
pub fn from_reader<R: Read + Seek>(mut reader: R, compression: Compression) -> Result<Tree> {
    match compression {
        Compression::None => read::read_document(&mut reader),
        Compression::Small => read::read_document(&mut GzDecoder::new(reader)),
        Compression::Fast => {
            let attempt = {
                let mut decoder = FrameDecoder::new(&mut reader);
                read::read_document(&mut decoder)
            };
            match attempt {
                Ok(tree) => Ok(tree),
                Err(first) => {
                    warn!("fast-framed read failed ({}), retrying as gzip", first);
                    reader.rewind().map_err(Error::Io)?;
                    read::read_document(&mut GzDecoder::new(reader))
                }
            }
        }
    }
}
