//! Binary framing of tag trees.
//!
//! A stream holds exactly one root: `[type id][name][payload]`, where the
//! root must be a Compound. Every multi-byte number is big-endian. Names and
//! strings are a `u16` byte length followed by UTF-8. Byte and Int arrays are
//! an `i32` element count followed by the elements. A List is its element
//! type id, an `i32` count, then that many payloads with neither id nor
//! name. A Compound is a run of named tags closed by a single `End` id.

use std::collections::hash_map;
use std::io::{self, Read, Write};
use std::slice;

use tracing::debug;

use crate::compound::Compound;
use crate::compression::CompressionScheme;
use crate::error::{FormatError, NbtError, NbtResult};
use crate::list::List;
use crate::tag::{Tag, Value};
use crate::types::TagType;

/// Lists and Compounds nested deeper than this are rejected in both
/// directions.
pub const MAX_DEPTH: usize = 512;

/// Encode `tag` uncompressed into `sink`.
///
/// The root must be a Compound. A root without a name is written with the
/// empty name.
pub fn encode<W: Write>(tag: &Tag, sink: W) -> NbtResult<()> {
    let mut writer = Writer { sink };
    writer.write_root(tag)?;
    writer.sink.flush()?;
    Ok(())
}

/// Decode one uncompressed root tag from `source`.
pub fn decode<R: Read>(source: R) -> NbtResult<Tag> {
    Reader { source }.read_root()
}

/// Encode `tag` into a gzip stream.
pub fn encode_compressed<W: Write>(tag: &Tag, sink: W) -> NbtResult<()> {
    encode_with(CompressionScheme::GZip, CompressionScheme::DEFAULT_LEVEL, tag, sink)
}

/// Decode one root tag from a gzip stream.
pub fn decode_compressed<R: Read>(source: R) -> NbtResult<Tag> {
    decode_with(CompressionScheme::GZip, source)
}

/// Encode `tag` under `scheme` at the given compression level.
pub fn encode_with<W: Write>(
    scheme: CompressionScheme,
    level: u32,
    tag: &Tag,
    sink: W,
) -> NbtResult<()> {
    let mut compressed = scheme.writer(sink, level);
    encode(tag, &mut compressed)?;
    compressed.finish_stream()?;
    Ok(())
}

pub fn decode_with<R: Read>(scheme: CompressionScheme, source: R) -> NbtResult<Tag> {
    decode(scheme.reader(source))
}

/// Encode uncompressed into a fresh buffer.
pub fn to_bytes(tag: &Tag) -> NbtResult<Vec<u8>> {
    let mut buf = Vec::new();
    encode(tag, &mut buf)?;
    Ok(buf)
}

/// Decode uncompressed bytes. Trailing bytes after the root are ignored.
pub fn from_bytes(bytes: &[u8]) -> NbtResult<Tag> {
    decode(bytes)
}

struct Writer<W> {
    sink: W,
}

/// An open List or Compound on the writer's stack.
enum WriteFrame<'a> {
    Compound(hash_map::Values<'a, String, Tag>),
    List(slice::Iter<'a, Value>),
}

impl<W: Write> Writer<W> {
    fn write_root(&mut self, tag: &Tag) -> NbtResult<()> {
        let Value::Compound(compound) = tag.value() else {
            return Err(NbtError::InvalidArgument(format!(
                "root tag must be a Compound, got {}",
                tag.tag_type()
            )));
        };
        self.write_u8(TagType::Compound.id())?;
        self.write_str(tag.name().unwrap_or(""))?;
        self.write_tree(compound)
    }

    /// Writes `root`'s payload and everything below it. Nesting is tracked on
    /// an explicit stack so deep trees cannot exhaust the thread's stack.
    fn write_tree(&mut self, root: &Compound) -> NbtResult<()> {
        let mut stack = vec![WriteFrame::Compound(root.iter())];
        while let Some(frame) = stack.last_mut() {
            let next = match frame {
                WriteFrame::Compound(children) => match children.next() {
                    Some(child) => {
                        self.write_child_header(child)?;
                        Some(child.value())
                    }
                    None => {
                        self.write_u8(TagType::End.id())?;
                        None
                    }
                },
                WriteFrame::List(items) => items.next(),
            };
            match next {
                None => {
                    stack.pop();
                }
                Some(Value::List(list)) => {
                    check_depth(stack.len(), NbtError::InvalidArgument)?;
                    self.write_u8(list.supports().id())?;
                    self.write_len(list.len(), "List")?;
                    stack.push(WriteFrame::List(list.iter()));
                }
                Some(Value::Compound(compound)) => {
                    check_depth(stack.len(), NbtError::InvalidArgument)?;
                    stack.push(WriteFrame::Compound(compound.iter()));
                }
                Some(Value::End) => {}
                Some(Value::Byte(v)) => self.write_all(&v.to_be_bytes())?,
                Some(Value::Short(v)) => self.write_all(&v.to_be_bytes())?,
                Some(Value::Int(v)) => self.write_all(&v.to_be_bytes())?,
                Some(Value::Long(v)) => self.write_all(&v.to_be_bytes())?,
                Some(Value::Float(v)) => self.write_all(&v.to_be_bytes())?,
                Some(Value::Double(v)) => self.write_all(&v.to_be_bytes())?,
                Some(Value::ByteArray(bytes)) => {
                    self.write_len(bytes.len(), "Byte Array")?;
                    self.write_all(bytes)?;
                }
                Some(Value::String(s)) => self.write_str(s)?,
                Some(Value::IntArray(ints)) => {
                    self.write_len(ints.len(), "Int Array")?;
                    for v in ints {
                        self.write_all(&v.to_be_bytes())?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Type id and name of a Compound child. An `End` child would be read
    /// back as the Compound's terminator, so it is refused.
    fn write_child_header(&mut self, child: &Tag) -> NbtResult<()> {
        let name = child.name().unwrap_or("");
        if child.is_end() {
            return Err(NbtError::InvalidArgument(format!(
                "compound child \"{name}\" is an End tag"
            )));
        }
        self.write_u8(child.tag_type().id())?;
        self.write_str(name)
    }

    fn write_str(&mut self, s: &str) -> NbtResult<()> {
        let len = u16::try_from(s.len()).map_err(|_| {
            NbtError::InvalidArgument(format!(
                "string of {} bytes exceeds the 65535-byte limit",
                s.len()
            ))
        })?;
        self.write_all(&len.to_be_bytes())?;
        self.write_all(s.as_bytes())
    }

    fn write_len(&mut self, len: usize, what: &str) -> NbtResult<()> {
        let len = i32::try_from(len).map_err(|_| {
            NbtError::InvalidArgument(format!("{what} of {len} elements is too long to encode"))
        })?;
        self.write_all(&len.to_be_bytes())
    }

    fn write_u8(&mut self, v: u8) -> NbtResult<()> {
        self.write_all(&[v])
    }

    fn write_all(&mut self, bytes: &[u8]) -> NbtResult<()> {
        self.sink.write_all(bytes)?;
        Ok(())
    }
}

/// Fails when `open` containers are already on the stack and another one
/// would exceed [`MAX_DEPTH`].
fn check_depth(open: usize, error: impl FnOnce(String) -> NbtError) -> NbtResult<()> {
    if open >= MAX_DEPTH {
        return Err(error(format!(
            "Tags are nested deeper than {MAX_DEPTH} levels"
        )));
    }
    Ok(())
}

struct Reader<R> {
    source: R,
}

/// A List or Compound whose children are still being read. `key` is the
/// name it will get in its parent; empty under a List.
enum ReadFrame {
    Compound {
        key: String,
        compound: Compound,
    },
    List {
        key: String,
        element_type: TagType,
        remaining: usize,
        items: Vec<Value>,
    },
}

impl ReadFrame {
    fn attach(&mut self, key: String, value: Value) {
        match self {
            Self::Compound { compound, .. } => compound.insert_decoded(key, value),
            Self::List { items, .. } => items.push(value),
        }
    }

    fn finish(self) -> (String, Value) {
        match self {
            Self::Compound { key, compound } => (key, Value::Compound(compound)),
            Self::List {
                key,
                element_type,
                items,
                ..
            } => (key, Value::List(List::from_checked(element_type, items))),
        }
    }
}

impl<R: Read> Reader<R> {
    fn read_root(&mut self) -> NbtResult<Tag> {
        let mut first = [0u8; 1];
        let id = loop {
            match self.source.read(&mut first) {
                Ok(0) => {
                    return Err(FormatError::new(
                        "Unexpected end of stream before reading root tag",
                    )
                    .into())
                }
                Ok(_) => break first[0],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        if id != TagType::Compound.id() {
            return Err(FormatError::new(format!(
                "Root tag was not a Compound tag; tag ID was {id}"
            ))
            .into());
        }
        let name = self.read_string("root name")?;
        let root = self.read_tree()?;
        debug!(
            root = %name,
            children = root.as_compound().map_or(0, Compound::len),
            "decoded root compound"
        );
        Ok(Tag::named(name, root))
    }

    /// Reads a Compound payload and everything below it, keeping open
    /// containers on the heap rather than the call stack.
    fn read_tree(&mut self) -> NbtResult<Value> {
        let mut current = ReadFrame::Compound {
            key: String::new(),
            compound: Compound::new(),
        };
        let mut parents: Vec<ReadFrame> = Vec::new();
        loop {
            let next = match &mut current {
                ReadFrame::Compound { .. } => match self.read_type()? {
                    TagType::End => None,
                    ty => Some((self.read_string("tag name")?, ty)),
                },
                ReadFrame::List {
                    element_type,
                    remaining,
                    ..
                } => match remaining.checked_sub(1) {
                    Some(left) => {
                        *remaining = left;
                        Some((String::new(), *element_type))
                    }
                    None => None,
                },
            };

            let Some((key, ty)) = next else {
                let (key, value) = current.finish();
                match parents.pop() {
                    Some(parent) => {
                        current = parent;
                        current.attach(key, value);
                        continue;
                    }
                    None => return Ok(value),
                }
            };

            let value = match ty {
                TagType::List => {
                    check_depth(parents.len() + 1, |message| FormatError::new(message).into())?;
                    let child = self.open_list(key)?;
                    parents.push(std::mem::replace(&mut current, child));
                    continue;
                }
                TagType::Compound => {
                    check_depth(parents.len() + 1, |message| FormatError::new(message).into())?;
                    let child = ReadFrame::Compound {
                        key,
                        compound: Compound::new(),
                    };
                    parents.push(std::mem::replace(&mut current, child));
                    continue;
                }
                TagType::End => Value::End,
                TagType::Byte => Value::Byte(i8::from_be_bytes(self.read_array("Byte")?)),
                TagType::Short => Value::Short(i16::from_be_bytes(self.read_array("Short")?)),
                TagType::Int => Value::Int(i32::from_be_bytes(self.read_array("Int")?)),
                TagType::Long => Value::Long(i64::from_be_bytes(self.read_array("Long")?)),
                TagType::Float => Value::Float(f32::from_be_bytes(self.read_array("Float")?)),
                TagType::Double => Value::Double(f64::from_be_bytes(self.read_array("Double")?)),
                TagType::ByteArray => {
                    let len = self.read_len("Byte Array length")?;
                    Value::ByteArray(self.read_bytes(len, "Byte Array")?)
                }
                TagType::String => Value::String(self.read_string("String")?),
                TagType::IntArray => {
                    let len = self.read_len("Int Array length")?;
                    let bytes = self.read_bytes(len.saturating_mul(4), "Int Array")?;
                    Value::IntArray(
                        bytes
                            .chunks_exact(4)
                            .map(|c| i32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                            .collect(),
                    )
                }
            };
            current.attach(key, value);
        }
    }

    fn open_list(&mut self, key: String) -> NbtResult<ReadFrame> {
        let element_type = self.read_type()?;
        let count = self.read_len("List size")?;
        if element_type == TagType::End && count > 0 {
            return Err(FormatError::new(format!(
                "List of End tags cannot hold elements; size was {count}"
            ))
            .into());
        }
        Ok(ReadFrame::List {
            key,
            element_type,
            remaining: count,
            items: Vec::new(),
        })
    }

    fn read_type(&mut self) -> NbtResult<TagType> {
        let [id] = self.read_array::<1>("tag type")?;
        TagType::from_id(id)
            .ok_or_else(|| FormatError::new(format!("Unknown tag type ID {id}")).into())
    }

    fn read_len(&mut self, what: &str) -> NbtResult<usize> {
        let len = i32::from_be_bytes(self.read_array(what)?);
        usize::try_from(len)
            .map_err(|_| FormatError::new(format!("{what} is negative: {len}")).into())
    }

    fn read_string(&mut self, what: &str) -> NbtResult<String> {
        let len = u16::from_be_bytes(self.read_array(what)?) as usize;
        let bytes = self.read_bytes(len, what)?;
        String::from_utf8(bytes).map_err(|e| {
            FormatError::new(format!("{what} is not valid UTF-8"))
                .with_source(e)
                .into()
        })
    }

    fn read_array<const N: usize>(&mut self, what: &str) -> NbtResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.source
            .read_exact(&mut buf)
            .map_err(|e| truncated(e, what))?;
        Ok(buf)
    }

    /// Reads `len` bytes, growing the buffer only as data actually arrives.
    fn read_bytes(&mut self, len: usize, what: &str) -> NbtResult<Vec<u8>> {
        let mut buf = Vec::new();
        (&mut self.source)
            .take(len as u64)
            .read_to_end(&mut buf)
            .map_err(|e| truncated(e, what))?;
        if buf.len() < len {
            return Err(truncated(
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("expected {len} bytes, got {}", buf.len()),
                ),
                what,
            ));
        }
        Ok(buf)
    }
}

fn truncated(err: io::Error, what: &str) -> NbtError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        FormatError::new(format!("Unexpected end of stream while reading {what}"))
            .with_source(err)
            .into()
    } else {
        err.into()
    }
}
