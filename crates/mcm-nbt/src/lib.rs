//! Named Binary Tag (NBT) data model and codec.
//!
//! NBT is a tree of typed, optionally named values. This crate provides the
//! in-memory model, the exact big-endian binary framing, and the gzip/zlib
//! wrappers the format is usually stored under.
//!
//! # Model
//!
//! - [`Tag`] -- a [`Value`] plus an optional name
//! - [`Compound`] -- named children, unique by name
//! - [`List`] -- homogeneous, unnamed elements of one [`TagType`]
//!
//! # Codec
//!
//! - [`codec::encode`] / [`codec::decode`] -- raw streams
//! - [`codec::encode_compressed`] / [`codec::decode_compressed`] -- gzip
//! - [`codec::encode_with`] / [`codec::decode_with`] -- any [`CompressionScheme`]
//!
//! # Design Rules
//!
//! 1. Compound children always have names and are never `End`; List
//!    elements never have names. Mutable access to a child goes through
//!    [`ChildMut`], which keeps both rules.
//! 2. A List's element type is fixed once it holds an element, and every
//!    rejected mutation leaves the List unchanged.
//! 3. Tags are plain values: `clone` is a deep copy.
//! 4. Malformed input is a [`FormatError`]; misuse of the API is a
//!    [`TypeMismatchError`] or [`NbtError::InvalidArgument`].

pub mod codec;
pub mod compound;
pub mod compression;
pub mod error;
pub mod list;
pub mod mapping;
pub mod tag;
pub mod types;

pub use codec::{decode, decode_compressed, decode_with, encode, encode_compressed, encode_with};
pub use compound::{ChildMut, Compound};
pub use compression::CompressionScheme;
pub use error::{FormatError, NbtError, NbtResult, TypeMismatchError};
pub use list::List;
pub use mapping::{root_compound, NbtMapped};
pub use tag::{Tag, Value};
pub use types::TagType;
