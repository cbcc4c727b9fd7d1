use std::collections::hash_map::{self, HashMap};
use std::ops::Deref;

use crate::error::{FormatError, NbtError, NbtResult};
use crate::list::List;
use crate::tag::{Tag, Value};
use crate::types::TagType;

/// A mapping from unique names to named child tags.
///
/// Adding a tag whose name is already present replaces the previous entry.
/// Iteration order is unspecified.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Compound {
    tags: HashMap<String, Tag>,
}

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a compound from named tags; later duplicates win.
    pub fn from_tags(tags: impl IntoIterator<Item = Tag>) -> NbtResult<Self> {
        let mut compound = Self::new();
        for tag in tags {
            compound.add(tag)?;
        }
        Ok(compound)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// Add a named tag, returning the entry it replaced.
    ///
    /// Fails if the tag has no name or is `End`.
    pub fn add(&mut self, tag: Tag) -> NbtResult<Option<Tag>> {
        if tag.is_end() {
            return Err(NbtError::InvalidArgument(
                "cannot add an End tag to a compound".into(),
            ));
        }
        let name = match tag.name() {
            Some(name) => name.to_owned(),
            None => {
                return Err(NbtError::InvalidArgument(
                    "compound children must be named".into(),
                ))
            }
        };
        Ok(self.tags.insert(name, tag))
    }

    /// Shorthand for `add(Tag::named(name, value))`.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> NbtResult<Option<Tag>> {
        self.add(Tag::named(name, value))
    }

    /// Copy every entry of `other` into this compound, overwriting by name.
    pub fn extend_from(&mut self, other: &Compound) {
        for (name, tag) in &other.tags {
            self.tags.insert(name.clone(), tag.clone());
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Tag> {
        self.tags.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.tags.get(name)
    }

    /// Mutable access to a child. The child's name cannot change and its
    /// value cannot become `End`.
    pub fn get_mut(&mut self, name: &str) -> Option<ChildMut<'_>> {
        self.tags.get_mut(name).map(ChildMut::new)
    }

    /// The child named `name`, which must have type `ty`.
    pub fn find(&self, ty: TagType, name: &str) -> Result<&Tag, FormatError> {
        match self.tags.get(name) {
            None => Err(self.missing(name, "tag")),
            Some(tag) if tag.tag_type() != ty => Err(self.mistyped(name, tag.tag_type(), ty)),
            Some(tag) => Ok(tag),
        }
    }

    /// Like [`find`](Self::find), but the error carries the offending child
    /// rather than a copy of the whole compound.
    pub fn find_mut(&mut self, ty: TagType, name: &str) -> Result<ChildMut<'_>, FormatError> {
        match self.tags.get_mut(name) {
            None => Err(FormatError::new(missing_message(name, "tag"))),
            Some(tag) if tag.tag_type() != ty => {
                let message = mistyped_message(name, tag.tag_type(), ty);
                Err(FormatError::new(message).with_tag(tag.clone()))
            }
            Some(tag) => Ok(ChildMut::new(tag)),
        }
    }

    /// The List named `name`, which must hold elements of `element_type`.
    pub fn find_list(&self, name: &str, element_type: TagType) -> Result<&List, FormatError> {
        let list = match self.tags.get(name).map(Tag::value) {
            None => return Err(self.missing(name, "List tag")),
            Some(Value::List(list)) => list,
            Some(other) => {
                return Err(self.diagnostic(format!(
                    "\"{name}\" is {} instead of a List tag",
                    other.tag_type()
                )))
            }
        };
        if list.supports() != element_type {
            return Err(self.diagnostic(format!(
                "\"{name}\" supports {} instead of {element_type}",
                list.supports()
            )));
        }
        Ok(list)
    }

    pub fn find_list_mut(
        &mut self,
        name: &str,
        element_type: TagType,
    ) -> Result<&mut List, FormatError> {
        match self.tags.get_mut(name).map(Tag::value_mut) {
            Some(Value::List(list)) => {
                if list.supports() == element_type {
                    Ok(list)
                } else {
                    Err(FormatError::new(format!(
                        "\"{name}\" supports {} instead of {element_type}",
                        list.supports()
                    )))
                }
            }
            Some(other) => Err(FormatError::new(format!(
                "\"{name}\" is {} instead of a List tag",
                other.tag_type()
            ))),
            None => Err(FormatError::new(missing_message(name, "List tag"))),
        }
    }

    pub fn find_compound_mut(&mut self, name: &str) -> Result<&mut Compound, FormatError> {
        match self.tags.get_mut(name).map(Tag::value_mut) {
            Some(Value::Compound(compound)) => Ok(compound),
            Some(other) => Err(FormatError::new(mistyped_message(
                name,
                other.tag_type(),
                TagType::Compound,
            ))),
            None => Err(FormatError::new(missing_message(name, "tag"))),
        }
    }

    pub fn iter(&self) -> hash_map::Values<'_, String, Tag> {
        self.tags.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = ChildMut<'_>> {
        self.tags.values_mut().map(ChildMut::new)
    }

    fn missing(&self, name: &str, what: &str) -> FormatError {
        self.diagnostic(missing_message(name, what))
    }

    fn mistyped(&self, name: &str, actual: TagType, expected: TagType) -> FormatError {
        self.diagnostic(mistyped_message(name, actual, expected))
    }

    fn diagnostic(&self, message: String) -> FormatError {
        FormatError::new(message).with_tag(Tag::unnamed(self.clone()))
    }

    /// Used by the decoder; the name has already been read off the stream.
    pub(crate) fn insert_decoded(&mut self, name: String, value: Value) {
        self.tags
            .insert(name.clone(), Tag::from_parts(Some(name), value));
    }
}

fn missing_message(name: &str, what: &str) -> String {
    format!("No {what} with the name \"{name}\"")
}

fn mistyped_message(name: &str, actual: TagType, expected: TagType) -> String {
    format!("\"{name}\" is {actual} instead of {expected}")
}

/// Mutable handle on one child of a [`Compound`].
///
/// Reads go through `Deref<Target = Value>`. Replacing the value goes through
/// [`set`](Self::set), which refuses `End`; nested Lists and Compounds are
/// reachable mutably because they guard their own contents.
#[derive(Debug)]
pub struct ChildMut<'a> {
    tag: &'a mut Tag,
}

impl<'a> ChildMut<'a> {
    fn new(tag: &'a mut Tag) -> Self {
        Self { tag }
    }

    pub fn name(&self) -> &str {
        self.tag.name().unwrap_or_default()
    }

    pub fn value(&self) -> &Value {
        self.tag.value()
    }

    /// Replace the value, returning the previous one. The type may change.
    pub fn set(&mut self, value: impl Into<Value>) -> NbtResult<Value> {
        let value = value.into();
        if value.tag_type() == TagType::End {
            return Err(NbtError::InvalidArgument(format!(
                "cannot set compound child \"{}\" to End",
                self.name()
            )));
        }
        Ok(std::mem::replace(self.tag.value_mut(), value))
    }

    pub fn as_list_mut(&mut self) -> Option<&mut List> {
        self.tag.value_mut().as_list_mut()
    }

    pub fn as_compound_mut(&mut self) -> Option<&mut Compound> {
        self.tag.value_mut().as_compound_mut()
    }

    pub fn into_list_mut(self) -> Option<&'a mut List> {
        self.tag.value_mut().as_list_mut()
    }

    pub fn into_compound_mut(self) -> Option<&'a mut Compound> {
        self.tag.value_mut().as_compound_mut()
    }
}

impl Deref for ChildMut<'_> {
    type Target = Value;

    fn deref(&self) -> &Value {
        self.tag.value()
    }
}

macro_rules! typed_finders {
    ($($fn_name:ident => $variant:ident : $ret:ty, |$v:ident| $body:expr;)*) => {
        impl Compound {
            $(
                #[doc = concat!("The ", stringify!($variant), " child named `name`.")]
                pub fn $fn_name(&self, name: &str) -> Result<$ret, FormatError> {
                    match self.tags.get(name).map(Tag::value) {
                        Some(Value::$variant($v)) => Ok($body),
                        Some(other) => Err(self.mistyped(name, other.tag_type(), TagType::$variant)),
                        None => Err(self.missing(name, "tag")),
                    }
                }
            )*
        }
    };
}

typed_finders! {
    find_byte => Byte: i8, |v| *v;
    find_short => Short: i16, |v| *v;
    find_int => Int: i32, |v| *v;
    find_long => Long: i64, |v| *v;
    find_float => Float: f32, |v| *v;
    find_double => Double: f64, |v| *v;
    find_byte_array => ByteArray: &[u8], |v| v.as_slice();
    find_string => String: &str, |v| v.as_str();
    find_compound => Compound: &Compound, |v| v;
    find_int_array => IntArray: &[i32], |v| v.as_slice();
}

impl<'a> IntoIterator for &'a Compound {
    type Item = &'a Tag;
    type IntoIter = hash_map::Values<'a, String, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.values()
    }
}
