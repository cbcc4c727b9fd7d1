use std::fmt;

use crate::compound::Compound;
use crate::list::List;
use crate::types::TagType;

/// The payload of a tag: one variant per [`TagType`].
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    String(String),
    List(List),
    Compound(Compound),
    IntArray(Vec<i32>),
}

impl Value {
    pub fn tag_type(&self) -> TagType {
        match self {
            Self::End => TagType::End,
            Self::Byte(_) => TagType::Byte,
            Self::Short(_) => TagType::Short,
            Self::Int(_) => TagType::Int,
            Self::Long(_) => TagType::Long,
            Self::Float(_) => TagType::Float,
            Self::Double(_) => TagType::Double,
            Self::ByteArray(_) => TagType::ByteArray,
            Self::String(_) => TagType::String,
            Self::List(_) => TagType::List,
            Self::Compound(_) => TagType::Compound,
            Self::IntArray(_) => TagType::IntArray,
        }
    }

    pub fn as_byte(&self) -> Option<i8> {
        match self {
            Self::Byte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_short(&self) -> Option<i16> {
        match self {
            Self::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_byte_array(&self) -> Option<&[u8]> {
        match self {
            Self::ByteArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut List> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Self::Compound(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_compound_mut(&mut self) -> Option<&mut Compound> {
        match self {
            Self::Compound(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            Self::IntArray(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Vec<u8> => ByteArray,
    String => String,
    List => List,
    Compound => Compound,
    Vec<i32> => IntArray,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

/// A value together with its optional name.
///
/// Names are present on Compound children and on root tags, and absent on
/// List elements and on `End`. `PartialEq` compares name, type and value
/// structurally; [`Tag::name_eq`] is the name-only comparison that defines a
/// Compound's key space.
#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    name: Option<String>,
    value: Value,
}

impl Tag {
    /// The sole `End` tag. It has no name and cloning or renaming it yields itself.
    pub const END: Tag = Tag {
        name: None,
        value: Value::End,
    };

    /// A tag with a name, as stored in a Compound or at the root of a stream.
    pub fn named(name: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        if matches!(value, Value::End) {
            return Self::END;
        }
        Self {
            name: Some(name.into()),
            value,
        }
    }

    /// A tag without a name, as stored in a List.
    pub fn unnamed(value: impl Into<Value>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn into_parts(self) -> (Option<String>, Value) {
        (self.name, self.value)
    }

    pub fn tag_type(&self) -> TagType {
        self.value.tag_type()
    }

    pub fn is_end(&self) -> bool {
        matches!(self.value, Value::End)
    }

    /// Name-only equality: two tags with the same name (or both unnamed) are
    /// "the same entry" regardless of type or value.
    pub fn name_eq(&self, other: &Tag) -> bool {
        self.name == other.name
    }

    /// An independent deep copy carrying `name` instead of this tag's name.
    /// `End` is returned unchanged.
    pub fn clone_with_name(&self, name: Option<&str>) -> Tag {
        if self.is_end() {
            return Self::END;
        }
        Tag {
            name: name.map(str::to_owned),
            value: self.value.clone(),
        }
    }

    pub(crate) fn from_parts(name: Option<String>, value: Value) -> Self {
        if matches!(value, Value::End) {
            return Self::END;
        }
        Self { name, value }
    }
}

impl From<Value> for Tag {
    fn from(value: Value) -> Self {
        Self::unnamed(value)
    }
}

fn quote_name(name: Option<&str>) -> String {
    match name {
        Some(n) => format!(" \"{n}\""),
        None => String::new(),
    }
}

fn indent(s: &str) -> String {
    format!("\t{}", s.replace('\n', "\n\t"))
}

fn join_numbers<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn render(name: Option<&str>, value: &Value) -> String {
    let qn = quote_name(name);
    match value {
        Value::End => "End".to_owned(),
        Value::Byte(v) => format!("Byte{qn}: {v}"),
        Value::Short(v) => format!("Short{qn}: {v}"),
        Value::Int(v) => format!("Int{qn}: {v}"),
        Value::Long(v) => format!("Long{qn}: {v}"),
        Value::Float(v) => format!("Float{qn}: {v}"),
        Value::Double(v) => format!("Double{qn}: {v}"),
        Value::ByteArray(v) => {
            let signed: Vec<i8> = v.iter().map(|b| *b as i8).collect();
            format!("Byte Array{qn}: [{}]", join_numbers(&signed))
        }
        Value::String(v) => format!("String{qn}: \"{v}\""),
        Value::IntArray(v) => format!("Int Array{qn}: [{}]", join_numbers(v)),
        Value::List(list) => {
            let body = list
                .iter()
                .map(|v| render(None, v))
                .collect::<Vec<_>>()
                .join(",\n");
            format!("List of {}{qn}: \n[\n{}\n]", list.supports(), indent(&body))
        }
        Value::Compound(compound) => {
            let mut children: Vec<&Tag> = compound.iter().collect();
            children.sort_by(|a, b| a.name().cmp(&b.name()));
            let body = children
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(",\n");
            format!("Compound{qn}:\n{{\n{}\n}}", indent(&body))
        }
    }
}

/// Indented, human-readable rendering of the whole tree. Compound children
/// are listed by name.
impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self.name(), &self.value))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(None, self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_and_unnamed() {
        let t = Tag::named("x", 5i32);
        assert_eq!(t.name(), Some("x"));
        assert_eq!(t.tag_type(), TagType::Int);
        assert_eq!(t.value().as_int(), Some(5));

        let u = Tag::unnamed(Value::Long(7));
        assert_eq!(u.name(), None);
        assert_eq!(u.value().as_long(), Some(7));
    }

    #[test]
    fn end_never_carries_a_name() {
        let t = Tag::named("ignored", Value::End);
        assert_eq!(t, Tag::END);
        assert_eq!(Tag::END.clone_with_name(Some("x")), Tag::END);
    }

    #[test]
    fn name_eq_ignores_type_and_value() {
        let a = Tag::named("same", 1i8);
        let b = Tag::named("same", "text");
        assert!(a.name_eq(&b));
        assert_ne!(a, b);
        assert!(!a.name_eq(&Tag::named("other", 1i8)));
    }

    #[test]
    fn clone_is_deep() {
        let original = Tag::named("data", vec![1u8, 2, 3]);
        let mut copy = original.clone();
        if let Value::ByteArray(bytes) = copy.value_mut() {
            bytes[0] = 99;
        }
        assert_eq!(original.value().as_byte_array(), Some(&[1u8, 2, 3][..]));
        assert_eq!(copy.value().as_byte_array(), Some(&[99u8, 2, 3][..]));
    }

    #[test]
    fn clone_with_name_renames_copy_only() {
        let original = Tag::named("a", vec![1i32, 2]);
        let renamed = original.clone_with_name(Some("b"));
        assert_eq!(original.name(), Some("a"));
        assert_eq!(renamed.name(), Some("b"));
        assert_eq!(renamed.value(), original.value());
        assert_eq!(original.clone_with_name(None).name(), None);
    }

    #[test]
    fn display_scalars() {
        assert_eq!(Tag::named("b", 5i8).to_string(), "Byte \"b\": 5");
        assert_eq!(Tag::unnamed(Value::Short(-3)).to_string(), "Short: -3");
        assert_eq!(Tag::named("s", "hi").to_string(), "String \"s\": \"hi\"");
        assert_eq!(
            Tag::named("ba", vec![1u8, 255]).to_string(),
            "Byte Array \"ba\": [1, -1]"
        );
        assert_eq!(
            Tag::named("ia", vec![1i32, -2]).to_string(),
            "Int Array \"ia\": [1, -2]"
        );
        assert_eq!(Tag::END.to_string(), "End");
    }

    #[test]
    fn display_nested() {
        let mut list = List::new(TagType::Int);
        list.append([Value::Int(1), Value::Int(2)]).unwrap();
        let mut root = Compound::new();
        root.insert("l", list).unwrap();
        root.insert("a", 3i32).unwrap();
        let text = Tag::named("root", root).to_string();
        assert_eq!(
            text,
            "Compound \"root\":\n{\n\tInt \"a\": 3,\n\tList of Int \"l\": \n\t[\n\t\tInt: 1,\n\t\tInt: 2\n\t]\n}"
        );
    }
}
