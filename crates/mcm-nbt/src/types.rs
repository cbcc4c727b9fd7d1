use std::fmt;

/// The closed set of NBT tag types, in wire id order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagType {
    /// Structural terminator of a Compound; also the type of an untyped empty List.
    End,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    ByteArray,
    String,
    List,
    Compound,
    IntArray,
}

impl TagType {
    /// All types, indexed by their wire id.
    pub const ALL: [TagType; 12] = [
        Self::End,
        Self::Byte,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::ByteArray,
        Self::String,
        Self::List,
        Self::Compound,
        Self::IntArray,
    ];

    /// The wire id written before a tag's name and payload.
    pub fn id(self) -> u8 {
        match self {
            Self::End => 0,
            Self::Byte => 1,
            Self::Short => 2,
            Self::Int => 3,
            Self::Long => 4,
            Self::Float => 5,
            Self::Double => 6,
            Self::ByteArray => 7,
            Self::String => 8,
            Self::List => 9,
            Self::Compound => 10,
            Self::IntArray => 11,
        }
    }

    /// Parse a wire id.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::End => "End",
            Self::Byte => "Byte",
            Self::Short => "Short",
            Self::Int => "Int",
            Self::Long => "Long",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::ByteArray => "Byte Array",
            Self::String => "String",
            Self::List => "List",
            Self::Compound => "Compound",
            Self::IntArray => "Int Array",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_wire_order() {
        for (i, ty) in TagType::ALL.iter().enumerate() {
            assert_eq!(ty.id() as usize, i);
            assert_eq!(TagType::from_id(i as u8), Some(*ty));
        }
    }

    #[test]
    fn from_id_unknown() {
        assert!(TagType::from_id(12).is_none());
        assert!(TagType::from_id(255).is_none());
    }

    #[test]
    fn display_names() {
        assert_eq!(TagType::Compound.to_string(), "Compound");
        assert_eq!(TagType::ByteArray.to_string(), "Byte Array");
        assert_eq!(TagType::IntArray.to_string(), "Int Array");
    }
}
