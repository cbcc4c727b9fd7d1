use crate::compound::Compound;
use crate::error::{FormatError, NbtResult};
use crate::tag::{Tag, Value};

/// Hand-written conversion between a Rust type and a tag tree.
///
/// Implementations build the tree with [`Compound::insert`] and read it back
/// with the typed `find_*` accessors, so a missing or mistyped field surfaces
/// as a [`FormatError`] naming the field.
pub trait NbtMapped: Sized {
    /// Render `self` as a tag called `name`.
    fn to_nbt(&self, name: &str) -> NbtResult<Tag>;

    fn from_nbt(tag: &Tag) -> NbtResult<Self>;
}

/// The Compound payload of `tag`, or a format error carrying the tag.
pub fn root_compound(tag: &Tag) -> Result<&Compound, FormatError> {
    match tag.value() {
        Value::Compound(compound) => Ok(compound),
        other => Err(FormatError::new(format!(
            "expected a Compound tag, found {}",
            other.tag_type()
        ))
        .with_tag(tag.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;

    #[derive(Debug, PartialEq)]
    struct Spawn {
        x: i32,
        y: i32,
        z: i32,
        name: String,
    }

    impl NbtMapped for Spawn {
        fn to_nbt(&self, name: &str) -> NbtResult<Tag> {
            let mut c = Compound::new();
            c.insert("SpawnX", self.x)?;
            c.insert("SpawnY", self.y)?;
            c.insert("SpawnZ", self.z)?;
            c.insert("LevelName", self.name.as_str())?;
            Ok(Tag::named(name, c))
        }

        fn from_nbt(tag: &Tag) -> NbtResult<Self> {
            let c = root_compound(tag)?;
            Ok(Self {
                x: c.find_int("SpawnX")?,
                y: c.find_int("SpawnY")?,
                z: c.find_int("SpawnZ")?,
                name: c.find_string("LevelName")?.to_owned(),
            })
        }
    }

    #[test]
    fn mapped_type_survives_codec() {
        let spawn = Spawn {
            x: 10,
            y: 64,
            z: -300,
            name: "home".into(),
        };
        let bytes = codec::to_bytes(&spawn.to_nbt("Data").unwrap()).unwrap();
        let back = Spawn::from_nbt(&codec::from_bytes(&bytes).unwrap()).unwrap();
        assert_eq!(back, spawn);
    }

    #[test]
    fn missing_field_is_format_error() {
        let mut c = Compound::new();
        c.insert("SpawnX", 1i32).unwrap();
        let err = Spawn::from_nbt(&Tag::named("Data", c)).unwrap_err();
        assert!(err.is_format_error());
        assert_eq!(err.to_string(), "No tag with the name \"SpawnY\"");
    }

    #[test]
    fn non_compound_rejected() {
        let err = root_compound(&Tag::named("x", 3i32)).unwrap_err();
        assert_eq!(err.tags()[0].name(), Some("x"));
    }
}
