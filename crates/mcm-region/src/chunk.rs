use mcm_nbt::{root_compound, Compound, NbtMapped, NbtResult, Tag};

/// The root Compound stored in one region slot.
///
/// The container does not interpret chunk contents; callers reach into
/// [`Chunk::data`] with the Compound accessors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chunk {
    name: String,
    data: Compound,
}

impl Chunk {
    /// A chunk whose root tag has the empty name.
    pub fn new(data: Compound) -> Self {
        Self::named("", data)
    }

    pub fn named(name: impl Into<String>, data: Compound) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Name of the root tag.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &Compound {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Compound {
        &mut self.data
    }

    pub fn into_data(self) -> Compound {
        self.data
    }
}

impl NbtMapped for Chunk {
    fn to_nbt(&self, name: &str) -> NbtResult<Tag> {
        Ok(Tag::named(name, self.data.clone()))
    }

    fn from_nbt(tag: &Tag) -> NbtResult<Self> {
        let data = root_compound(tag)?.clone();
        Ok(Self::named(tag.name().unwrap_or(""), data))
    }
}

impl From<Compound> for Chunk {
    fn from(data: Compound) -> Self {
        Self::new(data)
    }
}
