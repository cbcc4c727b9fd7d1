use thiserror::Error;

use crate::tag::Tag;
use crate::types::TagType;

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Malformed or structurally invalid NBT data.
///
/// Carries copies of the offending tag(s), if any, so callers can print the
/// surrounding structure when a lookup or decode fails.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FormatError {
    message: String,
    #[source]
    source: Option<BoxedCause>,
    tags: Vec<Tag>,
}

impl FormatError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
            tags: Vec::new(),
        }
    }

    /// Attach the error that caused this one.
    pub fn with_source(mut self, source: impl Into<BoxedCause>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach a tag that was malformed or that the failing lookup ran against.
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The tag(s) involved in the failure, in the order they were attached.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }
}

/// A List was handed an element it cannot hold.
///
/// This is an API-usage error, distinct from [`FormatError`] which signals bad
/// external data.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TypeMismatchError {
    #[error("{required} required, given {given}")]
    WrongType { required: TagType, given: TagType },

    #[error("tags in lists must have no name; given tag had name \"{0}\"")]
    NamedElement(String),

    #[error("End tags cannot be list elements")]
    EndElement,
}

/// Errors from tag operations and the codec.
#[derive(Debug, Error)]
pub enum NbtError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatchError),

    /// A precondition on the API was violated (unnamed compound child, End
    /// inserted by hand, oversized name, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NbtError {
    /// Whether this error describes malformed data rather than misuse or I/O.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}

pub type NbtResult<T> = Result<T, NbtError>;
