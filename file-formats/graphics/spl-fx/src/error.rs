use std::io;
use thiserror::Error;

use spl_tex::TextureError;

/// Error types for SPL archive parsing and simulation setup
#[derive(Error, Debug)]
pub enum SplError {
    /// I/O error while reading an archive from disk
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid magic in the file or texture header
    #[error("Invalid magic: expected '{expected}', got '{actual}'")]
    InvalidMagic { expected: String, actual: String },

    /// Archive version this library does not read
    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),

    /// A read ran past the end of the available data
    #[error("Unexpected end of data: wanted {wanted} bytes at offset {offset}")]
    UnexpectedEof { offset: usize, wanted: usize },

    /// A block declared by the header lies outside of the file
    #[error("{what} at offset {offset} with size {size} exceeds the file size {file_size}")]
    OutOfBounds {
        what: &'static str,
        offset: usize,
        size: usize,
        file_size: usize,
    },

    /// A bitfield holds a value outside of its enumeration
    #[error("Invalid value {value} for {field}")]
    InvalidEnum { field: &'static str, value: u32 },

    /// A resource refers to a texture that does not exist
    #[error("Resource {resource} refers to texture {index}, but the archive has {count} textures")]
    TextureIndexOutOfRange {
        resource: usize,
        index: usize,
        count: usize,
    },

    /// Texture data could not be decoded
    #[error("Texture {index}: {source}")]
    Texture {
        index: usize,
        #[source]
        source: TextureError,
    },

    /// Emitter spawn request for a resource that does not exist
    #[error("Resource index {index} out of range, the archive has {count} resources")]
    InvalidResourceIndex { index: usize, count: usize },

    /// A resource's flags disagree with its attached components
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Error annotated with the structure being parsed
    #[error("{0}: {1}")]
    Context(String, Box<Self>),
}

impl SplError {
    /// Add context information to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::Context(context.into(), Box::new(self))
    }

    /// The innermost error, with all context layers removed
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Context(_, inner) => inner.root_cause(),
            other => other,
        }
    }
}

/// Result type using SplError
pub type Result<T> = std::result::Result<T, SplError>;
