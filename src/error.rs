//! Error handling types for the markup engine
//!
//! Every failure is reported as a [`MarkupError`]: a categorised kind, the
//! stream location where it was detected (when known), optional context and
//! an optional underlying source error.

use std::{error::Error as StdError, fmt};

use thiserror::Error;

/// Main error type for loading, parsing and querying markup
#[derive(Debug)]
pub struct MarkupError {
    /// The specific kind of error
    kind: ErrorKind,
    /// Location where the error occurred
    location: Option<Location>,
    /// Source error that caused this error
    source: Option<Box<dyn StdError + Send + Sync>>,
    /// Additional context for the error
    context: Option<String>,
}

/// Represents a location in the input stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
}

impl Location {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Top-level error categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Io(IoError),
    Header(HeaderError),
    Tag(TagError),
    Structure(StructureError),
    Security(SecurityError),
    Query(QueryError),
}

/// Stream and file lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Read error: {0}")]
    ReadError(String),
    #[error("No file path set")]
    NoPath,
    #[error("No stream is open")]
    NotOpen,
    #[error("A stream is already open")]
    AlreadyOpen,
}

/// First-line header check failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("Invalid header: expected '{expected}', found '{found}'")]
    InvalidHeader { expected: String, found: String },
    #[error("Missing header line")]
    MissingHeader,
    #[error("Header of this stream was already checked")]
    AlreadyChecked,
}

/// Malformed tag errors raised by the tag reader
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("Expected '<' but found '{0}'")]
    MissingOpenBracket(char),
    #[error("Tag has an empty name")]
    EmptyName,
    #[error("Unexpected character '{0}' in tag")]
    UnexpectedCharacter(char),
    #[error("Missing '=' after attribute '{0}'")]
    MissingEquals(String),
    #[error("Value of attribute '{0}' is not quoted")]
    UnquotedValue(String),
    #[error("Value of attribute '{0}' is not terminated")]
    UnterminatedValue(String),
    #[error("Unexpected end of input inside a tag")]
    UnexpectedEof,
    #[error("Invalid UTF-8 in markup")]
    InvalidUtf8,
}

/// Tree structure errors raised by the tree builder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("Document contains no tag")]
    EmptyDocument,
    #[error("Document starts with closing tag '</{0}>'")]
    UnexpectedClosingTag(String),
    #[error("Input ended before the root element was closed")]
    UnterminatedTree,
    #[error("Closing tag '</{found}>' does not match open element '{expected}'")]
    UnbalancedTree { expected: String, found: String },
    #[error("Node cannot be attached at this position")]
    InvalidAttachment,
}

/// Resource limit errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityError {
    #[error("Maximum nesting depth exceeded")]
    MaxDepthExceeded,
    #[error("Maximum number of nodes exceeded")]
    MaxNodesExceeded,
    #[error("Maximum number of attributes exceeded")]
    MaxAttributesExceeded,
}

/// Path query errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Nothing found for query '{0}'")]
    NotFound(String),
    #[error("Malformed query '{path}': {reason}")]
    Malformed { path: String, reason: String },
}

impl MarkupError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            location: None,
            source: None,
            context: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// True for a query that was well formed but matched nothing
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::Query(QueryError::NotFound(_)))
    }

    pub fn is_malformed_tag(&self) -> bool {
        matches!(self.kind, ErrorKind::Tag(_))
    }
}

impl From<IoError> for MarkupError {
    fn from(err: IoError) -> Self {
        Self::new(ErrorKind::Io(err))
    }
}

impl From<HeaderError> for MarkupError {
    fn from(err: HeaderError) -> Self {
        Self::new(ErrorKind::Header(err))
    }
}

impl From<TagError> for MarkupError {
    fn from(err: TagError) -> Self {
        Self::new(ErrorKind::Tag(err))
    }
}

impl From<StructureError> for MarkupError {
    fn from(err: StructureError) -> Self {
        Self::new(ErrorKind::Structure(err))
    }
}

impl From<SecurityError> for MarkupError {
    fn from(err: SecurityError) -> Self {
        Self::new(ErrorKind::Security(err))
    }
}

impl From<QueryError> for MarkupError {
    fn from(err: QueryError) -> Self {
        Self::new(ErrorKind::Query(err))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => fmt::Display::fmt(err, f),
            Self::Header(err) => fmt::Display::fmt(err, f),
            Self::Tag(err) => fmt::Display::fmt(err, f),
            Self::Structure(err) => fmt::Display::fmt(err, f),
            Self::Security(err) => fmt::Display::fmt(err, f),
            Self::Query(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl fmt::Display for MarkupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(loc) = &self.location {
            write!(f, "at line {}, column {}: {}", loc.line, loc.column, self.kind)?;
        } else {
            write!(f, "Error: {}", self.kind)?;
        }

        if let Some(ctx) = &self.context {
            write!(f, "\nContext: {}", ctx)?;
        }

        if let Some(source) = &self.source {
            write!(f, "\nCaused by: {}", source)?;
        }

        Ok(())
    }
}

impl StdError for MarkupError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.source {
            Some(source) => Some(&**source),
            None => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MarkupError>;
