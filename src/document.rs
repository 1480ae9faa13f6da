//! Markup file handle
//!
//! [`MarkupFile`] owns the open stream of a file and, once parsed, its tree.
//! The usual lifecycle is open → header check → parse → close, which
//! [`load`] runs in one call. Closing keeps the tree; dropping the handle
//! releases both.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::error::{HeaderError, IoError, Location, MarkupError, QueryError, Result};
use crate::parser::{Parser, ParserConfig};
use crate::query;
use crate::reader::TagReader;
use crate::tree::Tree;

/// Required first line of every markup file
pub const MARKUP_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Handle over one markup file and its parsed tree
#[derive(Debug, Default)]
pub struct MarkupFile {
    path: Option<PathBuf>,
    reader: Option<TagReader<BufReader<File>>>,
    root: Option<Tree>,
    header_valid: Option<bool>,
    header_checked: bool,
    config: ParserConfig,
}

impl MarkupFile {
    /// Create an empty handle with no path, stream or tree
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            path: None,
            reader: None,
            root: None,
            header_valid: None,
            header_checked: false,
            config,
        }
    }

    /// Open `path` and check its header
    ///
    /// A header mismatch is only logged and recorded in
    /// [`header_valid`](Self::header_valid), unless the default config is
    /// replaced by one with `strict_header` set.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, ParserConfig::default())
    }

    #[instrument(skip(path, config), fields(path = %path.as_ref().display()))]
    pub fn open_with_config(path: impl AsRef<Path>, config: ParserConfig) -> Result<Self> {
        let mut file = Self::with_config(config);
        file.set_path(path);
        file.open_stream()?;
        file.check_header()?;
        Ok(file)
    }

    /// Assign or replace the file path
    pub fn set_path(&mut self, path: impl AsRef<Path>) {
        self.path = Some(path.as_ref().to_path_buf());
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Open a stream on the current path
    pub fn open_stream(&mut self) -> Result<()> {
        if self.reader.is_some() {
            return Err(IoError::AlreadyOpen.into());
        }
        let path = self.path.as_deref().ok_or(IoError::NoPath)?;
        let file = File::open(path).map_err(|e| io_error(path, e))?;
        self.reader = Some(TagReader::new(BufReader::new(file)));
        self.header_checked = false;
        debug!(path = %path.display(), "opened stream");
        Ok(())
    }

    /// Read the first line and compare it with [`MARKUP_HEADER`]
    ///
    /// Must run right after [`open_stream`](Self::open_stream), before
    /// parsing. Returns whether the header matched. Fails on a read error,
    /// on a mismatch when the config asks for a strict header, or when the
    /// header of the current stream was already checked.
    pub fn check_header(&mut self) -> Result<bool> {
        let reader = self.reader.as_mut().ok_or(IoError::NotOpen)?;
        if self.header_checked {
            return Err(HeaderError::AlreadyChecked.into());
        }
        self.header_checked = true;
        let line = reader.read_line()?;

        let mismatch = match line {
            Some(line) if line == MARKUP_HEADER => None,
            Some(found) => Some(HeaderError::InvalidHeader {
                expected: MARKUP_HEADER.to_string(),
                found,
            }),
            None => Some(HeaderError::MissingHeader),
        };
        self.header_valid = Some(mismatch.is_none());

        match mismatch {
            None => Ok(true),
            Some(err) if self.config.strict_header => {
                Err(MarkupError::from(err).with_location(Location::new(1, 1)))
            }
            Some(err) => {
                warn!(path = ?self.path, "{}", err);
                Ok(false)
            }
        }
    }

    /// Outcome of the last header check, `None` if none ran
    pub fn header_valid(&self) -> Option<bool> {
        self.header_valid
    }

    /// Parse the open stream and keep the tree
    ///
    /// On failure no tree is kept, including one from an earlier parse.
    pub fn parse(&mut self) -> Result<&Tree> {
        self.root = None;
        let reader = self.reader.as_mut().ok_or(IoError::NotOpen)?;
        let tree = Parser::with_config(reader, self.config.clone())
            .parse()
            .map_err(|err| match &self.path {
                Some(path) => err.with_context(format!("while parsing {}", path.display())),
                None => err,
            })?;
        Ok(self.root.insert(tree))
    }

    /// Close the stream if one is open; the tree is kept
    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!(path = ?self.path, "closed stream");
        }
    }

    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    pub fn tree(&self) -> Option<&Tree> {
        self.root.as_ref()
    }

    /// Move the tree out of the handle
    pub fn take_tree(&mut self) -> Option<Tree> {
        self.root.take()
    }

    /// Run a path query against the parsed tree
    ///
    /// A handle without a tree finds nothing.
    pub fn get_value(&self, path: &str) -> Result<&str> {
        match &self.root {
            Some(tree) => query::get_value(path, tree),
            None => Err(QueryError::NotFound(path.to_string()).into()),
        }
    }
}

impl Drop for MarkupFile {
    fn drop(&mut self) {
        self.close();
    }
}

/// Open, check, parse and close `path`, returning the parsed handle
pub fn load(path: impl AsRef<Path>) -> Result<MarkupFile> {
    load_with_config(path, ParserConfig::default())
}

#[instrument(skip(path, config), fields(path = %path.as_ref().display()))]
pub fn load_with_config(path: impl AsRef<Path>, config: ParserConfig) -> Result<MarkupFile> {
    let mut file = MarkupFile::open_with_config(path, config)?;
    let nodes = file.parse()?.len();
    file.close();
    debug!(nodes, "loaded markup file");
    Ok(file)
}

fn io_error(path: &Path, err: io::Error) -> MarkupError {
    let kind = match err.kind() {
        io::ErrorKind::NotFound => IoError::FileNotFound(path.display().to_string()),
        io::ErrorKind::PermissionDenied => IoError::PermissionDenied(path.display().to_string()),
        _ => IoError::ReadError(err.to_string()),
    };
    MarkupError::from(kind).with_source(err)
}
