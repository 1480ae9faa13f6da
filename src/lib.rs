//! tagtree: a small streaming markup parser for map and level data
//!
//! This crate provides functionality to:
//! - Read `<tag attr="value">` markup one tag at a time from any stream
//! - Build a linked node tree with names, text values and attributes
//! - Load markup files that start with a fixed header line
//! - Extract values and attributes with a compact path query language
//!
//! # Examples
//! ```no_run
//! use tagtree::{load, Result};
//!
//! fn example() -> Result<()> {
//!     let level = load("levels/forest.xml")?;
//!     let width = level.get_value("map:width")?;
//!     let name = level.get_value("map/name$")?;
//!     println!("{name}: {width} tiles wide");
//!     Ok(())
//! }
//! ```
//!
//! No entity decoding, comments, CDATA or namespaces are recognised; such
//! constructs are read as ordinary tags or text.

pub mod document;
pub mod error;
pub mod parser;
pub mod query;
pub mod reader;
pub mod test_utils;
pub mod tree;
pub mod utils;

// Re-exports
pub use document::{load, load_with_config, MarkupFile, MARKUP_HEADER};
pub use error::{ErrorKind, MarkupError, Result};
pub use parser::{Parser, ParserConfig};
pub use query::{get_value, lookup, Query, Target};
pub use reader::{Attribute, Tag, TagKind, TagReader};
pub use tree::{Node, NodeId, Tree};
pub use utils::{parse_reader, parse_str, parse_str_with_config};
