//! Path queries over a parsed tree
//!
//! A query is a `/`-separated list of node names ending either in `$`, which
//! selects the text value of the last node, or in `:name`, which selects one
//! of its attributes. The first name must be the root's own name:
//!
//! ```text
//! map/layer/tile$      value of the first <tile> in the first <layer>
//! map/tileset:source   "source" attribute of the first <tileset>
//! ```
//!
//! Where several siblings share a name, the first one wins. Nodes or
//! attributes whose names contain `:` or `$` parse fine but cannot be
//! addressed.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{MarkupError, QueryError, Result};
use crate::tree::Tree;

/// What a query selects on its final node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `$`
    Value,
    /// `:name`
    Attribute(String),
}

/// A compiled path query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    source: String,
    segments: Vec<String>,
    target: Target,
}

impl Query {
    pub fn parse(path: &str) -> Result<Self> {
        let malformed = |reason: &str| {
            MarkupError::from(QueryError::Malformed {
                path: path.to_string(),
                reason: reason.to_string(),
            })
        };

        let mut segments = Vec::new();
        let mut rest = path;
        loop {
            let Some(end) = rest.find(['/', '$', ':']) else {
                return Err(malformed("missing '$' or ':' terminator"));
            };
            let (segment, tail) = rest.split_at(end);
            if segment.is_empty() {
                return Err(malformed("empty node name"));
            }
            segments.push(segment.to_string());

            let mut chars = tail.chars();
            let delimiter = chars.next();
            let after = chars.as_str();
            let target = match delimiter {
                Some('/') => {
                    rest = after;
                    continue;
                }
                Some('$') if after.is_empty() => Target::Value,
                Some('$') => return Err(malformed("unexpected text after '$'")),
                Some(':') if after.is_empty() => return Err(malformed("empty attribute name")),
                Some(':') if after.contains(['/', '$', ':']) => {
                    return Err(malformed("invalid attribute name"));
                }
                Some(':') => Target::Attribute(after.to_string()),
                _ => return Err(malformed("unexpected delimiter")),
            };

            return Ok(Self {
                source: path.to_string(),
                segments,
                target,
            });
        }
    }

    /// Node names from the root down
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Evaluate against `tree` without modifying it
    pub fn resolve<'t>(&self, tree: &'t Tree) -> Result<&'t str> {
        let not_found = || MarkupError::from(QueryError::NotFound(self.source.clone()));

        let mut segments = self.segments.iter();
        let root = tree.root();
        let root_name = tree.node(root).map(|node| node.name());
        if segments.next().map(String::as_str) != root_name {
            return Err(not_found());
        }

        let mut current = root;
        for segment in segments {
            current = tree
                .find_child_by_name(current, segment)
                .ok_or_else(not_found)?;
        }

        let node = tree.node(current).ok_or_else(not_found)?;
        let found = match &self.target {
            Target::Value => node.value(),
            Target::Attribute(name) => node.attribute(name),
        };
        found.ok_or_else(not_found)
    }
}

impl FromStr for Query {
    type Err = MarkupError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parse `path` and resolve it against `tree`
///
/// A well-formed path that matches nothing yields a
/// [`QueryError::NotFound`] error, a malformed one [`QueryError::Malformed`].
pub fn get_value<'t>(path: &str, tree: &'t Tree) -> Result<&'t str> {
    Query::parse(path)?.resolve(tree)
}

/// Like [`get_value`], folding every failure into `None`
pub fn lookup<'t>(path: &str, tree: &'t Tree) -> Option<&'t str> {
    match get_value(path, tree) {
        Ok(value) => Some(value),
        Err(err) if err.is_not_found() => None,
        Err(err) => {
            debug!(%err, "ignoring malformed query");
            None
        }
    }
}
