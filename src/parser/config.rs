use std::fmt;

use crate::error::{MarkupError, Result, SecurityError};

/// Maximum nesting depth (64), well past any map or level layout
pub const DEFAULT_MAX_DEPTH: usize = 64;
/// Maximum node count (100K) for a single document
pub const DEFAULT_MAX_NODES: usize = 100_000;
/// Maximum attributes (256) on one tag
pub const DEFAULT_MAX_ATTRIBUTES: usize = 256;

/// Configuration for parser limits and validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum nesting depth of opening tags
    pub max_depth: usize,
    /// Maximum number of nodes in one tree
    pub max_nodes: usize,
    /// Maximum number of attributes on one tag
    pub max_attributes: usize,
    /// Reject files whose first line is not the expected header
    pub strict_header: bool,
}

/// Tracks nesting depth and node count during parsing
#[derive(Debug)]
pub struct ParsingContext {
    current_depth: usize,
    node_count: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
            max_attributes: DEFAULT_MAX_ATTRIBUTES,
            strict_header: false,
        }
    }
}

impl fmt::Display for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ParserConfig {{ max_depth: {}, max_nodes: {}, max_attributes: {}, strict_header: {} }}",
            self.max_depth, self.max_nodes, self.max_attributes, self.strict_header
        )
    }
}

impl ParserConfig {
    pub fn with_strict_header(mut self, strict: bool) -> Self {
        self.strict_header = strict;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn validate_attributes(&self, count: usize) -> Result<()> {
        if count > self.max_attributes {
            return Err(MarkupError::from(SecurityError::MaxAttributesExceeded));
        }
        Ok(())
    }
}

impl Default for ParsingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ParsingContext {
    pub fn new() -> Self {
        Self {
            current_depth: 0,
            node_count: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.current_depth
    }

    pub fn enter_nested(&mut self, config: &ParserConfig) -> Result<()> {
        self.current_depth += 1;
        if self.current_depth > config.max_depth {
            return Err(MarkupError::from(SecurityError::MaxDepthExceeded));
        }
        Ok(())
    }

    pub fn exit_nested(&mut self) {
        if self.current_depth > 0 {
            self.current_depth -= 1;
        }
    }

    pub fn add_node(&mut self, config: &ParserConfig) -> Result<()> {
        self.node_count += 1;
        if self.node_count > config.max_nodes {
            return Err(MarkupError::from(SecurityError::MaxNodesExceeded));
        }
        Ok(())
    }
}
