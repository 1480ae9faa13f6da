//! Tree builder
//!
//! Drives a [`TagReader`] and threads each tag into a [`Tree`]: opening tags
//! descend, self-closing tags add a leaf, closing tags climb back up. Any
//! failure drops the partially built tree before the error is returned.

pub mod config;

use std::io::BufRead;

use tracing::{debug, instrument};

pub use config::{ParserConfig, ParsingContext};

use crate::error::{MarkupError, Result, StructureError};
use crate::reader::{Tag, TagKind, TagReader};
use crate::tree::{NodeId, Tree};

/// Builds a [`Tree`] from the tags of one stream
#[derive(Debug)]
pub struct Parser<'r, R> {
    reader: &'r mut TagReader<R>,
    config: ParserConfig,
    context: ParsingContext,
}

impl<'r, R: BufRead> Parser<'r, R> {
    pub fn new(reader: &'r mut TagReader<R>) -> Self {
        Self::with_config(reader, ParserConfig::default())
    }

    pub fn with_config(reader: &'r mut TagReader<R>, config: ParserConfig) -> Self {
        Self {
            reader,
            config,
            context: ParsingContext::new(),
        }
    }

    /// Parse the stream into a tree
    ///
    /// A document made of a single self-closing tag yields a one-node tree
    /// and stops reading there. Otherwise parsing ends when the root's
    /// closing tag is read; anything after it is left in the stream.
    #[instrument(level = "debug", skip(self))]
    pub fn parse(&mut self) -> Result<Tree> {
        let Some(first) = self.reader.read_tag()? else {
            return Err(self.error(StructureError::EmptyDocument));
        };

        match first.kind {
            TagKind::Closing => {
                return Err(self.error(StructureError::UnexpectedClosingTag(first.name)));
            }
            TagKind::SelfClosing => {
                self.check_tag(&first)?;
                debug!(root = %first.name, "parsed single-node document");
                return Ok(Tree::new(first.name, first.attributes));
            }
            TagKind::Opening => {}
        }

        self.check_tag(&first)?;
        self.enter()?;
        let mut tree = Tree::new(first.name, first.attributes);
        let root = tree.root();
        let mut cursor = root;

        loop {
            // Text after any tag belongs to the node the cursor is on
            if let Some(text) = self.reader.read_text()? {
                tree.set_value(cursor, text)?;
            }

            let Some(tag) = self.reader.read_tag()? else {
                return Err(self.error(StructureError::UnterminatedTree));
            };

            match tag.kind {
                TagKind::Opening => {
                    let child = self.add_child(&mut tree, cursor, tag)?;
                    self.enter()?;
                    cursor = child;
                }
                TagKind::SelfClosing => {
                    self.add_child(&mut tree, cursor, tag)?;
                }
                TagKind::Closing => {
                    let open = tree.node(cursor).map(|node| node.name()).unwrap_or_default();
                    if open != tag.name {
                        let err = StructureError::UnbalancedTree {
                            expected: open.to_string(),
                            found: tag.name,
                        };
                        return Err(self.error(err));
                    }
                    self.context.exit_nested();
                    match tree.parent(cursor) {
                        Some(parent) => cursor = parent,
                        None => break,
                    }
                }
            }
        }

        if cursor != root {
            let expected = tree.node(cursor).map(|node| node.name()).unwrap_or_default();
            let found = tree.root_node().map(|node| node.name()).unwrap_or_default();
            let err = StructureError::UnbalancedTree {
                expected: expected.to_string(),
                found: found.to_string(),
            };
            return Err(self.error(err));
        }

        debug!(nodes = tree.len(), "parsed tree");
        Ok(tree)
    }

    fn add_child(&mut self, tree: &mut Tree, parent: NodeId, tag: Tag) -> Result<NodeId> {
        self.check_tag(&tag)?;
        let child = tree.create_node(tag.name, tag.attributes);
        tree.attach_child(parent, child)?;
        Ok(child)
    }

    fn check_tag(&mut self, tag: &Tag) -> Result<()> {
        let position = self.reader.position();
        self.config
            .validate_attributes(tag.attributes.len())
            .and_then(|()| self.context.add_node(&self.config))
            .map_err(|err| err.with_location(position))
    }

    fn enter(&mut self) -> Result<()> {
        let position = self.reader.position();
        self.context
            .enter_nested(&self.config)
            .map_err(|err| err.with_location(position))
    }

    fn error(&self, err: StructureError) -> MarkupError {
        MarkupError::from(err).with_location(self.reader.position())
    }
}
