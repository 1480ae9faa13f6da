//! Raw tags produced by the tag reader

use std::fmt;

/// The three tag shapes the reader recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `<name ...>`
    Opening,
    /// `</name>`
    Closing,
    /// `<name .../>`
    SelfClosing,
}

/// A `name="value"` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One `<...>` token, before it is folded into the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub kind: TagKind,
    pub name: String,
    /// Attributes in the order they appear in the tag
    pub attributes: Vec<Attribute>,
}

impl Tag {
    pub fn new(kind: TagKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            attributes: Vec::new(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TagKind::Closing => write!(f, "</{}", self.name)?,
            TagKind::Opening | TagKind::SelfClosing => write!(f, "<{}", self.name)?,
        }
        for attr in &self.attributes {
            write!(f, " {}=\"{}\"", attr.name, attr.value)?;
        }
        match self.kind {
            TagKind::SelfClosing => write!(f, "/>"),
            TagKind::Opening | TagKind::Closing => write!(f, ">"),
        }
    }
}
