//! Streaming tag reader
//!
//! [`TagReader`] pulls one `<...>` tag at a time off a buffered stream, along
//! with the raw text found between tags. It knows nothing about nesting; the
//! tree builder in [`crate::parser`] decides what a tag means structurally.

pub mod cursor;
pub mod tag;

use std::io::BufRead;

use tracing::trace;

pub use cursor::Cursor;
pub use tag::{Attribute, Tag, TagKind};

use crate::error::{Location, MarkupError, Result, TagError};

/// Reads tags and inter-tag text from a stream
#[derive(Debug)]
pub struct TagReader<R> {
    cursor: Cursor<R>,
}

impl<R: BufRead> TagReader<R> {
    pub const fn new(reader: R) -> Self {
        Self {
            cursor: Cursor::new(reader),
        }
    }

    /// Read the next tag, or `None` once only whitespace is left
    ///
    /// A tag cut off by the end of input is an error, never dropped.
    pub fn read_tag(&mut self) -> Result<Option<Tag>> {
        self.cursor.skip_whitespace()?;
        match self.cursor.current()? {
            None => return Ok(None),
            Some(b'<') => {
                self.cursor.advance()?;
            }
            Some(_) => {
                let found = self.found_char()?;
                return Err(self.error(TagError::MissingOpenBracket(found)));
            }
        }

        let closing = self.cursor.consume(b'/')?;
        let name = self.read_name()?;

        if closing {
            self.cursor.skip_whitespace()?;
            self.expect_byte(b'>')?;
            let tag = Tag::new(TagKind::Closing, name);
            trace!(%tag, "read tag");
            return Ok(Some(tag));
        }

        let mut tag = Tag::new(TagKind::Opening, name);
        loop {
            self.cursor.skip_whitespace()?;
            match self.cursor.current()? {
                None => return Err(self.error(TagError::UnexpectedEof)),
                Some(b'>') => {
                    self.cursor.advance()?;
                    break;
                }
                Some(b'/') => {
                    self.cursor.advance()?;
                    self.expect_byte(b'>')?;
                    tag.kind = TagKind::SelfClosing;
                    break;
                }
                Some(_) => {
                    let attr = self.read_attribute()?;
                    tag.attributes.push(attr);
                }
            }
        }

        trace!(%tag, "read tag");
        Ok(Some(tag))
    }

    /// Read the raw text up to the next `<`, trimmed
    ///
    /// Returns `None` when there is nothing but whitespace before the next
    /// tag or the end of input.
    pub fn read_text(&mut self) -> Result<Option<String>> {
        let bytes = self.cursor.take_until(|b| b == b'<')?;
        let text = self.cursor.decode(bytes)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(trimmed.to_string()))
        }
    }

    /// Read one raw line, used for the file header
    pub fn read_line(&mut self) -> Result<Option<String>> {
        self.cursor.read_line()
    }

    pub fn position(&self) -> Location {
        self.cursor.position()
    }

    fn read_name(&mut self) -> Result<String> {
        let bytes = self.cursor.take_until(is_delimiter)?;
        if bytes.is_empty() {
            return Err(match self.cursor.current()? {
                None => self.error(TagError::UnexpectedEof),
                Some(b) if b.is_ascii_whitespace() || b == b'>' || b == b'/' => {
                    self.error(TagError::EmptyName)
                }
                Some(_) => {
                    let found = self.found_char()?;
                    self.error(TagError::UnexpectedCharacter(found))
                }
            });
        }
        self.cursor.decode(bytes)
    }

    fn read_attribute(&mut self) -> Result<Attribute> {
        let name = self.read_name()?;

        self.cursor.skip_whitespace()?;
        match self.cursor.current()? {
            Some(b'=') => {
                self.cursor.advance()?;
            }
            Some(_) => return Err(self.error(TagError::MissingEquals(name))),
            None => return Err(self.error(TagError::UnexpectedEof)),
        }

        self.cursor.skip_whitespace()?;
        let quote = match self.cursor.current()? {
            Some(q @ (b'"' | b'\'')) => q,
            Some(_) => return Err(self.error(TagError::UnquotedValue(name))),
            None => return Err(self.error(TagError::UnexpectedEof)),
        };
        self.cursor.advance()?;

        let bytes = self.cursor.take_until(|b| b == quote)?;
        if !self.cursor.consume(quote)? {
            return Err(self.error(TagError::UnterminatedValue(name)));
        }
        let value = self.cursor.decode(bytes)?;

        Ok(Attribute { name, value })
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        match self.cursor.current()? {
            Some(b) if b == expected => {
                self.cursor.advance()?;
                Ok(())
            }
            Some(_) => {
                let found = self.found_char()?;
                Err(self.error(TagError::UnexpectedCharacter(found)))
            }
            None => Err(self.error(TagError::UnexpectedEof)),
        }
    }

    fn found_char(&mut self) -> Result<char> {
        Ok(self
            .cursor
            .current_char()?
            .unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn error(&self, err: TagError) -> MarkupError {
        MarkupError::from(err).with_location(self.cursor.position())
    }
}

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'<' | b'>' | b'/' | b'=' | b'"' | b'\'')
}
