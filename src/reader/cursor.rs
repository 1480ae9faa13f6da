//! Byte cursor over a buffered stream

use std::io::{self, BufRead};

use crate::error::{IoError, Location, MarkupError, Result, TagError};

/// Cursor pulling bytes from a buffered stream with position tracking
///
/// Bytes are only consumed from the underlying reader when the cursor
/// advances, so peeking at the current byte never loses input.
#[derive(Debug)]
pub struct Cursor<R> {
    reader: R,
    offset: usize,
    line: usize,
    column: usize,
}

impl<R: BufRead> Cursor<R> {
    /// Create cursor over a buffered reader
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Get current byte without consuming
    pub fn current(&mut self) -> Result<Option<u8>> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.io_error(e)),
            }
        }
    }

    /// Get the character starting at the current byte without consuming
    ///
    /// Yields U+FFFD when the bytes there are not valid UTF-8 or the
    /// character straddles the end of the buffered chunk.
    pub fn current_char(&mut self) -> Result<Option<char>> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().map(|&lead| decode_char(lead, buf))),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.io_error(e)),
            }
        }
    }

    /// Consume the current byte and return it
    pub fn advance(&mut self) -> Result<Option<u8>> {
        let byte = self.current()?;
        if let Some(b) = byte {
            self.reader.consume(1);
            self.offset += 1;
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        Ok(byte)
    }

    /// Skip whitespace
    pub fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(b) = self.current()? {
            if !b.is_ascii_whitespace() {
                break;
            }
            self.advance()?;
        }
        Ok(())
    }

    /// Consume byte if it matches
    pub fn consume(&mut self, expected: u8) -> Result<bool> {
        if self.current()? == Some(expected) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume bytes up to (not including) the first byte matching `stop`
    pub fn take_until<F>(&mut self, stop: F) -> Result<Vec<u8>>
    where
        F: Fn(u8) -> bool,
    {
        let mut bytes = Vec::new();
        while let Some(b) = self.current()? {
            if stop(b) {
                break;
            }
            bytes.push(b);
            self.advance()?;
        }
        Ok(bytes)
    }

    /// Read one line, without its terminator; `None` at end of input
    pub fn read_line(&mut self) -> Result<Option<String>> {
        if self.current()?.is_none() {
            return Ok(None);
        }
        let mut bytes = self.take_until(|b| b == b'\n')?;
        self.consume(b'\n')?;
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        self.decode(bytes).map(Some)
    }

    /// Decode bytes collected from this stream as UTF-8
    pub fn decode(&self, bytes: Vec<u8>) -> Result<String> {
        String::from_utf8(bytes).map_err(|e| {
            MarkupError::from(TagError::InvalidUtf8)
                .with_location(self.position())
                .with_source(e)
        })
    }

    /// Get current position
    pub const fn position(&self) -> Location {
        Location::new(self.line, self.column)
    }

    /// Number of bytes consumed so far
    pub const fn offset(&self) -> usize {
        self.offset
    }

    fn io_error(&self, err: io::Error) -> MarkupError {
        MarkupError::from(IoError::ReadError(err.to_string()))
            .with_location(self.position())
            .with_source(err)
    }
}

fn decode_char(lead: u8, buf: &[u8]) -> char {
    let width = match lead {
        0x00..=0x7f => return char::from(lead),
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return char::REPLACEMENT_CHARACTER,
    };
    buf.get(..width)
        .and_then(|bytes| std::str::from_utf8(bytes).ok())
        .and_then(|s| s.chars().next())
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_basic() -> Result<()> {
        let mut cursor = Cursor::new(&b"hello"[..]);
        assert_eq!(cursor.current()?, Some(b'h'));
        assert_eq!(cursor.advance()?, Some(b'h'));
        assert_eq!(cursor.current()?, Some(b'e'));
        assert_eq!(cursor.offset(), 1);
        Ok(())
    }

    #[test]
    fn test_cursor_whitespace() -> Result<()> {
        let mut cursor = Cursor::new(&b"  \t\nhello"[..]);
        cursor.skip_whitespace()?;
        assert_eq!(cursor.current()?, Some(b'h'));
        assert_eq!(cursor.position(), Location::new(2, 1));
        Ok(())
    }

    #[test]
    fn test_cursor_consume() -> Result<()> {
        let mut cursor = Cursor::new(&b"abc"[..]);
        assert!(cursor.consume(b'a')?);
        assert!(!cursor.consume(b'z')?);
        assert_eq!(cursor.current()?, Some(b'b'));
        Ok(())
    }

    #[test]
    fn test_cursor_eof() -> Result<()> {
        let mut cursor = Cursor::new(&b""[..]);
        assert_eq!(cursor.current()?, None);
        assert_eq!(cursor.advance()?, None);
        Ok(())
    }

    #[test]
    fn test_read_line_strips_terminator() -> Result<()> {
        let mut cursor = Cursor::new(&b"first\r\nsecond"[..]);
        assert_eq!(cursor.read_line()?.as_deref(), Some("first"));
        assert_eq!(cursor.read_line()?.as_deref(), Some("second"));
        assert_eq!(cursor.read_line()?, None);
        Ok(())
    }

    #[test]
    fn test_take_until_small_buffer() -> Result<()> {
        let reader = io::BufReader::with_capacity(2, &b"abcdef<g"[..]);
        let mut cursor = Cursor::new(reader);
        let bytes = cursor.take_until(|b| b == b'<')?;
        assert_eq!(bytes, b"abcdef");
        assert_eq!(cursor.current()?, Some(b'<'));
        Ok(())
    }

    #[test]
    fn test_current_char_decodes_multibyte() -> Result<()> {
        let mut cursor = Cursor::new("é<".as_bytes());
        assert_eq!(cursor.current_char()?, Some('é'));
        assert_eq!(cursor.current()?, Some(0xc3));

        let mut cursor = Cursor::new(&[0xff, b'<'][..]);
        assert_eq!(cursor.current_char()?, Some(char::REPLACEMENT_CHARACTER));
        assert_eq!(Cursor::new(&b""[..]).current_char()?, None);
        Ok(())
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let cursor = Cursor::new(&b""[..]);
        let err = cursor.decode(vec![0xff, 0xfe]).unwrap_err();
        assert!(matches!(err.kind(), crate::error::ErrorKind::Tag(TagError::InvalidUtf8)));
    }
}
