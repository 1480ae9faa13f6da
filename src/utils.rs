use std::io::BufRead;

use crate::{
    error::Result,
    parser::{Parser, ParserConfig},
    reader::TagReader,
    tree::Tree,
};

/// Parse markup held in memory; no header line is expected
pub fn parse_str(content: &str) -> Result<Tree> {
    parse_str_with_config(content, ParserConfig::default())
}

pub fn parse_str_with_config(content: &str, config: ParserConfig) -> Result<Tree> {
    parse_reader_with_config(content.as_bytes(), config)
}

/// Parse markup from any buffered stream; no header line is expected
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Tree> {
    parse_reader_with_config(reader, ParserConfig::default())
}

pub fn parse_reader_with_config<R: BufRead>(reader: R, config: ParserConfig) -> Result<Tree> {
    let mut reader = TagReader::new(reader);
    Parser::with_config(&mut reader, config).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    #[test]
    fn test_parse_str() -> Result<()> {
        let tree = parse_str("<a><b/></a>")?;
        assert_eq!(tree.len(), 2);
        Ok(())
    }

    #[test]
    fn test_parse_reader_with_tiny_buffer() -> Result<()> {
        let input = Cursor::new(r#"<map width="40"><name>Forest</name></map>"#);
        let tree = parse_reader(BufReader::with_capacity(3, input))?;
        let name = tree.find_child_by_name(tree.root(), "name");
        assert_eq!(name.and_then(|id| tree.node(id)).and_then(|n| n.value()), Some("Forest"));
        assert_eq!(tree.root_node().and_then(|n| n.attribute("width")), Some("40"));
        Ok(())
    }
}
