#![allow(clippy::panic_in_result_fn)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]

use std::fs;

use tagtree::{
    error::{ErrorKind, HeaderError, IoError, StructureError},
    load, load_with_config,
    test_utils::{tmp_file_path, write_markup_file, write_raw_file},
    MarkupFile, ParserConfig, Result, MARKUP_HEADER,
};

const LEVEL: &str = r#"<level number="1">
    <name>Green Hills</name>
    <map width="32" height="18" tileset="grass.png">
        <spawn x="2" y="16"/>
        <goal x="30" y="3"/>
    </map>
</level>
"#;

#[test]
fn load_and_query_level() -> Result<()> {
    let path = write_markup_file("level_1.xml", LEVEL).unwrap();

    let level = load(&path)?;
    assert!(!level.is_open());
    assert_eq!(level.header_valid(), Some(true));
    assert_eq!(level.path(), Some(path.as_path()));

    assert_eq!(level.get_value("level:number")?, "1");
    assert_eq!(level.get_value("level/name$")?, "Green Hills");
    assert_eq!(level.get_value("level/map:tileset")?, "grass.png");
    assert_eq!(level.get_value("level/map/goal:x")?, "30");
    assert!(level.get_value("level/map/boss:x").unwrap_err().is_not_found());

    let _ = fs::remove_file(path);
    Ok(())
}

#[test]
fn missing_file() {
    let path = tmp_file_path("does_not_exist.xml");
    let _ = fs::remove_file(&path);

    let err = load(&path).unwrap_err();
    match err.kind() {
        ErrorKind::Io(IoError::FileNotFound(_)) => (),
        other => panic!("Expected file not found, got {:?}", other),
    }
}

#[test]
fn header_mismatch_is_advisory_by_default() -> Result<()> {
    let path =
        write_raw_file("bad_header.xml", "<?xml version=\"1.1\"?>\n<a>1</a>").unwrap();

    let file = load(&path)?;
    assert_eq!(file.header_valid(), Some(false));
    assert_eq!(file.get_value("a$")?, "1");

    let _ = fs::remove_file(path);
    Ok(())
}

#[test]
fn header_mismatch_is_fatal_when_strict() {
    let path = write_raw_file("strict_header.xml", "<a>1</a>\n").unwrap();
    let config = ParserConfig::default().with_strict_header(true);

    let err = MarkupFile::open_with_config(&path, config).unwrap_err();
    match err.kind() {
        ErrorKind::Header(HeaderError::InvalidHeader { expected, found }) => {
            assert_eq!(expected, MARKUP_HEADER);
            assert_eq!(found, "<a>1</a>");
        }
        other => panic!("Expected invalid header, got {:?}", other),
    }

    let _ = fs::remove_file(path);
}

#[test]
fn empty_file_reports_missing_header() -> Result<()> {
    let path = write_raw_file("empty.xml", "").unwrap();

    let mut file = MarkupFile::open(&path)?;
    assert_eq!(file.header_valid(), Some(false));
    let err = file.parse().unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::Structure(StructureError::EmptyDocument)
    );

    let strict = ParserConfig::default().with_strict_header(true);
    let err = MarkupFile::open_with_config(&path, strict).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Header(HeaderError::MissingHeader));

    let _ = fs::remove_file(path);
    Ok(())
}

#[test]
fn crlf_header_is_accepted() -> Result<()> {
    let path = write_raw_file(
        "crlf.xml",
        &format!("{MARKUP_HEADER}\r\n<a>\r\n  <b>2</b>\r\n</a>\r\n"),
    )
    .unwrap();

    let file = load(&path)?;
    assert_eq!(file.header_valid(), Some(true));
    assert_eq!(file.get_value("a/b$")?, "2");

    let _ = fs::remove_file(path);
    Ok(())
}

#[test]
fn failed_parse_keeps_no_tree() -> Result<()> {
    let path = write_markup_file("broken.xml", "<level><map></level>").unwrap();

    let mut file = MarkupFile::open(&path)?;
    let err = file.parse().unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::Structure(StructureError::UnbalancedTree { .. })
    ));
    assert!(err.context().is_some_and(|ctx| ctx.contains("broken.xml")));
    assert!(file.tree().is_none());
    assert!(file.get_value("level$").unwrap_err().is_not_found());

    // load closes the stream and hands back the error
    assert!(load(&path).is_err());

    let _ = fs::remove_file(path);
    Ok(())
}

#[test]
fn close_is_idempotent_and_keeps_tree() -> Result<()> {
    let path = write_markup_file("close.xml", "<a x=\"1\"/>").unwrap();

    let mut file = MarkupFile::open(&path)?;
    assert!(file.is_open());
    file.parse()?;
    file.close();
    file.close();
    assert!(!file.is_open());
    assert_eq!(file.get_value("a:x")?, "1");

    // parsing needs an open stream
    let err = file.parse().unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Io(IoError::NotOpen));

    let _ = fs::remove_file(path);
    Ok(())
}

#[test]
fn reopen_after_close() -> Result<()> {
    let path = write_markup_file("reopen.xml", "<a>first</a>").unwrap();

    let mut file = MarkupFile::new();
    file.set_path(&path);
    file.open_stream()?;
    file.close();
    file.open_stream()?;
    assert!(file.check_header()?);
    file.parse()?;
    assert_eq!(file.get_value("a$")?, "first");

    let tree = file.take_tree().expect("tree");
    assert_eq!(tree.len(), 1);
    assert!(file.tree().is_none());

    let _ = fs::remove_file(path);
    Ok(())
}

#[test]
fn depth_limit_from_config() {
    let path = write_markup_file("deep.xml", "<a><b><c><d/></c></b></a>").unwrap();
    let config = ParserConfig::default().with_max_depth(2);

    assert!(load_with_config(&path, config).is_err());
    assert!(load(&path).is_ok());

    let _ = fs::remove_file(path);
}

#[test]
fn header_is_checked_once_per_stream() -> Result<()> {
    let path = write_markup_file("header_once.xml", "<a>\n<b>2</b>\n</a>").unwrap();

    let mut file = MarkupFile::open(&path)?;
    let err = file.check_header().unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Header(HeaderError::AlreadyChecked));
    assert_eq!(file.header_valid(), Some(true));
    // the refused check left the body unread
    file.parse()?;
    assert_eq!(file.get_value("a/b$")?, "2");

    // a fresh stream gets a fresh check
    file.close();
    file.open_stream()?;
    assert!(file.check_header()?);

    let _ = fs::remove_file(path);
    Ok(())
}
