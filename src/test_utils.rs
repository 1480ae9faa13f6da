//! Helpers shared by unit and integration tests

use std::{env, fs, io, path::PathBuf};

use crate::document::MARKUP_HEADER;

pub fn tmp_file_path(name: &str) -> PathBuf {
    let mut dir = env::temp_dir();
    dir.push("tagtree_tests");
    let _ = fs::create_dir_all(&dir);
    dir.push(name);
    dir
}

/// Write `body` under the standard header to a temp file and return its path
pub fn write_markup_file(name: &str, body: &str) -> io::Result<PathBuf> {
    write_raw_file(name, &format!("{MARKUP_HEADER}\n{body}"))
}

/// Write `content` as-is to a temp file and return its path
pub fn write_raw_file(name: &str, content: &str) -> io::Result<PathBuf> {
    let path = tmp_file_path(name);
    fs::write(&path, content)?;
    Ok(path)
}
