//! Markdown export of every document.

use crate::db::DocumentRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Write each document to `<dir>/<name>.md` and return `dir`.
///
/// Snippets are separated by blank lines under a `# name` heading. Reserved
/// characters in document names are percent-escaped, so every file lands in
/// `dir` and distinct names never share a file.
///
/// # Errors
///
/// Returns an `io::Error` if the directory or a file cannot be written.
pub fn write_documents(dir: &Path, documents: &[DocumentRecord]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    for document in documents {
        let body = render_document(document);
        fs::write(dir.join(file_name(&document.name)), body)?;
    }

    Ok(dir.to_path_buf())
}

fn render_document(document: &DocumentRecord) -> String {
    let mut out = format!("# {}\n", document.name);
    for snippet in &document.snippets {
        out.push('\n');
        out.push_str(snippet.text.trim_end());
        out.push('\n');
    }
    out
}

/// `<name>.md` with `%`, path separators, characters Windows rejects and
/// control characters written as `%XX` (one escape per UTF-8 byte).
fn file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 3);
    for c in name.chars() {
        if matches!(c, '%' | '/' | '\\' | ':' | '<' | '>' | '"' | '|' | '?' | '*') || c.is_control() {
            let mut buf = [0; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        } else {
            out.push(c);
        }
    }
    out.push_str(".md");
    out
}
