use std::fs;
use std::io;
use std::path::Path;

use crate::model::{Entry, TAG_MARKER, TOOL_MARKER};

const HEADER: &str = "project,tags,tools";

/// Reads the whole data file. A missing file is an empty collection, not
/// an error. The leading header record is skipped.
pub fn load(path: &Path) -> io::Result<Vec<Entry>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let mut entries = Vec::new();
    for line in contents.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.splitn(3, ',');
        let project = fields.next().unwrap_or("");
        let tags = fields.next().unwrap_or("");
        let tools = fields.next().unwrap_or("");

        let mut entry = Entry::new(project);
        for tag in split_markers(tags, TAG_MARKER) {
            entry.add_tag(&tag);
        }
        for tool in split_markers(tools, TOOL_MARKER) {
            entry.add_tool(&tool);
        }
        entries.push(entry);
    }
    Ok(entries)
}

/// Writes the header plus one record per entry, truncating any previous
/// contents. Tag and tool tokens are concatenated with no separator; the
/// markers they carry are enough to split them back apart on read.
pub fn save<'a>(path: &Path, entries: impl IntoIterator<Item = &'a Entry>) -> io::Result<()> {
    let mut out = String::from(HEADER);
    out.push('\n');
    for entry in entries {
        out.push_str(entry.project());
        out.push(',');
        for tag in entry.tags() {
            out.push_str(tag);
        }
        out.push(',');
        for tool in entry.tools() {
            out.push_str(tool);
        }
        out.push('\n');
    }
    fs::write(path, out)
}

/// Splits a concatenated token field back into marker-prefixed tokens,
/// dropping fragments with nothing after the marker.
fn split_markers(field: &str, marker: char) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in field.chars() {
        if c == marker {
            if current.len() > 1 {
                tokens.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
            current.push(c);
        } else if !current.is_empty() {
            current.push(c);
        }
    }
    if current.len() > 1 {
        tokens.push(current);
    }
    tokens
}
