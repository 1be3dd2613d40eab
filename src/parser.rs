use std::fmt;

use crate::model::{Entry, TAG_MARKER, TOOL_MARKER};

/// Characters that would corrupt the delimited record format. Rejected
/// everywhere in project, tag, and tool text.
const DISALLOWED: [char; 2] = [',', '"'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("expect project name")]
    EmptyProject,
    #[error("expect project name before tags or tools")]
    MissingProjectBeforeMarker,
    #[error("project text must come first")]
    ProjectNotFirst,
    #[error("expect tag name")]
    TagEmpty,
    #[error("expect tool name")]
    ToolEmpty,
    #[error("character {0:?} is not allowed")]
    InvalidCharacter(char),
}

/// A positioned parse failure. `position` is the char offset into the
/// trimmed input; `offset` is the caller's display offset (the prompt
/// columns preceding the input field on screen).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: usize,
    pub offset: usize,
}

impl fmt::Display for ParseError {
    // Rendered as a caret aligned under the offending column. This is the
    // only error channel to the user, so the shape is load-bearing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}^ {}",
            " ".repeat(self.offset + self.position),
            self.kind
        )
    }
}

impl std::error::Error for ParseError {}

/// Single-pass scanner over the annotation mini-language: project text
/// first, then interleaved `#tag` and `&tool` tokens. The grammar has no
/// nesting and no backtracking, so one cursor is all the state needed.
pub struct Parser {
    chars: Vec<char>,
    i: usize,
    offset: usize,
}

impl Parser {
    pub fn new(text: &str, offset: usize) -> Self {
        Self {
            chars: text.trim().chars().collect(),
            i: 0,
            offset,
        }
    }

    pub fn parse(mut self) -> Result<Entry, ParseError> {
        if self.chars.is_empty() {
            return Err(self.error(ParseErrorKind::EmptyProject));
        }

        let mut entry: Option<Entry> = None;
        while let Some(&c) = self.chars.get(self.i) {
            match c {
                TAG_MARKER => {
                    if entry.is_none() {
                        return Err(self.error(ParseErrorKind::MissingProjectBeforeMarker));
                    }
                    let tag = self.annotation(ParseErrorKind::TagEmpty)?;
                    if let Some(entry) = entry.as_mut() {
                        entry.add_tag(&tag);
                    }
                }
                TOOL_MARKER => {
                    if entry.is_none() {
                        return Err(self.error(ParseErrorKind::MissingProjectBeforeMarker));
                    }
                    let tool = self.annotation(ParseErrorKind::ToolEmpty)?;
                    if let Some(entry) = entry.as_mut() {
                        entry.add_tool(&tool);
                    }
                }
                c if c.is_whitespace() => self.i += 1,
                _ => {
                    if entry.is_some() || self.i > 0 {
                        return Err(self.error(ParseErrorKind::ProjectNotFirst));
                    }
                    let project = self.project()?;
                    entry = Some(Entry::new(&project));
                }
            }
        }

        entry.ok_or_else(|| self.error(ParseErrorKind::EmptyProject))
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            position: self.i,
            offset: self.offset,
        }
    }

    /// Consumes a marker plus its name, up to whitespace, another marker,
    /// or end of input. The marker itself is kept in the token.
    fn annotation(&mut self, empty: ParseErrorKind) -> Result<String, ParseError> {
        let mut token = String::new();
        token.push(self.chars[self.i]);
        self.i += 1;
        while let Some(&c) = self.chars.get(self.i) {
            if c.is_whitespace() || c == TAG_MARKER || c == TOOL_MARKER {
                break;
            }
            self.allowed(c)?;
            token.push(c);
            self.i += 1;
        }
        if token.chars().count() < 2 {
            return Err(self.error(empty));
        }
        Ok(token)
    }

    /// Consumes project text from the start of the scan up to the first
    /// marker or newline, right-trimmed.
    fn project(&mut self) -> Result<String, ParseError> {
        let mut text = String::new();
        while let Some(&c) = self.chars.get(self.i) {
            if c == TAG_MARKER || c == TOOL_MARKER || c == '\n' {
                break;
            }
            self.allowed(c)?;
            text.push(c);
            self.i += 1;
        }
        Ok(text.trim_end().to_string())
    }

    fn allowed(&self, c: char) -> Result<(), ParseError> {
        if DISALLOWED.contains(&c) {
            return Err(self.error(ParseErrorKind::InvalidCharacter(c)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Entry, ParseError> {
        Parser::new(text, 0).parse()
    }

    #[test]
    fn project_with_tag_and_tool() {
        let entry = parse("Write a game #fun &godot").unwrap();
        assert_eq!(entry.project(), "Write a game");
        assert_eq!(entry.tags(), ["#fun"]);
        assert_eq!(entry.tools(), ["&godot"]);
    }

    #[test]
    fn annotations_keep_encounter_order() {
        let entry = parse("Proj #a &x #b &y").unwrap();
        assert_eq!(entry.tags(), ["#a", "#b"]);
        assert_eq!(entry.tools(), ["&x", "&y"]);
    }

    #[test]
    fn adjacent_markers_split_tokens() {
        let entry = parse("Proj #a#b&x").unwrap();
        assert_eq!(entry.tags(), ["#a", "#b"]);
        assert_eq!(entry.tools(), ["&x"]);
    }

    #[test]
    fn marker_before_project_is_rejected() {
        let err = parse("#fun").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingProjectBeforeMarker);
        assert_eq!(err.position, 0);
    }

    #[test]
    fn tool_marker_before_project_is_rejected() {
        let err = parse("&godot").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingProjectBeforeMarker);
        assert_eq!(err.position, 0);
    }

    #[test]
    fn empty_tag_is_rejected() {
        let err = parse("Proj #").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TagEmpty);
    }

    #[test]
    fn empty_tool_is_rejected() {
        let err = parse("Proj & after").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ToolEmpty);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(parse("").unwrap_err().kind, ParseErrorKind::EmptyProject);
        assert_eq!(parse("   ").unwrap_err().kind, ParseErrorKind::EmptyProject);
    }

    #[test]
    fn project_text_after_annotations_is_rejected() {
        let err = parse("A #x B").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ProjectNotFirst);
        assert_eq!(err.position, 5);
    }

    #[test]
    fn comma_is_rejected_with_exact_position() {
        let err = parse("a,b").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidCharacter(','));
        assert_eq!(err.position, 1);
    }

    #[test]
    fn quote_in_tag_is_rejected() {
        let err = parse("Proj #a\"b").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidCharacter('"'));
        assert_eq!(err.position, 7);
    }

    #[test]
    fn caret_message_counts_offset_plus_position() {
        let err = Parser::new("A #x B", 4).parse().unwrap_err();
        // 4 prompt columns + position 5 = 9 spaces before the caret.
        assert_eq!(err.to_string(), "         ^ project text must come first");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let entry = parse("  Proj #a  ").unwrap();
        assert_eq!(entry.project(), "Proj");
        assert_eq!(entry.tags(), ["#a"]);
    }

    #[test]
    fn internal_spaces_stay_in_project() {
        let entry = parse("a long project name #t").unwrap();
        assert_eq!(entry.project(), "a long project name");
    }
}
