pub const TAG_MARKER: char = '#';
pub const TOOL_MARKER: char = '&';

/// One recorded idea: a project description plus `#` tags and `&` tools.
///
/// Entries are immutable once built up; editing is modeled as delete plus
/// re-add of a freshly parsed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    project: String,
    tags: Vec<String>,
    tools: Vec<String>,
}

impl Entry {
    pub fn new(project: &str) -> Self {
        Self {
            project: project.trim().to_string(),
            tags: Vec::new(),
            tools: Vec::new(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    pub fn add_tag(&mut self, tag: &str) {
        self.tags.push(with_marker(tag, TAG_MARKER));
    }

    pub fn add_tool(&mut self, tool: &str) {
        self.tools.push(with_marker(tool, TOOL_MARKER));
    }

    /// Canonical display rendering: project, tags, tools, single-space
    /// joined. Filtering and highlighting both run over this text.
    pub fn display(&self) -> String {
        let mut text = self.project.clone();
        for tag in &self.tags {
            text.push(' ');
            text.push_str(tag);
        }
        for tool in &self.tools {
            text.push(' ');
            text.push_str(tool);
        }
        text
    }
}

fn with_marker(value: &str, marker: char) -> String {
    if value.starts_with(marker) {
        value.to_string()
    } else {
        format!("{}{}", marker, value)
    }
}
