//! Ordered, passthrough-preserving unit-file document model

use std::fmt;

/// A single line within a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A `Key=Value` line. The key is never empty; the value may be.
    Pair { key: String, value: String },
    /// A comment, blank line, or any other line without an `=`,
    /// re-emitted verbatim on render.
    Raw(String),
}

impl Entry {
    /// Build a pair entry.
    pub fn pair(key: impl Into<String>, value: impl Into<String>) -> Self {
        Entry::Pair {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The key of a pair entry, or `None` for passthrough lines.
    pub fn key(&self) -> Option<&str> {
        match self {
            Entry::Pair { key, .. } => Some(key),
            Entry::Raw(_) => None,
        }
    }
}

/// A named group of entries. The unnamed preamble (name `""`) holds
/// passthrough lines that precede the first `[Section]` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub entries: Vec<Entry>,
}

impl Section {
    /// Create an empty section with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// True if any entry in this section is a pair with the given key.
    pub fn has_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key() == Some(key))
    }

    /// True for the unnamed preamble with no entries; such a section is
    /// omitted on render and contributes nothing to a merge.
    pub fn is_empty_preamble(&self) -> bool {
        self.name.is_empty() && self.entries.is_empty()
    }
}

/// A parsed unit file: an ordered list of sections.
///
/// Section names are unique by convention only; a repeated `[Header]`
/// produces a second, distinct section and is preserved as such.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitDocument {
    pub sections: Vec<Section>,
}

impl UnitDocument {
    /// Parse unit-file text into a document.
    ///
    /// Never rejects content: a line whose trimmed form is wrapped in
    /// `[` `]` opens a new section, empty and `#`/`;` lines become
    /// passthrough entries, anything else splits on the first `=` with
    /// both sides trimmed, and a line with no `=` degrades to passthrough.
    pub fn parse(text: &str) -> Self {
        let mut sections = Vec::new();
        let mut current = Section::default();

        for line in text.lines() {
            let trimmed = line.trim();

            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                let name = &trimmed[1..trimmed.len() - 1];
                sections.push(std::mem::replace(&mut current, Section::named(name)));
                continue;
            }

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                current.entries.push(Entry::Raw(line.to_string()));
                continue;
            }

            match line.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    current
                        .entries
                        .push(Entry::pair(key.trim(), value.trim()));
                }
                // No `=` at all, or nothing before it: tolerated as passthrough.
                _ => current.entries.push(Entry::Raw(line.to_string())),
            }
        }

        sections.push(current);
        Self { sections }
    }

    /// Render the document back to text.
    ///
    /// Strict inverse of [`parse`](Self::parse): an empty unnamed preamble
    /// is dropped, every other section renders its `[Name]` header followed
    /// by its entries, each on its own `\n`-terminated line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            if section.is_empty_preamble() {
                continue;
            }
            if !section.name.is_empty() {
                out.push('[');
                out.push_str(&section.name);
                out.push_str("]\n");
            }
            for entry in &section.entries {
                match entry {
                    Entry::Pair { key, value } => {
                        out.push_str(key);
                        out.push('=');
                        out.push_str(value);
                        out.push('\n');
                    }
                    Entry::Raw(raw) => {
                        out.push_str(raw);
                        out.push('\n');
                    }
                }
            }
        }
        out
    }

    /// First section with the given name, if any.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }
}

impl fmt::Display for UnitDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
