//! Positional line diff.
//!
//! Lines are compared by index only. An insertion near the top of a file therefore shows up as a
//! removed/added pair for every following line; callers should not expect a minimal diff.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffLineKind {
    Removed,
    Added,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub kind: DiffLineKind,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffRecord {
    lines: Vec<DiffLine>,
}

impl DiffRecord {
    pub fn lines(&self) -> &[DiffLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn has_changes(&self) -> bool {
        self.lines
            .iter()
            .any(|line| line.kind != DiffLineKind::Unchanged)
    }

    fn push(&mut self, kind: DiffLineKind, text: &str) {
        self.lines.push(DiffLine {
            kind,
            text: text.to_string(),
        });
    }
}

/// One entry per line: `- ` removed, `+ ` added, two spaces for unchanged.
impl fmt::Display for DiffRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            let marker = match line.kind {
                DiffLineKind::Removed => "- ",
                DiffLineKind::Added => "+ ",
                DiffLineKind::Unchanged => "  ",
            };
            writeln!(f, "{marker}{}", line.text)?;
        }
        Ok(())
    }
}

pub fn diff(old_text: &str, new_text: &str) -> DiffRecord {
    let old_lines: Vec<&str> = old_text.split('\n').collect();
    let new_lines: Vec<&str> = new_text.split('\n').collect();

    let mut record = DiffRecord::default();
    for idx in 0..old_lines.len().max(new_lines.len()) {
        let old_line = old_lines.get(idx).copied().unwrap_or("");
        let new_line = new_lines.get(idx).copied().unwrap_or("");

        if old_line == new_line {
            record.push(DiffLineKind::Unchanged, old_line);
            continue;
        }
        if !old_line.is_empty() {
            record.push(DiffLineKind::Removed, old_line);
        }
        if !new_line.is_empty() {
            record.push(DiffLineKind::Added, new_line);
        }
    }
    record
}
