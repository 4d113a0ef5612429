//! Ordered literal search/replace.
//!
//! Each operation sees the output of the previous one and replaces only the first occurrence of
//! its `old_text`. Operations whose text is missing are recorded and skipped.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::diff::{DiffRecord, diff};

pub const TEXT_NOT_FOUND: &str = "Text not found in file";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditOperation {
    #[schemars(description = "Exact text to find")]
    pub old_text: String,
    #[schemars(description = "Replacement text")]
    pub new_text: String,
}

impl EditOperation {
    pub fn new(old_text: impl Into<String>, new_text: impl Into<String>) -> Self {
        Self {
            old_text: old_text.into(),
            new_text: new_text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EditResult {
    #[serde(rename_all = "camelCase")]
    Matched {
        #[serde(rename = "match")]
        matched: Matched,
        old_text: String,
        new_text: String,
    },
    #[serde(rename_all = "camelCase")]
    Missed {
        #[serde(rename = "match")]
        matched: Missed,
        old_text: String,
        message: String,
    },
}

/// `true` in serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matched;

/// `false` in serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Missed;

impl Serialize for Matched {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(true)
    }
}

impl<'de> Deserialize<'de> for Matched {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match bool::deserialize(deserializer)? {
            true => Ok(Matched),
            false => Err(serde::de::Error::custom("expected match = true")),
        }
    }
}

impl Serialize for Missed {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(false)
    }
}

impl<'de> Deserialize<'de> for Missed {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match bool::deserialize(deserializer)? {
            false => Ok(Missed),
            true => Err(serde::de::Error::custom("expected match = false")),
        }
    }
}

impl EditResult {
    fn matched(op: &EditOperation) -> Self {
        Self::Matched {
            matched: Matched,
            old_text: op.old_text.clone(),
            new_text: op.new_text.clone(),
        }
    }

    fn missed(op: &EditOperation) -> Self {
        Self::Missed {
            matched: Missed,
            old_text: op.old_text.clone(),
            message: TEXT_NOT_FOUND.to_string(),
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    pub fn old_text(&self) -> &str {
        match self {
            Self::Matched { old_text, .. } | Self::Missed { old_text, .. } => old_text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub content: String,
    pub results: Vec<EditResult>,
    pub diff: DiffRecord,
}

impl EditOutcome {
    pub fn changed(&self) -> bool {
        self.diff.has_changes()
    }
}

pub fn apply_edits(content: &str, edits: &[EditOperation]) -> EditOutcome {
    if edits.is_empty() {
        return EditOutcome {
            content: content.to_string(),
            results: Vec::new(),
            diff: DiffRecord::default(),
        };
    }

    let mut working = content.to_string();
    let mut results = Vec::with_capacity(edits.len());
    for op in edits {
        if !working.contains(op.old_text.as_str()) {
            results.push(EditResult::missed(op));
            continue;
        }
        working = working.replacen(op.old_text.as_str(), &op.new_text, 1);
        results.push(EditResult::matched(op));
    }

    let diff = diff(content, &working);
    EditOutcome {
        content: working,
        results,
        diff,
    }
}
