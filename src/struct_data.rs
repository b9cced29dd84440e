//! Structured data blocks embedded in wiki pages
//!
//! Every generated page carries a delimited `dataentry` block so that a
//! later publish run can re-extract the metadata of the previous run.
//! This module encodes, decodes and strips those blocks, and defines the
//! metadata record itself.
//!
//! The block format is kept bit-compatible across runs:
//!
//! ```text
//! ---- dataentry version ----
//! Schema Version : 3.0.0
//! ...
//! ----
//! ```

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

/// Opening delimiter prefix of a dataentry block
const ENTRY_OPEN: &str = "---- dataentry";

/// Closing delimiter line of a dataentry block
const ENTRY_CLOSE: &str = "----";

static VALUE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"#.*$").unwrap());

/// Generate a dataentry block `name` from `data`.
///
/// Keys are emitted in the map's insertion order.
pub fn encode(name: &str, data: &IndexMap<String, String>) -> String {
    let mut block = format!("{} {} ----\n", ENTRY_OPEN, name);
    for (key, value) in data {
        block.push_str(&format!("{} : {}\n", key, value));
    }
    block.push_str(ENTRY_CLOSE);
    block.push('\n');
    block
}

/// Extract the first dataentry block from `content`.
///
/// Lines between the opening and closing delimiters are split on the first
/// `:`; key and value are trimmed and a trailing `#...` comment on the
/// value is stripped. A line with no separator is kept as a key with an
/// empty value. The first occurrence of a duplicated key wins.
///
/// Returns [`Error::StructDataNotFound`] when no opening delimiter exists.
pub fn decode(content: &str) -> Result<IndexMap<String, String>> {
    let mut entries = IndexMap::new();
    let mut found = false;
    for line in content.lines() {
        if !found {
            if line.trim_start().starts_with(ENTRY_OPEN) {
                found = true;
            }
            continue;
        }
        if line == ENTRY_CLOSE {
            break;
        }
        let (key, value) = match line.split_once(':') {
            Some((key, value)) => (key, value),
            // No separator: keep the line as a key with an empty value
            None => (line, ""),
        };
        let value = VALUE_COMMENT.replace(value, "");
        entries
            .entry(key.trim().to_string())
            .or_insert_with(|| value.trim().to_string());
    }
    if !found {
        return Err(Error::StructDataNotFound);
    }
    Ok(entries)
}

/// Remove the first dataentry block from `content`.
///
/// Everything after the closing delimiter line is preserved. When no
/// closing delimiter exists the content is returned unchanged.
pub fn strip(content: &str) -> String {
    let mut tail = Vec::new();
    let mut closed = false;
    for line in content.lines() {
        if closed {
            tail.push(line);
        } else if line == ENTRY_CLOSE {
            closed = true;
        }
    }
    if !closed {
        return content.to_string();
    }
    tail.join("\n")
}

/// Metadata record embedded in every published page.
///
/// One instance is built per ingestion. The `namespace` field holds the
/// namespace URI owning the rendered page and is substituted per page via
/// [`PublishMetadata::with_namespace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishMetadata {
    /// Version string of the published schema
    pub schema_version: String,
    /// Location the schema was read from
    pub schema_location: String,
    /// Namespace URI owning the rendered page
    pub namespace: String,
    /// Wiki user the pages are published as
    pub author: String,
    /// Ingestion timestamp
    pub date: String,
    /// Publish status, draft or public
    pub status: String,
    /// Version of this publisher
    pub publisher_version: String,
}

impl PublishMetadata {
    /// Return a copy with the owning `namespace` of a page substituted.
    pub fn with_namespace(&self, namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            ..self.clone()
        }
    }

    /// Flatten to the dataentry key set, in render order.
    pub fn to_entries(&self) -> IndexMap<String, String> {
        IndexMap::from([
            ("Schema Version".to_string(), self.schema_version.clone()),
            ("Schema Location".to_string(), self.schema_location.clone()),
            ("Namespace URI".to_string(), self.namespace.clone()),
            ("Author".to_string(), self.author.clone()),
            ("Date".to_string(), self.date.clone()),
            ("Status".to_string(), self.status.clone()),
            (
                "Publisher Version".to_string(),
                self.publisher_version.clone(),
            ),
        ])
    }
}
