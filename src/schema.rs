//! Schema source boundary
//!
//! The schema parser itself is an external collaborator. This module
//! defines the descriptor types the pipeline consumes, the
//! [`SchemaSource`] trait the manager ingests through, and a file-backed
//! adapter that loads a pre-parsed schema dump from YAML or JSON.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Qualified `(prefix, local name)` pair of a schema global
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalName {
    /// Namespace prefix
    pub prefix: String,
    /// Local name
    pub name: String,
}

impl GlobalName {
    /// Create a qualified name
    pub fn new(prefix: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
        }
    }
}

/// Reference to a child element inside a global element declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRef {
    /// Local name of the referenced element
    pub name: String,
    /// Namespace prefix of the referenced element
    pub prefix: String,
    /// Prefixed type name, e.g. `ocx:LengthType`
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Reference to an attribute inside a global element declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRef {
    /// Local name of the attribute
    pub name: String,
    /// Namespace prefix of the attribute
    pub prefix: String,
    /// Prefixed type name of the attribute value
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A global element declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaElement {
    /// Local name
    pub name: String,
    /// Namespace prefix
    pub prefix: String,
    /// Namespace URI owning the element
    pub namespace: String,
    /// Annotation text rendered as the page body
    #[serde(default)]
    pub annotation: String,
    /// Child element references, in declaration order
    #[serde(default)]
    pub children: Vec<ChildRef>,
    /// Attribute references, in declaration order
    #[serde(default)]
    pub attributes: Vec<AttributeRef>,
}

/// A global attribute or simple type declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaAttribute {
    /// Local name
    pub name: String,
    /// Namespace prefix
    pub prefix: String,
    /// Namespace URI owning the attribute
    pub namespace: String,
    /// Prefixed type name of the attribute value
    #[serde(rename = "type")]
    pub type_name: String,
    /// Use constraint, `required` or `optional`
    #[serde(default)]
    pub use_constraint: String,
    /// Default value, empty when none is declared
    #[serde(default)]
    pub default: String,
    /// Annotation text
    #[serde(default)]
    pub description: String,
}

impl SchemaAttribute {
    /// Flatten to the key/value fields rendered on the attribute page.
    pub fn fields(&self) -> IndexMap<String, String> {
        IndexMap::from([
            ("Name".to_string(), self.name.clone()),
            ("Type".to_string(), self.type_name.clone()),
            ("Use".to_string(), self.use_constraint.clone()),
            ("Default".to_string(), self.default.clone()),
            ("Description".to_string(), self.description.clone()),
        ])
    }
}

/// A global enumeration declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumerator {
    /// Local name
    pub name: String,
    /// Namespace prefix
    pub prefix: String,
    /// Namespace URI owning the enumeration
    pub namespace: String,
    /// Enumeration literals, in declaration order
    #[serde(default)]
    pub values: Vec<String>,
    /// One description per literal
    #[serde(default)]
    pub descriptions: Vec<String>,
}

/// Pre-parsed schema exposed by a [`SchemaSource`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedSchema {
    /// Schema version string
    pub version: String,
    /// Location the schema was read from
    #[serde(default)]
    pub location: String,
    /// Target namespace URI of the schema
    pub namespace: String,
    /// Prefix to namespace URI table
    #[serde(default)]
    pub namespaces: IndexMap<String, String>,
    /// Prefixed builtin type name to external documentation URL
    #[serde(default)]
    pub builtin_types: IndexMap<String, String>,
    /// Global element declarations
    #[serde(default)]
    pub elements: Vec<SchemaElement>,
    /// Global attribute declarations
    #[serde(default)]
    pub attributes: Vec<SchemaAttribute>,
    /// Attribute group names
    #[serde(default)]
    pub attribute_groups: Vec<GlobalName>,
    /// Simple type declarations
    #[serde(default)]
    pub simple_types: Vec<SchemaAttribute>,
    /// Enumeration declarations
    #[serde(default)]
    pub enumerators: Vec<Enumerator>,
}

/// Boundary the manager ingests a schema through.
///
/// Implementations parse a schema definition and expose its globals as
/// ordered descriptor collections.
pub trait SchemaSource {
    /// Parse the schema. Recoverable failures surface as
    /// [`Error::Ingestion`].
    fn parse(&self) -> Result<ParsedSchema>;
}

impl SchemaSource for ParsedSchema {
    fn parse(&self) -> Result<ParsedSchema> {
        Ok(self.clone())
    }
}

/// File-backed schema source reading a pre-parsed schema dump.
///
/// The dump is the serde serialization of [`ParsedSchema`], as `.yaml`,
/// `.yml` or `.json`.
#[derive(Debug, Clone)]
pub struct FileSchemaSource {
    path: PathBuf,
}

impl FileSchemaSource {
    /// Create a source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the schema dump.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SchemaSource for FileSchemaSource {
    fn parse(&self) -> Result<ParsedSchema> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::Ingestion(format!(
                "failed to read schema dump '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        match extension {
            "yaml" | "yml" => serde_yaml::from_str(&text).map_err(|e| {
                Error::Ingestion(format!("invalid schema dump '{}': {}", self.path.display(), e))
            }),
            "json" => serde_json::from_str(&text).map_err(|e| {
                Error::Ingestion(format!("invalid schema dump '{}': {}", self.path.display(), e))
            }),
            other => Err(Error::Ingestion(format!(
                "unsupported schema dump format '{}'",
                other
            ))),
        }
    }
}

/// Split a prefixed name into its prefix and local parts.
pub fn split_prefixed(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_split_prefixed() {
        assert_eq!(split_prefixed("Plate"), (None, "Plate"));
        assert_eq!(split_prefixed("ocx:Plate"), (Some("ocx"), "Plate"));
    }

    #[test]
    fn test_attribute_fields_order() {
        let attribute = SchemaAttribute {
            name: "id".to_string(),
            prefix: "ocx".to_string(),
            namespace: "https://3docx.org/ocx".to_string(),
            type_name: "xs:ID".to_string(),
            use_constraint: "required".to_string(),
            default: String::new(),
            description: "Unique identifier".to_string(),
        };
        let keys: Vec<&String> = attribute.fields().keys().collect();
        assert_eq!(keys, ["Name", "Type", "Use", "Default", "Description"]);
    }

    #[test]
    fn test_file_source_yaml() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        write!(
            file,
            "version: 3.0.0\nnamespace: https://3docx.org/ocx\nelements:\n  - name: Plate\n    prefix: ocx\n    namespace: https://3docx.org/ocx\n"
        )
        .unwrap();
        let schema = FileSchemaSource::new(file.path()).parse().unwrap();
        assert_eq!(schema.version, "3.0.0");
        assert_eq!(schema.elements.len(), 1);
        assert_eq!(schema.elements[0].name, "Plate");
        assert!(schema.elements[0].children.is_empty());
    }

    #[test]
    fn test_file_source_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".xsd").tempfile().unwrap();
        let err = FileSchemaSource::new(file.path()).parse().unwrap_err();
        assert!(matches!(err, crate::error::Error::Ingestion(_)));
    }

    #[test]
    fn test_file_source_missing_file() {
        let err = FileSchemaSource::new("no/such/schema.yaml")
            .parse()
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::Ingestion(_)));
    }
}
