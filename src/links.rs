//! Cross-reference link resolution
//!
//! Decides whether a `(name, prefix, type)` reference rendered on a page
//! links to another generated page, to external builtin-type
//! documentation, or stays plain text. Resolution is a pure transform:
//! the input references are never modified and resolving the same
//! reference twice yields identical output.

use std::collections::HashSet;

use indexmap::IndexMap;
use regex::Regex;

use crate::schema::{split_prefixed, AttributeRef, ChildRef, GlobalName, ParsedSchema, SchemaElement};

/// Set of all known schema global names.
///
/// Built once per ingestion from every element, attribute, attribute
/// group, simple type and enumerator the schema declares; read-only
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashSet<GlobalName>,
    local_names: HashSet<String>,
}

impl SymbolTable {
    /// Build the table from every global the schema declares.
    pub fn from_schema(schema: &ParsedSchema) -> Self {
        let mut table = Self::default();
        for element in &schema.elements {
            table.insert(&element.prefix, &element.name);
        }
        for attribute in &schema.attributes {
            table.insert(&attribute.prefix, &attribute.name);
        }
        for group in &schema.attribute_groups {
            table.insert(&group.prefix, &group.name);
        }
        for simple in &schema.simple_types {
            table.insert(&simple.prefix, &simple.name);
        }
        for enumerator in &schema.enumerators {
            table.insert(&enumerator.prefix, &enumerator.name);
        }
        table
    }

    fn insert(&mut self, prefix: &str, name: &str) {
        self.local_names.insert(name.to_string());
        self.symbols.insert(GlobalName::new(prefix, name));
    }

    /// Whether `(prefix, name)` is a known global.
    pub fn contains(&self, prefix: &str, name: &str) -> bool {
        self.symbols.contains(&GlobalName::new(prefix, name))
    }

    /// Whether any known global has the local name `name`.
    pub fn contains_local(&self, name: &str) -> bool {
        self.local_names.contains(name)
    }

    /// Number of known globals.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Mapping from prefixed builtin type names to external documentation
/// URLs.
///
/// The `xs:` and `xsd:` prefix spellings are synonyms: registering one
/// registers the other.
#[derive(Debug, Clone, Default)]
pub struct BuiltinTypeMap {
    targets: IndexMap<String, String>,
}

impl BuiltinTypeMap {
    /// Build the map from the schema's builtin-type table.
    pub fn from_schema(schema: &ParsedSchema) -> Self {
        let mut map = Self::default();
        for (type_name, link) in &schema.builtin_types {
            map.targets
                .entry(type_name.clone())
                .or_insert_with(|| link.clone());
            match split_prefixed(type_name) {
                (Some("xs"), local) => {
                    map.targets
                        .entry(format!("xsd:{}", local))
                        .or_insert_with(|| link.clone());
                }
                (Some("xsd"), local) => {
                    map.targets
                        .entry(format!("xs:{}", local))
                        .or_insert_with(|| link.clone());
                }
                _ => {}
            }
        }
        map
    }

    /// External documentation URL for `type_name`, if it is a builtin.
    pub fn get(&self, type_name: &str) -> Option<&str> {
        self.targets.get(type_name).map(String::as_str)
    }

    /// Number of registered type names, synonyms included.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Internal wiki link to a generated page in the publishing namespace.
pub fn link_internal(publish_ns: &str, prefix: &str, name: &str, label: &str) -> String {
    format!("[[{}:{}:{}|{}]]", publish_ns, prefix, name, label)
}

/// External link to builtin-type documentation.
pub fn link_external(url: &str, label: &str) -> String {
    format!("[[{}|{}]]", url, label)
}

/// Resolve the `type` field of a reference.
///
/// Internal links win over external builtin links. An unknown type falls
/// back to a whitespace-bounded token substitution searched within the
/// type string itself and is otherwise left unchanged.
fn resolve_type(
    type_name: &str,
    name: &str,
    prefix: &str,
    table: &SymbolTable,
    builtins: &BuiltinTypeMap,
    publish_ns: &str,
) -> String {
    if let (Some(type_prefix), local) = split_prefixed(type_name) {
        if table.contains(type_prefix, local) {
            return link_internal(publish_ns, type_prefix, local, type_name);
        }
    }
    if let Some(url) = builtins.get(type_name) {
        return link_external(url, type_name);
    }
    // Only a whitespace-bounded exact token is substituted; partial-word
    // matches are not.
    let pattern = format!(r"\s{}\s", regex::escape(type_name));
    if let Ok(pattern) = Regex::new(&pattern) {
        if pattern.find_iter(type_name).count() == 1 {
            let placeholder = format!(" [[{}:{}:{}]] ", publish_ns, prefix, name);
            return pattern.replace(type_name, placeholder.as_str()).into_owned();
        }
    }
    type_name.to_string()
}

/// Resolve a child reference into its linked form.
pub fn resolve_child(
    child: &ChildRef,
    table: &SymbolTable,
    builtins: &BuiltinTypeMap,
    publish_ns: &str,
) -> ChildRef {
    let name = if table.contains(&child.prefix, &child.name) {
        link_internal(publish_ns, &child.prefix, &child.name, &child.name)
    } else {
        child.name.clone()
    };
    ChildRef {
        name,
        prefix: child.prefix.clone(),
        type_name: resolve_type(
            &child.type_name,
            &child.name,
            &child.prefix,
            table,
            builtins,
            publish_ns,
        ),
    }
}

/// Resolve an attribute reference into its linked form.
///
/// The attribute name links internally when any global shares its local
/// name, regardless of prefix.
pub fn resolve_attribute(
    attribute: &AttributeRef,
    table: &SymbolTable,
    builtins: &BuiltinTypeMap,
    publish_ns: &str,
) -> AttributeRef {
    let name = if table.contains_local(&attribute.name) {
        link_internal(publish_ns, &attribute.prefix, &attribute.name, &attribute.name)
    } else {
        attribute.name.clone()
    };
    AttributeRef {
        name,
        prefix: attribute.prefix.clone(),
        type_name: resolve_type(
            &attribute.type_name,
            &attribute.name,
            &attribute.prefix,
            table,
            builtins,
            publish_ns,
        ),
    }
}

/// Resolve every child and attribute reference of `element`, children
/// first, returning a new element.
pub fn resolve_element(
    element: &SchemaElement,
    table: &SymbolTable,
    builtins: &BuiltinTypeMap,
    publish_ns: &str,
) -> SchemaElement {
    let children = element
        .children
        .iter()
        .map(|child| resolve_child(child, table, builtins, publish_ns))
        .collect();
    let attributes = element
        .attributes
        .iter()
        .map(|attribute| resolve_attribute(attribute, table, builtins, publish_ns))
        .collect();
    SchemaElement {
        children,
        attributes,
        ..element.clone()
    }
}
