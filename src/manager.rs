//! Publish pipeline orchestration
//!
//! [`PublishManager`] ingests a parsed schema, builds the symbol table
//! and builtin-type map, resolves cross-references into links and drives
//! page writes through the wiki transport. Ingestion and publishing are
//! sequential; a batch publish that fails on one page skips it and
//! continues.

use std::fmt;

use chrono::Local;
use log::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::links::{self, BuiltinTypeMap, SymbolTable};
use crate::render;
use crate::schema::{
    split_prefixed, Enumerator, SchemaAttribute, SchemaElement, SchemaSource,
};
use crate::struct_data::PublishMetadata;
use crate::transport::WikiTransport;

/// Publishing state controlling the target wiki namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishState {
    /// Pages go to the draft namespace
    #[default]
    Draft,
    /// Pages go to the public namespace
    Public,
}

impl PublishState {
    /// Wiki namespace segment pages are written under in this state.
    pub fn namespace(self) -> &'static str {
        match self {
            PublishState::Draft => "draft",
            PublishState::Public => "public",
        }
    }
}

impl fmt::Display for PublishState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishState::Draft => write!(f, "DRAFT"),
            PublishState::Public => write!(f, "PUBLIC"),
        }
    }
}

/// Schema state rebuilt on every successful ingestion
#[derive(Debug, Clone)]
struct Ingested {
    symbols: SymbolTable,
    builtins: BuiltinTypeMap,
    metadata: PublishMetadata,
    elements: Vec<SchemaElement>,
    attributes: Vec<SchemaAttribute>,
    simple_types: Vec<SchemaAttribute>,
    enumerators: Vec<Enumerator>,
}

/// Orchestrates schema ingestion and page publishing.
///
/// The wiki transport is injected at construction; the schema source is
/// passed to [`PublishManager::ingest`]. All publish operations require
/// a prior successful ingestion and fail with [`Error::NotIngested`]
/// otherwise.
pub struct PublishManager<T: WikiTransport> {
    transport: T,
    user: String,
    state: PublishState,
    ingested: Option<Ingested>,
}

impl<T: WikiTransport> PublishManager<T> {
    /// Create a manager publishing as `user` through `transport`.
    pub fn new(transport: T, user: impl Into<String>) -> Self {
        Self {
            transport,
            user: user.into(),
            state: PublishState::default(),
            ingested: None,
        }
    }

    /// Borrow the injected transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Current publish state.
    pub fn publish_state(&self) -> PublishState {
        self.state
    }

    /// Set the publish state for subsequent writes.
    ///
    /// Already-published pages and already-resolved links are not
    /// altered; only the namespace of later `publish` calls changes.
    pub fn set_publish_state(&mut self, state: PublishState) {
        self.state = state;
    }

    /// Wiki namespace subsequent writes go to.
    pub fn publish_namespace(&self) -> &'static str {
        self.state.namespace()
    }

    /// Ingest `source`, discarding any prior schema state.
    ///
    /// Rebuilds the symbol table, the builtin-type map and the publish
    /// metadata, then resolves every element's child and attribute
    /// references, children first. Returns false and leaves no schema
    /// state when the source fails to parse.
    pub fn ingest(&mut self, source: &dyn SchemaSource) -> bool {
        self.ingested = None;
        let schema = match source.parse() {
            Ok(schema) => schema,
            Err(err) => {
                error!("schema ingestion failed: {}", err);
                return false;
            }
        };
        let symbols = SymbolTable::from_schema(&schema);
        let builtins = BuiltinTypeMap::from_schema(&schema);
        let publish_ns = self.state.namespace();
        let metadata = PublishMetadata {
            schema_version: schema.version.clone(),
            schema_location: schema.location.clone(),
            namespace: schema.namespace.clone(),
            author: self.user.clone(),
            date: Local::now().format("%b %d %Y %H:%M:%S").to_string(),
            status: self.state.to_string(),
            publisher_version: crate::VERSION.to_string(),
        };
        let elements = schema
            .elements
            .iter()
            .map(|element| links::resolve_element(element, &symbols, &builtins, publish_ns))
            .collect();
        info!(
            "ingested schema version {} with {} globals",
            schema.version,
            symbols.len()
        );
        self.ingested = Some(Ingested {
            symbols,
            builtins,
            metadata,
            elements,
            attributes: schema.attributes,
            simple_types: schema.simple_types,
            enumerators: schema.enumerators,
        });
        true
    }

    fn ingested(&self) -> Result<&Ingested> {
        self.ingested.as_ref().ok_or(Error::NotIngested)
    }

    fn write_page(
        &self,
        prefix: &str,
        name: &str,
        content: &str,
        summary: &str,
    ) -> Result<bool> {
        let page = format!("{}:{}", prefix, name);
        let namespace = self.state.namespace();
        match self
            .transport
            .set_page(&page, content, summary, namespace, false)
        {
            Ok(written) => {
                if written {
                    debug!("published page {}:{}", namespace, page);
                } else {
                    warn!("wiki rejected page {}:{}", namespace, page);
                }
                Ok(written)
            }
            Err(err) => {
                error!("failed to publish page {}:{}: {}", namespace, page, err);
                Ok(false)
            }
        }
    }

    fn publish_summary(&self, ingested: &Ingested) -> String {
        format!(
            "Publish schema version {}",
            ingested.metadata.schema_version
        )
    }

    /// Publish one global element page.
    ///
    /// Returns the transport's verdict; a failed write is reported as
    /// `Ok(false)` so callers decide whether to retry.
    pub fn publish_element(&self, element: &SchemaElement) -> Result<bool> {
        let ingested = self.ingested()?;
        let metadata = ingested.metadata.with_namespace(&element.namespace);
        let content = render::element_page(element, &metadata);
        let summary = self.publish_summary(ingested);
        self.write_page(&element.prefix, &element.name, &content, &summary)
    }

    /// Publish one enumeration page.
    pub fn publish_enum(&self, enumerator: &Enumerator) -> Result<bool> {
        let ingested = self.ingested()?;
        let metadata = ingested.metadata.with_namespace(&enumerator.namespace);
        let content = render::enum_page(enumerator, &metadata);
        let summary = self.publish_summary(ingested);
        self.write_page(&enumerator.prefix, &enumerator.name, &content, &summary)
    }

    /// Publish one global attribute page.
    pub fn publish_attribute(&self, attribute: &SchemaAttribute) -> Result<bool> {
        let ingested = self.ingested()?;
        let metadata = ingested.metadata.with_namespace(&attribute.namespace);
        let content = render::attribute_page(attribute, &metadata);
        let summary = self.publish_summary(ingested);
        self.write_page(&attribute.prefix, &attribute.name, &content, &summary)
    }

    /// Publish one simple type page.
    ///
    /// Simple types share the attribute page shape.
    pub fn publish_simple_type(&self, simple_type: &SchemaAttribute) -> Result<bool> {
        self.publish_attribute(simple_type)
    }

    /// Publish every element page, skipping failed writes.
    ///
    /// Returns the number of pages the wiki accepted.
    pub fn publish_all_elements(&self) -> Result<usize> {
        let ingested = self.ingested()?;
        let mut published = 0;
        for element in &ingested.elements {
            if self.publish_element(element)? {
                published += 1;
            }
        }
        Ok(published)
    }

    /// Publish every global attribute page, skipping failed writes.
    pub fn publish_all_attributes(&self) -> Result<usize> {
        let ingested = self.ingested()?;
        let mut published = 0;
        for attribute in &ingested.attributes {
            if self.publish_attribute(attribute)? {
                published += 1;
            }
        }
        Ok(published)
    }

    /// Publish every simple type page, skipping failed writes.
    pub fn publish_all_simple_types(&self) -> Result<usize> {
        let ingested = self.ingested()?;
        let mut published = 0;
        for simple_type in &ingested.simple_types {
            if self.publish_simple_type(simple_type)? {
                published += 1;
            }
        }
        Ok(published)
    }

    /// Publish every enumeration page, skipping failed writes.
    pub fn publish_all_enums(&self) -> Result<usize> {
        let ingested = self.ingested()?;
        let mut published = 0;
        for enumerator in &ingested.enumerators {
            if self.publish_enum(enumerator)? {
                published += 1;
            }
        }
        Ok(published)
    }

    /// Metadata of the current ingestion.
    pub fn metadata(&self) -> Result<&PublishMetadata> {
        Ok(&self.ingested()?.metadata)
    }

    /// Symbol table of the current ingestion.
    pub fn symbols(&self) -> Result<&SymbolTable> {
        Ok(&self.ingested()?.symbols)
    }

    /// Builtin-type map of the current ingestion.
    pub fn builtins(&self) -> Result<&BuiltinTypeMap> {
        Ok(&self.ingested()?.builtins)
    }

    /// Version string of the ingested schema.
    pub fn schema_version(&self) -> Result<&str> {
        Ok(&self.ingested()?.metadata.schema_version)
    }

    /// Resolved element declarations of the current ingestion.
    pub fn elements(&self) -> Result<&[SchemaElement]> {
        Ok(&self.ingested()?.elements)
    }

    /// Global attribute declarations of the current ingestion.
    pub fn attributes(&self) -> Result<&[SchemaAttribute]> {
        Ok(&self.ingested()?.attributes)
    }

    /// Simple type declarations of the current ingestion.
    pub fn simple_types(&self) -> Result<&[SchemaAttribute]> {
        Ok(&self.ingested()?.simple_types)
    }

    /// Enumeration declarations of the current ingestion.
    pub fn enumerators(&self) -> Result<&[Enumerator]> {
        Ok(&self.ingested()?.enumerators)
    }

    /// Look up an ingested element by `prefix:name` or bare local name.
    pub fn element(&self, name: &str) -> Result<Option<&SchemaElement>> {
        let ingested = self.ingested()?;
        let (prefix, local) = split_prefixed(name);
        Ok(ingested.elements.iter().find(|element| {
            element.name == local && prefix.map_or(true, |p| element.prefix == p)
        }))
    }
}
