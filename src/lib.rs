//! # schemawiki
//!
//! Publishes machine-generated documentation pages for an XML schema's
//! elements, attributes and enumerations to a DokuWiki instance.
//!
//! Every page stays both human-readable and machine-parseable: a
//! structured `dataentry` block is embedded in the page body so a later
//! run can re-extract the metadata of a previous publish. The pipeline
//! builds a symbol table from the schema's globals, resolves
//! cross-references into internal wiki links or external builtin-type
//! links, renders each entity to DokuWiki markup and writes the pages
//! through an XML-RPC transport.
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemawiki::client::DokuWikiClient;
//! use schemawiki::manager::PublishManager;
//! use schemawiki::schema::FileSchemaSource;
//!
//! let client = DokuWikiClient::new("https://wiki.example.org")?;
//! let mut manager = PublishManager::new(client, "publisher");
//! let source = FileSchemaSource::new("schemas/schema.yaml");
//! if manager.ingest(&source) {
//!     let published = manager.publish_all_elements()?;
//!     println!("published {} element pages", published);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules - Wave 1: Foundation
pub mod error;
pub mod struct_data;

// Core modules - Wave 2: Schema boundary
pub mod schema;

// Core modules - Wave 3: Transformation
pub mod links;
pub mod render;

// Publishing - Wave 4
pub mod client;
pub mod manager;
pub mod transport;

// Utilities
pub mod config;

// Re-exports for convenience
pub use error::{Error, Result};
pub use manager::{PublishManager, PublishState};

/// Version of the schemawiki library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD 1.0 namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
