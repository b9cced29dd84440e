//! End-to-end publishing pipeline tests
//!
//! These tests drive a `PublishManager` against a recording mock
//! transport and check the rendered pages, the link resolution outcomes
//! and the batch failure semantics.

use std::cell::RefCell;

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use schemawiki::error::{Error, Result};
use schemawiki::manager::{PublishManager, PublishState};
use schemawiki::schema::{
    AttributeRef, ChildRef, Enumerator, ParsedSchema, SchemaAttribute, SchemaElement,
};
use schemawiki::struct_data;
use schemawiki::transport::{ListOptions, PageInfo, WikiTransport};

#[derive(Debug, Clone, PartialEq)]
struct PageWrite {
    page: String,
    content: String,
    summary: String,
    namespace: String,
    minor: bool,
}

/// Transport recording every write. Call numbers listed in `reject`
/// (1-based) are answered with false.
#[derive(Default)]
struct MockTransport {
    writes: RefCell<Vec<PageWrite>>,
    reject: Vec<usize>,
}

impl MockTransport {
    fn rejecting(reject: Vec<usize>) -> Self {
        Self {
            writes: RefCell::new(Vec::new()),
            reject,
        }
    }

    fn writes(&self) -> Vec<PageWrite> {
        self.writes.borrow().clone()
    }
}

impl WikiTransport for MockTransport {
    fn login(&self, _user: &str, _password: &str) -> Result<bool> {
        Ok(true)
    }

    fn list_pages(
        &self,
        _namespace: &str,
        _options: ListOptions,
    ) -> Result<IndexMap<String, PageInfo>> {
        Ok(IndexMap::new())
    }

    fn get_page(&self, _page: &str) -> Result<String> {
        Ok(String::new())
    }

    fn set_page(
        &self,
        page: &str,
        content: &str,
        summary: &str,
        namespace: &str,
        minor: bool,
    ) -> Result<bool> {
        let mut writes = self.writes.borrow_mut();
        writes.push(PageWrite {
            page: page.to_string(),
            content: content.to_string(),
            summary: summary.to_string(),
            namespace: namespace.to_string(),
            minor,
        });
        Ok(!self.reject.contains(&writes.len()))
    }
}

const OCX_NS: &str = "https://3docx.org/ocx";

/// Schema with one element `ocx:Plate` carrying one child `Thickness`
/// typed `ocx:LengthType`, and an `xs:double` builtin target.
fn plate_schema() -> ParsedSchema {
    let mut schema = ParsedSchema {
        version: "3.0.0".to_string(),
        location: "https://3docx.org/ocx.xsd".to_string(),
        namespace: OCX_NS.to_string(),
        ..Default::default()
    };
    schema
        .namespaces
        .insert("ocx".to_string(), OCX_NS.to_string());
    schema
        .namespaces
        .insert("xs".to_string(), schemawiki::XSD_NAMESPACE.to_string());
    schema
        .builtin_types
        .insert("xs:double".to_string(), "https://w3.org/double".to_string());
    schema.elements.push(SchemaElement {
        name: "Plate".to_string(),
        prefix: "ocx".to_string(),
        namespace: OCX_NS.to_string(),
        annotation: "A plate structure element.".to_string(),
        children: vec![ChildRef {
            name: "Thickness".to_string(),
            prefix: "ocx".to_string(),
            type_name: "ocx:LengthType".to_string(),
        }],
        attributes: vec![AttributeRef {
            name: "weight".to_string(),
            prefix: "ocx".to_string(),
            type_name: "xs:double".to_string(),
        }],
    });
    schema
}

fn length_type() -> SchemaAttribute {
    SchemaAttribute {
        name: "LengthType".to_string(),
        prefix: "ocx".to_string(),
        namespace: OCX_NS.to_string(),
        type_name: "xs:double".to_string(),
        use_constraint: "optional".to_string(),
        default: String::new(),
        description: "A quantity of length".to_string(),
    }
}

fn enumerators(count: usize) -> Vec<Enumerator> {
    (0..count)
        .map(|index| Enumerator {
            name: format!("BracketType{}", index),
            prefix: "ocx".to_string(),
            namespace: OCX_NS.to_string(),
            values: vec!["flat".to_string(), "curved".to_string()],
            descriptions: vec!["Flat bracket".to_string(), "Curved bracket".to_string()],
        })
        .collect()
}

fn ingested_manager(schema: &ParsedSchema) -> PublishManager<MockTransport> {
    let mut manager = PublishManager::new(MockTransport::default(), "publisher");
    assert!(manager.ingest(schema));
    manager
}

#[test]
fn thickness_links_externally_when_length_type_is_builtin_only() {
    let mut schema = plate_schema();
    schema.builtin_types.insert(
        "ocx:LengthType".to_string(),
        "https://w3.org/double".to_string(),
    );
    let manager = ingested_manager(&schema);
    let plate = &manager.elements().unwrap()[0];
    assert_eq!(
        plate.children[0].type_name,
        "[[https://w3.org/double|ocx:LengthType]]"
    );
}

#[test]
fn thickness_links_internally_when_length_type_is_a_global() {
    // LengthType is both a known global and a registered builtin; the
    // internal link wins.
    let mut schema = plate_schema();
    schema.builtin_types.insert(
        "ocx:LengthType".to_string(),
        "https://w3.org/double".to_string(),
    );
    schema.simple_types.push(length_type());
    let manager = ingested_manager(&schema);
    let plate = &manager.elements().unwrap()[0];
    assert_eq!(
        plate.children[0].type_name,
        "[[draft:ocx:LengthType|ocx:LengthType]]"
    );
}

#[test]
fn unknown_type_stays_plain_text() {
    let manager = ingested_manager(&plate_schema());
    let plate = &manager.elements().unwrap()[0];
    assert_eq!(plate.children[0].type_name, "ocx:LengthType");
    // The attribute reference typed with a builtin still links out
    assert_eq!(
        plate.attributes[0].type_name,
        "[[https://w3.org/double|xs:double]]"
    );
}

#[test]
fn publish_writes_page_id_summary_and_namespace() {
    let manager = ingested_manager(&plate_schema());
    let plate = manager.elements().unwrap()[0].clone();
    assert!(manager.publish_element(&plate).unwrap());

    let writes = manager.transport().writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].page, "ocx:Plate");
    assert_eq!(writes[0].namespace, "draft");
    assert_eq!(writes[0].summary, "Publish schema version 3.0.0");
    assert!(!writes[0].minor);
    assert!(writes[0].content.starts_with("====Plate====\n\n\n"));
}

#[test]
fn publish_is_idempotent() {
    let manager = ingested_manager(&plate_schema());
    let plate = manager.elements().unwrap()[0].clone();
    assert!(manager.publish_element(&plate).unwrap());
    assert!(manager.publish_element(&plate).unwrap());

    let writes = manager.transport().writes();
    assert_eq!(writes[0].content, writes[1].content);
    assert_eq!(writes[0].summary, writes[1].summary);
}

#[test]
fn switching_state_changes_namespace_not_content() {
    let mut manager = ingested_manager(&plate_schema());
    let plate = manager.elements().unwrap()[0].clone();
    assert!(manager.publish_element(&plate).unwrap());

    manager.set_publish_state(PublishState::Public);
    assert_eq!(manager.publish_namespace(), "public");
    assert!(manager.publish_element(&plate).unwrap());

    let writes = manager.transport().writes();
    assert_eq!(writes[0].namespace, "draft");
    assert_eq!(writes[1].namespace, "public");
    // Already-rendered content is untouched: links and status still
    // carry the ingestion-time state.
    assert_eq!(writes[0].content, writes[1].content);
}

#[test]
fn publish_all_skips_failed_pages() {
    let mut schema = plate_schema();
    schema.enumerators = enumerators(3);
    let mut manager = PublishManager::new(MockTransport::rejecting(vec![2]), "publisher");
    assert!(manager.ingest(&schema));

    let published = manager.publish_all_enums().unwrap();
    assert_eq!(published, 2);
    // The failed second page did not stop the third attempt
    let writes = manager.transport().writes();
    assert_eq!(writes.len(), 3);
    assert_eq!(writes[2].page, "ocx:BracketType2");
}

#[test]
fn publish_all_kinds_reports_counts() {
    let mut schema = plate_schema();
    schema.simple_types.push(length_type());
    schema.attributes.push(SchemaAttribute {
        name: "GUIDRef".to_string(),
        prefix: "ocx".to_string(),
        namespace: OCX_NS.to_string(),
        type_name: "xs:string".to_string(),
        use_constraint: "required".to_string(),
        default: String::new(),
        description: "Reference to a GUID".to_string(),
    });
    schema.enumerators = enumerators(2);
    let manager = ingested_manager(&schema);

    assert_eq!(manager.publish_all_elements().unwrap(), 1);
    assert_eq!(manager.publish_all_attributes().unwrap(), 1);
    assert_eq!(manager.publish_all_simple_types().unwrap(), 1);
    assert_eq!(manager.publish_all_enums().unwrap(), 2);

    let writes = manager.transport().writes();
    assert_eq!(writes.len(), 5);
    assert!(writes[1].content.contains("|GUIDRef|xs:string|required|"));
    assert!(writes[3].content.contains("| Flat bracket | %%flat%% |"));
}

#[test]
fn publish_before_ingest_is_rejected() {
    let manager = PublishManager::new(MockTransport::default(), "publisher");
    let plate = plate_schema().elements[0].clone();
    assert!(matches!(
        manager.publish_element(&plate).unwrap_err(),
        Error::NotIngested
    ));
    assert!(matches!(
        manager.publish_all_enums().unwrap_err(),
        Error::NotIngested
    ));
}

#[test]
fn page_footer_roundtrips_publish_metadata() {
    let manager = ingested_manager(&plate_schema());
    let plate = manager.elements().unwrap()[0].clone();
    assert!(manager.publish_element(&plate).unwrap());

    let writes = manager.transport().writes();
    let entries = struct_data::decode(&writes[0].content).unwrap();
    assert_eq!(entries["Schema Version"], "3.0.0");
    assert_eq!(entries["Namespace URI"], OCX_NS);
    assert_eq!(entries["Author"], "publisher");
    assert_eq!(entries["Status"], "DRAFT");
    assert_eq!(entries["Publisher Version"], schemawiki::VERSION);
}

#[test]
fn footer_namespace_follows_the_published_entity() {
    let mut schema = plate_schema();
    schema.enumerators = vec![Enumerator {
        name: "RefTypeValue".to_string(),
        prefix: "ocx".to_string(),
        namespace: "https://3docx.org/refs".to_string(),
        values: vec!["EXTERNAL".to_string()],
        descriptions: vec!["External reference".to_string()],
    }];
    let manager = ingested_manager(&schema);
    let plate = manager.elements().unwrap()[0].clone();
    let reftype = manager.enumerators().unwrap()[0].clone();

    assert!(manager.publish_element(&plate).unwrap());
    assert!(manager.publish_enum(&reftype).unwrap());

    let writes = manager.transport().writes();
    let plate_entries = struct_data::decode(&writes[0].content).unwrap();
    let reftype_entries = struct_data::decode(&writes[1].content).unwrap();
    assert_eq!(plate_entries["Namespace URI"], OCX_NS);
    assert_eq!(reftype_entries["Namespace URI"], "https://3docx.org/refs");
    // The shared metadata record keeps the schema's target namespace
    assert_eq!(manager.metadata().unwrap().namespace, OCX_NS);
}
