//! DokuWiki markup rendering
//!
//! Stateless page composition for the three entity shapes: elements,
//! enumerations and attributes. The renderer never talks to the network;
//! it turns resolved schema entities and the publish metadata into
//! complete page bodies ending in a structured-data footer.

use indexmap::IndexMap;

use crate::schema::{Enumerator, SchemaAttribute, SchemaElement};
use crate::struct_data::{self, PublishMetadata};

/// Name of the dataentry block embedded in every page
const DATA_ENTRY: &str = "version";

/// Render a level 3 dokuwiki page header.
pub fn page_header(name: &str) -> String {
    format!("===={}====\n\n\n", name)
}

/// Render dokuwiki body text.
pub fn page_text(text: &str) -> String {
    format!("{}\n", text)
}

/// Wrap `text` so the wiki does not auto-link it.
fn no_link(text: &str) -> String {
    format!("%%{}%%", text)
}

/// Render columns to a dokuwiki table.
///
/// Column headers are wrapped in `%%...%%` to suppress auto-linking.
/// Rows are assembled column-major in the map's key order; ragged
/// columns pad with empty cells.
pub fn table(columns: &IndexMap<String, Vec<String>>) -> String {
    let rows = columns.values().map(Vec::len).max().unwrap_or(0);
    let mut content = String::from("^");
    for header in columns.keys() {
        content.push_str(&format!(" {} ^", no_link(header)));
    }
    content.push('\n');
    for row in 0..rows {
        content.push('|');
        for cells in columns.values() {
            let cell = cells.get(row).map(String::as_str).unwrap_or("");
            content.push_str(&format!(" {} |", cell));
        }
        content.push('\n');
    }
    content
}

/// Render a single-row key/value table.
pub fn field_row(fields: &IndexMap<String, String>) -> String {
    let mut content = String::from("^");
    for key in fields.keys() {
        content.push_str(&format!("{}^", no_link(key)));
    }
    content.push_str("\n|");
    for value in fields.values() {
        content.push_str(&format!("{}|", value));
    }
    content.push_str("\n\n");
    content
}

fn children_columns(element: &SchemaElement) -> IndexMap<String, Vec<String>> {
    let mut names = Vec::new();
    let mut types = Vec::new();
    for child in &element.children {
        names.push(child.name.clone());
        types.push(child.type_name.clone());
    }
    IndexMap::from([("Name".to_string(), names), ("Type".to_string(), types)])
}

fn attribute_columns(element: &SchemaElement) -> IndexMap<String, Vec<String>> {
    let mut names = Vec::new();
    let mut types = Vec::new();
    for attribute in &element.attributes {
        names.push(attribute.name.clone());
        types.push(attribute.type_name.clone());
    }
    IndexMap::from([("Name".to_string(), names), ("Type".to_string(), types)])
}

/// Render a global element to a complete page body.
pub fn element_page(element: &SchemaElement, metadata: &PublishMetadata) -> String {
    let mut content = page_header(&element.name);
    content.push_str(&page_text(&element.annotation));
    if !element.children.is_empty() {
        content.push_str(&format!(
            "{} has the following child elements:\n",
            no_link(&element.name)
        ));
        content.push_str(&format!("\n{}\n\n", table(&children_columns(element))));
    }
    if !element.attributes.is_empty() {
        content.push_str(&format!(
            "{} has the following attributes:\n",
            no_link(&element.name)
        ));
        content.push_str(&format!("\n{}\n\n", table(&attribute_columns(element))));
    }
    content.push_str(&struct_data::encode(DATA_ENTRY, &metadata.to_entries()));
    content
}

/// Render an enumeration to a complete page body.
///
/// Every literal value is wrapped in `%%...%%` to keep the wiki from
/// auto-linking it.
pub fn enum_page(enumerator: &Enumerator, metadata: &PublishMetadata) -> String {
    let mut content = page_header(&enumerator.name);
    if !enumerator.values.is_empty() {
        let values = enumerator.values.iter().map(|value| no_link(value)).collect();
        let columns = IndexMap::from([
            ("Description".to_string(), enumerator.descriptions.clone()),
            ("Value".to_string(), values),
        ]);
        content.push_str(&format!(
            "{} has the following values:\n",
            no_link(&enumerator.name)
        ));
        content.push_str(&format!("\n{}\n\n", table(&columns)));
    }
    content.push_str(&struct_data::encode(DATA_ENTRY, &metadata.to_entries()));
    content
}

/// Render a global attribute or simple type to a complete page body.
pub fn attribute_page(attribute: &SchemaAttribute, metadata: &PublishMetadata) -> String {
    let mut content = page_header(&attribute.name);
    content.push_str(&format!(
        "{} has the following values:\n",
        no_link(&attribute.name)
    ));
    content.push_str(&format!("\n{}\n", field_row(&attribute.fields())));
    content.push_str(&struct_data::encode(DATA_ENTRY, &metadata.to_entries()));
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeRef, ChildRef};
    use pretty_assertions::assert_eq;

    fn metadata() -> PublishMetadata {
        PublishMetadata {
            schema_version: "3.0.0".to_string(),
            schema_location: "https://3docx.org/ocx.xsd".to_string(),
            namespace: "https://3docx.org/ocx".to_string(),
            author: "publisher".to_string(),
            date: "Jan 01 2026 00:00:00".to_string(),
            status: "DRAFT".to_string(),
            publisher_version: "0.2.0".to_string(),
        }
    }

    #[test]
    fn test_page_header() {
        assert_eq!(page_header("Plate"), "====Plate====\n\n\n");
    }

    #[test]
    fn test_table_headers_protected() {
        let columns = IndexMap::from([
            ("Name".to_string(), vec!["Thickness".to_string()]),
            ("Type".to_string(), vec!["ocx:LengthType".to_string()]),
        ]);
        let rendered = table(&columns);
        assert_eq!(
            rendered,
            "^ %%Name%% ^ %%Type%% ^\n| Thickness | ocx:LengthType |\n"
        );
    }

    #[test]
    fn test_table_pads_ragged_columns() {
        let columns = IndexMap::from([
            ("Description".to_string(), vec!["First".to_string()]),
            (
                "Value".to_string(),
                vec!["%%A%%".to_string(), "%%B%%".to_string()],
            ),
        ]);
        let rendered = table(&columns);
        assert_eq!(
            rendered,
            "^ %%Description%% ^ %%Value%% ^\n| First | %%A%% |\n|  | %%B%% |\n"
        );
    }

    #[test]
    fn test_field_row() {
        let fields = IndexMap::from([
            ("Name".to_string(), "id".to_string()),
            ("Type".to_string(), "xs:ID".to_string()),
        ]);
        assert_eq!(field_row(&fields), "^%%Name%%^%%Type%%^\n|id|xs:ID|\n\n");
    }

    #[test]
    fn test_element_page_sections() {
        let element = SchemaElement {
            name: "Plate".to_string(),
            prefix: "ocx".to_string(),
            namespace: "https://3docx.org/ocx".to_string(),
            annotation: "A plate element.".to_string(),
            children: vec![ChildRef {
                name: "Thickness".to_string(),
                prefix: "ocx".to_string(),
                type_name: "ocx:LengthType".to_string(),
            }],
            attributes: vec![AttributeRef {
                name: "id".to_string(),
                prefix: "ocx".to_string(),
                type_name: "xs:ID".to_string(),
            }],
        };
        let page = element_page(&element, &metadata());
        assert!(page.starts_with("====Plate====\n\n\n"));
        assert!(page.contains("A plate element.\n"));
        assert!(page.contains("%%Plate%% has the following child elements:\n"));
        assert!(page.contains("%%Plate%% has the following attributes:\n"));
        assert!(page.contains("| Thickness | ocx:LengthType |"));
        assert!(page.contains("---- dataentry version ----\n"));
        assert!(page.trim_end().ends_with("----"));
    }

    #[test]
    fn test_element_page_without_children_skips_table() {
        let element = SchemaElement {
            name: "Plate".to_string(),
            prefix: "ocx".to_string(),
            namespace: "https://3docx.org/ocx".to_string(),
            annotation: "A plate element.".to_string(),
            children: Vec::new(),
            attributes: Vec::new(),
        };
        let page = element_page(&element, &metadata());
        assert!(!page.contains("child elements"));
        assert!(!page.contains("attributes:"));
    }

    #[test]
    fn test_enum_page_wraps_values() {
        let enumerator = Enumerator {
            name: "BracketType".to_string(),
            prefix: "ocx".to_string(),
            namespace: "https://3docx.org/ocx".to_string(),
            values: vec!["flat".to_string(), "curved".to_string()],
            descriptions: vec!["Flat bracket".to_string(), "Curved bracket".to_string()],
        };
        let page = enum_page(&enumerator, &metadata());
        assert!(page.contains("%%BracketType%% has the following values:\n"));
        assert!(page.contains("| Flat bracket | %%flat%% |"));
        assert!(page.contains("| Curved bracket | %%curved%% |"));
    }

    #[test]
    fn test_attribute_page_single_row() {
        let attribute = SchemaAttribute {
            name: "GUIDRef".to_string(),
            prefix: "ocx".to_string(),
            namespace: "https://3docx.org/ocx".to_string(),
            type_name: "xs:string".to_string(),
            use_constraint: "required".to_string(),
            default: String::new(),
            description: "Reference to a GUID".to_string(),
        };
        let page = attribute_page(&attribute, &metadata());
        assert!(page.contains("%%GUIDRef%% has the following values:\n"));
        assert!(page.contains("^%%Name%%^%%Type%%^%%Use%%^%%Default%%^%%Description%%^"));
        assert!(page.contains("|GUIDRef|xs:string|required||Reference to a GUID|"));
    }

    #[test]
    fn test_footer_roundtrips() {
        let element = SchemaElement {
            name: "Plate".to_string(),
            prefix: "ocx".to_string(),
            namespace: "https://3docx.org/ocx".to_string(),
            annotation: String::new(),
            children: Vec::new(),
            attributes: Vec::new(),
        };
        let page = element_page(&element, &metadata());
        let decoded = crate::struct_data::decode(&page).unwrap();
        assert_eq!(decoded, metadata().to_entries());
    }
}
