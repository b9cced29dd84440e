//! DokuWiki XML-RPC client
//!
//! Blocking [`WikiTransport`] implementation against DokuWiki's
//! `lib/exe/xmlrpc.php` endpoint. Method calls are written with
//! `quick-xml` and responses parsed with `roxmltree`; only the scalar,
//! struct and array value shapes DokuWiki actually uses are supported.
//! The login call establishes a session cookie kept by the HTTP client.

use indexmap::IndexMap;
use log::error;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use url::Url;

use crate::error::{Error, Result};
use crate::struct_data;
use crate::transport::{ListOptions, PageInfo, WikiTransport};

/// XML-RPC endpoint path below the wiki root
const XMLRPC_PATH: &str = "lib/exe/xmlrpc.php";

/// XML-RPC value
#[derive(Debug, Clone, PartialEq)]
enum Value {
    /// `<string>` or untyped text
    Str(String),
    /// `<int>` / `<i4>`
    Int(i64),
    /// `<boolean>`
    Bool(bool),
    /// `<struct>` members in document order
    Struct(Vec<(String, Value)>),
    /// `<array>` data
    Array(Vec<Value>),
}

impl Value {
    fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(flag) => Some(*flag),
            Value::Int(number) => Some(*number != 0),
            _ => None,
        }
    }

    fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(number) => Some(*number),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(text) => Some(text),
            _ => None,
        }
    }
}

fn write_tag(
    writer: &mut Writer<Vec<u8>>,
    tag: &str,
    text: &str,
) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_value(writer: &mut Writer<Vec<u8>>, value: &Value) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("value")))?;
    match value {
        Value::Str(text) => write_tag(writer, "string", text)?,
        Value::Int(number) => write_tag(writer, "int", &number.to_string())?,
        Value::Bool(flag) => write_tag(writer, "boolean", if *flag { "1" } else { "0" })?,
        Value::Struct(members) => {
            writer.write_event(Event::Start(BytesStart::new("struct")))?;
            for (name, member) in members {
                writer.write_event(Event::Start(BytesStart::new("member")))?;
                write_tag(writer, "name", name)?;
                write_value(writer, member)?;
                writer.write_event(Event::End(BytesEnd::new("member")))?;
            }
            writer.write_event(Event::End(BytesEnd::new("struct")))?;
        }
        Value::Array(items) => {
            writer.write_event(Event::Start(BytesStart::new("array")))?;
            writer.write_event(Event::Start(BytesStart::new("data")))?;
            for item in items {
                write_value(writer, item)?;
            }
            writer.write_event(Event::End(BytesEnd::new("data")))?;
            writer.write_event(Event::End(BytesEnd::new("array")))?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new("value")))?;
    Ok(())
}

fn build_call(
    writer: &mut Writer<Vec<u8>>,
    method: &str,
    params: &[Value],
) -> quick_xml::Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("methodCall")))?;
    write_tag(writer, "methodName", method)?;
    writer.write_event(Event::Start(BytesStart::new("params")))?;
    for param in params {
        writer.write_event(Event::Start(BytesStart::new("param")))?;
        write_value(writer, param)?;
        writer.write_event(Event::End(BytesEnd::new("param")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("params")))?;
    writer.write_event(Event::End(BytesEnd::new("methodCall")))?;
    Ok(())
}

/// Serialize a method call to its XML-RPC request body.
fn method_call(method: &str, params: &[Value]) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    build_call(&mut writer, method, params).map_err(|e| Error::Xml(e.to_string()))?;
    String::from_utf8(writer.into_inner()).map_err(|e| Error::Xml(e.to_string()))
}

fn read_value(node: roxmltree::Node<'_, '_>) -> Result<Value> {
    let typed = match node.children().find(|child| child.is_element()) {
        Some(typed) => typed,
        // An untyped <value> defaults to string
        None => return Ok(Value::Str(node.text().unwrap_or_default().to_string())),
    };
    match typed.tag_name().name() {
        "string" => Ok(Value::Str(typed.text().unwrap_or_default().to_string())),
        "int" | "i4" => typed
            .text()
            .unwrap_or_default()
            .trim()
            .parse()
            .map(Value::Int)
            .map_err(|e| Error::Xml(format!("invalid XML-RPC integer: {}", e))),
        "boolean" => Ok(Value::Bool(typed.text().unwrap_or_default().trim() == "1")),
        "struct" => {
            let mut members = Vec::new();
            for member in typed.children().filter(|c| c.has_tag_name("member")) {
                let name = member
                    .children()
                    .find(|c| c.has_tag_name("name"))
                    .and_then(|c| c.text())
                    .unwrap_or_default()
                    .to_string();
                let value = member
                    .children()
                    .find(|c| c.has_tag_name("value"))
                    .ok_or_else(|| Error::Xml("struct member without value".to_string()))?;
                members.push((name, read_value(value)?));
            }
            Ok(Value::Struct(members))
        }
        "array" => {
            let data = typed
                .children()
                .find(|c| c.has_tag_name("data"))
                .ok_or_else(|| Error::Xml("array without data".to_string()))?;
            let mut items = Vec::new();
            for value in data.children().filter(|c| c.has_tag_name("value")) {
                items.push(read_value(value)?);
            }
            Ok(Value::Array(items))
        }
        other => Err(Error::Xml(format!(
            "unsupported XML-RPC type '{}'",
            other
        ))),
    }
}

/// Parse an XML-RPC response body into its single result value.
///
/// A `<fault>` response surfaces as [`Error::Transport`] carrying the
/// fault string.
fn parse_response(body: &str) -> Result<Value> {
    let document =
        roxmltree::Document::parse(body).map_err(|e| Error::Xml(e.to_string()))?;
    let root = document.root_element();
    if !root.has_tag_name("methodResponse") {
        return Err(Error::Xml(format!(
            "unexpected response root '{}'",
            root.tag_name().name()
        )));
    }
    if let Some(fault) = root.children().find(|c| c.has_tag_name("fault")) {
        let value = fault
            .children()
            .find(|c| c.has_tag_name("value"))
            .ok_or_else(|| Error::Xml("fault without value".to_string()))?;
        let mut code = 0;
        let mut message = String::from("unknown fault");
        if let Value::Struct(members) = read_value(value)? {
            for (name, member) in members {
                match name.as_str() {
                    "faultCode" => code = member.as_int().unwrap_or(0),
                    "faultString" => {
                        if let Some(text) = member.as_str() {
                            message = text.to_string();
                        }
                    }
                    _ => {}
                }
            }
        }
        return Err(Error::Transport(format!("fault {}: {}", code, message)));
    }
    let value = root
        .descendants()
        .find(|node| node.has_tag_name("value"))
        .ok_or_else(|| Error::Xml("response without value".to_string()))?;
    read_value(value)
}

/// Blocking XML-RPC client for a DokuWiki instance.
pub struct DokuWikiClient {
    endpoint: Url,
    http: reqwest::blocking::Client,
}

impl DokuWikiClient {
    /// Create a client for the wiki at `url`.
    pub fn new(url: &str) -> Result<Self> {
        let base = Url::parse(url)?;
        let endpoint = base.join(XMLRPC_PATH)?;
        let http = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Self { endpoint, http })
    }

    /// Endpoint the client posts method calls to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn call(&self, method: &str, params: &[Value]) -> Result<Value> {
        let body = method_call(method, params)?;
        let response = self
            .http
            .post(self.endpoint.clone())
            .header("Content-Type", "text/xml")
            .body(body)
            .send()
            .map_err(|e| Error::Transport(e.to_string()))?;
        let text = response
            .text()
            .map_err(|e| Error::Transport(e.to_string()))?;
        parse_response(&text)
    }

    /// Fetch a page and decode its embedded dataentry block.
    pub fn get_data(&self, page: &str) -> Result<IndexMap<String, String>> {
        let content = self.get_page(page)?;
        struct_data::decode(&content)
    }
}

impl WikiTransport for DokuWikiClient {
    fn login(&self, user: &str, password: &str) -> Result<bool> {
        let result = self.call(
            "dokuwiki.login",
            &[
                Value::Str(user.to_string()),
                Value::Str(password.to_string()),
            ],
        )?;
        Ok(result.as_bool().unwrap_or(false))
    }

    fn list_pages(
        &self,
        namespace: &str,
        options: ListOptions,
    ) -> Result<IndexMap<String, PageInfo>> {
        let option_struct = Value::Struct(vec![
            ("depth".to_string(), Value::Int(i64::from(options.depth))),
            ("hash".to_string(), Value::Bool(options.hash)),
            ("skipacl".to_string(), Value::Bool(options.skip_acl)),
        ]);
        let result = self.call(
            "dokuwiki.getPagelist",
            &[Value::Str(namespace.to_string()), option_struct],
        )?;
        let items = match result {
            Value::Array(items) => items,
            other => {
                return Err(Error::Xml(format!(
                    "page list is not an array: {:?}",
                    other
                )))
            }
        };
        let mut pages = IndexMap::new();
        for item in items {
            let members = match item {
                Value::Struct(members) => members,
                _ => continue,
            };
            let mut info = PageInfo::default();
            for (name, value) in members {
                match name.as_str() {
                    "id" => info.id = value.as_str().unwrap_or_default().to_string(),
                    "rev" => info.rev = value.as_int().unwrap_or(0),
                    "mtime" => info.mtime = value.as_int().unwrap_or(0),
                    "size" => info.size = value.as_int().unwrap_or(0),
                    _ => {}
                }
            }
            if !info.id.is_empty() {
                pages.insert(info.id.clone(), info);
            }
        }
        Ok(pages)
    }

    fn get_page(&self, page: &str) -> Result<String> {
        let result = self.call("wiki.getPage", &[Value::Str(page.to_string())])?;
        Ok(result.as_str().unwrap_or_default().to_string())
    }

    fn set_page(
        &self,
        page: &str,
        content: &str,
        summary: &str,
        namespace: &str,
        minor: bool,
    ) -> Result<bool> {
        let id = format!("{}:{}", namespace, page);
        let attrs = Value::Struct(vec![
            ("sum".to_string(), Value::Str(summary.to_string())),
            ("minor".to_string(), Value::Bool(minor)),
        ]);
        match self.call(
            "wiki.putPage",
            &[
                Value::Str(id.clone()),
                Value::Str(content.to_string()),
                attrs,
            ],
        ) {
            // A valueless success response counts as written
            Ok(result) => Ok(result.as_bool().unwrap_or(true)),
            Err(Error::Transport(reason)) => {
                error!("failed to write page '{}': {}", id, reason);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}
