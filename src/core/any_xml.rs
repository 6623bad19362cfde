//! Generic XML object model.
//!
//! Vendor payloads such as `<UserData>` have no fixed schema, so they are
//! decoded into a plain tree of [`AnyXml`] nodes: tag, attributes, trimmed
//! character data and ordered children. The same model backs the whole
//! event document; the structured decoder in
//! [`xml_parser`](crate::core::xml_parser) then projects the well-known
//! fields out of it.
//!
//! Nesting depth is unbounded. Decoding, conversion and drop all walk the
//! tree with an explicit stack, never the call stack.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::util::error::{DecodeError, Result};

/// One XML element whose shape is not known ahead of time.
///
/// A node with no attributes, text or children is a valid leaf and still
/// converts to a mapping carrying its tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnyXml {
    /// Local name of the element (namespace prefix stripped).
    pub tag: String,
    /// Attributes by local name, in document order.
    pub attributes: Vec<(String, String)>,
    /// Character data directly inside the element. Each text token is
    /// trimmed before being appended, so indentation between child
    /// elements contributes nothing.
    pub text: String,
    /// The same character data with no trimming applied. Fixed-schema
    /// string fields read this.
    pub raw_text: String,
    /// Nested elements in document order.
    pub children: Vec<AnyXml>,
}

impl AnyXml {
    /// Decode a whole document into a tree rooted at its root element.
    ///
    /// Prolog tokens (declaration, comments, processing instructions,
    /// DOCTYPE, whitespace) are skipped. Anything after the root element is
    /// not read.
    pub fn from_document(xml: &[u8]) -> Result<AnyXml> {
        let mut reader = Reader::from_reader(xml);
        loop {
            match reader.read_event()? {
                Event::Start(start) => return AnyXml::decode(&mut reader, &start),
                Event::Empty(start) => return AnyXml::from_start(&start),
                Event::End(_) => return Err(DecodeError::UnexpectedToken { kind: "end tag" }),
                Event::Eof => return Err(DecodeError::UnexpectedEof { tag: String::new() }),
                _ => {}
            }
        }
    }

    /// Decode the element opened by `start`, consuming tokens from `reader`
    /// up to and including its matching end tag.
    ///
    /// Open ancestors are held in `parents`; an end tag attaches the
    /// finished node to the innermost one.
    pub fn decode<'a>(reader: &mut Reader<&'a [u8]>, start: &BytesStart<'a>) -> Result<AnyXml> {
        let mut node = AnyXml::from_start(start)?;
        let mut parents: Vec<AnyXml> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(child) => {
                    let child = AnyXml::from_start(&child)?;
                    parents.push(std::mem::replace(&mut node, child));
                }
                Event::Empty(child) => node.children.push(AnyXml::from_start(&child)?),
                Event::Text(text) => {
                    let text = text.unescape().map_err(quick_xml::Error::from)?;
                    node.push_chardata(&text);
                }
                Event::CData(cdata) => {
                    let text = cdata.decode().map_err(quick_xml::Error::from)?;
                    node.push_chardata(&text);
                }
                Event::End(_) => match parents.pop() {
                    Some(parent) => {
                        let done = std::mem::replace(&mut node, parent);
                        node.children.push(done);
                    }
                    None => return Ok(node),
                },
                Event::Comment(_) | Event::PI(_) | Event::Decl(_) => {}
                Event::Eof => {
                    return Err(DecodeError::UnexpectedEof {
                        tag: std::mem::take(&mut node.tag),
                    })
                }
                other => {
                    return Err(DecodeError::UnexpectedToken {
                        kind: token_kind(&other),
                    })
                }
            }
        }
    }

    /// Build a childless node from a start (or self-closing) tag.
    fn from_start(start: &BytesStart<'_>) -> Result<AnyXml> {
        let tag = std::str::from_utf8(start.local_name().as_ref())?.to_owned();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = std::str::from_utf8(attr.key.local_name().as_ref())?.to_owned();
            let value = attr.unescape_value().map_err(quick_xml::Error::from)?;
            attributes.push((key, value.into_owned()));
        }

        let mut node = AnyXml::new(tag);
        node.attributes = attributes;
        Ok(node)
    }

    /// A leaf with only a tag.
    pub fn new(tag: impl Into<String>) -> AnyXml {
        AnyXml {
            tag: tag.into(),
            attributes: Vec::new(),
            text: String::new(),
            raw_text: String::new(),
            children: Vec::new(),
        }
    }

    fn push_chardata(&mut self, raw: &str) {
        self.text.push_str(raw.trim());
        self.raw_text.push_str(raw);
    }

    /// Find the first direct child with the given local name.
    pub fn child(&self, local_name: &str) -> Option<&AnyXml> {
        self.children.iter().find(|c| c.tag == local_name)
    }

    /// Iterate over all direct children with the given local name.
    pub fn children_named<'s>(&'s self, local_name: &'s str) -> impl Iterator<Item = &'s AnyXml> {
        self.children.iter().filter(move |c| c.tag == local_name)
    }

    /// Look up an attribute value by local name.
    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == local_name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert to value form.
    ///
    /// Always includes `tag`; `attributes`, `chardata` and `children` only
    /// when non-empty. Children are converted before their parent, so the
    /// walk keeps one frame per open ancestor.
    pub fn as_map(&self) -> Map<String, Value> {
        let mut stack = vec![Frame::new(self)];
        let mut converted = Map::new();

        while let Some(top) = stack.last_mut() {
            let node = top.node;
            if let Some(child) = node.children.get(top.next) {
                top.next += 1;
                stack.push(Frame::new(child));
                continue;
            }

            let children = std::mem::take(&mut top.children);
            stack.pop();
            let map = node.shallow_map(children);
            match stack.last_mut() {
                Some(parent) => parent.children.push(Value::Object(map)),
                None => converted = map,
            }
        }

        converted
    }

    /// This node's own sections plus already converted children.
    fn shallow_map(&self, children: Vec<Value>) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("tag".into(), Value::String(self.tag.clone()));

        if !self.attributes.is_empty() {
            let attributes = self
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            map.insert("attributes".into(), Value::Object(attributes));
        }

        if !self.text.is_empty() {
            map.insert("chardata".into(), Value::String(self.text.clone()));
        }

        if !children.is_empty() {
            map.insert("children".into(), Value::Array(children));
        }

        map
    }
}

/// One node of an in-progress [`AnyXml::as_map`] walk.
struct Frame<'n> {
    node: &'n AnyXml,
    next: usize,
    children: Vec<Value>,
}

impl<'n> Frame<'n> {
    fn new(node: &'n AnyXml) -> Self {
        Frame {
            node,
            next: 0,
            children: Vec::new(),
        }
    }
}

impl Drop for AnyXml {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

fn token_kind(event: &Event<'_>) -> &'static str {
    match event {
        Event::DocType(_) => "DOCTYPE",
        Event::Decl(_) => "declaration",
        Event::PI(_) => "processing instruction",
        _ => "markup",
    }
}
