//! Nested key-value view of NETCONF reply documents.
//!
//! Replies are parsed once into an [`XmlElement`] tree. Element names are
//! stored without their namespace prefix (`lotee:target-power` becomes
//! `target-power`), and repeated children are always exposed as a sequence,
//! so a table with zero, one or many rows is read the same way.

use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{WdmError, WdmResult};

/// One element of a parsed reply document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Creates an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Self {
        Self::new(String::from_utf8_lossy(start.local_name().as_ref()).into_owned())
    }

    /// Parses a document and returns its root element.
    ///
    /// # Errors
    ///
    /// Returns [`WdmError::Rpc`] with the raw document attached if the XML is
    /// malformed, unbalanced or empty.
    pub fn parse(xml: &str) -> WdmResult<XmlElement> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        // Index 0 is a synthetic document node collecting top-level elements.
        let mut stack = vec![XmlElement::default()];

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => stack.push(XmlElement::from_start(&e)),
                Ok(Event::Empty(e)) => {
                    let element = XmlElement::from_start(&e);
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(element);
                    }
                }
                Ok(Event::End(_)) => {
                    if stack.len() < 2 {
                        return Err(malformed(xml, "unexpected closing tag"));
                    }
                    if let Some(element) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(element);
                        }
                    }
                }
                Ok(Event::Text(t)) => {
                    let text = t
                        .unescape()
                        .map_err(|e| malformed(xml, &e.to_string()))?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text);
                    }
                }
                Ok(Event::CData(c)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&c));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(malformed(
                        xml,
                        &format!("at position {}: {}", reader.buffer_position(), e),
                    ))
                }
            }
        }

        if stack.len() != 1 {
            return Err(malformed(xml, "unclosed element"));
        }
        let mut document = stack.pop().unwrap_or_default();
        match document.children.len() {
            0 => Err(malformed(xml, "empty document")),
            1 => Ok(document.children.remove(0)),
            _ => Err(malformed(xml, "multiple root elements")),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trimmed text content of this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follows a path of child names.
    pub fn find(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter()
            .try_fold(self, |element, name| element.child(name))
    }

    /// Text at `path`, or an RPC error naming the missing element.
    pub fn text_at(&self, path: &[&str]) -> WdmResult<&str> {
        self.find(path).map(|e| e.text()).ok_or_else(|| {
            WdmError::rpc(
                format!("read {}", self.name),
                format!("missing element {}", path.join("/")),
                "",
            )
        })
    }

    /// Parses the text at `path` into `T`.
    pub fn parse_at<T>(&self, path: &[&str]) -> WdmResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let text = self.text_at(path)?;
        text.parse::<T>().map_err(|e| {
            WdmError::rpc(
                format!("read {}", self.name),
                format!("invalid value '{}' at {}: {}", text, path.join("/"), e),
                "",
            )
        })
    }
}

fn malformed(xml: &str, message: &str) -> WdmError {
    WdmError::rpc("parse reply", format!("malformed XML: {}", message), xml)
}
