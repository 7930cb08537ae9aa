/*!
 * Minimal XML element tree built on quick-xml's pull reader
 *
 * Package entries are small, so they are read into a tree of elements keyed
 * by local name (namespace prefixes dropped) and then mapped onto the model.
 */

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::error::{FormatError, FormatResult};

/// An XML element with its attributes, text and child elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Local name of the element
    pub name: String,
    /// Attributes as (local name, unescaped value)
    pub attributes: Vec<(String, String)>,
    /// Concatenated text and CDATA directly inside this element
    pub text: String,
    /// Child elements in document order
    pub children: Vec<Element>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child element with the given local name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements with the given local name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first child element with the given local name
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }
}

fn open_element(start: &BytesStart<'_>) -> FormatResult<Element> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        name,
        attributes,
        ..Element::default()
    })
}

/// Parse an XML document and return its root element
pub fn parse(entry: &str, xml: &str) -> FormatResult<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(open_element(&start)?),
            Event::Empty(start) => {
                let element = open_element(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| FormatError::malformed(entry, "unbalanced closing tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(FormatError::malformed(entry, "unexpected end of document"));
    }
    root.ok_or_else(|| FormatError::malformed(entry, "no root element"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_with_namespaces() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<x:root xmlns:x="urn:test" x:version="2.0">
  <item id="1"><title>A &amp; B</title></item>
  <item id="2"/>
  <note><![CDATA[<raw>]]></note>
</x:root>"#;
        let root = parse("test.xml", xml).unwrap();

        assert_eq!(root.name, "root");
        assert_eq!(root.attr("version"), Some("2.0"));
        let items: Vec<_> = root.children_named("item").collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].child_text("title"), Some("A & B"));
        assert_eq!(items[1].attr("id"), Some("2"));
        assert_eq!(root.child_text("note"), Some("<raw>"));
    }

    #[test]
    fn test_unclosed_document_is_malformed() {
        let result = parse("test.xml", "<root><child>");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_input_has_no_root() {
        assert!(matches!(
            parse("test.xml", ""),
            Err(FormatError::Malformed { .. })
        ));
    }
}
