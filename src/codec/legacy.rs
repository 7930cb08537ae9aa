/*!
 * Legacy XML package codec
 *
 * Layout handled here:
 * - `content.xml`: `xmap-content` > `sheet` > (`topic`, `title`)
 * - `comments.xml`: `comments` > `comment[@object-id]` > `content`
 * - `meta.xml` and `META-INF/manifest.xml` as supporting entries
 */

use std::collections::HashMap;
use std::io::{self, Write};

use log::warn;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::error::{FormatError, FormatResult};
use super::xml::{self, Element};
use super::{Codec, Fidelity, FormatKind, LossyField};
use crate::package::Package;
use crate::types::{Document, Sheet, Topic, DEFAULT_TITLE};
use crate::utils::{new_id, timestamp_millis};

/// Primary document entry
pub const CONTENT_ENTRY: &str = "content.xml";
/// Topic comments, linked to topics by id
pub const COMMENTS_ENTRY: &str = "comments.xml";
/// Package metadata
pub const META_ENTRY: &str = "meta.xml";
/// Package manifest
pub const MANIFEST_ENTRY: &str = "META-INF/manifest.xml";

const CONTENT_NS: &str = "urn:xmind:xmap:xmlns:content:2.0";
const COMMENTS_NS: &str = "urn:xmind:xmap:xmlns:comments:2.0";
const META_NS: &str = "urn:xmind:xmap:xmlns:meta:2.0";
const MANIFEST_NS: &str = "urn:xmind:xmap:xmlns:manifest:1.0";
const ROOT_STRUCTURE: &str = "org.xmind.ui.map.unbalanced";

/// Codec for the XML-based package format
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyCodec;

impl LegacyCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for LegacyCodec {
    fn kind(&self) -> FormatKind {
        FormatKind::Legacy
    }

    fn fidelity(&self) -> Fidelity {
        Fidelity::Full
    }

    fn decode_with_skipped(
        &self,
        package: &Package,
    ) -> FormatResult<(Document, Vec<LossyField>)> {
        let root = xml::parse(CONTENT_ENTRY, package.read_str(CONTENT_ENTRY)?)?;
        if root.name != "xmap-content" {
            return Err(FormatError::malformed(
                CONTENT_ENTRY,
                format!("unexpected root element <{}>", root.name),
            ));
        }

        let comments = if package.contains(COMMENTS_ENTRY) {
            read_comments(package.read_str(COMMENTS_ENTRY)?)?
        } else {
            HashMap::new()
        };

        let sheets = root
            .children_named("sheet")
            .map(|sheet| decode_sheet(sheet, &comments))
            .collect::<FormatResult<Vec<_>>>()?;

        let document = Document::from_sheets(sheets)
            .ok_or_else(|| FormatError::malformed(CONTENT_ENTRY, "document has no sheets"))?;
        Ok((document, Vec::new()))
    }

    fn encode(&self, document: &Document, package: &mut Package) -> FormatResult<()> {
        let timestamp = timestamp_millis();
        let mut comments = Vec::new();

        let content = write_content(document, &timestamp, &mut comments)?;
        package.insert(CONTENT_ENTRY, content);

        if comments.is_empty() {
            package.remove(COMMENTS_ENTRY);
        } else {
            package.insert(COMMENTS_ENTRY, write_comments(&comments, &timestamp)?);
        }

        if !package.contains(META_ENTRY) {
            package.insert(META_ENTRY, write_meta()?);
        }

        let names: Vec<String> = package
            .names()
            .filter(|name| *name != MANIFEST_ENTRY)
            .map(String::from)
            .collect();
        package.insert(MANIFEST_ENTRY, write_manifest(&names)?);

        Ok(())
    }
}

/// Map `object-id` to comment text, joining multiple comments on one topic
fn read_comments(xml: &str) -> FormatResult<HashMap<String, String>> {
    let root = xml::parse(COMMENTS_ENTRY, xml)?;
    let mut comments: HashMap<String, String> = HashMap::new();

    for comment in root.children_named("comment") {
        let (Some(id), Some(text)) = (comment.attr("object-id"), comment.child_text("content"))
        else {
            continue;
        };
        comments
            .entry(id.to_string())
            .and_modify(|existing| {
                existing.push('\n');
                existing.push_str(text);
            })
            .or_insert_with(|| text.to_string());
    }

    Ok(comments)
}

fn decode_sheet(sheet: &Element, comments: &HashMap<String, String>) -> FormatResult<Sheet> {
    let topic = sheet
        .child("topic")
        .ok_or_else(|| FormatError::malformed(CONTENT_ENTRY, "sheet without a root topic"))?;
    let title = sheet.child_text("title").unwrap_or_default();
    Ok(Sheet::new(title, decode_topic(topic, comments)))
}

fn decode_topic(element: &Element, comments: &HashMap<String, String>) -> Topic {
    let mut topic = Topic::new(element.child_text("title").unwrap_or(DEFAULT_TITLE));

    topic.note = element
        .child("notes")
        .and_then(|notes| notes.child_text("plain"))
        .filter(|text| !text.is_empty())
        .map(String::from);

    topic.comment = element
        .attr("id")
        .and_then(|id| comments.get(id))
        .cloned();

    if let Some(refs) = element.child("marker-refs") {
        topic.markers = refs
            .children_named("marker-ref")
            .filter_map(|r| r.attr("marker-id"))
            .map(String::from)
            .collect();
    }

    if let Some(labels) = element.child("labels") {
        topic.labels = labels
            .children_named("label")
            .map(|l| l.text.clone())
            .collect();
    }

    if let Some(children) = element.child("children") {
        for group in children.children_named("topics") {
            match group.attr("type") {
                Some("attached") | None => {
                    topic.children.extend(
                        group
                            .children_named("topic")
                            .map(|child| decode_topic(child, comments)),
                    );
                }
                Some(other) => warn!(
                    "Skipping {} children of topic '{}'; they are not kept on save",
                    other, topic.title
                ),
            }
        }
    }

    topic
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn new_writer() -> FormatResult<Writer<Vec<u8>>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))?;
    Ok(writer)
}

fn write_content(
    document: &Document,
    timestamp: &str,
    comments: &mut Vec<(String, String)>,
) -> FormatResult<Vec<u8>> {
    let mut writer = new_writer()?;

    let mut start = BytesStart::new("xmap-content");
    start.push_attribute(("xmlns", CONTENT_NS));
    start.push_attribute(("xmlns:fo", "http://www.w3.org/1999/XSL/Format"));
    start.push_attribute(("xmlns:svg", "http://www.w3.org/2000/svg"));
    start.push_attribute(("xmlns:xhtml", "http://www.w3.org/1999/xhtml"));
    start.push_attribute(("xmlns:xlink", "http://www.w3.org/1999/xlink"));
    start.push_attribute(("timestamp", timestamp));
    start.push_attribute(("version", "2.0"));
    writer.write_event(Event::Start(start))?;

    for sheet in &document.sheets {
        let id = new_id();
        let mut start = BytesStart::new("sheet");
        start.push_attribute(("id", id.as_str()));
        start.push_attribute(("timestamp", timestamp));
        writer.write_event(Event::Start(start))?;

        write_topic(&mut writer, &sheet.root, timestamp, true, comments)?;
        write_text_element(&mut writer, "title", &sheet.title)?;

        writer.write_event(Event::End(BytesEnd::new("sheet")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("xmap-content")))?;
    Ok(writer.into_inner())
}

fn write_topic<W: Write>(
    writer: &mut Writer<W>,
    topic: &Topic,
    timestamp: &str,
    is_root: bool,
    comments: &mut Vec<(String, String)>,
) -> io::Result<()> {
    let id = new_id();
    let mut start = BytesStart::new("topic");
    start.push_attribute(("id", id.as_str()));
    if is_root {
        start.push_attribute(("structure-class", ROOT_STRUCTURE));
    }
    start.push_attribute(("timestamp", timestamp));
    writer.write_event(Event::Start(start))?;

    write_text_element(writer, "title", &topic.title)?;

    if let Some(note) = topic.note.as_deref().filter(|n| !n.is_empty()) {
        writer.write_event(Event::Start(BytesStart::new("notes")))?;
        write_text_element(writer, "plain", note)?;
        writer.write_event(Event::End(BytesEnd::new("notes")))?;
    }

    if !topic.markers.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("marker-refs")))?;
        for marker in &topic.markers {
            let mut marker_ref = BytesStart::new("marker-ref");
            marker_ref.push_attribute(("marker-id", marker.as_str()));
            writer.write_event(Event::Empty(marker_ref))?;
        }
        writer.write_event(Event::End(BytesEnd::new("marker-refs")))?;
    }

    if !topic.labels.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("labels")))?;
        for label in &topic.labels {
            write_text_element(writer, "label", label)?;
        }
        writer.write_event(Event::End(BytesEnd::new("labels")))?;
    }

    if !topic.children.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("children")))?;
        let mut group = BytesStart::new("topics");
        group.push_attribute(("type", "attached"));
        writer.write_event(Event::Start(group))?;
        for child in &topic.children {
            write_topic(writer, child, timestamp, false, comments)?;
        }
        writer.write_event(Event::End(BytesEnd::new("topics")))?;
        writer.write_event(Event::End(BytesEnd::new("children")))?;
    }

    if let Some(comment) = &topic.comment {
        comments.push((id, comment.clone()));
    }

    writer.write_event(Event::End(BytesEnd::new("topic")))?;
    Ok(())
}

fn write_comments(comments: &[(String, String)], timestamp: &str) -> FormatResult<Vec<u8>> {
    let mut writer = new_writer()?;

    let mut start = BytesStart::new("comments");
    start.push_attribute(("xmlns", COMMENTS_NS));
    start.push_attribute(("version", "2.0"));
    writer.write_event(Event::Start(start))?;

    for (id, text) in comments {
        let mut comment = BytesStart::new("comment");
        comment.push_attribute(("author", env!("CARGO_PKG_NAME")));
        comment.push_attribute(("object-id", id.as_str()));
        comment.push_attribute(("time", timestamp));
        writer.write_event(Event::Start(comment))?;
        write_text_element(&mut writer, "content", text)?;
        writer.write_event(Event::End(BytesEnd::new("comment")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("comments")))?;
    Ok(writer.into_inner())
}

fn write_meta() -> FormatResult<Vec<u8>> {
    let mut writer = new_writer()?;

    let mut start = BytesStart::new("meta");
    start.push_attribute(("xmlns", META_NS));
    start.push_attribute(("version", "2.0"));
    writer.write_event(Event::Start(start))?;

    writer.write_event(Event::Start(BytesStart::new("Creator")))?;
    write_text_element(&mut writer, "Name", env!("CARGO_PKG_NAME"))?;
    write_text_element(&mut writer, "Version", env!("CARGO_PKG_VERSION"))?;
    writer.write_event(Event::End(BytesEnd::new("Creator")))?;

    writer.write_event(Event::End(BytesEnd::new("meta")))?;
    Ok(writer.into_inner())
}

fn media_type(name: &str) -> &'static str {
    match name.rsplit('.').next() {
        Some("xml") => "text/xml",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "",
    }
}

fn write_manifest(names: &[String]) -> FormatResult<Vec<u8>> {
    let mut writer = new_writer()?;

    let mut start = BytesStart::new("manifest");
    start.push_attribute(("xmlns", MANIFEST_NS));
    writer.write_event(Event::Start(start))?;

    let listed = names
        .iter()
        .map(String::as_str)
        .chain(["META-INF/", MANIFEST_ENTRY]);
    for name in listed {
        let mut entry = BytesStart::new("file-entry");
        entry.push_attribute(("full-path", name));
        entry.push_attribute(("media-type", media_type(name)));
        writer.write_event(Event::Empty(entry))?;
    }

    writer.write_event(Event::End(BytesEnd::new("manifest")))?;
    Ok(writer.into_inner())
}
