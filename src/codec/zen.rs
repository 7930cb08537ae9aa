//! JSON package codec
//!
//! `content.json` holds an array of sheets, each with a `rootTopic`. Topic
//! children live under `children.attached`; detached and summary children
//! are not part of the model and are dropped on decode.

use std::collections::BTreeSet;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::error::{FormatError, FormatResult};
use super::{Codec, Fidelity, FormatKind, LossyField};
use crate::package::Package;
use crate::types::{Document, Sheet, Topic, DEFAULT_TITLE};
use crate::utils::new_id;

/// Primary content entry
pub const CONTENT_ENTRY: &str = "content.json";
/// Creator metadata
pub const METADATA_ENTRY: &str = "metadata.json";
/// Package manifest
pub const MANIFEST_ENTRY: &str = "manifest.json";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZenSheet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    class: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    root_topic: Option<ZenTopic>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ZenTopic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    class: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<ZenNotes>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    markers: Vec<ZenMarker>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    comments: Vec<ZenComment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<ZenChildren>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ZenNotes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    plain: Option<ZenText>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ZenText {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZenMarker {
    #[serde(default)]
    marker_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ZenComment {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ZenChildren {
    #[serde(default)]
    attached: Vec<ZenTopic>,
    #[serde(default, skip_serializing)]
    detached: Vec<Value>,
    #[serde(default, skip_serializing)]
    summary: Vec<Value>,
}

/// Codec for the JSON-based package format
///
/// Comments are stored as a `comments` array on the topic and markers as
/// `markers[].markerId`; both are only read and written at [`Fidelity::Full`].
/// At the limited fidelity, fields found on decode are listed as skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZenCodec {
    fidelity: Fidelity,
}

impl ZenCodec {
    pub fn new(fidelity: Fidelity) -> Self {
        Self { fidelity }
    }

    fn decode_topic(&self, zen: ZenTopic, skipped: &mut Vec<LossyField>) -> Topic {
        let mut topic = Topic::new(zen.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()));

        topic.note = zen
            .notes
            .and_then(|notes| notes.plain)
            .map(|plain| plain.content)
            .filter(|content| !content.is_empty());

        let comments: Vec<String> = zen
            .comments
            .into_iter()
            .map(|c| c.content)
            .filter(|content| !content.is_empty())
            .collect();
        if !comments.is_empty() {
            if self.fidelity.supports_comments() {
                topic.comment = Some(comments.join("\n"));
            } else {
                skipped.push(LossyField {
                    topic: topic.title.clone(),
                    field: "comment",
                });
            }
        }

        let markers: BTreeSet<String> = zen
            .markers
            .into_iter()
            .map(|m| m.marker_id)
            .filter(|id| !id.is_empty())
            .collect();
        if !markers.is_empty() {
            if self.fidelity.supports_markers() {
                topic.markers = markers;
            } else {
                skipped.push(LossyField {
                    topic: topic.title.clone(),
                    field: "markers",
                });
            }
        }

        topic.labels = zen.labels;

        if let Some(children) = zen.children {
            let floating = children.detached.len() + children.summary.len();
            if floating > 0 {
                warn!(
                    "Skipping {} detached/summary children of topic '{}'; they are not kept on save",
                    floating, topic.title
                );
            }
            topic.children = children
                .attached
                .into_iter()
                .map(|child| self.decode_topic(child, skipped))
                .collect();
        }

        topic
    }

    fn encode_topic(&self, topic: &Topic) -> ZenTopic {
        let notes = topic
            .note
            .as_ref()
            .filter(|note| !note.is_empty())
            .map(|note| ZenNotes {
                plain: Some(ZenText {
                    content: note.clone(),
                }),
            });

        let markers = if self.fidelity.supports_markers() {
            topic
                .markers
                .iter()
                .map(|m| ZenMarker {
                    marker_id: m.clone(),
                })
                .collect()
        } else {
            Vec::new()
        };

        let comments = match &topic.comment {
            Some(comment) if self.fidelity.supports_comments() => vec![ZenComment {
                content: comment.clone(),
            }],
            _ => Vec::new(),
        };

        let children = if topic.children.is_empty() {
            None
        } else {
            Some(ZenChildren {
                attached: topic.children.iter().map(|c| self.encode_topic(c)).collect(),
                detached: Vec::new(),
                summary: Vec::new(),
            })
        };

        ZenTopic {
            id: Some(new_id()),
            class: Some("topic".to_string()),
            title: Some(topic.title.clone()),
            notes,
            markers,
            labels: topic.labels.clone(),
            comments,
            children,
        }
    }
}

impl Codec for ZenCodec {
    fn kind(&self) -> FormatKind {
        FormatKind::Zen
    }

    fn fidelity(&self) -> Fidelity {
        self.fidelity
    }

    fn decode_with_skipped(
        &self,
        package: &Package,
    ) -> FormatResult<(Document, Vec<LossyField>)> {
        let content = package.read_str(CONTENT_ENTRY)?;
        let zen_sheets: Vec<ZenSheet> = serde_json::from_str(content)?;

        let mut skipped = Vec::new();
        let mut sheets = Vec::with_capacity(zen_sheets.len());
        for (index, zen) in zen_sheets.into_iter().enumerate() {
            let root = zen.root_topic.ok_or_else(|| {
                FormatError::malformed(CONTENT_ENTRY, format!("sheet {} has no rootTopic", index))
            })?;
            sheets.push(Sheet::new(
                zen.title.unwrap_or_default(),
                self.decode_topic(root, &mut skipped),
            ));
        }

        debug!("Decoded {} sheet(s) from {}", sheets.len(), CONTENT_ENTRY);
        let document = Document::from_sheets(sheets)
            .ok_or_else(|| FormatError::malformed(CONTENT_ENTRY, "document has no sheets"))?;
        Ok((document, skipped))
    }

    fn encode(&self, document: &Document, package: &mut Package) -> FormatResult<()> {
        let zen_sheets: Vec<ZenSheet> = document
            .sheets
            .iter()
            .map(|sheet| ZenSheet {
                id: Some(new_id()),
                class: Some("sheet".to_string()),
                title: Some(sheet.title.clone()),
                root_topic: Some(self.encode_topic(&sheet.root)),
            })
            .collect();
        package.insert(CONTENT_ENTRY, serde_json::to_vec_pretty(&zen_sheets)?);

        if !package.contains(METADATA_ENTRY) {
            let metadata = json!({
                "creator": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                }
            });
            package.insert(METADATA_ENTRY, serde_json::to_vec(&metadata)?);
        }

        let mut entries = Map::new();
        for name in package.names().filter(|name| *name != MANIFEST_ENTRY) {
            entries.insert(name.to_string(), Value::Object(Map::new()));
        }
        let manifest = json!({ "file-entries": entries });
        package.insert(MANIFEST_ENTRY, serde_json::to_vec(&manifest)?);

        Ok(())
    }
}
