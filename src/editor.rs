/*!
 * Structural editing of mind-map documents
 *
 * Every invocation runs load, locate, apply and persist in that order.
 * Titles are resolved to a [`TopicAddress`] once; the edit itself works on
 * indices. Lookup is depth-first pre-order across sheets in document order
 * and the first match wins. Nothing reaches disk unless the edit succeeded.
 */

use std::path::{Path, PathBuf};

use log::debug;

use crate::codec::{Fidelity, FormatKind, Workbook};
use crate::error::Result;
use crate::types::{Document, Topic, TopicAddress};
use crate::{bail, ensure, error};

/// Fields of a topic to be added
#[derive(Debug, Clone, Default)]
pub struct NewTopic {
    pub title: String,
    pub note: Option<String>,
    pub comment: Option<String>,
    pub markers: Vec<String>,
    pub labels: Vec<String>,
}

impl NewTopic {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    fn into_topic(self) -> Topic {
        Topic {
            title: self.title,
            note: non_empty(self.note),
            comment: non_empty(self.comment),
            markers: self.markers.into_iter().collect(),
            labels: self.labels,
            children: Vec::new(),
        }
    }
}

/// Changes to an existing topic; unset fields are left alone
///
/// Title, note and comment replace the current value (an empty note or
/// comment clears it). Markers are added to the set and labels appended.
#[derive(Debug, Clone, Default)]
pub struct TopicEdit {
    pub title: Option<String>,
    pub note: Option<String>,
    pub comment: Option<String>,
    pub markers: Vec<String>,
    pub labels: Vec<String>,
}

impl TopicEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.note.is_none()
            && self.comment.is_none()
            && self.markers.is_empty()
            && self.labels.is_empty()
    }

    fn apply(self, topic: &mut Topic) {
        if let Some(title) = self.title {
            topic.title = title;
        }
        if self.note.is_some() {
            topic.note = non_empty(self.note);
        }
        if self.comment.is_some() {
            topic.comment = non_empty(self.comment);
        }
        topic.markers.extend(self.markers);
        for label in self.labels {
            if !topic.labels.contains(&label) {
                topic.labels.push(label);
            }
        }
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty())
}

/// Find the first topic titled `title`, optionally within one sheet
pub fn locate(document: &Document, title: &str, sheet: Option<usize>) -> Result<TopicAddress> {
    let found = document
        .walk()
        .filter(|(address, _)| sheet.map_or(true, |s| address.sheet == s))
        .find(|(_, topic)| topic.title == title)
        .map(|(address, _)| address);

    match found {
        Some(address) => {
            debug!(
                "Located '{}' in sheet {} at depth {}",
                title,
                address.sheet,
                address.depth()
            );
            Ok(address)
        }
        None => Err(error!(NotFound, "Topic '{}' not found", title)),
    }
}

/// Append a new child under the first topic titled `parent`
pub fn add(
    document: &mut Document,
    parent: &str,
    new_topic: NewTopic,
    sheet: Option<usize>,
) -> Result<TopicAddress> {
    let mut address = locate(document, parent, sheet)
        .map_err(|_| error!(NotFound, "Parent topic '{}' not found", parent))?;
    let topic = document
        .topic_mut(&address)
        .ok_or_else(|| error!(NotFound, "Parent topic '{}' not found", parent))?;

    let index = topic.push_child(new_topic.into_topic());
    address.path.push(index);
    Ok(address)
}

/// Apply `changes` to the first topic titled `target`
///
/// Returns the topic as it was before the edit.
pub fn edit(
    document: &mut Document,
    target: &str,
    changes: TopicEdit,
    sheet: Option<usize>,
) -> Result<Topic> {
    ensure!(!changes.is_empty(), InvalidArgument, "No changes given for '{}'", target);

    let address = locate(document, target, sheet)?;
    let topic = document
        .topic_mut(&address)
        .ok_or_else(|| error!(NotFound, "Topic '{}' not found", target))?;

    let before = topic.clone();
    changes.apply(topic);
    Ok(before)
}

/// Remove the first topic titled `target` and its subtree
pub fn delete(document: &mut Document, target: &str, sheet: Option<usize>) -> Result<Topic> {
    let address = locate(document, target, sheet)?;
    if address.is_root() {
        bail!(
            InvalidOperation,
            "Cannot delete root topic '{}' of sheet {}",
            target,
            address.sheet
        );
    }

    document
        .remove(&address)
        .ok_or_else(|| error!(NotFound, "Topic '{}' not found", target))
}

/// A document opened for editing, bound to the file it is saved to
pub struct Editor {
    workbook: Workbook,
    path: PathBuf,
    sheet: Option<usize>,
}

impl Editor {
    /// Start a new one-sheet document; nothing is written until [`Editor::save`]
    pub fn create(
        path: &Path,
        sheet_title: &str,
        root_title: &str,
        format: FormatKind,
        zen_fidelity: Fidelity,
    ) -> Self {
        Self {
            workbook: Workbook::new(Document::new(sheet_title, root_title), format, zen_fidelity),
            path: path.to_path_buf(),
            sheet: None,
        }
    }

    /// Load an existing document
    pub fn open(path: &Path, zen_fidelity: Fidelity) -> Result<Self> {
        Ok(Self {
            workbook: Workbook::open(path, zen_fidelity)?,
            path: path.to_path_buf(),
            sheet: None,
        })
    }

    /// Restrict lookups to one sheet
    pub fn with_sheet(mut self, sheet: Option<usize>) -> Result<Self> {
        if let Some(index) = sheet {
            let count = self.workbook.document.sheets.len();
            ensure!(
                index < count,
                NotFound,
                "Sheet index {} out of range (document has {} sheet(s))",
                index,
                count
            );
        }
        self.sheet = sheet;
        Ok(self)
    }

    pub fn document(&self) -> &Document {
        &self.workbook.document
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn add(&mut self, parent: &str, new_topic: NewTopic) -> Result<TopicAddress> {
        add(&mut self.workbook.document, parent, new_topic, self.sheet)
    }

    pub fn edit(&mut self, target: &str, changes: TopicEdit) -> Result<Topic> {
        edit(&mut self.workbook.document, target, changes, self.sheet)
    }

    pub fn delete(&mut self, target: &str) -> Result<Topic> {
        delete(&mut self.workbook.document, target, self.sheet)
    }

    /// Re-encode the whole document and overwrite the file
    pub fn save(&self) -> Result<()> {
        self.workbook.save(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::XmindError;
    use crate::types::Sheet;

    fn document() -> Document {
        let root = Topic::new("Root")
            .with_child(Topic::new("A").with_child(Topic::new("Dup").with_note("under A")))
            .with_child(Topic::new("Dup").with_note("under root"));
        Document {
            sheets: vec![
                Sheet::new("One", root),
                Sheet::new("Two", Topic::new("Other").with_child(Topic::new("Dup"))),
            ],
        }
    }

    #[test]
    fn test_locate_first_preorder_match() {
        let doc = document();
        let address = locate(&doc, "Dup", None).unwrap();
        assert_eq!(address, TopicAddress { sheet: 0, path: vec![0, 0] });
        assert_eq!(address.depth(), 2);
        assert_eq!(doc.topic(&address).unwrap().note.as_deref(), Some("under A"));

        let scoped = locate(&doc, "Dup", Some(1)).unwrap();
        assert_eq!(scoped, TopicAddress { sheet: 1, path: vec![0] });

        assert!(matches!(
            locate(&doc, "Missing", None),
            Err(XmindError::NotFound(_))
        ));
    }

    #[test]
    fn test_add_then_locate() {
        let mut doc = document();
        let new_topic = NewTopic {
            title: "X".into(),
            note: Some("n".into()),
            comment: Some(String::new()),
            markers: vec!["priority-1".into()],
            labels: vec!["l".into()],
        };
        let address = add(&mut doc, "A", new_topic, None).unwrap();
        assert_eq!(address.path, vec![0, 1]);

        let added = doc.topic(&address).unwrap();
        assert_eq!(added.title, "X");
        assert_eq!(added.note.as_deref(), Some("n"));
        assert!(added.comment.is_none());
        assert!(added.markers.contains("priority-1"));

        let parent = doc.topic(&locate(&doc, "A", None).unwrap()).unwrap();
        assert!(parent.children.iter().any(|c| c.title == "X"));
    }

    #[test]
    fn test_add_missing_parent() {
        let mut doc = document();
        let before = doc.clone();
        let err = add(&mut doc, "Nope", NewTopic::new("X"), None).unwrap_err();
        assert_eq!(err.to_string(), "Not found: Parent topic 'Nope' not found");
        assert_eq!(doc, before);
    }

    #[test]
    fn test_edit_replaces_given_fields_only() {
        let mut doc = document();
        let changes = TopicEdit {
            title: Some("Renamed".into()),
            markers: vec!["task-done".into()],
            labels: vec!["new".into(), "new".into()],
            ..TopicEdit::default()
        };
        let before = edit(&mut doc, "Dup", changes, None).unwrap();
        assert_eq!(before.title, "Dup");

        let topic = doc.topic(&locate(&doc, "Renamed", None).unwrap()).unwrap();
        assert_eq!(topic.note.as_deref(), Some("under A"));
        assert!(topic.markers.contains("task-done"));
        assert_eq!(topic.labels, vec!["new"]);

        let cleared = TopicEdit {
            note: Some(String::new()),
            ..TopicEdit::default()
        };
        edit(&mut doc, "Renamed", cleared, None).unwrap();
        assert!(doc.topic(&locate(&doc, "Renamed", None).unwrap()).unwrap().note.is_none());
    }

    #[test]
    fn test_edit_missing_target() {
        let mut doc = document();
        let before = doc.clone();
        let changes = TopicEdit {
            title: Some("X".into()),
            ..TopicEdit::default()
        };
        let err = edit(&mut doc, "Missing", changes, None).unwrap_err();
        assert!(matches!(err, XmindError::NotFound(_)));
        assert_eq!(err.to_string(), "Not found: Topic 'Missing' not found");
        assert_eq!(doc, before);
    }

    #[test]
    fn test_edit_requires_changes() {
        let mut doc = document();
        assert!(matches!(
            edit(&mut doc, "A", TopicEdit::default(), None),
            Err(XmindError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_delete_removes_subtree() {
        let mut doc = document();
        let removed = delete(&mut doc, "A", None).unwrap();
        assert_eq!(removed.count(), 2);

        let titles: Vec<_> = doc.sheets[0].root.walk().map(|(_, t)| t.title.clone()).collect();
        assert_eq!(titles, vec!["Root", "Dup"]);
        assert_eq!(
            doc.sheets[0].root.children[0].note.as_deref(),
            Some("under root")
        );
    }

    #[test]
    fn test_delete_root_rejected() {
        let mut doc = document();
        let before = doc.clone();
        assert!(matches!(
            delete(&mut doc, "Root", None),
            Err(XmindError::InvalidOperation(_))
        ));
        assert!(matches!(
            delete(&mut doc, "Other", None),
            Err(XmindError::InvalidOperation(_))
        ));
        assert!(matches!(
            delete(&mut doc, "Missing", None),
            Err(XmindError::NotFound(_))
        ));
        assert_eq!(doc, before);
    }
}
