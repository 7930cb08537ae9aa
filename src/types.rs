/*!
 * Core types and data structures for the xmindctl mind-map model
 */

use std::collections::BTreeSet;

/// Title used for topics that carry none in the source document
pub const DEFAULT_TITLE: &str = "Untitled";

/// A node in the mind-map tree
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Topic {
    /// Topic label
    pub title: String,
    /// Plain-text note attached to the topic
    pub note: Option<String>,
    /// Plain-text annotation, rendered apart from the note
    pub comment: Option<String>,
    /// Marker identifiers such as `priority-1`
    pub markers: BTreeSet<String>,
    /// Free-form text tags, in order
    pub labels: Vec<String>,
    /// Attached child topics, in order
    pub children: Vec<Topic>,
}

impl Topic {
    /// Create a topic with the given title and no other data
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.insert(marker.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_child(mut self, child: Topic) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child and return its index among the siblings
    pub fn push_child(&mut self, child: Topic) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    /// Depth-first pre-order traversal starting at this topic
    ///
    /// Each item carries the child-index path from this topic; its length is
    /// the depth (this topic has depth 0).
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(Vec::new(), self)],
        }
    }

    /// Resolve a child-index path relative to this topic
    pub fn get(&self, path: &[usize]) -> Option<&Topic> {
        path.iter()
            .try_fold(self, |topic, &index| topic.children.get(index))
    }

    /// Resolve a child-index path relative to this topic, mutably
    pub fn get_mut(&mut self, path: &[usize]) -> Option<&mut Topic> {
        path.iter()
            .try_fold(self, |topic, &index| topic.children.get_mut(index))
    }

    /// Total number of topics in this subtree, including this one
    pub fn count(&self) -> usize {
        self.walk().count()
    }
}

/// Pre-order iterator over a topic subtree
pub struct Walk<'a> {
    stack: Vec<(Vec<usize>, &'a Topic)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (Vec<usize>, &'a Topic);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, topic) = self.stack.pop()?;

        // Reverse so the first child is popped next
        for (index, child) in topic.children.iter().enumerate().rev() {
            let mut child_path = path.clone();
            child_path.push(index);
            self.stack.push((child_path, child));
        }

        Some((path, topic))
    }
}

/// A named container holding exactly one root topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    /// Sheet name (may be empty)
    pub title: String,
    /// Root topic of the sheet
    pub root: Topic,
}

impl Sheet {
    pub fn new(title: impl Into<String>, root: Topic) -> Self {
        Self {
            title: title.into(),
            root,
        }
    }

    /// Title to show for this sheet, falling back to its 1-based position
    pub fn display_title(&self, index: usize) -> String {
        if self.title.is_empty() {
            format!("Sheet {}", index + 1)
        } else {
            self.title.clone()
        }
    }
}

/// Index-based address of a topic inside a document
///
/// Mutations resolve titles to an address once and then work on indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicAddress {
    /// Index of the owning sheet
    pub sheet: usize,
    /// Child indices from the sheet root (empty for the root itself)
    pub path: Vec<usize>,
}

impl TopicAddress {
    pub fn root(sheet: usize) -> Self {
        Self {
            sheet,
            path: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Address of the parent topic, or `None` for a sheet root
    pub fn parent(&self) -> Option<TopicAddress> {
        let (_, parent_path) = self.path.split_last()?;
        Some(TopicAddress {
            sheet: self.sheet,
            path: parent_path.to_vec(),
        })
    }
}

/// An ordered sequence of sheets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Sheets in document order; never empty once loaded or created
    pub sheets: Vec<Sheet>,
}

impl Document {
    /// Create a one-sheet document whose root topic has the given title
    pub fn new(sheet_title: impl Into<String>, root_title: impl Into<String>) -> Self {
        Self {
            sheets: vec![Sheet::new(sheet_title, Topic::new(root_title))],
        }
    }

    /// Build a document from decoded sheets, rejecting an empty list
    pub fn from_sheets(sheets: Vec<Sheet>) -> Option<Self> {
        if sheets.is_empty() {
            None
        } else {
            Some(Self { sheets })
        }
    }

    pub fn topic(&self, address: &TopicAddress) -> Option<&Topic> {
        self.sheets.get(address.sheet)?.root.get(&address.path)
    }

    pub fn topic_mut(&mut self, address: &TopicAddress) -> Option<&mut Topic> {
        self.sheets
            .get_mut(address.sheet)?
            .root
            .get_mut(&address.path)
    }

    /// Detach the addressed topic (with its subtree) from its parent
    ///
    /// Returns `None` for sheet roots and dangling addresses.
    pub fn remove(&mut self, address: &TopicAddress) -> Option<Topic> {
        let (&index, _) = address.path.split_last()?;
        let parent = self.topic_mut(&address.parent()?)?;
        if index < parent.children.len() {
            Some(parent.children.remove(index))
        } else {
            None
        }
    }

    /// Pre-order traversal over every sheet in document order
    pub fn walk(&self) -> impl Iterator<Item = (TopicAddress, &Topic)> {
        self.sheets
            .iter()
            .enumerate()
            .flat_map(|(sheet, s)| {
                s.root
                    .walk()
                    .map(move |(path, topic)| (TopicAddress { sheet, path }, topic))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Topic {
        Topic::new("root")
            .with_child(
                Topic::new("a")
                    .with_child(Topic::new("a1"))
                    .with_child(Topic::new("a2")),
            )
            .with_child(Topic::new("b"))
    }

    #[test]
    fn test_walk_is_preorder() {
        let root = sample();
        let titles: Vec<_> = root.walk().map(|(_, t)| t.title.as_str()).collect();
        assert_eq!(titles, vec!["root", "a", "a1", "a2", "b"]);

        let depths: Vec<_> = root.walk().map(|(p, _)| p.len()).collect();
        assert_eq!(depths, vec![0, 1, 2, 2, 1]);
    }

    #[test]
    fn test_get_by_path() {
        let root = sample();
        assert_eq!(root.get(&[0, 1]).map(|t| t.title.as_str()), Some("a2"));
        assert_eq!(root.get(&[]).map(|t| t.title.as_str()), Some("root"));
        assert!(root.get(&[5]).is_none());
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let mut doc = Document {
            sheets: vec![Sheet::new("s", sample())],
        };
        let removed = doc
            .remove(&TopicAddress {
                sheet: 0,
                path: vec![0],
            })
            .unwrap();
        assert_eq!(removed.title, "a");
        assert_eq!(removed.children.len(), 2);
        assert_eq!(doc.sheets[0].root.count(), 2);

        assert!(doc.remove(&TopicAddress::root(0)).is_none());
    }

    #[test]
    fn test_document_walk_spans_sheets() {
        let doc = Document {
            sheets: vec![
                Sheet::new("one", Topic::new("r1").with_child(Topic::new("x"))),
                Sheet::new("", Topic::new("r2")),
            ],
        };
        let addresses: Vec<_> = doc.walk().map(|(a, _)| (a.sheet, a.path)).collect();
        assert_eq!(addresses, vec![(0, vec![]), (0, vec![0]), (1, vec![])]);
        assert_eq!(doc.sheets[1].display_title(1), "Sheet 2");
    }

    #[test]
    fn test_empty_sheets_rejected() {
        assert!(Document::from_sheets(Vec::new()).is_none());
    }
}
