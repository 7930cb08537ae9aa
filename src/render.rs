/*!
 * Text renderers for the mind-map model
 *
 * All renderers are pure: they read the model and return a string ending in
 * a single newline.
 */

use clap::ValueEnum;
use strum::{Display, EnumString};

use crate::error::Result;
use crate::types::{Document, Sheet, Topic};
use crate::utils::indent;

/// Deepest level rendered as a Markdown heading
const MAX_HEADING_LEVEL: usize = 6;

/// Markdown output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, ValueEnum)]
#[strum(serialize_all = "kebab-case")]
pub enum Style {
    /// Headings for the first six levels, bullets below
    #[default]
    Headers,
    /// Nested bullets only
    Bullets,
}

/// The sheets selected for rendering, with their positions in the document
pub struct View<'a> {
    sheets: Vec<(usize, &'a Sheet)>,
}

impl<'a> View<'a> {
    /// Every sheet of the document
    pub fn all(document: &'a Document) -> Self {
        Self {
            sheets: document.sheets.iter().enumerate().collect(),
        }
    }

    /// One sheet by 0-based index, or every sheet when `index` is `None`
    pub fn select(document: &'a Document, index: Option<usize>) -> Result<Self> {
        match index {
            None => Ok(Self::all(document)),
            Some(i) => {
                let sheet = document.sheets.get(i).ok_or_else(|| {
                    crate::error!(
                        NotFound,
                        "Sheet index {} out of range (document has {} sheet(s))",
                        i,
                        document.sheets.len()
                    )
                })?;
                Ok(Self {
                    sheets: vec![(i, sheet)],
                })
            }
        }
    }

    fn is_multi_sheet(&self) -> bool {
        self.sheets.len() > 1
    }

    /// Indented tree listing with notes, comments, markers and labels
    pub fn tree(&self) -> String {
        let mut lines = Vec::new();

        for (n, (index, sheet)) in self.sheets.iter().enumerate() {
            if self.is_multi_sheet() {
                if n > 0 {
                    lines.push(String::new());
                }
                lines.push(format!("=== {} ===", sheet.display_title(*index)));
            }
            tree_topic(&sheet.root, 0, &mut lines);
        }

        finish(lines)
    }

    /// Markdown in the requested style
    pub fn markdown(&self, style: Style) -> String {
        let mut lines = Vec::new();

        for (index, sheet) in &self.sheets {
            if self.is_multi_sheet() {
                push_blank(&mut lines);
                lines.push(format!("# {}", sheet.display_title(*index)));
                lines.push(String::new());
            }
            match style {
                Style::Headers => heading_topic(&sheet.root, 1, &mut lines),
                Style::Bullets => bullet_topic(&sheet.root, 1, &mut lines),
            }
        }

        finish(lines)
    }
}

/// Join lines, collapsing trailing blank lines into a single final newline
fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
    out.push('\n');
    out
}

fn push_blank(lines: &mut Vec<String>) {
    if lines.last().is_some_and(|l| !l.is_empty()) {
        lines.push(String::new());
    }
}

fn prefixed(lines: &mut Vec<String>, prefix: &str, text: &str) {
    for line in text.lines() {
        lines.push(format!("{}{}", prefix, line));
    }
}

fn comment_lines(lines: &mut Vec<String>, lead: &str, quote: &str, comment: &str) {
    let mut parts = comment.lines();
    if let Some(first) = parts.next() {
        lines.push(format!("{}**Comment:** {}", lead, first));
    }
    for rest in parts {
        lines.push(format!("{}{}", quote, rest));
    }
}

fn labels_text(labels: &[String]) -> String {
    labels
        .iter()
        .map(|l| format!("`{}`", l))
        .collect::<Vec<_>>()
        .join(", ")
}

fn tree_topic(topic: &Topic, depth: usize, lines: &mut Vec<String>) {
    if depth == 0 {
        lines.push(topic.title.clone());
    } else {
        lines.push(format!("{}- {}", indent(depth), topic.title));
    }

    let inner = indent(depth + 1);
    if let Some(note) = &topic.note {
        prefixed(lines, &format!("{}> ", inner), note);
    }
    if let Some(comment) = &topic.comment {
        prefixed(lines, &format!("{}// ", inner), comment);
    }
    if !topic.markers.is_empty() {
        let markers: Vec<&str> = topic.markers.iter().map(String::as_str).collect();
        lines.push(format!("{}[markers: {}]", inner, markers.join(", ")));
    }
    if !topic.labels.is_empty() {
        lines.push(format!("{}[labels: {}]", inner, topic.labels.join(", ")));
    }

    for child in &topic.children {
        tree_topic(child, depth + 1, lines);
    }
}

fn heading_topic(topic: &Topic, level: usize, lines: &mut Vec<String>) {
    if level <= MAX_HEADING_LEVEL {
        lines.push(format!("{} {}", "#".repeat(level), topic.title));
        lines.push(String::new());

        if let Some(note) = &topic.note {
            lines.push(note.clone());
            lines.push(String::new());
        }
        if let Some(comment) = &topic.comment {
            comment_lines(lines, "> ", "> ", comment);
            lines.push(String::new());
        }
        if !topic.labels.is_empty() {
            lines.push(format!("Labels: {}", labels_text(&topic.labels)));
            lines.push(String::new());
        }
    } else {
        let bullet_depth = level - MAX_HEADING_LEVEL - 1;
        lines.push(format!("{}- {}", indent(bullet_depth), topic.title));

        let inner = indent(bullet_depth + 1);
        if let Some(note) = &topic.note {
            prefixed(lines, &format!("{}> ", inner), note);
        }
        if let Some(comment) = &topic.comment {
            let quote = format!("{}> ", inner);
            comment_lines(lines, &quote, &quote, comment);
        }
        if !topic.labels.is_empty() {
            lines.push(format!("{}Labels: {}", inner, labels_text(&topic.labels)));
        }
    }

    for child in &topic.children {
        heading_topic(child, level + 1, lines);
    }

    // Leave a paragraph break before the next heading
    if level == MAX_HEADING_LEVEL + 1 {
        push_blank(lines);
    }
}

fn bullet_topic(topic: &Topic, level: usize, lines: &mut Vec<String>) {
    lines.push(format!("{}- {}", indent(level - 1), topic.title));

    let inner = indent(level);
    if let Some(note) = &topic.note {
        prefixed(lines, &inner, note);
    }
    if let Some(comment) = &topic.comment {
        comment_lines(lines, &inner, &inner, comment);
    }
    if !topic.labels.is_empty() {
        lines.push(format!("{}Labels: {}", inner, labels_text(&topic.labels)));
    }

    for child in &topic.children {
        bullet_topic(child, level + 1, lines);
    }
}
