/*!
 * End-to-end tests for xmindctl: create, edit, save and reload real files
 */

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use crate::codec::{detect, Fidelity, FormatKind, Workbook};
use crate::editor::{Editor, NewTopic, TopicEdit};
use crate::error::XmindError;
use crate::package::Package;
use crate::render::{Style, View};

// Build the sample paper outline in the given format
fn create_paper(path: &Path, format: FormatKind) {
    let editor = Editor::create(path, "Sheet 1", "研究論文", format, Fidelity::Full);
    editor.save().unwrap();

    let mut editor = Editor::open(path, Fidelity::Full).unwrap();
    let mut intro = NewTopic::new("1. はじめに");
    intro.note = Some("背景と目的".to_string());
    editor.add("研究論文", intro).unwrap();
    editor.add("1. はじめに", NewTopic::new("背景")).unwrap();
    editor.save().unwrap();
}

#[test]
fn test_paper_scenario_both_formats() {
    for format in [FormatKind::Zen, FormatKind::Legacy] {
        let dir = tempdir().unwrap();
        let path = dir.path().join("paper.xmind");
        create_paper(&path, format);

        let workbook = Workbook::open(&path, Fidelity::Full).unwrap();
        assert_eq!(workbook.format(), format);

        let view = View::all(&workbook.document);
        assert_eq!(
            view.tree(),
            "研究論文\n  - 1. はじめに\n    > 背景と目的\n    - 背景\n"
        );
        assert_eq!(
            view.markdown(Style::Headers),
            "# 研究論文\n\n## 1. はじめに\n\n背景と目的\n\n### 背景\n"
        );
    }
}

#[test]
fn test_full_field_round_trip_through_disk() {
    for format in [FormatKind::Zen, FormatKind::Legacy] {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fields.xmind");
        Editor::create(&path, "Plan", "Root", format, Fidelity::Full)
            .save()
            .unwrap();

        let mut editor = Editor::open(&path, Fidelity::Full).unwrap();
        editor
            .add(
                "Root",
                NewTopic {
                    title: "Task".to_string(),
                    note: Some("do it".to_string()),
                    comment: Some("looks good".to_string()),
                    markers: vec!["priority-1".to_string(), "task-start".to_string()],
                    labels: vec!["urgent".to_string(), "q3".to_string()],
                },
            )
            .unwrap();
        editor.save().unwrap();
        let expected = editor.document().clone();

        let reloaded = Workbook::open(&path, Fidelity::Full).unwrap();
        assert_eq!(reloaded.document, expected, "format {}", format);
    }
}

#[test]
fn test_edit_and_delete_persist() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("paper.xmind");
    create_paper(&path, FormatKind::Zen);

    let mut editor = Editor::open(&path, Fidelity::Full).unwrap();
    editor
        .edit(
            "背景",
            TopicEdit {
                title: Some("Background".to_string()),
                comment: Some("expand".to_string()),
                ..TopicEdit::default()
            },
        )
        .unwrap();
    editor.save().unwrap();

    let view_text = View::all(&Workbook::open(&path, Fidelity::Full).unwrap().document).tree();
    assert!(view_text.contains("- Background\n      // expand\n"));

    let mut editor = Editor::open(&path, Fidelity::Full).unwrap();
    editor.delete("1. はじめに").unwrap();
    editor.save().unwrap();

    let workbook = Workbook::open(&path, Fidelity::Full).unwrap();
    let titles: Vec<_> = workbook.document.walk().map(|(_, t)| t.title.clone()).collect();
    assert_eq!(titles, vec!["研究論文"]);
}

#[test]
fn test_root_deletion_leaves_file_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("paper.xmind");
    create_paper(&path, FormatKind::Legacy);
    let before = fs::read(&path).unwrap();

    let mut editor = Editor::open(&path, Fidelity::Full).unwrap();
    let result = editor.delete("研究論文");
    assert!(matches!(result, Err(XmindError::InvalidOperation(_))));

    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_limited_fidelity_drops_on_save() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("zen.xmind");
    Editor::create(&path, "Sheet 1", "Root", FormatKind::Zen, Fidelity::NotesAndLabelsOnly)
        .save()
        .unwrap();

    let mut editor = Editor::open(&path, Fidelity::NotesAndLabelsOnly).unwrap();
    assert_eq!(editor.workbook().fidelity(), Fidelity::NotesAndLabelsOnly);
    editor
        .add(
            "Root",
            NewTopic {
                title: "T".to_string(),
                note: Some("kept".to_string()),
                comment: Some("dropped".to_string()),
                markers: vec!["flag-red".to_string()],
                labels: vec!["kept".to_string()],
            },
        )
        .unwrap();
    editor.save().unwrap();

    let full = Workbook::open(&path, Fidelity::Full).unwrap();
    let topic = &full.document.sheets[0].root.children[0];
    assert_eq!(topic.note.as_deref(), Some("kept"));
    assert_eq!(topic.labels, vec!["kept"]);
    assert!(topic.comment.is_none());
    assert!(topic.markers.is_empty());
}

#[test]
fn test_foreign_entries_survive_save() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("thumb.xmind");
    create_paper(&path, FormatKind::Zen);

    let mut package = Package::open(&path).unwrap();
    package.insert("Thumbnails/thumbnail.png", vec![137u8, 80, 78, 71]);
    package.write_atomic(&path).unwrap();

    let mut editor = Editor::open(&path, Fidelity::Full).unwrap();
    editor.add("背景", NewTopic::new("詳細")).unwrap();
    editor.save().unwrap();

    let package = Package::open(&path).unwrap();
    assert_eq!(detect(&package).unwrap(), FormatKind::Zen);
    assert_eq!(
        package.get("Thumbnails/thumbnail.png"),
        Some(&[137u8, 80, 78, 71][..])
    );
}

#[test]
fn test_sheet_scoped_editing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sheets.xmind");
    create_paper(&path, FormatKind::Legacy);

    let mut workbook = Workbook::open(&path, Fidelity::Full).unwrap();
    let mut second = workbook.document.sheets[0].clone();
    second.title = "Copy".to_string();
    workbook.document.sheets.push(second);
    workbook.save(&path).unwrap();

    let mut editor = Editor::open(&path, Fidelity::Full)
        .unwrap()
        .with_sheet(Some(1))
        .unwrap();
    editor.add("背景", NewTopic::new("Only in copy")).unwrap();
    editor.save().unwrap();

    let workbook = Workbook::open(&path, Fidelity::Full).unwrap();
    let doc = &workbook.document;
    assert_eq!(doc.sheets[0].root.count(), 3);
    assert_eq!(doc.sheets[1].root.count(), 4);

    let markdown = View::all(doc).markdown(Style::Bullets);
    assert!(markdown.starts_with("# Sheet 1\n\n- 研究論文\n"));
    assert!(markdown.contains("# Copy\n"));

    assert!(matches!(
        Editor::open(&path, Fidelity::Full).unwrap().with_sheet(Some(5)),
        Err(XmindError::NotFound(_))
    ));
}

#[test]
fn test_unsupported_package() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("other.zip");
    let mut package = Package::new();
    package.insert("readme.txt", "hello");
    package.write_atomic(&path).unwrap();

    assert!(matches!(
        Workbook::open(&path, Fidelity::Full),
        Err(XmindError::Format(_))
    ));
}

#[test]
fn test_limited_reopen_reports_fields_it_will_drop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kept.xmind");
    let mut editor = Editor::create(&path, "Sheet 1", "Root", FormatKind::Zen, Fidelity::Full);
    editor
        .add(
            "Root",
            NewTopic {
                title: "T".to_string(),
                comment: Some("keep me".to_string()),
                markers: vec!["flag-red".to_string()],
                ..NewTopic::default()
            },
        )
        .unwrap();
    editor.save().unwrap();

    let workbook = Workbook::open(&path, Fidelity::NotesAndLabelsOnly).unwrap();
    let lossy: Vec<_> = workbook
        .lossy_fields()
        .into_iter()
        .map(|l| (l.topic, l.field))
        .collect();
    assert_eq!(
        lossy,
        vec![("T".to_string(), "comment"), ("T".to_string(), "markers")]
    );

    let full = Workbook::open(&path, Fidelity::Full).unwrap();
    assert!(full.lossy_fields().is_empty());
    let topic = &full.document.sheets[0].root.children[0];
    assert_eq!(topic.comment.as_deref(), Some("keep me"));
}
