use lp_inspector::markers;
use lp_preview::PreviewConfig;
use lp_preview::Project;
use lp_preview::ProjectPreview;
use lp_preview::download_code;
use lp_preview::inject_preview;
use pretty_assertions::assert_eq;

const SITE: &str = "<!DOCTYPE html>\n<html><head><title>Bakery</title></head>\
<body><h1 id=title class=hero>Fresh bread</h1><p id=lead>Daily.</p></body></html>";

fn preview() -> ProjectPreview {
    let preview = ProjectPreview::new(PreviewConfig::default());
    assert!(preview.is_ok());
    preview.unwrap_or_else(|_| unreachable!())
}

fn click(preview: &mut ProjectPreview, id: &str) {
    let node = preview
        .document()
        .and_then(|doc| doc.get_element_by_id(id))
        .unwrap_or_else(|| unreachable!("missing #{id}"));
    assert!(preview.dispatch_click(node).is_handled());
}

#[test]
fn injection_is_idempotent() {
    let once = inject_preview(Some(SITE), true);
    let twice = inject_preview(Some(&once), true);
    assert_eq!(twice, once);
    assert_eq!(twice.matches("<style id=\"ai-preview-style\">").count(), 1);
    assert_eq!(twice.matches("<script id=\"ai-preview-script\">").count(), 1);
}

#[test]
fn remounting_an_exported_snapshot_starts_clean() {
    let mut preview = preview();
    assert!(preview.mount(SITE).is_ok());
    click(&mut preview, "title");
    preview.pump();

    // a snapshot taken straight from the live tree still carries the mark
    let live = preview.document().map(|doc| doc.to_html()).unwrap_or_default();
    assert!(live.contains(markers::SELECTED_CLASS));

    assert!(preview.mount(&live).is_ok());
    click(&mut preview, "lead");
    preview.pump();
    let marked = preview.document().map_or(0, |doc| {
        doc.elements()
            .filter(|node| doc.has_class(*node, markers::SELECTED_CLASS))
            .count()
    });
    assert_eq!(marked, 1);
    assert_eq!(
        preview.selected().map(|selected| selected.text.as_deref()),
        Some(Some("Daily."))
    );
}

#[test]
fn class_edit_sends_a_single_class_only_update() {
    let mut preview = preview();
    assert!(preview.mount(SITE).is_ok());
    click(&mut preview, "title");
    preview.pump();

    assert!(preview.edit_class_name("hero wide"));
    // one inbound command reaches the frame, and it touches only the class attribute
    assert_eq!(preview.pump(), 1);
    let code = preview.get_code().unwrap_or_default();
    assert!(code.contains("<h1 id=\"title\" class=\"hero wide\">Fresh bread</h1>"));
    assert_eq!(preview.editor().text(), "Fresh bread");
}

#[test]
fn export_before_mount_is_empty() {
    let preview = preview();
    assert_eq!(preview.get_code(), None);

    let project = Project::new("p1", "Empty");
    assert_eq!(download_code(&preview, &project, false), None);
}

#[test]
fn download_prefers_live_document_and_respects_generation() {
    let mut preview = preview();
    let mut project = Project::new("p1", "Bakery");
    project.current_code = Some(SITE.to_owned());

    let stored = download_code(&preview, &project, false);
    assert_eq!(stored.map(|artifact| artifact.body), Some(SITE.to_owned()));

    assert!(preview.mount(SITE).is_ok());
    click(&mut preview, "lead");
    preview.pump();
    assert!(preview.edit_text("Baked every morning."));
    preview.pump();

    assert_eq!(download_code(&preview, &project, true), None);

    let artifact = download_code(&preview, &project, false);
    assert!(artifact.is_some());
    let artifact = artifact.unwrap_or_else(|| unreachable!());
    assert_eq!(artifact.filename, "index.html");
    assert_eq!(artifact.content_type, "text/html");
    assert_eq!(
        artifact.body,
        "<!DOCTYPE html><html><head><title>Bakery</title></head>\
         <body><h1 id=\"title\" class=\"hero\">Fresh bread</h1>\
         <p id=\"lead\">Baked every morning.</p></body></html>"
    );

    let dir = tempfile::tempdir();
    assert!(dir.is_ok());
    let dir = dir.unwrap_or_else(|_| unreachable!());
    let written = artifact.write_to(dir.path());
    assert!(written.is_ok());
    let on_disk = std::fs::read_to_string(written.unwrap_or_else(|_| unreachable!()));
    assert_eq!(on_disk.ok(), Some(artifact.body.clone()));

    // editing continues on the live document after a download
    let still_marked = preview.document().is_some_and(|doc| {
        doc.elements()
            .any(|node| doc.has_class(node, markers::SELECTED_CLASS))
    });
    assert!(still_marked);
}
