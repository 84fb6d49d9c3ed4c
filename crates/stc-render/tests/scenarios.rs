//! End-to-end rendering scenarios against a content root on disk.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use stc_core::{ContentLocator, GlobalSettings, Namespace, ProcessingMode, SubdirectoryTag};
use stc_render::{
    EmbedAdapter, RenderDispatcher, RenderError, RenderResult, RendererAdapter, StaticSettings,
};

const BASE: &str = "https://example.com/sites/default/files";

const PAGE: &str = r##"<!DOCTYPE html>
<html>
<head>
  <link rel="stylesheet" href="css/app.css?v=3">
  <style>body { background: url('img/bg.png'); }</style>
</head>
<body>
  <img src="./img/logo.png" alt="Logo" onclick="track()">
  <a href="https://cdn.example.com/lib.js">CDN</a>
  <a href="#top">Top</a>
  <script src="js/app.js"></script>
</body>
</html>
"##;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn hardened_settings() -> GlobalSettings {
    GlobalSettings {
        default_processing: ProcessingMode::Hardened,
        ..GlobalSettings::default()
    }
}

fn node(id: &str) -> ContentLocator {
    ContentLocator::parse("static-content-nodes", id).unwrap()
}

#[test]
fn test_src_only_content_is_proxied_not_sanitized() {
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "static-content-nodes/42/src/index.html", PAGE);
    let dispatcher = RenderDispatcher::new(temp.path(), BASE);

    let result = dispatcher.render(&node("42"), &hardened_settings()).unwrap();

    assert_eq!(result.subdirectory(), SubdirectoryTag::Src);
    assert_eq!(result.processing_mode(), Some(ProcessingMode::Proxied));
    let RenderResult::DocumentArray(content) = result else {
        panic!("expected document result");
    };
    let dir = "https://example.com/sites/default/files/static-content-nodes/42/src";
    assert_eq!(
        content.markup,
        PAGE.replace("css/app.css?v=3", &format!("{dir}/css/app.css?v=3"))
            .replace("'img/bg.png'", &format!("'{dir}/img/bg.png'"))
            .replace("./img/logo.png", &format!("{dir}/img/logo.png"))
            .replace("\"js/app.js\"", &format!("\"{dir}/js/app.js\""))
    );
    // Nothing was sanitized.
    assert!(content.markup.contains(r#"onclick="track()""#));
    assert!(content.markup.contains("<script src="));
}

#[test]
fn test_raw_override_returns_file_bytes() {
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "static-content-nodes/42/src/index.html", PAGE);
    write(
        temp.path(),
        "static-content-nodes/42/stc.options.yml",
        "processing_type: raw\n",
    );
    let dispatcher = RenderDispatcher::new(temp.path(), BASE);

    let result = dispatcher.render(&node("42"), &hardened_settings()).unwrap();

    assert_eq!(result.processing_mode(), Some(ProcessingMode::Raw));
    let RenderResult::DocumentArray(content) = result else {
        panic!("expected document result");
    };
    assert_eq!(content.markup, PAGE);
}

#[test]
fn test_missing_content_renders_placeholder() {
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "static-content-nodes/42/src/index.html", PAGE);
    let dispatcher = Arc::new(RenderDispatcher::new(temp.path(), BASE));

    let err = dispatcher
        .render(&node("99"), &hardened_settings())
        .unwrap_err();
    assert!(matches!(&err, RenderError::NotFound(locator) if locator.id.as_str() == "99"));

    let adapter = EmbedAdapter::new(
        Arc::clone(&dispatcher),
        Arc::new(StaticSettings::new(hardened_settings())),
    );
    let out = adapter.render(&node("99"));
    assert!(out.is_placeholder());
    assert!(out.html().contains("messages--error"));
    assert!(out.html().contains("static-content-nodes/99"));
}

#[test]
fn test_hardened_differs_from_proxied_only_by_removals() {
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "static-content-nodes/1/proxied/index.html", PAGE);
    write(temp.path(), "static-content-nodes/2/hardened/index.html", PAGE);
    let dispatcher = RenderDispatcher::new(temp.path(), BASE);

    let markup = |id: &str| match dispatcher.render(&node(id), &hardened_settings()).unwrap() {
        RenderResult::DocumentArray(content) => content.markup,
        other => panic!("expected document result, got {other:?}"),
    };
    let proxied = markup("1").replace("static-content-nodes/1/proxied", "DIR");
    let hardened = markup("2").replace("static-content-nodes/2/hardened", "DIR");

    let script = format!(r#"<script src="{BASE}/DIR/js/app.js"></script>"#);
    assert!(proxied.contains(&script));
    assert_eq!(
        hardened,
        proxied
            .replace(r#" onclick="track()""#, "")
            .replace(&script, "")
    );
}

#[test]
fn test_precedence_across_namespaces() {
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "static-content-blocks/b/build/index.html", "<p>build</p>");
    write(temp.path(), "static-content-blocks/b/hardened/index.html", "<p>hardened</p>");
    let dispatcher = RenderDispatcher::new(temp.path(), BASE);
    let locator = ContentLocator::new(Namespace::Blocks, "b").unwrap();

    let plan = dispatcher.plan(&locator, &hardened_settings()).unwrap();

    assert_eq!(plan.resolved.tag, SubdirectoryTag::Build);
    assert_eq!(plan.processing_mode, ProcessingMode::Hardened);
}
