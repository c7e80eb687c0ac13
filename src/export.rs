use crate::anchor::{build_anchors, AnchorSettings};
use crate::buffer::split_lines;
use crate::render::{escape_html, render_html_with_anchors, render_markdown};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const STYLE: &str = r#"
body { max-width: 46rem; margin: 2rem auto; padding: 0 1rem; font-family: system-ui, sans-serif; line-height: 1.6; color: #222; }
pre { background: #f4f4f4; padding: 0.75rem; overflow-x: auto; }
code { font-family: ui-monospace, monospace; }
table { border-collapse: collapse; }
th, td { border: 1px solid #ccc; padding: 0.25rem 0.5rem; }
blockquote { border-left: 3px solid #ccc; margin-left: 0; padding-left: 1rem; color: #555; }
mark { background: #fff59d; }
mark.red-highlight { background: #ff6b6b; color: #fff; }
.math-display { display: block; text-align: center; font-family: ui-monospace, monospace; margin: 1rem 0; }
"#;

/// A complete HTML document for `source`, block elements tagged with the
/// source line they came from.
pub fn export_html(source: &str, title: &str, settings: &AnchorSettings) -> String {
    let lines = split_lines(source);
    let rendered = render_markdown(source);
    let anchors = build_anchors(&lines, &rendered, settings);
    if anchors.is_empty() && !rendered.is_empty() {
        warn!(blocks = anchors.len(), "no block could be anchored to a source line");
    }
    let body = render_html_with_anchors(source, &anchors);
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

pub fn default_output_path(source_path: &Path) -> PathBuf {
    source_path.with_extension("html")
}

/// Write the export next to the source file, or to `out` when given.
pub fn write_export(
    source_path: &Path,
    source: &str,
    out: Option<&Path>,
    settings: &AnchorSettings,
) -> Result<PathBuf> {
    let target = match out {
        Some(path) => path.to_path_buf(),
        None => default_output_path(source_path),
    };
    let title = source_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let html = export_html(source, &title, settings);
    fs::write(&target, html).with_context(|| format!("Failed to write {}", target.display()))?;
    info!(path = %target.display(), "exported html");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_is_a_standalone_document() {
        let html = export_html("# Notes <1>\n\nbody", "Notes <1>", &AnchorSettings::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Notes &lt;1&gt;</title>"));
        assert!(html.contains("<style>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn anchored_blocks_carry_data_line() {
        let src = "# Title\n\nSome ==highlighted== text.\n\nand ::urgent:: bit";
        let html = export_html(src, "t", &AnchorSettings::default());
        assert!(html.contains("<h1 data-line=\"0\">"));
        assert!(html.contains("<p data-line=\"2\">"));
        assert!(html.contains("<mark>highlighted</mark>"));
        assert!(html.contains("<mark class=\"red-highlight\">urgent</mark>"));
    }

    #[test]
    fn writes_next_to_the_source_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("notes.md");
        fs::write(&source_path, "hello there").unwrap();

        let written =
            write_export(&source_path, "hello there", None, &AnchorSettings::default()).unwrap();
        assert_eq!(written, dir.path().join("notes.html"));
        let html = fs::read_to_string(&written).unwrap();
        assert!(html.contains("<title>notes</title>"));
        assert!(html.contains("hello there"));
    }

    #[test]
    fn explicit_output_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("elsewhere.html");
        let written = write_export(
            &dir.path().join("a.md"),
            "x y",
            Some(&out),
            &AnchorSettings::default(),
        )
        .unwrap();
        assert_eq!(written, out);
        assert!(out.exists());
    }
}
