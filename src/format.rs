use crate::buffer::{SourceDocument, SourceRange};
use crate::occurrence::{resolve, Marker, Occurrence, ResolveHint};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Bold,
    Highlight,
    RedHighlight,
    Delete,
}

impl Format {
    fn marker(self) -> Option<Marker> {
        match self {
            Format::Bold => Some(Marker::Bold),
            Format::Highlight => Some(Marker::Highlight),
            Format::RedHighlight | Format::Delete => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Replace { range: SourceRange, text: String },
    Delete { range: SourceRange },
}

impl Edit {
    pub fn range(&self) -> SourceRange {
        match self {
            Edit::Replace { range, .. } | Edit::Delete { range } => *range,
        }
    }

    /// Issue the single mutation this edit stands for.
    pub fn apply(&self, doc: &mut impl SourceDocument) -> Result<()> {
        match self {
            Edit::Replace { range, text } => doc.replace_range(*range, text),
            Edit::Delete { range } => doc.delete_range(*range),
        }
    }

    /// The line as it will read once the edit is applied.
    pub fn preview_line(&self, line: &str) -> String {
        let range = self.range();
        let replacement = match self {
            Edit::Replace { text, .. } => text.as_str(),
            Edit::Delete { .. } => "",
        };
        format!("{}{}{}", &line[..range.start], replacement, &line[range.end..])
    }
}

const MARK_CLOSE: &str = "</mark>";

/// Work out the edit for `format` applied to a resolved occurrence on `line`.
pub fn plan_edit(line_idx: usize, line: &str, occ: &Occurrence, format: Format, red_style: &str) -> Edit {
    let selected = &line[occ.char_start..occ.char_end];
    let range = |start, end| SourceRange {
        line: line_idx,
        start,
        end,
    };

    if let Some(marker) = format.marker() {
        let token = marker.token();
        if occ.wrap_marker == Some(marker) {
            return Edit::Replace {
                range: range(occ.char_start - token.len(), occ.char_end + token.len()),
                text: selected.to_string(),
            };
        }
        return Edit::Replace {
            range: range(occ.char_start, occ.char_end),
            text: format!("{token}{selected}{token}"),
        };
    }

    match format {
        Format::RedHighlight => {
            if let Some(open) = enclosing_mark_open(line, occ.char_start, occ.char_end) {
                return Edit::Replace {
                    range: range(open, occ.char_end + MARK_CLOSE.len()),
                    text: selected.to_string(),
                };
            }
            Edit::Replace {
                range: range(occ.char_start, occ.char_end),
                text: format!("<mark style=\"{red_style}\">{selected}</mark>"),
            }
        }
        _ => {
            let (mut start, mut end) = (occ.char_start, occ.char_end);
            for token in ["==", "**", "=="] {
                if line[..start].ends_with(token) && line[end..].starts_with(token) {
                    start -= token.len();
                    end += token.len();
                }
            }
            if let Some(open) = enclosing_mark_open(line, start, end) {
                start = open;
                end += MARK_CLOSE.len();
            }
            Edit::Delete {
                range: range(start, end),
            }
        }
    }
}

/// Byte offset of a `<mark ...>` tag ending exactly at `start`, when a
/// `</mark>` begins exactly at `end`.
fn enclosing_mark_open(line: &str, start: usize, end: usize) -> Option<usize> {
    if !line[end..].starts_with(MARK_CLOSE) {
        return None;
    }
    let prefix = &line[..start];
    if !prefix.ends_with('>') {
        return None;
    }
    let open = prefix.rfind("<mark")?;
    let tag = &prefix[open..];
    let tag_body = &tag[..tag.len() - 1];
    let boundary = tag_body[5..].chars().next();
    if tag_body.contains('>') || !matches!(boundary, None | Some(' ')) {
        return None;
    }
    Some(open)
}

/// Resolve `selected_text` in `doc` and apply `format` with exactly one mutation.
pub fn apply_format(
    doc: &mut impl SourceDocument,
    selected_text: &str,
    format: Format,
    hint: &ResolveHint,
    red_style: &str,
) -> Result<Edit> {
    let lines = doc.source_lines();
    let occ = resolve(&lines, selected_text, hint)?;
    let edit = plan_edit(occ.line, &lines[occ.line], &occ, format, red_style);
    edit.apply(doc)?;
    info!(
        ?format,
        line = occ.line,
        start = occ.char_start,
        toggled_off = occ.wrap_marker.is_some(),
        "applied format"
    );
    Ok(edit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SourceBuffer;
    use crate::error::SyncError;
    use pretty_assertions::assert_eq;

    const RED: &str = "background:#ff6b6b;color:#fff";

    #[test]
    fn control_line_separators_stay_inside_their_line() {
        assert_eq!(
            apply("a\rlonger line here xx\ntarget", "target", Format::Bold),
            "a\rlonger line here xx\n**target**"
        );

        let mut buf = SourceBuffer::new("page one\u{c}second page words\nwords");
        let hint = ResolveHint {
            line: Some(1),
            ..ResolveHint::default()
        };
        apply_format(&mut buf, "words", Format::Highlight, &hint, RED).unwrap();
        assert_eq!(buf.current_text(), "page one\u{c}second page words\n==words==");
    }

    fn apply(text: &str, selected: &str, format: Format) -> String {
        let mut buf = SourceBuffer::new(text);
        apply_format(&mut buf, selected, format, &ResolveHint::default(), RED).unwrap();
        buf.current_text()
    }

    #[test]
    fn bold_toggles_on_and_off() {
        let once = apply("Some highlighted text.", "highlighted", Format::Bold);
        assert_eq!(once, "Some **highlighted** text.");
        let twice = apply(&once, "highlighted", Format::Bold);
        assert_eq!(twice, "Some highlighted text.");
    }

    #[test]
    fn highlight_toggles_existing_marker_off() {
        assert_eq!(
            apply("Some ==highlighted== text.", "highlighted", Format::Highlight),
            "Some highlighted text."
        );
    }

    #[test]
    fn bold_inside_highlight_does_not_strip_highlight() {
        assert_eq!(
            apply("a ==word== b", "word", Format::Bold),
            "a ==**word**== b"
        );
    }

    #[test]
    fn red_highlight_wraps_and_unwraps() {
        let on = apply("make this hot", "hot", Format::RedHighlight);
        assert_eq!(
            on,
            "make this <mark style=\"background:#ff6b6b;color:#fff\">hot</mark>"
        );
        assert_eq!(apply(&on, "hot", Format::RedHighlight), "make this hot");
    }

    #[test]
    fn red_highlight_ignores_other_tags() {
        assert_eq!(
            apply("<markup>x</mark>", "x", Format::RedHighlight),
            "<markup><mark style=\"background:#ff6b6b;color:#fff\">x</mark></mark>"
        );
    }

    #[test]
    fn delete_swallows_adjacent_markers() {
        assert_eq!(apply("a ==**gone**== b", "gone", Format::Delete), "a  b");
        assert_eq!(apply("a **gone** b", "gone", Format::Delete), "a  b");
        assert_eq!(
            apply("a <mark style=\"x\">==gone==</mark> b", "gone", Format::Delete),
            "a  b"
        );
    }

    #[test]
    fn delete_leaves_one_sided_markers() {
        assert_eq!(apply("**gone and more", "gone", Format::Delete), "** and more");
    }

    #[test]
    fn preview_line_matches_applied_edit() {
        let line = "Some ==highlighted== text.";
        let lines = vec![line.to_string()];
        let occ = resolve(&lines, "highlighted", &ResolveHint::default()).unwrap();
        let edit = plan_edit(0, line, &occ, Format::Highlight, RED);
        assert_eq!(edit.preview_line(line), "Some highlighted text.");
    }

    struct CountingDoc {
        inner: SourceBuffer,
        calls: usize,
    }

    impl SourceDocument for CountingDoc {
        fn current_text(&self) -> String {
            self.inner.current_text()
        }

        fn line_count(&self) -> usize {
            self.inner.line_count()
        }

        fn replace_range(&mut self, range: SourceRange, text: &str) -> Result<()> {
            self.calls += 1;
            self.inner.replace_range(range, text)
        }

        fn delete_range(&mut self, range: SourceRange) -> Result<()> {
            self.calls += 1;
            self.inner.delete_range(range)
        }
    }

    #[test]
    fn each_format_issues_exactly_one_mutation() {
        for format in [Format::Bold, Format::Highlight, Format::RedHighlight, Format::Delete] {
            let mut doc = CountingDoc {
                inner: SourceBuffer::new("x ==target== y"),
                calls: 0,
            };
            apply_format(&mut doc, "target", format, &ResolveHint::default(), RED).unwrap();
            assert_eq!(doc.calls, 1, "{format:?}");
        }
    }

    #[test]
    fn unresolved_selection_mutates_nothing() {
        let mut doc = CountingDoc {
            inner: SourceBuffer::new("nothing to see"),
            calls: 0,
        };
        let err = apply_format(&mut doc, "missing", Format::Bold, &ResolveHint::default(), RED)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::OccurrenceNotFound { .. })
        ));
        assert_eq!(doc.calls, 0);
        assert!(!doc.inner.is_dirty());
    }
}
