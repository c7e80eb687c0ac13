use crate::anchor::AnchorTable;
use crate::render::{BlockKind, InlineRun, MarkKind, RenderedBlock, RunStyle};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

#[derive(Debug, Clone, Copy)]
pub struct PreviewStyles {
    pub base: Style,
    pub heading: Style,
    pub link_color: Color,
    pub inline_code: Style,
    pub code_block: Style,
    pub prefix: Style,
    pub math: Style,
    pub mark: Style,
    pub red_mark: Style,
}

impl Default for PreviewStyles {
    fn default() -> Self {
        Self {
            base: Style::default(),
            heading: Style::default().add_modifier(Modifier::BOLD),
            link_color: Color::Cyan,
            inline_code: Style::default().fg(Color::Yellow),
            code_block: Style::default(),
            prefix: Style::default().fg(Color::DarkGray),
            math: Style::default().add_modifier(Modifier::ITALIC),
            mark: Style::default().fg(Color::Black).bg(Color::Yellow),
            red_mark: Style::default().fg(Color::White).bg(Color::Rgb(0xff, 0x6b, 0x6b)),
        }
    }
}

/// A piece of preview text found by search-select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub row: usize,
    pub start: usize,
    pub end: usize,
    pub block: Option<usize>,
    pub text: String,
}

pub struct PreviewLayout {
    pub lines: Vec<Line<'static>>,
    pub plain_lines: Vec<String>,
    pub blocks: Vec<RenderedBlock>,
    row_blocks: Vec<Option<usize>>,
}

impl PreviewLayout {
    pub fn content_height(&self) -> f64 {
        self.lines.len() as f64
    }

    pub fn block_at_row(&self, row: usize) -> Option<usize> {
        self.row_blocks.get(row).copied().flatten()
    }
}

/// Colours the rows of a fenced code block by its language. `None` falls
/// back to the flat code style.
pub trait CodeHighlighter {
    fn highlight_code(&self, language: Option<&str>, code: &str) -> Option<Vec<Line<'static>>>;
}

/// Originating source line of a block, `None` while it is unanchored.
pub fn data_line(anchors: &AnchorTable, block: usize) -> Option<usize> {
    anchors.line_for_block(block)
}

pub fn layout(
    blocks: &[RenderedBlock],
    styles: &PreviewStyles,
    code: Option<&dyn CodeHighlighter>,
    width: u16,
    wrap: bool,
    tab_width: usize,
) -> PreviewLayout {
    let width = width.max(1) as usize;
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut row_blocks = Vec::new();
    let mut positioned = Vec::with_capacity(blocks.len());

    for (idx, block) in blocks.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
            row_blocks.push(None);
        }
        let top = lines.len();
        let (first_prefix, rest_prefix) = block_prefix(block.kind);
        let prefix_width = UnicodeWidthStr::width(first_prefix);
        let body_width = width.saturating_sub(prefix_width).max(1);

        let mut first = true;
        let highlighted = match (block.kind, code) {
            (BlockKind::CodeBlock, Some(code)) => code.highlight_code(
                block.language.as_deref(),
                &expand_tabs(&block.text_content, tab_width),
            ),
            _ => None,
        };
        let rows =
            highlighted.unwrap_or_else(|| split_rows(&block.runs, block.kind, styles, tab_width));
        for raw in rows {
            let wrapped = if wrap && block.kind != BlockKind::CodeBlock {
                wrap_line(&raw, body_width)
            } else {
                vec![raw]
            };
            for row in wrapped {
                let prefix = if first { first_prefix } else { rest_prefix };
                first = false;
                let mut spans = Vec::with_capacity(row.spans.len() + 1);
                if !prefix.is_empty() {
                    spans.push(Span::styled(prefix.to_string(), styles.prefix));
                }
                spans.extend(row.spans);
                lines.push(Line::from(spans));
                row_blocks.push(Some(idx));
            }
        }
        if lines.len() == top {
            lines.push(Line::from(""));
            row_blocks.push(Some(idx));
        }
        positioned.push(block.positioned(top as f64, (lines.len() - top) as f64));
    }

    let plain_lines = lines.iter().map(line_to_plain).collect();
    PreviewLayout {
        lines,
        plain_lines,
        blocks: positioned,
        row_blocks,
    }
}

fn block_prefix(kind: BlockKind) -> (&'static str, &'static str) {
    match kind {
        BlockKind::ListItem => ("• ", "  "),
        BlockKind::BlockquoteParagraph => ("│ ", "│ "),
        BlockKind::CodeBlock => ("  ", "  "),
        BlockKind::MathBlock => ("    ", "    "),
        _ => ("", ""),
    }
}

fn block_style(kind: BlockKind, styles: &PreviewStyles) -> Style {
    match kind {
        BlockKind::Heading(_) => styles.heading,
        BlockKind::CodeBlock => styles.code_block,
        BlockKind::MathBlock => styles.math,
        _ => styles.base,
    }
}

fn run_style(base: Style, run: RunStyle, styles: &PreviewStyles) -> Style {
    let mut style = base;
    if run.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if run.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if run.strike {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if run.code {
        style = style.patch(styles.inline_code);
    }
    if run.link {
        style = style.fg(styles.link_color).add_modifier(Modifier::UNDERLINED);
    }
    match run.mark {
        Some(MarkKind::Yellow) => style = style.patch(styles.mark),
        Some(MarkKind::Red) => style = style.patch(styles.red_mark),
        None => {}
    }
    style
}

/// Break runs on `\n` into unwrapped rows of styled spans.
fn split_rows(
    runs: &[InlineRun],
    kind: BlockKind,
    styles: &PreviewStyles,
    tab_width: usize,
) -> Vec<Line<'static>> {
    let base = block_style(kind, styles);
    let mut rows = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    for run in runs {
        let style = run_style(base, run.style, styles);
        let text = expand_tabs(&run.text, tab_width);
        let mut parts = text.split('\n');
        if let Some(part) = parts.next() {
            if !part.is_empty() {
                current.push(Span::styled(part.to_string(), style));
            }
        }
        for part in parts {
            rows.push(Line::from(std::mem::take(&mut current)));
            if !part.is_empty() {
                current.push(Span::styled(part.to_string(), style));
            }
        }
    }
    if !current.is_empty() || rows.is_empty() {
        rows.push(Line::from(current));
    }
    rows
}

fn expand_tabs(text: &str, tab_width: usize) -> String {
    if text.contains('\t') {
        text.replace('\t', &" ".repeat(tab_width.max(1)))
    } else {
        text.to_string()
    }
}

struct Token {
    text: String,
    style: Style,
    is_whitespace: bool,
}

fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    let tokens = tokenize_line(line);
    if tokens.is_empty() {
        return vec![Line::from("")];
    }

    let mut out: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0usize;

    let push_current = |current: &mut Vec<Span<'static>>, out: &mut Vec<Line<'static>>| {
        trim_trailing_ws(current);
        out.push(Line::from(std::mem::take(current)));
    };

    for token in tokens {
        let token_width = UnicodeWidthStr::width(token.text.as_str());
        if token.is_whitespace {
            if current.is_empty() {
                continue;
            }
            if current_width + token_width > width {
                push_current(&mut current, &mut out);
                current_width = 0;
                continue;
            }
            current.push(Span::styled(token.text, token.style));
            current_width += token_width;
            continue;
        }

        if token_width <= width {
            if current_width + token_width > width && !current.is_empty() {
                push_current(&mut current, &mut out);
                current_width = 0;
            }
            current.push(Span::styled(token.text, token.style));
            current_width += token_width;
            continue;
        }

        // A word wider than the pane is split at character boundaries.
        if !current.is_empty() {
            push_current(&mut current, &mut out);
            current_width = 0;
        }
        let mut buf = String::new();
        let mut buf_width = 0usize;
        for ch in token.text.chars() {
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
            if buf_width + ch_width > width && !buf.is_empty() {
                out.push(Line::from(Span::styled(std::mem::take(&mut buf), token.style)));
                buf_width = 0;
            }
            buf.push(ch);
            buf_width += ch_width;
        }
        if !buf.is_empty() {
            current.push(Span::styled(buf, token.style));
            current_width = buf_width;
        }
    }

    if !current.is_empty() || out.is_empty() {
        push_current(&mut current, &mut out);
    }
    out
}

fn tokenize_line(line: &Line<'static>) -> Vec<Token> {
    let mut tokens = Vec::new();
    for span in &line.spans {
        let mut buf = String::new();
        let mut current_ws: Option<bool> = None;
        for ch in span.content.chars() {
            let is_ws = ch.is_whitespace();
            if current_ws.is_some_and(|ws| ws != is_ws) {
                tokens.push(Token {
                    text: std::mem::take(&mut buf),
                    style: span.style,
                    is_whitespace: !is_ws,
                });
            }
            current_ws = Some(is_ws);
            buf.push(ch);
        }
        if let Some(is_whitespace) = current_ws {
            tokens.push(Token {
                text: buf,
                style: span.style,
                is_whitespace,
            });
        }
    }
    tokens
}

fn trim_trailing_ws(spans: &mut Vec<Span<'static>>) {
    while let Some(last) = spans.last_mut() {
        let trimmed = last.content.trim_end_matches(' ');
        if trimmed.len() == last.content.len() {
            break;
        }
        if trimmed.is_empty() {
            spans.pop();
            continue;
        }
        last.content = trimmed.to_string().into();
        break;
    }
}

fn line_to_plain(line: &Line<'static>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}

/// Every occurrence of `query` in the laid out rows, top to bottom.
pub fn find_selections(layout: &PreviewLayout, query: &str, case_sensitive: bool) -> Vec<Selection> {
    let needle = if case_sensitive {
        query.to_string()
    } else {
        query.to_ascii_lowercase()
    };
    let mut out = Vec::new();
    if needle.trim().is_empty() {
        return out;
    }
    for (row, line) in layout.plain_lines.iter().enumerate() {
        let hay = if case_sensitive {
            line.clone()
        } else {
            line.to_ascii_lowercase()
        };
        for (start, _) in hay.match_indices(&needle) {
            let end = start + needle.len();
            out.push(Selection {
                row,
                start,
                end,
                block: layout.block_at_row(row),
                text: line[start..end].to_string(),
            });
        }
    }
    out
}

/// How many selections before `index` show the same text. Used as the
/// resolver's ordinal hint.
pub fn ordinal_of(selections: &[Selection], index: usize) -> usize {
    let Some(target) = selections.get(index) else {
        return 0;
    };
    selections[..index]
        .iter()
        .filter(|s| s.text == target.text)
        .count()
}

/// Restyle the byte range `start..end` of `line` as the active selection.
pub fn highlight_range(line: &Line<'static>, start: usize, end: usize) -> Line<'static> {
    let mut out_spans: Vec<Span<'static>> = Vec::new();
    let mut cursor = 0usize;
    for span in &line.spans {
        let text = span.content.as_ref();
        let span_start = cursor;
        let span_end = cursor + text.len();
        cursor = span_end;

        let from = start.clamp(span_start, span_end) - span_start;
        let to = end.clamp(span_start, span_end) - span_start;
        if from >= to {
            out_spans.push(span.clone());
            continue;
        }
        if from > 0 {
            out_spans.push(Span::styled(text[..from].to_string(), span.style));
        }
        out_spans.push(Span::styled(
            text[from..to].to_string(),
            span.style.add_modifier(Modifier::REVERSED),
        ));
        if to < text.len() {
            out_spans.push(Span::styled(text[to..].to_string(), span.style));
        }
    }
    Line::from(out_spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{build_anchors, AnchorSettings};
    use crate::render::render_markdown;
    use pretty_assertions::assert_eq;

    struct UpperCase;

    impl CodeHighlighter for UpperCase {
        fn highlight_code(&self, language: Option<&str>, code: &str) -> Option<Vec<Line<'static>>> {
            language?;
            Some(
                code.split('\n')
                    .map(|row| Line::from(Span::styled(row.to_string(), Style::default().fg(Color::Red))))
                    .collect(),
            )
        }
    }

    #[test]
    fn fenced_code_rows_come_from_the_highlighter() {
        let rendered = render_markdown("```rust\nlet a = 1;\nlet b = 2;\n```\n\n    plain\n");
        let view = layout(&rendered, &PreviewStyles::default(), Some(&UpperCase), 40, true, 4);
        assert_eq!(view.plain_lines, vec!["  let a = 1;", "  let b = 2;", "", "  plain"]);
        assert_eq!(view.lines[0].spans[1].style.fg, Some(Color::Red));
        assert_eq!(view.lines[3].spans[1].style.fg, None);
        assert_eq!(view.blocks[0].height, 2.0);
    }

    fn laid_out(src: &str, width: u16) -> PreviewLayout {
        let rendered = render_markdown(src);
        layout(&rendered, &PreviewStyles::default(), None, width, true, 4)
    }

    #[test]
    fn blocks_are_stacked_with_gaps() {
        let view = laid_out("# Title\n\nfirst para\n\nsecond para", 40);
        let tops: Vec<(f64, f64)> = view
            .blocks
            .iter()
            .map(|b| (b.dom_position, b.height))
            .collect();
        assert_eq!(tops, vec![(0.0, 1.0), (2.0, 1.0), (4.0, 1.0)]);
        assert_eq!(view.content_height(), 5.0);
        assert_eq!(view.block_at_row(1), None);
        assert_eq!(view.block_at_row(4), Some(2));
    }

    #[test]
    fn long_paragraph_wraps_to_width() {
        let view = laid_out("alpha beta gamma delta epsilon", 12);
        assert_eq!(
            view.plain_lines,
            vec!["alpha beta", "gamma delta", "epsilon"]
        );
        assert_eq!(view.blocks[0].height, 3.0);
    }

    #[test]
    fn wide_characters_count_double() {
        let view = laid_out("日本語 テキスト", 8);
        assert_eq!(view.plain_lines, vec!["日本語", "テキスト"]);
    }

    #[test]
    fn overlong_word_is_split() {
        let view = laid_out("abcdefghij", 4);
        assert_eq!(view.plain_lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn list_items_get_bullets() {
        let view = laid_out("- one\n- two", 20);
        assert_eq!(view.plain_lines, vec!["• one", "", "• two"]);
    }

    #[test]
    fn highlight_runs_are_styled() {
        let view = laid_out("plain ==marked== end", 40);
        let styles = PreviewStyles::default();
        let marked = view.lines[0]
            .spans
            .iter()
            .find(|s| s.content.as_ref() == "marked")
            .unwrap();
        assert_eq!(marked.style.bg, styles.mark.bg);
    }

    #[test]
    fn selections_report_block_and_ordinal() {
        let view = laid_out("one Word here\n\nanother word there", 40);
        let found = find_selections(&view, "word", false);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].text, "Word");
        assert_eq!(found[1].block, Some(1));
        assert_eq!(ordinal_of(&found, 1), 0);

        let exact = find_selections(&view, "word", true);
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].row, 2);
    }

    #[test]
    fn ordinal_counts_previous_identical_text() {
        let view = laid_out("x y x\n\nx", 40);
        let found = find_selections(&view, "x", true);
        assert_eq!(found.len(), 3);
        assert_eq!(ordinal_of(&found, 2), 2);
    }

    #[test]
    fn highlight_range_splits_spans() {
        let line = Line::from(vec![Span::raw("abc"), Span::raw("def")]);
        let lit = highlight_range(&line, 2, 4);
        let parts: Vec<(&str, bool)> = lit
            .spans
            .iter()
            .map(|s| {
                (
                    s.content.as_ref(),
                    s.style.add_modifier.contains(Modifier::REVERSED),
                )
            })
            .collect();
        assert_eq!(
            parts,
            vec![("ab", false), ("c", true), ("d", true), ("ef", false)]
        );
    }

    #[test]
    fn unanchored_block_has_no_data_line() {
        let src = "# Title\n\nx";
        let rendered = render_markdown(src);
        let lines: Vec<String> = src.lines().map(str::to_string).collect();
        let anchors = build_anchors(&lines, &rendered, &AnchorSettings::default());
        assert_eq!(data_line(&anchors, 0), Some(0));
        assert_eq!(data_line(&anchors, 1), None);
        assert_eq!(data_line(&anchors, 7), None);
    }
}
