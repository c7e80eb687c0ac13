use crate::anchor::{AnchorBlock, AnchorTable};
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    ListItem,
    Table,
    CodeBlock,
    MathBlock,
    BlockquoteParagraph,
}

impl BlockKind {
    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading(_) => "heading",
            BlockKind::ListItem => "list-item",
            BlockKind::Table => "table",
            BlockKind::CodeBlock => "code-block",
            BlockKind::MathBlock => "math-block",
            BlockKind::BlockquoteParagraph => "blockquote-paragraph",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub code: bool,
    pub link: bool,
    pub mark: Option<MarkKind>,
}

/// A styled piece of a block's visible text. `\n` inside `text` is a hard
/// line break in the preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineRun {
    pub text: String,
    pub style: RunStyle,
}

/// One block element of the rendered output. Positions are filled in by the
/// preview layout; a block straight out of the renderer sits at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBlock {
    pub kind: BlockKind,
    pub text_content: String,
    pub runs: Vec<InlineRun>,
    /// Info-string language of a fenced code block.
    pub language: Option<String>,
    pub dom_position: f64,
    pub height: f64,
}

impl RenderedBlock {
    #[cfg(test)]
    pub fn new(kind: BlockKind, text: &str) -> Self {
        Self {
            kind,
            text_content: text.to_string(),
            runs: vec![InlineRun {
                text: text.to_string(),
                style: RunStyle::default(),
            }],
            language: None,
            dom_position: 0.0,
            height: 0.0,
        }
    }

    pub fn positioned(&self, top: f64, height: f64) -> Self {
        Self {
            dom_position: top,
            height,
            ..self.clone()
        }
    }

    pub fn center(&self) -> f64 {
        self.dom_position + self.height / 2.0
    }
}

impl AnchorBlock for RenderedBlock {
    fn kind(&self) -> BlockKind {
        self.kind
    }

    fn text_content(&self) -> &str {
        &self.text_content
    }
}

pub fn render_markdown(input: &str) -> Vec<RenderedBlock> {
    walk(input, None).0
}

/// Render HTML whose block elements carry `data-line` for every anchored block.
pub fn render_html_with_anchors(input: &str, anchors: &AnchorTable) -> String {
    walk(input, Some(anchors)).1.unwrap_or_default()
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

/// Blocks, plus the HTML when `anchors` asks for it.
fn walk(input: &str, anchors: Option<&AnchorTable>) -> (Vec<RenderedBlock>, Option<String>) {
    let normalized = normalize_line_endings(input);
    let (protected, math) = protect_display_math(normalized.as_ref());
    let parser = Parser::new_ext(&protected, markdown_options());

    let mut state = WalkState::new(&math);
    let mut out: Vec<Event> = Vec::new();
    let attr = |index: usize| -> String {
        anchors
            .and_then(|a| a.line_for_block(index))
            .map(|line| format!(" data-line=\"{line}\""))
            .unwrap_or_default()
    };

    for event in parser {
        match event {
            Event::Start(tag) => match tag {
                Tag::Paragraph => {
                    if state.in_table || state.current.is_some() {
                        state.current_separator();
                        out.push(Event::Start(Tag::Paragraph));
                    } else {
                        let kind = if state.blockquote_depth > 0 {
                            BlockKind::BlockquoteParagraph
                        } else {
                            BlockKind::Paragraph
                        };
                        let index = state.open(kind);
                        out.push(Event::Html(format!("<p{}>", attr(index)).into()));
                    }
                }
                Tag::Heading { level, .. } => {
                    let level = level as u8;
                    let index = state.open(BlockKind::Heading(level));
                    out.push(Event::Html(format!("<h{level}{}>", attr(index)).into()));
                }
                Tag::Item => {
                    state.flush();
                    let index = state.open(BlockKind::ListItem);
                    out.push(Event::Html(format!("<li{}>", attr(index)).into()));
                }
                Tag::List(start) => {
                    if matches!(state.current_kind(), Some(BlockKind::ListItem)) {
                        state.flush();
                    }
                    out.push(Event::Start(Tag::List(start)));
                }
                Tag::CodeBlock(kind) => {
                    state.flush();
                    let index = state.open(BlockKind::CodeBlock);
                    state.set_language(code_language(&kind));
                    state.in_code = true;
                    out.push(Event::Html(format!("<div class=\"code\"{}>", attr(index)).into()));
                    out.push(Event::Start(Tag::CodeBlock(kind)));
                }
                Tag::Table(alignments) => {
                    state.flush();
                    let index = state.open(BlockKind::Table);
                    state.in_table = true;
                    out.push(Event::Html(format!("<div class=\"table\"{}>", attr(index)).into()));
                    out.push(Event::Start(Tag::Table(alignments)));
                }
                Tag::TableRow | Tag::TableHead => {
                    state.start_row();
                    out.push(Event::Start(tag));
                }
                Tag::TableCell => {
                    state.start_cell();
                    out.push(Event::Start(tag));
                }
                Tag::BlockQuote => {
                    state.blockquote_depth += 1;
                    out.push(Event::Start(tag));
                }
                Tag::Emphasis => {
                    state.style.italic = true;
                    out.push(Event::Start(tag));
                }
                Tag::Strong => {
                    state.style.bold = true;
                    out.push(Event::Start(tag));
                }
                Tag::Strikethrough => {
                    state.style.strike = true;
                    out.push(Event::Start(tag));
                }
                Tag::Link { .. } => {
                    state.style.link = true;
                    out.push(Event::Start(tag));
                }
                other => out.push(Event::Start(other)),
            },
            Event::End(tag) => {
                match tag {
                    TagEnd::Paragraph => {
                        if matches!(
                            state.current_kind(),
                            Some(BlockKind::Paragraph | BlockKind::BlockquoteParagraph)
                        ) {
                            state.flush();
                        }
                    }
                    TagEnd::Heading(_) | TagEnd::Item => state.flush(),
                    TagEnd::CodeBlock => {
                        state.in_code = false;
                        state.flush();
                    }
                    TagEnd::Table => {
                        state.in_table = false;
                        state.flush();
                    }
                    TagEnd::BlockQuote => {
                        state.blockquote_depth = state.blockquote_depth.saturating_sub(1)
                    }
                    TagEnd::Emphasis => state.style.italic = false,
                    TagEnd::Strong => state.style.bold = false,
                    TagEnd::Strikethrough => state.style.strike = false,
                    TagEnd::Link => state.style.link = false,
                    _ => {}
                }
                out.push(Event::End(tag));
                if matches!(tag, TagEnd::CodeBlock | TagEnd::Table) {
                    out.push(Event::Html("</div>\n".into()));
                }
            }
            Event::Text(text) => {
                if state.in_code {
                    state.push_run(&text, state.style);
                    out.push(Event::Text(text));
                } else {
                    for (segment, mark) in split_highlights(&text) {
                        let style = RunStyle {
                            mark: mark.or(state.style.mark),
                            ..state.style
                        };
                        state.push_run(&segment, style);
                        match mark {
                            Some(MarkKind::Yellow) => out.push(Event::Html("<mark>".into())),
                            Some(MarkKind::Red) => {
                                out.push(Event::Html("<mark class=\"red-highlight\">".into()))
                            }
                            None => {}
                        }
                        out.push(Event::Text(CowStr::from(segment)));
                        if mark.is_some() {
                            out.push(Event::Html("</mark>".into()));
                        }
                    }
                }
            }
            Event::Code(code) => {
                let style = RunStyle {
                    code: true,
                    ..state.style
                };
                state.push_run(&code, style);
                out.push(Event::Code(code));
            }
            Event::InlineHtml(raw) => {
                let tag = raw.trim();
                if tag.starts_with("<mark") {
                    state.style.mark = Some(MarkKind::Red);
                } else if tag == "</mark>" {
                    state.style.mark = None;
                }
                out.push(Event::InlineHtml(raw));
            }
            Event::SoftBreak | Event::HardBreak => {
                state.push_run("\n", state.style);
                out.push(Event::HardBreak);
            }
            Event::TaskListMarker(checked) => {
                state.push_run(if checked { "[x] " } else { "[ ] " }, state.style);
                out.push(Event::TaskListMarker(checked));
            }
            Event::FootnoteReference(name) => {
                state.push_run(&format!("[^{name}]"), state.style);
                out.push(Event::FootnoteReference(name));
            }
            other => out.push(other),
        }
    }
    state.flush();

    if anchors.is_none() {
        return (state.blocks, None);
    }
    let mut html_out = String::new();
    html::push_html(&mut html_out, out.into_iter());
    let html_out = restore_display_math(&html_out, &math);
    (state.blocks, Some(html_out))
}

struct WalkState<'m> {
    math: &'m [String],
    blocks: Vec<RenderedBlock>,
    current: Option<BlockBuilder>,
    style: RunStyle,
    blockquote_depth: usize,
    in_code: bool,
    in_table: bool,
}

struct BlockBuilder {
    kind: BlockKind,
    runs: Vec<InlineRun>,
    language: Option<String>,
    cells_in_row: usize,
}

impl<'m> WalkState<'m> {
    fn new(math: &'m [String]) -> Self {
        Self {
            math,
            blocks: Vec::new(),
            current: None,
            style: RunStyle::default(),
            blockquote_depth: 0,
            in_code: false,
            in_table: false,
        }
    }

    fn open(&mut self, kind: BlockKind) -> usize {
        self.flush();
        self.current = Some(BlockBuilder {
            kind,
            runs: Vec::new(),
            language: None,
            cells_in_row: 0,
        });
        self.blocks.len()
    }

    fn set_language(&mut self, language: Option<String>) {
        if let Some(block) = self.current.as_mut() {
            block.language = language;
        }
    }

    fn current_kind(&self) -> Option<BlockKind> {
        self.current.as_ref().map(|b| b.kind)
    }

    /// Paragraph boundaries inside an open block (loose list items).
    fn current_separator(&mut self) {
        if let Some(block) = self.current.as_mut() {
            if !block.runs.is_empty() && block.kind != BlockKind::Table {
                block.runs.push(InlineRun {
                    text: "\n".to_string(),
                    style: RunStyle::default(),
                });
            }
        }
    }

    fn start_row(&mut self) {
        if let Some(block) = self.current.as_mut() {
            if !block.runs.is_empty() {
                block.runs.push(InlineRun {
                    text: "\n".to_string(),
                    style: RunStyle::default(),
                });
            }
            block.cells_in_row = 0;
        }
    }

    fn start_cell(&mut self) {
        if let Some(block) = self.current.as_mut() {
            if block.cells_in_row > 0 {
                block.runs.push(InlineRun {
                    text: " │ ".to_string(),
                    style: RunStyle::default(),
                });
            }
            block.cells_in_row += 1;
        }
    }

    fn push_run(&mut self, text: &str, style: RunStyle) {
        if text.is_empty() {
            return;
        }
        if self.current.is_none() {
            // Text after a nested list continues the enclosing item.
            self.current = Some(BlockBuilder {
                kind: BlockKind::ListItem,
                runs: Vec::new(),
                language: None,
                cells_in_row: 0,
            });
        }
        let text = restore_math_placeholders(text, self.math);
        if let Some(block) = self.current.as_mut() {
            match block.runs.last_mut() {
                Some(last) if last.style == style => last.text.push_str(&text),
                _ => block.runs.push(InlineRun {
                    text: text.into_owned(),
                    style,
                }),
            }
        }
    }

    fn flush(&mut self) {
        let Some(mut block) = self.current.take() else {
            return;
        };
        if block.kind == BlockKind::CodeBlock {
            if let Some(last) = block.runs.last_mut() {
                let trimmed = last.text.trim_end_matches('\n').len();
                last.text.truncate(trimmed);
            }
        }
        let text: String = block.runs.iter().map(|r| r.text.as_str()).collect();
        let mut kind = block.kind;
        if matches!(kind, BlockKind::Paragraph | BlockKind::BlockquoteParagraph)
            && self.math.iter().any(|m| m.trim() == text.trim())
            && !text.trim().is_empty()
        {
            kind = BlockKind::MathBlock;
        }
        self.blocks.push(RenderedBlock {
            kind,
            text_content: text,
            runs: block.runs,
            language: block.language,
            dom_position: 0.0,
            height: 0.0,
        });
    }
}

const MATH_OPEN: &str = "%%MATHBLOCK";
const MATH_CLOSE: &str = "%%";

/// Replace every `$$…$$` span with a placeholder the markdown parser leaves alone.
fn protect_display_math(input: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(input.len());
    let mut math = Vec::new();
    let mut rest = input;
    while let Some(start) = rest.find("$$") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("$$") else {
            break;
        };
        let body = &after[..end];
        if body.is_empty() || body.contains('$') {
            out.push_str(&rest[..start + 2]);
            rest = after;
            continue;
        }
        out.push_str(&rest[..start]);
        out.push_str(&format!("{MATH_OPEN}{}{MATH_CLOSE}", math.len()));
        math.push(body.trim().to_string());
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    (out, math)
}

fn restore_math_placeholders<'t>(text: &'t str, math: &[String]) -> Cow<'t, str> {
    if !text.contains(MATH_OPEN) {
        return Cow::Borrowed(text);
    }
    let mut out = text.to_string();
    for (idx, body) in math.iter().enumerate() {
        out = out.replace(&format!("{MATH_OPEN}{idx}{MATH_CLOSE}"), body);
    }
    Cow::Owned(out)
}

fn restore_display_math(html: &str, math: &[String]) -> String {
    let mut out = html.to_string();
    for (idx, body) in math.iter().enumerate() {
        out = out.replace(
            &format!("{MATH_OPEN}{idx}{MATH_CLOSE}"),
            &format!("<span class=\"math-display\">{}</span>", escape_html(body)),
        );
    }
    out
}

/// Split `==yellow==` and `::red::` spans out of a text run.
pub fn split_highlights(text: &str) -> Vec<(String, Option<MarkKind>)> {
    let mut out: Vec<(String, Option<MarkKind>)> = Vec::new();
    let mut plain = String::new();
    let mut rest = text;
    loop {
        let next = [("==", MarkKind::Yellow), ("::", MarkKind::Red)]
            .into_iter()
            .filter_map(|(marker, kind)| {
                let start = rest.find(marker)?;
                let body_start = start + marker.len();
                let len = rest[body_start..].find(marker)?;
                let body = &rest[body_start..body_start + len];
                let delimiter = marker.chars().next().unwrap_or('=');
                if body.is_empty() || body.contains(delimiter) {
                    return None;
                }
                Some((start, marker.len(), len, kind))
            })
            .min_by_key(|(start, ..)| *start);
        let Some((start, marker_len, len, kind)) = next else {
            break;
        };
        plain.push_str(&rest[..start]);
        if !plain.is_empty() {
            out.push((std::mem::take(&mut plain), None));
        }
        let body_start = start + marker_len;
        out.push((rest[body_start..body_start + len].to_string(), Some(kind)));
        rest = &rest[body_start + len + marker_len..];
    }
    plain.push_str(rest);
    if !plain.is_empty() {
        out.push((plain, None));
    }
    out
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

fn code_language(kind: &CodeBlockKind) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => info
            .split(|c: char| c.is_whitespace() || c == ',')
            .next()
            .filter(|lang| !lang.is_empty())
            .map(str::to_string),
        CodeBlockKind::Indented => None,
    }
}

pub fn normalize_line_endings(input: &str) -> Cow<'_, str> {
    if !input.contains('\r') {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{build_anchors, AnchorSettings};

    fn kinds(blocks: &[RenderedBlock]) -> Vec<BlockKind> {
        blocks.iter().map(|b| b.kind).collect()
    }

    #[test]
    fn blocks_follow_document_order() {
        let doc = "# Title\n\nSome ==highlighted== text.\n\n- one\n- two\n\n> quoted\n\n```rust\nfn main() {}\n```\n";
        let rendered = render_markdown(doc);
        assert_eq!(
            kinds(&rendered),
            vec![
                BlockKind::Heading(1),
                BlockKind::Paragraph,
                BlockKind::ListItem,
                BlockKind::ListItem,
                BlockKind::BlockquoteParagraph,
                BlockKind::CodeBlock,
            ]
        );
        assert_eq!(rendered[1].text_content, "Some highlighted text.");
        assert_eq!(rendered[5].text_content, "fn main() {}");
        assert_eq!(rendered[5].language.as_deref(), Some("rust"));
        assert_eq!(rendered[0].language, None);
    }

    #[test]
    fn fence_info_keeps_only_the_language() {
        let rendered = render_markdown("```python title=\"x\"\nprint(1)\n```\n\n    indented\n");
        assert_eq!(rendered[0].language.as_deref(), Some("python"));
        assert_eq!(rendered[1].kind, BlockKind::CodeBlock);
        assert_eq!(rendered[1].language, None);
    }

    #[test]
    fn highlight_runs_carry_mark_style() {
        let rendered = render_markdown("a ==b== ::c:: d");
        let runs = &rendered[0].runs;
        let marked: Vec<_> = runs
            .iter()
            .filter_map(|r| r.style.mark.map(|m| (r.text.as_str(), m)))
            .collect();
        assert_eq!(marked, vec![("b", MarkKind::Yellow), ("c", MarkKind::Red)]);
        let html = render_html_with_anchors("a ==b== ::c:: d", &AnchorTable::default());
        assert!(html.contains("<mark>b</mark>"));
        assert!(html.contains("<mark class=\"red-highlight\">c</mark>"));
    }

    #[test]
    fn display_math_becomes_math_block() {
        let rendered = render_markdown("intro\n\n$$\nx^2 + y^2\n$$\n\nafter");
        assert_eq!(
            kinds(&rendered),
            vec![BlockKind::Paragraph, BlockKind::MathBlock, BlockKind::Paragraph]
        );
        assert_eq!(rendered[1].text_content, "x^2 + y^2");
        let html = render_html_with_anchors("intro\n\n$$\nx^2 + y^2\n$$\n\nafter", &AnchorTable::default());
        assert!(html.contains("math-display"));
    }

    #[test]
    fn nested_list_items_are_separate_blocks() {
        let rendered = render_markdown("- outer\n  - inner\n- last\n");
        let texts: Vec<_> = rendered
            .iter()
            .map(|b| b.text_content.trim().to_string())
            .collect();
        assert_eq!(texts, vec!["outer", "inner", "last"]);
    }

    #[test]
    fn table_is_one_block() {
        let rendered = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert_eq!(kinds(&rendered), vec![BlockKind::Table]);
        assert_eq!(rendered[0].text_content, "a │ b\n1 │ 2");
    }

    #[test]
    fn red_span_html_styles_run() {
        let rendered =
            render_markdown("x <mark style=\"background:#ff6b6b;color:#fff\">hot</mark> y");
        let red: Vec<_> = rendered[0]
            .runs
            .iter()
            .filter(|r| r.style.mark == Some(MarkKind::Red))
            .map(|r| r.text.as_str())
            .collect();
        assert_eq!(red, vec!["hot"]);
        assert_eq!(rendered[0].text_content, "x hot y");
    }

    #[test]
    fn anchored_html_carries_data_line() {
        let doc = "# Title\n\nbody text here\n";
        let rendered = render_markdown(doc);
        let lines: Vec<String> = doc.lines().map(str::to_string).collect();
        let anchors = build_anchors(&lines, &rendered, &AnchorSettings::default());
        let html = render_html_with_anchors(doc, &anchors);
        assert!(html.contains("<h1 data-line=\"0\">Title</h1>"));
        assert!(html.contains("<p data-line=\"2\">body text here</p>"));
    }

    #[test]
    fn split_highlights_ignores_unclosed_markers() {
        assert_eq!(
            split_highlights("a == b"),
            vec![("a == b".to_string(), None)]
        );
    }

    #[test]
    fn normalize_line_endings_converts_crlf_and_cr() {
        assert_eq!(normalize_line_endings("a\r\nb\rc"), "a\nb\nc");
        assert!(matches!(normalize_line_endings("a\nb"), Cow::Borrowed(_)));
    }
}
