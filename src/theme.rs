use crate::preview::{CodeHighlighter, PreviewStyles};
use anyhow::{Context, Result};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use tracing::debug;

const FALLBACK_THEME: &str = "base16-ocean.dark";

pub struct ThemeManager {
    theme_set: ThemeSet,
    syntax_set: SyntaxSet,
}

#[derive(Debug, Clone, Copy)]
pub struct UiPalette {
    pub base_fg: Color,
    pub base_bg: Option<Color>,
    pub accent: Color,
    pub muted: Color,
    pub code_bg: Option<Color>,
}

impl ThemeManager {
    pub fn load() -> Self {
        Self {
            theme_set: ThemeSet::load_defaults(),
            syntax_set: SyntaxSet::load_defaults_newlines(),
        }
    }

    pub fn theme_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.theme_set.themes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn get(&self, name: &str) -> Result<&Theme> {
        self.theme_set
            .themes
            .get(name)
            .or_else(|| self.theme_set.themes.get(FALLBACK_THEME))
            .or_else(|| self.theme_set.themes.values().next())
            .with_context(|| format!("No syntect theme available for {name}"))
    }

    pub fn ui_palette(&self, name: &str) -> Result<UiPalette> {
        Ok(palette_from_theme(self.get(name)?))
    }

    /// Markdown syntax highlighting for the source pane, one line per source line.
    pub fn highlight_source(&self, lines: &[String], theme_name: &str) -> Result<Vec<Line<'static>>> {
        let theme = self.get(theme_name)?;
        let syntax = self
            .syntax_set
            .find_syntax_by_extension("md")
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        highlight_lines(
            lines.iter().map(String::as_str),
            syntax,
            &self.syntax_set,
            theme,
            None,
        )
    }

    /// Highlighter for fenced code in the preview, painted on `code_bg`.
    pub fn code_theme(&self, theme_name: &str, code_bg: Option<Color>) -> Result<CodeTheme<'_>> {
        Ok(CodeTheme {
            syntax_set: &self.syntax_set,
            theme: self.get(theme_name)?,
            code_bg,
        })
    }
}

pub struct CodeTheme<'a> {
    syntax_set: &'a SyntaxSet,
    theme: &'a Theme,
    code_bg: Option<Color>,
}

impl CodeHighlighter for CodeTheme<'_> {
    fn highlight_code(&self, language: Option<&str>, code: &str) -> Option<Vec<Line<'static>>> {
        let syntax = resolve_code_syntax(self.syntax_set, language);
        match highlight_lines(code.split('\n'), syntax, self.syntax_set, self.theme, self.code_bg) {
            Ok(lines) => Some(lines),
            Err(err) => {
                debug!(%err, ?language, "code highlighting failed");
                None
            }
        }
    }
}

fn highlight_lines<'l>(
    lines: impl Iterator<Item = &'l str>,
    syntax: &SyntaxReference,
    syntax_set: &SyntaxSet,
    theme: &Theme,
    bg: Option<Color>,
) -> Result<Vec<Line<'static>>> {
    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut out = Vec::new();
    for line in lines {
        let with_newline = format!("{line}\n");
        let ranges = highlighter
            .highlight_line(&with_newline, syntax_set)
            .with_context(|| format!("Failed to highlight {line:?}"))?;
        let spans: Vec<Span<'static>> = ranges
            .into_iter()
            .filter_map(|(style, text)| {
                let text = text.trim_end_matches('\n');
                (!text.is_empty()).then(|| {
                    let mut style = to_ratatui_style(style);
                    if let Some(bg) = bg {
                        style = style.bg(bg);
                    }
                    Span::styled(text.to_string(), style)
                })
            })
            .collect();
        out.push(Line::from(spans));
    }
    Ok(out)
}

/// Syntax for a fence info string, by token then by extension.
fn resolve_code_syntax<'a>(syntax_set: &'a SyntaxSet, lang: Option<&str>) -> &'a SyntaxReference {
    let Some(lang) = lang.map(str::trim).filter(|l| !l.is_empty()) else {
        return syntax_set.find_syntax_plain_text();
    };
    let token = lang.strip_prefix("language-").unwrap_or(lang);
    let lower = token.to_ascii_lowercase();
    let alias = match lower.as_str() {
        "sh" | "shell" | "zsh" | "console" => "bash",
        "js" | "jsx" | "mjs" => "javascript",
        "yml" => "yaml",
        "py" => "python",
        "rs" => "rust",
        other => other,
    };
    [token, alias]
        .into_iter()
        .find_map(|cand| {
            syntax_set
                .find_syntax_by_token(cand)
                .or_else(|| syntax_set.find_syntax_by_extension(cand))
        })
        .unwrap_or_else(|| syntax_set.find_syntax_plain_text())
}

fn palette_from_theme(theme: &Theme) -> UiPalette {
    let settings = &theme.settings;
    let base_fg = settings.foreground.map(to_ratatui).unwrap_or(Color::Gray);
    let base_bg = settings.background.map(to_ratatui);
    let accent = settings
        .selection_foreground
        .or(settings.caret)
        .or(settings.foreground)
        .map(to_ratatui)
        .unwrap_or(Color::Cyan);
    let muted = settings
        .gutter_foreground
        .or(settings.foreground)
        .map(to_ratatui)
        .unwrap_or(Color::DarkGray);
    let code_bg = settings
        .line_highlight
        .or(settings.selection)
        .or(settings.background)
        .map(to_ratatui);

    UiPalette {
        base_fg,
        base_bg,
        accent,
        muted,
        code_bg,
    }
}

/// Pane base style plus the preview styles derived from a palette.
pub fn styles_from_palette(ui: UiPalette) -> (Style, PreviewStyles) {
    let base = Style::default().fg(ui.base_fg).bg(ui.base_bg.unwrap_or(Color::Reset));
    let code_bg = ui.code_bg.or_else(|| adjust_bg(ui.base_bg, -0.08)).or(ui.base_bg);
    let code = Style::default().fg(ui.accent).bg(code_bg.unwrap_or(Color::Reset));

    (
        base,
        PreviewStyles {
            base,
            heading: Style::default().fg(ui.accent).add_modifier(Modifier::BOLD),
            link_color: ui.accent,
            inline_code: code,
            code_block: code,
            prefix: Style::default().fg(ui.muted),
            math: Style::default().fg(ui.accent).add_modifier(Modifier::ITALIC),
            ..PreviewStyles::default()
        },
    )
}

fn to_ratatui_style(style: syntect::highlighting::Style) -> Style {
    let mut out = Style::default().fg(to_ratatui(style.foreground));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

fn adjust_bg(color: Option<Color>, delta: f32) -> Option<Color> {
    match color {
        Some(Color::Rgb(r, g, b)) => Some(Color::Rgb(
            adjust_channel(r, delta),
            adjust_channel(g, delta),
            adjust_channel(b, delta),
        )),
        _ => None,
    }
}

fn adjust_channel(value: u8, delta: f32) -> u8 {
    let v = value as f32 / 255.0;
    ((v + delta).clamp(0.0, 1.0) * 255.0).round() as u8
}

fn to_ratatui(color: syntect::highlighting::Color) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}
