use anyhow::{bail, Result};
use ropey::Rope;

/// A byte range inside a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRange {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

/// The source of truth the sync core reads from and asks to mutate.
pub trait SourceDocument {
    fn current_text(&self) -> String;
    fn line_count(&self) -> usize;
    fn replace_range(&mut self, range: SourceRange, text: &str) -> Result<()>;
    fn delete_range(&mut self, range: SourceRange) -> Result<()>;

    fn source_lines(&self) -> Vec<String> {
        split_lines(&self.current_text())
    }
}

pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect()
}

pub struct SourceBuffer {
    rope: Rope,
    dirty: bool,
}

impl SourceBuffer {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            dirty: false,
        }
    }

    /// Replace the whole buffer with freshly loaded text.
    pub fn reload(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn line(&self, idx: usize) -> Option<String> {
        if idx >= self.rope.len_lines() {
            return None;
        }
        let mut line = self.rope.line(idx).to_string();
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Some(line)
    }

    fn char_span(&self, range: SourceRange) -> Result<(usize, usize)> {
        let Some(line) = self.line(range.line) else {
            bail!("line {} is past the end of the document", range.line);
        };
        if range.start > range.end || range.end > line.len() {
            bail!(
                "range {}..{} is outside line {} ({} bytes)",
                range.start,
                range.end,
                range.line,
                line.len()
            );
        }
        if !line.is_char_boundary(range.start) || !line.is_char_boundary(range.end) {
            bail!("range {}..{} splits a character", range.start, range.end);
        }
        let line_byte = self.rope.line_to_byte(range.line);
        let start = self.rope.byte_to_char(line_byte + range.start);
        let end = self.rope.byte_to_char(line_byte + range.end);
        Ok((start, end))
    }
}

impl SourceDocument for SourceBuffer {
    fn current_text(&self) -> String {
        self.rope.to_string()
    }

    fn source_lines(&self) -> Vec<String> {
        (0..self.rope.len_lines()).filter_map(|idx| self.line(idx)).collect()
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn replace_range(&mut self, range: SourceRange, text: &str) -> Result<()> {
        let (start, end) = self.char_span(range)?;
        self.rope.remove(start..end);
        self.rope.insert(start, text);
        self.dirty = true;
        Ok(())
    }

    fn delete_range(&mut self, range: SourceRange) -> Result<()> {
        let (start, end) = self.char_span(range)?;
        self.rope.remove(start..end);
        self.dirty = true;
        Ok(())
    }
}
