use crate::error::SyncError;
use crate::text::normalize_block_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Bold,
    Highlight,
}

impl Marker {
    pub const ALL: [Marker; 2] = [Marker::Bold, Marker::Highlight];

    pub fn token(self) -> &'static str {
        match self {
            Marker::Bold => "**",
            Marker::Highlight => "==",
        }
    }
}

/// A candidate source range. `char_start..char_end` is the byte range of the
/// selected text itself within `line`, excluding any wrapping marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub line: usize,
    pub char_start: usize,
    pub char_end: usize,
    pub wrap_marker: Option<Marker>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveHint {
    pub line: Option<usize>,
    pub block_text: Option<String>,
    pub ordinal: Option<usize>,
}

/// Every occurrence of `text` in document order.
pub fn enumerate(source_lines: &[String], text: &str) -> Vec<Occurrence> {
    let mut out = Vec::new();
    if text.is_empty() {
        return out;
    }
    for (line_idx, line) in source_lines.iter().enumerate() {
        for (start, _) in line.match_indices(text) {
            let end = start + text.len();
            out.push(Occurrence {
                line: line_idx,
                char_start: start,
                char_end: end,
                wrap_marker: wrapping_marker(line, start, end),
            });
        }
    }
    out
}

/// The toggle marker found in the two characters on both sides of `start..end`.
fn wrapping_marker(line: &str, start: usize, end: usize) -> Option<Marker> {
    let before = line.get(start.checked_sub(2)?..start)?;
    let after = line.get(end..end + 2)?;
    Marker::ALL
        .into_iter()
        .find(|m| before == m.token() && after == m.token())
}

pub fn resolve(
    source_lines: &[String],
    selected_text: &str,
    hint: &ResolveHint,
) -> Result<Occurrence, SyncError> {
    let not_found = || SyncError::OccurrenceNotFound {
        text: selected_text.to_string(),
    };
    if selected_text.trim().is_empty() {
        return Err(not_found());
    }
    let candidates = enumerate(source_lines, selected_text);
    if candidates.is_empty() {
        return Err(not_found());
    }
    if candidates.len() == 1 {
        return Ok(candidates[0]);
    }

    if let Some(block_text) = hint.block_text.as_deref() {
        let block = normalize_block_text(block_text);
        if !block.is_empty() {
            let in_block: Vec<&Occurrence> = candidates
                .iter()
                .filter(|occ| {
                    let line = normalize_block_text(&source_lines[occ.line]);
                    !line.is_empty() && (block.contains(&line) || line.contains(&block))
                })
                .collect();
            if let [only] = in_block.as_slice() {
                return Ok(**only);
            }
        }
    }

    if let Some(line) = hint.line {
        let on_line: Vec<&Occurrence> = candidates.iter().filter(|occ| occ.line == line).collect();
        if let [only] = on_line.as_slice() {
            return Ok(**only);
        }
    }

    let ordinal = hint.ordinal.unwrap_or(0).min(candidates.len() - 1);
    Ok(candidates[ordinal])
}
