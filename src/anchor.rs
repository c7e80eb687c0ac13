use crate::render::BlockKind;
use crate::text::{
    char_len, has_column_separator, is_fence, is_math_delimiter, normalize_block_text,
    opens_multiline_math,
};

/// What the mapper needs to know about a rendered block.
pub trait AnchorBlock {
    fn kind(&self) -> BlockKind;
    fn text_content(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSource {
    Matched,
    Interpolated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub line: usize,
    pub source: AnchorSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorSettings {
    pub lookahead: usize,
    pub min_score: usize,
}

impl Default for AnchorSettings {
    fn default() -> Self {
        Self {
            lookahead: 20,
            min_score: 3,
        }
    }
}

const EXACT_SCORE: usize = 100;
const MIN_TEXT_LEN: usize = 2;

/// Anchors indexed by block. `None` marks a block that was filtered out as too
/// short to place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorTable {
    anchors: Vec<Option<Anchor>>,
}

impl AnchorTable {
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.iter().all(Option::is_none)
    }

    pub fn get(&self, block: usize) -> Option<Anchor> {
        self.anchors.get(block).copied().flatten()
    }

    pub fn line_for_block(&self, block: usize) -> Option<usize> {
        self.get(block).map(|a| a.line)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Anchor)> + '_ {
        self.anchors
            .iter()
            .enumerate()
            .filter_map(|(idx, a)| a.map(|a| (idx, a)))
    }
}

pub fn build_anchors<B: AnchorBlock>(
    source_lines: &[String],
    blocks: &[B],
    settings: &AnchorSettings,
) -> AnchorTable {
    let normalized_lines: Vec<String> = source_lines
        .iter()
        .map(|l| normalize_block_text(l))
        .collect();
    let mut used = vec![false; source_lines.len()];
    let mut anchors: Vec<Option<Anchor>> = vec![None; blocks.len()];
    let mut eligible = vec![false; blocks.len()];
    let mut cursor = 0usize;

    for (idx, block) in blocks.iter().enumerate() {
        let text = normalize_block_text(block.text_content());
        if char_len(&text) < MIN_TEXT_LEN {
            continue;
        }
        let kind = block.kind();
        eligible[idx] = true;

        let found = match kind {
            BlockKind::CodeBlock => first_unused(source_lines, &used, cursor, is_fence),
            BlockKind::MathBlock => first_unused(source_lines, &used, cursor, is_math_delimiter),
            BlockKind::Table => first_unused(source_lines, &used, cursor, has_column_separator),
            _ => best_text_match(&text, &normalized_lines, &used, cursor, settings),
        };

        let Some(line) = found else {
            continue;
        };
        used[line] = true;
        anchors[idx] = Some(Anchor {
            line,
            source: AnchorSource::Matched,
        });
        cursor = line + 1;

        let closing = match kind {
            BlockKind::CodeBlock => first_unused(source_lines, &used, cursor, is_fence),
            BlockKind::MathBlock if opens_multiline_math(&source_lines[line]) => {
                first_unused(source_lines, &used, cursor, |l| l.trim_end().ends_with("$$"))
            }
            _ => None,
        };
        if let Some(close) = closing {
            for slot in used.iter_mut().take(close + 1).skip(line + 1) {
                *slot = true;
            }
            cursor = close + 1;
        }
    }

    interpolate_missing(&mut anchors, &eligible, &used);
    AnchorTable { anchors }
}

fn first_unused(
    lines: &[String],
    used: &[bool],
    from: usize,
    pred: impl Fn(&str) -> bool,
) -> Option<usize> {
    (from..lines.len()).find(|&i| !used[i] && pred(lines[i].as_str()))
}

fn best_text_match(
    text: &str,
    normalized_lines: &[String],
    used: &[bool],
    cursor: usize,
    settings: &AnchorSettings,
) -> Option<usize> {
    let end = cursor.saturating_add(settings.lookahead).min(normalized_lines.len());
    let mut best: Option<(usize, usize)> = None;
    for idx in cursor..end {
        if used[idx] {
            continue;
        }
        let score = match_score(text, &normalized_lines[idx]);
        if score < settings.min_score {
            continue;
        }
        let replace = match best {
            Some((_, best_score)) => score > best_score,
            None => true,
        };
        if replace {
            best = Some((idx, score));
        }
        if score == EXACT_SCORE {
            break;
        }
    }
    best.map(|(idx, _)| idx)
}

fn match_score(block: &str, line: &str) -> usize {
    if line.is_empty() {
        return 0;
    }
    if block == line {
        return EXACT_SCORE;
    }
    if block.contains(line) {
        return char_len(line);
    }
    if line.contains(block) {
        return char_len(block);
    }
    0
}

/// Give every eligible block without a match a line spread evenly across the
/// unused lines between its anchored neighbours.
fn interpolate_missing(anchors: &mut [Option<Anchor>], eligible: &[bool], used: &[bool]) {
    if used.is_empty() {
        return;
    }
    let mut idx = 0usize;
    while idx < anchors.len() {
        if !eligible[idx] || anchors[idx].is_some() {
            idx += 1;
            continue;
        }
        let run_start = idx;
        let mut run = Vec::new();
        while idx < anchors.len() && (anchors[idx].is_none() || !eligible[idx]) {
            if eligible[idx] {
                run.push(idx);
            }
            idx += 1;
        }
        let prev = anchors[..run_start].iter().rev().flatten().next().map(|a| a.line);
        let next = anchors.get(idx).copied().flatten().map(|a| a.line);

        let lower = prev.map(|l| l + 1).unwrap_or(0);
        let upper = next.unwrap_or(used.len());
        let gap: Vec<usize> = (lower..upper.max(lower)).filter(|&l| !used[l]).collect();

        for (k, &block) in run.iter().enumerate() {
            let line = if gap.is_empty() {
                // No free line left: share the neighbour's line, the one place
                // a line carries more than one anchor.
                prev.or(next).unwrap_or(0)
            } else {
                gap[k * gap.len() / run.len()]
            };
            anchors[block] = Some(Anchor {
                line,
                source: AnchorSource::Interpolated,
            });
        }
    }
}
