/// Normalize a source line or rendered block text for anchoring.
///
/// Strips block prefixes (headers, blockquotes, list markers), inline markers
/// (`**`, `__`, `*`, `_`, `==`, `::`, `~~`, backticks, inline HTML tags),
/// keeps link labels, collapses whitespace and case-folds.
pub fn normalize_block_text(line: &str) -> String {
    let trimmed = line.trim_end_matches(['\n', '\r']);
    let stripped = strip_line_prefix(trimmed);
    let inline = strip_inline_markdown(&stripped);
    normalize_whitespace_case(&inline)
}

/// Collapse whitespace runs to a single space, trim, and lowercase.
pub fn normalize_whitespace_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out.to_lowercase()
}

pub fn is_fence(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("```") || t.starts_with("~~~")
}

pub fn is_math_delimiter(line: &str) -> bool {
    let t = line.trim();
    t == "$$" || t.starts_with("$$")
}

/// True when the delimiter line opens a math block that closes on a later line.
pub fn opens_multiline_math(line: &str) -> bool {
    let t = line.trim();
    if t == "$$" {
        return true;
    }
    match t.strip_prefix("$$") {
        Some(rest) => !rest.trim_end().ends_with("$$"),
        None => false,
    }
}

pub fn has_column_separator(line: &str) -> bool {
    line.contains('|')
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn strip_line_prefix(line: &str) -> String {
    let mut s = line.trim_start();
    if is_fence(s) {
        return String::new();
    }

    loop {
        let t = s.trim_start();
        if let Some(rest) = t.strip_prefix('>') {
            s = rest.trim_start();
            continue;
        }
        break;
    }

    let mut hash_count = 0usize;
    let mut hash_end = 0usize;
    for (idx, ch) in s.char_indices() {
        if ch == '#' {
            hash_count += 1;
            hash_end = idx + ch.len_utf8();
        } else {
            break;
        }
    }
    if hash_count > 0 && hash_count <= 6 {
        let rest = &s[hash_end..];
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            let rest = rest.trim();
            return rest.trim_end_matches('#').trim_end().to_string();
        }
    }

    if let Some(rest) = strip_list_marker(s) {
        return rest.to_string();
    }

    s.to_string()
}

fn strip_list_marker(s: &str) -> Option<&str> {
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = s.strip_prefix(marker) {
            return Some(rest);
        }
    }

    let mut end_digits = 0usize;
    for (idx, ch) in s.char_indices() {
        if ch.is_ascii_digit() {
            end_digits = idx + ch.len_utf8();
        } else {
            break;
        }
    }
    if end_digits > 0 {
        let rest = &s[end_digits..];
        if let Some(r) = rest.strip_prefix(". ") {
            return Some(r);
        }
        if let Some(r) = rest.strip_prefix(") ") {
            return Some(r);
        }
    }
    None
}

fn strip_inline_markdown(line: &str) -> String {
    let mut out = String::new();
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '`' | '*' | '_' | '~' => {}
            '=' | ':' if chars.peek() == Some(&ch) => {
                chars.next();
            }
            '<' if chars
                .peek()
                .is_some_and(|c| c.is_ascii_alphabetic() || *c == '/') =>
            {
                for next in chars.by_ref() {
                    if next == '>' {
                        break;
                    }
                }
            }
            '[' => {
                let mut label = String::new();
                for next in chars.by_ref() {
                    if next == ']' {
                        break;
                    }
                    label.push(next);
                }
                out.push_str(&label);
                skip_link_target(&mut chars);
            }
            '!' if chars.peek() == Some(&'[') => {
                chars.next();
                let mut alt = String::new();
                for next in chars.by_ref() {
                    if next == ']' {
                        break;
                    }
                    alt.push(next);
                }
                out.push_str(&alt);
                skip_link_target(&mut chars);
            }
            _ => out.push(ch),
        }
    }
    out
}

fn skip_link_target(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    if let Some('(') = chars.peek().copied() {
        chars.next();
        for next in chars.by_ref() {
            if next == ')' {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_heading_and_highlight_markers() {
        assert_eq!(normalize_block_text("## Some **bold** ==text=="), "some bold text");
        assert_eq!(normalize_block_text("# Title #"), "title");
    }

    #[test]
    fn hashtag_is_not_a_heading() {
        assert_eq!(normalize_block_text("#tag here"), "#tag here");
    }

    #[test]
    fn strips_list_and_quote_prefixes() {
        assert_eq!(normalize_block_text("  - item  one"), "item one");
        assert_eq!(normalize_block_text("12. twelfth"), "twelfth");
        assert_eq!(normalize_block_text("> > quoted *text*"), "quoted text");
    }

    #[test]
    fn keeps_link_labels_and_drops_targets() {
        assert_eq!(
            normalize_block_text("see [the docs](https://example.com) and ![logo](a.png)"),
            "see the docs and logo"
        );
    }

    #[test]
    fn drops_inline_html_tags() {
        assert_eq!(
            normalize_block_text(r#"a <mark style="background:#ff6b6b">red</mark> word"#),
            "a red word"
        );
    }

    #[test]
    fn single_equals_and_colon_survive() {
        assert_eq!(normalize_block_text("x = 1: done"), "x = 1: done");
        assert_eq!(normalize_block_text("::red:: and ==yellow=="), "red and yellow");
    }

    #[test]
    fn fence_lines_normalize_to_empty() {
        assert_eq!(normalize_block_text("```rust"), "");
        assert!(is_fence("   ~~~"));
    }

    #[test]
    fn math_delimiters() {
        assert!(is_math_delimiter("$$"));
        assert!(is_math_delimiter("  $$x^2$$"));
        assert!(!is_math_delimiter("$x$"));
        assert!(opens_multiline_math("$$"));
        assert!(opens_multiline_math("$$ a + b"));
        assert!(!opens_multiline_math("$$a + b$$"));
    }
}
