//! Numbered context snippets shown after a successful mutation.
//!
//! Previews are rendered from the content that was written and never feed
//! back into the mutation itself.

/// Characters kept per rendered line.
pub const MAX_LINE_CHARS: usize = 200;

/// Lines shown from each end of a long edited span.
const EDGE_LINES: usize = 2;

/// How the first edited line is tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Existing text was replaced.
    Changed,
    /// New lines were added without replacing any.
    Inserted,
}

impl Marker {
    const fn label(self) -> &'static str {
        match self {
            Self::Changed => "CHANGED",
            Self::Inserted => "INSERTED",
        }
    }
}

/// Shortens `line` to `max_chars` characters, noting the original length.
#[must_use]
pub fn truncate_line(line: &str, max_chars: usize) -> String {
    let total = line.chars().count();
    if total <= max_chars {
        return line.to_owned();
    }
    let kept: String = line.chars().take(max_chars).collect();
    format!("{kept}... [{total} chars total]")
}

/// Renders `context` lines either side of the edited span `start..end`.
///
/// `lines` is the document after the edit and `edited` holds the lines that
/// were written into the span. Spans longer than five lines show the first
/// two and last two lines around an elision marker. Returns an empty string
/// when `context` is zero.
#[must_use]
pub fn render_context(
    lines: &[&str],
    start: usize,
    end: usize,
    context: usize,
    edited: &[&str],
    marker: Marker,
) -> String {
    if context == 0 {
        return String::new();
    }

    let mut out = String::new();
    for number in start.saturating_sub(context)..start {
        push_line(&mut out, lines, number, "");
    }

    if edited.is_empty() {
        for number in start..end.min(lines.len()) {
            push_line(&mut out, lines, number, "");
        }
    } else {
        write_edited(&mut out, edited, start, marker);
    }

    for number in end..end.saturating_add(context).min(lines.len()) {
        push_line(&mut out, lines, number, "");
    }
    out
}

fn push_line(out: &mut String, lines: &[&str], index: usize, suffix: &str) {
    if let Some(line) = lines.get(index) {
        write_numbered(out, index, line, suffix);
    }
}

fn write_numbered(out: &mut String, index: usize, line: &str, suffix: &str) {
    out.push_str(&format!(
        "L{}: {}{suffix}\n",
        index + 1,
        truncate_line(line, MAX_LINE_CHARS)
    ));
}

fn write_edited(out: &mut String, edited: &[&str], start: usize, marker: Marker) {
    let tag = format!("  ← {}", marker.label());
    let suffix_for = |offset: usize| if offset == 0 { tag.as_str() } else { "" };

    if edited.len() <= EDGE_LINES * 2 + 1 {
        for (offset, line) in edited.iter().enumerate() {
            write_numbered(out, start + offset, line, suffix_for(offset));
        }
        return;
    }

    for (offset, line) in edited.iter().enumerate().take(EDGE_LINES) {
        write_numbered(out, start + offset, line, suffix_for(offset));
    }
    out.push_str(&format!(
        "     [... {} more lines ...]\n",
        edited.len() - EDGE_LINES * 2
    ));
    let tail_from = edited.len() - EDGE_LINES;
    for (offset, line) in edited.iter().enumerate().skip(tail_from) {
        write_numbered(out, start + offset, line, "");
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::short("hello", 10, "hello")]
    #[case::exact("hello", 5, "hello")]
    #[case::long("hello world", 5, "hello... [11 chars total]")]
    #[case::multibyte("ééééé", 2, "éé... [5 chars total]")]
    fn truncates_by_characters(#[case] line: &str, #[case] max: usize, #[case] expected: &str) {
        assert_eq!(truncate_line(line, max), expected);
    }

    #[rstest]
    fn zero_context_renders_nothing() {
        assert_eq!(render_context(&["a"], 0, 1, 0, &["a"], Marker::Changed), "");
    }

    #[rstest]
    fn short_edits_are_shown_in_full() {
        let lines = ["one", "two", "TWO", "three", "four"];
        let rendered = render_context(&lines, 1, 3, 1, &["two", "TWO"], Marker::Changed);
        assert_eq!(
            rendered,
            "L1: one\nL2: two  ← CHANGED\nL3: TWO\nL4: three\n"
        );
    }

    #[rstest]
    fn long_edits_are_elided() {
        let edited = ["a", "b", "c", "d", "e", "f", "g"];
        let mut lines = vec!["before"];
        lines.extend(edited);
        lines.push("after");

        let rendered = render_context(&lines, 1, 8, 1, &edited, Marker::Inserted);
        assert_eq!(
            rendered,
            "L1: before\nL2: a  ← INSERTED\nL3: b\n     [... 3 more lines ...]\nL7: f\nL8: g\nL9: after\n"
        );
    }

    #[rstest]
    fn context_is_clamped_to_the_document() {
        let lines = ["only"];
        let rendered = render_context(&lines, 0, 1, 5, &["only"], Marker::Changed);
        assert_eq!(rendered, "L1: only  ← CHANGED\n");
    }
}
