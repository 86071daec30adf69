//! Markdown heading structure and the line ranges each heading owns.
//!
//! A heading is a line opening with one to six `#` characters, whitespace, and
//! some non-blank text. A heading owns every line up to the next heading of
//! the same or a shallower level. Lines are split on `\n`, so a trailing
//! newline contributes a final empty line.
//!
//! Fenced code blocks are not special-cased: a `#` line inside a fence is
//! treated as a heading.

use serde::Serialize;

/// A heading and the one-based, inclusive line range it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Depth, from 1 to 6.
    pub level: usize,
    /// Heading text with surrounding whitespace removed.
    pub text: String,
    /// Line holding the heading.
    pub line: usize,
    /// Last line of owned content.
    pub end_line: usize,
}

/// Zero-based line indices of a located section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpan {
    /// Index of the heading line.
    pub heading_line: usize,
    /// Index one past the last owned line.
    pub end: usize,
    /// Depth of the heading.
    pub level: usize,
}

impl SectionSpan {
    /// Index of the first body line.
    #[must_use]
    pub const fn body_start(&self) -> usize {
        self.heading_line + 1
    }
}

/// A section body replaced in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionReplacement {
    /// Full document text after the replacement.
    pub content: String,
    /// Index of the first line written in place of the old body.
    pub body_start: usize,
    /// Number of lines written.
    pub inserted_lines: usize,
    /// Number of lines the old body occupied.
    pub replaced_lines: usize,
}

/// One part of a document partitioned by heading level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSection {
    /// Heading text, or empty for the preamble before the first heading.
    pub title: String,
    /// Lines following the heading, joined with `\n`.
    pub body: String,
}

/// Parses `line` as a heading, returning its level and trimmed text.
#[must_use]
pub fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|byte| *byte == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = line.get(level..)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim();
    (!text.is_empty()).then_some((level, text))
}

/// Lists every heading with the range of lines it owns.
#[must_use]
pub fn extract_headings(text: &str) -> Vec<Heading> {
    let lines: Vec<&str> = text.split('\n').collect();
    let total_lines = lines.len();

    let mut headings: Vec<Heading> = lines
        .iter()
        .enumerate()
        .filter_map(|(index, line)| {
            parse_heading(line).map(|(level, heading_text)| Heading {
                level,
                text: heading_text.to_owned(),
                line: index + 1,
                end_line: total_lines,
            })
        })
        .collect();

    let starts: Vec<(usize, usize)> = headings.iter().map(|h| (h.level, h.line)).collect();
    for (position, heading) in headings.iter_mut().enumerate() {
        if let Some((_, next_line)) = starts
            .iter()
            .skip(position + 1)
            .find(|(level, _)| *level <= heading.level)
        {
            heading.end_line = next_line - 1;
        }
    }

    headings
}

/// Case-insensitive comparison of heading text.
fn same_heading(candidate: &str, wanted: &str) -> bool {
    candidate == wanted || candidate.to_lowercase() == wanted.to_lowercase()
}

/// Finds the first section titled `heading` within `lines`.
#[must_use]
pub fn locate_in_lines(lines: &[&str], heading: &str) -> Option<SectionSpan> {
    let mut found: Option<(usize, usize)> = None;

    for (index, line) in lines.iter().enumerate() {
        let Some((level, text)) = parse_heading(line) else {
            continue;
        };
        match found {
            None if same_heading(text, heading) => found = Some((index, level)),
            Some((heading_line, section_level)) if level <= section_level => {
                log_if_duplicated(lines, index, heading);
                return Some(SectionSpan {
                    heading_line,
                    end: index,
                    level: section_level,
                });
            }
            _ => {}
        }
    }

    found.map(|(heading_line, level)| SectionSpan {
        heading_line,
        end: lines.len(),
        level,
    })
}

fn log_if_duplicated(lines: &[&str], from: usize, heading: &str) {
    let duplicated = lines
        .iter()
        .skip(from)
        .filter_map(|line| parse_heading(line))
        .any(|(_, text)| same_heading(text, heading));
    if duplicated {
        tracing::debug!(
            target: "quire_vault::sections",
            heading,
            "heading occurs more than once; using the first occurrence"
        );
    }
}

/// Finds the first section titled `heading`.
#[must_use]
pub fn locate_section(text: &str, heading: &str) -> Option<SectionSpan> {
    let lines: Vec<&str> = text.split('\n').collect();
    locate_in_lines(&lines, heading)
}

/// Returns the trimmed body of the first section titled `heading`.
///
/// A heading with nothing beneath it yields an empty string.
#[must_use]
pub fn extract_section(text: &str, heading: &str) -> Option<String> {
    let lines: Vec<&str> = text.split('\n').collect();
    let span = locate_in_lines(&lines, heading)?;
    let body = lines.get(span.body_start()..span.end).unwrap_or_default();
    Some(body.join("\n").trim().to_owned())
}

/// Replaces the body of the first section titled `heading`.
///
/// The heading line and everything after the section are kept. The new body
/// is framed by one blank line on either side, with trailing newlines of
/// `body` dropped.
#[must_use]
pub fn replace_section_body(text: &str, heading: &str, body: &str) -> Option<SectionReplacement> {
    let lines: Vec<&str> = text.split('\n').collect();
    let span = locate_in_lines(&lines, heading)?;

    let framed = format!("\n{}\n", body.trim_end_matches('\n'));
    let inserted: Vec<&str> = framed.split('\n').collect();

    let head = lines.get(..span.body_start()).unwrap_or_default();
    let tail = lines.get(span.end..).unwrap_or_default();
    let content = head
        .iter()
        .chain(inserted.iter())
        .chain(tail.iter())
        .copied()
        .collect::<Vec<&str>>()
        .join("\n");

    Some(SectionReplacement {
        content,
        body_start: span.body_start(),
        inserted_lines: inserted.len(),
        replaced_lines: span.end - span.body_start(),
    })
}

/// Removes the first section titled `heading`, nested sub-sections included.
///
/// The remaining text is trimmed.
#[must_use]
pub fn remove_section(text: &str, heading: &str) -> Option<String> {
    let lines: Vec<&str> = text.split('\n').collect();
    let span = locate_in_lines(&lines, heading)?;
    let kept: Vec<&str> = lines
        .iter()
        .enumerate()
        .filter(|(index, _)| !(span.heading_line..span.end).contains(index))
        .map(|(_, line)| *line)
        .collect();
    Some(kept.join("\n").trim().to_owned())
}

/// Partitions a document at every heading of exactly `level`.
///
/// Headings are recognised by [`parse_heading`], so any whitespace after the
/// `#` run counts, as in [`extract_headings`]. Text before the first such
/// heading is returned with an empty title when it is not empty. Deeper
/// headings stay inside the section that contains them.
#[must_use]
pub fn split_by_level(text: &str, level: usize) -> Vec<SplitSection> {
    let mut sections = Vec::new();
    let mut title = String::new();
    let mut body: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        match parse_heading(line) {
            Some((found, heading)) if found == level => {
                if !title.is_empty() || !body.is_empty() {
                    sections.push(SplitSection {
                        title: std::mem::take(&mut title),
                        body: body.join("\n"),
                    });
                }
                heading.clone_into(&mut title);
                body.clear();
            }
            _ => body.push(line),
        }
    }

    if !title.is_empty() || !body.is_empty() {
        sections.push(SplitSection {
            title,
            body: body.join("\n"),
        });
    }

    sections
}

/// Turns a heading into a file stem that is safe on common filesystems.
#[must_use]
pub fn sanitize_file_stem(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter_map(|ch| match ch {
            '/' | '\\' | ':' => Some('-'),
            '*' | '?' | '"' | '<' | '>' | '|' => None,
            other => Some(other),
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "untitled".to_owned()
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const OUTLINE: &str = "# A\n\n## B\n\nx\n\n## C\n";

    fn heading(level: usize, text: &str, line: usize, end_line: usize) -> Heading {
        Heading {
            level,
            text: text.to_owned(),
            line,
            end_line,
        }
    }

    #[rstest]
    #[case::simple("## Tasks", Some((2, "Tasks")))]
    #[case::padded("#   Spaced out   ", Some((1, "Spaced out")))]
    #[case::deepest("###### Six", Some((6, "Six")))]
    #[case::too_deep("####### Seven", None)]
    #[case::no_space("#hashtag", None)]
    #[case::blank_text("##   ", None)]
    #[case::not_at_start(" # Indented", None)]
    #[case::carriage_return("## Windows\r", Some((2, "Windows")))]
    fn parses_heading_lines(#[case] line: &str, #[case] expected: Option<(usize, &str)>) {
        assert_eq!(parse_heading(line), expected);
    }

    #[rstest]
    fn outline_end_lines_stop_before_sibling_headings() {
        assert_eq!(
            extract_headings(OUTLINE),
            vec![
                heading(1, "A", 1, 8),
                heading(2, "B", 3, 6),
                heading(2, "C", 7, 8),
            ]
        );
    }

    #[rstest]
    fn deeper_headings_do_not_end_a_section() {
        let text = "# Top\n## Child\n### Grandchild\n## Sibling\n# Next";
        let headings = extract_headings(text);
        let ends: Vec<usize> = headings.iter().map(|h| h.end_line).collect();
        assert_eq!(ends, vec![4, 3, 3, 4, 5]);
    }

    #[rstest]
    #[case::body("B", Some("x"))]
    #[case::case_insensitive("b", Some("x"))]
    #[case::empty_body("C", Some(""))]
    #[case::missing("D", None)]
    fn extracts_section_bodies(#[case] wanted: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_section(OUTLINE, wanted).as_deref(), expected);
    }

    #[rstest]
    fn first_duplicate_heading_wins() {
        let text = "## Log\nfirst\n## Log\nsecond";
        assert_eq!(extract_section(text, "Log").as_deref(), Some("first"));
    }

    #[rstest]
    fn fenced_headings_are_still_headings() {
        let text = "# Doc\n```\n# not really\n```\n";
        let texts: Vec<String> = extract_headings(text).into_iter().map(|h| h.text).collect();
        assert_eq!(texts, vec!["Doc".to_owned(), "not really".to_owned()]);
    }

    #[rstest]
    fn replaces_body_between_blank_lines() {
        let text = "# T\n## Tasks\nold one\nold two\n## Done\nkeep";
        let replaced = replace_section_body(text, "tasks", "new\n\n").expect("section exists");
        assert_eq!(replaced.content, "# T\n## Tasks\n\nnew\n\n## Done\nkeep");
        assert_eq!(replaced.body_start, 2);
        assert_eq!(replaced.inserted_lines, 3);
        assert_eq!(replaced.replaced_lines, 2);
    }

    #[rstest]
    fn replacing_the_last_section_keeps_the_heading() {
        let replaced = replace_section_body("## Only", "Only", "body").expect("section exists");
        assert_eq!(replaced.content, "## Only\n\nbody\n");
    }

    #[rstest]
    fn removes_nested_sections() {
        let text = "# Doc\nintro\n## Cut\nbody\n### Nested\ndeep\n## Keep\nstays\n";
        assert_eq!(
            remove_section(text, "Cut").as_deref(),
            Some("# Doc\nintro\n## Keep\nstays")
        );
    }

    #[rstest]
    fn splits_at_exact_level() {
        let text = "preamble\n## One\nfirst\n### Deeper\nstill one\n## Two\nsecond";
        let sections = split_by_level(text, 2);
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["", "One", "Two"]);
        assert_eq!(
            sections.get(1).map(|s| s.body.as_str()),
            Some("first\n### Deeper\nstill one")
        );
    }

    #[rstest]
    fn split_agrees_with_the_outline_on_whitespace() {
        let text = "##\tTabbed\na\n## Spaced\nb";
        let outline: Vec<String> = extract_headings(text).into_iter().map(|h| h.text).collect();
        let titles: Vec<String> = split_by_level(text, 2).into_iter().map(|s| s.title).collect();
        assert_eq!(titles, outline);
        assert_eq!(titles, vec!["Tabbed".to_owned(), "Spaced".to_owned()]);
    }

    #[rstest]
    fn split_without_preamble_starts_at_first_heading() {
        let sections = split_by_level("## One\na\n## Two\nb", 2);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections.first().map(|s| s.title.as_str()), Some("One"));
    }

    #[rstest]
    #[case::separators("a/b\\c:d", "a-b-c-d")]
    #[case::dropped("What? <yes> \"no\" | *", "What yes no")]
    #[case::blank("  ?*  ", "untitled")]
    #[case::unicode("Café notes", "Café notes")]
    fn sanitises_file_stems(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(sanitize_file_stem(title), expected);
    }
}
