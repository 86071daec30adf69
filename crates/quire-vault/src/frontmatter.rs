//! Line-level edits to a document's YAML frontmatter block.
//!
//! The block opens with a `---` line at the very start of the document and
//! closes at the next `---` line. Only top-level keys are addressed. A key is
//! matched case-insensitively, written in lowercase, and owns its own line
//! plus every following indented or `- ` item line, so replacing or removing
//! a list never leaves orphaned items behind.
//!
//! Values are written verbatim; no YAML quoting is applied.

const FENCE: &str = "---";

/// A parsed frontmatter block and the body that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Frontmatter<'a> {
    lines: Vec<String>,
    body: &'a str,
}

impl<'a> Frontmatter<'a> {
    fn parse(content: &'a str) -> Option<Self> {
        let after_open = content.strip_prefix("---\n")?;
        let mut consumed = 0;
        let mut lines = Vec::new();
        for line in after_open.split('\n') {
            consumed += line.len() + 1;
            if line.trim_end() == FENCE {
                let body = after_open.get(consumed..).unwrap_or_default();
                return Some(Self { lines, body });
            }
            lines.push(line.to_owned());
        }
        None
    }

    fn render(&self) -> String {
        format!("{FENCE}\n{}\n{FENCE}\n{}", self.lines.join("\n"), self.body)
    }

    /// Half-open range of lines owned by `key`.
    fn key_range(&self, key: &str) -> Option<(usize, usize)> {
        let start = self
            .lines
            .iter()
            .position(|line| key_of(line).is_some_and(|found| found.eq_ignore_ascii_case(key)))?;
        let end = self
            .lines
            .iter()
            .skip(start + 1)
            .position(|line| !is_continuation(line))
            .map_or(self.lines.len(), |offset| start + 1 + offset);
        Some((start, end))
    }

    fn replace_range(&mut self, start: usize, end: usize, replacement: Vec<String>) {
        let tail = self.lines.split_off(end);
        self.lines.truncate(start);
        self.lines.extend(replacement);
        self.lines.extend(tail);
    }
}

fn key_of(line: &str) -> Option<&str> {
    if line.starts_with(char::is_whitespace) || line.starts_with('-') || line.starts_with('#') {
        return None;
    }
    line.split_once(':').map(|(key, _)| key.trim_end())
}

fn is_continuation(line: &str) -> bool {
    line.starts_with(char::is_whitespace) || line.starts_with("- ") || line == "-"
}

/// Values held by a key's lines: inline `[a, b]`, a scalar, or `- ` items.
fn list_values(owned: &[String]) -> Vec<String> {
    let mut values = Vec::new();
    let mut lines = owned.iter();
    if let Some(inline) = lines
        .next()
        .and_then(|line| line.split_once(':'))
        .map(|(_, rest)| rest.trim())
    {
        match inline.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            Some(items) => values.extend(
                items
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_owned),
            ),
            None if !inline.is_empty() => values.push(inline.to_owned()),
            None => {}
        }
    }
    values.extend(
        lines
            .filter_map(|line| line.trim_start().strip_prefix('-'))
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned),
    );
    values
}

/// Sets `key` to `value`, creating the block when the document has none.
#[must_use]
pub fn set_key(content: &str, key: &str, value: &str) -> String {
    let name = key.trim().to_lowercase();
    let entry = format!("{name}: {value}");
    let Some(mut frontmatter) = Frontmatter::parse(content) else {
        return format!("{FENCE}\n{entry}\n{FENCE}\n\n{content}");
    };
    match frontmatter.key_range(&name) {
        Some((start, end)) => frontmatter.replace_range(start, end, vec![entry]),
        None => frontmatter.lines.push(entry),
    }
    frontmatter.render()
}

/// Removes `key`, returning `None` when it is absent.
///
/// A block left without content is dropped along with one blank line after
/// it.
#[must_use]
pub fn remove_key(content: &str, key: &str) -> Option<String> {
    let name = key.trim().to_lowercase();
    let mut frontmatter = Frontmatter::parse(content)?;
    let (start, end) = frontmatter.key_range(&name)?;
    frontmatter.replace_range(start, end, Vec::new());
    if frontmatter.lines.iter().all(|line| line.trim().is_empty()) {
        let body = frontmatter.body;
        return Some(body.strip_prefix('\n').unwrap_or(body).to_owned());
    }
    Some(frontmatter.render())
}

/// Adds `value` to the list under `key`, returning `None` when it is
/// already present.
///
/// Inline lists and scalar values are rewritten as block lists.
#[must_use]
pub fn add_to_list(content: &str, key: &str, value: &str) -> Option<String> {
    let name = key.trim().to_lowercase();
    let Some(mut frontmatter) = Frontmatter::parse(content) else {
        return Some(format!("{FENCE}\n{name}:\n  - {value}\n{FENCE}\n\n{content}"));
    };

    let (start, end) = frontmatter
        .key_range(&name)
        .unwrap_or((frontmatter.lines.len(), frontmatter.lines.len()));
    let mut values = frontmatter
        .lines
        .get(start..end)
        .map(list_values)
        .unwrap_or_default();
    if values.iter().any(|existing| existing == value) {
        return None;
    }
    values.push(value.to_owned());

    let replacement = std::iter::once(format!("{name}:"))
        .chain(values.iter().map(|item| format!("  - {item}")))
        .collect();
    frontmatter.replace_range(start, end, replacement);
    Some(frontmatter.render())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::created("Body", "---\nstatus: done\n---\n\nBody")]
    #[case::appended("---\ntitle: T\n---\nBody", "---\ntitle: T\nstatus: done\n---\nBody")]
    #[case::replaced("---\nStatus: open\n---\nBody", "---\nstatus: done\n---\nBody")]
    #[case::list_replaced(
        "---\nstatus:\n  - a\n  - b\ntitle: T\n---\nBody",
        "---\nstatus: done\ntitle: T\n---\nBody"
    )]
    #[case::unclosed_block_is_body(
        "---\ntitle: T\nBody",
        "---\nstatus: done\n---\n\n---\ntitle: T\nBody"
    )]
    fn sets_keys(#[case] content: &str, #[case] expected: &str) {
        assert_eq!(set_key(content, "Status", "done"), expected);
    }

    #[rstest]
    #[case::other_keys_kept("---\na: 1\nb: 2\n---\nBody", Some("---\nb: 2\n---\nBody"))]
    #[case::last_key_drops_block("---\na: 1\n---\n\nBody", Some("Body"))]
    #[case::list_items_removed("---\na:\n  - x\n- y\nb: 2\n---\n", Some("---\nb: 2\n---\n"))]
    #[case::absent_key("---\nb: 2\n---\nBody", None)]
    #[case::no_block("Body", None)]
    fn removes_keys(#[case] content: &str, #[case] expected: Option<&str>) {
        assert_eq!(remove_key(content, "A").as_deref(), expected);
    }

    #[rstest]
    #[case::created("Body", Some("---\ntags:\n  - new\n---\n\nBody"))]
    #[case::missing_key("---\ntitle: T\n---\n", Some("---\ntitle: T\ntags:\n  - new\n---\n"))]
    #[case::block_list(
        "---\ntags:\n  - a\ntitle: T\n---\n",
        Some("---\ntags:\n  - a\n  - new\ntitle: T\n---\n")
    )]
    #[case::inline_list(
        "---\ntags: [a, b]\n---\n",
        Some("---\ntags:\n  - a\n  - b\n  - new\n---\n")
    )]
    #[case::scalar("---\ntags: a\n---\n", Some("---\ntags:\n  - a\n  - new\n---\n"))]
    #[case::duplicate("---\ntags:\n  - new\n---\n", None)]
    fn adds_list_values(#[case] content: &str, #[case] expected: Option<&str>) {
        assert_eq!(add_to_list(content, "tags", "new").as_deref(), expected);
    }

    #[rstest]
    fn nested_keys_are_not_top_level() {
        let content = "---\nmeta:\n  status: open\n---\n";
        assert_eq!(
            set_key(content, "status", "done"),
            "---\nmeta:\n  status: open\nstatus: done\n---\n"
        );
    }
}
