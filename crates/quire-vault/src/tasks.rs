//! Markdown checkbox tasks: `- [ ] open` and `- [x] done`.

use serde::Serialize;

/// A checkbox line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// One-based line number.
    pub line: usize,
    /// Whether the box is ticked.
    pub completed: bool,
    /// Text after the checkbox, trimmed.
    pub text: String,
    #[serde(skip)]
    mark_offset: usize,
}

/// Parses `line` as a task, recording `number` as its line.
///
/// Leading indentation is allowed, as is whitespace between the dash and
/// the box. `x` and `X` both mark completion.
#[must_use]
pub fn parse_task(line: &str, number: usize) -> Option<Task> {
    let after_dash = line.trim_start().strip_prefix('-')?.trim_start();
    let inside = after_dash.strip_prefix('[')?;
    let mut chars = inside.chars();
    let completed = match chars.next()? {
        ' ' => false,
        'x' | 'X' => true,
        _ => return None,
    };
    let text = chars.as_str().strip_prefix(']')?.trim();
    if text.is_empty() {
        return None;
    }
    Some(Task {
        line: number,
        completed,
        text: text.to_owned(),
        mark_offset: line.len() - inside.len(),
    })
}

/// Collects every task in `text`.
#[must_use]
pub fn extract_tasks(text: &str) -> Vec<Task> {
    text.split('\n')
        .enumerate()
        .filter_map(|(index, line)| parse_task(line, index + 1))
        .collect()
}

/// Returns `line` with the task's checkbox set to `completed`.
#[must_use]
pub fn with_status(line: &str, task: &Task, completed: bool) -> String {
    let mark = if completed { 'x' } else { ' ' };
    match (line.get(..task.mark_offset), line.get(task.mark_offset + 1..)) {
        (Some(head), Some(tail)) => format!("{head}{mark}{tail}"),
        _ => line.to_owned(),
    }
}

/// Tasks whose text contains `needle`, ignoring case.
#[must_use]
pub fn find_tasks<'a>(tasks: &'a [Task], needle: &str) -> Vec<&'a Task> {
    let wanted = needle.trim().to_lowercase();
    tasks
        .iter()
        .filter(|task| task.text.to_lowercase().contains(&wanted))
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::open("- [ ] buy milk", Some((false, "buy milk")))]
    #[case::done("- [x] buy milk", Some((true, "buy milk")))]
    #[case::upper("- [X] buy milk", Some((true, "buy milk")))]
    #[case::indented("    -  [ ] nested", Some((false, "nested")))]
    #[case::tight("-[ ] tight", Some((false, "tight")))]
    #[case::plain_bullet("- buy milk", None)]
    #[case::other_mark("- [-] cancelled", None)]
    #[case::empty_text("- [ ]   ", None)]
    fn parses_checkbox_lines(#[case] line: &str, #[case] expected: Option<(bool, &str)>) {
        let parsed = parse_task(line, 1);
        assert_eq!(
            parsed.as_ref().map(|task| (task.completed, task.text.as_str())),
            expected
        );
    }

    #[rstest]
    #[case::complete("  - [ ] call [x] back", true, "  - [x] call [x] back")]
    #[case::reopen("- [X] done [ ] here", false, "- [ ] done [ ] here")]
    fn only_the_checkbox_changes(
        #[case] line: &str,
        #[case] completed: bool,
        #[case] expected: &str,
    ) {
        let task = parse_task(line, 1).expect("task");
        assert_eq!(with_status(line, &task, completed), expected);
    }

    #[rstest]
    fn finds_tasks_by_substring() {
        let tasks = extract_tasks("# Todo\n- [ ] Write report\n- [x] Read report\n- [ ] Call Bob");
        let matched: Vec<usize> = find_tasks(&tasks, "REPORT").iter().map(|t| t.line).collect();
        assert_eq!(matched, vec![2, 3]);
        assert_eq!(find_tasks(&tasks, "bob").len(), 1);
    }
}
