//! Ticking and unticking checkbox tasks in place.

use serde::Deserialize;

use crate::commit::{read_document, write_atomic};
use crate::concurrency::{check, modification_stamp};
use crate::error::VaultError;
use crate::report::{MutationReport, TaskReport};
use crate::tasks::{Task, extract_tasks, find_tasks, parse_task, with_status};
use crate::vault::Vault;

use super::{Rewrite, traced};

/// Flips one task, chosen by text or by line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ToggleTaskRequest {
    /// Vault-relative reference.
    pub path: String,
    /// One-based line of the task; ignored when `text` is given.
    #[serde(default)]
    pub line: Option<usize>,
    /// Case-insensitive fragment that must match exactly one task.
    #[serde(default)]
    pub text: Option<String>,
    /// Stamp the document must still carry.
    #[serde(default)]
    pub expected_modified: Option<String>,
}

/// Ticks every task matched by a list of text fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CompleteTasksRequest {
    /// Vault-relative reference.
    pub path: String,
    /// Fragments, each expected to match exactly one task.
    pub texts: Vec<String>,
    /// Stamp the document must still carry.
    #[serde(default)]
    pub expected_modified: Option<String>,
}

/// Finds the single task whose text contains `needle`.
fn unique_task<'a>(
    reference: &str,
    tasks: &'a [Task],
    needle: &str,
) -> Result<&'a Task, VaultError> {
    match find_tasks(tasks, needle).as_slice() {
        [] => Err(VaultError::NotFound {
            path: reference.to_owned(),
            message: format!("no task matching '{needle}' in {reference}"),
        }),
        [task] => Ok(*task),
        many => Err(VaultError::Ambiguous {
            path: reference.to_owned(),
            count: many.len(),
            message: format!(
                "{} tasks match '{needle}' in {reference}; provide more specific text",
                many.len()
            ),
        }),
    }
}

fn task_on_line(reference: &str, lines: &[&str], number: usize) -> Result<Task, VaultError> {
    let line = number
        .checked_sub(1)
        .and_then(|index| lines.get(index))
        .ok_or_else(|| {
            VaultError::malformed(
                Some(reference),
                format!("line {number} is out of range (1-{})", lines.len()),
            )
        })?;
    parse_task(line, number).ok_or_else(|| VaultError::NotFound {
        path: reference.to_owned(),
        message: format!("line {number} of {reference} is not a task"),
    })
}

/// Rewrites the checkbox of the line holding `task`.
fn mark(lines: &mut [String], task: &Task, completed: bool) {
    if let Some(slot) = task
        .line
        .checked_sub(1)
        .and_then(|index| lines.get_mut(index))
    {
        *slot = with_status(slot, task, completed);
    }
}

impl Vault {
    /// Flips a task between open and done.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Malformed`] when neither `text` nor `line` is
    /// given or the line is out of range, [`VaultError::NotFound`] when no
    /// task matches, and [`VaultError::Ambiguous`] when the text matches
    /// several.
    pub fn toggle_task(&self, request: &ToggleTaskRequest) -> Result<MutationReport, VaultError> {
        self.rewrite(
            "toggle_task",
            &request.path,
            request.expected_modified.as_deref(),
            |reference, content| {
                let lines: Vec<&str> = content.split('\n').collect();
                let task = match (request.text.as_deref().map(str::trim), request.line) {
                    (Some(text), _) if !text.is_empty() => {
                        unique_task(reference, &extract_tasks(content), text)?.clone()
                    }
                    (_, Some(number)) => task_on_line(reference, &lines, number)?,
                    _ => {
                        return Err(VaultError::malformed(
                            Some(reference),
                            "either 'line' or 'text' must be provided",
                        ));
                    }
                };

                let mut updated: Vec<String> =
                    lines.iter().map(|line| (*line).to_owned()).collect();
                mark(&mut updated, &task, !task.completed);
                let status = if task.completed { "open" } else { "completed" };
                Ok(Rewrite::Changed {
                    content: updated.join("\n"),
                    summary: format!("toggled task on L{} to {status}: {}", task.line, task.text),
                    changes: 1,
                })
            },
        )
    }

    /// Ticks every task matched by `texts` in one write.
    ///
    /// Fragments matching no task or several are reported back rather than
    /// failing the call. Nothing is written when no task changes.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Malformed`] for an empty list, plus the
    /// resolution, stamp, and I/O failures shared by every mutation.
    pub fn complete_tasks(&self, request: &CompleteTasksRequest) -> Result<TaskReport, VaultError> {
        traced("complete_tasks", &request.path, || {
            let root = self.root();
            let document = Self::resolve(&root, &request.path)?;
            let content = read_document(&document.path, &document.reference)?;
            check(
                &document.path,
                &document.reference,
                request.expected_modified.as_deref(),
            )?;
            let texts: Vec<&str> = request
                .texts
                .iter()
                .map(|text| text.trim())
                .filter(|text| !text.is_empty())
                .collect();
            if texts.is_empty() {
                return Err(VaultError::malformed(
                    Some(&document.reference),
                    "at least one task text is required",
                ));
            }

            let mut lines: Vec<String> = content.split('\n').map(str::to_owned).collect();
            let mut tasks = extract_tasks(&content);
            let mut report = TaskReport {
                path: document.reference.clone(),
                modified: None,
                completed: Vec::new(),
                already_complete: Vec::new(),
                unmatched: Vec::new(),
            };

            for text in texts {
                let found = match unique_task(&document.reference, &tasks, text) {
                    Ok(task) => task.clone(),
                    Err(error) => {
                        report.unmatched.push(format!("'{text}': {error}"));
                        continue;
                    }
                };
                if found.completed {
                    report.already_complete.push(found);
                    continue;
                }
                mark(&mut lines, &found, true);
                if let Some(task) = tasks.iter_mut().find(|task| task.line == found.line) {
                    task.completed = true;
                    report.completed.push(task.clone());
                }
            }

            if !report.completed.is_empty() {
                write_atomic(&document.path, &lines.join("\n"))?;
                report.modified = Some(modification_stamp(&document.path, &document.reference)?);
            }
            Ok(report)
        })
    }
}
