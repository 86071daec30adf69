//! Behavioural tests for all-or-nothing batch edits.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::{BatchEditRequest, EditOperation};

use super::support::VaultWorld;

#[fixture]
fn world() -> RefCell<VaultWorld> {
    RefCell::new(VaultWorld::new())
}

#[given("an edit replacing \"{old}\" with \"{new}\"")]
fn given_edit(world: &RefCell<VaultWorld>, old: String, new: String) {
    world.borrow_mut().edits.push(EditOperation::new(old, new));
}

fn run_batch(world: &RefCell<VaultWorld>, name: &str, dry_run: bool) {
    let mut state = world.borrow_mut();
    let request = BatchEditRequest {
        path: name.to_owned(),
        edits: state.edits.clone(),
        dry_run,
        ..BatchEditRequest::default()
    };
    let outcome = state.vault.vault().batch_edit(&request);
    state.outcome = Some(outcome);
}

#[when("the batch is applied to \"{name}\"")]
fn when_batch_applied(world: &RefCell<VaultWorld>, name: String) {
    run_batch(world, &name, false);
}

#[when("the batch is dry-run against \"{name}\"")]
fn when_batch_dry_run(world: &RefCell<VaultWorld>, name: String) {
    run_batch(world, &name, true);
}

#[then("the batch reports {count} changes")]
fn then_batch_changes(world: &RefCell<VaultWorld>, count: usize) {
    assert_eq!(world.borrow().report().changes, count);
}

#[then("the batch reports {count} issues")]
fn then_batch_issues(world: &RefCell<VaultWorld>, count: usize) {
    assert_eq!(world.borrow().error().issues().len(), count);
}

#[then("the report is marked as a dry run")]
fn then_dry_run(world: &RefCell<VaultWorld>) {
    let state = world.borrow();
    let report = state.report();
    assert!(report.dry_run);
    assert!(report.modified.is_none());
}

#[scenario(
    path = "tests/features/batch_edit.feature",
    name = "Non-overlapping unique edits are applied together"
)]
fn unique_edits_apply(world: RefCell<VaultWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/batch_edit.feature",
    name = "A missing edit rejects the whole batch"
)]
fn missing_edit_rejects(world: RefCell<VaultWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/batch_edit.feature",
    name = "A repeated edit rejects the whole batch"
)]
fn repeated_edit_rejects(world: RefCell<VaultWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/batch_edit.feature",
    name = "Overlapping edits reject the whole batch"
)]
fn overlapping_edits_reject(world: RefCell<VaultWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/batch_edit.feature",
    name = "A dry run validates without writing"
)]
fn dry_run_leaves_document(world: RefCell<VaultWorld>) {
    drop(world);
}
