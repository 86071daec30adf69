//! Step definitions shared by the vault behaviour suites.

use std::cell::RefCell;

use rstest_bdd_macros::{given, then};

use super::support::VaultWorld;

#[given("a document \"{name}\" containing \"{content}\"")]
fn given_document(world: &RefCell<VaultWorld>, name: String, content: String) {
    let mut state = world.borrow_mut();
    state.vault.seed(&name, &content);
    state.original = Some(content);
    state.original_stamp = Some(state.vault.vault().stamp(&name).expect("stamp"));
}

#[then("the operation succeeds")]
fn then_succeeds(world: &RefCell<VaultWorld>) {
    let state = world.borrow();
    let report = state.report();
    assert!(!report.summary.is_empty());
}

#[then("the operation is rejected as \"{kind}\"")]
fn then_rejected(world: &RefCell<VaultWorld>, kind: String) {
    let state = world.borrow();
    assert_eq!(state.error().kind().as_str(), kind);
}

#[then("the document \"{name}\" contains \"{content}\"")]
fn then_contains(world: &RefCell<VaultWorld>, name: String, content: String) {
    assert_eq!(world.borrow().vault.contents(&name), content);
}

#[then("the document \"{name}\" is unchanged")]
fn then_unchanged(world: &RefCell<VaultWorld>, name: String) {
    let state = world.borrow();
    let original = state.original.as_deref().expect("document was seeded");
    assert_eq!(state.vault.contents(&name), original);
}

#[then("the stamp of \"{name}\" is unchanged")]
fn then_stamp_unchanged(world: &RefCell<VaultWorld>, name: String) {
    let state = world.borrow();
    let original = state.original_stamp.as_deref().expect("document was seeded");
    assert_eq!(state.vault.vault().stamp(&name).expect("stamp"), original);
}
