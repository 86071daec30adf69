//! Test suites for vault operations and bootstrap.

mod batch_edit_behaviour;
mod bootstrap;
mod steps;
mod support;
