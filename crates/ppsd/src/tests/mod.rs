//! Test suites for the daemon bootstrap.

mod behaviour;
pub(crate) mod support;
