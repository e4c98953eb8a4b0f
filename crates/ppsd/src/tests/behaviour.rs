//! Behavioural tests for the daemon bootstrap sequence.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::bootstrap::BootstrapStep;
use crate::cluster::{Credentials, TrustPolicy};
use crate::resolve::Collaborator;

use super::support::{self, CollaboratorCall, HealthEvent, TestWorld};

type StepResult = Result<(), String>;

#[fixture]
fn world() -> RefCell<TestWorld> {
    support::world()
}

#[given("the persistence host is discovered at {host}")]
fn given_persistence_host(world: &RefCell<TestWorld>, host: String) {
    world
        .borrow_mut()
        .set_env(Collaborator::Persistence.discovery_variable(), &host);
}

#[given("the filesystem host is discovered at {host}")]
fn given_filesystem_host(world: &RefCell<TestWorld>, host: String) {
    world
        .borrow_mut()
        .set_env(Collaborator::Filesystem.discovery_variable(), &host);
}

#[given("the orchestrator host is discovered at {host}")]
fn given_orchestrator_host(world: &RefCell<TestWorld>, host: String) {
    world
        .borrow_mut()
        .set_env(Collaborator::Orchestrator.discovery_variable(), &host);
}

#[given("the configured database address is {address}")]
fn given_database_address(world: &RefCell<TestWorld>, address: String) {
    world.borrow_mut().config_mut().database_address = Some(address);
}

#[given("a mounted service account for {host}")]
fn given_service_account(world: &RefCell<TestWorld>, host: String) {
    let mut world = world.borrow_mut();
    world.collaborators.mount_service_account("sa-token");
    world.set_env("KUBERNETES_SERVICE_HOST", &host);
    world.set_env("KUBERNETES_SERVICE_PORT", "443");
}

#[given("a failing configuration loader")]
fn given_failing_loader(world: &RefCell<TestWorld>) {
    world.borrow_mut().use_failing_loader();
}

#[when("the daemon bootstrap runs")]
fn when_bootstrap_runs(world: &RefCell<TestWorld>) {
    world.borrow_mut().bootstrap();
}

#[then("bootstrap succeeds")]
fn then_bootstrap_succeeds(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    assert!(
        world.bootstrap_error().is_none(),
        "bootstrap error: {:?}",
        world.bootstrap_error()
    );
    assert!(world.daemon().is_some(), "daemon should have been built");
    assert!(
        world
            .reporter
            .events()
            .contains(&HealthEvent::BootstrapSucceeded),
        "bootstrap success event missing"
    );
}

#[then("bootstrap fails at {step}")]
fn then_bootstrap_fails_at(world: &RefCell<TestWorld>, step: String) -> StepResult {
    let world = world.borrow();
    let error = world
        .bootstrap_error()
        .ok_or_else(|| "bootstrap succeeded unexpectedly".to_owned())?;
    if error.step().to_string() == step {
        Ok(())
    } else {
        Err(format!("expected failure at {step}, got {}: {error}", error.step()))
    }
}

#[then("the failure names {variable}")]
fn then_failure_names(world: &RefCell<TestWorld>, variable: String) -> StepResult {
    let world = world.borrow();
    let message = world
        .bootstrap_error()
        .map(ToString::to_string)
        .ok_or_else(|| "bootstrap succeeded unexpectedly".to_owned())?;
    if message.contains(&variable) {
        Ok(())
    } else {
        Err(format!("{message:?} does not name {variable}"))
    }
}

#[then("every bootstrap step completed in order")]
fn then_steps_in_order(world: &RefCell<TestWorld>) {
    assert_eq!(
        world.borrow().reporter.completed_steps(),
        BootstrapStep::ORDER.to_vec()
    );
}

#[then("no service was constructed")]
fn then_no_service(world: &RefCell<TestWorld>) {
    let steps = world.borrow().reporter.completed_steps();
    assert_eq!(steps, vec![BootstrapStep::LoadConfiguration]);
}

#[then("persistence was initialised at {address}")]
fn then_persistence_at(world: &RefCell<TestWorld>, address: String) -> StepResult {
    let calls = world.borrow().collaborators.calls();
    let initialised = calls.iter().any(|call| {
        matches!(
            call,
            CollaboratorCall::InitializePersistence { address: recorded, .. } if *recorded == address
        )
    });
    if initialised {
        Ok(())
    } else {
        Err(format!("no initialisation at {address}: {calls:?}"))
    }
}

#[then("the filesystem was opened at {address}")]
fn then_filesystem_at(world: &RefCell<TestWorld>, address: String) {
    let calls = world.borrow().collaborators.calls();
    assert!(
        calls.contains(&CollaboratorCall::OpenFilesystem { address }),
        "filesystem not opened as expected: {calls:?}"
    );
}

#[then("the job, internal-job, pipeline and version surfaces are registered")]
fn then_surfaces_registered(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    let daemon = world.daemon().expect("daemon missing");
    let names: Vec<&str> = daemon
        .surfaces()
        .into_iter()
        .map(|surface| surface.name)
        .collect();
    assert_eq!(names, ["job", "internal-job", "pipeline", "version"]);
}

#[then("the cluster client targets {address} without verification")]
fn then_insecure_cluster(world: &RefCell<TestWorld>, address: String) {
    let world = world.borrow();
    let cluster = world.daemon().expect("daemon missing").cluster();
    assert_eq!(cluster.address(), address);
    assert_eq!(cluster.trust(), &TrustPolicy::InsecureSkipVerify);
    assert_eq!(cluster.credentials(), &Credentials::Anonymous);
}

#[then("the cluster client targets {address} with credentials")]
fn then_in_cluster(world: &RefCell<TestWorld>, address: String) {
    let world = world.borrow();
    let cluster = world.daemon().expect("daemon missing").cluster();
    assert_eq!(cluster.address(), address);
    assert_eq!(
        cluster.credentials(),
        &Credentials::BearerToken("sa-token".to_owned())
    );
    assert!(!cluster.is_insecure());
}

#[then("exactly one cluster fallback warning was reported")]
fn then_one_fallback(world: &RefCell<TestWorld>) {
    assert_eq!(world.borrow().reporter.fallback_count(), 1);
}

#[then("no cluster fallback warning was reported")]
fn then_no_fallback(world: &RefCell<TestWorld>) {
    assert_eq!(world.borrow().reporter.fallback_count(), 0);
}

#[then("the reporter recorded bootstrap failure")]
fn then_reporter_failure(world: &RefCell<TestWorld>) {
    let events = world.borrow().reporter.events();
    let failed = events
        .iter()
        .filter(|event| matches!(event, HealthEvent::BootstrapFailed(_)))
        .count();
    assert_eq!(failed, 1, "expected one failure event: {events:?}");
}

#[then("no collaborator was contacted")]
fn then_no_collaborator(world: &RefCell<TestWorld>) {
    let calls = world.borrow().collaborators.calls();
    assert!(calls.is_empty(), "unexpected calls: {calls:?}");
}

#[scenario(
    path = "tests/features/daemon_bootstrap.feature",
    name = "Collaborators discovered from link variables"
)]
fn discovered_collaborators(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon_bootstrap.feature",
    name = "Explicit persistence address overrides discovery"
)]
fn explicit_persistence_address(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon_bootstrap.feature",
    name = "Missing persistence variable halts bootstrap"
)]
fn missing_persistence_variable(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon_bootstrap.feature",
    name = "Insecure cluster fallback outside the cluster"
)]
fn insecure_cluster_fallback(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon_bootstrap.feature",
    name = "In-cluster credentials are preferred"
)]
fn in_cluster_credentials(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon_bootstrap.feature",
    name = "Invalid configuration stops before any collaborator"
)]
fn invalid_configuration(world: RefCell<TestWorld>) {
    drop(world);
}
