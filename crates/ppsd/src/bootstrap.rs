//! Daemon bootstrap orchestration.
//!
//! Bootstrap runs the steps of [`BootstrapStep::ORDER`] one after another.
//! Each step starts only after the previous one succeeded, is reported to
//! the [`HealthReporter`] when it completes, and aborts the whole sequence
//! when it fails. Nothing is bound to the network until every service has
//! been constructed and the Pipeline service's recovery pass has finished.

use std::net::SocketAddr;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use strum::Display;
use thiserror::Error;

use ppsd_config::{Config, ListenerEndpoint};

use crate::api::ApiError;
use crate::cluster::{self, ClusterClient, ClusterConnector, ClusterError, KubeConnector};
use crate::dispatch::{
    DebugSnapshotHandler, DispatchConnectionHandler, InternalJobSurface, JobSurface,
    PipelineSurface, SurfaceDescription, SurfaceRouter, VersionSurface,
};
use crate::health::HealthReporter;
use crate::jobs::{InternalJobApi, JobApi, JobService, LocalJobClient, RemoteJobClient};
use crate::persist::{self, PersistError, PersistenceBackend, RemotePersistenceBackend};
use crate::pfs::{FilesystemConnector, FilesystemError, PfsConnector};
use crate::pipelines::{PipelineApi, PipelineService};
use crate::resolve::{Collaborator, DiscoveryEnv, ResolveError, ResolvedAddress, resolve};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::transport::{ListenerError, ListenerHandle, ServiceListener};

/// Version advertised alongside the listener.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader returning a pre-built configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Steps of the bootstrap sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum BootstrapStep {
    /// Load configuration and install telemetry.
    LoadConfiguration,
    /// Resolve, initialise and connect the record store.
    InitializePersistence,
    /// Resolve and open the filesystem client.
    OpenFilesystem,
    /// Acquire the cluster client.
    AcquireCluster,
    /// Construct the Job service.
    ConstructJobService,
    /// Construct the in-process Job client.
    ConstructShortcutClient,
    /// Construct the Pipeline service.
    ConstructPipelineService,
    /// Run the Pipeline service's recovery pass.
    StartPipelineService,
    /// Register the API surfaces and bind the listeners.
    RegisterApis,
}

impl BootstrapStep {
    /// Execution order.
    pub const ORDER: [Self; 9] = [
        Self::LoadConfiguration,
        Self::InitializePersistence,
        Self::OpenFilesystem,
        Self::AcquireCluster,
        Self::ConstructJobService,
        Self::ConstructShortcutClient,
        Self::ConstructPipelineService,
        Self::StartPipelineService,
        Self::RegisterApis,
    ];
}

/// Errors surfaced during bootstrap. Each names the step that failed.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("load-configuration failed: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("load-configuration failed: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// A collaborator address could not be resolved.
    #[error("{step} failed: {source}")]
    Resolve {
        /// Step that needed the address.
        step: BootstrapStep,
        /// Resolution error naming the missing variable.
        #[source]
        source: ResolveError,
    },
    /// The record store could not be initialised or connected.
    #[error("initialize-persistence failed: {source}")]
    Persistence {
        /// Underlying persistence error.
        #[source]
        source: PersistError,
    },
    /// The filesystem client could not be opened.
    #[error("open-filesystem failed: {source}")]
    Filesystem {
        /// Underlying filesystem error.
        #[source]
        source: FilesystemError,
    },
    /// Every cluster acquisition strategy failed.
    #[error("acquire-cluster failed: {source}")]
    Cluster {
        /// Error of the last strategy tried.
        #[source]
        source: ClusterError,
    },
    /// The Pipeline service's recovery pass failed.
    #[error("start-pipeline-service failed: {source}")]
    PipelineStart {
        /// Underlying service error.
        #[source]
        source: ApiError,
    },
    /// A listener could not be bound.
    #[error("register-apis failed: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
}

impl BootstrapError {
    /// Step that failed.
    #[must_use]
    pub const fn step(&self) -> BootstrapStep {
        match self {
            Self::Configuration { .. } | Self::Telemetry { .. } => {
                BootstrapStep::LoadConfiguration
            }
            Self::Resolve { step, .. } => *step,
            Self::Persistence { .. } => BootstrapStep::InitializePersistence,
            Self::Filesystem { .. } => BootstrapStep::OpenFilesystem,
            Self::Cluster { .. } => BootstrapStep::AcquireCluster,
            Self::PipelineStart { .. } => BootstrapStep::StartPipelineService,
            Self::Listener { .. } => BootstrapStep::RegisterApis,
        }
    }
}

/// Capabilities bootstrap uses to reach the daemon's dependencies.
#[derive(Clone)]
pub struct Collaborators {
    /// Prepares and opens the record store.
    pub persistence: Arc<dyn PersistenceBackend>,
    /// Opens filesystem clients.
    pub filesystem: Arc<dyn FilesystemConnector>,
    /// Produces cluster clients.
    pub cluster: Arc<dyn ClusterConnector>,
}

impl Collaborators {
    /// Network-backed collaborators used by the binary.
    #[must_use]
    pub fn production() -> Self {
        Self {
            persistence: Arc::new(RemotePersistenceBackend),
            filesystem: Arc::new(PfsConnector),
            cluster: Arc::new(KubeConnector::default()),
        }
    }
}

/// Services built during bootstrap.
#[derive(Clone)]
pub struct ServiceSet {
    /// Job service instance.
    pub jobs: Arc<JobService>,
    /// In-process client bound to `jobs`, used by the Pipeline service.
    pub shortcut: Arc<LocalJobClient>,
    /// Pipeline service instance.
    pub pipelines: Arc<PipelineService>,
    /// Network client bound to the daemon's own listener.
    pub remote_jobs: RemoteJobClient,
}

/// Result of a successful bootstrap: services built, listeners bound.
pub struct Daemon {
    config: Config,
    telemetry: TelemetryHandle,
    services: ServiceSet,
    router: Arc<SurfaceRouter>,
    api: ServiceListener,
    debug: Option<ServiceListener>,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Services built during bootstrap.
    #[must_use]
    pub const fn services(&self) -> &ServiceSet {
        &self.services
    }

    /// Cluster client owned by the Job service.
    #[must_use]
    pub fn cluster(&self) -> &ClusterClient {
        self.services.jobs.cluster()
    }

    /// Surfaces registered on the API listener.
    #[must_use]
    pub fn surfaces(&self) -> Vec<SurfaceDescription> {
        self.router.describe()
    }

    /// Address the API listener is bound to.
    #[must_use]
    pub const fn api_addr(&self) -> SocketAddr {
        self.api.local_addr()
    }

    /// Address the debug listener is bound to, when enabled.
    #[must_use]
    pub fn debug_addr(&self) -> Option<SocketAddr> {
        self.debug.as_ref().map(ServiceListener::local_addr)
    }

    /// Starts accepting connections on every bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] if a listener cannot enter its accept loop.
    pub fn start(self) -> Result<RunningDaemon, ListenerError> {
        let api = self
            .api
            .start(Arc::new(DispatchConnectionHandler::new(Arc::clone(&self.router))))?;
        let debug = self
            .debug
            .map(|listener| {
                listener.start(Arc::new(DebugSnapshotHandler::new(
                    VERSION,
                    Arc::clone(&self.router),
                )))
            })
            .transpose()?;
        Ok(RunningDaemon { api, debug })
    }

    /// Starts the listeners and blocks until the API listener stops.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] if a listener fails to start or its
    /// accept thread panics.
    pub fn serve(self) -> Result<(), ListenerError> {
        self.start()?.wait()
    }
}

/// Daemon with running listeners.
#[derive(Debug)]
pub struct RunningDaemon {
    api: ListenerHandle,
    debug: Option<ListenerHandle>,
}

impl RunningDaemon {
    /// Address the API listener accepts on.
    #[must_use]
    pub const fn api_addr(&self) -> SocketAddr {
        self.api.local_addr()
    }

    /// Address the debug listener accepts on, when enabled.
    #[must_use]
    pub fn debug_addr(&self) -> Option<SocketAddr> {
        self.debug.as_ref().map(ListenerHandle::local_addr)
    }

    /// Asks every listener to stop accepting.
    pub fn shutdown(&self) {
        self.api.shutdown();
        if let Some(debug) = &self.debug {
            debug.shutdown();
        }
    }

    /// Waits for the API listener to stop, then stops the debug listener.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] if an accept thread panicked.
    pub fn wait(self) -> Result<(), ListenerError> {
        self.api.join()?;
        match self.debug {
            Some(debug) => {
                debug.shutdown();
                debug.join()
            }
            None => Ok(()),
        }
    }
}

/// Runs steps in order, reporting each completion or the first failure.
struct Sequencer<'a> {
    reporter: &'a dyn HealthReporter,
}

impl Sequencer<'_> {
    fn run<T>(
        &self,
        step: BootstrapStep,
        action: impl FnOnce() -> Result<T, BootstrapError>,
    ) -> Result<T, BootstrapError> {
        match action() {
            Ok(value) => {
                self.reporter.step_completed(step);
                Ok(value)
            }
            Err(error) => {
                self.reporter.bootstrap_failed(&error);
                Err(error)
            }
        }
    }

    fn build<T>(&self, step: BootstrapStep, action: impl FnOnce() -> T) -> T {
        let value = action();
        self.reporter.step_completed(step);
        value
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// `env` is the discovery snapshot every resolution reads from.
///
/// # Errors
///
/// Returns the [`BootstrapError`] of the first failing step. Later steps do
/// not run and no listener remains bound.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    env: &DiscoveryEnv,
    collaborators: &Collaborators,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();
    let steps = Sequencer {
        reporter: reporter.as_ref(),
    };

    let (config, telemetry) = steps.run(BootstrapStep::LoadConfiguration, || {
        let config = loader
            .load()
            .map_err(|source| BootstrapError::Configuration { source })?;
        let telemetry = telemetry::initialise(&config)
            .map_err(|source| BootstrapError::Telemetry { source })?;
        Ok((config, telemetry))
    })?;

    let store = steps.run(BootstrapStep::InitializePersistence, || {
        let address = resolve_for(
            BootstrapStep::InitializePersistence,
            Collaborator::Persistence,
            config.database_override(),
            env,
        )?;
        persist::initialize(
            collaborators.persistence.as_ref(),
            &address,
            config.database_name(),
        )
        .map_err(|source| BootstrapError::Persistence { source })
    })?;

    let filesystem = steps.run(BootstrapStep::OpenFilesystem, || {
        let address = resolve_for(
            BootstrapStep::OpenFilesystem,
            Collaborator::Filesystem,
            config.pfs_override(),
            env,
        )?;
        collaborators
            .filesystem
            .open(&address)
            .map_err(|source| BootstrapError::Filesystem { source })
    })?;

    let cluster_client = steps.run(BootstrapStep::AcquireCluster, || {
        cluster::acquire(collaborators.cluster.as_ref(), env, reporter.as_ref())
            .map_err(|source| BootstrapError::Cluster { source })
    })?;

    let jobs = steps.build(BootstrapStep::ConstructJobService, || {
        Arc::new(
            JobService::new(
                Arc::clone(&filesystem),
                Arc::clone(&store),
                Arc::new(cluster_client),
            )
            .with_remove_containers(config.remove_containers),
        )
    });

    let shortcut = steps.build(BootstrapStep::ConstructShortcutClient, || {
        Arc::new(LocalJobClient::new(Arc::clone(&jobs)))
    });

    let pipelines = steps.build(BootstrapStep::ConstructPipelineService, || {
        let job_client: Arc<dyn JobApi> = shortcut.clone();
        Arc::new(PipelineService::new(filesystem, job_client, store))
    });

    steps.run(BootstrapStep::StartPipelineService, || {
        pipelines
            .start()
            .map(drop)
            .map_err(|source| BootstrapError::PipelineStart { source })
    })?;

    let (router, api, debug) = steps.run(BootstrapStep::RegisterApis, || {
        let public_jobs: Arc<dyn JobApi> = jobs.clone();
        let internal_jobs: Arc<dyn InternalJobApi> = jobs.clone();
        let pipeline_api: Arc<dyn PipelineApi> = pipelines.clone();

        let mut router = SurfaceRouter::new();
        router.register(Arc::new(JobSurface::new(public_jobs)));
        router.register(Arc::new(InternalJobSurface::new(internal_jobs)));
        router.register(Arc::new(PipelineSurface::new(pipeline_api)));
        router.register(Arc::new(VersionSurface::new(VERSION)));

        let api = ServiceListener::bind("api", &config.listener_endpoint())
            .map_err(|source| BootstrapError::Listener { source })?;
        let debug = config
            .debug_endpoint()
            .map(|endpoint| ServiceListener::bind("debug", &endpoint))
            .transpose()
            .map_err(|source| BootstrapError::Listener { source })?;
        Ok((Arc::new(router), api, debug))
    })?;

    let remote_jobs = RemoteJobClient::new(dial_address(&config, api.local_addr()));
    reporter.bootstrap_succeeded(&config);

    Ok(Daemon {
        services: ServiceSet {
            jobs,
            shortcut,
            pipelines,
            remote_jobs,
        },
        config,
        telemetry,
        router,
        api,
        debug,
    })
}

fn resolve_for(
    step: BootstrapStep,
    collaborator: Collaborator,
    explicit: Option<&str>,
    env: &DiscoveryEnv,
) -> Result<ResolvedAddress, BootstrapError> {
    resolve(collaborator, explicit, env).map_err(|source| BootstrapError::Resolve { step, source })
}

/// `host:port` local clients dial to reach the API listener.
fn dial_address(config: &Config, bound: SocketAddr) -> String {
    let host = ListenerEndpoint::new(config.address.clone(), bound.port()).dial_host();
    if host.contains(':') {
        format!("[{host}]:{}", bound.port())
    } else {
        format!("{host}:{}", bound.port())
    }
}
