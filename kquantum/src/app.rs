//! Main application entry point

use crate::{
    config::AppConfig,
    context::AppContext,
    error::Error,
    scopes::{self, ACTIVITY_RETAINED, SERVICE},
    services,
    tracing::TracingConfig,
    viewmodels::{self, ViewModelMap},
};
use kquantum_di::{ContainerBuilder, GraphManifest, Inject, ScopeTag};
use std::sync::Arc;

pub use self::{
    lifecycle::ActivityRetainedLifecycle,
    scope::ScopeHandle,
};

pub mod lifecycle;
pub mod scope;

/// The application builder: scope levels, services and view models.
///
/// # Example
/// ```
/// use kquantum::{App, AppConfig, services::AuthService};
///
/// let app = App::new(AppConfig::default())
///     .with_default_tracing()
///     .start()
///     .unwrap();
///
/// let auth = app.resolve::<AuthService>().unwrap();
/// assert!(!auth.is_logged_in());
///
/// app.shutdown();
/// ```
#[derive(Debug)]
pub struct App {
    config: AppConfig,
    container: ContainerBuilder,
    view_models: ViewModelMap,
    pub(crate) tracing_config: Option<TracingConfig>,
}

impl App {
    /// Creates the application graph for `config`
    pub fn new(config: AppConfig) -> Self {
        let mut container = ContainerBuilder::new();
        scopes::declare(&mut container);

        container.register_singleton(AppContext::new(config.clone()));
        services::register(&mut container);
        lifecycle::register(&mut container);

        let mut view_models = ViewModelMap::default();
        viewmodels::register(&mut container, &mut view_models);

        Self {
            config,
            container,
            view_models,
            tracing_config: None,
        }
    }

    /// Returns the application configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registers an additional singleton service
    pub fn add_singleton<T: Send + Sync + 'static>(&mut self, instance: T) -> &mut Self {
        self.container.register_singleton(instance);
        self
    }

    /// Registers an additional service memoized per instance of the `scope` level
    pub fn add_scoped<T: Inject + 'static>(&mut self, scope: ScopeTag) -> &mut Self {
        self.container.register_scoped::<T>(scope);
        self
    }

    /// Registers an additional service constructed on every resolution
    pub fn add_transient<T: Inject + 'static>(&mut self, scope: ScopeTag) -> &mut Self {
        self.container.register_transient::<T>(scope);
        self
    }

    /// Describes the application graph without building it
    pub fn manifest(&self) -> GraphManifest {
        self.container.manifest()
    }

    /// Validates the configuration and the object graph and creates the root scope
    pub fn start(self) -> Result<Application, Error> {
        self.config.validate()?;
        let root = self.container.build()?;

        tracing::info!(
            api_base_url = %self.config.api_base_url,
            view_models = self.view_models.len(),
            "application started"
        );

        Ok(Application {
            root: ScopeHandle::root(root, self.view_models, self.tracing_config),
        })
    }
}

/// The running application: owns the root scope of the object graph
#[derive(Debug)]
pub struct Application {
    root: ScopeHandle,
}

impl Application {
    /// Builds the default application graph for `config` and starts it
    pub fn start(config: AppConfig) -> Result<Self, Error> {
        App::new(config).start()
    }

    /// Returns the root scope
    #[inline]
    pub fn root(&self) -> &ScopeHandle {
        &self.root
    }

    /// Returns `true` until [`Application::shutdown`] is called
    #[inline]
    pub fn is_running(&self) -> bool {
        !self.root.is_closed()
    }

    /// Resolves a process-wide service
    #[inline]
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        self.root.resolve()
    }

    /// Opens an [`ACTIVITY_RETAINED`] scope
    #[inline]
    pub fn activity_retained(&self) -> Result<ScopeHandle, Error> {
        self.root.enter(ACTIVITY_RETAINED)
    }

    /// Opens a [`SERVICE`] scope
    #[inline]
    pub fn service(&self) -> Result<ScopeHandle, Error> {
        self.root.enter(SERVICE)
    }

    /// Closes every scope and releases all services
    pub fn shutdown(self) {
        self.root.close();
        tracing::info!("application shut down");
    }
}
