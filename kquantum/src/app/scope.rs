//! Handles to live scopes of the application

use super::lifecycle::ActivityRetainedLifecycle;
use crate::{
    error::{DiError, Error},
    tracing::TracingConfig,
    viewmodels::ViewModelMap,
};
use kquantum_di::{Container, ScopeTag};
use std::{any::Any, sync::Arc};
use tracing::Span;

/// A live scope of the application: the root, an activity, a view model...
///
/// Cloning the handle shares the scope. The scope is closed by [`ScopeHandle::close`],
/// when its parent closes, or when the last handle is dropped.
#[derive(Debug, Clone)]
pub struct ScopeHandle {
    container: Container,
    view_models: Arc<ViewModelMap>,
    tracing_config: Option<TracingConfig>,
    span: Option<Span>,
}

impl ScopeHandle {
    pub(crate) fn root(container: Container, view_models: ViewModelMap, tracing_config: Option<TracingConfig>) -> Self {
        Self {
            container,
            view_models: Arc::new(view_models),
            tracing_config,
            span: None,
        }
    }

    /// Returns the scope level
    #[inline]
    pub fn tag(&self) -> &ScopeTag {
        self.container.tag()
    }

    /// Returns the underlying scope instance
    #[inline]
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Returns `true` if the scope was closed
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.container.is_closed()
    }

    /// Resolves a service visible from this scope
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        let _entered = self.span.as_ref().map(Span::enter);
        Ok(self.container.resolve_shared::<T>()?)
    }

    /// Opens a child scope of the `scope` level
    pub fn enter(&self, scope: ScopeTag) -> Result<ScopeHandle, Error> {
        let container = self.container.create_scope(scope)?;
        let span = self.tracing_config
            .and_then(|config| config.scope_span(container.tag(), self.tag()));

        tracing::debug!(scope = %container.tag(), parent = %self.tag(), "entered scope");

        Ok(Self {
            container,
            view_models: self.view_models.clone(),
            tracing_config: self.tracing_config,
            span,
        })
    }

    /// Resolves a view model by its simple type name, e.g. `HomeViewModel`
    pub fn view_model_by_name(&self, name: &str) -> Result<Arc<dyn Any + Send + Sync>, Error> {
        let key = self.view_models
            .get(name)
            .ok_or_else(|| DiError::MissingBinding {
                key: name.to_owned().into(),
                scope: self.tag().clone(),
            })?;

        let _entered = self.span.as_ref().map(Span::enter);
        Ok(self.container.resolve_dyn(key)?)
    }

    /// Resolves the lifecycle of the enclosing activity-retained scope
    #[inline]
    pub fn lifecycle(&self) -> Result<Arc<ActivityRetainedLifecycle>, Error> {
        self.resolve()
    }

    /// Registers a listener run when this scope closes
    pub fn on_close<F>(&self, listener: F) -> Result<(), Error>
    where
        F: FnOnce() + Send + 'static
    {
        Ok(self.container.on_close(listener)?)
    }

    /// Closes the scope and every scope opened from it
    pub fn close(&self) {
        tracing::debug!(scope = %self.tag(), "closing scope");
        self.container.close();
    }
}
