//! Dependency Injection container and tools

use self::{
    binding::{ArcService, Binding, Provider, Registry, ResolverFn},
    scope::ScopeInner,
};
use crate::{
    Inject, Key, ScopeTag,
    error::{Error, Name},
    graph::{self, Dependency, ScopeTree},
};
use std::{
    any::Any,
    fmt::{self, Debug, Formatter},
    marker::PhantomData,
    sync::{Arc, Weak},
};

pub use self::{
    factory::GenericFactory,
    from_container::FromContainer,
    scope::ScopeState,
};

pub mod factory;
pub mod from_container;
mod binding;
mod resolution;
mod scope;

/// How often a binding is constructed within the scope instance that owns it
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "manifest", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "manifest", serde(rename_all = "lowercase"))]
pub enum Lifetime {
    /// Constructed once per owning scope instance and reused
    #[default]
    Scoped,
    /// Constructed on every resolution
    Transient,
}

#[inline]
fn make_resolver_fn<T, F, Args>(factory: F) -> (ResolverFn, Vec<Dependency>)
where
    T: Send + Sync + 'static,
    F: GenericFactory<Args, Output = T>,
    Args: FromContainer
{
    let mut dependencies = Vec::new();
    Args::dependencies(&mut dependencies);

    let resolver: ResolverFn = Arc::new(move |c: &Container| -> Result<ArcService, Error> {
        let args = Args::from_container(c)?;
        factory.call(args).map(|t| Arc::new(t) as ArcService)
    });
    (resolver, dependencies)
}

/// A freshly added binding, used to attach a disposal hook
pub struct Registration<'a, T> {
    binding: &'a mut Binding,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Debug for Registration<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Registration").field(&self.binding).finish()
    }
}

impl<T: Send + Sync + 'static> Registration<'_, T> {
    /// Registers a hook invoked with the instance when its owning scope closes.
    ///
    /// Hooks of one scope run in reverse creation order. Transient instances
    /// are not tracked, so the hook never runs for them.
    pub fn on_dispose<F>(self, dispose: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static
    {
        self.binding.disposer = Some(Arc::new(move |service: &ArcService| {
            if let Some(service) = (**service).downcast_ref::<T>() {
                dispose(service);
            }
        }));
        self
    }
}

/// Represents a DI container builder,
/// that is able to declare scope levels and add bindings to them.
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    scopes: Vec<(ScopeTag, ScopeTag)>,
    bindings: Vec<Binding>,
}

impl ContainerBuilder {
    /// Creates a new DI container builder
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the `scope` level as a child of `parent`.
    ///
    /// Levels may be declared in any order; the root level is [`ScopeTag::ROOT`].
    pub fn add_scope(&mut self, scope: impl Into<ScopeTag>, parent: impl Into<ScopeTag>) -> &mut Self {
        self.scopes.push((scope.into(), parent.into()));
        self
    }

    /// Register a singleton service instance
    pub fn register_singleton<T: Send + Sync + 'static>(&mut self, instance: T) -> Registration<'_, T> {
        let provider = Provider::Instance(Arc::new(instance));
        self.push(ScopeTag::ROOT, Lifetime::Scoped, Vec::new(), provider)
    }

    /// Register a singleton service that is constructed on first resolution
    pub fn register_singleton_factory<T, F, Args>(&mut self, factory: F) -> Registration<'_, T>
    where
        T: Send + Sync + 'static,
        F: GenericFactory<Args, Output = T>,
        Args: FromContainer
    {
        self.register_factory(ScopeTag::ROOT, Lifetime::Scoped, factory)
    }

    /// Register a singleton service that required to be resolved as [`Inject`]
    pub fn register_singleton_inject<T: Inject + 'static>(&mut self) -> Registration<'_, T> {
        self.register_factory(ScopeTag::ROOT, Lifetime::Scoped, T::inject)
    }

    /// Register a service memoized per instance of the `scope` level
    pub fn register_scoped_factory<T, F, Args>(&mut self, scope: impl Into<ScopeTag>, factory: F) -> Registration<'_, T>
    where
        T: Send + Sync + 'static,
        F: GenericFactory<Args, Output = T>,
        Args: FromContainer
    {
        self.register_factory(scope.into(), Lifetime::Scoped, factory)
    }

    /// Register a scoped service that required to be resolved as [`Default`]
    pub fn register_scoped_default<T>(&mut self, scope: impl Into<ScopeTag>) -> Registration<'_, T>
    where
        T: Default + Send + Sync + 'static
    {
        self.register_factory(scope.into(), Lifetime::Scoped, T::default)
    }

    /// Register a scoped service that required to be resolved as [`Inject`]
    pub fn register_scoped<T: Inject + 'static>(&mut self, scope: impl Into<ScopeTag>) -> Registration<'_, T> {
        self.register_factory(scope.into(), Lifetime::Scoped, T::inject)
    }

    /// Register a transient service whose dependencies resolve from the `scope` level
    pub fn register_transient_factory<T, F, Args>(&mut self, scope: impl Into<ScopeTag>, factory: F) -> Registration<'_, T>
    where
        T: Send + Sync + 'static,
        F: GenericFactory<Args, Output = T>,
        Args: FromContainer
    {
        self.register_factory(scope.into(), Lifetime::Transient, factory)
    }

    /// Register a transient service that required to be resolved as [`Default`]
    pub fn register_transient_default<T>(&mut self, scope: impl Into<ScopeTag>) -> Registration<'_, T>
    where
        T: Default + Send + Sync + 'static
    {
        self.register_factory(scope.into(), Lifetime::Transient, T::default)
    }

    /// Register a transient service that required to be resolved as [`Inject`]
    pub fn register_transient<T: Inject + 'static>(&mut self, scope: impl Into<ScopeTag>) -> Registration<'_, T> {
        self.register_factory(scope.into(), Lifetime::Transient, T::inject)
    }

    /// Describes the declared scope levels and bindings without their factories
    #[cfg(feature = "manifest")]
    pub fn manifest(&self) -> crate::GraphManifest {
        use crate::BindingDecl;

        let (tree, _) = ScopeTree::resolve(&self.scopes);
        let names = |deferred: bool, deps: &[Dependency]| deps
            .iter()
            .filter(|d| d.deferred == deferred)
            .map(|d| d.key.name().to_owned())
            .collect::<Vec<_>>();

        let bindings = self.bindings
            .iter()
            .map(|b| BindingDecl {
                key: b.key.name().to_owned(),
                scope: b.scope.name().to_owned(),
                lifetime: b.lifetime,
                dependencies: names(false, &b.dependencies),
                deferred: names(true, &b.dependencies),
            })
            .collect();
        crate::GraphManifest::from_tree(&tree, bindings)
    }

    /// Validates the dependency graph and builds the root scope of a DI container.
    ///
    /// Every violation found is reported at once in [`Error::GraphValidation`].
    pub fn build(self) -> Result<Container, Error> {
        let (tree, mut violations) = ScopeTree::resolve(&self.scopes);
        let declarations = self.bindings
            .iter()
            .map(Binding::declaration)
            .collect::<Vec<_>>();
        violations.extend(graph::validate(&tree, &declarations));

        if !violations.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::warn!(violations = violations.len(), "dependency graph is invalid");
            return Err(Error::GraphValidation(violations));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(bindings = self.bindings.len(), "container built");

        let registry = Arc::new(Registry::new(tree, self.bindings));
        let inner = Arc::new(ScopeInner::new(ScopeTag::ROOT, registry, None));
        inner.activate();
        Ok(Container { inner })
    }

    fn register_factory<T, F, Args>(&mut self, scope: ScopeTag, lifetime: Lifetime, factory: F) -> Registration<'_, T>
    where
        T: Send + Sync + 'static,
        F: GenericFactory<Args, Output = T>,
        Args: FromContainer
    {
        let (resolver, dependencies) = make_resolver_fn(factory);
        self.push(scope, lifetime, dependencies, Provider::Factory(resolver))
    }

    fn push<T>(&mut self, scope: ScopeTag, lifetime: Lifetime, dependencies: Vec<Dependency>, provider: Provider) -> Registration<'_, T>
    where
        T: Send + Sync + 'static
    {
        let idx = self.bindings.len();
        self.bindings.push(Binding {
            key: Key::of::<T>(),
            scope,
            lifetime,
            dependencies,
            provider,
            disposer: None,
        });
        Registration {
            binding: &mut self.bindings[idx],
            _marker: PhantomData,
        }
    }
}

/// A handle to one scope instance of a DI container.
///
/// Cloning the handle is cheap and shares the scope. The scope closes when
/// [`Container::close`] is called or the last handle is dropped.
#[derive(Clone)]
pub struct Container {
    inner: Arc<ScopeInner>,
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("scope", &self.inner.tag)
            .field("state", &self.inner.state())
            .finish_non_exhaustive()
    }
}

impl Container {
    /// Returns the scope level of this scope instance
    #[inline]
    pub fn tag(&self) -> &ScopeTag {
        &self.inner.tag
    }

    /// Returns the current lifecycle state
    #[inline]
    pub fn state(&self) -> ScopeState {
        self.inner.state()
    }

    /// Returns `true` if the scope was closed
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.state() == ScopeState::Destroyed
    }

    /// Returns the parent scope instance, or `None` for the root
    #[inline]
    pub fn parent(&self) -> Option<&Container> {
        self.inner.parent.as_ref()
    }

    /// Creates a new child scope instance of the `scope` level.
    ///
    /// The level must be declared as a direct child of this scope's level.
    /// The child sees every binding of its ancestors:
    ///
    /// - Bindings owned by an ancestor level are shared with the ancestor instance.
    /// - Bindings owned by the child level are memoized in the child and dropped with it.
    ///
    /// A parent may have any number of live children; closing the parent closes them.
    pub fn create_scope(&self, scope: impl Into<ScopeTag>) -> Result<Container, Error> {
        let scope = scope.into();
        self.inner.ensure_active()?;

        let registry = &self.inner.registry;
        if !registry.scopes.contains(&scope) {
            return Err(Error::UnknownScope(scope));
        }
        if registry.scopes.parent_of(&scope) != Some(self.tag()) {
            return Err(Error::InvalidChildScope {
                parent: self.tag().clone(),
                child: scope,
            });
        }

        let child = Arc::new(ScopeInner::new(scope, registry.clone(), Some(self.clone())));
        self.inner.add_child(&child);
        if self.is_closed() {
            child.shutdown();
            return Err(Error::ScopeClosed(self.tag().clone()));
        }
        child.activate();

        #[cfg(feature = "tracing")]
        tracing::debug!(scope = %child.tag, parent = %self.tag(), "scope opened");

        Ok(Container { inner: child })
    }

    /// Closes the scope and all of its live children.
    ///
    /// Disposal hooks run in reverse creation order, then the close listeners run
    /// and memoized instances are released. Closing twice is a no-op.
    #[inline]
    pub fn close(&self) {
        self.inner.shutdown();
    }

    /// Registers a listener invoked when the scope closes
    pub fn on_close<F>(&self, listener: F) -> Result<(), Error>
    where
        F: FnOnce() + Send + 'static
    {
        self.inner.add_listener(Box::new(listener))
    }

    /// Creates a handle that does not keep the scope alive
    #[inline]
    pub fn downgrade(&self) -> WeakContainer {
        WeakContainer {
            inner: Arc::downgrade(&self.inner),
            tag: self.tag().clone(),
        }
    }

    /// Resolves a service and returns a cloned instance.
    /// `T` must implement [`Clone`] otherwise use [`Container::resolve_shared`] method
    /// that returns a shared pointer.
    #[inline]
    pub fn resolve<T: Send + Sync + Clone + 'static>(&self) -> Result<T, Error> {
        self.resolve_shared::<T>()
            .map(|s| s.as_ref().clone())
    }

    /// Resolves a service and returns a shared pointer
    #[inline]
    pub fn resolve_shared<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        self.resolve_dyn(&Key::of::<T>())
            .and_then(Self::downcast)
    }

    /// Resolves a service, or returns `None` if no binding for it is reachable
    pub fn try_resolve_shared<T: Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>, Error> {
        if self.contains::<T>() {
            self.resolve_shared::<T>().map(Some)
        } else {
            self.inner.ensure_active().map(|_| None)
        }
    }

    /// Resolves a service by its [`Key`].
    ///
    /// The binding is resolved in the nearest scope instance, from this one up to
    /// the root, whose level binds the key. Its dependencies resolve from there too.
    pub fn resolve_dyn(&self, key: &Key) -> Result<Arc<dyn Any + Send + Sync>, Error> {
        self.inner.ensure_active()?;

        let mut scope = self;
        loop {
            if let Some(entry) = scope.inner.entry(key) {
                scope.inner.ensure_active()?;
                return scope.inner.resolve_entry(scope, entry);
            }
            match scope.parent() {
                Some(parent) => scope = parent,
                None => break,
            }
        }

        Err(Error::MissingBinding {
            key: Name::Borrowed(key.name()),
            scope: self.tag().clone(),
        })
    }

    /// Returns `true` if a binding for `T` is reachable from this scope
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        let key = Key::of::<T>();
        std::iter::successors(Some(self), |scope| scope.parent())
            .any(|scope| scope.inner.entry(&key).is_some())
    }

    #[inline]
    fn downcast<T: Send + Sync + 'static>(instance: ArcService) -> Result<Arc<T>, Error> {
        instance
            .downcast::<T>()
            .map_err(|_| Error::ResolveFailed(std::any::type_name::<T>()))
    }
}

/// A handle to a scope instance that does not keep it alive
#[derive(Clone)]
pub struct WeakContainer {
    inner: Weak<ScopeInner>,
    tag: ScopeTag,
}

impl Debug for WeakContainer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakContainer")
            .field("scope", &self.tag)
            .finish_non_exhaustive()
    }
}

impl WeakContainer {
    /// Returns the scope level of the referenced scope instance
    #[inline]
    pub fn tag(&self) -> &ScopeTag {
        &self.tag
    }

    /// Returns a strong handle, or [`Error::ScopeClosed`] if the scope is gone
    #[inline]
    pub fn upgrade(&self) -> Result<Container, Error> {
        self.inner
            .upgrade()
            .map(|inner| Container { inner })
            .ok_or_else(|| Error::ScopeClosed(self.tag.clone()))
    }
}
