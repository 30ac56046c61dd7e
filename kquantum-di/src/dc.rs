//! Extractors for Dependency Injection

use crate::{
    Container, FromContainer, Key, WeakContainer,
    error::Error,
    graph::Dependency,
};
use std::{
    fmt::{self, Debug, Formatter},
    ops::Deref,
    sync::{Arc, OnceLock},
};

/// `Dc` stands for Dependency Container.
///
/// This struct wraps an injectable type `T` that is **shared** with every other
/// consumer in the owning scope through an [`Arc`].
///
/// # Example
/// ```
/// use kquantum_di::{ContainerBuilder, Dc};
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// #[derive(Default)]
/// struct ProgressService {
///     xp: AtomicU32,
/// }
///
/// struct HomeViewModel {
///     progress: Dc<ProgressService>,
/// }
///
/// let mut builder = ContainerBuilder::new();
/// builder.register_singleton(ProgressService::default());
/// builder.register_transient_factory(kquantum_di::ScopeTag::ROOT, |progress: Dc<ProgressService>| {
///     Ok(HomeViewModel { progress })
/// });
///
/// let root = builder.build().unwrap();
/// let vm = root.resolve_shared::<HomeViewModel>().unwrap();
/// vm.progress.xp.fetch_add(10, Ordering::Relaxed);
///
/// let progress = root.resolve_shared::<ProgressService>().unwrap();
/// assert_eq!(progress.xp.load(Ordering::Relaxed), 10);
/// ```
pub struct Dc<T: Send + Sync>(Arc<T>);

impl<T: Send + Sync> Clone for Dc<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Send + Sync + Debug> Debug for Dc<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dc").field(&self.0).finish()
    }
}

impl<T: Send + Sync> Deref for Dc<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: Send + Sync> Dc<T> {
    /// Unwraps the inner [`Arc`]
    #[inline]
    pub fn into_inner(self) -> Arc<T> {
        self.0
    }

    /// Returns `true` if both point to the same instance
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<T: Send + Sync + Clone> Dc<T> {
    /// Clones and returns the inner `T`.
    ///
    /// Equivalent to calling [`Clone::clone`] on the inner `T`.
    #[inline]
    pub fn cloned(&self) -> T {
        self.0.as_ref().clone()
    }
}

impl<T: Send + Sync + 'static> FromContainer for Dc<T> {
    #[inline]
    fn from_container(container: &Container) -> Result<Self, Error> {
        container
            .resolve_shared::<T>()
            .map(Self)
    }

    #[inline]
    fn dependencies(deps: &mut Vec<Dependency>) {
        deps.push(Dependency::new(Key::of::<T>()));
    }
}

/// A dependency resolved on first [`Lazy::get`] rather than during construction.
///
/// Mirrors a provider injection: the dependency must be bound, but it is not
/// followed when the graph is checked for cycles, so two services may refer to
/// each other as long as one side is lazy. It holds the owning scope weakly, so
/// `get` fails with [`Error::ScopeClosed`] once that scope is gone.
pub struct Lazy<T: Send + Sync> {
    scope: WeakContainer,
    cell: OnceLock<Arc<T>>,
}

impl<T: Send + Sync> Debug for Lazy<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("scope", self.scope.tag())
            .field("resolved", &self.cell.get().is_some())
            .finish()
    }
}

impl<T: Send + Sync + 'static> Lazy<T> {
    /// Resolves the dependency once and returns the shared instance
    pub fn get(&self) -> Result<Arc<T>, Error> {
        if let Some(instance) = self.cell.get() {
            return Ok(instance.clone());
        }
        let instance = self.scope
            .upgrade()?
            .resolve_shared::<T>()?;
        Ok(self.cell.get_or_init(|| instance).clone())
    }
}

impl<T: Send + Sync + 'static> FromContainer for Lazy<T> {
    #[inline]
    fn from_container(container: &Container) -> Result<Self, Error> {
        Ok(Self {
            scope: container.downgrade(),
            cell: OnceLock::new(),
        })
    }

    #[inline]
    fn dependencies(deps: &mut Vec<Dependency>) {
        deps.push(Dependency::deferred(Key::of::<T>()));
    }
}

#[cfg(test)]
mod tests {
    use super::{Dc, Lazy};
    use crate::{Container, ContainerBuilder, FromContainer, error::Error};
    use std::sync::Arc;

    #[derive(Debug, Clone, Copy)]
    struct X(i32);

    #[derive(Debug, Clone, Copy)]
    struct Y(i32);

    #[derive(Debug, Clone, Copy)]
    struct Point(X, Y);

    #[test]
    fn it_resolves_dc_by_injection() {
        let mut container = ContainerBuilder::new();
        container.register_transient_factory(crate::ScopeTag::ROOT, || X(1));
        container.register_transient_factory(crate::ScopeTag::ROOT, || Y(2));
        container.register_transient_factory(crate::ScopeTag::ROOT, |x: Dc<X>, y: Dc<Y>| Ok(Point(*x, *y)));

        let container = container.build().unwrap();

        let point = Dc::<Point>::from_container(&container).unwrap();

        assert_eq!((*point).0.0, 1);
        assert_eq!(point.1.0, 2);
    }

    #[test]
    fn it_shares_dc_instances() {
        let mut container = ContainerBuilder::new();
        container.register_singleton(X(1));

        let container = container.build().unwrap();

        let a = Dc::<X>::from_container(&container).unwrap();
        let b = Dc::<X>::from_container(&container).unwrap();

        assert!(Dc::ptr_eq(&a, &b));
        assert_eq!(a.cloned().0, 1);
    }

    struct AuthService {
        billing: Lazy<BillingService>,
    }

    struct BillingService {
        auth: Dc<AuthService>,
    }

    fn mutual_container() -> Container {
        let mut container = ContainerBuilder::new();
        container.register_singleton_factory(|billing: Lazy<BillingService>| Ok(AuthService { billing }));
        container.register_singleton_factory(|auth: Dc<AuthService>| Ok(BillingService { auth }));
        container.build().unwrap()
    }

    #[test]
    fn it_breaks_cycles_with_lazy() {
        let container = mutual_container();

        let auth = container.resolve_shared::<AuthService>().unwrap();
        let billing = auth.billing.get().unwrap();

        assert!(Arc::ptr_eq(&billing.auth.clone().into_inner(), &auth));
        assert!(Arc::ptr_eq(&auth.billing.get().unwrap(), &billing));
    }

    #[test]
    fn it_fails_lazy_after_scope_is_gone() {
        let container = mutual_container();
        let auth = container.resolve_shared::<AuthService>().unwrap();

        drop(container);

        assert!(matches!(auth.billing.get(), Err(Error::ScopeClosed(_))));
    }
}
