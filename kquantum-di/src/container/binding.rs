//! Bindings and the immutable registry built from them

use super::{Container, Lifetime};
use crate::{
    Key, ScopeTag,
    error::Error,
    graph::{Declaration, Dependency, ScopeTree},
};
use std::{
    any::Any,
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

pub(crate) type ArcService = Arc<
    dyn Any
    + Send
    + Sync
>;

pub(crate) type ResolverFn = Arc<
    dyn Fn(&Container) -> Result<ArcService, Error>
    + Send
    + Sync
>;

pub(crate) type DisposeFn = Arc<
    dyn Fn(&ArcService)
    + Send
    + Sync
>;

pub(crate) enum Provider {
    Instance(ArcService),
    Factory(ResolverFn),
}

/// A construction recipe for one type in one scope level
pub(crate) struct Binding {
    pub(crate) key: Key,
    pub(crate) scope: ScopeTag,
    pub(crate) lifetime: Lifetime,
    pub(crate) dependencies: Vec<Dependency>,
    pub(crate) provider: Provider,
    pub(crate) disposer: Option<DisposeFn>,
}

impl Debug for Binding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("scope", &self.scope)
            .field("lifetime", &self.lifetime)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

impl Binding {
    #[inline]
    pub(crate) fn declaration(&self) -> Declaration<'_, Key> {
        Declaration {
            key: &self.key,
            scope: &self.scope,
            dependencies: &self.dependencies,
        }
    }

    #[inline]
    pub(crate) fn is_memoized(&self) -> bool {
        matches!(self.provider, Provider::Instance(_)) || self.lifetime == Lifetime::Scoped
    }
}

/// Validated bindings, indexed by scope level and key
#[derive(Debug)]
pub(crate) struct Registry {
    pub(crate) scopes: ScopeTree,
    pub(crate) bindings: Vec<Binding>,
    index: HashMap<ScopeTag, HashMap<Key, usize>>,
}

impl Registry {
    pub(crate) fn new(scopes: ScopeTree, bindings: Vec<Binding>) -> Self {
        let mut index: HashMap<ScopeTag, HashMap<Key, usize>> = HashMap::new();
        for (idx, binding) in bindings.iter().enumerate() {
            index
                .entry(binding.scope.clone())
                .or_default()
                .insert(binding.key, idx);
        }
        Self { scopes, bindings, index }
    }

    /// Bindings owned by the `scope` level
    #[inline]
    pub(crate) fn bindings_of(&self, scope: &ScopeTag) -> impl Iterator<Item = (&Key, &usize)> {
        self.index
            .get(scope)
            .into_iter()
            .flat_map(HashMap::iter)
    }
}
