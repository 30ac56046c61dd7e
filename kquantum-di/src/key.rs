//! Type keys and scope tags

use std::{
    any::{TypeId, type_name},
    borrow::Cow,
    fmt::{self, Debug, Display, Formatter},
    hash::{Hash, Hasher},
};

/// Identifies a service type inside the DI container.
///
/// Two keys are equal when they were created for the same type;
/// the type name is only carried along for diagnostics.
#[derive(Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Creates a key for `T`
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] of the keyed type
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Returns the fully qualified type name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the type name without its module path and generic arguments,
    /// e.g. `HomeViewModel` for `kquantum::viewmodels::HomeViewModel`
    pub fn short_name(&self) -> &'static str {
        let base = self.name
            .split('<')
            .next()
            .unwrap_or(self.name);
        base.rsplit("::")
            .next()
            .unwrap_or(base)
    }
}

impl PartialEq for Key {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl Hash for Key {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Debug for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.name).finish()
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Names a scope level, e.g. `singleton`, `activity` or `view_model`.
///
/// Scope levels form a tree rooted at [`ScopeTag::ROOT`]; every binding is owned by
/// exactly one level and every scope instance is opened for exactly one level.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "manifest", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "manifest", serde(transparent))]
pub struct ScopeTag(Cow<'static, str>);

impl ScopeTag {
    /// The root scope level, alive for the whole lifetime of the container
    pub const ROOT: ScopeTag = ScopeTag::new("singleton");

    /// Creates a scope tag from a static name
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Returns the name of the scope level
    #[inline]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this is the [`ScopeTag::ROOT`] level
    #[inline]
    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }
}

impl From<&'static str> for ScopeTag {
    #[inline]
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ScopeTag {
    #[inline]
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl Debug for ScopeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScopeTag").field(&self.name()).finish()
    }
}

impl Display for ScopeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
