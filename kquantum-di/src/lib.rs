//! Tools for dependency injection
//!
//! A [`ContainerBuilder`] collects typed bindings, each owned by a scope level
//! ([`ScopeTag`]). [`ContainerBuilder::build`] validates the whole dependency graph
//! and produces the root [`Container`]; child scopes are opened from it with
//! [`Container::create_scope`].
//!
//! # Example
//! ```
//! use kquantum_di::{ContainerBuilder, Dc, ScopeTag};
//!
//! struct TokenManager;
//! struct ApiClient { tokens: Dc<TokenManager> }
//!
//! const SCREEN: ScopeTag = ScopeTag::new("screen");
//!
//! let mut builder = ContainerBuilder::new();
//! builder.add_scope(SCREEN, ScopeTag::ROOT);
//! builder.register_singleton_factory(|| TokenManager);
//! builder.register_singleton_factory(|tokens: Dc<TokenManager>| Ok(ApiClient { tokens }));
//!
//! let root = builder.build().unwrap();
//! let screen = root.create_scope(SCREEN).unwrap();
//!
//! let a = root.resolve_shared::<ApiClient>().unwrap();
//! let b = screen.resolve_shared::<ApiClient>().unwrap();
//! assert!(std::sync::Arc::ptr_eq(&a, &b));
//! ```

pub use crate::{
    container::{
        Container,
        ContainerBuilder,
        Lifetime,
        Registration,
        ScopeState,
        WeakContainer,
        factory::GenericFactory,
        from_container::FromContainer,
    },
    dc::{Dc, Lazy},
    graph::{Dependency, Violation},
    inject::Inject,
    key::{Key, ScopeTag},
};

#[cfg(feature = "manifest")]
pub use crate::graph::manifest::{BindingDecl, GraphManifest, ScopeDecl};

#[cfg(feature = "macros")]
pub use kquantum_macros::Inject;

pub mod error;
pub mod container;
pub mod dc;
pub mod graph;
pub mod inject;
pub mod key;
