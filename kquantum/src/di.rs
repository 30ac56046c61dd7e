//! Tools for Dependency Injection

pub use kquantum_di::{
    Container,
    ContainerBuilder,
    Dc,
    GraphManifest,
    Inject,
    Key,
    Lazy,
    ScopeTag,
    Violation,
};

pub mod error {
    //! Dependency injection errors
    pub use kquantum_di::error::Error;
}
