//! # K-Quantum
//!
//! > Composition root of the K-Quantum application: scope levels, process-wide services
//! > and screen view models wired through a scoped dependency injection container.
//!
//! ## Scopes
//! ```text
//! singleton
//! ├── activity_retained
//! │   ├── view_model
//! │   └── activity
//! │       ├── fragment
//! │       │   └── view_with_fragment
//! │       └── view
//! └── service
//! ```
//!
//! ## Example
//! ```
//! use kquantum::{App, AppConfig, scopes::VIEW_MODEL, viewmodels::HomeViewModel};
//!
//! let app = App::new(AppConfig::default()).start().unwrap();
//!
//! let retained = app.activity_retained().unwrap();
//! let screen = retained.enter(VIEW_MODEL).unwrap();
//! let home = screen.resolve::<HomeViewModel>().unwrap();
//! assert!(!home.auth.is_logged_in());
//!
//! app.shutdown();
//! assert!(screen.is_closed());
//! ```

pub mod app;
pub mod config;
pub mod context;
pub mod di;
pub mod error;
pub mod remote;
pub mod scopes;
pub mod services;
pub mod tracing;
pub mod viewmodels;

pub use crate::{
    app::{ActivityRetainedLifecycle, App, Application, ScopeHandle},
    config::AppConfig,
    context::AppContext,
    error::Error,
    tracing::TracingConfig,
};
