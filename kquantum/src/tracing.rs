//! Tools for tracing, logging and observability

use crate::App;
use kquantum_di::ScopeTag;
use tracing::{Span, trace_span};

/// Represents a tracing configuration
#[derive(Debug, Clone, Copy)]
pub struct TracingConfig {
    /// Specifies whether every child scope gets its own [`Span`]
    ///
    /// Default: `true`
    scope_spans: bool,

    /// Specifies whether scope spans record the parent scope level
    ///
    /// Default: `false`
    include_parent: bool,
}

impl Default for TracingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            scope_spans: true,
            include_parent: false,
        }
    }
}

impl TracingConfig {
    /// Creates a default tracing configuration
    ///
    /// Defaults:
    /// - scope_spans: `true`
    /// - include_parent: `false`
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables per-scope spans
    pub fn without_scope_spans(mut self) -> Self {
        self.scope_spans = false;
        self
    }

    /// Configures scope spans to record the parent scope level
    ///
    /// Default: `false`
    pub fn with_parent(mut self) -> Self {
        self.include_parent = true;
        self
    }

    /// Opens the span of a child scope, if scope spans are enabled
    pub(crate) fn scope_span(&self, scope: &ScopeTag, parent: &ScopeTag) -> Option<Span> {
        if !self.scope_spans {
            return None;
        }
        let span = if self.include_parent {
            trace_span!("scope", scope = %scope, parent = %parent)
        } else {
            trace_span!("scope", scope = %scope)
        };
        Some(span)
    }
}

impl App {
    /// Configures the application with the default Tracing configurations
    ///
    /// Defaults:
    /// - scope_spans: `true`
    /// - include_parent: `false`
    pub fn with_default_tracing(mut self) -> Self {
        self.tracing_config = Some(TracingConfig::default());
        self
    }

    /// Configures the application with specific Tracing configurations.
    ///
    /// If tracing was already preconfigured, it does not overwrite it
    /// ```no_run
    /// use kquantum::{App, AppConfig, tracing::TracingConfig};
    ///
    /// let app = App::new(AppConfig::default())
    ///     .set_tracing(TracingConfig::new().with_parent())
    ///     .with_tracing(|config| config.without_scope_spans()); // include_parent remains true
    /// ```
    pub fn with_tracing<T>(mut self, config: T) -> Self
    where
        T: FnOnce(TracingConfig) -> TracingConfig
    {
        self.tracing_config = Some(config(self.tracing_config.unwrap_or_default()));
        self
    }

    /// Configures the application with specific Tracing configurations
    pub fn set_tracing(mut self, config: TracingConfig) -> Self {
        self.tracing_config = Some(config);
        self
    }
}
