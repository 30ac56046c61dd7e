//! Application-wide context handed to services that need it

use crate::config::AppConfig;

/// Identifier of the application package
pub const PACKAGE_NAME: &str = "com.kquantum.nativeapp";

/// The application context, bound as a pre-built singleton
#[derive(Debug, Clone)]
pub struct AppContext {
    config: AppConfig,
}

impl AppContext {
    /// Creates a context from a validated configuration
    #[inline]
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Returns the application configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns the name under which a service keeps its local state,
    /// e.g. `com.kquantum.nativeapp.achievement_prefs`
    pub fn storage_name(&self, store: &str) -> String {
        format!("{PACKAGE_NAME}.{store}")
    }
}
