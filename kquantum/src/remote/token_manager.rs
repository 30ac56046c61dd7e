//! Credential storage

use crate::context::AppContext;
use kquantum_di::Dc;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

const PREFS_NAME: &str = "kquantum_secure_prefs";

#[derive(Debug, Default)]
struct Credentials {
    token: Option<String>,
    user_id: Option<String>,
    username: Option<String>,
    email: Option<String>,
    is_admin: bool,
}

/// Keeps the auth token and the signed-in user
#[derive(Debug)]
pub struct TokenManager {
    store: String,
    credentials: RwLock<Credentials>,
}

impl TokenManager {
    /// Creates an empty credential store
    pub fn new(context: Dc<AppContext>) -> Self {
        Self {
            store: context.storage_name(PREFS_NAME),
            credentials: RwLock::default(),
        }
    }

    /// Name of the backing store
    #[inline]
    pub fn store(&self) -> &str {
        &self.store
    }

    /// Saves the auth token
    pub fn save_token(&self, token: impl Into<String>) {
        self.write().token = Some(token.into());
    }

    /// Returns the auth token, if any
    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    /// Forgets the auth token
    pub fn clear_token(&self) {
        self.write().token = None;
    }

    /// Returns `true` if an auth token is stored
    pub fn has_token(&self) -> bool {
        self.read().token.is_some()
    }

    /// Saves the signed-in user
    pub fn save_user_info(&self, user_id: impl Into<String>, username: impl Into<String>, email: impl Into<String>) {
        let mut credentials = self.write();
        credentials.user_id = Some(user_id.into());
        credentials.username = Some(username.into());
        credentials.email = Some(email.into());
    }

    /// Id of the signed-in user
    pub fn user_id(&self) -> Option<String> {
        self.read().user_id.clone()
    }

    /// Name of the signed-in user
    pub fn username(&self) -> Option<String> {
        self.read().username.clone()
    }

    /// Email of the signed-in user
    pub fn email(&self) -> Option<String> {
        self.read().email.clone()
    }

    /// Marks the signed-in user as an administrator
    pub fn set_admin(&self, is_admin: bool) {
        self.write().is_admin = is_admin;
    }

    /// Returns `true` if the signed-in user is an administrator
    pub fn is_admin(&self) -> bool {
        self.read().is_admin
    }

    /// Forgets everything
    pub fn clear_all(&self) {
        *self.write() = Credentials::default();
    }

    fn read(&self) -> RwLockReadGuard<'_, Credentials> {
        self.credentials.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Credentials> {
        self.credentials.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::TokenManager;
    use crate::{config::AppConfig, context::AppContext};
    use kquantum_di::{ContainerBuilder, Dc, FromContainer};

    fn tokens() -> TokenManager {
        let mut builder = ContainerBuilder::new();
        builder.register_singleton(AppContext::new(AppConfig::default()));
        let container = builder.build().unwrap();
        TokenManager::new(Dc::from_container(&container).unwrap())
    }

    #[test]
    fn it_stores_and_clears_credentials() {
        let tokens = tokens();
        tokens.save_token("abc");
        tokens.save_user_info("42", "alice", "alice@example.com");
        tokens.set_admin(true);

        assert!(tokens.has_token());
        assert_eq!(tokens.username().as_deref(), Some("alice"));
        assert_eq!(tokens.store(), "com.kquantum.nativeapp.kquantum_secure_prefs");

        tokens.clear_token();
        assert!(!tokens.has_token());
        assert!(tokens.is_admin());

        tokens.clear_all();
        assert!(!tokens.is_admin());
        assert!(tokens.email().is_none());
    }
}
