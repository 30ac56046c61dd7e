//! Application services, one instance per process
//!
//! Their business logic lives behind the backend API; here they only carry
//! the dependencies and the state the view models observe.

use crate::{
    context::AppContext,
    remote::{ApiClient, TokenManager},
};
use kquantum_di::{ContainerBuilder, Dc};
use std::sync::atomic::{AtomicBool, Ordering};

/// Sign-in state of the user
#[derive(Debug)]
pub struct AuthService {
    api: Dc<ApiClient>,
    tokens: Dc<TokenManager>,
    logged_in: AtomicBool,
}

impl AuthService {
    /// Creates the service, restoring the sign-in state from stored credentials
    pub fn new(api: Dc<ApiClient>, tokens: Dc<TokenManager>) -> Self {
        let logged_in = tokens.has_token() || tokens.is_admin();
        Self {
            api,
            tokens,
            logged_in: AtomicBool::new(logged_in),
        }
    }

    /// Returns `true` if a user is signed in
    #[inline]
    pub fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::Acquire)
    }

    /// Stores the credentials returned by the backend
    pub fn sign_in(&self, token: impl Into<String>) {
        self.tokens.save_token(token);
        self.logged_in.store(true, Ordering::Release);
    }

    /// Forgets all credentials
    pub fn logout(&self) {
        self.tokens.clear_all();
        self.logged_in.store(false, Ordering::Release);
    }

    /// URL of the login endpoint
    pub fn login_endpoint(&self) -> String {
        self.api.endpoint("api/v1/auth/login")
    }
}

/// Subscriptions and purchases
#[derive(Debug)]
pub struct BillingService {
    context: Dc<AppContext>,
    api: Dc<ApiClient>,
}

impl BillingService {
    /// Creates the service
    pub fn new(context: Dc<AppContext>, api: Dc<ApiClient>) -> Self {
        Self { context, api }
    }

    /// URL of the subscription status endpoint
    pub fn subscription_status_endpoint(&self) -> String {
        self.api.endpoint("api/v1/payment/subscription/status")
    }

    /// Name of the local purchase store
    pub fn store(&self) -> String {
        self.context.storage_name("billing_prefs")
    }
}

/// Connection to quantum hardware
#[derive(Debug, Default)]
pub struct QuantumBridgeService {
    connected: AtomicBool,
}

impl QuantumBridgeService {
    /// Returns `true` while a bridge session is open
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Opens or closes the bridge session
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    /// Closes the bridge session
    pub fn disconnect(&self) {
        self.set_connected(false);
    }
}

/// Experience points and streaks
#[derive(Debug)]
pub struct ProgressService {
    context: Dc<AppContext>,
    api: Dc<ApiClient>,
}

impl ProgressService {
    /// Creates the service
    pub fn new(context: Dc<AppContext>, api: Dc<ApiClient>) -> Self {
        Self { context, api }
    }

    /// URL of the experience points endpoint
    pub fn xp_endpoint(&self) -> String {
        self.api.endpoint("api/v1/progress/xp")
    }

    /// Name of the local progress store
    pub fn store(&self) -> String {
        self.context.storage_name("progress_prefs")
    }
}

/// Learning tracks and levels
#[derive(Debug)]
pub struct LearningService {
    api: Dc<ApiClient>,
}

impl LearningService {
    /// Creates the service
    pub fn new(api: Dc<ApiClient>) -> Self {
        Self { api }
    }

    /// URL listing the levels of a track
    pub fn levels_endpoint(&self, track: &str) -> String {
        self.api.endpoint(&format!("api/v1/learning/levels/{track}"))
    }
}

/// Achievements unlocked by the user
#[derive(Debug)]
pub struct AchievementService {
    context: Dc<AppContext>,
    api: Dc<ApiClient>,
}

impl AchievementService {
    /// Creates the service
    pub fn new(context: Dc<AppContext>, api: Dc<ApiClient>) -> Self {
        Self { context, api }
    }

    /// URL unlocking an achievement
    pub fn unlock_endpoint(&self, id: &str) -> String {
        self.api.endpoint(&format!("api/v1/achievements/{id}/unlock"))
    }

    /// Name of the local achievement store
    pub fn store(&self) -> String {
        self.context.storage_name("achievement_prefs")
    }
}

/// Registers the process-wide services
pub(crate) fn register(builder: &mut ContainerBuilder) {
    builder.register_singleton_factory(|context: Dc<AppContext>| Ok(TokenManager::new(context)));
    builder.register_singleton_factory(|tokens: Dc<TokenManager>, context: Dc<AppContext>| {
        Ok(ApiClient::new(tokens, context))
    });
    builder.register_singleton_factory(|api: Dc<ApiClient>, tokens: Dc<TokenManager>| {
        Ok(AuthService::new(api, tokens))
    });
    builder.register_singleton_factory(|context: Dc<AppContext>, api: Dc<ApiClient>| {
        Ok(BillingService::new(context, api))
    });
    builder
        .register_singleton_inject::<QuantumBridgeService>()
        .on_dispose(QuantumBridgeService::disconnect);
    builder.register_singleton_factory(|context: Dc<AppContext>, api: Dc<ApiClient>| {
        Ok(ProgressService::new(context, api))
    });
    builder.register_singleton_factory(|api: Dc<ApiClient>| Ok(LearningService::new(api)));
    builder.register_singleton_factory(|context: Dc<AppContext>, api: Dc<ApiClient>| {
        Ok(AchievementService::new(context, api))
    });
}
