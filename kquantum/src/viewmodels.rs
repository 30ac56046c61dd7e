//! View models, one instance per [`VIEW_MODEL`] scope
//!
//! View models are resolved either by type or by their simple type name
//! through the [`ViewModelMap`].

use crate::{
    scopes::VIEW_MODEL,
    services::{
        AchievementService, AuthService, BillingService, LearningService,
        ProgressService, QuantumBridgeService,
    },
};
use indexmap::IndexMap;
use kquantum_di::{ContainerBuilder, Dc, Inject, Key};

/// Achievements screen
#[derive(Inject)]
pub struct AchievementViewModel {
    /// Unlocked achievements
    pub achievements: Dc<AchievementService>,
}

/// Login and sign-up screens
#[derive(Inject)]
pub struct AuthViewModel {
    /// Sign-in state
    pub auth: Dc<AuthService>,
}

/// Quantum hardware bridge screen
#[derive(Inject)]
pub struct BridgeViewModel {
    /// Bridge session
    pub bridge: Dc<QuantumBridgeService>,
}

/// Explore screen
#[derive(Inject)]
pub struct ExploreViewModel;

/// Home screen
#[derive(Debug, Inject)]
pub struct HomeViewModel {
    /// Sign-in state
    pub auth: Dc<AuthService>,
    /// Experience points
    pub progress: Dc<ProgressService>,
    /// Learning tracks
    pub learning: Dc<LearningService>,
}

/// Learning track screen
#[derive(Inject)]
pub struct LearnViewModel {
    /// Learning tracks
    pub learning: Dc<LearningService>,
    /// Experience points
    pub progress: Dc<ProgressService>,
}

/// Practice screen
#[derive(Inject)]
pub struct PracticeViewModel {
    /// Learning tracks
    pub learning: Dc<LearningService>,
    /// Experience points
    pub progress: Dc<ProgressService>,
}

/// Profile screen
#[derive(Inject)]
pub struct ProfileViewModel {
    /// Sign-in state
    pub auth: Dc<AuthService>,
    /// Experience points
    pub progress: Dc<ProgressService>,
    /// Unlocked achievements
    pub achievements: Dc<AchievementService>,
    /// Subscription state
    pub billing: Dc<BillingService>,
}

/// Subscription screen
#[derive(Inject)]
pub struct SubscriptionViewModel {
    /// Subscription state
    pub billing: Dc<BillingService>,
}

/// Maps simple view-model type names to their keys
#[derive(Debug, Default, Clone)]
pub struct ViewModelMap {
    keys: IndexMap<&'static str, Key>,
}

impl ViewModelMap {
    /// Returns the key of the view model named `name`
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Key> {
        self.keys.get(name)
    }

    /// Iterates over the view-model names in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.keys.keys().copied()
    }

    /// Number of registered view models
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if no view model is registered
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub(crate) fn insert<T: 'static>(&mut self) {
        let key = Key::of::<T>();
        self.keys.insert(key.short_name(), key);
    }
}

/// Registers every view model in [`VIEW_MODEL`] and records its name
pub(crate) fn register(builder: &mut ContainerBuilder, map: &mut ViewModelMap) {
    fn add<T: Inject + 'static>(builder: &mut ContainerBuilder, map: &mut ViewModelMap) {
        builder.register_scoped::<T>(VIEW_MODEL);
        map.insert::<T>();
    }

    add::<AchievementViewModel>(builder, map);
    add::<AuthViewModel>(builder, map);
    add::<BridgeViewModel>(builder, map);
    add::<ExploreViewModel>(builder, map);
    add::<HomeViewModel>(builder, map);
    add::<LearnViewModel>(builder, map);
    add::<PracticeViewModel>(builder, map);
    add::<ProfileViewModel>(builder, map);
    add::<SubscriptionViewModel>(builder, map);
}
