//! Scope levels of the application, from the process-wide root down to single views
//!
//! ```text
//! singleton
//! ├── activity_retained
//! │   ├── activity
//! │   │   ├── fragment
//! │   │   │   └── view_with_fragment
//! │   │   └── view
//! │   └── view_model
//! └── service
//! ```

use kquantum_di::{ContainerBuilder, ScopeTag};

/// The process-wide root scope
pub const SINGLETON: ScopeTag = ScopeTag::ROOT;

/// Survives configuration changes of an activity
pub const ACTIVITY_RETAINED: ScopeTag = ScopeTag::new("activity_retained");

/// One activity instance
pub const ACTIVITY: ScopeTag = ScopeTag::new("activity");

/// One fragment instance
pub const FRAGMENT: ScopeTag = ScopeTag::new("fragment");

/// A view owned directly by an activity
pub const VIEW: ScopeTag = ScopeTag::new("view");

/// A view owned by a fragment
pub const VIEW_WITH_FRAGMENT: ScopeTag = ScopeTag::new("view_with_fragment");

/// One view-model instance
pub const VIEW_MODEL: ScopeTag = ScopeTag::new("view_model");

/// One background service instance
pub const SERVICE: ScopeTag = ScopeTag::new("service");

/// Every declared `(scope, parent)` pair
pub const HIERARCHY: [(ScopeTag, ScopeTag); 7] = [
    (ACTIVITY_RETAINED, SINGLETON),
    (ACTIVITY, ACTIVITY_RETAINED),
    (FRAGMENT, ACTIVITY),
    (VIEW_WITH_FRAGMENT, FRAGMENT),
    (VIEW, ACTIVITY),
    (VIEW_MODEL, ACTIVITY_RETAINED),
    (SERVICE, SINGLETON),
];

pub(crate) fn declare(builder: &mut ContainerBuilder) {
    for (scope, parent) in HIERARCHY {
        builder.add_scope(scope, parent);
    }
}
