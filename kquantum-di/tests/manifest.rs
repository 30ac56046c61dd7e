use kquantum_di::{ContainerBuilder, Dc, GraphManifest, Lifetime, ScopeTag, Violation};

const ACTIVITY_RETAINED: ScopeTag = ScopeTag::new("activity_retained");
const VIEW_MODEL: ScopeTag = ScopeTag::new("view_model");

struct TokenManager;

struct ApiClient {
    _tokens: Dc<TokenManager>,
}

#[derive(Default)]
struct SubscriptionViewModel;

fn builder() -> ContainerBuilder {
    let mut builder = ContainerBuilder::new();
    builder
        .add_scope(VIEW_MODEL, ACTIVITY_RETAINED)
        .add_scope(ACTIVITY_RETAINED, ScopeTag::ROOT);
    builder.register_singleton(TokenManager);
    builder.register_singleton_factory(|tokens: Dc<TokenManager>| Ok(ApiClient { _tokens: tokens }));
    builder.register_transient_default::<SubscriptionViewModel>(VIEW_MODEL);
    builder
}

#[test]
fn it_exports_builder_graph() {
    let manifest = builder().manifest();

    assert_eq!(manifest.scopes.len(), 2);
    assert_eq!(manifest.scopes[0].name, "activity_retained");
    assert_eq!(manifest.scopes[1].parent, "activity_retained");

    assert_eq!(manifest.bindings.len(), 3);
    assert!(manifest.bindings[1].key.ends_with("::ApiClient"));
    assert!(manifest.bindings[1].dependencies[0].ends_with("::TokenManager"));
    assert_eq!(manifest.bindings[2].scope, "view_model");
    assert_eq!(manifest.bindings[2].lifetime, Lifetime::Transient);
    assert!(manifest.validate().is_ok());
}

#[test]
fn it_round_trips_exported_graph_through_json() {
    let manifest = builder().manifest();

    let json = manifest.to_json().unwrap();
    let parsed = GraphManifest::from_json(&json).unwrap();

    assert_eq!(parsed, manifest);
}

#[test]
fn it_reports_broken_declarations() {
    let mut manifest = builder().manifest();
    manifest.bindings.remove(0);

    let err = manifest.validate().unwrap_err();

    assert!(matches!(
        err.violations(),
        [Violation::MissingDependency { dependency, .. }] if dependency.ends_with("::TokenManager")
    ));
}
