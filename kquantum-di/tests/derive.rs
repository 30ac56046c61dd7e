use kquantum_di::{ContainerBuilder, Dc, Dependency, FromContainer, Inject, Key, Lazy, ScopeTag};
use std::sync::Arc;

const VIEW_MODEL: ScopeTag = ScopeTag::new("view_model");

#[derive(Default)]
struct AuthService;

#[derive(Default)]
struct ProgressService;

#[derive(Default)]
struct LearningService;

#[derive(Inject)]
struct HomeViewModel {
    auth: Dc<AuthService>,
    progress: Dc<ProgressService>,
    learning: Lazy<LearningService>,
}

#[derive(Inject)]
struct BridgeViewModel(Dc<LearningService>);

#[derive(Inject)]
struct ExploreViewModel;

fn container() -> kquantum_di::Container {
    let mut builder = ContainerBuilder::new();
    builder.add_scope(VIEW_MODEL, ScopeTag::ROOT);
    builder.register_singleton_inject::<AuthService>();
    builder.register_singleton_inject::<ProgressService>();
    builder.register_singleton_inject::<LearningService>();
    builder.register_scoped::<HomeViewModel>(VIEW_MODEL);
    builder.register_scoped::<BridgeViewModel>(VIEW_MODEL);
    builder.register_scoped::<ExploreViewModel>(VIEW_MODEL);
    builder.build().unwrap()
}

#[test]
fn it_injects_named_fields() {
    let root = container();
    let scope = root.create_scope(VIEW_MODEL).unwrap();

    let vm = scope.resolve_shared::<HomeViewModel>().unwrap();

    let auth = root.resolve_shared::<AuthService>().unwrap();
    let learning = root.resolve_shared::<LearningService>().unwrap();
    assert!(Arc::ptr_eq(&vm.auth.clone().into_inner(), &auth));
    assert!(Arc::ptr_eq(&vm.learning.get().unwrap(), &learning));
    let _ = &vm.progress;
}

#[test]
fn it_injects_tuple_and_unit_structs() {
    let root = container();
    let scope = root.create_scope(VIEW_MODEL).unwrap();

    let bridge = scope.resolve_shared::<BridgeViewModel>().unwrap();
    let explore = scope.resolve_shared::<ExploreViewModel>();

    assert!(Arc::ptr_eq(&bridge.0.clone().into_inner(), &root.resolve_shared::<LearningService>().unwrap()));
    assert!(explore.is_ok());
}

#[test]
fn it_declares_field_dependencies_in_order() {
    let mut deps = Vec::new();

    <HomeViewModel as Inject>::Deps::dependencies(&mut deps);

    assert_eq!(deps, vec![
        Dependency::new(Key::of::<AuthService>()),
        Dependency::new(Key::of::<ProgressService>()),
        Dependency::deferred(Key::of::<LearningService>()),
    ]);
}
