#![allow(missing_docs)]

use kquantum_di::{Container, ContainerBuilder, Dc, Inject, Lazy};

#[derive(Default)]
struct BillingService;

#[derive(Inject)]
struct SubscriptionViewModel {
    billing: Dc<BillingService>,
    scope: Container,
}

#[derive(Inject)]
struct ProfileViewModel(Lazy<BillingService>);

#[derive(Inject)]
struct ExploreViewModel;

fn main() {
    let mut builder = ContainerBuilder::new();
    builder.register_singleton_inject::<BillingService>();
    builder.register_singleton_inject::<SubscriptionViewModel>();
    builder.register_singleton_inject::<ProfileViewModel>();
    builder.register_singleton_inject::<ExploreViewModel>();
    let root = builder.build().unwrap();

    let vm = root.resolve_shared::<SubscriptionViewModel>().unwrap();
    let _ = (&vm.billing, vm.scope.tag());
    let _ = root.resolve_shared::<ProfileViewModel>().unwrap().0.get();
}
