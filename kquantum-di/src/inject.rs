//! Utilities to inject and resolve dependencies

use crate::{FromContainer, error::Error};

/// A trait that adds the ability to construct a type from its dependencies
/// when resolving it from the DI container
///
/// If there is no need to inject other dependencies, the `struct` must implement the `Default` trait
///
/// # Example
/// ```
/// use kquantum_di::{ContainerBuilder, ScopeTag};
///
/// #[derive(Default)]
/// struct ExploreViewModel;
///
/// const VIEW_MODEL: ScopeTag = ScopeTag::new("view_model");
///
/// let mut builder = ContainerBuilder::new();
/// builder.add_scope(VIEW_MODEL, ScopeTag::ROOT);
/// builder.register_scoped::<ExploreViewModel>(VIEW_MODEL);
///
/// let root = builder.build().unwrap();
/// let scope = root.create_scope(VIEW_MODEL).unwrap();
/// assert!(scope.resolve_shared::<ExploreViewModel>().is_ok());
/// ```
///
/// If it's required to construct a `struct` from other dependencies, the `Inject` can be implemented manually
/// (or derived with the `macros` feature)
///
/// # Example
/// ```
/// use kquantum_di::{ContainerBuilder, Dc, Inject, error::Error};
///
/// #[derive(Default)]
/// struct LearningService;
///
/// struct LearnViewModel {
///     learning: Dc<LearningService>,
/// }
///
/// impl Inject for LearnViewModel {
///     type Deps = (Dc<LearningService>,);
///
///     fn inject((learning,): Self::Deps) -> Result<Self, Error> {
///         Ok(Self { learning })
///     }
/// }
///
/// let mut builder = ContainerBuilder::new();
/// builder.register_singleton_inject::<LearningService>();
/// builder.register_transient::<LearnViewModel>(kquantum_di::ScopeTag::ROOT);
///
/// let root = builder.build().unwrap();
/// let vm = root.resolve_shared::<LearnViewModel>().unwrap();
/// let shared = root.resolve_shared::<LearningService>().unwrap();
/// assert!(std::sync::Arc::ptr_eq(&vm.learning.clone().into_inner(), &shared));
/// ```
pub trait Inject: Sized + Send + Sync {
    /// Extractors for the dependencies, usually a tuple
    type Deps: FromContainer;

    /// Constructs `Self` from the resolved dependencies
    fn inject(deps: Self::Deps) -> Result<Self, Error>;
}

impl<T: Default + Send + Sync> Inject for T {
    type Deps = ();

    #[inline]
    fn inject(_: ()) -> Result<Self, Error> {
        Ok(Self::default())
    }
}
