//! Extractors for fetching data from DI container

use super::{Error, Container};
use crate::graph::Dependency;

/// A trait that defines how to extract the `Self` from DI container
pub trait FromContainer: Sized + Send + Sync {
    /// Extracts `Self` from DI container
    fn from_container(container: &Container) -> Result<Self, Error>;

    /// Appends the dependencies this extractor resolves.
    ///
    /// They are checked when the container is built. Extractors that resolve
    /// services dynamically (like [`Container`] itself) declare nothing.
    #[inline]
    fn dependencies(_deps: &mut Vec<Dependency>) {}
}

impl FromContainer for Container {
    #[inline]
    fn from_container(container: &Container) -> Result<Self, Error> {
        Ok(container.clone())
    }
}

impl FromContainer for () {
    #[inline]
    fn from_container(_: &Container) -> Result<Self, Error> {
        Ok(())
    }
}

macro_rules! define_generic_from_container {
    ($($T: ident),*) => {
        impl<$($T: FromContainer),+> FromContainer for ($($T,)+) {
            #[inline]
            #[allow(non_snake_case)]
            fn from_container(container: &Container) -> Result<Self, Error>{
                let tuple = (
                    $(
                    $T::from_container(container)?,
                    )*
                );
                Ok(tuple)
            }

            #[inline]
            fn dependencies(deps: &mut Vec<Dependency>) {
                $(
                $T::dependencies(deps);
                )*
            }
        }
    }
}

define_generic_from_container! { T1 }
define_generic_from_container! { T1, T2 }
define_generic_from_container! { T1, T2, T3 }
define_generic_from_container! { T1, T2, T3, T4 }
define_generic_from_container! { T1, T2, T3, T4, T5 }
define_generic_from_container! { T1, T2, T3, T4, T5, T6 }
define_generic_from_container! { T1, T2, T3, T4, T5, T6, T7 }
define_generic_from_container! { T1, T2, T3, T4, T5, T6, T7, T8 }

#[cfg(test)]
mod tests {
    use crate::{ContainerBuilder, Dc, Key, Lazy};
    use super::*;

    #[derive(Debug, Clone, Copy)]
    struct Dependency {
        x: i32
    }

    #[test]
    fn it_resolves_from_container() {
        let mut container = ContainerBuilder::new();
        container.register_singleton_factory(|| Dependency { x: 1 });

        let container = container.build().unwrap();

        let dependency = Dc::<Dependency>::from_container(&container).unwrap();

        assert_eq!(dependency.x, 1);
    }

    #[test]
    fn it_resolves_from_container_with_error() {
        let container = ContainerBuilder::new().build().unwrap();

        let err = Dc::<Dependency>::from_container(&container).unwrap_err();

        assert_eq!(err.to_string(), "Services Error: no binding for `kquantum_di::container::from_container::tests::Dependency` is reachable from scope `singleton`");
    }

    #[test]
    fn it_collects_tuple_dependencies_in_order() {
        let mut deps = Vec::new();

        <(Dc<Dependency>, Container, Lazy<i32>) as FromContainer>::dependencies(&mut deps);

        assert_eq!(deps, vec![
            crate::Dependency::new(Key::of::<Dependency>()),
            crate::Dependency::deferred(Key::of::<i32>()),
        ]);
    }
}
