//! Generic factory for resolving types

use super::Error;

/// A trait that describes a generic factory function
/// that can resolve objects registered in DI container
///
/// Closures without arguments return the service itself;
/// closures taking [`FromContainer`](super::FromContainer) arguments return `Result<T, Error>`.
pub trait GenericFactory<Args>: Send + Sync + 'static {
    /// A type of object that will be resolved
    type Output;

    /// Calls a generic function and returns either resolved object or error
    fn call(&self, args: Args) -> Result<Self::Output, Error>;
}

impl<F, R> GenericFactory<()> for F
where
    F: Fn() -> R + Send + Sync + 'static
{
    type Output = R;

    #[inline]
    fn call(&self, _: ()) -> Result<Self::Output, Error> {
        Ok(self())
    }
}

macro_rules! define_generic_factory ({ $($param:ident)* } => {
    impl<F, R, $($param,)*> GenericFactory<($($param,)*)> for F
    where
        F: Fn($($param),*) -> Result<R, Error> + Send + Sync + 'static,
    {
        type Output = R;

        #[inline]
        #[allow(non_snake_case)]
        fn call(&self, ($($param,)*): ($($param,)*)) -> Result<Self::Output, Error> {
            (self)($($param,)*)
        }
    }
});

define_generic_factory! { T1 }
define_generic_factory! { T1 T2 }
define_generic_factory! { T1 T2 T3 }
define_generic_factory! { T1 T2 T3 T4 }
define_generic_factory! { T1 T2 T3 T4 T5 }
define_generic_factory! { T1 T2 T3 T4 T5 T6 }
define_generic_factory! { T1 T2 T3 T4 T5 T6 T7 }
define_generic_factory! { T1 T2 T3 T4 T5 T6 T7 T8 }
