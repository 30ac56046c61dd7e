//! Proc-Macros implementations for the K-Quantum dependency injection container
//!

#[cfg(feature = "di-derive")]
use {proc_macro::TokenStream, syn::parse_macro_input};

#[cfg(feature = "di-derive")]
mod di;

/// Implements the `Inject` trait for a struct whose fields are all extractors
/// (`Dc<T>`, `Lazy<T>`, `Container` or any other `FromContainer` type).
///
/// The fields become the dependencies of the type, in declaration order.
/// Named, tuple and unit structs are supported, with at most eight fields.
///
/// # Example
/// ```ignore
/// use kquantum_di::{Dc, Inject};
///
/// #[derive(Inject)]
/// struct LearnViewModel {
///     learning: Dc<LearningService>,
///     progress: Dc<ProgressService>,
/// }
///
/// // This expands to:
/// // impl Inject for LearnViewModel {
/// //     type Deps = (Dc<LearningService>, Dc<ProgressService>,);
/// //
/// //     fn inject((dep0, dep1,): Self::Deps) -> Result<Self, Error> {
/// //         Ok(Self { learning: dep0, progress: dep1 })
/// //     }
/// // }
/// ```
#[cfg(feature = "di-derive")]
#[proc_macro_derive(Inject)]
pub fn derive_inject(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);
    di::expand_inject(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
