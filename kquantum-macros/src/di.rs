//! Macros for dependency injection

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// Largest tuple that implements `FromContainer`
const MAX_DEPS: usize = 8;

/// Expands a derive-macro for Inject
pub(super) fn expand_inject(input: &syn::DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let syn::Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(name, "`Inject` can only be derived for structs"));
    };

    if data.fields.len() > MAX_DEPS {
        return Err(syn::Error::new_spanned(
            &data.fields,
            format!("`Inject` supports at most {MAX_DEPS} dependencies, found {}", data.fields.len()),
        ));
    }

    let types = data.fields.iter().map(|f| &f.ty);
    let deps = (0..data.fields.len())
        .map(|i| format_ident!("__dep{i}"))
        .collect::<Vec<_>>();

    let construct = match &data.fields {
        syn::Fields::Named(fields) => {
            let idents = fields.named.iter().map(|f| &f.ident);
            quote! { Self { #(#idents: #deps),* } }
        },
        syn::Fields::Unnamed(_) => quote! { Self(#(#deps),*) },
        syn::Fields::Unit => quote! { Self },
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::kquantum_di::Inject for #name #ty_generics #where_clause {
            type Deps = (#(#types,)*);

            #[inline]
            fn inject((#(#deps,)*): Self::Deps) -> ::core::result::Result<Self, ::kquantum_di::error::Error> {
                ::core::result::Result::Ok(#construct)
            }
        }
    })
}
