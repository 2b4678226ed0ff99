use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

/// Builds the `WireSize` impl for a struct by folding `FIXED_SIZE` over its
/// fields in declaration order. A single `None` anywhere makes the whole
/// type dynamically sized.
pub fn derive_wire_size_impl(input: &DeriveInput) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(s) => &s.fields,
        Data::Enum(_) => {
            return quote! {
                #[automatically_derived]
                impl #impl_generics ::znode_codec::WireSize for #name #ty_generics #where_clause {
                    const FIXED_SIZE: Option<usize> = None;
                }
            };
        }
        Data::Union(_) => panic!("NetCodec cannot be derived for unions"),
    };

    let field_types: Vec<_> = match fields {
        Fields::Named(f) => f.named.iter().map(|f| f.ty.clone()).collect(),
        Fields::Unnamed(f) => f.unnamed.iter().map(|f| f.ty.clone()).collect(),
        Fields::Unit => Vec::new(),
    };

    let mut fixed_size_expr = quote! { Some(0usize) };
    for ty in &field_types {
        fixed_size_expr = quote! {
            match (<#ty as ::znode_codec::WireSize>::FIXED_SIZE, #fixed_size_expr) {
                (Some(a), Some(b)) => Some(a + b),
                _ => None,
            }
        };
    }

    let names: Vec<_> = field_accessors(fields);
    let encoded_len_body = if names.is_empty() {
        quote! { 0usize }
    } else {
        quote! { 0usize #( + ::znode_codec::WireSize::encoded_len(#names) )* }
    };

    quote! {
        #[automatically_derived]
        impl #impl_generics ::znode_codec::WireSize for #name #ty_generics #where_clause {
            const FIXED_SIZE: Option<usize> = #fixed_size_expr;

            fn encoded_len(&self) -> usize {
                #encoded_len_body
            }
        }
    }
}

/// Produces `&self.<field>` expressions (or `&self.0`, `&self.1`, ...) in
/// declaration order, used by both the size and serialize derive passes.
pub fn field_accessors(fields: &Fields) -> Vec<TokenStream> {
    match fields {
        Fields::Named(f) => f
            .named
            .iter()
            .map(|f| {
                let ident = f.ident.as_ref().unwrap();
                quote! { &self.#ident }
            })
            .collect(),
        Fields::Unnamed(f) => (0..f.unnamed.len())
            .map(|i| {
                let idx = syn::Index::from(i);
                quote! { &self.#idx }
            })
            .collect(),
        Fields::Unit => Vec::new(),
    }
}
