use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields};

pub fn derive_decode_impl(input: &DeriveInput) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(s) => &s.fields,
        Data::Enum(_) => {
            panic!("NetCodec does not derive Decode for enums; write the tag dispatch by hand")
        }
        Data::Union(_) => panic!("NetCodec cannot be derived for unions"),
    };

    let construct = match fields {
        Fields::Named(f) => {
            let binds: Vec<_> = f
                .named
                .iter()
                .map(|field| {
                    let ident = field.ident.as_ref().unwrap();
                    let var = format_ident!("__field_{}", ident);
                    let ty = &field.ty;
                    quote! { let #var = <#ty as ::znode_codec::Decode>::decode(input)?; }
                })
                .collect();
            let idents: Vec<_> = f
                .named
                .iter()
                .map(|field| {
                    let ident = field.ident.as_ref().unwrap();
                    let var = format_ident!("__field_{}", ident);
                    quote! { #ident: #var }
                })
                .collect();
            quote! {
                #( #binds )*
                Ok(#name { #( #idents ),* })
            }
        }
        Fields::Unnamed(f) => {
            let binds: Vec<_> = f
                .unnamed
                .iter()
                .enumerate()
                .map(|(i, field)| {
                    let var = format_ident!("__field_{}", i);
                    let ty = &field.ty;
                    quote! { let #var = <#ty as ::znode_codec::Decode>::decode(input)?; }
                })
                .collect();
            let idents: Vec<_> = (0..f.unnamed.len())
                .map(|i| format_ident!("__field_{}", i))
                .collect();
            quote! {
                #( #binds )*
                Ok(#name( #( #idents ),* ))
            }
        }
        Fields::Unit => quote! { Ok(#name) },
    };

    quote! {
        #[automatically_derived]
        impl #impl_generics ::znode_codec::Decode for #name #ty_generics #where_clause {
            fn decode(input: &mut ::znode_codec::ByteStream) -> ::znode_codec::Result<Self> {
                #construct
            }
        }
    }
}
