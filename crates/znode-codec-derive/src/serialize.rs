use crate::size::field_accessors;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput};

pub fn derive_encode_impl(input: &DeriveInput) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(s) => &s.fields,
        Data::Enum(_) => {
            panic!("NetCodec does not derive Encode for enums; write the tag dispatch by hand")
        }
        Data::Union(_) => panic!("NetCodec cannot be derived for unions"),
    };

    let accessors = field_accessors(fields);
    let body = if accessors.is_empty() {
        quote! { Ok(()) }
    } else {
        quote! {
            #( ::znode_codec::Encode::encode(#accessors, out)?; )*
            Ok(())
        }
    };

    quote! {
        #[automatically_derived]
        impl #impl_generics ::znode_codec::Encode for #name #ty_generics #where_clause {
            fn encode(&self, out: &mut ::znode_codec::ByteStream) -> ::znode_codec::Result<()> {
                #body
            }
        }
    }
}
