//! Code generation for the record capabilities

use crate::parsing::{CollectionInfo, FieldInfo};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Generics, Ident};

/// `Model` routes the record to its connection and collection
pub fn generate_model_impl(
    name: &Ident,
    generics: &Generics,
    collection: &CollectionInfo,
) -> TokenStream {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let collection_name = &collection.name;
    let connection = &collection.connection;

    quote! {
        impl #impl_generics store_object::Model for #name #ty_generics #where_clause {
            fn connection() -> &'static str {
                #connection
            }

            fn collection() -> &'static str {
                #collection_name
            }
        }
    }
}

/// `Audited` exposes the embedded audit fields, or opts out when there are none
pub fn generate_audited_impl(name: &Ident, generics: &Generics, fields: &FieldInfo) -> TokenStream {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    match &fields.document_field {
        Some(field) => quote! {
            impl #impl_generics store_object::Audited for #name #ty_generics #where_clause {
                fn document(&self) -> Option<&store_object::Document> {
                    Some(&self.#field)
                }

                fn document_mut(&mut self) -> Option<&mut store_object::Document> {
                    Some(&mut self.#field)
                }
            }
        },
        None => quote! {
            impl #impl_generics store_object::Audited for #name #ty_generics #where_clause {}
        },
    }
}
