//! Procedural macros for stored record types
//!
//! This crate provides the `#[model]` macro and `Model` derive, which implement the
//! `store_object::Model` and `store_object::Audited` capabilities for struct types.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod generation;
mod model_macro;
mod parsing;

use generation::{generate_audited_impl, generate_model_impl};
use model_macro::model_attribute;
use parsing::{parse_collection_attributes, parse_field_attributes};

/// Derive macro for the Model and Audited traits
///
/// Note: It's recommended to use the `#[model]` attribute macro instead,
/// which automatically includes this derive along with other necessary derives.
///
/// Manual usage:
/// ```ignore
/// #[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, Model)]
/// #[collection(name = "customers", connection = "crm")]
/// pub struct Customer {
///     #[document]
///     #[serde(flatten)]
///     pub document: Document,
///
///     pub first_name: String,
/// }
/// ```
///
/// The audit field is the one marked `#[document]`, otherwise the only field of type
/// `Document`. Records without one opt out of audit tracking.
#[proc_macro_derive(Model, attributes(collection, document))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    // Parse collection attributes - handle errors properly
    let collection_info = match parse_collection_attributes(&input.attrs) {
        Ok(attrs) => attrs,
        Err(e) => return e.to_compile_error().into(),
    };

    // Parse field attributes - handle errors properly
    let field_info = match parse_field_attributes(&input.data) {
        Ok(info) => info,
        Err(e) => return e.to_compile_error().into(),
    };

    let model_impl = generate_model_impl(name, &input.generics, &collection_info);
    let audited_impl = generate_audited_impl(name, &input.generics, &field_info);

    let expanded = quote::quote! {
        #model_impl
        #audited_impl
    };

    TokenStream::from(expanded)
}

/// Convenience attribute macro that adds all necessary derives for a stored record
///
/// Usage:
/// ```ignore
/// use table_derive::{model, Model};
///
/// #[model]
/// #[collection(name = "widgets")]
/// pub struct Widget {
///     pub document: Document,
///     pub name: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn model(_attr: TokenStream, item: TokenStream) -> TokenStream {
    model_attribute(_attr, item)
}
