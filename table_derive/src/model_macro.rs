use crate::parsing::{has_attribute, is_document_type};
use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use syn::{parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Error, Fields};

/// Convenience attribute macro that adds all necessary derives for a stored record
///
/// The audit field (marked `#[document]` or typed `Document`) is flattened into the
/// stored document unless it already carries a `#[serde(flatten)]`.
pub fn model_attribute(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(item as DeriveInput);

    let fields = match &mut input.data {
        Data::Struct(data) => &mut data.fields,
        _ => {
            return Error::new_spanned(&input.ident, "model can only be used on structs")
                .to_compile_error()
                .into()
        }
    };

    if let Fields::Named(named) = fields {
        let marked = named
            .named
            .iter()
            .any(|field| has_attribute(&field.attrs, "document"));
        let typed = named
            .named
            .iter()
            .filter(|field| is_document_type(&field.ty))
            .count();

        for field in named.named.iter_mut() {
            let is_audit_field = if marked {
                has_attribute(&field.attrs, "document")
            } else {
                typed == 1 && is_document_type(&field.ty)
            };
            if is_audit_field && !is_flattened(&field.attrs) {
                field.attrs.push(parse_quote!(#[serde(flatten)]));
            }
        }
    }

    // Add all the necessary derives to the struct
    let expanded = quote! {
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize, Model)]
        #input
    };

    TokenStream::from(expanded)
}

fn is_flattened(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("serde")
            && attr
                .meta
                .to_token_stream()
                .into_iter()
                .any(|token| token.to_string().contains("flatten"))
    })
}
