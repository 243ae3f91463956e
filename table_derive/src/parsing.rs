//! Parsing utilities for collection and field attributes
//!
//! This module handles the parsing of `#[collection]` and `#[document]` attributes
//! and validation of collection names.

use syn::{Attribute, Data, Error, Fields, Ident, LitStr, Result, Type};

/// Logical connection used when `#[collection]` does not name one
pub const DEFAULT_CONNECTION: &str = "default";

/// Validate collection name and return syn::Error for better proc macro error handling
pub fn validate_collection_name_syn(name: &str, span: proc_macro2::Span) -> Result<()> {
    validate_collection_name(name)
        .map_err(|e| Error::new(span, format!("Invalid collection name '{}': {}", name, e)))
}

/// Naming rules document stores enforce on collection names
fn validate_collection_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    if name.contains('$') {
        return Err("Name must not contain '$'".to_string());
    }

    if name.contains('\0') {
        return Err("Name must not contain a null character".to_string());
    }

    if name.starts_with("system.") {
        return Err("The 'system.' prefix is reserved".to_string());
    }

    Ok(())
}

#[derive(Debug)]
pub struct CollectionInfo {
    pub name: String,
    pub connection: String,
}

#[derive(Debug)]
pub struct FieldInfo {
    /// Field embedding the audit fields, if any
    pub document_field: Option<Ident>,
}

pub fn parse_collection_attributes(attrs: &[Attribute]) -> Result<CollectionInfo> {
    let mut name = None;
    let mut connection = None;

    for attr in attrs {
        if attr.path().is_ident("collection") {
            attr.parse_nested_meta(|meta| {
                let value: LitStr = meta.value()?.parse()?;
                if meta.path.is_ident("name") {
                    validate_collection_name_syn(&value.value(), value.span())?;
                    name = Some(value.value());
                    Ok(())
                } else if meta.path.is_ident("connection") {
                    if value.value().is_empty() {
                        return Err(Error::new(value.span(), "connection name cannot be empty"));
                    }
                    connection = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `name` or `connection`"))
                }
            })?;
        }
    }

    let name = name.ok_or_else(|| {
        Error::new(
            proc_macro2::Span::call_site(),
            "collection attribute is required: add #[collection(name = \"collection_name\")] to your struct",
        )
    })?;

    Ok(CollectionInfo {
        name,
        connection: connection.unwrap_or_else(|| DEFAULT_CONNECTION.to_string()),
    })
}

pub fn parse_field_attributes(data: &Data) -> Result<FieldInfo> {
    if let Data::Struct(data_struct) = data {
        if let Fields::Named(fields_named) = &data_struct.fields {
            let mut marked = Vec::new();
            let mut by_type = Vec::new();

            for field in &fields_named.named {
                let field_name = field
                    .ident
                    .as_ref()
                    .ok_or_else(|| Error::new_spanned(field, "Field must have a name"))?;

                if has_attribute(&field.attrs, "document") {
                    marked.push(field_name.clone());
                } else if is_document_type(&field.ty) {
                    by_type.push(field_name.clone());
                }
            }

            if marked.len() > 1 {
                return Err(Error::new(
                    marked[1].span(),
                    "only one field can be marked #[document]",
                ));
            }

            let document_field = marked.into_iter().next().or_else(|| {
                if by_type.len() == 1 {
                    by_type.into_iter().next()
                } else {
                    None
                }
            });

            return Ok(FieldInfo { document_field });
        }
    }

    Err(Error::new(
        proc_macro2::Span::call_site(),
        "Model can only be derived for structs with named fields",
    ))
}

pub fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

/// Whether a field type is spelled `Document` (last path segment), as in
/// `Document` or `store_object::Document`; `bson::Document` is excluded
pub fn is_document_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        let segments = &type_path.path.segments;
        let is_bson = segments.iter().any(|s| s.ident == "bson");
        if let Some(last) = segments.last() {
            return last.ident == "Document" && last.arguments.is_empty() && !is_bson;
        }
    }
    false
}
