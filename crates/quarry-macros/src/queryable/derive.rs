//! Code generation for `#[derive(Queryable)]`.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, GenericArgument, PathArguments, Result, Type};

use super::attrs::{parse_query_attrs, QueryType};

pub fn queryable_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Queryable can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Queryable can only be derived for structs",
            ))
        }
    };

    let mut field_matches: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_query_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let query_type = match attrs.query_type {
            Some(t) => t,
            None => continue,
        };

        let query_name = attrs.rename.unwrap_or_else(|| field_name.to_string());
        if query_name.is_empty() || query_name.contains('.') {
            return Err(Error::new(
                field.span(),
                "query attribute names must be non-empty and must not contain '.'",
            ));
        }

        let const_name = format_ident!("{}", to_screaming_snake_case(&query_name));
        field_constants.push(quote! {
            /// Attribute name for query paths.
            pub const #const_name: &'static str = #query_name;
        });

        // `v` is a reference to the (unwrapped) field value.
        let value_expr = match query_type {
            QueryType::String => quote! { ::quarry::Value::String(v) },
            QueryType::Number => {
                quote! { ::quarry::Value::Number(::quarry::Number::from(*v)) }
            }
            QueryType::Timestamp => quote! {
                ::quarry::Value::Timestamp(::quarry::QueryTimestamp::query_timestamp(v))
            },
            QueryType::Bool => quote! { ::quarry::Value::Bool(*v) },
            QueryType::Entity => quote! { ::quarry::Value::entity(v) },
        };

        let access = if is_option(&field.ty) {
            quote! {
                match &self.#field_name {
                    ::core::option::Option::Some(v) => #value_expr,
                    ::core::option::Option::None => ::quarry::Value::Null,
                }
            }
        } else {
            quote! {{
                let v = &self.#field_name;
                #value_expr
            }}
        };

        field_matches.push(quote! {
            #query_name => ::core::option::Option::Some(#access),
        });
    }

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#field_constants)*
        }

        impl #impl_generics ::quarry::Queryable for #struct_name #ty_generics #where_clause {
            fn field(&self, name: &str) -> ::core::option::Option<::quarry::Value<'_>> {
                match name {
                    #(#field_matches)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    };

    Ok(expanded)
}

/// Recognizes `Option<T>` (also `std::option::Option<T>`) syntactically.
fn is_option(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    if path.qself.is_some() {
        return false;
    }
    match path.path.segments.last() {
        Some(seg) if seg.ident == "Option" => match &seg.arguments {
            PathArguments::AngleBracketed(args) => {
                args.args.len() == 1 && matches!(args.args.first(), Some(GenericArgument::Type(_)))
            }
            _ => false,
        },
        _ => false,
    }
}

fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = true;
        }
    }

    result
}
