//! Parsing of `#[query(...)]` field attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Ident, Lit, Meta, Result, Token,
};

/// How a field is exposed to queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// `#[query(String)]`
    String,
    /// `#[query(Number)]`
    Number,
    /// `#[query(Timestamp)]`
    Timestamp,
    /// `#[query(Bool)]`
    Bool,
    /// `#[query(Entity)]`, a related entity reachable through dotted paths
    Entity,
}

impl QueryType {
    fn parse_name(name: &str, span: Span) -> Result<Self> {
        match name {
            "String" | "string" => Ok(QueryType::String),
            "Number" | "number" => Ok(QueryType::Number),
            "Timestamp" | "timestamp" => Ok(QueryType::Timestamp),
            "Bool" | "boolean" | "bool" => Ok(QueryType::Bool),
            "Entity" | "entity" => Ok(QueryType::Entity),
            other => Err(Error::new(
                span,
                format!(
                    "unknown query type: '{}'. Expected one of: String, Number, Timestamp, Bool, Entity",
                    other
                ),
            )),
        }
    }

    pub fn from_ident(ident: &Ident) -> Result<Self> {
        QueryType::parse_name(&ident.to_string(), ident.span())
    }
}

/// Field-level attributes from `#[query(...)]`.
#[derive(Debug, Clone, Default)]
pub struct QueryAttr {
    pub query_type: Option<QueryType>,
    pub skip: bool,
    /// Attribute name used in paths (default: the field name).
    pub rename: Option<String>,
}

impl Parse for QueryAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = QueryAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) => {
                    if p.is_ident("skip") {
                        attr.skip = true;
                    } else if let Some(ident) = p.get_ident() {
                        attr.query_type = Some(QueryType::from_ident(ident)?);
                    } else {
                        return Err(Error::new(
                            p.span(),
                            "expected query type: String, Number, Timestamp, Bool, Entity, or skip",
                        ));
                    }
                }

                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    if let syn::Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(s), ..
                    }) = &nv.value
                    {
                        attr.rename = Some(s.value());
                    } else {
                        return Err(Error::new(
                            nv.value.span(),
                            "rename must be a string literal",
                        ));
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown query attribute. Expected: String, Number, Timestamp, Bool, Entity, skip, or rename = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Extracts the `#[query(...)]` attribute of a field, if any.
pub fn parse_query_attrs(attrs: &[Attribute]) -> Result<QueryAttr> {
    for attr in attrs {
        if attr.path().is_ident("query") {
            return attr.parse_args::<QueryAttr>();
        }
    }
    Ok(QueryAttr::default())
}
