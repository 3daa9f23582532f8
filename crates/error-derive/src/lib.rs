//! `#[derive(Error)]` for error enums
//!
//! Every variant needs a `#[msg = "..."]` attribute, which becomes its [Display](std::fmt::Display)
//! output. Variants with a single unnamed field wrap another error: they get a `From` impl and
//! report the field as their [source](std::error::Error::source).
//!
//! Variants marked `#[plain]` carry a value that is not an error (a status code, a path, ...).
//! That value is appended to the message and does not take part in `From`/`source`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;

#[proc_macro_derive(Error, attributes(msg, plain))]
pub fn derive_error(input: TokenStream) -> TokenStream {
    let item = match syn::parse::<syn::ItemEnum>(input) {
        Ok(item) => item,
        Err(error) => return error.to_compile_error().into(),
    };

    match expand(&item) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

struct Expansion {
    displays: Vec<TokenStream2>,
    sources: Vec<TokenStream2>,
    conversions: Vec<TokenStream2>,
}

fn expand(item: &syn::ItemEnum) -> syn::Result<TokenStream2> {
    let name = &item.ident;
    let mut expansion = Expansion {
        displays: vec![],
        sources: vec![],
        conversions: vec![],
    };

    for variant in &item.variants {
        expand_variant(name, variant, &mut expansion)?;
    }

    let Expansion {
        displays,
        sources,
        conversions,
    } = expansion;

    Ok(quote!(
        #[automatically_derived]
        impl ::std::fmt::Display for #name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    #(
                        #displays,
                    )*
                }
            }
        }

        #(
            #conversions
        )*

        #[automatically_derived]
        impl ::std::error::Error for #name {
            #[allow(unreachable_patterns)]
            fn source(&self) -> Option<&(dyn ::std::error::Error + 'static)> {
                match self {
                    #(
                        #sources,
                    )*
                    _ => None,
                }
            }
        }
    ))
}

fn expand_variant(
    name: &syn::Ident,
    variant: &syn::Variant,
    expansion: &mut Expansion,
) -> syn::Result<()> {
    let ident = &variant.ident;
    let message = message_of(variant)?;
    let is_plain = variant.attrs.iter().any(|attr| attr.path().is_ident("plain"));

    match &variant.fields {
        syn::Fields::Unit => {
            if is_plain {
                return Err(syn::Error::new_spanned(
                    variant,
                    "#[plain] requires a variant with exactly one field",
                ));
            }

            expansion
                .displays
                .push(quote!(Self::#ident => f.write_str(#message)));
        },
        syn::Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
            let ty = &fields.unnamed[0].ty;

            if is_plain {
                expansion
                    .displays
                    .push(quote!(Self::#ident(value) => write!(f, "{} ({})", #message, value)));
                return Ok(());
            }

            expansion.displays.push(quote!(Self::#ident(_) => f.write_str(#message)));
            expansion
                .sources
                .push(quote!(Self::#ident(value) => Some(value)));
            expansion.conversions.push(quote!(
                #[automatically_derived]
                impl From<#ty> for #name {
                    fn from(value: #ty) -> Self {
                        Self::#ident(value)
                    }
                }
            ));
        },
        syn::Fields::Unnamed(fields) => {
            return Err(syn::Error::new_spanned(
                fields,
                "error variants can hold at most one field",
            ))
        },
        syn::Fields::Named(fields) => {
            return Err(syn::Error::new_spanned(
                fields,
                "named fields are not allowed",
            ))
        },
    }

    Ok(())
}

fn message_of(variant: &syn::Variant) -> syn::Result<&syn::Expr> {
    variant
        .attrs
        .iter()
        .find_map(|attr| match &attr.meta {
            syn::Meta::NameValue(name_value) if name_value.path.is_ident("msg") => {
                Some(&name_value.value)
            },
            _ => None,
        })
        .ok_or_else(|| syn::Error::new_spanned(variant, "missing #[msg = \"...\"] attribute"))
}
