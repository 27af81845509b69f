use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::{Attribute, ItemFn, ItemStruct, Lit, LitStr, Meta, MetaNameValue};

/// Expands the `#[api_model]` attribute macro.
///
/// Adds the missing `Debug`/`Serialize`/`Deserialize`/`ToSchema` derives and configures
/// Serde for camelCase and strict field checking.
pub fn expand_api_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    let ApiModelArgs { rename_all, deny_unknown_fields } = match parse_api_model_args(args) {
        Ok(args) => args,
        Err(err) => return err,
    };
    let derives = derived_trait_names(&input.attrs);
    let serde_meta = match serde_meta_info(&input.attrs) {
        Ok(info) => info,
        Err(err) => return err,
    };

    let derive_attr = derive_attr(&derives);

    let rename_attr = match rename_attr(rename_all, &serde_meta) {
        Ok(attr) => attr,
        Err(err) => return err,
    };
    let deny_attr = match deny_unknown_attr(deny_unknown_fields, &serde_meta, &input) {
        Ok(attr) => attr,
        Err(err) => return err,
    };

    quote! {
        #derive_attr
        #rename_attr
        #deny_attr
        #input
    }
}

/// Expands the `#[api_handler]` attribute macro into a `utoipa::path` annotated handler.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let body = &input.block;
    let sig = &input.sig;
    let vis = &input.vis;
    let attrs = &input.attrs;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[::utoipa::path(#args)]
        #vis #sig {
            #body
        }
    }
}

struct ApiModelArgs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: Option<bool>,
}

fn parse_api_model_args(args: TokenStream) -> Result<ApiModelArgs, TokenStream> {
    let parser = syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated;
    let metas = parser.parse2(args).map_err(|err| err.to_compile_error())?;

    let mut parsed = ApiModelArgs { rename_all: None, deny_unknown_fields: None };

    for meta in metas {
        let name_value = match meta {
            Meta::NameValue(name_value) => name_value,
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "Expected name-value arguments like `rename_all = \"...\"`",
                )
                .to_compile_error());
            },
        };

        if name_value.path.is_ident("rename_all") {
            let message = "rename_all must be a string literal";
            let Lit::Str(lit) = literal(&name_value, message)? else {
                return Err(syn::Error::new_spanned(&name_value.value, message).to_compile_error());
            };
            set_once(&mut parsed.rename_all, &name_value, lit.clone())?;
        } else if name_value.path.is_ident("deny_unknown_fields") {
            let message = "deny_unknown_fields must be a boolean literal";
            let Lit::Bool(lit) = literal(&name_value, message)? else {
                return Err(syn::Error::new_spanned(&name_value.value, message).to_compile_error());
            };
            set_once(&mut parsed.deny_unknown_fields, &name_value, lit.value)?;
        } else {
            return Err(syn::Error::new_spanned(
                name_value.path,
                "Unsupported argument; expected rename_all or deny_unknown_fields",
            )
            .to_compile_error());
        }
    }

    Ok(parsed)
}

/// Extracts the literal from `key = <lit>`.
fn literal<'a>(name_value: &'a MetaNameValue, message: &str) -> Result<&'a Lit, TokenStream> {
    match &name_value.value {
        syn::Expr::Lit(expr_lit) => Ok(&expr_lit.lit),
        other => Err(syn::Error::new_spanned(other, message).to_compile_error()),
    }
}

fn set_once<T>(slot: &mut Option<T>, token: &MetaNameValue, value: T) -> Result<(), TokenStream> {
    if slot.is_some() {
        return Err(syn::Error::new_spanned(token, "Duplicate argument").to_compile_error());
    }
    *slot = Some(value);
    Ok(())
}

struct SerdeMetaInfo {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

fn derive_attr(derives: &FxHashSet<String>) -> TokenStream {
    let wanted = [
        ("Debug", quote! { Debug }),
        ("Serialize", quote! { ::serde::Serialize }),
        ("Deserialize", quote! { ::serde::Deserialize }),
        ("ToSchema", quote! { ::utoipa::ToSchema }),
    ];
    let tokens: Vec<_> = wanted
        .into_iter()
        .filter(|(name, _)| !derives.contains(*name))
        .map(|(_, tokens)| tokens)
        .collect();

    if tokens.is_empty() {
        quote! {}
    } else {
        quote! { #[derive(#(#tokens),*)] }
    }
}

fn rename_attr(
    rename_all: Option<LitStr>,
    serde_meta: &SerdeMetaInfo,
) -> Result<TokenStream, TokenStream> {
    let rename_all_value =
        rename_all.unwrap_or_else(|| LitStr::new("camelCase", proc_macro2::Span::call_site()));

    match &serde_meta.rename_all {
        Some(existing) if existing.value() != rename_all_value.value() => Err(
            syn::Error::new_spanned(
                existing,
                "Conflicting serde rename_all; remove it or set api_model(rename_all = \"...\") to match",
            )
            .to_compile_error(),
        ),
        Some(_) => Ok(quote! {}),
        None => Ok(quote! { #[serde(rename_all = #rename_all_value)] }),
    }
}

fn deny_unknown_attr(
    deny_unknown_fields: Option<bool>,
    serde_meta: &SerdeMetaInfo,
    input: &ItemStruct,
) -> Result<TokenStream, TokenStream> {
    let deny_unknown = deny_unknown_fields.unwrap_or(true);
    if serde_meta.deny_unknown_fields {
        if !deny_unknown {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "deny_unknown_fields is already set via serde; remove it before disabling",
            )
            .to_compile_error());
        }
        return Ok(quote! {});
    }

    if deny_unknown { Ok(quote! { #[serde(deny_unknown_fields)] }) } else { Ok(quote! {}) }
}

fn serde_meta_info(attrs: &[Attribute]) -> Result<SerdeMetaInfo, TokenStream> {
    let mut info = SerdeMetaInfo { rename_all: None, deny_unknown_fields: false };

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                info.rename_all = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("deny_unknown_fields") {
                info.deny_unknown_fields = true;
            } else if meta.input.peek(syn::Token![=]) {
                // Other container options (`default`, `tag = ..`) pass through untouched.
                let _: syn::Expr = meta.value()?.parse()?;
            }
            Ok(())
        })
        .map_err(|err| err.to_compile_error())?;
    }

    Ok(info)
}

fn derived_trait_names(attrs: &[Attribute]) -> FxHashSet<String> {
    let mut traits = FxHashSet::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(ident) = meta.path.segments.last().map(|seg| seg.ident.to_string()) {
                traits.insert(ident);
            }
            Ok(())
        });
    }

    traits
}
