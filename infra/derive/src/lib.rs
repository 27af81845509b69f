#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the Depot crates: error enums with context support and
//! `OpenAPI`-aware API models and handlers.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! depot-derive.workspace = true
//! ```
//!
//! See each macro's docstring for examples; they are `ignore`d to avoid compiling in this crate.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Turns a struct into a JSON API model.
///
/// Adds whichever of `Debug`, `Serialize`, `Deserialize`, and `utoipa::ToSchema` are missing,
/// then sets `#[serde(rename_all = "camelCase")]` and `#[serde(deny_unknown_fields)]` unless the
/// struct already says otherwise. Query structs that must tolerate extra parameters opt out with
/// `#[api_model(deny_unknown_fields = false)]`.
///
/// ```rust,ignore
/// #[api_model]
/// pub struct UploadResponse {
///     pub success: bool,
///     pub file_path: String, // serialized as `filePath`
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// `#[utoipa::path(..)]` for an axum handler; the arguments are passed through unchanged.
///
/// ```rust,ignore
/// #[api_handler(get, path = "/health", responses((status = OK, body = HealthResponse)), tag = "System")]
/// pub async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse { /* .. */ }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Declares a crate's error enum.
///
/// Generated on top of the enum:
/// - `#[derive(Debug, thiserror::Error)]` (only the missing ones);
/// - a `<Name>Ext` trait whose `.context(..)` fills the variant's `context` field, implemented
///   for `Result<T, Name>` and for `Result<T, Source>` of every source-bearing variant;
/// - `From<Source>` for variants with a `source` (or `#[source]`/`#[from]`) field;
/// - `From<&str>` / `From<String>` when an `Internal { message, context }` variant exists;
/// - `const fn status_code(&self) -> u16` from per-variant `#[status(NNN)]`, 500 otherwise;
/// - a private `format_context` helper for the `#[error(..)]` strings.
///
/// Every variant needs named fields; variants that carry a source also need
/// `context: Option<Cow<'static, str>>`.
///
/// ```rust,ignore
/// #[depot_error]
/// pub enum UploadError {
///     #[status(404)]
///     #[error("Not found{}: {message}", format_context(.context))]
///     NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("Storage failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
/// }
///
/// let bytes = std::fs::read(path).context("Reading stored file")?;
/// ```
#[proc_macro_attribute]
pub fn depot_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
