/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */
#![forbid(unsafe_code)]

//! Bizop Macro Library
//!
//! Attribute macros that remove the boilerplate from business operation code.
//!
//! # Message Macro
//!
//! [`business_message`] turns a plain struct into a payload the dispatch core can
//! route, serialize and compare:
//!
//! ```ignore
//! #[business_message]
//! pub struct OrderMsg {
//!     pub sku: String,
//!     pub quantity: u32,
//! }
//! ```
//!
//! # Operation Macro
//!
//! [`business_operation`] prepares the state type of a business operation:
//!
//! ```ignore
//! #[business_operation]
//! pub struct FileOperation {
//!     written: usize,
//! }
//! ```

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

fn has_derive(input: &DeriveInput, trait_name: &str) -> bool {
    input.attrs.iter().any(|attr| {
        if attr.path().is_ident("derive") {
            let mut found = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(trait_name) {
                    found = true;
                }
                Ok(())
            });
            found
        } else {
            false
        }
    })
}

fn has_named_fields(input: &DeriveInput) -> bool {
    matches!(&input.data, Data::Struct(data) if matches!(data.fields, Fields::Named(_)))
}

/// Options accepted by `#[business_message(...)]`.
#[derive(Default)]
struct MessageOptions {
    /// Skip deriving `Default` and the `#[serde(default)]` container attribute.
    no_default: bool,
    /// Skip deriving `PartialEq`.
    no_eq: bool,
}

impl MessageOptions {
    fn parse(attr: &TokenStream) -> Self {
        let mut options = Self::default();
        for part in attr.to_string().split(',') {
            match part.trim() {
                "no_default" => options.no_default = true,
                "no_eq" => options.no_eq = true,
                _ => {}
            }
        }
        options
    }
}

/// Options accepted by `#[business_operation(...)]`.
#[derive(Default)]
struct OperationOptions {
    /// Skip deriving `Default` (the user implements it by hand).
    no_default: bool,
}

impl OperationOptions {
    fn parse(attr: &TokenStream) -> Self {
        let mut options = Self::default();
        for part in attr.to_string().split(',') {
            if part.trim() == "no_default" {
                options.no_default = true;
            }
        }
        options
    }
}

/// Derives everything a type needs to travel through the dispatch core as a business message.
///
/// # Expansion
///
/// - `#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]`, skipping any
///   trait the type already derives
/// - `#[serde(default)]` on structs with named fields, so fields missing from the wire
///   form take their default value
/// - a compile-time assertion that the type is `Send + Sync + 'static`
///
/// Serde is reached through `bizop`'s re-export, so the using crate does not need its
/// own `serde` dependency.
///
/// # Options
///
/// - `no_default`: do not derive `Default` and do not inject `#[serde(default)]`
/// - `no_eq`: do not derive `PartialEq`
///
/// ```ignore
/// #[business_message(no_eq)]
/// pub struct Reading {
///     pub celsius: f64,
/// }
/// ```
#[proc_macro_attribute]
pub fn business_message(attr: TokenStream, item: TokenStream) -> TokenStream {
    let options = MessageOptions::parse(&attr);
    let input = parse_macro_input!(item as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let derives = {
        let mut traits = Vec::new();
        if !has_derive(&input, "Clone") {
            traits.push(quote!(Clone));
        }
        if !has_derive(&input, "Debug") {
            traits.push(quote!(Debug));
        }
        if !options.no_default && !has_derive(&input, "Default") {
            traits.push(quote!(Default));
        }
        if !options.no_eq && !has_derive(&input, "PartialEq") {
            traits.push(quote!(PartialEq));
        }
        if !has_derive(&input, "Serialize") {
            traits.push(quote!(::bizop::__private::serde::Serialize));
        }
        if !has_derive(&input, "Deserialize") {
            traits.push(quote!(::bizop::__private::serde::Deserialize));
        }
        if traits.is_empty() {
            quote!()
        } else {
            quote!(#[derive(#(#traits),*)])
        }
    };

    let serde_attr = if !options.no_default && has_named_fields(&input) {
        quote!(#[serde(crate = "::bizop::__private::serde", default)])
    } else {
        quote!(#[serde(crate = "::bizop::__private::serde")])
    };

    let assert_ident = quote::format_ident!("_AssertBusinessMessage_{}", name);

    let expanded = quote! {
        #derives
        #serde_attr
        #input

        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + Sync + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    TokenStream::from(expanded)
}

/// Derives the boilerplate for the state type of a business operation.
///
/// Expands to `#[derive(Default, Debug)]` (only the traits not already present) and a
/// compile-time assertion that the type is `Send + 'static`.
///
/// # Options
///
/// `no_default` skips `Default` for state that has to be built by hand:
///
/// ```ignore
/// #[business_operation(no_default)]
/// struct Ledger {
///     opened: std::time::SystemTime,
/// }
/// ```
#[proc_macro_attribute]
pub fn business_operation(attr: TokenStream, item: TokenStream) -> TokenStream {
    let options = OperationOptions::parse(&attr);
    let input = parse_macro_input!(item as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let derives = {
        let mut traits = Vec::new();
        if !options.no_default && !has_derive(&input, "Default") {
            traits.push(quote!(Default));
        }
        if !has_derive(&input, "Debug") {
            traits.push(quote!(Debug));
        }
        if traits.is_empty() {
            quote!()
        } else {
            quote!(#[derive(#(#traits),*)])
        }
    };

    let assert_ident = quote::format_ident!("_AssertBusinessOperation_{}", name);

    let expanded = quote! {
        #derives
        #input

        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    TokenStream::from(expanded)
}
