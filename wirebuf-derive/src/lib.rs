//! Derive macros for `Encode` and `Decode`.
//!
//! Records are encoded as their fields in declaration order with no framing.
//! Enums are encoded as the variant index, an unsigned varint, followed by
//! the variant's fields. Unions are rejected.
//!
//! Field attributes:
//!
//! - `#[wirebuf(with = "Schema")]` encodes the field through `Schema`
//!   instead of its own type, e.g. `"wirebuf::containers::Fixed<u32>"`.
//! - `#[wirebuf(skip)]` leaves the field off the wire. It decodes as
//!   `Default::default()`.
//!
//! Container attributes:
//!
//! - `#[wirebuf(crate = "path::to::wirebuf")]` when `wirebuf` is re-exported.
//!
//! Refer to the [`wirebuf`](https://docs.rs/wirebuf) crate for examples.
use {
    proc_macro::TokenStream,
    syn::{parse_macro_input, DeriveInput},
};

mod common;
mod decode;
mod encode;

/// Implement `Encode` for a struct or enum.
#[proc_macro_derive(Encode, attributes(wirebuf))]
pub fn derive_encode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match encode::generate(input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.write_errors().into(),
    }
}

/// Implement `Decode` for a struct or enum.
#[proc_macro_derive(Decode, attributes(wirebuf))]
pub fn derive_decode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match decode::generate(input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.write_errors().into(),
    }
}
