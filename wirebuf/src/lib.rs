//! wirebuf is a binary serialization toolkit built around a byte [`Buffer`]
//! with independent read and write cursors over a pluggable storage
//! [`Backend`](io::Backend).
//!
//! It has three layers:
//!
//! - **Storage**: [`io`] provides in-memory, file, and stream backends.
//!   [`Buffer`] drives any of them.
//! - **Primitive codec**: inherent methods on [`Buffer`] for fixed-width
//!   integers and floats in both byte orders, LEB128 [`varint`]s, strings in
//!   several layouts, UUIDs, timestamps and bit packing.
//! - **Structural codec**: the [`Encode`] and [`Decode`] schema traits map
//!   whole values (records, sequences, maps, pointers) to bytes.
//!   `#[derive(Encode, Decode)]` covers user types, and [`containers`]
//!   adapts the wire shape of individual fields.
//!
//! # Quickstart
//!
//! ```
//! # #[cfg(feature = "derive")] {
//! use {std::collections::BTreeMap, wirebuf::{Decode, Encode}};
//!
//! #[derive(Encode, Decode, Debug, PartialEq)]
//! struct Checkpoint {
//!     name: String,
//!     position: [f64; 2],
//!     visits: BTreeMap<String, u32>,
//! }
//!
//! let checkpoint = Checkpoint {
//!     name: "summit".into(),
//!     position: [33.677216, -106.476059],
//!     visits: [("alice".to_string(), 3)].into(),
//! };
//! let bytes = wirebuf::marshal(&checkpoint).unwrap();
//! assert_eq!(wirebuf::unmarshal::<Checkpoint>(&bytes).unwrap(), checkpoint);
//! # }
//! ```
//!
//! The primitive codec can be used on its own:
//!
//! ```
//! use wirebuf::Buffer;
//!
//! let mut buf = Buffer::new();
//! buf.write_u32_be(0xcafe_babe).unwrap();
//! buf.write_bit(true).unwrap();
//! buf.write_bit(false).unwrap();
//! buf.write_bit(true).unwrap();
//! let bytes = buf.finish().unwrap();
//! assert_eq!(bytes, [0xca, 0xfe, 0xba, 0xbe, 0b1010_0000]);
//! ```
//!
//! # Schema compiler
//!
//! The `wirebuf-idl` crate compiles `.wbs` schema files into Rust types
//! implementing [`Encode`] and [`Decode`], and into JavaScript that produces
//! the same bytes.
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod buffer;
pub use buffer::Buffer;
pub use chrono::{DateTime, Utc};
pub mod codec;
pub use codec::*;
pub mod config;
pub use config::DecodeLimits;
pub mod error;
pub use error::{Error, Result};
pub mod id;
pub use id::Uuid;
pub mod io;
mod schema;
pub use schema::*;
pub mod varint;
#[cfg(feature = "zlib")]
pub mod zlib;

#[cfg(feature = "derive")]
pub use wirebuf_derive::{Decode, Encode};

#[cfg(test)]
mod proptest_config {
    use proptest::test_runner::Config;

    /// Shared configuration for the crate's property tests.
    pub(crate) fn proptest_cfg() -> Config {
        Config {
            failure_persistence: None,
            ..Config::default()
        }
    }
}
