//! Serialization support for filters.
//!
//! # Serialization Formats
//!
//! ## Raw
//!
//! Always available. An 8-byte native-endian capacity followed by the bit
//! array bytes verbatim (see [`raw`]). Smallest and fastest; only portable
//! between machines of the same endianness, and carries no configuration.
//!
//! ## Standard (serde)
//!
//! Behind the `serde` feature. Works with any serde format and records the
//! filter configuration, so loading into a differently configured type
//! fails instead of producing false negatives.
//!
//! ```toml
//! [dependencies]
//! blockbloom = { version = "0.1", features = ["serde"] }
//! ```
//!
//! # Thread Safety
//!
//! Serialization only reads the filter and can run alongside other readers.

pub mod raw;
#[cfg(feature = "serde")]
pub mod standard;

pub use raw::HEADER_BYTES;
