//! Builder pattern for filter construction.
//!
//! Filters can be built directly with [`Filter::with_capacity`] or
//! [`Filter::with_fpr`]; the builder adds a runtime-configurable front end
//! that also carries a custom hash and allocator.
//!
//! # Error Handling
//!
//! - **Compile-time errors**: finishing a builder that was never sized
//! - **Runtime errors**: zero sizes, rates outside `(0, 1]`, allocation failure
//!
//! # Examples
//!
//! ```
//! use blockbloom::builder::FilterBuilder;
//! use blockbloom::Filter;
//!
//! let filter: Filter<str, 4> = FilterBuilder::new()
//!     .expected_items(10_000)
//!     .false_positive_rate(0.01)
//!     .build()
//!     .unwrap();
//! assert!(filter.capacity() > 0);
//! ```
//!
//! [`Filter::with_capacity`]: crate::Filter::with_capacity
//! [`Filter::with_fpr`]: crate::Filter::with_fpr

pub mod filter;

pub use filter::{FilterBuilder, FilterMetadata, Initial, WithItems, WithSize};
