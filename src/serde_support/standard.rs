//! serde `Serialize` / `Deserialize` for [`Filter`].
//!
//! # Format
//!
//! Filters go through an intermediate representation carrying:
//! - a format version
//! - the configuration (`K`, subfilter name, region width, `K'`, stride) so a filter is
//!   never loaded into a differently configured type
//! - the capacity in bits and the raw bit array bytes
//!
//! The hash function is not stored. Deserialization rebuilds it with
//! `H::default()`, so a filter built with a non-default seed must be
//! restored into a type whose default produces the same hash.
//!
//! # Examples
//!
//! ```
//! use blockbloom::Filter;
//!
//! let mut filter = Filter::<str, 3>::with_capacity(2048).unwrap();
//! filter.insert("hello");
//!
//! let json = serde_json::to_string(&filter).unwrap();
//! let restored: Filter<str, 3> = serde_json::from_str(&json).unwrap();
//! assert!(restored.may_contain("hello"));
//! ```

use crate::core::params::round_capacity;
use crate::core::ByteAllocator;
use crate::filters::Filter;
use crate::subfilter::Subfilter;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;

/// Serialization format version.
const FORMAT_VERSION: u16 = 1;

/// Serializable representation of a filter.
#[derive(Serialize, Deserialize)]
struct FilterSerde<'a> {
    /// Format version for compatibility checking
    version: u16,
    /// Capacity in bits
    capacity: u64,
    /// Regions per element (`K`)
    regions: usize,
    /// Subfilter strategy name
    subfilter: Cow<'a, str>,
    /// Bytes per region, which pins the subfilter word width
    region_bytes: usize,
    /// Bits set per region (`K'`)
    bits_per_region: usize,
    /// Bytes between region starts
    stride: usize,
    /// Raw bit array, native byte order
    bits: Cow<'a, [u8]>,
}

impl<'a> FilterSerde<'a> {
    fn from_filter<T: ?Sized, const K: usize, S: Subfilter, const STRIDE: usize, H, A: ByteAllocator>(
        filter: &'a Filter<T, K, S, STRIDE, H, A>,
    ) -> Self {
        Self {
            version: FORMAT_VERSION,
            capacity: filter.capacity() as u64,
            regions: K,
            subfilter: Cow::Borrowed(S::NAME),
            region_bytes: S::REGION_BYTES,
            bits_per_region: S::BITS_PER_REGION,
            stride: Filter::<T, K, S, STRIDE, H, A>::STRIDE_BYTES,
            bits: Cow::Borrowed(filter.as_bytes()),
        }
    }

    fn into_filter<T: ?Sized, const K: usize, S: Subfilter, const STRIDE: usize, H, A>(
        self,
    ) -> Result<Filter<T, K, S, STRIDE, H, A>, String>
    where
        H: Default,
        A: ByteAllocator + Default,
    {
        if self.version != FORMAT_VERSION {
            return Err(format!(
                "Incompatible serialization version: expected {FORMAT_VERSION}, got {}",
                self.version
            ));
        }

        let stride = Filter::<T, K, S, STRIDE, H, A>::STRIDE_BYTES;
        if self.regions != K
            || self.subfilter != S::NAME
            || self.region_bytes != S::REGION_BYTES
            || self.bits_per_region != S::BITS_PER_REGION
            || self.stride != stride
        {
            tracing::warn!(
                stored_regions = self.regions,
                stored_subfilter = %self.subfilter,
                "serialized filter configuration mismatch"
            );
            return Err(format!(
                "Filter configuration mismatch: serialized as K={} {}({}B, K'={}) stride={}, \
                 expected K={K} {}({}B, K'={}) stride={stride}",
                self.regions,
                self.subfilter,
                self.region_bytes,
                self.bits_per_region,
                self.stride,
                S::NAME,
                S::REGION_BYTES,
                S::BITS_PER_REGION,
            ));
        }

        let capacity = usize::try_from(self.capacity).map_err(|_| "capacity overflows usize".to_string())?;
        let rounded = round_capacity(capacity, S::REGION_BYTES, stride).map_err(|e| e.to_string())?;
        if rounded != capacity {
            return Err(format!("Capacity {capacity} is not valid for this configuration"));
        }

        let mut filter = Filter::with_capacity(capacity).map_err(|e| e.to_string())?;
        filter.bits.copy_from_bytes(&self.bits).map_err(|e| e.to_string())?;
        tracing::debug!(capacity, "deserialized filter");
        Ok(filter)
    }
}

impl<T: ?Sized, const K: usize, S: Subfilter, const STRIDE: usize, H, A: ByteAllocator> Serialize
    for Filter<T, K, S, STRIDE, H, A>
{
    fn serialize<Z>(&self, serializer: Z) -> std::result::Result<Z::Ok, Z::Error>
    where
        Z: Serializer,
    {
        FilterSerde::from_filter(self).serialize(serializer)
    }
}

impl<'de, T: ?Sized, const K: usize, S: Subfilter, const STRIDE: usize, H, A> Deserialize<'de>
    for Filter<T, K, S, STRIDE, H, A>
where
    H: Default,
    A: ByteAllocator + Default,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let serde_repr = FilterSerde::deserialize(deserializer)?;
        serde_repr.into_filter().map_err(de::Error::custom)
    }
}
