//! Filter metadata and its store representation
//!
//! Metadata is persisted as a flat field→value mapping of decimal text under
//! `"<name>:metadata"`. [`FilterMetadata::to_fields`] and
//! [`FilterMetadata::from_fields`] are the only place that text is produced
//! or parsed; everything above works with typed values.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::parameters::{calculate_fpr, BloomFilterParams};
use crate::error::FilterError;

pub const FIELD_SIZE: &str = "size";
pub const FIELD_HASH_FUNCTIONS: &str = "hash_functions";
pub const FIELD_EXPECTED_ELEMENTS: &str = "expected_elements";
pub const FIELD_FALSE_POSITIVE_RATE: &str = "false_positive_rate";

/// Store key holding the metadata mapping for a filter
pub fn metadata_key(name: &str) -> String {
    format!("{}:metadata", name)
}

/// Store key holding the bit buffer for a filter
pub fn bits_key(name: &str) -> String {
    format!("{}:bits", name)
}

/// Parameters of one named filter, fixed at creation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterMetadata {
    /// Name under which metadata and bits are stored
    pub name: String,
    /// Number of addressable bits (m)
    pub size: u64,
    /// Number of hash functions (k)
    pub hash_functions: u32,
    /// Capacity the filter was planned for (n)
    pub expected_elements: u64,
    /// Target false positive rate the filter was planned for (p)
    pub false_positive_rate: f64,
}

impl FilterMetadata {
    pub fn new(
        name: impl Into<String>,
        params: BloomFilterParams,
        expected_elements: u64,
        false_positive_rate: f64,
    ) -> Self {
        Self {
            name: name.into(),
            size: params.size_bits,
            hash_functions: params.hash_functions,
            expected_elements,
            false_positive_rate,
        }
    }

    /// Length of the bit buffer in bytes, `ceil(m / 8)`
    pub fn byte_len(&self) -> usize {
        self.size.div_ceil(8) as usize
    }

    /// Expected false positive rate after `inserted` distinct keys
    ///
    /// Formula: FPR = (1 - e^(-kn/m))^k
    pub fn estimated_false_positive_rate(&self, inserted: u64) -> f64 {
        calculate_fpr(self.size, inserted, self.hash_functions)
    }

    /// Encode as the field→value mapping stored under the metadata key
    pub fn to_fields(&self) -> Vec<(String, String)> {
        vec![
            (FIELD_SIZE.to_string(), self.size.to_string()),
            (
                FIELD_HASH_FUNCTIONS.to_string(),
                self.hash_functions.to_string(),
            ),
            (
                FIELD_EXPECTED_ELEMENTS.to_string(),
                self.expected_elements.to_string(),
            ),
            (
                FIELD_FALSE_POSITIVE_RATE.to_string(),
                self.false_positive_rate.to_string(),
            ),
        ]
    }

    /// Decode the mapping read back from the store
    ///
    /// Rejects missing or unparsable fields, and sizes that could not have
    /// come from initialization (`size == 0` or `hash_functions == 0`).
    pub fn from_fields(name: &str, fields: &HashMap<String, String>) -> Result<Self, FilterError> {
        let metadata = Self {
            name: name.to_string(),
            size: parse_field(name, fields, FIELD_SIZE)?,
            hash_functions: parse_field(name, fields, FIELD_HASH_FUNCTIONS)?,
            expected_elements: parse_field(name, fields, FIELD_EXPECTED_ELEMENTS)?,
            false_positive_rate: parse_field(name, fields, FIELD_FALSE_POSITIVE_RATE)?,
        };

        if metadata.size == 0 || metadata.hash_functions == 0 {
            return Err(FilterError::CorruptMetadata {
                name: name.to_string(),
                reason: format!(
                    "size ({}) and hash_functions ({}) must be positive",
                    metadata.size, metadata.hash_functions
                ),
            });
        }

        Ok(metadata)
    }
}

fn parse_field<T: FromStr>(
    name: &str,
    fields: &HashMap<String, String>,
    field: &str,
) -> Result<T, FilterError> {
    let raw = fields.get(field).ok_or_else(|| FilterError::CorruptMetadata {
        name: name.to_string(),
        reason: format!("missing field {}", field),
    })?;

    raw.trim().parse().map_err(|_| FilterError::CorruptMetadata {
        name: name.to_string(),
        reason: format!("field {} has unparsable value {:?}", field, raw),
    })
}
