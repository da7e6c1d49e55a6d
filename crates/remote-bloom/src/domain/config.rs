//! Service configuration and validation
//!
//! # Example
//!
//! ```
//! use remote_bloom::domain::{ExistingFilterPolicy, FilterConfigBuilder};
//!
//! let config = FilterConfigBuilder::new()
//!     .default_false_positive_rate(0.001)
//!     .existing_filter_policy(ExistingFilterPolicy::FailIfExists)
//!     .build()
//!     .expect("valid config");
//! assert_eq!(config.default_false_positive_rate, 0.001);
//! ```

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::parameters::MIN_SIZE_BITS;
use crate::error::FilterError;

/// Default target false positive rate when the caller does not give one
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;

/// Largest bit array a filter may have: 2^32 bits (512 MiB)
///
/// Redis caps strings at 512 MiB and `SETBIT` offsets below 2^32.
pub const MAX_SIZE_BITS: u64 = 1 << 32;

/// What `initialize` does when a filter with the same name already exists
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingFilterPolicy {
    /// Replace metadata and reset the bit buffer to all zeros
    #[default]
    Overwrite,
    /// Refuse with `FilterError::AlreadyExists`
    FailIfExists,
}

impl FromStr for ExistingFilterPolicy {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "fail" | "fail_if_exists" => Ok(Self::FailIfExists),
            other => Err(FilterError::InvalidParameters(format!(
                "unknown existing filter policy: {}",
                other
            ))),
        }
    }
}

/// Filter service configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// False positive rate used by `initialize` when none is given
    pub default_false_positive_rate: f64,
    /// Behaviour when initializing over an existing filter
    pub existing_filter_policy: ExistingFilterPolicy,
    /// Upper bound on `expected_elements` accepted by `initialize`
    pub max_expected_elements: u64,
    /// Upper bound on the computed bit array size `m`
    pub max_size_bits: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            default_false_positive_rate: DEFAULT_FALSE_POSITIVE_RATE,
            existing_filter_policy: ExistingFilterPolicy::Overwrite,
            max_expected_elements: u32::MAX as u64,
            max_size_bits: MAX_SIZE_BITS,
        }
    }
}

impl FilterConfig {
    /// Validate configuration bounds
    pub fn validate(&self) -> Result<(), FilterError> {
        let fpr = self.default_false_positive_rate;
        if !(fpr > 0.0 && fpr < 1.0) {
            return Err(FilterError::InvalidParameters(format!(
                "default_false_positive_rate must be in (0, 1), got {}",
                fpr
            )));
        }

        if self.max_expected_elements == 0 {
            return Err(FilterError::InvalidParameters(
                "max_expected_elements cannot be 0".to_string(),
            ));
        }

        if !(MIN_SIZE_BITS..=MAX_SIZE_BITS).contains(&self.max_size_bits) {
            return Err(FilterError::InvalidParameters(format!(
                "max_size_bits must be in [{}, {}], got {}",
                MIN_SIZE_BITS, MAX_SIZE_BITS, self.max_size_bits
            )));
        }

        Ok(())
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `BLOOM_DEFAULT_FPR`: Default false positive rate (default: 0.01)
    /// - `BLOOM_EXISTING_POLICY`: `overwrite` or `fail` (default: overwrite)
    /// - `BLOOM_MAX_EXPECTED_ELEMENTS`: Capacity guard (default: 4294967295)
    /// - `BLOOM_MAX_SIZE_BITS`: Bit array guard (default: 4294967296)
    ///
    /// Unset or unparsable variables fall back to defaults; the result is
    /// validated before it is returned.
    pub fn from_env() -> Result<Self, FilterError> {
        let defaults = Self::default();

        let config = Self {
            default_false_positive_rate: env::var("BLOOM_DEFAULT_FPR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_false_positive_rate),

            existing_filter_policy: env::var("BLOOM_EXISTING_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.existing_filter_policy),

            max_expected_elements: env::var("BLOOM_MAX_EXPECTED_ELEMENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_expected_elements),

            max_size_bits: env::var("BLOOM_MAX_SIZE_BITS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_size_bits),
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from JSON; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self, FilterError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FilterError::InvalidParameters(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

/// Builder for FilterConfig with validation
#[derive(Default)]
pub struct FilterConfigBuilder {
    default_false_positive_rate: Option<f64>,
    existing_filter_policy: Option<ExistingFilterPolicy>,
    max_expected_elements: Option<u64>,
    max_size_bits: Option<u64>,
}

impl FilterConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_false_positive_rate(mut self, fpr: f64) -> Self {
        self.default_false_positive_rate = Some(fpr);
        self
    }

    pub fn existing_filter_policy(mut self, policy: ExistingFilterPolicy) -> Self {
        self.existing_filter_policy = Some(policy);
        self
    }

    pub fn max_expected_elements(mut self, max: u64) -> Self {
        self.max_expected_elements = Some(max);
        self
    }

    pub fn max_size_bits(mut self, max: u64) -> Self {
        self.max_size_bits = Some(max);
        self
    }

    /// Build the FilterConfig, validating all parameters
    pub fn build(self) -> Result<FilterConfig, FilterError> {
        let defaults = FilterConfig::default();

        let config = FilterConfig {
            default_false_positive_rate: self
                .default_false_positive_rate
                .unwrap_or(defaults.default_false_positive_rate),
            existing_filter_policy: self
                .existing_filter_policy
                .unwrap_or(defaults.existing_filter_policy),
            max_expected_elements: self
                .max_expected_elements
                .unwrap_or(defaults.max_expected_elements),
            max_size_bits: self.max_size_bits.unwrap_or(defaults.max_size_bits),
        };

        config.validate()?;
        Ok(config)
    }
}
