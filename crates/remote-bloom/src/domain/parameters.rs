//! Optimal Bloom filter parameter calculation
//!
//! Formulas:
//! - m = ceil(-n*ln(p) / (ln(2)^2))  -- optimal bits
//! - k = round((m/n) * ln(2))        -- optimal hash functions
//!
//! Both are floored so tiny inputs never produce a degenerate filter.

use std::f64::consts::LN_2;

use crate::error::FilterError;

/// Smallest bit array a filter is ever given
pub const MIN_SIZE_BITS: u64 = 100;

/// Smallest number of hash functions a filter is ever given
pub const MIN_HASH_FUNCTIONS: u32 = 1;

/// Bloom filter sizing parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BloomFilterParams {
    /// Number of bits in the filter (m)
    pub size_bits: u64,
    /// Number of hash functions (k)
    pub hash_functions: u32,
}

/// Calculate optimal Bloom filter parameters for given constraints
///
/// # Arguments
/// * `expected_elements` - Expected number of elements to insert (n)
/// * `false_positive_rate` - Target false positive rate (p)
///
/// # Preconditions
/// `expected_elements > 0` and `0 < false_positive_rate < 1`. These are not
/// checked here; callers validate with [`validate_sizing_inputs`] first.
/// Identical inputs always yield identical parameters.
pub fn compute_parameters(expected_elements: u64, false_positive_rate: f64) -> BloomFilterParams {
    let n = expected_elements as f64;
    let ln2_squared = LN_2 * LN_2;

    let m_raw = (-(n * false_positive_rate.ln()) / ln2_squared).ceil();
    let k_raw = ((m_raw / n) * LN_2).round();

    BloomFilterParams {
        size_bits: (m_raw as u64).max(MIN_SIZE_BITS),
        hash_functions: (k_raw as u32).max(MIN_HASH_FUNCTIONS),
    }
}

/// Reject sizing inputs that would make the formulas undefined
pub fn validate_sizing_inputs(
    expected_elements: u64,
    false_positive_rate: f64,
) -> Result<(), FilterError> {
    if expected_elements == 0 {
        return Err(FilterError::InvalidParameters(
            "expected_elements must be greater than 0".to_string(),
        ));
    }

    // Written as a negated range check so NaN is rejected too
    if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
        return Err(FilterError::InvalidParameters(format!(
            "false_positive_rate must be in (0, 1), got {}",
            false_positive_rate
        )));
    }

    Ok(())
}

/// Calculate the false positive rate for given parameters
///
/// Formula: FPR = (1 - e^(-kn/m))^k
pub fn calculate_fpr(size_bits: u64, inserted: u64, hash_functions: u32) -> f64 {
    if size_bits == 0 {
        return 1.0;
    }
    let exponent = -(hash_functions as f64) * (inserted as f64) / (size_bits as f64);
    (1.0 - exponent.exp()).powi(hash_functions as i32)
}
