//! Errors returned by basket construction, valuation, and settlement.

use crate::types::AssetId;

/// All errors the core library can produce.
///
/// Pure computation has no transient failure modes, so nothing here is
/// retryable: every variant describes bad input from the caller.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// The price source has no entry for an asset the basket references.
    #[error("no price for asset {0}")]
    MissingPrice(AssetId),

    /// A target weight or trade names an asset outside the eligible set.
    #[error("asset {0} is not eligible for this basket")]
    UnknownAsset(AssetId),

    /// The eligible asset list names the same asset twice.
    #[error("duplicate eligible asset {0}")]
    DuplicateAsset(AssetId),

    /// Target weights must be non-negative fractions.
    #[error("negative target weight {1} for asset {0}")]
    NegativeWeight(AssetId, f64),

    /// A target weight is NaN or infinite.
    #[error("non-finite target weight {1} for asset {0}")]
    NonFiniteWeight(AssetId, f64),

    /// Target weights do not sum to 1.0 within the requested tolerance.
    #[error("target weights sum to {sum:.6}, expected 1.0 (tolerance {tolerance})")]
    InvalidWeights { sum: f64, tolerance: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            Error::MissingPrice(AssetId::new("yDAI")).to_string(),
            "no price for asset yDAI"
        );
        assert_eq!(
            Error::InvalidWeights {
                sum: 0.9,
                tolerance: 1e-9
            }
            .to_string(),
            "target weights sum to 0.900000, expected 1.0 (tolerance 0.000000001)"
        );
    }

    #[test]
    fn is_error() {
        let err: Box<dyn std::error::Error> = Box::new(Error::UnknownAsset(AssetId::new("X")));
        assert!(err.to_string().contains("not eligible"));
    }
}
