//! Ensemble configuration options.

use crate::error::ForestError;

/// Strategy for the number of attributes each tree is trained on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxFeatures {
    /// Square root of total attributes.
    Sqrt,
    /// Log base 2 of total attributes.
    Log2,
    /// A fraction of total attributes (must be in (0.0, 1.0]).
    Fraction(f64),
    /// A fixed count.
    Fixed(usize),
    /// All attributes (plain bagging).
    All,
}

impl MaxFeatures {
    /// Resolve this strategy to a concrete attribute count.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidMaxFeatures`] when the count falls
    /// outside `[1, n_attributes]`.
    pub fn resolve(self, n_attributes: usize) -> Result<usize, ForestError> {
        let resolved = match self {
            MaxFeatures::Sqrt => (n_attributes as f64).sqrt().ceil() as usize,
            MaxFeatures::Log2 => (n_attributes as f64).log2().ceil().max(1.0) as usize,
            MaxFeatures::Fraction(f) if f > 0.0 && f <= 1.0 => {
                (n_attributes as f64 * f).ceil() as usize
            }
            MaxFeatures::Fraction(_) => 0,
            MaxFeatures::Fixed(n) => n,
            MaxFeatures::All => n_attributes,
        };
        if resolved == 0 || resolved > n_attributes {
            return Err(ForestError::InvalidMaxFeatures {
                max_features: resolved,
                n_attributes,
            });
        }
        Ok(resolved)
    }
}

/// Whether to compute out-of-bag evaluation during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OobMode {
    /// Compute OOB accuracy and confusion matrix.
    Enabled,
    /// Skip OOB evaluation.
    Disabled,
}
