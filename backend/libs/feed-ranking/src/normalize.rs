/// Batch-relative min-max normalization

/// Rescale `x` into [0, 1] relative to the observed `[min, max]`.
///
/// A zero-variance batch (`max == min`) maps every value to `0.0`.
pub fn minmax(x: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return 0.0;
    }
    ((x - min) / (max - min)).clamp(0.0, 1.0)
}

/// Observed bounds of one metric across a candidate batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    /// Bounds of `values`, or `None` for an empty batch
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values.into_iter().fold(None, |range, value| match range {
            None => Some(MetricRange {
                min: value,
                max: value,
            }),
            Some(MetricRange { min, max }) => Some(MetricRange {
                min: min.min(value),
                max: max.max(value),
            }),
        })
    }

    pub fn scale(&self, x: f64) -> f64 {
        minmax(x, self.min, self.max)
    }

    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minmax_linear() {
        assert_eq!(minmax(0.0, 0.0, 10.0), 0.0);
        assert_eq!(minmax(5.0, 0.0, 10.0), 0.5);
        assert_eq!(minmax(10.0, 0.0, 10.0), 1.0);
        assert_eq!(minmax(-2.0, -4.0, 0.0), 0.5);
    }

    #[test]
    fn test_minmax_zero_variance_is_zero() {
        assert_eq!(minmax(3.0, 3.0, 3.0), 0.0);
        assert_eq!(minmax(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_range_from_values() {
        let range = MetricRange::from_values([4.0, -1.0, 9.5, 2.0]).unwrap();
        assert_eq!(range.min, -1.0);
        assert_eq!(range.max, 9.5);
        assert!(!range.is_degenerate());

        assert!(MetricRange::from_values(std::iter::empty()).is_none());

        let flat = MetricRange::from_values([7.0, 7.0]).unwrap();
        assert!(flat.is_degenerate());
        assert_eq!(flat.scale(7.0), 0.0);
    }
}
