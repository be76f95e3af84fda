//! Heart-rate-variability features.
//!
//! Both metrics need at least two intervals; [`HrvFeatures::from_intervals`]
//! enforces that, so go through it unless the input is already validated.

/// Population standard deviation of inter-beat intervals, in ms.
pub fn sdnn(intervals: &[f64]) -> f64 {
    let n = intervals.len() as f64;
    let mean = intervals.iter().sum::<f64>() / n;
    let variance = intervals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Root mean square of successive differences between intervals, in ms.
pub fn rmssd(intervals: &[f64]) -> f64 {
    let squared_diffs: f64 = intervals.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum();
    (squared_diffs / (intervals.len() - 1) as f64).sqrt()
}

/// The two-feature vector fed to the stress classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HrvFeatures {
    pub sdnn: f64,
    pub rmssd: f64,
}

impl HrvFeatures {
    /// Compute features from a flattened interval sequence.
    ///
    /// Returns `None` for fewer than two intervals; both metrics are
    /// undefined below that.
    pub fn from_intervals(intervals: &[f64]) -> Option<HrvFeatures> {
        if intervals.len() < 2 {
            return None;
        }
        Some(HrvFeatures {
            sdnn: sdnn(intervals),
            rmssd: rmssd(intervals),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_intervals() {
        // [800, 820, 810, 790]:
        //   mean = 805, deviations [-5, 15, 5, -15]
        //   population variance = (25 + 225 + 25 + 225) / 4 = 125
        //   successive diffs [20, -10, -20], mean square = 300
        let intervals = [800.0, 820.0, 810.0, 790.0];
        assert!((sdnn(&intervals) - 125.0_f64.sqrt()).abs() < 1e-9);
        assert!((rmssd(&intervals) - 300.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_constant_intervals_have_zero_variability() {
        let intervals = [800.0; 10];
        assert_eq!(sdnn(&intervals), 0.0);
        assert_eq!(rmssd(&intervals), 0.0);
    }

    #[test]
    fn test_two_intervals() {
        let features = HrvFeatures::from_intervals(&[800.0, 810.0]).unwrap();
        assert!((features.sdnn - 5.0).abs() < 1e-9);
        assert!((features.rmssd - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_intervals() {
        assert!(HrvFeatures::from_intervals(&[]).is_none());
        assert!(HrvFeatures::from_intervals(&[800.0]).is_none());
    }
}
