//! Histogram types for aggregating latency observations into distributions.
//!
//! A [`Histogram`] collects every latency observation that lands in one time bucket. When
//! the bucket is summarized the histogram is closed into a [`Distribution`], which
//! answers the two questions a summary row asks: the mean and the tail percentile.
//!
//! # Example
//!
//! ```
//! use perfsum_aggregation::histogram::Histogram;
//!
//! let mut latency = Histogram::default();
//! latency.add_value(100.0);
//! latency.add_value(200.0);
//!
//! let distribution = latency.close();
//! assert_eq!(distribution.mean(), Some(150.0));
//! ```
//!
//! # Percentile estimator
//!
//! [`Distribution::percentile`] uses the "exclusive" method: the `N` sorted samples are
//! treated as order statistics of a population split into 100 equal-probability
//! intervals. For cut point `p` (1..=99):
//!
//! - `m = N + 1`
//! - `j = floor(p * m / 100)`, clamped to `1..=N-1`
//! - `delta = p * m - 100 * j`
//! - result `= (x[j-1] * (100 - delta) + x[j] * delta) / 100`, with `x` 0-indexed
//!
//! `j` and `delta` use exact integer arithmetic. With few samples the high cut points
//! extrapolate beyond the largest sample (for `[100, 200]`, p99 is `297`). With a
//! single sample every percentile is that sample.

use smallvec::SmallVec;

/// A histogram that collects latency observations for one bucket.
///
/// Every observation is kept exactly and sorted once, on [`close`](Self::close). Up to
/// 32 samples are stored inline, which covers sparsely populated buckets without
/// allocating. The running sum is kept in arrival order.
#[derive(Clone, Debug, Default)]
pub struct Histogram {
    samples: SmallVec<[f64; 32]>,
    sum: f64,
}

impl Histogram {
    /// Add a value to the histogram.
    pub fn add_value(&mut self, value: f64) {
        self.samples.push(value);
        self.sum += value;
    }

    /// Number of observations recorded so far.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no observation was recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Close the histogram into its sorted distribution.
    pub fn close(self) -> Distribution {
        let mut sorted = self.samples.into_vec();
        sorted.sort_by(f64::total_cmp);
        Distribution {
            sorted,
            sum: self.sum,
        }
    }
}

/// Closed histogram: the sorted observations of one bucket.
#[derive(Clone, Debug, PartialEq)]
pub struct Distribution {
    sorted: Vec<f64>,
    sum: f64,
}

impl Distribution {
    /// Number of observations.
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Whether the distribution holds no observation.
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// The observations, sorted ascending.
    pub fn samples(&self) -> &[f64] {
        &self.sorted
    }

    /// Arithmetic mean, or `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.sorted.is_empty() {
            None
        } else {
            Some(self.sum / self.sorted.len() as f64)
        }
    }

    /// The `p`-th percentile (cut point `p` of 100), or `None` when empty.
    ///
    /// See the [module documentation](self) for the estimator. `p` is clamped to
    /// `1..=99`.
    pub fn percentile(&self, p: u32) -> Option<f64> {
        exclusive_quantile(&self.sorted, 100, p.clamp(1, 99))
    }
}

/// Cut point `i` of `n` equal-probability intervals over `sorted`.
fn exclusive_quantile(sorted: &[f64], n: u32, i: u32) -> Option<f64> {
    match sorted {
        [] => None,
        [only] => Some(*only),
        _ => {
            // delta goes negative when j is clamped up, hence signed arithmetic
            let n = i64::from(n);
            let i = i64::from(i);
            let len = sorted.len() as i64;
            let m = len + 1;
            let j = (i * m / n).clamp(1, len - 1);
            let delta = (i * m - j * n) as f64;
            let n = n as f64;
            let lower = sorted[j as usize - 1];
            let upper = sorted[j as usize];
            Some((lower * (n - delta) + upper * delta) / n)
        }
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;
    use rstest::rstest;

    use super::Histogram;

    fn distribution(values: &[f64]) -> super::Distribution {
        let mut histogram = Histogram::default();
        for v in values {
            histogram.add_value(*v);
        }
        histogram.close()
    }

    #[rstest]
    #[case(&[100.0, 200.0], 297.0)]
    #[case(&[1.0, 2.0, 3.0, 4.0], 4.95)]
    #[case(&[4.0, 3.0, 2.0, 1.0], 4.95)]
    #[case(&[42.5], 42.5)]
    fn p99_matches_exclusive_method(#[case] values: &[f64], #[case] expected: f64) {
        let p99 = distribution(values).percentile(99).unwrap();
        check!((p99 - expected).abs() < 1e-9, "got {p99}");
    }

    #[test]
    fn p99_of_one_to_hundred() {
        let values: Vec<f64> = (1..=100).map(f64::from).collect();
        let p99 = distribution(&values).percentile(99).unwrap();
        check!((p99 - 99.99).abs() < 1e-9, "got {p99}");
    }

    #[test]
    fn low_cut_point_extrapolates_below() {
        // j is clamped up to 1, so the first interval is extended downwards
        let p1 = distribution(&[100.0, 200.0]).percentile(1).unwrap();
        check!((p1 - 3.0).abs() < 1e-9, "got {p1}");
    }

    #[test]
    fn median_interpolates() {
        let p50 = distribution(&[1.0, 2.0, 3.0, 4.0]).percentile(50).unwrap();
        check!((p50 - 2.5).abs() < 1e-9, "got {p50}");
    }

    #[test]
    fn empty_distribution() {
        let d = distribution(&[]);
        check!(d.is_empty());
        check!(d.mean().is_none());
        check!(d.percentile(99).is_none());
    }

    #[test]
    fn mean_and_sorted_samples() {
        let d = distribution(&[300.0, 100.0, 200.0]);
        check!(d.mean() == Some(200.0));
        check!(d.samples() == &[100.0, 200.0, 300.0]);
    }

    #[test]
    fn spills_past_inline_capacity() {
        let values: Vec<f64> = (0..40).rev().map(f64::from).collect();
        let mut histogram = Histogram::default();
        for v in &values {
            histogram.add_value(*v);
        }
        check!(histogram.len() == 40);
        let d = histogram.close();
        check!(d.samples().first() == Some(&0.0));
        check!(d.samples().last() == Some(&39.0));
        check!(d.mean() == Some(19.5));
    }
}
