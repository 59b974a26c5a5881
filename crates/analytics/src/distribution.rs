//! Views over a simulated annual-loss sample: a histogram with "nice" currency-scaled
//! buckets and the loss-exceedance curve.

use crate::error::AnalyticsError;
use crate::format::format_compact;
use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

/// Default number of histogram buckets.
pub const DEFAULT_BIN_COUNT: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Histogram {
    pub step: f64,
    pub buckets: Vec<Bucket>,
}

impl Histogram {
    /// Bins `losses` into roughly `bins` buckets.
    ///
    /// The step is the raw width `(max - min) / bins` rounded up to one significant
    /// digit (e.g. 3,712 becomes 4,000), and bucket edges are multiples of the step.
    /// Values on or past the last edge count toward the last bucket.
    pub fn build(losses: &[f64], bins: usize) -> Result<Self, AnalyticsError> {
        if bins == 0 {
            return Err(AnalyticsError::InvalidBinCount(bins));
        }
        if let Some(i) = losses.iter().position(|v| !v.is_finite()) {
            return Err(AnalyticsError::NonFiniteSample(i));
        }

        let (min, max) = match losses.iter().copied().minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => return Ok(Self::default()),
            MinMaxResult::OneElement(v) => (v, v),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };

        if max <= min {
            return Ok(Self {
                step: 0.0,
                buckets: vec![Bucket {
                    lower: min,
                    upper: max,
                    count: losses.len(),
                    label: format_compact(min),
                }],
            });
        }

        let raw_step = (max - min) / bins as f64;
        let magnitude = 10f64.powi(raw_step.log10().floor() as i32);
        let step = (raw_step / magnitude).ceil() * magnitude;

        let start = (min / step).floor() * step;
        let end = (max / step).ceil() * step;
        let bucket_count = (((end - start) / step).round() as usize).max(1);

        let mut buckets: Vec<Bucket> = (0..bucket_count)
            .map(|i| {
                let lower = start + i as f64 * step;
                Bucket {
                    lower,
                    upper: lower + step,
                    count: 0,
                    label: format_compact(lower),
                }
            })
            .collect();

        for &value in losses {
            let index = ((value - start) / step).floor().max(0.0) as usize;
            buckets[index.min(bucket_count - 1)].count += 1;
        }

        Ok(Self { step, buckets })
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExceedancePoint {
    pub loss: f64,
    /// Share of trials with an annual loss at least this large.
    pub probability: f64,
}

/// Loss-exceedance curve: losses sorted descending, the i-th (1-based) of N paired
/// with probability i/N.
pub fn exceedance_curve(losses: &[f64]) -> Vec<ExceedancePoint> {
    let total = losses.len() as f64;
    losses
        .iter()
        .copied()
        .sorted_by(|a, b| b.total_cmp(a))
        .enumerate()
        .map(|(i, loss)| ExceedancePoint {
            loss,
            probability: (i + 1) as f64 / total,
        })
        .collect()
}
