use super::*;
use serde::Serialize;

/// Bin count used by the dashboard.
pub const BINS: usize = 20;

/// Equal-width histogram of slopes within a range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Values outside `range` and non-finite values are ignored.
    /// An unbounded side of `range` shrinks to the smallest or largest
    /// value kept. The upper edge is inclusive so the top value lands in
    /// the last bin.
    pub fn new(slopes: &[f64], range: SlopeRange, bins: usize) -> Self {
        let bins = bins.max(1);
        let kept = slopes
            .iter()
            .copied()
            .filter(|s| s.is_finite() && range.contains(*s))
            .collect::<Vec<_>>();
        let lo = match range.min.is_finite() {
            true => range.min,
            false => kept.iter().copied().fold(f64::INFINITY, f64::min),
        };
        let hi = match range.max.is_finite() {
            true => range.max,
            false => kept.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        };
        let (lo, hi) = match lo.is_finite() && hi.is_finite() {
            true => (lo, hi),
            false => (0., 0.),
        };
        let width = (hi - lo) / bins as f64;
        let edges = (0..=bins)
            .map(|i| lo + width * i as f64)
            .collect::<Vec<_>>();
        let mut counts = vec![0; bins];
        for slope in kept {
            let i = match width > 0. {
                true => ((slope - lo) / width) as usize,
                false => 0,
            };
            counts[i.min(bins - 1)] += 1;
        }
        Self { edges, counts }
    }
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// The dashboard histogram over the usable slopes of `segments`.
pub fn histogram<'a, I>(segments: I, range: SlopeRange) -> Histogram
where
    I: IntoIterator<Item = &'a Segment>,
{
    let slopes = segments
        .into_iter()
        .filter_map(Segment::slope)
        .collect::<Vec<_>>();
    Histogram::new(&slopes, range, BINS)
}
