use super::*;
use crate::error::Error;
use crate::error::Result;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;

/// Default ceiling for interactive ranges. Steeper values are mostly
/// stairs and raster artefacts.
pub const SLOPE_CAP: f64 = 40.0;

/// Inclusive slope filter in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeRange {
    pub min: f64,
    pub max: f64,
}

impl SlopeRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
    pub fn all() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }
    pub fn contains(&self, slope: f64) -> bool {
        self.min <= slope && slope <= self.max
    }
    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }
    pub fn check(&self) -> Result<()> {
        match self.is_inverted() || self.min.is_nan() || self.max.is_nan() {
            true => Err(Error::RangeInverted {
                min: self.min,
                max: self.max,
            }),
            false => Ok(()),
        }
    }
}

impl std::fmt::Display for SlopeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.2}%, {:.2}%]", self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count_segments: u64,
    pub count_distinct_roads: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

/// Statistics over segments whose slope lies in `range`, nulls excluded first.
pub fn summary_statistics<'a, I>(segments: I, range: SlopeRange) -> Result<Summary>
where
    I: IntoIterator<Item = &'a Segment>,
{
    range.check()?;
    let mut roads = BTreeSet::new();
    let mut slopes = Vec::new();
    for segment in segments {
        if let Some(slope) = segment.slope().filter(|s| range.contains(*s)) {
            roads.insert(segment.fid);
            slopes.push(slope);
        }
    }
    if slopes.is_empty() {
        return Err(Error::NotFound(format!("segments with slope in {}", range)));
    }
    slopes.sort_by(f64::total_cmp);
    let n = slopes.len();
    Ok(Summary {
        count_segments: n as u64,
        count_distinct_roads: roads.len() as u64,
        min: slopes[0],
        max: slopes[n - 1],
        mean: slopes.iter().sum::<f64>() / n as f64,
        median: median(&slopes),
    })
}

/// Continuous median of sorted values, interpolating between the middle pair.
fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    match n % 2 {
        1 => sorted[n / 2],
        _ => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.,
    }
}

/// A filter range after the interactive correction policy was applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Corrected {
    pub range: SlopeRange,
    pub corrected: bool,
}

/// `[min, min(max, cap)]` of the unfiltered statistics. The cap is dropped
/// when every slope lies above it, so the default never comes out inverted.
pub fn default_range(baseline: &Summary) -> SlopeRange {
    match baseline.min > SLOPE_CAP {
        true => SlopeRange::new(baseline.min, baseline.max),
        false => SlopeRange::new(baseline.min, baseline.max.min(SLOPE_CAP)),
    }
}

/// Missing ranges take the default silently. Inverted ranges are reset to
/// the default with a warning and flagged as corrected.
pub fn correct(requested: Option<SlopeRange>, baseline: &Summary) -> Corrected {
    match requested {
        None => Corrected {
            range: default_range(baseline),
            corrected: false,
        },
        Some(range) if range.check().is_err() => {
            let reset = default_range(baseline);
            log::warn!("slope range {} is inverted, using {}", range, reset);
            Corrected {
                range: reset,
                corrected: true,
            }
        }
        Some(range) => Corrected {
            range,
            corrected: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn segments() -> Vec<Segment> {
        vec![
            Segment::new(1, Value::Null, Some(0.5)),
            Segment::new(1, Value::Null, Some(2.0)),
            Segment::new(2, Value::Null, Some(4.0)),
            Segment::new(2, Value::Null, Some(8.0)),
            Segment::new(3, Value::Null, Some(55.0)),
            Segment::new(4, Value::Null, None),
            Segment::new(5, Value::Null, Some(f64::NAN)),
        ]
    }

    #[test]
    fn inclusive_filtered_statistics() {
        let ref segments = segments();
        let summary = summary_statistics(segments, SlopeRange::new(0.5, 8.0)).unwrap();
        assert_eq!(summary.count_segments, 4);
        assert_eq!(summary.count_distinct_roads, 2);
        assert_eq!(summary.min, 0.5);
        assert_eq!(summary.max, 8.0);
        assert_eq!(summary.mean, 3.625);
        assert_eq!(summary.median, 3.0);
    }

    #[test]
    fn nulls_never_count() {
        let ref segments = segments();
        let summary = summary_statistics(segments, SlopeRange::all()).unwrap();
        assert_eq!(summary.count_segments, 5);
        assert_eq!(summary.count_distinct_roads, 3);
        assert_eq!(summary.median, 4.0);
    }

    #[test]
    fn inverted_range_is_an_error() {
        let ref segments = segments();
        assert!(matches!(
            summary_statistics(segments, SlopeRange::new(9., 1.)),
            Err(Error::RangeInverted { .. })
        ));
    }

    #[test]
    fn empty_valid_range_is_not_found() {
        let ref segments = segments();
        assert!(matches!(
            summary_statistics(segments, SlopeRange::new(20., 30.)),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn correction_resets_to_capped_baseline() {
        let ref segments = segments();
        let ref baseline = summary_statistics(segments, SlopeRange::all()).unwrap();
        let corrected = correct(Some(SlopeRange::new(9., 1.)), baseline);
        assert!(corrected.corrected);
        assert_eq!(corrected.range, SlopeRange::new(0.5, SLOPE_CAP));
        let kept = correct(Some(SlopeRange::new(1., 9.)), baseline);
        assert!(!kept.corrected);
        assert_eq!(kept.range, SlopeRange::new(1., 9.));
        let default = correct(None, baseline);
        assert!(!default.corrected);
        assert_eq!(default.range.max, SLOPE_CAP);
    }

    #[test]
    fn default_range_survives_baseline_above_cap() {
        let ref steep = vec![
            Segment::new(1, Value::Null, Some(45.0)),
            Segment::new(2, Value::Null, Some(60.0)),
        ];
        let ref baseline = summary_statistics(steep, SlopeRange::all()).unwrap();
        let default = correct(None, baseline);
        assert_eq!(default.range, SlopeRange::new(45., 60.));
        assert_eq!(summary_statistics(steep, default.range).unwrap().count_segments, 2);
        let reset = correct(Some(SlopeRange::new(50., 10.)), baseline);
        assert!(reset.corrected);
        assert!(reset.range.check().is_ok());
        assert_eq!(summary_statistics(steep, reset.range).unwrap().count_segments, 2);
    }
}
