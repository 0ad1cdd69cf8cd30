use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// One row of a `road_segments_slope_*` table.
///
/// `fid` identifies the source road, so several segments share one.
/// `geometry` is GeoJSON in whatever CRS the query asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub fid: i64,
    pub geometry: Value,
    pub slope_pct: Option<f64>,
}

impl Segment {
    pub fn new(fid: i64, geometry: Value, slope_pct: Option<f64>) -> Self {
        Self {
            fid,
            geometry,
            slope_pct,
        }
    }
    /// The slope, if it is a usable number.
    pub fn slope(&self) -> Option<f64> {
        self.slope_pct.filter(|s| s.is_finite())
    }
}
