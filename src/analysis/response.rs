use crate::region::Bbox;
use crate::region::Region;
use crate::slope::Corrected;
use crate::slope::Histogram;
use crate::slope::Summary;
use serde::Serialize;
use serde_json::Value;

/// A registered region with its extent in the display CRS.
#[derive(Debug, Clone, Serialize)]
pub struct RegionInfo {
    pub region: Region,
    pub area_km2: f64,
    pub display: Bbox,
}

/// Everything the dashboard needs for one region and slope range.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub region: String,
    pub baseline: Summary,
    pub range: Corrected,
    pub summary: Summary,
    pub layers: Value,
    pub histogram: Histogram,
}

/// DTM bounds in both CRSs plus the covered area as GeoJSON.
#[derive(Debug, Clone, Serialize)]
pub struct Extent {
    pub working: Bbox,
    pub display: Bbox,
    pub coverage: Value,
}
