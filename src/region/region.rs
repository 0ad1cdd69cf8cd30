use super::Bbox;
use serde::Deserialize;
use serde::Serialize;

/// Named rectangular area of interest in a single CRS.
///
/// A value object: validated on registration, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    name: String,
    #[serde(flatten)]
    bbox: Bbox,
    crs: u32,
}

impl Region {
    pub fn new(name: &str, min_x: f64, min_y: f64, max_x: f64, max_y: f64, crs: u32) -> Self {
        Self::from_bbox(name, Bbox::new(min_x, min_y, max_x, max_y), crs)
    }
    pub fn from_bbox(name: &str, bbox: Bbox, crs: u32) -> Self {
        Self {
            name: name.to_string(),
            bbox,
            crs,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn bbox(&self) -> &Bbox {
        &self.bbox
    }
    pub fn crs(&self) -> u32 {
        self.crs
    }
    pub fn area_km2(&self) -> f64 {
        self.bbox.area_km2()
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{:.1}, {:.1}, {:.1}, {:.1}] EPSG:{} ({:.2} km²)",
            self.name,
            self.bbox.min_x,
            self.bbox.min_y,
            self.bbox.max_x,
            self.bbox.max_y,
            self.crs,
            self.area_km2()
        )
    }
}

/// Regions shipped with the crate, all in ETRS89 / UTM 32N.
#[rustfmt::skip]
pub fn builtin() -> Vec<Region> {
    vec![
        Region::new("wuppertal_east",      372887.291,         5673639.129,       381263.991,         5680948.462,       25832),
        Region::new("koeln_center",        352218.5014303498,  5639892.920625344, 366761.715006059,   5649224.69687352,  25832),
        Region::new("wuppertal_elberfeld", 369943.2521041449,  5679155.476870068, 374403.90064715076, 5681661.825148035, 25832),
        Region::new("wuppertal_center",    369233.9560975032,  5678133.279248141, 375710.4075746999,  5682179.590222261, 25832),
    ]
}
