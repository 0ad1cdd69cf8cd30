use super::mercator::*;
use super::Crs;
use crate::config::Config;
use crate::error::Error;
use crate::error::Result;
use crate::region::Bbox;
use crate::region::Region;

/// Reprojects a single (x, y) pair between two EPSG codes.
///
/// Coordinates are always (easting or longitude, northing or latitude), whatever
/// axis order the authority declares for the CRS. Projected-to-projected goes
/// through geographic coordinates; the ETRS89/WGS84 datum shift is ignored.
pub fn transform_point(x: f64, y: f64, from: u32, to: u32) -> Result<(f64, f64)> {
    if !x.is_finite() || !y.is_finite() {
        return Err(Error::Transform(format!("non-finite coordinate ({}, {})", x, y)));
    }
    let from = Crs::try_from(from)?;
    let to = Crs::try_from(to)?;
    if from == to {
        return Ok((x, y));
    }
    let (lon, lat) = to_geographic(from, x, y)?;
    let (x, y) = from_geographic(to, lon, lat)?;
    match x.is_finite() && y.is_finite() {
        true => Ok((x, y)),
        false => Err(Error::Transform(format!(
            "({}, {}) has no image in {}",
            lon, lat, to
        ))),
    }
}

/// Reprojects all four corners of the region and returns their envelope.
pub fn transform_bbox(region: &Region, to: u32) -> Result<Bbox> {
    let corners = region.bbox().corners();
    let corners = transform_ring(&corners, region.crs(), to)?;
    Bbox::envelope(&corners).ok_or_else(|| Error::Transform("empty corner set".to_string()))
}

/// Reprojects every vertex of a ring.
pub fn transform_ring(points: &[(f64, f64)], from: u32, to: u32) -> Result<Vec<(f64, f64)>> {
    points
        .iter()
        .map(|&(x, y)| transform_point(x, y, from, to))
        .collect()
}

fn to_geographic(crs: Crs, x: f64, y: f64) -> Result<(f64, f64)> {
    match crs {
        Crs::Geographic => check_geographic(x, y, 90.0).map(|_| (x, y)),
        Crs::WebMercator => Ok(web_to_geographic(x, y)),
        Crs::Utm {
            zone,
            north,
            ellipsoid,
            ..
        } => Ok(utm_to_geographic(ellipsoid, x, y, zone, north)),
    }
}

fn from_geographic(crs: Crs, lon: f64, lat: f64) -> Result<(f64, f64)> {
    match crs {
        Crs::Geographic => Ok((lon, lat)),
        Crs::WebMercator => {
            check_geographic(lon, lat, WEB_MERCATOR_MAX_LAT)?;
            Ok(geographic_to_web(lon, lat))
        }
        Crs::Utm {
            zone,
            north,
            ellipsoid,
            ..
        } => {
            check_geographic(lon, lat, 84.0)?;
            Ok(geographic_to_utm(ellipsoid, lon, lat, zone, north))
        }
    }
}

fn check_geographic(lon: f64, lat: f64, max_lat: f64) -> Result<()> {
    match lon.abs() <= 180.0 && lat.abs() <= max_lat {
        true => Ok(()),
        false => Err(Error::Transform(format!(
            "longitude/latitude ({}, {}) outside valid domain",
            lon, lat
        ))),
    }
}

/// Working/display reprojection bound to one configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformer {
    working: Crs,
    display: Crs,
}

impl Transformer {
    pub fn new(working: u32, display: u32) -> Result<Self> {
        let working = Crs::try_from(working)?;
        let display = Crs::try_from(display)?;
        match working.is_projected() {
            true => Ok(Self { working, display }),
            false => Err(Error::Config(format!(
                "working CRS {} must use linear units",
                working
            ))),
        }
    }
    pub fn working(&self) -> u32 {
        self.working.epsg()
    }
    pub fn display(&self) -> u32 {
        self.display.epsg()
    }
    pub fn to_display(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        transform_point(x, y, self.working(), self.display())
    }
    pub fn to_working(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        transform_point(x, y, self.display(), self.working())
    }
    pub fn ring_to_working(&self, ring: &[(f64, f64)]) -> Result<Vec<(f64, f64)>> {
        transform_ring(ring, self.display(), self.working())
    }
}

impl TryFrom<&Config> for Transformer {
    type Error = Error;
    fn try_from(config: &Config) -> Result<Self> {
        Self::new(config.working_crs, config.display_crs)
    }
}
