use crate::error::Error;
use std::fmt;

/// Reference ellipsoids for the supported datums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ellipsoid {
    Wgs84,
    Grs80,
}

impl Ellipsoid {
    /// Semi-major axis in metres.
    pub const fn a(&self) -> f64 {
        6_378_137.0
    }
    /// Flattening.
    pub const fn f(&self) -> f64 {
        match self {
            Self::Wgs84 => 1.0 / 298.257_223_563,
            Self::Grs80 => 1.0 / 298.257_222_101,
        }
    }
    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        let f = self.f();
        2.0 * f - f * f
    }
}

/// A coordinate reference system identified by its EPSG code.
///
/// Only codes with a closed-form projection are representable:
/// - 4326  WGS84 geographic (degrees)
/// - 3857  WGS84 / Pseudo-Mercator
/// - 326xx WGS84 / UTM north, 327xx WGS84 / UTM south
/// - 258xx ETRS89 / UTM north (zones 28..=38)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    Geographic,
    WebMercator,
    Utm {
        epsg: u32,
        zone: u32,
        north: bool,
        ellipsoid: Ellipsoid,
    },
}

impl Crs {
    pub fn epsg(&self) -> u32 {
        match self {
            Self::Geographic => 4326,
            Self::WebMercator => 3857,
            Self::Utm { epsg, .. } => *epsg,
        }
    }

    /// Linear (metre) units. Area and slope math is only meaningful here.
    pub fn is_projected(&self) -> bool {
        !matches!(self, Self::Geographic)
    }
}

impl TryFrom<u32> for Crs {
    type Error = Error;
    fn try_from(epsg: u32) -> Result<Self, Self::Error> {
        let utm = |zone, north, ellipsoid| Self::Utm {
            epsg,
            zone,
            north,
            ellipsoid,
        };
        match epsg {
            4326 => Ok(Self::Geographic),
            3857 => Ok(Self::WebMercator),
            32601..=32660 => Ok(utm(epsg - 32600, true, Ellipsoid::Wgs84)),
            32701..=32760 => Ok(utm(epsg - 32700, false, Ellipsoid::Wgs84)),
            25828..=25838 => Ok(utm(epsg - 25800, true, Ellipsoid::Grs80)),
            _ => Err(Error::Transform(format!("unsupported CRS EPSG:{}", epsg))),
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}
