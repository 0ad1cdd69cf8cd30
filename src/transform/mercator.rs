//! Closed-form projections (Snyder 1987, USGS Prof. Paper 1395).
//!
//! Angles are in degrees at the boundary, radians inside.
use super::Ellipsoid;

const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;
const SPHERE: f64 = 6_378_137.0;
/// Latitude limit of the pseudo-mercator square.
pub const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_6;

fn central_meridian(zone: u32) -> f64 {
    ((zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians()
}

/// Meridional arc from equator to latitude `lat` (radians). Snyder eq. 3-21.
fn meridional_arc(ellipsoid: Ellipsoid, lat: f64) -> f64 {
    let e2 = ellipsoid.e2();
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    ellipsoid.a()
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
}

/// (longitude, latitude) → (easting, northing) in the given UTM zone.
pub fn geographic_to_utm(
    ellipsoid: Ellipsoid,
    lon_deg: f64,
    lat_deg: f64,
    zone: u32,
    north: bool,
) -> (f64, f64) {
    let a = ellipsoid.a();
    let e2 = ellipsoid.e2();
    let ep2 = e2 / (1.0 - e2);
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    let (sin_lat, cos_lat, tan_lat) = (lat.sin(), lat.cos(), lat.tan());

    let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let t = tan_lat * tan_lat;
    let c = ep2 * cos_lat * cos_lat;
    let aa = cos_lat * (lon - central_meridian(zone));
    let m = meridional_arc(ellipsoid, lat);

    let a2 = aa * aa;
    let a4 = a2 * a2;
    let a6 = a4 * a2;

    // Snyder eq. 8-9
    let easting = K0
        * n
        * (aa
            + (1.0 - t + c) * a2 * aa / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a4 * aa / 120.0)
        + FALSE_EASTING;
    // Snyder eq. 8-10
    let northing = K0
        * (m + n
            * tan_lat
            * (a2 / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0));
    match north {
        true => (easting, northing),
        false => (easting, northing + FALSE_NORTHING_SOUTH),
    }
}

/// (easting, northing) in the given UTM zone → (longitude, latitude).
pub fn utm_to_geographic(
    ellipsoid: Ellipsoid,
    easting: f64,
    northing: f64,
    zone: u32,
    north: bool,
) -> (f64, f64) {
    let a = ellipsoid.a();
    let e2 = ellipsoid.e2();
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let ep2 = e2 / (1.0 - e2);
    let x = easting - FALSE_EASTING;
    let y = match north {
        true => northing,
        false => northing - FALSE_NORTHING_SOUTH,
    };

    // footpoint latitude, Snyder eq. 7-19 and 3-26
    let m = y / K0;
    let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let (sin1, cos1, tan1) = (phi1.sin(), phi1.cos(), phi1.tan());
    let c1 = ep2 * cos1 * cos1;
    let t1 = tan1 * tan1;
    let w = 1.0 - e2 * sin1 * sin1;
    let n1 = a / w.sqrt();
    let r1 = a * (1.0 - e2) / w.powf(1.5);
    let d = x / (n1 * K0);
    let d2 = d * d;
    let d4 = d2 * d2;
    let d6 = d4 * d2;

    // Snyder eq. 8-17 and 8-18
    let lat = phi1
        - (n1 * tan1 / r1)
            * (d2 / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d4 / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d6
                    / 720.0);
    let lon = central_meridian(zone)
        + (d - (1.0 + 2.0 * t1 + c1) * d2 * d / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d4 * d
                / 120.0)
            / cos1;
    (lon.to_degrees(), lat.to_degrees())
}

/// (longitude, latitude) → pseudo-mercator (x, y).
pub fn geographic_to_web(lon_deg: f64, lat_deg: f64) -> (f64, f64) {
    let x = SPHERE * lon_deg.to_radians();
    let y = SPHERE * (std::f64::consts::FRAC_PI_4 + lat_deg.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Pseudo-mercator (x, y) → (longitude, latitude).
pub fn web_to_geographic(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / SPHERE).to_degrees();
    let lat = (2.0 * (y / SPHERE).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64, msg: &str) {
        let diff = (a - b).abs();
        assert!(diff < tol, "{msg}: expected {b}, got {a}, diff {diff}");
    }

    // pyproj: Transformer.from_crs(4326, 32630, always_xy=True).transform(-3.7037, 40.4168)
    #[test]
    fn madrid_to_utm30n() {
        let (e, n) = geographic_to_utm(Ellipsoid::Wgs84, -3.7037, 40.4168, 30, true);
        assert_close(e, 440_298.94, 1.0, "easting");
        assert_close(n, 4_474_257.31, 1.0, "northing");
    }

    #[test]
    fn equator_on_central_meridian() {
        let (e, n) = geographic_to_utm(Ellipsoid::Wgs84, -3.0, 0.0, 30, true);
        assert_close(e, 500_000.0, 1e-6, "easting");
        assert_close(n, 0.0, 1e-6, "northing");
        let (lon, lat) = utm_to_geographic(Ellipsoid::Wgs84, 500_000.0, 0.0, 30, true);
        assert_close(lon, -3.0, 1e-9, "longitude");
        assert_close(lat, 0.0, 1e-9, "latitude");
    }

    #[test]
    fn utm_inverse_recovers_madrid() {
        let (lon, lat) = utm_to_geographic(Ellipsoid::Wgs84, 440_298.94, 4_474_257.31, 30, true);
        assert_close(lon, -3.7037, 1e-4, "longitude");
        assert_close(lat, 40.4168, 1e-4, "latitude");
    }

    #[test]
    fn southern_hemisphere_round_trip() {
        let (e, n) = geographic_to_utm(Ellipsoid::Wgs84, -58.3816, -34.6037, 21, false);
        assert_close(e, 373_317.50, 1.0, "easting");
        assert_close(n, 6_170_036.17, 1.0, "northing");
        let (lon, lat) = utm_to_geographic(Ellipsoid::Wgs84, e, n, 21, false);
        assert_close(lon, -58.3816, 1e-8, "longitude");
        assert_close(lat, -34.6037, 1e-8, "latitude");
    }

    #[test]
    fn web_mercator_round_trip() {
        let (x, y) = geographic_to_web(7.15, 51.25);
        let (lon, lat) = web_to_geographic(x, y);
        assert_close(lon, 7.15, 1e-10, "longitude");
        assert_close(lat, 51.25, 1e-10, "latitude");
        assert_close(geographic_to_web(0.0, 0.0).1, 0.0, 1e-9, "equator");
    }
}
