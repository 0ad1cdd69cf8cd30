use crate::region::Envelope;
use crate::slope::SlopeRange;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct OverviewRequest {
    pub region: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl OverviewRequest {
    /// A range only when both bounds are given; otherwise the default applies.
    pub fn range(&self) -> Option<SlopeRange> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some(SlopeRange::new(min, max)),
            _ => None,
        }
    }
}

/// A closed ring drawn on the map, as `[lon, lat]` pairs in the display CRS.
#[derive(Debug, Clone, Deserialize)]
pub struct DrawRequest {
    pub name: String,
    pub ring: Vec<[f64; 2]>,
    #[serde(default)]
    pub envelope: Envelope,
}

impl DrawRequest {
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.ring.iter().map(|[x, y]| (*x, *y)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_range_means_default() {
        let request = serde_json::from_str::<OverviewRequest>(r#"{"region": "koeln_center", "min": 2.0}"#).unwrap();
        assert_eq!(request.range(), None);
        let request = serde_json::from_str::<OverviewRequest>(r#"{"min": 2.0, "max": 8.0}"#).unwrap();
        assert_eq!(request.range(), Some(SlopeRange::new(2., 8.)));
    }

    #[test]
    fn draw_defaults_to_ring_envelope() {
        let request = serde_json::from_str::<DrawRequest>(
            r#"{"name": "barmen", "ring": [[7.1, 51.2], [7.2, 51.2], [7.2, 51.3], [7.1, 51.2]]}"#,
        )
        .unwrap();
        assert_eq!(request.envelope, Envelope::Ring);
        assert_eq!(request.points()[1], (7.2, 51.2));
        let request = serde_json::from_str::<DrawRequest>(
            r#"{"name": "barmen", "ring": [], "envelope": "corners"}"#,
        )
        .unwrap();
        assert_eq!(request.envelope, Envelope::Corners);
    }
}
