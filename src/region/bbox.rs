use serde::Deserialize;
use serde::Serialize;

/// Area in square kilometres of an extent measured in metres.
pub fn area_km2(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> f64 {
    (max_x - min_x) * (max_y - min_y) / 1_000_000.
}

/// Axis-aligned extent in (x, y) order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bbox {
    #[serde(rename = "minx")]
    pub min_x: f64,
    #[serde(rename = "miny")]
    pub min_y: f64,
    #[serde(rename = "maxx")]
    pub max_x: f64,
    #[serde(rename = "maxy")]
    pub max_y: f64,
}

impl Bbox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest box containing every point. `None` for an empty slice.
    pub fn envelope(points: &[(f64, f64)]) -> Option<Self> {
        points.split_first().map(|(&(x, y), rest)| {
            rest.iter()
                .fold(Self::new(x, y, x, y), |b, &(x, y)| Self {
                    min_x: b.min_x.min(x),
                    min_y: b.min_y.min(y),
                    max_x: b.max_x.max(x),
                    max_y: b.max_y.max(y),
                })
        })
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
    pub fn area_km2(&self) -> f64 {
        area_km2(self.min_x, self.min_y, self.max_x, self.max_y)
    }
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.,
            (self.min_y + self.max_y) / 2.,
        )
    }
    /// SW, SE, NE, NW.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.min_x, self.min_y),
            (self.max_x, self.min_y),
            (self.max_x, self.max_y),
            (self.min_x, self.max_y),
        ]
    }
    pub fn is_finite(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
    }
}
