use super::*;
use crate::error::Error;
use crate::error::Result;
use crate::transform::Transformer;

/// How a drawn ring becomes a working-CRS bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope {
    /// Reproject every vertex, then take the envelope in the working CRS.
    #[default]
    Ring,
    /// Reproject only the south-west and north-east corners of the display envelope.
    /// Exact for axis-aligned rectangles, distorted for anything else.
    Corners,
}

/// Builds a working-CRS region from a closed ring drawn in the display CRS.
///
/// The result is not validated; register it to enforce the area and CRS policy.
pub fn derive(
    name: &str,
    ring: &[(f64, f64)],
    transformer: &Transformer,
    mode: Envelope,
) -> Result<Region> {
    if ring.len() < 4 {
        return Err(Error::validation(name, "ring needs at least four points"));
    }
    if ring.first() != ring.last() {
        return Err(Error::validation(name, "ring is not closed"));
    }
    let bbox = match mode {
        Envelope::Ring => {
            let projected = transformer.ring_to_working(ring)?;
            Bbox::envelope(&projected)
        }
        Envelope::Corners => {
            let display = Bbox::envelope(ring)
                .ok_or_else(|| Error::validation(name, "empty ring"))?;
            let (sw_x, sw_y) = transformer.to_working(display.min_x, display.min_y)?;
            let (ne_x, ne_y) = transformer.to_working(display.max_x, display.max_y)?;
            Some(Bbox::new(sw_x, sw_y, ne_x, ne_y))
        }
    }
    .ok_or_else(|| Error::validation(name, "empty ring"))?;
    log::debug!(
        "derived {} from {} ring points ({:?}): {:.2} km²",
        name,
        ring.len(),
        mode,
        bbox.area_km2()
    );
    Ok(Region::from_bbox(name, bbox, transformer.working()))
}
