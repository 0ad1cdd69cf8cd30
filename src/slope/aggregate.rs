use super::*;
use serde_json::Value;
use serde_json::json;
use std::collections::BTreeMap;

/// Merges segment geometries into one multi-geometry per category.
///
/// Segments without a usable slope are skipped. Categories nobody falls
/// into are absent from the result.
pub fn aggregate<'a, I>(segments: I) -> BTreeMap<Category, Value>
where
    I: IntoIterator<Item = &'a Segment>,
{
    let mut groups = BTreeMap::<Category, Vec<&Value>>::new();
    for segment in segments {
        match segment.slope().and_then(classify) {
            Some(category) => groups.entry(category).or_default().push(&segment.geometry),
            None => log::trace!("segment of road {} has no slope category", segment.fid),
        }
    }
    groups
        .into_iter()
        .map(|(category, geometries)| (category, merge(geometries)))
        .collect()
}

/// Lines merge into a `MultiLineString`, anything else into a `GeometryCollection`.
pub fn merge(geometries: Vec<&Value>) -> Value {
    let lines = geometries.iter().all(|g| {
        matches!(
            g.get("type").and_then(Value::as_str),
            Some("LineString") | Some("MultiLineString")
        )
    });
    if lines {
        let coordinates = geometries
            .into_iter()
            .flat_map(|g| match g.get("type").and_then(Value::as_str) {
                Some("LineString") => vec![g["coordinates"].clone()],
                _ => g["coordinates"].as_array().cloned().unwrap_or_default(),
            })
            .collect::<Vec<_>>();
        json!({ "type": "MultiLineString", "coordinates": coordinates })
    } else {
        let geometries = geometries.into_iter().cloned().collect::<Vec<_>>();
        json!({ "type": "GeometryCollection", "geometries": geometries })
    }
}

/// Wraps per-category geometries as a GeoJSON `FeatureCollection` with
/// legend properties, in bucket order.
pub fn features(layers: &BTreeMap<Category, Value>) -> Value {
    let features = layers
        .iter()
        .map(|(category, geometry)| {
            json!({
                "type": "Feature",
                "geometry": geometry,
                "properties": {
                    "category": category.key(),
                    "label": category.label(),
                    "color": category.color(),
                },
            })
        })
        .collect::<Vec<_>>();
    json!({ "type": "FeatureCollection", "features": features })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x: f64) -> Value {
        json!({ "type": "LineString", "coordinates": [[x, 0.0], [x + 1.0, 1.0]] })
    }

    #[test]
    fn one_multiline_per_category() {
        let segments = vec![
            Segment::new(1, line(0.), Some(0.5)),
            Segment::new(1, line(1.), Some(1.0)),
            Segment::new(2, line(2.), Some(12.0)),
            Segment::new(3, line(3.), None),
            Segment::new(4, line(4.), Some(-1.0)),
        ];
        let layers = aggregate(&segments);
        assert_eq!(layers.len(), 2);
        let flat = &layers[&Category::Flat];
        assert_eq!(flat["type"], "MultiLineString");
        assert_eq!(flat["coordinates"].as_array().unwrap().len(), 2);
        assert_eq!(layers[&Category::VerySteep]["coordinates"][0][0][0], 2.0);
        assert!(!layers.contains_key(&Category::Gentle));
    }

    #[test]
    fn multilines_are_flattened() {
        let multi = json!({ "type": "MultiLineString", "coordinates": [[[0, 0], [1, 1]], [[2, 2], [3, 3]]] });
        let ref single = line(5.);
        let merged = merge(vec![&multi, single]);
        assert_eq!(merged["coordinates"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn mixed_geometries_become_a_collection() {
        let point = json!({ "type": "Point", "coordinates": [0, 0] });
        let ref single = line(0.);
        let merged = merge(vec![&point, single]);
        assert_eq!(merged["type"], "GeometryCollection");
        assert_eq!(merged["geometries"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn feature_collection_carries_legend() {
        let segments = vec![Segment::new(1, line(0.), Some(7.0))];
        let collection = features(&aggregate(&segments));
        assert_eq!(collection["features"][0]["properties"]["label"], "Steep (6-10%)");
        assert_eq!(collection["features"][0]["properties"]["color"], "#982d80");
    }
}
