//! `GeoJSON` export of map primitives.
//!
//! Each primitive becomes two features: a `LineString` for the rule and a
//! `Point` for its direction marker. Styling travels in the feature
//! properties (`stroke`, `stroke-width`, `marker-color`) so generic viewers
//! can render the collection without extra code.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

use crate::map::MapPrimitive;

fn base_properties(primitive: &MapPrimitive, kind: &str) -> JsonObject {
    let mut props = JsonObject::new();
    props.insert("kind".to_string(), JsonValue::from(kind));
    props.insert(
        "from".to_string(),
        JsonValue::from(primitive.from_site.as_str()),
    );
    props.insert("to".to_string(), JsonValue::from(primitive.to_site.as_str()));
    props.insert("support".to_string(), JsonValue::from(primitive.support));
    props.insert(
        "confidence".to_string(),
        JsonValue::from(primitive.confidence),
    );
    props.insert("lift".to_string(), JsonValue::from(primitive.lift));
    props
}

fn line_feature(primitive: &MapPrimitive) -> Feature {
    let mut props = base_properties(primitive, "rule");
    props.insert("stroke".to_string(), JsonValue::from(primitive.color.css()));
    props.insert(
        "stroke-width".to_string(),
        JsonValue::from(primitive.stroke_width),
    );
    props.insert("popup".to_string(), JsonValue::from(primitive.popup.as_str()));
    props.insert(
        "tooltip".to_string(),
        JsonValue::from(primitive.tooltip.as_str()),
    );

    let [from, to] = &primitive.line;
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(vec![
            from.to_position(),
            to.to_position(),
        ]))),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

fn marker_feature(primitive: &MapPrimitive) -> Feature {
    let marker = &primitive.marker;
    let mut props = base_properties(primitive, "direction");
    props.insert(
        "marker-color".to_string(),
        JsonValue::from(marker.color.css()),
    );
    props.insert("sides".to_string(), JsonValue::from(marker.sides));
    props.insert("radius".to_string(), JsonValue::from(marker.radius));
    props.insert("rotation".to_string(), JsonValue::from(marker.rotation));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(marker.position.to_position()))),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

/// Converts map primitives into a `GeoJSON` feature collection.
#[must_use]
pub fn to_feature_collection(primitives: &[MapPrimitive]) -> FeatureCollection {
    let features = primitives
        .iter()
        .flat_map(|primitive| [line_feature(primitive), marker_feature(primitive)])
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use rule_map_rule_models::Rule;
    use rule_map_sites::jerusalem;

    use super::*;
    use crate::map::map_primitives;

    #[test]
    fn emits_line_and_marker_per_primitive() {
        let rules = vec![Rule::new("שער יפו", "הכותל המערבי", 0.12, 0.75, 1.3)];
        let collection = to_feature_collection(&map_primitives(&rules, jerusalem()));
        assert_eq!(collection.features.len(), 2);

        let line = &collection.features[0];
        let Some(Geometry {
            value: Value::LineString(coords),
            ..
        }) = &line.geometry
        else {
            panic!("expected LineString, got {:?}", line.geometry);
        };
        // GeoJSON positions are [lon, lat].
        assert!((coords[0][0] - 35.22755).abs() < 1e-9);
        assert!((coords[0][1] - 31.77661).abs() < 1e-9);

        let props = line.properties.as_ref().unwrap();
        assert_eq!(props["stroke"], "red");
        assert_eq!(props["kind"], "rule");

        let marker = &collection.features[1];
        assert!(matches!(
            marker.geometry,
            Some(Geometry {
                value: Value::Point(_),
                ..
            })
        ));
        assert_eq!(marker.properties.as_ref().unwrap()["marker-color"], "red");
    }

    #[test]
    fn empty_map_gives_empty_collection() {
        let collection = to_feature_collection(&[]);
        assert!(collection.features.is_empty());
        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
    }
}
