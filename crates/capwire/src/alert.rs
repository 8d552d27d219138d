//! Canonical alert records handed to the distribution boundary

use serde::Serialize;

/// A normalized severe-weather alert
///
/// The unit of output of the [`ProductParser`](crate::ProductParser):
/// one inbound product either becomes exactly one `AlertRecord` or
/// nothing at all. Records are assembled once and never mutated;
/// downstream consumers must treat them as read-only.
///
/// Serialization uses the camelCase field names of the upstream wire
/// format, so a record can be handed to subscribers as JSON verbatim.
///
/// Consumers that de-duplicate should key on [`id`](AlertRecord::id):
/// it is the CAP document identifier when one is available, or the
/// raw VTEC token on the plain-text path, both of which are stable
/// across re-deliveries of the same product.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    /// Stable identifier for de-duplication
    pub id: String,

    /// Human product name, like "`Severe Thunderstorm Warning`"
    pub product_type: String,

    /// Best-effort human-readable location string
    pub affected_area: String,

    /// CAP headline, or a synthesized one on the plain-text path
    pub headline: String,

    /// Display text for tooltips and lists
    pub description: String,

    /// Normalized expiration timestamp, or the literal `"N/A"`
    pub expires: String,

    /// Full display text; guaranteed non-empty
    pub raw_text: String,

    /// The literal VTEC token, or the literal `"N/A"`
    pub vtec_string: String,

    /// Alert geometry, when the product carries one
    pub geometry: Option<Geometry>,

    /// De-duplicated two-letter state/territory codes
    pub states: Vec<String>,
}

/// Geographic shape attached to an alert
///
/// One authoritative shape per alert: when a CAP document carries
/// several area geometries, only the first is used (cumulative
/// jurisdiction is instead reflected in
/// [`AlertRecord::states`]).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// Closed ring of coordinate pairs, in document order (`lat, lon`)
    Polygon {
        /// Ring vertices, as issued
        coordinates: Vec<[f64; 2]>,
    },

    /// Circle around a center point
    Circle {
        /// Center coordinate pair, as issued
        coordinates: [f64; 2],
        /// Radius in meters
        #[serde(rename = "radiusMeters")]
        radius_meters: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_serialization() {
        let poly = Geometry::Polygon {
            coordinates: vec![[-93.7, 41.5], [-93.6, 41.6], [-93.5, 41.4], [-93.7, 41.5]],
        };
        let json = serde_json::to_value(&poly).unwrap();
        assert_eq!("Polygon", json["type"]);
        assert_eq!(-93.7, json["coordinates"][0][0].as_f64().unwrap());

        let circle = Geometry::Circle {
            coordinates: [-93.7, 41.5],
            radius_meters: 5000.0,
        };
        let json = serde_json::to_value(&circle).unwrap();
        assert_eq!("Circle", json["type"]);
        assert_eq!(5000.0, json["radiusMeters"].as_f64().unwrap());
    }

    #[test]
    fn test_record_field_names() {
        let record = AlertRecord {
            id: "x".into(),
            product_type: "Tornado Warning".into(),
            affected_area: "Polk County".into(),
            headline: "h".into(),
            description: "d".into(),
            expires: "N/A".into(),
            raw_text: "r".into(),
            vtec_string: "N/A".into(),
            geometry: None,
            states: vec!["IA".into()],
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!("Tornado Warning", json["productType"]);
        assert_eq!("Polk County", json["affectedArea"]);
        assert_eq!("r", json["rawText"]);
        assert_eq!("N/A", json["vtecString"]);
        assert!(json["geometry"].is_null());
    }
}
