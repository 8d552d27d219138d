//! CAP/XML envelope unwrapping and field extraction
//!
//! NWWS-OI delivers CAP alert documents inside an `<x xmlns="nwws-oi">`
//! wrapper element whose text content is an *entity-encoded* copy of
//! the CAP XML. The double encoding is a property of the upstream
//! transport, not a bug: [`unwrap_envelope`] peels both layers and
//! returns the bare document string, and [`CapAlert::parse`] turns it
//! into a structured document.
//!
//! The XML-to-struct boundary always normalizes "single or repeated
//! element" to a `Vec`, so downstream code never branches on
//! cardinality.

use std::collections::BTreeSet;

use log::debug;
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

use crate::alert::Geometry;

/// Error unwrapping or parsing a CAP document
///
/// All of these are recoverable: one bad stanza must not affect
/// subsequent stanzas. Callers log the error with a bounded snippet of
/// the offending buffer and move on.
#[derive(Error, Debug)]
pub enum CapError {
    /// The stanza has no `<x>` wrapper element with text content
    #[error("stanza has no CAP-bearing wrapper element")]
    MissingWrapper,

    /// Neither an XML declaration nor an `<alert` root was found
    #[error("no XML declaration or alert root in decoded wrapper content")]
    NoDocumentStart,

    /// The document lacks the expected alert/info structure
    #[error("CAP document lacks alert/info structure")]
    MissingInfo,

    /// The XML parser rejected the input
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Extract the bare CAP XML document from a transport stanza
///
/// Peels the envelope in two steps: the stanza is parsed as XML to
/// recover the text content of the `<x>` wrapper (a hard precondition;
/// a stanza without it is not CAP-bearing), and that content is then
/// entity-decoded a second time. The real document start is located by
/// searching for an XML declaration, falling back to an `<alert` root
/// marker, and the string is sliced from there to the end.
pub fn unwrap_envelope(stanza: &str) -> Result<String, CapError> {
    let mut reader = Reader::from_str(stanza);
    let mut text = String::new();
    let mut found = false;
    let mut in_wrapper = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"x" => {
                found = true;
                in_wrapper = true;
            }
            Event::End(e) if e.local_name().as_ref() == b"x" => {
                in_wrapper = false;
            }
            Event::Text(t) if in_wrapper => {
                text.push_str(&t.unescape()?);
            }
            Event::CData(c) if in_wrapper => {
                text.push_str(&String::from_utf8_lossy(c.into_inner().as_ref()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !found || text.trim().is_empty() {
        return Err(CapError::MissingWrapper);
    }

    // second decoding pass for the transport's extra entity layer;
    // content with only one layer passes through on the error path
    let decoded = match unescape(&text) {
        Ok(cow) => cow.into_owned(),
        Err(_) => text,
    };

    let start = decoded
        .find("<?xml")
        .or_else(|| decoded.find("<alert"))
        .ok_or(CapError::NoDocumentStart)?;

    Ok(decoded[start..].trim().to_owned())
}

/// A parsed CAP alert document
///
/// Produced by [`CapAlert::parse`] from the output of
/// [`unwrap_envelope`]. Namespace prefixes (`cap:`) are stripped from
/// tag names during the parse. Repeated elements (`info`, `area`,
/// `parameter`, `geocode`, `polygon`) are always collected into
/// vectors, regardless of their cardinality in the source document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CapAlert {
    /// CAP document identifier
    pub identifier: Option<String>,

    /// The alert's `info` blocks, in document order
    pub infos: Vec<CapInfo>,
}

/// One CAP `info` block
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CapInfo {
    /// CAP event name, like "`Tornado Warning`"
    pub event: Option<String>,

    /// CAP severity, like "`Severe`"
    pub severity: Option<String>,

    /// Display headline
    pub headline: Option<String>,

    /// Long-form description
    pub description: Option<String>,

    /// Recommended protective actions
    pub instruction: Option<String>,

    /// RFC 3339 expiration timestamp, as issued
    pub expires: Option<String>,

    /// `parameter` name/value pairs
    pub parameters: Vec<NamedValue>,

    /// `area` blocks, in document order
    pub areas: Vec<CapArea>,
}

/// One CAP `area` block
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CapArea {
    /// Human-readable area description
    pub area_desc: Option<String>,

    /// Polygon strings, space-separated coordinate pairs
    pub polygons: Vec<String>,

    /// Circle strings, a coordinate pair and a radius in km
    pub circles: Vec<String>,

    /// `geocode` name/value pairs (UGC, SAME, ...)
    pub geocodes: Vec<NamedValue>,
}

/// A CAP `valueName`/`value` pair
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NamedValue {
    /// The `valueName` element text
    pub value_name: String,

    /// The `value` element text
    pub value: String,
}

impl CapAlert {
    /// Parse a bare CAP XML document
    ///
    /// Fails if the input is not well-formed XML or if the expected
    /// root alert/info structure is absent. Tag names are matched by
    /// local name, so `cap:`-prefixed documents parse identically to
    /// unprefixed ones.
    pub fn parse(xml: &str) -> Result<Self, CapError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut alert = CapAlert::default();
        let mut saw_alert = false;
        let mut path: Vec<String> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    match (path.last().map(String::as_str), name.as_str()) {
                        (None, "alert") => saw_alert = true,
                        (Some("alert"), "info") => alert.infos.push(CapInfo::default()),
                        (Some("info"), "parameter") => {
                            if let Some(info) = alert.infos.last_mut() {
                                info.parameters.push(NamedValue::default());
                            }
                        }
                        (Some("info"), "area") => {
                            if let Some(info) = alert.infos.last_mut() {
                                info.areas.push(CapArea::default());
                            }
                        }
                        (Some("area"), "polygon") => {
                            if let Some(area) = last_area(&mut alert) {
                                area.polygons.push(String::new());
                            }
                        }
                        (Some("area"), "circle") => {
                            if let Some(area) = last_area(&mut alert) {
                                area.circles.push(String::new());
                            }
                        }
                        (Some("area"), "geocode") => {
                            if let Some(area) = last_area(&mut alert) {
                                area.geocodes.push(NamedValue::default());
                            }
                        }
                        _ => {}
                    }
                    path.push(name);
                }
                Event::End(_) => {
                    path.pop();
                }
                Event::Text(t) => {
                    let text = t.unescape()?;
                    assign(&mut alert, &path, &text);
                }
                Event::CData(c) => {
                    let text = String::from_utf8_lossy(c.into_inner().as_ref()).into_owned();
                    assign(&mut alert, &path, &text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_alert || alert.infos.is_empty() {
            return Err(CapError::MissingInfo);
        }

        debug!(
            "parsed CAP document {:?}: {} info block(s)",
            alert.identifier,
            alert.infos.len()
        );
        Ok(alert)
    }

    /// First `info` block, the one field extraction reads
    pub fn first_info(&self) -> Option<&CapInfo> {
        self.infos.first()
    }
}

impl CapInfo {
    /// Find a `parameter` value by its `valueName`
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.value_name == name)
            .map(|p| p.value.as_str())
    }

    /// The embedded VTEC token, if the document carries one
    pub fn vtec_token(&self) -> Option<&str> {
        self.parameter("VTEC")
    }

    /// Human-readable affected area
    ///
    /// The `areaDesc` of the first area entry, or `"N/A"`.
    pub fn affected_area(&self) -> &str {
        self.areas
            .first()
            .and_then(|a| a.area_desc.as_deref())
            .unwrap_or("N/A")
    }

    /// Alert geometry
    ///
    /// The FIRST usable polygon or circle across all area entries
    /// wins; later geometries are ignored so that an alert never
    /// carries an ambiguous multi-polygon shape. Within one area a
    /// polygon takes precedence over a circle.
    pub fn geometry(&self) -> Option<Geometry> {
        for area in &self.areas {
            for polygon in &area.polygons {
                if let Some(geom) = parse_polygon(polygon) {
                    return Some(geom);
                }
            }
            for circle in &area.circles {
                if let Some(geom) = parse_circle(circle) {
                    return Some(geom);
                }
            }
        }
        None
    }

    /// Impacted state/territory codes
    ///
    /// Unlike geometry, state extraction is cumulative: every area
    /// entry's UGC geocodes contribute, and the first two characters
    /// of each UGC value become a state code. The result is
    /// de-duplicated and sorted.
    pub fn states(&self) -> Vec<String> {
        let mut states = BTreeSet::new();
        for area in &self.areas {
            for geo in &area.geocodes {
                if geo.value_name != "UGC" {
                    continue;
                }
                if let Some(prefix) = geo.value.get(..2) {
                    states.insert(prefix.to_owned());
                }
            }
        }
        states.into_iter().collect()
    }
}

// areas of the last info block, for the parser state machine
fn last_area(alert: &mut CapAlert) -> Option<&mut CapArea> {
    alert.infos.last_mut()?.areas.last_mut()
}

// Route element text to its slot by element path. Unknown paths are
// quietly ignored; CAP carries far more fields than we extract.
fn assign(alert: &mut CapAlert, path: &[String], text: &str) {
    let segs: Vec<&str> = path.iter().map(String::as_str).collect();
    match segs.as_slice() {
        ["alert", "identifier"] => append(&mut alert.identifier, text),
        ["alert", "info", field] => {
            if let Some(info) = alert.infos.last_mut() {
                match *field {
                    "event" => append(&mut info.event, text),
                    "severity" => append(&mut info.severity, text),
                    "headline" => append(&mut info.headline, text),
                    "description" => append(&mut info.description, text),
                    "instruction" => append(&mut info.instruction, text),
                    "expires" => append(&mut info.expires, text),
                    _ => {}
                }
            }
        }
        ["alert", "info", "parameter", field] => {
            if let Some(param) = alert.infos.last_mut().and_then(|i| i.parameters.last_mut()) {
                match *field {
                    "valueName" => param.value_name.push_str(text),
                    "value" => param.value.push_str(text),
                    _ => {}
                }
            }
        }
        ["alert", "info", "area", field] => {
            if let Some(area) = last_area(alert) {
                match *field {
                    "areaDesc" => append(&mut area.area_desc, text),
                    "polygon" => {
                        if let Some(poly) = area.polygons.last_mut() {
                            poly.push_str(text);
                        }
                    }
                    "circle" => {
                        if let Some(circle) = area.circles.last_mut() {
                            circle.push_str(text);
                        }
                    }
                    _ => {}
                }
            }
        }
        ["alert", "info", "area", "geocode", field] => {
            if let Some(geo) = last_area(alert).and_then(|a| a.geocodes.last_mut()) {
                match *field {
                    "valueName" => geo.value_name.push_str(text),
                    "value" => geo.value.push_str(text),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

fn append(slot: &mut Option<String>, text: &str) {
    slot.get_or_insert_with(String::new).push_str(text);
}

// "lat,lon lat,lon ..." → closed ring of coordinate pairs
fn parse_polygon(text: &str) -> Option<Geometry> {
    let coordinates: Vec<[f64; 2]> = text
        .split_whitespace()
        .filter_map(parse_pair)
        .collect();

    if coordinates.is_empty() {
        None
    } else {
        Some(Geometry::Polygon { coordinates })
    }
}

// "lat,lon radiusKm" → circle with radius in meters
fn parse_circle(text: &str) -> Option<Geometry> {
    let mut tokens = text.split_whitespace();
    let center = parse_pair(tokens.next()?)?;
    let radius_km: f64 = tokens.next()?.parse().ok()?;
    if tokens.next().is_some() {
        return None;
    }

    Some(Geometry::Circle {
        coordinates: center,
        radius_meters: radius_km * 1000.0,
    })
}

fn parse_pair(token: &str) -> Option<[f64; 2]> {
    let (first, second) = token.split_once(',')?;
    Some([first.parse().ok()?, second.parse().ok()?])
}

/// Bounded snippet of an offending buffer, for diagnostics
pub(crate) fn snippet(buf: &str) -> String {
    buf.chars().take(500).collect()
}
