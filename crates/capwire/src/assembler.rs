//! Product dispatch and alert assembly

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};

use crate::alert::AlertRecord;
use crate::area::extract_affected_area;
use crate::cap::{self, CapAlert};
use crate::policy::FilterPolicy;
use crate::vtec::VtecRecord;

/// Placeholder when a product carries no display text at all
const NO_TEXT_PLACEHOLDER: &str = "No detailed text available.";

/// Sentinel for absent timestamps and tokens
const NOT_AVAILABLE: &str = "N/A";

/// Shape of an inbound product payload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProductShape {
    /// A transport stanza carrying an entity-encoded CAP document
    CapEnvelope,

    /// A legacy plain-text bulletin with an embedded VTEC token
    PlainText,
}

/// Turns raw product payloads into normalized alerts
///
/// The orchestrating entry point of the pipeline: one inbound payload
/// in, at most one [`AlertRecord`] out. Construct it once with a
/// [`FilterPolicy`] and call [`parse()`](ProductParser::parse) per
/// message.
///
/// Every code path is total. Structural failures, policy rejections,
/// and malformed markup all surface as `None`; the caller's only
/// action in any of these cases is "do nothing." Diagnostics go to
/// the log with a bounded snippet of the offending buffer.
///
/// `parse()` takes `&self` and the parser holds no per-message state,
/// so one `ProductParser` may serve any number of threads.
///
/// ```
/// use capwire::{FilterPolicy, ProductParser, ProductShape};
///
/// let parser = ProductParser::new(FilterPolicy::default());
/// assert_eq!(None, parser.parse("not a product", ProductShape::PlainText));
/// ```
#[derive(Clone, Debug)]
pub struct ProductParser {
    policy: FilterPolicy,
}

impl ProductParser {
    /// New parser with the given acceptance policy
    pub fn new(policy: FilterPolicy) -> Self {
        Self { policy }
    }

    /// The parser's acceptance policy
    pub fn policy(&self) -> &FilterPolicy {
        &self.policy
    }

    /// Parse one inbound payload
    ///
    /// Returns the normalized alert, or `None` when the payload is
    /// malformed or the policy declines it.
    pub fn parse(&self, payload: &str, shape: ProductShape) -> Option<AlertRecord> {
        match shape {
            ProductShape::CapEnvelope => self.parse_cap_envelope(payload),
            ProductShape::PlainText => self.parse_plain_text(payload),
        }
    }

    // CAP path: unwrap → parse → extract → filter → assemble
    fn parse_cap_envelope(&self, payload: &str) -> Option<AlertRecord> {
        let doc = match cap::unwrap_envelope(payload) {
            Ok(doc) => doc,
            Err(err) => {
                warn!("discarding stanza: {}: {:?}", err, cap::snippet(payload));
                return None;
            }
        };

        let alert = match CapAlert::parse(&doc) {
            Ok(alert) => alert,
            Err(err) => {
                warn!("discarding CAP document: {}: {:?}", err, cap::snippet(&doc));
                return None;
            }
        };

        let info = alert.first_info()?;

        let vtec_token = info.vtec_token().map(str::to_owned);
        let vtec = vtec_token.as_deref().and_then(|token| {
            VtecRecord::decode(token)
                .map_err(|err| debug!("CAP VTEC parameter did not decode: {}: {}", err, token))
                .ok()
        });

        if !self
            .policy
            .should_emit(info.event.as_deref(), info.severity.as_deref(), vtec.as_ref())
        {
            return None;
        }

        // full display text: description plus protective instructions
        let mut full_text = info.description.clone().unwrap_or_default();
        if let Some(instruction) = &info.instruction {
            if !full_text.is_empty() {
                full_text.push_str("\n\n");
            }
            full_text.push_str("INSTRUCTIONS:\n");
            full_text.push_str(instruction);
        }
        let full_text = full_text.trim();

        let expires = info
            .expires
            .as_deref()
            .map(normalize_cap_expires)
            .or_else(|| vtec.as_ref().map(|v| v.expiration().as_str().to_owned()))
            .unwrap_or_else(|| NOT_AVAILABLE.to_owned());

        Some(AlertRecord {
            id: alert
                .identifier
                .clone()
                .unwrap_or_else(fallback_identifier),
            product_type: info
                .event
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
            affected_area: info.affected_area().to_owned(),
            headline: info
                .headline
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
            description: info
                .description
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
            expires,
            raw_text: if full_text.is_empty() {
                NO_TEXT_PLACEHOLDER.to_owned()
            } else {
                full_text.to_owned()
            },
            vtec_string: vtec_token.unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
            geometry: info.geometry(),
            states: info.states(),
        })
    }

    // Plain-text path: the VTEC token is the only reliable signal.
    fn parse_plain_text(&self, payload: &str) -> Option<AlertRecord> {
        let token = self
            .policy
            .vtec_token_pattern()
            .captures(payload)?
            .get(1)?
            .as_str();

        let vtec = match VtecRecord::decode(token) {
            Ok(vtec) => vtec,
            Err(err) => {
                warn!("discarding bulletin: {}: {}", err, token);
                return None;
            }
        };

        if !self.policy.should_emit(None, None, Some(&vtec)) {
            return None;
        }

        let affected_area = extract_affected_area(payload);
        let product_type = vtec.product_type();

        Some(AlertRecord {
            id: token.to_owned(),
            product_type: product_type.clone(),
            affected_area: affected_area.clone(),
            headline: format!("{} for {}", product_type, affected_area),
            description: payload.to_owned(),
            expires: vtec.expiration().as_str().to_owned(),
            raw_text: payload.to_owned(),
            vtec_string: token.to_owned(),
            geometry: None,
            states: ugc_states(&self.policy, payload),
        })
    }
}

// States named by UGC codes anywhere in a plain-text bulletin.
fn ugc_states(policy: &FilterPolicy, text: &str) -> Vec<String> {
    let mut states = BTreeSet::new();
    for ugc in policy.ugc_pattern().find_iter(text) {
        if let Some(prefix) = ugc.as_str().get(..2) {
            states.insert(prefix.to_owned());
        }
    }
    states.into_iter().collect()
}

// CAP expires is RFC 3339 with an offset; rewrite in UTC. A value that
// does not parse is carried through verbatim rather than dropped.
fn normalize_cap_expires(expires: &str) -> String {
    match DateTime::parse_from_rfc3339(expires) {
        Ok(ts) => ts
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        Err(err) => {
            debug!("CAP expires did not parse: {}: {}", err, expires);
            expires.to_owned()
        }
    }
}

// Process-local uniqueness token for CAP documents with no identifier.
fn fallback_identifier() -> String {
    Utc::now().timestamp_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::alert::Geometry;

    const CAP_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<alert xmlns="urn:oasis:names:tc:emergency:cap:1.2">
  <identifier>NWS-IDP-PROD-KDMX-SV-W-0030</identifier>
  <info>
    <event>Severe Thunderstorm Warning</event>
    <severity>Severe</severity>
    <headline>Severe Thunderstorm Warning issued for central Iowa</headline>
    <description>At 554 PM CDT, a severe thunderstorm was located near Ankeny.</description>
    <instruction>Move to an interior room on the lowest floor.</instruction>
    <expires>2024-05-21T18:30:00-05:00</expires>
    <parameter>
      <valueName>VTEC</valueName>
      <value>/O.NEW.KDMX.SV.W.0030.240521T2254Z-240521T2330Z/</value>
    </parameter>
    <area>
      <areaDesc>Polk, IA</areaDesc>
      <polygon>41.5,-93.7 41.6,-93.6 41.4,-93.5 41.5,-93.7</polygon>
      <geocode>
        <valueName>UGC</valueName>
        <value>IAC001</value>
      </geocode>
    </area>
    <area>
      <areaDesc>Dallas, IA</areaDesc>
      <circle>41.6,-94.0 5.0</circle>
      <geocode>
        <valueName>UGC</valueName>
        <value>IAZ045</value>
      </geocode>
    </area>
  </info>
</alert>"#;

    const PLAIN_BULLETIN: &str = "\
WUUS53 KDMX 212254
SVRDMX

SEVERE THUNDERSTORM WARNING
Polk County IA...

IAC001-212330-
/O.NEW.KDMX.SV.W.0030.240521T2254Z-240521T2330Z/

* WHERE...Polk and Dallas Counties
* WHEN...Until 630 PM CDT
";

    fn stanza(doc: &str) -> String {
        let encoded = doc
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        format!(r#"<x xmlns="nwws-oi" cccc="KDMX">{}</x>"#, encoded)
    }

    fn parser() -> ProductParser {
        ProductParser::new(FilterPolicy::default())
    }

    #[test]
    fn test_cap_path_end_to_end() {
        let alert = parser()
            .parse(&stanza(CAP_DOC), ProductShape::CapEnvelope)
            .expect("alert");

        assert_eq!("NWS-IDP-PROD-KDMX-SV-W-0030", alert.id);
        assert_eq!("Severe Thunderstorm Warning", alert.product_type);
        assert_eq!("Polk, IA", alert.affected_area);
        assert_eq!(
            "Severe Thunderstorm Warning issued for central Iowa",
            alert.headline
        );
        // offset timestamp rewritten in UTC
        assert_eq!("2024-05-21T23:30:00Z", alert.expires);
        assert_eq!(
            "/O.NEW.KDMX.SV.W.0030.240521T2254Z-240521T2330Z/",
            alert.vtec_string
        );
        assert!(alert.raw_text.contains("INSTRUCTIONS:\n"));
        assert!(alert
            .raw_text
            .starts_with("At 554 PM CDT, a severe thunderstorm"));
        assert_eq!(vec!["IA".to_owned()], alert.states);
        assert!(matches!(alert.geometry, Some(Geometry::Polygon { .. })));
    }

    #[test]
    fn test_cap_path_rejects_garbage() {
        let parser = parser();
        assert_eq!(None, parser.parse("", ProductShape::CapEnvelope));
        assert_eq!(
            None,
            parser.parse("<not-xml", ProductShape::CapEnvelope)
        );
        assert_eq!(
            None,
            parser.parse(
                "<message><body>chat traffic</body></message>",
                ProductShape::CapEnvelope
            )
        );
    }

    #[test]
    fn test_cap_vtec_overrides_event_allow_list() {
        // an event name outside the allow-list still emits when the
        // embedded VTEC significance is accepted
        let doc = CAP_DOC.replace("Severe Thunderstorm Warning", "Unlisted Event Type");
        let alert = parser()
            .parse(&stanza(&doc), ProductShape::CapEnvelope)
            .expect("alert");
        assert_eq!("Unlisted Event Type", alert.product_type);
    }

    #[test]
    fn test_cap_sps_without_vtec() {
        let doc = r#"<alert><identifier>sps-1</identifier><info>
<event>Special Weather Statement</event>
<severity>Moderate</severity>
<description>Strong storms possible.</description>
</info></alert>"#;
        let alert = parser()
            .parse(&stanza(doc), ProductShape::CapEnvelope)
            .expect("alert");
        assert_eq!("Special Weather Statement", alert.product_type);
        assert_eq!("N/A", alert.vtec_string);
        assert_eq!("N/A", alert.expires);
        assert_eq!("N/A", alert.affected_area);
    }

    #[test]
    fn test_cap_filter_rejection() {
        let doc = r#"<alert><identifier>fog-1</identifier><info>
<event>Dense Fog Advisory</event>
<severity>Minor</severity>
</info></alert>"#;
        assert_eq!(
            None,
            parser().parse(&stanza(doc), ProductShape::CapEnvelope)
        );
    }

    #[test]
    fn test_cap_expires_falls_back_to_vtec() {
        let doc = CAP_DOC.replace("<expires>2024-05-21T18:30:00-05:00</expires>", "");
        let alert = parser()
            .parse(&stanza(&doc), ProductShape::CapEnvelope)
            .expect("alert");
        // VTEC expiration fills in
        assert_eq!("2024-05-21T23:30:00Z", alert.expires);
    }

    #[test]
    fn test_cap_raw_text_placeholder() {
        let doc = r#"<alert><identifier>empty-1</identifier><info>
<event>Tornado Warning</event>
</info></alert>"#;
        let alert = parser()
            .parse(&stanza(doc), ProductShape::CapEnvelope)
            .expect("alert");
        assert_eq!(NO_TEXT_PLACEHOLDER, alert.raw_text);
        assert_eq!("N/A", alert.description);
    }

    #[test]
    fn test_plain_text_path() {
        let alert = parser()
            .parse(PLAIN_BULLETIN, ProductShape::PlainText)
            .expect("alert");

        assert_eq!(
            "O.NEW.KDMX.SV.W.0030.240521T2254Z-240521T2330Z",
            alert.id
        );
        assert_eq!("Severe Thunderstorm Warning", alert.product_type);
        assert_eq!("Polk County IA", alert.affected_area);
        assert_eq!(
            "Severe Thunderstorm Warning for Polk County IA",
            alert.headline
        );
        assert_eq!("2024-05-21T23:30:00Z", alert.expires);
        assert_eq!(PLAIN_BULLETIN, alert.raw_text);
        assert_eq!(None, alert.geometry);
        assert_eq!(vec!["IA".to_owned()], alert.states);
    }

    #[test]
    fn test_plain_text_requires_token() {
        let parser = parser();
        assert_eq!(None, parser.parse("", ProductShape::PlainText));
        assert_eq!(
            None,
            parser.parse("no VTEC token in here", ProductShape::PlainText)
        );
    }

    #[test]
    fn test_plain_text_filter_rejection() {
        // Outlook significance is not in the accepted set
        let bulletin =
            "/O.NEW.KDMX.SV.O.0030.240521T2254Z-240521T2330Z/\n* WHERE...Polk County\n";
        assert_eq!(None, parser().parse(bulletin, ProductShape::PlainText));
    }

    #[test]
    fn test_cap_with_mangled_vtec_dates_stays_total() {
        // multibyte garbage in the VTEC date fields must not escape
        // as a panic; the dates simply carry through unparsed
        let doc = CAP_DOC.replace("240521T2254Z", "0\u{e9}000T0000Z");
        let alert = parser()
            .parse(&stanza(&doc), ProductShape::CapEnvelope)
            .expect("alert");
        assert_eq!("Severe Thunderstorm Warning", alert.product_type);
    }

    #[test]
    fn test_idempotent_reparse() {
        let parser = parser();
        let stanza = stanza(CAP_DOC);
        let first = parser
            .parse(&stanza, ProductShape::CapEnvelope)
            .expect("alert");
        let second = parser
            .parse(&stanza, ProductShape::CapEnvelope)
            .expect("alert");
        // the CAP identifier is present, so ids are stable too
        assert_eq!(first, second);
    }

    #[test]
    fn test_normalize_cap_expires() {
        assert_eq!(
            "2024-05-21T23:30:00Z",
            normalize_cap_expires("2024-05-21T18:30:00-05:00")
        );
        assert_eq!(
            "2024-05-21T23:30:00Z",
            normalize_cap_expires("2024-05-21T23:30:00Z")
        );
        // unparseable values carry through verbatim
        assert_eq!("tomorrowish", normalize_cap_expires("tomorrowish"));
    }
}
