//! VTEC token decoding

use std::convert::TryFrom;
use std::fmt;

use thiserror::Error;

use crate::codes::{Action, Phenomenon, SignificanceLevel};

/// A decoded VTEC event descriptor
///
/// NWS products embed a compact, dot-delimited Valid Time Event Code
/// which encodes the issuing office, hazard type, severity tier,
/// tracking number, and validity window of an event:
///
/// ```txt
/// O.NEW.KDMX.SV.W.0030.240521T2254Z-240521T2330Z
/// ```
///
/// Two token shapes occur in practice and both decode with this type:
/// the CAP-embedded shape above, where onset and expiration are packed
/// into one dash-joined field, and the legacy plain-text shape where
/// they occupy two separate dot-delimited fields. The decoder detects
/// the shape by part count and by whether the seventh field contains a
/// dash.
///
/// ```
/// use capwire::{SignificanceLevel, VtecRecord};
///
/// let vtec = VtecRecord::decode("O.NEW.KDMX.SV.W.0030.240521T2254Z-240521T2330Z")
///     .expect("decode");
/// assert_eq!("KDMX", vtec.office());
/// assert_eq!("Severe Thunderstorm", vtec.phenomenon_label());
/// assert_eq!(SignificanceLevel::Warning, vtec.significance());
/// assert_eq!("2024-05-21T22:54:00Z", vtec.onset().as_str());
/// ```
///
/// Code dictionary lookups never fail: a code absent from the
/// dictionary passes through verbatim as its own label. Malformed
/// dates are likewise non-fatal; see [`VtecDate`].
///
/// The original token is retained losslessly and is available via
/// [`raw()`](VtecRecord::raw).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VtecRecord {
    raw: String,
    product_class: String,
    action: String,
    office: String,
    phenomenon: String,
    significance: String,
    event_tracking_number: String,
    onset: VtecDate,
    expiration: VtecDate,
}

/// Error decoding a [`VtecRecord`]
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VtecDecodeErr {
    /// Token has fewer dot-delimited fields than the minimum
    #[error("invalid VTEC token: too few dot-delimited fields")]
    TooFewParts,

    /// Combined time field does not split into onset and expiration
    #[error("invalid VTEC token: malformed time field")]
    MalformedTimeField,
}

impl VtecRecord {
    /// Decode a VTEC token
    ///
    /// The `token` must split on `.` into at least seven fields. The
    /// leading `/`, if present on the first field, is stripped before
    /// storage. An error is returned if the field count is
    /// insufficient or if the time field cannot be split into onset
    /// and expiration halves; *no other* condition is fatal.
    pub fn decode<S>(token: S) -> Result<Self, VtecDecodeErr>
    where
        S: AsRef<str>,
    {
        let raw = token.as_ref();
        let parts: Vec<&str> = raw.split('.').collect();
        if parts.len() < 7 {
            return Err(VtecDecodeErr::TooFewParts);
        }

        let product_class = parts[0].strip_prefix('/').unwrap_or(parts[0]);

        // shape detection: the plain-text form carries onset and
        // expiration as two separate fields, the CAP-embedded form
        // packs them into one dash-joined field
        let (onset, expiration) = if parts.len() >= 8 && !parts[6].contains('-') {
            (parts[6], parts[7])
        } else {
            let halves: Vec<&str> = parts[6].split('-').collect();
            if halves.len() < 2 {
                return Err(VtecDecodeErr::MalformedTimeField);
            }
            (halves[0], halves[1])
        };

        Ok(Self {
            raw: raw.to_owned(),
            product_class: product_class.to_owned(),
            action: parts[1].to_owned(),
            office: parts[2].to_owned(),
            phenomenon: parts[3].to_owned(),
            significance: parts[4].to_owned(),
            event_tracking_number: parts[5].to_owned(),
            onset: VtecDate::normalize(onset),
            expiration: VtecDate::normalize(expiration),
        })
    }

    /// Original token text, unchanged
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Product class field (`O` operational, `T` test, `E` experimental)
    ///
    /// The leading `/` has been stripped.
    pub fn product_class(&self) -> &str {
        &self.product_class
    }

    /// Three-letter action code, like "`NEW`"
    pub fn action_code(&self) -> &str {
        &self.action
    }

    /// Action as an enumerated type, if recognized
    pub fn action(&self) -> Option<Action> {
        Action::from_code(&self.action)
    }

    /// Human-readable action label
    ///
    /// Unrecognized action codes pass through verbatim.
    pub fn action_label(&self) -> &str {
        match self.action() {
            Some(act) => act.as_display_str(),
            None => &self.action,
        }
    }

    /// Four-letter issuing office identifier, like "`KDMX`"
    pub fn office(&self) -> &str {
        &self.office
    }

    /// Two-letter phenomenon code, like "`SV`"
    pub fn phenomenon_code(&self) -> &str {
        &self.phenomenon
    }

    /// Phenomenon as an enumerated type, if recognized
    pub fn phenomenon(&self) -> Option<Phenomenon> {
        Phenomenon::from_code(&self.phenomenon)
    }

    /// Human-readable phenomenon label
    ///
    /// Unrecognized phenomenon codes pass through verbatim.
    pub fn phenomenon_label(&self) -> &str {
        match self.phenomenon() {
            Some(phen) => phen.as_display_str(),
            None => &self.phenomenon,
        }
    }

    /// One-letter significance code, like "`W`"
    pub fn significance_code(&self) -> &str {
        &self.significance
    }

    /// Significance as an enumerated type
    ///
    /// Unrecognized codes map to [`SignificanceLevel::Unknown`].
    pub fn significance(&self) -> SignificanceLevel {
        SignificanceLevel::from(self.significance.as_str())
    }

    /// Human-readable significance label
    ///
    /// Unrecognized significance codes pass through verbatim.
    pub fn significance_label(&self) -> &str {
        match self.significance() {
            SignificanceLevel::Unknown => &self.significance,
            lvl => lvl.as_display_str(),
        }
    }

    /// Four-digit event tracking number
    ///
    /// Unique per office, phenomenon, and year, but NOT globally
    /// unique.
    pub fn event_tracking_number(&self) -> &str {
        &self.event_tracking_number
    }

    /// Event onset time
    pub fn onset(&self) -> &VtecDate {
        &self.onset
    }

    /// Event expiration time
    pub fn expiration(&self) -> &VtecDate {
        &self.expiration
    }

    /// Combined product type, like "`Severe Thunderstorm Warning`"
    pub fn product_type(&self) -> String {
        format!("{} {}", self.phenomenon_label(), self.significance_label())
    }
}

impl fmt::Display for VtecRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.raw.fmt(f)
    }
}

impl AsRef<str> for VtecRecord {
    #[inline]
    fn as_ref(&self) -> &str {
        self.raw()
    }
}

impl TryFrom<&str> for VtecRecord {
    type Error = VtecDecodeErr;

    #[inline]
    fn try_from(inp: &str) -> Result<Self, Self::Error> {
        Self::decode(inp)
    }
}

/// A VTEC timestamp, normalized when possible
///
/// VTEC validity times are twelve-character tokens of the shape
/// `YYMMDD` + `T` + `HHMM` + `Z`. Normalization rewrites them as
/// `20YY-MM-DDTHH:MM:00Z`. A token that fails validation is carried
/// through *unchanged* rather than rejected, so one malformed date
/// never aborts the surrounding decode. The two cases are kept
/// distinct at the type level so callers can log them differently:
///
/// ```
/// use capwire::VtecDate;
///
/// let good = VtecDate::normalize("240521T2254Z");
/// assert!(good.is_normalized());
/// assert_eq!("2024-05-21T22:54:00Z", good.as_str());
///
/// let bad = VtecDate::normalize("bogus");
/// assert!(!bad.is_normalized());
/// assert_eq!("bogus", bad.as_str());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VtecDate {
    /// Successfully normalized to `20YY-MM-DDTHH:MM:00Z`
    Normalized(String),

    /// Input failed validation and is carried through verbatim
    Unparsed(String),
}

impl VtecDate {
    /// Normalize a compact VTEC timestamp
    ///
    /// Trailing content after the first `Z` is truncated before
    /// validation; VTEC end times often carry a trailing `/`. If the
    /// remainder is not twelve bytes of ASCII digits with literal `T`
    /// and `Z` at positions 6 and 11, the *original* input is
    /// returned unchanged as [`VtecDate::Unparsed`]. This never
    /// fails, whatever the input.
    pub fn normalize<S>(input: S) -> Self
    where
        S: AsRef<str>,
    {
        let original = input.as_ref();
        let trimmed = match original.find('Z') {
            Some(at) => &original[..=at],
            None => original,
        };

        // digit checks keep the slicing below on char boundaries
        let bytes = trimmed.as_bytes();
        if bytes.len() != 12
            || bytes[6] != b'T'
            || bytes[11] != b'Z'
            || !bytes[..6].iter().all(u8::is_ascii_digit)
            || !bytes[7..11].iter().all(u8::is_ascii_digit)
        {
            return VtecDate::Unparsed(original.to_owned());
        }

        VtecDate::Normalized(format!(
            "20{}-{}-{}T{}:{}:00Z",
            &trimmed[0..2],
            &trimmed[2..4],
            &trimmed[4..6],
            &trimmed[7..9],
            &trimmed[9..11]
        ))
    }

    /// The timestamp string, normalized or verbatim
    pub fn as_str(&self) -> &str {
        match self {
            VtecDate::Normalized(s) => s,
            VtecDate::Unparsed(s) => s,
        }
    }

    /// True if the input validated and was rewritten
    pub fn is_normalized(&self) -> bool {
        matches!(self, VtecDate::Normalized(_))
    }
}

impl AsRef<str> for VtecDate {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for VtecDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_cap_shape() {
        let vtec =
            VtecRecord::decode("O.NEW.KDMX.SV.W.0030.240521T2254Z-240521T2330Z").expect("decode");

        assert_eq!(
            "O.NEW.KDMX.SV.W.0030.240521T2254Z-240521T2330Z",
            vtec.raw()
        );
        assert_eq!("O", vtec.product_class());
        assert_eq!("NEW", vtec.action_code());
        assert_eq!("New", vtec.action_label());
        assert_eq!("KDMX", vtec.office());
        assert_eq!("SV", vtec.phenomenon_code());
        assert_eq!("Severe Thunderstorm", vtec.phenomenon_label());
        assert_eq!("W", vtec.significance_code());
        assert_eq!("Warning", vtec.significance_label());
        assert_eq!("0030", vtec.event_tracking_number());
        assert_eq!("2024-05-21T22:54:00Z", vtec.onset().as_str());
        assert_eq!("2024-05-21T23:30:00Z", vtec.expiration().as_str());
        assert_eq!("Severe Thunderstorm Warning", vtec.product_type());
    }

    #[test]
    fn test_decode_plain_text_shape() {
        // onset and expiration as separate dot-delimited fields
        let vtec =
            VtecRecord::decode("/O.CON.KOAX.TO.W.0012.240521T2200Z.240521T2245Z/").expect("decode");

        assert_eq!("O", vtec.product_class());
        assert_eq!("CON", vtec.action_code());
        assert_eq!("Continued", vtec.action_label());
        assert_eq!("Tornado", vtec.phenomenon_label());
        assert_eq!("2024-05-21T22:00:00Z", vtec.onset().as_str());
        // trailing '/' is truncated by date normalization
        assert_eq!("2024-05-21T22:45:00Z", vtec.expiration().as_str());
    }

    #[test]
    fn test_decode_trailing_slash_on_combined_times() {
        let vtec =
            VtecRecord::decode("O.CAN.KGID.FF.W.0002.240601T0103Z-240601T0400Z/").expect("decode");
        assert_eq!("2024-06-01T04:00:00Z", vtec.expiration().as_str());
    }

    #[test]
    fn test_unknown_codes_pass_through() {
        let vtec =
            VtecRecord::decode("O.QQQ.KDMX.ZZ.Q.0001.240521T2254Z-240521T2330Z").expect("decode");

        assert_eq!(None, vtec.action());
        assert_eq!("QQQ", vtec.action_label());
        assert_eq!(None, vtec.phenomenon());
        assert_eq!("ZZ", vtec.phenomenon_label());
        assert_eq!(SignificanceLevel::Unknown, vtec.significance());
        assert_eq!("Q", vtec.significance_label());
        assert_eq!("ZZ Q", vtec.product_type());
    }

    #[test]
    fn test_decode_failures() {
        assert_eq!(Err(VtecDecodeErr::TooFewParts), VtecRecord::decode("A.B.C"));
        assert_eq!(Err(VtecDecodeErr::TooFewParts), VtecRecord::decode(""));
        assert_eq!(
            Err(VtecDecodeErr::MalformedTimeField),
            VtecRecord::decode("O.NEW.KDMX.SV.W.0030.240521T2254Z")
        );
    }

    #[test]
    fn test_malformed_dates_are_not_fatal() {
        let vtec = VtecRecord::decode("O.NEW.KDMX.SV.W.0030.garbage-alsogarbage").expect("decode");
        assert!(!vtec.onset().is_normalized());
        assert_eq!("garbage", vtec.onset().as_str());
        assert_eq!("alsogarbage", vtec.expiration().as_str());
    }

    #[test]
    fn test_date_normalize() {
        assert_eq!(
            VtecDate::Normalized("2024-05-21T22:54:00Z".to_owned()),
            VtecDate::normalize("240521T2254Z")
        );
        // trailing content after the first 'Z' is ignored
        assert_eq!(
            "2024-05-21T23:30:00Z",
            VtecDate::normalize("240521T2330Z/").as_str()
        );

        // lenient fallbacks, never a panic
        assert_eq!("bogus", VtecDate::normalize("bogus").as_str());
        assert_eq!("", VtecDate::normalize("").as_str());
        assert_eq!(
            "240521X2254Z",
            VtecDate::normalize("240521X2254Z").as_str()
        );
    }

    #[test]
    fn test_date_normalize_rejects_non_digit_fields() {
        // letters where digits belong
        assert_eq!("2405ABT2254Z", VtecDate::normalize("2405ABT2254Z").as_str());

        // a multibyte character straddling a field boundary must fall
        // through unparsed, not panic on slicing
        let date = "0\u{e9}000T0000Z";
        assert_eq!(12, date.len());
        assert!(!VtecDate::normalize(date).is_normalized());
        assert_eq!(date, VtecDate::normalize(date).as_str());
    }
}
