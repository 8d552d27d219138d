//! VTEC phenomenon codes
//!
//! | Code | Phenomenon           |
//! |------|----------------------|
//! | `SV` | Severe Thunderstorm  |
//! | `TO` | Tornado              |
//! | `FF` | Flash Flood          |
//! | `FA` | Flood (areal)        |
//! | `FL` | Flood (river)        |
//! | `MA` | Marine               |
//! | `HU` | Hurricane            |
//! | `TR` | Tropical Storm       |
//! | `WI` | Wind                 |
//! | `BZ` | Blizzard             |
//! | `WS` | Winter Storm         |
//! | `WW` | Winter Weather       |
//! | `SQ` | Tornado (squall)     |
//! | `DS` | Dust Storm           |
//!
//! VTEC phenomenon codes are assigned in
//! [NWSI 10-1703](https://www.nws.noaa.gov/directives/sym/pd01017003curr.pdf).

use std::fmt;

use phf::phf_map;
use strum::EnumMessage;

/// VTEC phenomenon code
///
/// Usually constructed as part of a [`VtecRecord`](crate::VtecRecord).
/// The phenomenon is the two-letter hazard-type code occupying the
/// fourth dot-delimited field of a VTEC token.
///
/// ```
/// use capwire::Phenomenon;
///
/// let phen = Phenomenon::from_code("SV").unwrap();
/// assert_eq!(Phenomenon::SevereThunderstorm, phen);
/// assert_eq!("Severe Thunderstorm", phen.as_display_str());
/// assert_eq!("Severe Thunderstorm", format!("{}", phen));
/// ```
///
/// Unknown codes yield `None`. A record carrying an unknown code does
/// **not** discard it; the raw code passes through verbatim as the
/// label.
///
/// ```
/// # use capwire::Phenomenon;
/// assert_eq!(None, Phenomenon::from_code("ZZ"));
/// ```
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::EnumMessage, strum_macros::EnumIter,
)]
#[non_exhaustive]
pub enum Phenomenon {
    /// Severe Thunderstorm
    #[strum(detailed_message = "Severe Thunderstorm")]
    SevereThunderstorm,

    /// Tornado
    #[strum(detailed_message = "Tornado")]
    Tornado,

    /// Flash Flood
    #[strum(detailed_message = "Flash Flood")]
    FlashFlood,

    /// Flood, areal (`FA`) or river (`FL`)
    #[strum(detailed_message = "Flood")]
    Flood,

    /// Marine hazard
    #[strum(detailed_message = "Marine")]
    Marine,

    /// Hurricane
    #[strum(detailed_message = "Hurricane")]
    Hurricane,

    /// Tropical Storm
    #[strum(detailed_message = "Tropical Storm")]
    TropicalStorm,

    /// Wind
    #[strum(detailed_message = "Wind")]
    Wind,

    /// Blizzard
    #[strum(detailed_message = "Blizzard")]
    Blizzard,

    /// Winter Storm
    #[strum(detailed_message = "Winter Storm")]
    WinterStorm,

    /// Winter Weather
    #[strum(detailed_message = "Winter Weather")]
    WinterWeather,

    /// Dust Storm
    #[strum(detailed_message = "Dust Storm")]
    DustStorm,
}

/// Codebook of two-letter VTEC phenomenon codes
///
/// Several codes share one phenomenon: `FA` and `FL` are both floods,
/// and `SQ` (squall line) alerts display as tornados.
static CODEBOOK: phf::Map<&'static str, Phenomenon> = phf_map! {
    "SV" => Phenomenon::SevereThunderstorm,
    "TO" => Phenomenon::Tornado,
    "FF" => Phenomenon::FlashFlood,
    "FA" => Phenomenon::Flood,
    "FL" => Phenomenon::Flood,
    "MA" => Phenomenon::Marine,
    "HU" => Phenomenon::Hurricane,
    "TR" => Phenomenon::TropicalStorm,
    "WI" => Phenomenon::Wind,
    "BZ" => Phenomenon::Blizzard,
    "WS" => Phenomenon::WinterStorm,
    "WW" => Phenomenon::WinterWeather,
    "SQ" => Phenomenon::Tornado,
    "DS" => Phenomenon::DustStorm,
};

impl Phenomenon {
    /// Lookup a two-letter VTEC phenomenon code
    ///
    /// Returns `None` for codes absent from the codebook. Callers that
    /// need a lenient label should fall back to the raw code, as
    /// [`VtecRecord::phenomenon_label()`](crate::VtecRecord::phenomenon_label)
    /// does.
    pub fn from_code<S>(code: S) -> Option<Self>
    where
        S: AsRef<str>,
    {
        CODEBOOK.get(code.as_ref()).copied()
    }

    /// Human-readable string representation
    ///
    /// Converts to a human-readable string, like "`Severe Thunderstorm`."
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().expect("missing definition")
    }
}

impl fmt::Display for Phenomenon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_display_str().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    use strum::IntoEnumIterator;

    /// ensure the codebook is populated correctly
    #[test]
    fn check_codebook() {
        let mut covered = HashSet::new();

        for (key, val) in CODEBOOK.entries() {
            assert!(key.is_ascii());
            assert_eq!(key.len(), 2);
            assert_eq!(key, &key.to_uppercase());
            covered.insert(*val);
        }

        // every Phenomenon is reachable from at least one code
        for phen in Phenomenon::iter() {
            assert!(
                covered.contains(&phen),
                "phenomenon {} not covered by any codebook entry",
                phen
            );
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(
            Some(Phenomenon::SevereThunderstorm),
            Phenomenon::from_code("SV")
        );
        assert_eq!(Some(Phenomenon::Flood), Phenomenon::from_code("FA"));
        assert_eq!(Some(Phenomenon::Flood), Phenomenon::from_code("FL"));
        assert_eq!(Some(Phenomenon::Tornado), Phenomenon::from_code("SQ"));
        assert_eq!(None, Phenomenon::from_code("ZZ"));
        assert_eq!(None, Phenomenon::from_code(""));
    }
}
