//! VTEC action codes

use std::fmt;
use std::str::FromStr;

use strum::EnumMessage;

/// VTEC action code
///
/// The action is the three-letter code in the second dot-delimited
/// field of a VTEC token. It describes what the issuing office is
/// doing with the event: starting it, continuing it, cancelling it,
/// and so on.
///
/// ```
/// use capwire::Action;
///
/// let act = Action::from_code("NEW").unwrap();
/// assert_eq!(Action::New, act);
/// assert_eq!("New", act.as_display_str());
/// assert_eq!("NEW", act.as_code_str());
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
pub enum Action {
    /// New event
    #[strum(serialize = "NEW", detailed_message = "New")]
    New,

    /// Event continued
    #[strum(serialize = "CON", detailed_message = "Continued")]
    Continued,

    /// Event expired
    #[strum(serialize = "EXP", detailed_message = "Expired")]
    Expired,

    /// Event cancelled
    #[strum(serialize = "CAN", detailed_message = "Cancelled")]
    Cancelled,

    /// Event upgraded to a more significant product
    #[strum(serialize = "UPG", detailed_message = "Upgraded")]
    Upgraded,

    /// Event validity time extended
    #[strum(serialize = "EXT", detailed_message = "Extended")]
    Extended,

    /// Correction to a previous issuance
    #[strum(serialize = "COR", detailed_message = "Corrected")]
    Corrected,

    /// Routine issuance
    #[strum(serialize = "ROU", detailed_message = "Routine")]
    Routine,
}

impl Action {
    /// Lookup a three-letter VTEC action code
    ///
    /// Returns `None` for unknown codes. Records carrying unknown
    /// codes report the raw code verbatim as the label.
    pub fn from_code<S>(code: S) -> Option<Self>
    where
        S: AsRef<str>,
    {
        Self::from_str(code.as_ref()).ok()
    }

    /// Human-readable string representation
    ///
    /// Converts to a human-readable string, like "`Continued`."
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().expect("missing definition")
    }

    /// VTEC string representation
    ///
    /// Returns the three-letter VTEC code for this `Action`.
    pub fn as_code_str(&self) -> &'static str {
        self.get_serializations()[0]
    }
}

impl AsRef<str> for Action {
    fn as_ref(&self) -> &'static str {
        self.as_code_str()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_display_str().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use strum::IntoEnumIterator;

    #[test]
    fn test_action_api() {
        assert_eq!(Some(Action::New), Action::from_code("NEW"));
        assert_eq!(Some(Action::Routine), Action::from_code("ROU"));
        assert_eq!(None, Action::from_code("XXX"));
        assert_eq!("Cancelled", format!("{}", Action::Cancelled));
    }

    #[test]
    fn test_action_roundtrip() {
        for act in Action::iter() {
            assert_eq!(Some(act), Action::from_code(act.as_code_str()));
        }
    }
}
