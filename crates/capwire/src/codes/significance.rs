//! VTEC significance codes

use std::fmt;

use strum::EnumMessage;

/// VTEC significance code
///
/// Usually constructed as part of a [`VtecRecord`](crate::VtecRecord).
/// The significance is the single-letter tier of a VTEC event,
/// occupying the fifth dot-delimited field of the token.
///
/// | Code | Significance                                        |
/// |------|-----------------------------------------------------|
/// | `W`  | [warning](SignificanceLevel::Warning)               |
/// | `A`  | [watch](SignificanceLevel::Watch)                   |
/// | `Y`  | [advisory](SignificanceLevel::Advisory)             |
/// | `S`  | [statement](SignificanceLevel::Statement)           |
/// | `F`  | [forecast](SignificanceLevel::Forecast)             |
/// | `O`  | [outlook](SignificanceLevel::Outlook)               |
/// | `N`  | [synopsis](SignificanceLevel::Synopsis)             |
///
/// Significance codes can be converted directly from or to string.
///
/// ```
/// use capwire::SignificanceLevel;
///
/// assert_eq!(SignificanceLevel::Watch, SignificanceLevel::from("A"));
/// assert_eq!("Warning", SignificanceLevel::Warning.as_display_str());
/// assert_eq!("W", SignificanceLevel::Warning.as_code_str());
/// assert_eq!("W", format!("{:#}", SignificanceLevel::Warning));
/// ```
///
/// Unrecognized codes are quietly represented as
/// [`SignificanceLevel::Unknown`]. A record carrying an unknown code
/// reports the raw code verbatim as its label.
///
/// ```
/// # use capwire::SignificanceLevel;
/// assert_eq!(SignificanceLevel::Unknown, SignificanceLevel::from("Q"));
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
#[repr(u8)]
pub enum SignificanceLevel {
    /// Warning: hazard is occurring, imminent, or highly likely
    #[strum(serialize = "W", detailed_message = "Warning")]
    Warning,

    /// Watch: conditions are favorable for the hazard
    #[strum(serialize = "A", detailed_message = "Watch")]
    Watch,

    /// Advisory: hazard of lesser severity than a warning
    #[strum(serialize = "Y", detailed_message = "Advisory")]
    Advisory,

    /// Statement: follow-up information on an ongoing event
    #[strum(serialize = "S", detailed_message = "Statement")]
    Statement,

    /// Forecast product
    #[strum(serialize = "F", detailed_message = "Forecast")]
    Forecast,

    /// Outlook product
    #[strum(serialize = "O", detailed_message = "Outlook")]
    Outlook,

    /// Synopsis product
    #[strum(serialize = "N", detailed_message = "Synopsis")]
    Synopsis,

    /// Unknown significance code
    #[strum(serialize = "", detailed_message = "Unknown")]
    Unknown,
}

impl SignificanceLevel {
    /// Parse from string
    ///
    /// Parses a VTEC significance code from a single-character `code`
    /// like "`W`" for [`SignificanceLevel::Warning`]. If the input does
    /// not match a known code, returns [`SignificanceLevel::Unknown`].
    pub fn from<S>(code: S) -> Self
    where
        S: AsRef<str>,
    {
        str::parse(code.as_ref()).unwrap_or_default()
    }

    /// Human-readable string representation
    ///
    /// Converts to a human-readable string, like "`Warning`."
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().expect("missing definition")
    }

    /// VTEC string representation
    ///
    /// Returns the one-character VTEC code for this
    /// `SignificanceLevel`. [`SignificanceLevel::Unknown`] has no code
    /// and returns the empty string.
    pub fn as_code_str(&self) -> &'static str {
        self.get_serializations()[0]
    }
}

impl std::default::Default for SignificanceLevel {
    fn default() -> Self {
        SignificanceLevel::Unknown
    }
}

impl AsRef<str> for SignificanceLevel {
    fn as_ref(&self) -> &'static str {
        self.as_code_str()
    }
}

impl fmt::Display for SignificanceLevel {
    /// Printable string
    ///
    /// * The normal form is a human-readable string like "`Advisory`"
    /// * The alternate form is a one-character code like "`Y`"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            self.as_code_str().fmt(f)
        } else {
            self.as_display_str().fmt(f)
        }
    }
}
