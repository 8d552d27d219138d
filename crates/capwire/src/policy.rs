//! Alert filtering policy

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::codes::SignificanceLevel;
use crate::vtec::VtecRecord;

/// Acceptance policy for inbound products
///
/// Loaded once at process start and passed by reference into the
/// [`ProductParser`](crate::ProductParser); immutable thereafter. The
/// defaults reproduce the production configuration; tests and embedders
/// can substitute their own lists with the `with_` methods.
///
/// ```
/// use capwire::FilterPolicy;
///
/// let policy = FilterPolicy::default()
///     .with_allowed_events(["Tornado Warning"])
///     .with_allowed_severities(["Extreme"]);
/// assert!(policy.should_emit(Some("Tornado Warning"), None, None));
/// assert!(!policy.should_emit(Some("Dense Fog Advisory"), None, None));
/// ```
///
/// The decision rule deliberately layers several signals, because no
/// single upstream signal (VTEC significance, CAP event name, CAP
/// severity) is reliably present or correct. See
/// [`should_emit()`](FilterPolicy::should_emit).
#[derive(Clone, Debug)]
pub struct FilterPolicy {
    allowed_events: Vec<String>,
    allowed_severities: Vec<String>,
    significance_accepts: Vec<SignificanceLevel>,
    vtec_token_pattern: Regex,
    ugc_pattern: Regex,
}

/// CAP event names accepted by default
pub const DEFAULT_ALLOWED_EVENTS: &[&str] = &[
    "Tornado Warning",
    "Severe Thunderstorm Warning",
    "Flash Flood Warning",
    "Flood Warning",
    "Special Marine Warning",
    "Tornado Watch",
    "Severe Thunderstorm Watch",
    "Flash Flood Watch",
    "Flood Watch",
    "Special Weather Statement",
    "Flood Advisory",
    "Marine Weather Statement",
];

/// Event name that bypasses all other filtering
const SPECIAL_WEATHER_STATEMENT: &str = "Special Weather Statement";

lazy_static! {
    // token is capture group 1, without the enclosing slashes
    static ref DEFAULT_VTEC_TOKEN: Regex = Regex::new(
        r"/([A-Z0-9]\.[A-Z]{3}\.[A-Z]{4}\.[A-Z]{2}\.[A-Z]\.[0-9]{4}\.[0-9]{6}T[0-9]{4}Z-[0-9]{6}T[0-9]{4}Z)/"
    )
    .expect("bad VTEC regexp");
    static ref DEFAULT_UGC_START: Regex =
        Regex::new(r"[A-Z]{2}[CZ][0-9]{3}").expect("bad UGC regexp");
}

impl Default for FilterPolicy {
    /// The production configuration
    ///
    /// Severity filtering is disabled by default (the list is empty);
    /// event names and VTEC significance carry the decision.
    fn default() -> Self {
        Self {
            allowed_events: DEFAULT_ALLOWED_EVENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_severities: Vec::new(),
            significance_accepts: vec![
                SignificanceLevel::Warning,
                SignificanceLevel::Watch,
                SignificanceLevel::Advisory,
                SignificanceLevel::Statement,
            ],
            vtec_token_pattern: DEFAULT_VTEC_TOKEN.clone(),
            ugc_pattern: DEFAULT_UGC_START.clone(),
        }
    }
}

impl FilterPolicy {
    /// New policy with the production defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the CAP event-name allow-list
    pub fn with_allowed_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_events = events.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the CAP severity allow-list
    ///
    /// An empty list disables the severity branch entirely.
    pub fn with_allowed_severities<I, S>(mut self, severities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_severities = severities.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the accepted VTEC significance set
    ///
    /// Applies to both the CAP and the plain-text path. The default is
    /// Warning, Watch, Advisory, and Statement.
    pub fn with_significance_accepts<I>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = SignificanceLevel>,
    {
        self.significance_accepts = levels.into_iter().collect();
        self
    }

    /// Replace the pattern locating a VTEC token in raw product text
    ///
    /// The token must be capture group 1, without the enclosing
    /// slashes.
    pub fn with_vtec_token_pattern(mut self, pattern: Regex) -> Self {
        self.vtec_token_pattern = pattern;
        self
    }

    /// Replace the pattern matching the start of a UGC string
    pub fn with_ugc_pattern(mut self, pattern: Regex) -> Self {
        self.ugc_pattern = pattern;
        self
    }

    /// Pattern locating a VTEC token in raw product text
    ///
    /// The token is capture group 1, without the enclosing slashes.
    pub fn vtec_token_pattern(&self) -> &Regex {
        &self.vtec_token_pattern
    }

    /// Pattern matching the start of a UGC string, like "`IAC001`"
    pub fn ugc_pattern(&self) -> &Regex {
        &self.ugc_pattern
    }

    /// Decide whether an alert should be emitted
    ///
    /// Signals are consulted in priority order:
    ///
    /// 1. A decoded VTEC record, when present, decides by its
    ///    significance code.
    /// 2. Without one, the CAP event name or CAP severity must be in
    ///    its allow-list.
    /// 3. Special Weather Statements force acceptance through either
    ///    signal — upstream sources are inconsistent about which one
    ///    carries the designation, so both are honored.
    pub fn should_emit(
        &self,
        cap_event: Option<&str>,
        severity: Option<&str>,
        vtec: Option<&VtecRecord>,
    ) -> bool {
        let mut emit = match vtec {
            Some(v) => self.significance_accepts.contains(&v.significance()),
            None => {
                let event_ok = cap_event
                    .map(|e| self.allowed_events.iter().any(|a| a == e))
                    .unwrap_or(false);
                let severity_ok = severity
                    .map(|s| self.allowed_severities.iter().any(|a| a == s))
                    .unwrap_or(false);
                event_ok || severity_ok
            }
        };

        if let Some(v) = vtec {
            if v.product_type().contains(SPECIAL_WEATHER_STATEMENT) {
                emit = true;
            }
        }
        if cap_event == Some(SPECIAL_WEATHER_STATEMENT) {
            emit = true;
        }

        if !emit {
            debug!(
                "rejected by policy: event {:?}, severity {:?}, vtec {:?}",
                cap_event,
                severity,
                vtec.map(VtecRecord::raw)
            );
        }
        emit
    }
}
