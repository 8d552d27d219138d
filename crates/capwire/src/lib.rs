//! # capwire: NWS alert extraction and normalization
//!
//! This crate decodes severe-weather products distributed over the
//! [NWWS-OI](https://www.weather.gov/nwws/) wire and normalizes them
//! into a single alert record. It handles both product shapes found on
//! the wire:
//!
//! * [Common Alerting Protocol](https://docs.oasis-open.org/emergency/cap/v1.2/CAP-v1.2.html)
//!   (CAP) XML documents, entity-encoded inside a transport stanza; and
//! * legacy plain-text bulletins carrying a
//!   [VTEC](https://www.weather.gov/vtec/) event tracking token.
//!
//! ## Disclaimer
//!
//! This crate is dual-licensed MIT and Apache 2.0. Read these licenses
//! carefully as they may affect your rights.
//!
//! This crate has not been certified as a weather alerting system or
//! for any other purpose. The author **strongly discourages** its use
//! in any safety-critical applications. Always have at least two
//! methods available for receiving weather alerts.
//!
//! ## Example
//!
//! Obtaining the wire traffic is beyond the scope of this crate; bind
//! an XMPP client to the NWWS-OI service, or replay archived products.
//! Feed each payload to a [`ProductParser`].
//!
//! ```
//! use capwire::{FilterPolicy, ProductParser, ProductShape};
//!
//! let parser = ProductParser::new(FilterPolicy::default());
//!
//! let bulletin = "\
//! SEVERE THUNDERSTORM WARNING
//! Polk County IA...
//!
//! /O.NEW.KDMX.SV.W.0030.240521T2254Z-240521T2330Z/
//!
//! * WHERE...Polk and Dallas Counties
//! ";
//!
//! let alert = parser
//!     .parse(bulletin, ProductShape::PlainText)
//!     .expect("actionable warning");
//! assert_eq!("Severe Thunderstorm Warning", alert.product_type);
//! assert_eq!("2024-05-21T23:30:00Z", alert.expires);
//! ```
//!
//! The parser is total: malformed payloads and products the
//! [`FilterPolicy`] declines both come back as `None`, with
//! diagnostics on the [`log`](https://crates.io/crates/log) facade.
//! Accepted products become [`AlertRecord`]s, which serialize to
//! camelCase JSON via [serde](https://crates.io/crates/serde).
//!
//! An example VTEC token, as received "off the wire":
//!
//! ```txt
//! /O.NEW.KDMX.SV.W.0030.240521T2254Z-240521T2330Z/
//! ```
//!
//! Tokens can also be decoded on their own:
//!
//! ```
//! use capwire::{Action, Phenomenon, SignificanceLevel, VtecRecord};
//!
//! let vtec = VtecRecord::decode("O.NEW.KDMX.SV.W.0030.240521T2254Z-240521T2330Z")
//!     .expect("fail to parse");
//!
//! assert_eq!(Some(Action::New), vtec.action());
//! assert_eq!(Some(Phenomenon::SevereThunderstorm), vtec.phenomenon());
//! assert_eq!(SignificanceLevel::Warning, vtec.significance());
//! assert_eq!("Severe Thunderstorm Warning", vtec.product_type());
//! assert_eq!("2024-05-21T22:54:00Z", vtec.onset().as_str());
//! ```
//!
//! Unknown codes pass through verbatim rather than failing the decode,
//! so novel products degrade gracefully instead of vanishing.

mod alert;
mod area;
mod assembler;
mod cap;
mod codes;
mod policy;
mod vtec;

pub use alert::{AlertRecord, Geometry};
pub use area::{extract_affected_area, AREA_NOT_FOUND};
pub use assembler::{ProductParser, ProductShape};
pub use cap::{unwrap_envelope, CapAlert, CapArea, CapError, CapInfo, NamedValue};
pub use codes::{Action, Phenomenon, SignificanceLevel};
pub use policy::{FilterPolicy, DEFAULT_ALLOWED_EVENTS};
pub use vtec::{VtecDate, VtecDecodeErr, VtecRecord};
