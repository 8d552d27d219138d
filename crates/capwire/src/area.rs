//! Affected-area heuristics for plain-text bulletins

use lazy_static::lazy_static;
use regex::Regex;

/// Fallback returned when no strategy matches
pub const AREA_NOT_FOUND: &str = "Affected area not found";

/// Locate the human-readable affected area in a raw bulletin
///
/// NWS plain-text bulletins have no structured location field, so this
/// is a best-effort heuristic. Two strategies run in order and the
/// first success wins:
///
/// 1. The line immediately following the all-caps product headline
///    (an upper-case line under 80 characters naming a Warning, Watch,
///    or Advisory), which usually lists the counties. Lines beginning
///    with `*` are bullet points, not areas.
/// 2. The `* WHERE...` bullet of the modern bulletin format.
///
/// Absence of a match is normal and expected; the literal
/// `"Affected area not found"` is returned.
///
/// ```
/// use capwire::extract_affected_area;
///
/// let text = "stuff\n* WHERE...Polk and Dallas Counties.\n* WHEN...";
/// assert_eq!(
///     "Polk and Dallas Counties.",
///     extract_affected_area(text)
/// );
/// assert_eq!("Affected area not found", extract_affected_area("no areas here"));
/// ```
pub fn extract_affected_area(raw_text: &str) -> String {
    lazy_static! {
        static ref WHERE_LINE: Regex =
            Regex::new(r"\* WHERE\.\.\.(.+)").expect("bad WHERE regexp");
    }

    let lines: Vec<&str> = raw_text.lines().collect();

    // Strategy 1: the line after the all-caps product headline.
    if let Some(at) = headline_line(&lines) {
        if let Some(next) = lines.get(at + 1) {
            let area = next.trim();
            if !area.is_empty() && !area.starts_with('*') {
                let area = area.strip_suffix("...").unwrap_or(area).trim();
                if !area.is_empty() {
                    return area.to_owned();
                }
            }
        }
    }

    // Strategy 2: the "* WHERE..." bullet.
    if let Some(mtc) = WHERE_LINE.captures(raw_text) {
        return mtc[1].trim().to_owned();
    }

    AREA_NOT_FOUND.to_owned()
}

// First line that looks like the canonical all-caps product headline.
fn headline_line(lines: &[&str]) -> Option<usize> {
    lines.iter().position(|line| {
        let line = line.trim();
        (line.contains("WARNING") || line.contains("WATCH") || line.contains("ADVISORY"))
            && line.len() < 80
            && line == line.to_uppercase()
    })
}
