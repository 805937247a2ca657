//! Date formats and parse/format helpers.
//!
//! Two fixed formats exist: the wire/storage format (`%Y-%m-%d`, shared
//! by the session store and the provider request bodies) and the format
//! users type into the chat (`%d.%m.%Y`).

use chrono::NaiveDate;

/// Format used in the session store and in provider request bodies.
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format users type into the chat (`24.06.2024`).
pub const USER_DATE_FORMAT: &str = "%d.%m.%Y";

/// Parse a date the user typed.  `None` on any format violation; the
/// caller re-prompts rather than erroring.
pub fn parse_user_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), USER_DATE_FORMAT).ok()
}

/// Parse a stored/wire date. `None` means the stored value is corrupt
/// and must be treated as absent.
pub fn parse_wire_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, WIRE_DATE_FORMAT).ok()
}

/// Render a date in the wire/storage format.
pub fn format_wire_date(date: NaiveDate) -> String {
    date.format(WIRE_DATE_FORMAT).to_string()
}
