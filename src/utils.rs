use crate::error::EncodeError;

use iso8601::{Date, DateTime, Time};
use xml::escape::escape_str_pcdata;

use std::borrow::Cow;

/// Returns whether `c` may appear in an XML 1.0 document.
fn is_xml_char(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => true,
        '\u{0}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}' => false,
        _ => true,
    }
}

/// Escape a string for use as XML characters.
///
/// The resulting string is *not* suitable for use in XML attributes, but XML-RPC doesn't use those.
/// Characters that cannot be expressed in XML 1.0 at all, not even as character references, are
/// rejected.
pub fn escape_xml(s: &str) -> Result<Cow<'_, str>, EncodeError> {
    match s.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(EncodeError::InvalidXmlChar(c)),
        None => Ok(escape_str_pcdata(s)),
    }
}

/// Formats a date/time in the `yyyyMMddTHH:mm:ss` layout used by `<dateTime.iso8601>`.
///
/// The layout has no room for fractional seconds, a UTC offset or week/ordinal dates, so those
/// are rejected instead of being dropped.
pub fn format_datetime(date_time: &DateTime) -> Result<String, EncodeError> {
    let Time {
        hour, minute, second, millisecond, tz_offset_hours, tz_offset_minutes
    } = date_time.time;

    if millisecond != 0 {
        return Err(EncodeError::UnsupportedDateTime(format!(
            "fractional seconds ({} ms)", millisecond
        )));
    }
    if tz_offset_hours != 0 || tz_offset_minutes != 0 {
        return Err(EncodeError::UnsupportedDateTime(format!(
            "UTC offset {:+03}:{:02}", tz_offset_hours, tz_offset_minutes.abs()
        )));
    }

    match date_time.date {
        Date::YMD { year, month, day } => {
            if !(0..=9999).contains(&year) {
                return Err(EncodeError::UnsupportedDateTime(format!("year {}", year)));
            }
            Ok(format!("{:04}{:02}{:02}T{:02}:{:02}:{:02}",
                year, month, day,
                hour, minute, second,
            ))
        }
        Date::Week { .. } => Err(EncodeError::UnsupportedDateTime("week date".into())),
        Date::Ordinal { .. } => Err(EncodeError::UnsupportedDateTime("ordinal date".into())),
    }
}
