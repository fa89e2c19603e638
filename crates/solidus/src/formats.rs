//! The format registry and the bundled format validators.
//!
//! Formats annotate by default; assertion mode is selected per build (or by
//! a meta-schema carrying the format-assertion vocabulary). The process-wide
//! registry is read-mostly: validation only takes the read side, and
//! [`register_format`] is the rare writer.
use std::{
    net::{Ipv4Addr, Ipv6Addr},
    str::FromStr,
    sync::{Arc, RwLock},
};

use fancy_regex::Regex;
use once_cell::sync::Lazy;
use solidus_referencing::{Uri, UriRef};
use solidus_value::{Pointer, RelativePointer, Value};
use uuid_simd::{parse_hyphenated, Out};

/// A named format check.
///
/// `is_valid` must be cheap; `convert` may return a normalized value used
/// as the format annotation.
pub trait Format: Send + Sync {
    fn is_valid(&self, instance: &Value) -> bool;

    /// A normalized representation, if the format defines one.
    fn convert(&self, instance: &Value) -> Option<Value> {
        let _ = instance;
        None
    }
}

impl<F> Format for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_str() {
            Some(text) => self(text),
            None => true,
        }
    }
}

type Registry = ahash::AHashMap<&'static str, Arc<dyn Format>>;

static FORMATS: Lazy<RwLock<Registry>> = Lazy::new(|| {
    let mut registry = Registry::default();
    macro_rules! builtin {
        ($name:literal, $func:expr) => {
            registry.insert($name, Arc::new($func as fn(&str) -> bool) as Arc<dyn Format>);
        };
    }
    builtin!("date", is_valid_date);
    builtin!("date-time", is_valid_datetime);
    builtin!("duration", is_valid_duration);
    builtin!("email", is_valid_email);
    builtin!("hostname", is_valid_hostname);
    builtin!("idn-email", is_valid_idn_email);
    builtin!("idn-hostname", is_valid_idn_hostname);
    builtin!("ipv4", is_valid_ipv4);
    builtin!("ipv6", is_valid_ipv6);
    builtin!("iri", is_valid_uri);
    builtin!("iri-reference", is_valid_uri_reference);
    builtin!("json-pointer", is_valid_json_pointer);
    builtin!("regex", is_valid_regex);
    builtin!("relative-json-pointer", is_valid_relative_json_pointer);
    builtin!("time", is_valid_time);
    builtin!("uri", is_valid_uri);
    builtin!("uri-reference", is_valid_uri_reference);
    builtin!("uri-template", is_valid_uri_template);
    builtin!("uuid", is_valid_uuid);
    RwLock::new(registry)
});

/// Register (or replace) a format process-wide. Prefer the per-build
/// [`crate::ValidationOptions::with_format`] unless the format really is
/// global.
pub fn register_format(name: &'static str, format: Arc<dyn Format>) {
    FORMATS
        .write()
        .expect("format registry poisoned")
        .insert(name, format);
}

/// Fetch a registered format for validation; read-locked only briefly.
pub(crate) fn lookup(name: &str) -> Option<Arc<dyn Format>> {
    FORMATS
        .read()
        .expect("format registry poisoned")
        .get(name)
        .cloned()
}

fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// `full-date` from RFC 3339: `YYYY-MM-DD` with a real calendar check.
fn is_valid_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let digits = |range: std::ops::Range<usize>| -> Option<u16> {
        let mut result = 0_u16;
        for index in range {
            let byte = bytes[index];
            if !byte.is_ascii_digit() {
                return None;
            }
            result = result * 10 + u16::from(byte - b'0');
        }
        Some(result)
    };
    let (Some(year), Some(month), Some(day)) = (digits(0..4), digits(5..7), digits(8..10)) else {
        return false;
    };
    if !(1..=12).contains(&month) || day == 0 {
        return false;
    }
    let max_day = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    };
    day <= max_day
}

/// `full-time` from RFC 3339, including the leap-second rule.
fn is_valid_time(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() < 9 {
        return false;
    }
    let digit_pair = |offset: usize| -> Option<u8> {
        let high = bytes.get(offset)?;
        let low = bytes.get(offset + 1)?;
        if high.is_ascii_digit() && low.is_ascii_digit() {
            Some((high - b'0') * 10 + (low - b'0'))
        } else {
            None
        }
    };
    let (Some(hour), Some(minute), Some(second)) = (digit_pair(0), digit_pair(3), digit_pair(6))
    else {
        return false;
    };
    if bytes[2] != b':' || bytes[5] != b':' {
        return false;
    }
    if hour > 23 || minute > 59 || second > 60 {
        return false;
    }
    let mut position = 8;
    if bytes.get(position) == Some(&b'.') {
        position += 1;
        let fraction_start = position;
        while bytes.get(position).is_some_and(u8::is_ascii_digit) {
            position += 1;
        }
        if position == fraction_start {
            return false;
        }
    }
    let (offset_hour, offset_minute) = match bytes.get(position) {
        Some(b'Z' | b'z') => {
            if position + 1 != bytes.len() {
                return false;
            }
            (0, 0)
        }
        Some(sign @ (b'+' | b'-')) => {
            if position + 6 != bytes.len() || bytes[position + 3] != b':' {
                return false;
            }
            let (Some(offset_hour), Some(offset_minute)) =
                (digit_pair(position + 1), digit_pair(position + 4))
            else {
                return false;
            };
            if offset_hour > 23 || offset_minute > 59 {
                return false;
            }
            if *sign == b'-' {
                (-i32::from(offset_hour), -i32::from(offset_minute))
            } else {
                (i32::from(offset_hour), i32::from(offset_minute))
            }
        }
        _ => return false,
    };
    if second == 60 {
        // Leap seconds only exist at 23:59:60 UTC.
        let total = i32::from(hour) * 60 + i32::from(minute) - (offset_hour * 60 + offset_minute);
        let utc = total.rem_euclid(24 * 60);
        return utc == 23 * 60 + 59;
    }
    true
}

fn is_valid_datetime(value: &str) -> bool {
    let Some(position) = value.find(['T', 't']) else {
        return false;
    };
    is_valid_date(&value[..position]) && is_valid_time(&value[position + 1..])
}

/// ISO 8601 duration as used by RFC 3339 appendix A.
fn is_valid_duration(value: &str) -> bool {
    static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^P(?:\d+W|(?:\d+Y)?(?:\d+M)?(?:\d+D)?(?:T(?:\d+H)?(?:\d+M)?(?:\d+(?:\.\d+)?S)?)?)$",
        )
        .expect("Is a valid regex")
    });
    if value == "P" || value.ends_with('T') {
        return false;
    }
    DURATION_RE.is_match(value).unwrap_or(false)
}

fn is_valid_email(value: &str) -> bool {
    email_address::EmailAddress::from_str(value).is_ok()
}

fn is_valid_idn_email(value: &str) -> bool {
    if value.is_ascii() {
        return is_valid_email(value);
    }
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    match idna::domain_to_ascii(domain) {
        Ok(ascii_domain) if !local.is_empty() => {
            // Non-ASCII local parts are allowed as-is by SMTPUTF8; check
            // the rest of the shape with the punycoded domain.
            is_valid_email(&format!("local@{ascii_domain}")) || !local.is_ascii()
        }
        _ => false,
    }
}

fn is_valid_hostname(value: &str) -> bool {
    let candidate = value.strip_suffix('.').unwrap_or(value);
    if candidate.is_empty() || candidate.len() > 253 {
        return false;
    }
    candidate.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'-')
    })
}

fn is_valid_idn_hostname(value: &str) -> bool {
    match idna::domain_to_ascii_strict(value) {
        Ok(ascii) => is_valid_hostname(&ascii),
        Err(_) => false,
    }
}

fn is_valid_ipv4(value: &str) -> bool {
    // `Ipv4Addr::from_str` accepts the dotted-quad form only, but leading
    // zeros must be rejected explicitly.
    if value
        .split('.')
        .any(|octet| octet.len() > 1 && octet.starts_with('0'))
    {
        return false;
    }
    Ipv4Addr::from_str(value).is_ok()
}

fn is_valid_ipv6(value: &str) -> bool {
    Ipv6Addr::from_str(value).is_ok()
}

fn is_valid_uri(value: &str) -> bool {
    Uri::parse(value).is_ok()
}

fn is_valid_uri_reference(value: &str) -> bool {
    UriRef::parse(value).is_ok()
}

fn is_valid_json_pointer(value: &str) -> bool {
    Pointer::parse(value).is_ok()
}

fn is_valid_relative_json_pointer(value: &str) -> bool {
    RelativePointer::parse(value).is_ok()
}

fn is_valid_regex(value: &str) -> bool {
    Regex::new(&crate::ecma::to_rust_regex(value)).is_ok()
}

fn is_valid_uri_template(value: &str) -> bool {
    static URI_TEMPLATE_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r#"^(?:(?:[^\x00-\x20"'<>%\\^`{|}]|%[0-9a-f]{2})|\{[+#./;?&=,!@|]?(?:[a-z0-9_]|%[0-9a-f]{2})+(?::[1-9][0-9]{0,3}|\*)?(?:,(?:[a-z0-9_]|%[0-9a-f]{2})+(?::[1-9][0-9]{0,3}|\*)?)*})*$"#,
        )
        .expect("Is a valid regex")
    });
    URI_TEMPLATE_RE.is_match(value).unwrap_or(false)
}

fn is_valid_uuid(value: &str) -> bool {
    let mut out = [0_u8; 16];
    parse_hyphenated(value.as_bytes(), Out::from_mut(&mut out)).is_ok()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::lookup;
    use solidus_value::Value;

    fn check(format: &str, text: &str) -> bool {
        lookup(format)
            .unwrap()
            .is_valid(&Value::from(text))
    }

    #[test_case("date", "1963-06-19", true)]
    #[test_case("date", "2021-02-29", false; "not a leap year")]
    #[test_case("date", "2020-02-29", true; "leap year")]
    #[test_case("date", "06/19/1963", false)]
    #[test_case("time", "08:30:06Z", true)]
    #[test_case("time", "23:59:60Z", true; "leap second utc")]
    #[test_case("time", "08:30:60Z", false; "leap second not at midnight")]
    #[test_case("time", "08:30:06+02:00", true)]
    #[test_case("time", "08:30:06", false; "missing offset")]
    #[test_case("date-time", "1963-06-19T08:30:06.283185Z", true)]
    #[test_case("duration", "P3D", true)]
    #[test_case("duration", "PT1H30M", true)]
    #[test_case("duration", "P", false)]
    #[test_case("email", "joe.bloggs@example.com", true)]
    #[test_case("email", "not-an-email", false)]
    #[test_case("hostname", "www.example.com", true)]
    #[test_case("hostname", "-bad.example", false)]
    #[test_case("ipv4", "192.168.0.1", true)]
    #[test_case("ipv4", "192.168.0.01", false; "leading zero")]
    #[test_case("ipv6", "::1", true)]
    #[test_case("ipv6", "12345::", false)]
    #[test_case("uri", "https://example.com/path?q=1", true)]
    #[test_case("uri", "relative/path", false)]
    #[test_case("uri-reference", "relative/path", true)]
    #[test_case("uuid", "2eb8aa08-aa98-11ea-b4aa-73b441d16380", true)]
    #[test_case("uuid", "2eb8aa08-aa98-11ea-b4aa", false)]
    #[test_case("json-pointer", "/foo/0", true)]
    #[test_case("json-pointer", "foo", false)]
    #[test_case("relative-json-pointer", "1/foo", true)]
    #[test_case("regex", "^ab+$", true)]
    #[test_case("regex", "(", false)]
    #[test_case("uri-template", "http://example.com/{term}", true)]
    fn builtin_formats(format: &str, text: &str, expected: bool) {
        assert_eq!(check(format, text), expected, "{format}: {text}");
    }

    #[test]
    fn non_strings_always_pass() {
        assert!(lookup("date").unwrap().is_valid(&Value::from(42)));
    }
}
