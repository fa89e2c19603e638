//! Thin wrappers over `fluent-uri` with this crate's error type.
use fluent_uri::{
    encoding::{encoder::Path, Encoder},
    Uri, UriRef,
};
use once_cell::sync::Lazy;

use crate::Error;

/// The synthetic base assigned to resources that carry no `$id`.
pub(crate) static DEFAULT_ROOT_URI: Lazy<Uri<String>> =
    Lazy::new(|| Uri::parse("schema:///".to_string()).expect("Invalid URI"));

pub(crate) const DEFAULT_SCHEME: &str = "schema";

/// Resolve a URI reference against a base and normalize the result.
pub fn resolve_against(base: &Uri<&str>, reference: &str) -> Result<Uri<String>, Error> {
    Ok(UriRef::parse(reference)
        .map_err(|error| Error::invalid_uri(reference, error))?
        .resolve_against(base)
        .map_err(|error| Error::invalid_uri(reference, error))?
        .normalize())
}

/// Parse an absolute or relative URI string; relative references resolve
/// against the synthetic root.
pub fn from_str(uri: &str) -> Result<Uri<String>, Error> {
    let reference = UriRef::parse(uri)
        .map_err(|error| Error::invalid_uri(uri, error))?
        .normalize();
    if reference.has_scheme() {
        Ok(Uri::try_from(reference.as_str())
            .map_err(|error| Error::invalid_uri(reference.as_str(), error))?
            .into())
    } else {
        Ok(reference
            .resolve_against(&DEFAULT_ROOT_URI.borrow())
            .map_err(|error| Error::invalid_uri(uri, error))?)
    }
}

/// Percent-encode `input` as a URI path/fragment component into `buffer`.
pub fn encode_to(input: &str, buffer: &mut String) {
    const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    for ch in input.chars() {
        if Path::TABLE.allows(ch) {
            buffer.push(ch);
        } else {
            for byte in ch.encode_utf8(&mut [0; 4]).bytes() {
                buffer.push('%');
                buffer.push(HEX_DIGITS[usize::from(byte >> 4)] as char);
                buffer.push(HEX_DIGITS[usize::from(byte & 0x0F)] as char);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{from_str, resolve_against};

    #[test]
    fn resolves_relative_references() {
        let base = from_str("https://example.com/schemas/root.json").unwrap();
        let resolved = resolve_against(&base.borrow(), "child.json").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/schemas/child.json");
    }

    #[test]
    fn schemaless_uris_get_the_synthetic_root() {
        let resolved = from_str("relative/only").unwrap();
        assert_eq!(resolved.as_str(), "schema:///relative/only");
    }

    #[test]
    fn rejects_garbage() {
        assert!(from_str(":/example.com").is_err());
    }
}
