//! Registries for `contentEncoding` and `contentMediaType`.
//!
//! Both follow the read-mostly pattern: the bundled entries live behind a
//! process-wide `RwLock` that validation only ever read-locks; registering
//! a codec takes the write side. Per-build overrides in
//! [`crate::ValidationOptions`] shadow the globals without locking at all.
use std::sync::RwLock;

use once_cell::sync::Lazy;
use solidus_value::{encoding, EncodingError, Value};

/// A `contentEncoding` entry: a cheap check plus the two codec directions.
#[derive(Debug, Clone, Copy)]
pub struct ContentEncoding {
    /// Whether the text is well-formed under this encoding.
    pub check: fn(&str) -> bool,
    /// Decode text into the bytes it carries.
    pub decode: fn(&str) -> Result<Vec<u8>, EncodingError>,
    /// Encode bytes into their text form.
    pub encode: fn(&[u8]) -> String,
}

/// A `contentMediaType` entry: a cheap check plus a decoder into the value
/// model.
#[derive(Debug, Clone, Copy)]
pub struct ContentMediaType {
    pub check: fn(&str) -> bool,
    pub decode: fn(&str) -> Option<Value>,
}

type EncodingRegistry = ahash::AHashMap<&'static str, ContentEncoding>;
type MediaTypeRegistry = ahash::AHashMap<&'static str, ContentMediaType>;

macro_rules! bundled_encoding {
    ($name:literal) => {
        (
            $name,
            ContentEncoding {
                check: |text| encoding::decode($name, text).is_ok(),
                decode: |text| encoding::decode($name, text),
                encode: |bytes| {
                    encoding::encode($name, bytes).expect("bundled codec is registered")
                },
            },
        )
    };
}

static CONTENT_ENCODINGS: Lazy<RwLock<EncodingRegistry>> = Lazy::new(|| {
    RwLock::new(EncodingRegistry::from_iter([
        bundled_encoding!("base16"),
        bundled_encoding!("base32"),
        bundled_encoding!("base32hex"),
        bundled_encoding!("base32-crockford"),
        bundled_encoding!("base32-lower"),
        bundled_encoding!("base62"),
        bundled_encoding!("base64"),
        bundled_encoding!("base64url"),
        bundled_encoding!("quoted-printable"),
    ]))
});

fn is_json(text: &str) -> bool {
    solidus_value::json::from_str(text).is_ok()
}

static CONTENT_MEDIA_TYPES: Lazy<RwLock<MediaTypeRegistry>> = Lazy::new(|| {
    RwLock::new(MediaTypeRegistry::from_iter([(
        "application/json",
        ContentMediaType {
            check: is_json,
            decode: |text| solidus_value::json::from_str(text).ok(),
        },
    )]))
});

/// Register (or replace) a content encoding process-wide.
pub fn register_content_encoding(name: &'static str, entry: ContentEncoding) {
    CONTENT_ENCODINGS
        .write()
        .expect("content encoding registry poisoned")
        .insert(name, entry);
}

/// Register (or replace) a content media type process-wide.
pub fn register_content_media_type(name: &'static str, entry: ContentMediaType) {
    CONTENT_MEDIA_TYPES
        .write()
        .expect("content media type registry poisoned")
        .insert(name, entry);
}

pub(crate) fn content_encoding(name: &str) -> Option<ContentEncoding> {
    CONTENT_ENCODINGS
        .read()
        .expect("content encoding registry poisoned")
        .get(name)
        .copied()
}

pub(crate) fn content_media_type(name: &str) -> Option<ContentMediaType> {
    CONTENT_MEDIA_TYPES
        .read()
        .expect("content media type registry poisoned")
        .get(name)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::{content_encoding, content_media_type};

    #[test]
    fn bundled_encodings_are_available() {
        let entry = content_encoding("base64").unwrap();
        assert!((entry.check)("3q2+7w=="));
        assert_eq!((entry.decode)("3q2+7w==").unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!((entry.encode)(&[0xDE, 0xAD, 0xBE, 0xEF]), "3q2+7w==");
        assert!(content_encoding("rot13").is_none());
    }

    #[test]
    fn json_media_type_decodes() {
        let entry = content_media_type("application/json").unwrap();
        assert!((entry.check)("{\"a\": 1}"));
        assert!(!(entry.check)("{"));
        assert!((entry.decode)("[1, 2]").is_some());
    }
}
