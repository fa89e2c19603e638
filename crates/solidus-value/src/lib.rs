//! A universal structured-data value model.
//!
//! This crate defines [`Value`], a superset of the JSON data model with
//! byte strings, tags, ordered objects and exact-decimal numbers, plus the
//! addressing and serialization layers built on it:
//!
//! - [`Pointer`] / [`RelativePointer`] — RFC 6901 and relative pointers
//! - [`path::Path`] — RFC 9535 JSONPath queries
//! - [`json`], [`cbor`], [`yaml`] — readers and writers speaking the shared
//!   [`ValueEvent`] streaming protocol
//! - [`encoding`] — binary-to-text codecs (base16/32/62/64,
//!   quoted-printable)
//!
//! ```rust
//! use solidus_value::{json, Pointer, Value};
//!
//! let value = json::from_str(r#"{"name": "solidus", "tags": [1, 2]}"#).unwrap();
//! let pointer = Pointer::parse("/tags/1").unwrap();
//! assert_eq!(value.pointer(&pointer), Some(&Value::from(2)));
//! ```
pub mod cbor;
mod error;
mod event;
pub mod encoding;
pub mod json;
mod number;
pub mod path;
mod pointer;
mod value;
pub mod yaml;

pub use error::{
    EncodingError, NumberParseError, PathError, PointerError, ReadError, ReadPosition, WriteError,
};
pub use event::{Composer, Decomposer, FormatReader, FormatWriter, ValueEvent, ValueStyle};
pub use number::Number;
pub use pointer::{
    Pointer, PointerMode, ReferenceToken, RelativePointer, RelativeTail, RelativeTarget,
};
pub use value::{Object, ObjectExt, TaggedValue, Value, ValueIndex, ValueKind};
