//! RFC 6901 JSON Pointers and relative JSON Pointers.
use std::{
    borrow::Cow,
    fmt::{self, Write},
    str::FromStr,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::{error::PointerError, value::Value};

/// Process-wide default for escape handling; see [`Pointer::set_strict`].
static STRICT: AtomicBool = AtomicBool::new(true);

/// How to treat a `~` that is not followed by `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerMode {
    /// Reject the token (RFC 6901 conformant).
    Strict,
    /// Keep the `~` literally.
    Lenient,
}

/// A single reference token within a pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceToken {
    /// A member name.
    Name(Box<str>),
    /// An array index. Digit-only tokens without leading zeros parse as
    /// indices; they still address object members by their decimal spelling.
    Index(usize),
    /// The `-` token: the position after the last array element. Only
    /// meaningful for writes; reads treat it as out of range.
    Append,
}

impl ReferenceToken {
    /// The token as it addresses object members.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            ReferenceToken::Name(name) => Cow::Borrowed(name),
            ReferenceToken::Index(index) => Cow::Owned(itoa::Buffer::new().format(*index).into()),
            ReferenceToken::Append => Cow::Borrowed("-"),
        }
    }
}

impl From<&str> for ReferenceToken {
    fn from(value: &str) -> Self {
        classify_token(Cow::Borrowed(value)).unwrap_or_else(|| ReferenceToken::Name(value.into()))
    }
}

impl From<String> for ReferenceToken {
    fn from(value: String) -> Self {
        classify_token(Cow::Borrowed(&value))
            .unwrap_or_else(|| ReferenceToken::Name(value.into_boxed_str()))
    }
}

impl From<usize> for ReferenceToken {
    fn from(value: usize) -> Self {
        ReferenceToken::Index(value)
    }
}

fn classify_token(text: Cow<'_, str>) -> Option<ReferenceToken> {
    if text == "-" {
        return Some(ReferenceToken::Append);
    }
    let bytes = text.as_bytes();
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        // Leading zeros address object members, never array slots.
        return None;
    }
    text.parse::<usize>().ok().map(ReferenceToken::Index)
}

/// An RFC 6901 JSON Pointer: an ordered sequence of reference tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pointer(Vec<ReferenceToken>);

impl Pointer {
    /// The root pointer (`""`).
    #[must_use]
    pub fn root() -> Pointer {
        Pointer(Vec::new())
    }

    /// Parse the wire form using the process-wide escape mode.
    pub fn parse(text: &str) -> Result<Pointer, PointerError> {
        Self::parse_with(
            text,
            if Self::is_strict() {
                PointerMode::Strict
            } else {
                PointerMode::Lenient
            },
        )
    }

    /// Parse the wire form with an explicit escape mode.
    pub fn parse_with(text: &str, mode: PointerMode) -> Result<Pointer, PointerError> {
        if text.is_empty() {
            return Ok(Pointer::root());
        }
        if !text.starts_with('/') {
            return Err(PointerError::pointer(0, "a pointer must start with '/'"));
        }
        let mut tokens = Vec::new();
        let mut offset = 1;
        for raw in text[1..].split('/') {
            tokens.push(unescape_token(raw, offset, mode)?);
            offset += raw.len() + 1;
        }
        Ok(Pointer(tokens))
    }

    /// Change the process-wide escape mode. Reads and writes are atomic;
    /// flipping it mid-parse is defined but discouraged.
    pub fn set_strict(strict: bool) {
        STRICT.store(strict, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_strict() -> bool {
        STRICT.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn tokens(&self) -> &[ReferenceToken] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn last(&self) -> Option<&ReferenceToken> {
        self.0.last()
    }

    /// A new pointer with one more token appended.
    #[must_use]
    pub fn join(&self, token: impl Into<ReferenceToken>) -> Pointer {
        let mut tokens = self.0.clone();
        tokens.push(token.into());
        Pointer(tokens)
    }

    /// A new pointer with all of `other`'s tokens appended.
    #[must_use]
    pub fn concat(&self, other: &Pointer) -> Pointer {
        let mut tokens = self.0.clone();
        tokens.extend_from_slice(&other.0);
        Pointer(tokens)
    }

    /// A new pointer with the last `count` tokens removed; `None` if the
    /// pointer is shorter than that.
    #[must_use]
    pub fn parent(&self, count: usize) -> Option<Pointer> {
        let remaining = self.0.len().checked_sub(count)?;
        Some(Pointer(self.0[..remaining].to_vec()))
    }

    pub fn push(&mut self, token: impl Into<ReferenceToken>) {
        self.0.push(token.into());
    }
}

fn unescape_token(
    raw: &str,
    offset: usize,
    mode: PointerMode,
) -> Result<ReferenceToken, PointerError> {
    if !raw.contains('~') {
        return Ok(ReferenceToken::from(raw));
    }
    let mut unescaped = String::with_capacity(raw.len());
    let mut chars = raw.char_indices();
    while let Some((position, ch)) = chars.next() {
        if ch != '~' {
            unescaped.push(ch);
            continue;
        }
        match chars.next() {
            Some((_, '0')) => unescaped.push('~'),
            Some((_, '1')) => unescaped.push('/'),
            other => match mode {
                PointerMode::Strict => {
                    return Err(PointerError::token(
                        offset + position,
                        "'~' must be followed by '0' or '1'",
                    ));
                }
                PointerMode::Lenient => {
                    unescaped.push('~');
                    if let Some((_, ch)) = other {
                        unescaped.push(ch);
                    }
                }
            },
        }
    }
    Ok(ReferenceToken::from(unescaped))
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.0 {
            f.write_char('/')?;
            match token {
                ReferenceToken::Name(name) => {
                    for ch in name.chars() {
                        match ch {
                            '~' => f.write_str("~0")?,
                            '/' => f.write_str("~1")?,
                            _ => f.write_char(ch)?,
                        }
                    }
                }
                ReferenceToken::Index(index) => {
                    f.write_str(itoa::Buffer::new().format(*index))?;
                }
                ReferenceToken::Append => f.write_char('-')?,
            }
        }
        Ok(())
    }
}

impl FromStr for Pointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pointer::parse(s)
    }
}

impl serde::Serialize for Pointer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl FromIterator<ReferenceToken> for Pointer {
    fn from_iter<T: IntoIterator<Item = ReferenceToken>>(iter: T) -> Self {
        Pointer(iter.into_iter().collect())
    }
}

/// The tail of a [`RelativePointer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelativeTail {
    /// `#`: select the key or index of the referenced location.
    Key,
    /// A pointer to apply below the referenced location.
    Pointer(Pointer),
}

/// A relative JSON Pointer: `<up-count>(#|<pointer>)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativePointer {
    pub up: u64,
    pub tail: RelativeTail,
}

/// The result of resolving a [`RelativePointer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelativeTarget<'v> {
    Value(&'v Value),
    /// The member name (as a string) or array index (as a number) selected
    /// by the `#` tail.
    Key(Value),
}

impl RelativePointer {
    pub fn parse(text: &str) -> Result<RelativePointer, PointerError> {
        let digits_end = text
            .find(|ch: char| !ch.is_ascii_digit())
            .unwrap_or(text.len());
        let digits = &text[..digits_end];
        if digits.is_empty() {
            return Err(PointerError::pointer(0, "expected a leading count"));
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(PointerError::pointer(0, "count must not have leading zeros"));
        }
        let up = digits
            .parse::<u64>()
            .map_err(|_| PointerError::pointer(0, "count out of range"))?;
        let tail = match &text[digits_end..] {
            "#" => RelativeTail::Key,
            rest => RelativeTail::Pointer(Pointer::parse(rest).map_err(|error| match error {
                PointerError::InvalidPointer { offset, reason } => {
                    PointerError::pointer(digits_end + offset, reason)
                }
                PointerError::InvalidReferenceToken { offset, reason } => {
                    PointerError::token(digits_end + offset, reason)
                }
                other => other,
            })?),
        };
        Ok(RelativePointer { up, tail })
    }

    /// Resolve against `root`, starting from the location addressed by
    /// `from`.
    #[must_use]
    pub fn resolve<'v>(&self, root: &'v Value, from: &Pointer) -> Option<RelativeTarget<'v>> {
        let base = from.parent(usize::try_from(self.up).ok()?)?;
        match &self.tail {
            RelativeTail::Key => {
                let token = base.last()?;
                Some(RelativeTarget::Key(match token {
                    ReferenceToken::Index(index) => Value::from(*index),
                    token => Value::String(token.as_text().into_owned()),
                }))
            }
            RelativeTail::Pointer(tail) => root
                .pointer(&base.concat(tail))
                .map(RelativeTarget::Value),
        }
    }
}

impl fmt::Display for RelativePointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.up)?;
        match &self.tail {
            RelativeTail::Key => f.write_char('#'),
            RelativeTail::Pointer(pointer) => write!(f, "{pointer}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::{Pointer, PointerMode, ReferenceToken, RelativePointer, RelativeTarget};
    use crate::value::Value;

    #[test_case("", 0)]
    #[test_case("/", 1; "single empty token")]
    #[test_case("/a~1b/c~0d", 2)]
    #[test_case("/0/1/-", 3)]
    fn parses(text: &str, tokens: usize) {
        assert_eq!(Pointer::parse(text).unwrap().len(), tokens);
    }

    #[test]
    fn round_trips_escapes() {
        let pointer = Pointer::root().join("a/b").join("m~n");
        assert_eq!(pointer.to_string(), "/a~1b/m~0n");
        assert_eq!(Pointer::parse("/a~1b/m~0n").unwrap(), pointer);
    }

    #[test_case("/01"; "leading zero is a name")]
    #[test_case("/00"; "all zeros is a name")]
    fn leading_zeros_are_names(text: &str) {
        let pointer = Pointer::parse(text).unwrap();
        assert!(matches!(
            pointer.tokens()[0],
            ReferenceToken::Name(_)
        ));
    }

    #[test]
    fn strict_rejects_bad_escape() {
        let error = Pointer::parse_with("/a~2b", PointerMode::Strict).unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid reference token at offset 2: '~' must be followed by '0' or '1'"
        );
        let pointer = Pointer::parse_with("/a~2b", PointerMode::Lenient).unwrap();
        assert_eq!(pointer.tokens()[0].as_text(), "a~2b");
    }

    #[test]
    fn missing_slash_is_invalid() {
        assert!(Pointer::parse("a/b").is_err());
    }

    #[test_case("0#", 0)]
    #[test_case("2/highly/nested", 2)]
    #[test_case("1", 1)]
    fn relative_parses(text: &str, up: u64) {
        let relative = RelativePointer::parse(text).unwrap();
        assert_eq!(relative.up, up);
        assert_eq!(relative.to_string(), text);
    }

    #[test]
    fn relative_rejects_leading_zero_count() {
        assert!(RelativePointer::parse("01#").is_err());
    }

    #[test]
    fn relative_resolution() {
        let root = Value::from(json!({"foo": ["bar", "baz"], "highly": {"nested": {"objects": true}}}));
        let from = Pointer::parse("/foo/1").unwrap();

        let up_zero = RelativePointer::parse("0").unwrap();
        assert_eq!(
            up_zero.resolve(&root, &from),
            Some(RelativeTarget::Value(&Value::from("baz")))
        );
        let sibling = RelativePointer::parse("1/0").unwrap();
        assert_eq!(
            sibling.resolve(&root, &from),
            Some(RelativeTarget::Value(&Value::from("bar")))
        );
        let key = RelativePointer::parse("0#").unwrap();
        assert_eq!(key.resolve(&root, &from), Some(RelativeTarget::Key(Value::from(1))));
        let cross = RelativePointer::parse("2/highly/nested/objects").unwrap();
        assert_eq!(
            cross.resolve(&root, &from),
            Some(RelativeTarget::Value(&Value::from(true)))
        );
    }
}
