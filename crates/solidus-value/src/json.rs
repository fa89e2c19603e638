//! RFC 8259 JSON reader and writer.
//!
//! Numbers round-trip as text through the exact-decimal carrier. JSON cannot
//! represent byte strings or tags: the writer renders bytes as base64 text
//! and drops tags, so `read(write(v))` equals `stripTags(v)` for values
//! whose byte strings are acceptable as text.
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::{
    error::{ReadError, ReadPosition, WriteError},
    event::{FormatReader, FormatWriter, ValueEvent},
    number::Number,
    value::Value,
};

/// Parse a single JSON document.
pub fn from_str(text: &str) -> Result<Value, ReadError> {
    JsonReader::new(text).read_value()
}

/// Serialize a value to compact JSON, substituting `null` for numbers JSON
/// cannot represent. Never fails; used for display purposes.
#[must_use]
pub fn to_string(value: &Value) -> String {
    let mut writer = JsonWriter::lossy();
    writer.write_value(value).expect("lossy writer is total");
    writer.finish().expect("lossy writer is total");
    writer.into_string()
}

/// Serialize a value to compact JSON, failing on non-finite numbers.
pub fn write_to_string(value: &Value) -> Result<String, WriteError> {
    let mut writer = JsonWriter::new();
    writer.write_value(value)?;
    writer.finish()?;
    Ok(writer.into_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Array,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Value,
    ValueOrEndArray,
    CommaOrEndArray,
    KeyOrEndObject,
    CommaOrEndObject,
    Key,
    End,
}

/// A streaming JSON reader emitting [`ValueEvent`]s.
pub struct JsonReader<'a> {
    text: &'a str,
    bytes: &'a [u8],
    position: usize,
    line: usize,
    stack: Vec<Container>,
    expect: Expect,
    failed: bool,
}

impl<'a> JsonReader<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> JsonReader<'a> {
        JsonReader {
            text,
            bytes: text.as_bytes(),
            position: 0,
            line: 1,
            stack: Vec::new(),
            expect: Expect::Value,
            failed: false,
        }
    }

    fn here(&self) -> ReadPosition {
        ReadPosition {
            offset: self.position,
            line: self.line,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(byte) = self.bytes.get(self.position) {
            match byte {
                b'\n' => {
                    self.line += 1;
                    self.position += 1;
                }
                b' ' | b'\t' | b'\r' => self.position += 1,
                _ => break,
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    fn after_value(&mut self) {
        self.expect = match self.stack.last() {
            None => Expect::End,
            Some(Container::Array) => Expect::CommaOrEndArray,
            Some(Container::Object) => Expect::CommaOrEndObject,
        };
    }

    fn parse_event(&mut self) -> Result<Option<ValueEvent>, ReadError> {
        loop {
            self.skip_whitespace();
            match self.expect {
                Expect::End => {
                    if self.position < self.bytes.len() {
                        return Err(ReadError::syntax(self.here(), "trailing characters"));
                    }
                    return Ok(None);
                }
                Expect::Value | Expect::ValueOrEndArray => {
                    if self.expect == Expect::ValueOrEndArray && self.peek() == Some(b']') {
                        self.position += 1;
                        self.stack.pop();
                        self.after_value();
                        return Ok(Some(ValueEvent::EndArray));
                    }
                    return self.parse_value().map(Some);
                }
                Expect::CommaOrEndArray => match self.peek() {
                    Some(b',') => {
                        self.position += 1;
                        self.expect = Expect::Value;
                    }
                    Some(b']') => {
                        self.position += 1;
                        self.stack.pop();
                        self.after_value();
                        return Ok(Some(ValueEvent::EndArray));
                    }
                    Some(_) => {
                        return Err(ReadError::syntax(self.here(), "expected ',' or ']'"));
                    }
                    None => return Err(ReadError::eof(self.here())),
                },
                Expect::KeyOrEndObject | Expect::Key => {
                    if self.expect == Expect::KeyOrEndObject && self.peek() == Some(b'}') {
                        self.position += 1;
                        self.stack.pop();
                        self.after_value();
                        return Ok(Some(ValueEvent::EndObject));
                    }
                    if self.peek() != Some(b'"') {
                        return Err(ReadError::syntax(self.here(), "expected a member name"));
                    }
                    let key = self.parse_string()?;
                    self.skip_whitespace();
                    if self.peek() != Some(b':') {
                        return Err(ReadError::syntax(self.here(), "expected ':'"));
                    }
                    self.position += 1;
                    self.expect = Expect::Value;
                    return Ok(Some(ValueEvent::Key(Value::String(key))));
                }
                Expect::CommaOrEndObject => match self.peek() {
                    Some(b',') => {
                        self.position += 1;
                        self.expect = Expect::Key;
                    }
                    Some(b'}') => {
                        self.position += 1;
                        self.stack.pop();
                        self.after_value();
                        return Ok(Some(ValueEvent::EndObject));
                    }
                    Some(_) => {
                        return Err(ReadError::syntax(self.here(), "expected ',' or '}'"));
                    }
                    None => return Err(ReadError::eof(self.here())),
                },
            }
        }
    }

    fn parse_value(&mut self) -> Result<ValueEvent, ReadError> {
        match self.peek() {
            None => Err(ReadError::eof(self.here())),
            Some(b'{') => {
                self.position += 1;
                self.stack.push(Container::Object);
                self.expect = Expect::KeyOrEndObject;
                Ok(ValueEvent::BeginObject)
            }
            Some(b'[') => {
                self.position += 1;
                self.stack.push(Container::Array);
                self.expect = Expect::ValueOrEndArray;
                Ok(ValueEvent::BeginArray)
            }
            Some(b'"') => {
                let text = self.parse_string()?;
                self.after_value();
                Ok(ValueEvent::Scalar(Value::String(text)))
            }
            Some(b't') => {
                self.parse_literal("true")?;
                self.after_value();
                Ok(ValueEvent::Scalar(Value::Bool(true)))
            }
            Some(b'f') => {
                self.parse_literal("false")?;
                self.after_value();
                Ok(ValueEvent::Scalar(Value::Bool(false)))
            }
            Some(b'n') => {
                self.parse_literal("null")?;
                self.after_value();
                Ok(ValueEvent::Scalar(Value::Null))
            }
            Some(byte) if byte == b'-' || byte.is_ascii_digit() => {
                let number = self.parse_number()?;
                self.after_value();
                Ok(ValueEvent::Scalar(Value::Number(number)))
            }
            Some(_) => Err(ReadError::syntax(self.here(), "expected a value")),
        }
    }

    fn parse_literal(&mut self, literal: &str) -> Result<(), ReadError> {
        if self.text[self.position..].starts_with(literal) {
            self.position += literal.len();
            Ok(())
        } else {
            Err(ReadError::syntax(self.here(), "expected a value"))
        }
    }

    fn parse_number(&mut self) -> Result<Number, ReadError> {
        let start = self.position;
        if self.peek() == Some(b'-') {
            self.position += 1;
        }
        let int_start = self.position;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.position += 1;
        }
        let int_len = self.position - int_start;
        if int_len == 0 {
            return Err(ReadError::syntax(self.here(), "expected a digit"));
        }
        if int_len > 1 && self.bytes[int_start] == b'0' {
            return Err(ReadError::syntax(self.here(), "leading zeros are not allowed"));
        }
        if self.peek() == Some(b'.') {
            self.position += 1;
            let frac_start = self.position;
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.position += 1;
            }
            if self.position == frac_start {
                return Err(ReadError::syntax(self.here(), "expected a fraction digit"));
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.position += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.position += 1;
            }
            let exp_start = self.position;
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.position += 1;
            }
            if self.position == exp_start {
                return Err(ReadError::syntax(self.here(), "expected an exponent digit"));
            }
        }
        let text = &self.text[start..self.position];
        Number::parse(text).map_err(|_| ReadError::NumberOutOfRange {
            position: ReadPosition {
                offset: start,
                line: self.line,
            },
        })
    }

    fn parse_string(&mut self) -> Result<String, ReadError> {
        // Caller checked the opening quote.
        self.position += 1;
        let mut result = String::new();
        let mut chunk_start = self.position;
        loop {
            match self.bytes.get(self.position) {
                None => return Err(ReadError::eof(self.here())),
                Some(b'"') => {
                    result.push_str(&self.text[chunk_start..self.position]);
                    self.position += 1;
                    return Ok(result);
                }
                Some(b'\\') => {
                    result.push_str(&self.text[chunk_start..self.position]);
                    self.position += 1;
                    let escape = self
                        .bytes
                        .get(self.position)
                        .copied()
                        .ok_or_else(|| ReadError::eof(self.here()))?;
                    self.position += 1;
                    match escape {
                        b'"' => result.push('"'),
                        b'\\' => result.push('\\'),
                        b'/' => result.push('/'),
                        b'b' => result.push('\u{0008}'),
                        b'f' => result.push('\u{000C}'),
                        b'n' => result.push('\n'),
                        b'r' => result.push('\r'),
                        b't' => result.push('\t'),
                        b'u' => {
                            let unit = self.parse_hex_unit()?;
                            if (0xD800..0xDC00).contains(&unit) {
                                // High surrogate: a low surrogate must follow.
                                if self.bytes.get(self.position) != Some(&b'\\')
                                    || self.bytes.get(self.position + 1) != Some(&b'u')
                                {
                                    return Err(ReadError::syntax(
                                        self.here(),
                                        "unpaired surrogate",
                                    ));
                                }
                                self.position += 2;
                                let low = self.parse_hex_unit()?;
                                if !(0xDC00..0xE000).contains(&low) {
                                    return Err(ReadError::syntax(
                                        self.here(),
                                        "unpaired surrogate",
                                    ));
                                }
                                let code = 0x10000
                                    + (u32::from(unit - 0xD800) << 10)
                                    + u32::from(low - 0xDC00);
                                result.push(
                                    char::from_u32(code)
                                        .expect("surrogate pair is a valid scalar"),
                                );
                            } else if (0xDC00..0xE000).contains(&unit) {
                                return Err(ReadError::syntax(self.here(), "unpaired surrogate"));
                            } else {
                                result.push(
                                    char::from_u32(u32::from(unit))
                                        .expect("non-surrogate unit is a valid scalar"),
                                );
                            }
                        }
                        _ => {
                            return Err(ReadError::syntax(self.here(), "invalid escape"));
                        }
                    }
                    chunk_start = self.position;
                }
                Some(byte) if *byte < 0x20 => {
                    return Err(ReadError::syntax(
                        self.here(),
                        "control character in string",
                    ));
                }
                Some(_) => {
                    // Skip the whole UTF-8 sequence.
                    let ch = self.text[self.position..]
                        .chars()
                        .next()
                        .expect("input is valid UTF-8");
                    self.position += ch.len_utf8();
                }
            }
        }
    }

    fn parse_hex_unit(&mut self) -> Result<u16, ReadError> {
        let end = self.position + 4;
        if end > self.bytes.len() {
            return Err(ReadError::eof(self.here()));
        }
        let unit = u16::from_str_radix(&self.text[self.position..end], 16)
            .map_err(|_| ReadError::syntax(self.here(), "invalid \\u escape"))?;
        self.position = end;
        Ok(unit)
    }
}

impl Iterator for JsonReader<'_> {
    type Item = Result<ValueEvent, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.parse_event() {
            Ok(event) => event.map(Ok),
            Err(error) => {
                self.failed = true;
                Some(Err(error))
            }
        }
    }
}

impl FormatReader for JsonReader<'_> {}

#[derive(Debug, Clone, Copy)]
struct WriterFrame {
    container: Container,
    has_items: bool,
    awaiting_value: bool,
}

/// A streaming JSON writer consuming [`ValueEvent`]s.
pub struct JsonWriter {
    out: String,
    frames: Vec<WriterFrame>,
    root_written: bool,
    finished: bool,
    lossy: bool,
}

impl JsonWriter {
    #[must_use]
    pub fn new() -> JsonWriter {
        JsonWriter {
            out: String::new(),
            frames: Vec::new(),
            root_written: false,
            finished: false,
            lossy: false,
        }
    }

    /// A writer that substitutes `null` for unrepresentable numbers instead
    /// of failing.
    #[must_use]
    pub fn lossy() -> JsonWriter {
        JsonWriter {
            lossy: true,
            ..JsonWriter::new()
        }
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.out
    }

    fn before_value(&mut self) -> Result<(), WriteError> {
        if self.finished {
            return Err(WriteError::Finished);
        }
        let JsonWriter { frames, out, .. } = self;
        match frames.last_mut() {
            None => {
                if self.root_written {
                    return Err(WriteError::invalid("a document holds a single value"));
                }
            }
            Some(frame) => match frame.container {
                Container::Array => {
                    if frame.has_items {
                        out.push(',');
                    }
                    frame.has_items = true;
                }
                Container::Object => {
                    if !frame.awaiting_value {
                        return Err(WriteError::invalid("expected a key before this value"));
                    }
                    frame.awaiting_value = false;
                }
            },
        }
        Ok(())
    }

    fn after_value(&mut self) {
        if self.frames.is_empty() {
            self.root_written = true;
        }
    }

    fn append_scalar(&mut self, value: &Value) -> Result<(), WriteError> {
        match value {
            Value::Null => self.out.push_str("null"),
            Value::Bool(true) => self.out.push_str("true"),
            Value::Bool(false) => self.out.push_str("false"),
            Value::Number(number) => match number.to_decimal_string() {
                Some(text) => self.out.push_str(&text),
                None if self.lossy => self.out.push_str("null"),
                None => {
                    return Err(WriteError::Unrepresentable {
                        reason: "JSON has no spelling for NaN or infinity".to_string(),
                    });
                }
            },
            Value::String(text) => append_json_string(&mut self.out, text),
            Value::Bytes(bytes) => append_json_string(&mut self.out, &STANDARD.encode(bytes)),
            Value::Tagged(tagged) => return self.append_scalar(tagged.value.untagged()),
            Value::Array(_) | Value::Object(_) => {
                // Composite handed as a single scalar: flatten it.
                let rendered = if self.lossy {
                    to_string(value)
                } else {
                    write_to_string(value)?
                };
                self.out.push_str(&rendered);
            }
        }
        Ok(())
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        JsonWriter::new()
    }
}

impl FormatWriter for JsonWriter {
    fn write(&mut self, event: &ValueEvent) -> Result<(), WriteError> {
        match event {
            // Presentation and reference events carry nothing JSON can say.
            ValueEvent::Tag(_) | ValueEvent::Anchor(_) | ValueEvent::Style(_) => Ok(()),
            ValueEvent::Alias(name) => Err(WriteError::Unrepresentable {
                reason: format!("JSON cannot reference anchored node '{name}'"),
            }),
            ValueEvent::BeginArray => {
                self.before_value()?;
                self.out.push('[');
                self.frames.push(WriterFrame {
                    container: Container::Array,
                    has_items: false,
                    awaiting_value: false,
                });
                Ok(())
            }
            ValueEvent::BeginObject => {
                self.before_value()?;
                self.out.push('{');
                self.frames.push(WriterFrame {
                    container: Container::Object,
                    has_items: false,
                    awaiting_value: false,
                });
                Ok(())
            }
            ValueEvent::EndArray => match self.frames.pop() {
                Some(frame) if frame.container == Container::Array => {
                    self.out.push(']');
                    self.after_value();
                    Ok(())
                }
                _ => Err(WriteError::invalid("no open array")),
            },
            ValueEvent::EndObject => match self.frames.pop() {
                Some(frame) if frame.container == Container::Object && !frame.awaiting_value => {
                    self.out.push('}');
                    self.after_value();
                    Ok(())
                }
                _ => Err(WriteError::invalid("no open object")),
            },
            ValueEvent::Key(key) => {
                let text = match key.untagged() {
                    Value::String(text) => text.clone(),
                    other => to_string(other),
                };
                let JsonWriter { frames, out, .. } = self;
                match frames.last_mut() {
                    Some(frame)
                        if frame.container == Container::Object && !frame.awaiting_value =>
                    {
                        if frame.has_items {
                            out.push(',');
                        }
                        frame.has_items = true;
                        frame.awaiting_value = true;
                        append_json_string(out, &text);
                        out.push(':');
                        Ok(())
                    }
                    _ => Err(WriteError::invalid("key outside an object")),
                }
            }
            ValueEvent::Scalar(value) => {
                self.before_value()?;
                self.append_scalar(value)?;
                self.after_value();
                Ok(())
            }
        }
    }

    fn finish(&mut self) -> Result<(), WriteError> {
        if self.finished {
            return Err(WriteError::Finished);
        }
        if !self.frames.is_empty() || !self.root_written {
            return Err(WriteError::invalid("document is incomplete"));
        }
        self.finished = true;
        self.out.shrink_to_fit();
        Ok(())
    }
}

fn append_json_string(out: &mut String, text: &str) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            ch if (ch as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", ch as u32));
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::{from_str, write_to_string};
    use crate::value::Value;

    #[test_case(r#"{"a": 1, "b": [true, null, "x"]}"#, r#"{"a":1,"b":[true,null,"x"]}"#; "object with array")]
    #[test_case("[1.50, 2e3, -0.125]", "[1.50,2e3,-0.125]"; "number text survives")]
    #[test_case(r#""a\u0041\n""#, r#""aA\n""#; "unicode escape")]
    #[test_case(r#""\ud83d\ude00""#, "\"\u{1F600}\""; "surrogate pair")]
    #[test_case("{}", "{}"; "empty object")]
    #[test_case("[]", "[]"; "empty array")]
    fn round_trip(input: &str, expected: &str) {
        let value = from_str(input).unwrap();
        assert_eq!(write_to_string(&value).unwrap(), expected);
    }

    #[test]
    fn preserves_member_order() {
        let value = from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        assert_eq!(write_to_string(&value).unwrap(), r#"{"z":1,"a":2,"m":3}"#);
    }

    #[test]
    fn wide_numbers_round_trip() {
        let text = "[123456789012345678901234567890123456789.5]";
        let value = from_str(text).unwrap();
        assert_eq!(write_to_string(&value).unwrap(), text);
    }

    #[test_case("[1,")]
    #[test_case("{\"a\" 1}")]
    #[test_case("01")]
    #[test_case("\"\\q\"")]
    #[test_case("[] []"; "trailing data")]
    #[test_case("\"\\ud83d\""; "lone surrogate")]
    fn rejects(input: &str) {
        assert!(from_str(input).is_err());
    }

    #[test]
    fn bytes_render_as_base64() {
        let value = Value::Bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(write_to_string(&value).unwrap(), r#""3q2+7w==""#);
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let value = Value::from(f64::NAN);
        assert!(write_to_string(&value).is_err());
        assert_eq!(super::to_string(&value), "null");
    }
}
