//! RFC 8949 CBOR reader and writer.
//!
//! Byte strings map to `bytes`, tags to `tagged` (except the number tags
//! 2, 3 and 4, which decode straight into the exact-decimal carrier).
//! Indefinite-length strings, arrays and maps are accepted on read and
//! normalized to definite lengths on write.
use crate::{
    error::{ReadError, ReadPosition, WriteError},
    event::{Composer, FormatReader, FormatWriter, ValueEvent},
    number::Number,
    value::Value,
};

/// Decode a single CBOR item.
pub fn from_slice(bytes: &[u8]) -> Result<Value, ReadError> {
    CborReader::new(bytes).read_value()
}

/// Encode a value as a single CBOR item.
#[must_use]
pub fn to_vec(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    encode_value(value, &mut out);
    out
}

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;
const MAJOR_SIMPLE: u8 = 7;

const BREAK: u8 = 0xFF;

const TAG_POSITIVE_BIGNUM: u64 = 2;
const TAG_NEGATIVE_BIGNUM: u64 = 3;
const TAG_DECIMAL_FRACTION: u64 = 4;

#[derive(Debug)]
enum Head {
    /// Major type with its decoded argument.
    Value(u8, u64),
    /// Major type with the indefinite-length marker.
    Indefinite(u8),
    /// A major-7 half, single or double float, already widened.
    Float(f64),
    Break,
}

struct Decoder<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Decoder<'a> {
    fn new(bytes: &'a [u8]) -> Decoder<'a> {
        Decoder { bytes, position: 0 }
    }

    fn here(&self) -> ReadPosition {
        ReadPosition {
            offset: self.position,
            line: 0,
        }
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], ReadError> {
        let end = self
            .position
            .checked_add(count)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| ReadError::eof(self.here()))?;
        let slice = &self.bytes[self.position..end];
        self.position = end;
        Ok(slice)
    }

    fn read_head(&mut self) -> Result<Head, ReadError> {
        let initial = self.take(1)?[0];
        if initial == BREAK {
            return Ok(Head::Break);
        }
        let major = initial >> 5;
        let info = initial & 0x1F;
        if major == MAJOR_SIMPLE && matches!(info, 25..=27) {
            return Ok(Head::Float(self.decode_float(info)?));
        }
        let argument = match info {
            0..=23 => u64::from(info),
            24 => u64::from(self.take(1)?[0]),
            25 => u64::from(u16::from_be_bytes(self.take(2)?.try_into().expect("2 bytes"))),
            26 => u64::from(u32::from_be_bytes(self.take(4)?.try_into().expect("4 bytes"))),
            27 => u64::from_be_bytes(self.take(8)?.try_into().expect("8 bytes")),
            31 => return Ok(Head::Indefinite(major)),
            _ => {
                return Err(ReadError::syntax(self.here(), "reserved additional info"));
            }
        };
        Ok(Head::Value(major, argument))
    }

    fn length(&self, argument: u64) -> Result<usize, ReadError> {
        usize::try_from(argument).map_err(|_| ReadError::syntax(self.here(), "length overflows"))
    }

    /// Decode a complete item recursively.
    fn decode_value(&mut self) -> Result<Value, ReadError> {
        match self.read_head()? {
            Head::Break => Err(ReadError::syntax(self.here(), "unexpected break")),
            Head::Indefinite(MAJOR_BYTES) => Ok(Value::Bytes(self.byte_chunks()?)),
            Head::Indefinite(MAJOR_TEXT) => Ok(Value::String(self.text_chunks()?)),
            Head::Indefinite(MAJOR_ARRAY) => {
                let mut items = Vec::new();
                while !self.at_break()? {
                    items.push(self.decode_value()?);
                }
                Ok(Value::Array(items))
            }
            Head::Indefinite(MAJOR_MAP) => {
                let mut object = crate::value::Object::default();
                while !self.at_break()? {
                    let key = self.decode_value()?;
                    object.insert(key, self.decode_value()?);
                }
                Ok(Value::Object(object))
            }
            Head::Indefinite(_) => Err(ReadError::syntax(self.here(), "invalid indefinite item")),
            Head::Float(value) => Ok(Value::Number(Number::from_f64(value))),
            Head::Value(major, argument) => self.decode_definite(major, argument),
        }
    }

    fn decode_definite(&mut self, major: u8, argument: u64) -> Result<Value, ReadError> {
        match major {
            MAJOR_UNSIGNED => Ok(Value::Number(Number::from_u64(argument))),
            MAJOR_NEGATIVE => Ok(Value::Number(negative(argument))),
            MAJOR_BYTES => {
                let length = self.length(argument)?;
                Ok(Value::Bytes(self.take(length)?.to_vec()))
            }
            MAJOR_TEXT => {
                let length = self.length(argument)?;
                let position = self.here();
                let text = std::str::from_utf8(self.take(length)?)
                    .map_err(|_| ReadError::InvalidUtf8 { position })?;
                Ok(Value::String(text.to_string()))
            }
            MAJOR_ARRAY => {
                let length = self.length(argument)?;
                let mut items = Vec::with_capacity(length.min(1024));
                for _ in 0..length {
                    items.push(self.decode_value()?);
                }
                Ok(Value::Array(items))
            }
            MAJOR_MAP => {
                let length = self.length(argument)?;
                let mut object = crate::value::Object::default();
                for _ in 0..length {
                    let key = self.decode_value()?;
                    object.insert(key, self.decode_value()?);
                }
                Ok(Value::Object(object))
            }
            MAJOR_TAG => self.decode_tagged(argument),
            MAJOR_SIMPLE => self.decode_simple(argument),
            _ => unreachable!("major type is three bits"),
        }
    }

    fn decode_tagged(&mut self, tag: u64) -> Result<Value, ReadError> {
        match tag {
            TAG_POSITIVE_BIGNUM | TAG_NEGATIVE_BIGNUM => {
                let position = self.here();
                let inner = self.decode_value()?;
                let Value::Bytes(magnitude) = inner else {
                    return Err(ReadError::syntax(position, "bignum payload must be bytes"));
                };
                Ok(Value::Number(bignum(&magnitude, tag == TAG_NEGATIVE_BIGNUM)))
            }
            TAG_DECIMAL_FRACTION => {
                let position = self.here();
                let inner = self.decode_value()?;
                decimal_fraction(&inner)
                    .ok_or_else(|| ReadError::syntax(position, "malformed decimal fraction"))
            }
            _ => {
                let inner = self.decode_value()?;
                Ok(Value::tagged(Value::Number(Number::from_u64(tag)), inner))
            }
        }
    }

    fn decode_simple(&mut self, argument: u64) -> Result<Value, ReadError> {
        match argument {
            20 => Ok(Value::Bool(false)),
            21 => Ok(Value::Bool(true)),
            22 | 23 => Ok(Value::Null),
            _ => Err(ReadError::syntax(self.here(), "unassigned simple value")),
        }
    }

    /// Decode a float at a head that promised one (info 25..=27).
    fn decode_float(&mut self, info: u8) -> Result<f64, ReadError> {
        Ok(match info {
            25 => half_to_f64(u16::from_be_bytes(
                self.take(2)?.try_into().expect("2 bytes"),
            )),
            26 => f64::from(f32::from_be_bytes(
                self.take(4)?.try_into().expect("4 bytes"),
            )),
            _ => f64::from_be_bytes(self.take(8)?.try_into().expect("8 bytes")),
        })
    }

    fn at_break(&mut self) -> Result<bool, ReadError> {
        match self.bytes.get(self.position) {
            Some(&BREAK) => {
                self.position += 1;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(ReadError::eof(self.here())),
        }
    }

    fn byte_chunks(&mut self) -> Result<Vec<u8>, ReadError> {
        let mut buffer = Vec::new();
        while !self.at_break()? {
            match self.read_head()? {
                Head::Value(MAJOR_BYTES, argument) => {
                    let length = self.length(argument)?;
                    buffer.extend_from_slice(self.take(length)?);
                }
                _ => {
                    return Err(ReadError::syntax(
                        self.here(),
                        "chunks must be definite byte strings",
                    ));
                }
            }
        }
        Ok(buffer)
    }

    fn text_chunks(&mut self) -> Result<String, ReadError> {
        let mut buffer = String::new();
        while !self.at_break()? {
            match self.read_head()? {
                Head::Value(MAJOR_TEXT, argument) => {
                    let length = self.length(argument)?;
                    let position = self.here();
                    buffer.push_str(
                        std::str::from_utf8(self.take(length)?)
                            .map_err(|_| ReadError::InvalidUtf8 { position })?,
                    );
                }
                _ => {
                    return Err(ReadError::syntax(
                        self.here(),
                        "chunks must be definite text strings",
                    ));
                }
            }
        }
        Ok(buffer)
    }
}

fn negative(argument: u64) -> Number {
    if argument < i64::MAX as u64 {
        Number::from_i64(-1 - argument as i64)
    } else {
        let magnitude = u128::from(argument) + 1;
        Number::parse(&format!("-{magnitude}")).expect("valid decimal")
    }
}

fn bignum(magnitude: &[u8], negative: bool) -> Number {
    let mut value = fraction::BigUint::from(0_u8);
    for byte in magnitude {
        value = (value << 8_usize) + fraction::BigUint::from(*byte);
    }
    let text = if negative {
        // Tag 3 encodes -1 - n.
        format!("-{}", value + fraction::BigUint::from(1_u8))
    } else {
        value.to_string()
    };
    Number::parse(&text).expect("valid decimal")
}

fn decimal_fraction(inner: &Value) -> Option<Value> {
    let items = inner.as_array()?;
    if items.len() != 2 {
        return None;
    }
    let exponent = items[0].as_i64()?;
    let mantissa = items[1].as_number()?;
    if !mantissa.is_integer() {
        return None;
    }
    let text = format!("{mantissa}e{exponent}");
    Number::parse(&text).map(Value::Number).ok()
}

fn half_to_f64(bits: u16) -> f64 {
    let sign = if bits >> 15 == 1 { -1.0 } else { 1.0 };
    let exponent = (bits >> 10) & 0x1F;
    let mantissa = f64::from(bits & 0x3FF);
    match exponent {
        0 => sign * mantissa * 2.0_f64.powi(-24),
        31 => {
            if mantissa == 0.0 {
                sign * f64::INFINITY
            } else {
                f64::NAN
            }
        }
        exponent => sign * (1.0 + mantissa / 1024.0) * 2.0_f64.powi(i32::from(exponent) - 15),
    }
}

#[derive(Debug)]
struct CborFrame {
    map: bool,
    /// Remaining immediate items (array) or pairs (map); `None` when
    /// indefinite.
    remaining: Option<u64>,
    at_key: bool,
}

/// A streaming CBOR reader emitting [`ValueEvent`]s.
///
/// Map keys are composed internally and surface as single
/// [`ValueEvent::Key`] events, so composite keys are fine.
pub struct CborReader<'a> {
    decoder: Decoder<'a>,
    stack: Vec<CborFrame>,
    done: bool,
    failed: bool,
}

impl<'a> CborReader<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> CborReader<'a> {
        CborReader {
            decoder: Decoder::new(bytes),
            stack: Vec::new(),
            done: false,
            failed: false,
        }
    }

    fn note_item_complete(&mut self) {
        match self.stack.last_mut() {
            None => self.done = true,
            Some(frame) => {
                if frame.map {
                    frame.at_key = true;
                }
                if let Some(remaining) = &mut frame.remaining {
                    *remaining -= 1;
                }
            }
        }
    }

    fn read_event(&mut self) -> Result<Option<ValueEvent>, ReadError> {
        if self.done {
            return Ok(None);
        }
        if let Some(frame) = self.stack.last_mut() {
            if frame.remaining == Some(0) {
                let was_map = frame.map;
                self.stack.pop();
                self.note_item_complete();
                return Ok(Some(if was_map {
                    ValueEvent::EndObject
                } else {
                    ValueEvent::EndArray
                }));
            }
            if frame.remaining.is_none() && self.decoder.at_break()? {
                let was_map = frame.map;
                self.stack.pop();
                self.note_item_complete();
                return Ok(Some(if was_map {
                    ValueEvent::EndObject
                } else {
                    ValueEvent::EndArray
                }));
            }
            if frame.map && frame.at_key {
                frame.at_key = false;
                let key = self.decoder.decode_value()?;
                return Ok(Some(ValueEvent::Key(key)));
            }
        }
        match self.decoder.read_head()? {
            Head::Break => Err(ReadError::syntax(self.decoder.here(), "unexpected break")),
            Head::Value(MAJOR_ARRAY, argument) => {
                self.stack.push(CborFrame {
                    map: false,
                    remaining: Some(argument),
                    at_key: false,
                });
                Ok(Some(ValueEvent::BeginArray))
            }
            Head::Indefinite(MAJOR_ARRAY) => {
                self.stack.push(CborFrame {
                    map: false,
                    remaining: None,
                    at_key: false,
                });
                Ok(Some(ValueEvent::BeginArray))
            }
            Head::Value(MAJOR_MAP, argument) => {
                self.stack.push(CborFrame {
                    map: true,
                    remaining: Some(argument),
                    at_key: true,
                });
                Ok(Some(ValueEvent::BeginObject))
            }
            Head::Indefinite(MAJOR_MAP) => {
                self.stack.push(CborFrame {
                    map: true,
                    remaining: None,
                    at_key: true,
                });
                Ok(Some(ValueEvent::BeginObject))
            }
            Head::Value(MAJOR_TAG, tag)
                if !matches!(
                    tag,
                    TAG_POSITIVE_BIGNUM | TAG_NEGATIVE_BIGNUM | TAG_DECIMAL_FRACTION
                ) =>
            {
                // Number tags fall through to the scalar path below.
                Ok(Some(ValueEvent::Tag(Value::Number(Number::from_u64(tag)))))
            }
            Head::Float(value) => {
                self.note_item_complete();
                Ok(Some(ValueEvent::Scalar(Value::Number(Number::from_f64(
                    value,
                )))))
            }
            Head::Value(major, argument) => {
                let value = self.decoder.decode_definite(major, argument)?;
                self.note_item_complete();
                Ok(Some(ValueEvent::Scalar(value)))
            }
            Head::Indefinite(MAJOR_BYTES) => {
                let value = Value::Bytes(self.decoder.byte_chunks()?);
                self.note_item_complete();
                Ok(Some(ValueEvent::Scalar(value)))
            }
            Head::Indefinite(MAJOR_TEXT) => {
                let value = Value::String(self.decoder.text_chunks()?);
                self.note_item_complete();
                Ok(Some(ValueEvent::Scalar(value)))
            }
            Head::Indefinite(_) => Err(ReadError::syntax(
                self.decoder.here(),
                "invalid indefinite item",
            )),
        }
    }
}

impl Iterator for CborReader<'_> {
    type Item = Result<ValueEvent, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_event() {
            Ok(event) => event.map(Ok),
            Err(error) => {
                self.failed = true;
                Some(Err(error))
            }
        }
    }
}

impl FormatReader for CborReader<'_> {}

/// A CBOR writer. Events are buffered and encoded with definite lengths at
/// [`FormatWriter::finish`], since the event protocol does not carry counts.
pub struct CborWriter {
    composer: Composer,
    root: Option<Value>,
    out: Vec<u8>,
    finished: bool,
}

impl CborWriter {
    #[must_use]
    pub fn new() -> CborWriter {
        CborWriter {
            composer: Composer::default(),
            root: None,
            out: Vec::new(),
            finished: false,
        }
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.out
    }
}

impl Default for CborWriter {
    fn default() -> Self {
        CborWriter::new()
    }
}

impl FormatWriter for CborWriter {
    fn write(&mut self, event: &ValueEvent) -> Result<(), WriteError> {
        if self.finished {
            return Err(WriteError::Finished);
        }
        if self.root.is_some() {
            return Err(WriteError::invalid("a document holds a single value"));
        }
        match self.composer.push(event.clone()) {
            Ok(Some(value)) => {
                self.root = Some(value);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(error) => Err(WriteError::invalid(error.to_string())),
        }
    }

    fn finish(&mut self) -> Result<(), WriteError> {
        if self.finished {
            return Err(WriteError::Finished);
        }
        let Some(root) = self.root.take() else {
            return Err(WriteError::invalid("document is incomplete"));
        };
        encode_value(&root, &mut self.out);
        self.finished = true;
        Ok(())
    }
}

fn write_head(major: u8, argument: u64, out: &mut Vec<u8>) {
    let base = major << 5;
    if argument < 24 {
        out.push(base | u8::try_from(argument).expect("small argument"));
    } else if argument <= u64::from(u8::MAX) {
        out.push(base | 24);
        out.push(argument as u8);
    } else if argument <= u64::from(u16::MAX) {
        out.push(base | 25);
        out.extend_from_slice(&(argument as u16).to_be_bytes());
    } else if argument <= u64::from(u32::MAX) {
        out.push(base | 26);
        out.extend_from_slice(&(argument as u32).to_be_bytes());
    } else {
        out.push(base | 27);
        out.extend_from_slice(&argument.to_be_bytes());
    }
}

fn encode_value(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null => out.push(0xF6),
        Value::Bool(false) => out.push(0xF4),
        Value::Bool(true) => out.push(0xF5),
        Value::Number(number) => encode_number(number, out),
        Value::Bytes(bytes) => {
            write_head(MAJOR_BYTES, bytes.len() as u64, out);
            out.extend_from_slice(bytes);
        }
        Value::String(text) => {
            write_head(MAJOR_TEXT, text.len() as u64, out);
            out.extend_from_slice(text.as_bytes());
        }
        Value::Array(items) => {
            write_head(MAJOR_ARRAY, items.len() as u64, out);
            for item in items {
                encode_value(item, out);
            }
        }
        Value::Object(object) => {
            write_head(MAJOR_MAP, object.len() as u64, out);
            for (key, item) in object {
                encode_value(key, out);
                encode_value(item, out);
            }
        }
        Value::Tagged(tagged) => {
            // CBOR tags are numbers; other tags cannot travel this format.
            if let Some(tag) = tagged.tag.as_u64() {
                write_head(MAJOR_TAG, tag, out);
            }
            encode_value(&tagged.value, out);
        }
    }
}

fn encode_number(number: &Number, out: &mut Vec<u8>) {
    if let Some(value) = number.as_u64() {
        write_head(MAJOR_UNSIGNED, value, out);
    } else if let Some(value) = number.as_i64() {
        write_head(MAJOR_NEGATIVE, (-1 - value) as u64, out);
    } else if number.is_integer() {
        encode_bignum(number, out);
    } else if let Some(value) = number.as_f64() {
        out.push(0xFB);
        out.extend_from_slice(&value.to_bits().to_be_bytes());
    } else if number.is_finite() {
        encode_decimal_fraction(number, out);
    } else {
        // NaN or infinity.
        out.push(0xFB);
        out.extend_from_slice(&number.to_f64_lossy().to_bits().to_be_bytes());
    }
}

fn encode_bignum(number: &Number, out: &mut Vec<u8>) {
    let text = number.to_decimal_string().expect("integer is finite");
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.as_str()),
    };
    let mut magnitude = digits
        .parse::<fraction::BigUint>()
        .expect("decimal digits");
    if negative {
        magnitude -= fraction::BigUint::from(1_u8);
    }
    let bytes = magnitude.to_bytes_be();
    write_head(
        MAJOR_TAG,
        if negative {
            TAG_NEGATIVE_BIGNUM
        } else {
            TAG_POSITIVE_BIGNUM
        },
        out,
    );
    write_head(MAJOR_BYTES, bytes.len() as u64, out);
    out.extend_from_slice(&bytes);
}

/// Encode a non-integral decimal as tag 4 `[exponent, mantissa]`.
fn encode_decimal_fraction(number: &Number, out: &mut Vec<u8>) {
    let text = number.to_decimal_string().expect("finite");
    let (mantissa, exponent) = split_decimal(&text);
    write_head(MAJOR_TAG, TAG_DECIMAL_FRACTION, out);
    write_head(MAJOR_ARRAY, 2, out);
    encode_number(&Number::from_i64(exponent), out);
    encode_number(&Number::parse(&mantissa).expect("digits"), out);
}

/// Split a decimal spelling into integer mantissa text and base-10 exponent.
fn split_decimal(text: &str) -> (String, i64) {
    let (body, explicit) = match text.split_once(['e', 'E']) {
        Some((body, exponent)) => (body, exponent.parse::<i64>().unwrap_or(0)),
        None => (text, 0),
    };
    match body.split_once('.') {
        Some((integer, fractional)) => (
            format!("{integer}{fractional}"),
            explicit - fractional.len() as i64,
        ),
        None => (body.to_string(), explicit),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::{from_slice, to_vec, CborReader};
    use crate::{event::FormatReader, number::Number, value::Value};

    fn round_trip(value: &Value) {
        assert_eq!(&from_slice(&to_vec(value)).unwrap(), value);
    }

    #[test]
    fn round_trips_plain_values() {
        round_trip(&Value::from(json!({"a": [1, -2, true, null], "b": "text"})));
        round_trip(&Value::Bytes(vec![0, 1, 2, 255]));
        round_trip(&Value::from(1.5));
        round_trip(&Value::from(json!([0, 23, 24, 255, 256, 65535, 65536])));
    }

    #[test]
    fn round_trips_tags_and_wide_numbers() {
        round_trip(&Value::tagged(Value::from(1_u64), Value::from(1_700_000_000_i64)));
        round_trip(&Value::Number(
            Number::parse("123456789012345678901234567890").unwrap(),
        ));
        round_trip(&Value::Number(
            Number::parse("-123456789012345678901234567890").unwrap(),
        ));
        round_trip(&Value::Number(Number::parse("0.1").unwrap()));
    }

    #[test]
    fn map_keys_may_be_any_value() {
        let mut object = crate::value::Object::default();
        object.insert(Value::from(1), Value::from("one"));
        object.insert(Value::from(json!([1, 2])), Value::from("pair"));
        round_trip(&Value::Object(object));
    }

    #[test]
    fn preserves_key_order() {
        let mut object = crate::value::Object::default();
        object.insert(Value::from("z"), Value::from(1));
        object.insert(Value::from("a"), Value::from(2));
        let decoded = from_slice(&to_vec(&Value::Object(object))).unwrap();
        let keys: Vec<_> = decoded
            .as_object()
            .unwrap()
            .keys()
            .map(|key| key.as_str().unwrap().to_string())
            .collect();
        assert_eq!(keys, ["z", "a"]);
    }

    // Examples from RFC 8949 appendix A.
    #[test_case(&[0x00], json!(0))]
    #[test_case(&[0x17], json!(23))]
    #[test_case(&[0x18, 0x18], json!(24))]
    #[test_case(&[0x20], json!(-1))]
    #[test_case(&[0x64, 0x49, 0x45, 0x54, 0x46], json!("IETF"))]
    #[test_case(&[0x83, 0x01, 0x02, 0x03], json!([1, 2, 3]))]
    #[test_case(&[0xF4], json!(false))]
    #[test_case(&[0xF6], json!(null))]
    fn decodes_rfc_examples(bytes: &[u8], expected: serde_json::Value) {
        assert_eq!(from_slice(bytes).unwrap(), Value::from(expected));
    }

    #[test]
    fn indefinite_items_are_normalized() {
        // [_ "strea", "ming"] — indefinite text string inside an indefinite
        // array.
        let bytes = [
            0x9F, 0x7F, 0x65, 0x73, 0x74, 0x72, 0x65, 0x61, 0x62, 0x6D, 0x69, 0xFF, 0xFF,
        ];
        let value = from_slice(&bytes).unwrap();
        assert_eq!(value, Value::from(json!(["streami"])));
        // Re-encoding is definite and shorter.
        let reencoded = to_vec(&value);
        assert_eq!(reencoded[0], 0x81);
    }

    #[test]
    fn event_stream_matches_composition() {
        let value = Value::from(json!({"k": [1, {"n": true}]}));
        let composed = CborReader::new(&to_vec(&value)).read_value().unwrap();
        assert_eq!(composed, value);
    }

    #[test]
    fn truncated_input_fails() {
        assert!(from_slice(&[0x83, 0x01]).is_err());
        assert!(from_slice(&[0x19, 0x01]).is_err());
    }

    #[test]
    fn half_precision_floats_decode() {
        // 1.5 as float16.
        assert_eq!(
            from_slice(&[0xF9, 0x3E, 0x00]).unwrap(),
            Value::from(1.5_f64)
        );
    }
}
