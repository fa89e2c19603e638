//! Binary-to-text codecs backing the `contentEncoding` registry.
//!
//! Every codec is a pure `bytes -> text -> bytes` pair; `decode(encode(b))`
//! reproduces `b` exactly for each of them.
use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine,
};
use fraction::BigUint;

use crate::error::EncodingError;

/// Identifiers of the bundled codecs, in registration order.
pub const NAMES: &[&str] = &[
    "base16",
    "base32",
    "base32hex",
    "base32-crockford",
    "base32-lower",
    "base62",
    "base64",
    "base64url",
    "quoted-printable",
];

/// Encode with a bundled codec.
pub fn encode(name: &str, bytes: &[u8]) -> Result<String, EncodingError> {
    match name {
        "base16" => Ok(base16_encode(bytes)),
        "base32" => Ok(base32_encode(bytes, BASE32_ALPHABET, true)),
        "base32hex" => Ok(base32_encode(bytes, BASE32_HEX_ALPHABET, true)),
        "base32-crockford" => Ok(base32_encode(bytes, BASE32_CROCKFORD_ALPHABET, false)),
        "base32-lower" => Ok(base32_encode(bytes, BASE32_LOWER_ALPHABET, true)),
        "base62" => Ok(base62_encode(bytes)),
        "base64" => Ok(STANDARD.encode(bytes)),
        "base64url" => Ok(URL_SAFE_NO_PAD.encode(bytes)),
        "quoted-printable" => Ok(quoted_printable_encode(bytes)),
        _ => Err(EncodingError::UnsupportedEncoding {
            encoding: name.to_string(),
        }),
    }
}

/// Decode with a bundled codec.
pub fn decode(name: &str, text: &str) -> Result<Vec<u8>, EncodingError> {
    match name {
        "base16" => base16_decode(text),
        "base32" => base32_decode(text, BASE32_ALPHABET, "base32"),
        "base32hex" => base32_decode(text, BASE32_HEX_ALPHABET, "base32hex"),
        "base32-crockford" => base32_crockford_decode(text),
        "base32-lower" => base32_decode(text, BASE32_LOWER_ALPHABET, "base32-lower"),
        "base62" => base62_decode(text),
        "base64" => STANDARD
            .decode(text)
            .map_err(|error| EncodingError::decoding("base64", error.to_string())),
        "base64url" => URL_SAFE_NO_PAD
            .decode(text.trim_end_matches('='))
            .map_err(|error| EncodingError::decoding("base64url", error.to_string())),
        "quoted-printable" => quoted_printable_decode(text),
        _ => Err(EncodingError::UnsupportedEncoding {
            encoding: name.to_string(),
        }),
    }
}

fn base16_encode(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(DIGITS[usize::from(byte >> 4)] as char);
        out.push(DIGITS[usize::from(byte & 0x0F)] as char);
    }
    out
}

fn base16_decode(text: &str) -> Result<Vec<u8>, EncodingError> {
    if text.len() % 2 != 0 {
        return Err(EncodingError::decoding("base16", "odd number of digits"));
    }
    let mut out = Vec::with_capacity(text.len() / 2);
    let bytes = text.as_bytes();
    for pair in bytes.chunks_exact(2) {
        let high = hex_digit(pair[0])
            .ok_or_else(|| EncodingError::decoding("base16", "invalid digit"))?;
        let low = hex_digit(pair[1])
            .ok_or_else(|| EncodingError::decoding("base16", "invalid digit"))?;
        out.push(high << 4 | low);
    }
    Ok(out)
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const BASE32_LOWER_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";
const BASE32_HEX_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHIJKLMNOPQRSTUV";
const BASE32_CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

fn base32_encode(bytes: &[u8], alphabet: &[u8; 32], pad: bool) -> String {
    let mut out = String::with_capacity((bytes.len() + 4) / 5 * 8);
    for chunk in bytes.chunks(5) {
        let mut buffer = [0_u8; 5];
        buffer[..chunk.len()].copy_from_slice(chunk);
        let bits = u64::from(buffer[0]) << 32
            | u64::from(buffer[1]) << 24
            | u64::from(buffer[2]) << 16
            | u64::from(buffer[3]) << 8
            | u64::from(buffer[4]);
        let digits = match chunk.len() {
            1 => 2,
            2 => 4,
            3 => 5,
            4 => 7,
            _ => 8,
        };
        for index in 0..digits {
            let shift = 35 - index * 5;
            out.push(alphabet[usize::try_from(bits >> shift & 0x1F).expect("five bits")] as char);
        }
        if pad {
            for _ in digits..8 {
                out.push('=');
            }
        }
    }
    out
}

fn base32_decode_raw(
    text: &str,
    lookup: impl Fn(u8) -> Option<u8>,
    name: &str,
) -> Result<Vec<u8>, EncodingError> {
    let trimmed = text.trim_end_matches('=');
    let mut out = Vec::with_capacity(trimmed.len() * 5 / 8);
    let mut bits = 0_u64;
    let mut count = 0_u32;
    for &byte in trimmed.as_bytes() {
        let digit =
            lookup(byte).ok_or_else(|| EncodingError::decoding(name, "invalid digit"))?;
        bits = bits << 5 | u64::from(digit);
        count += 5;
        if count >= 8 {
            count -= 8;
            out.push((bits >> count) as u8);
        }
    }
    // Leftover bits are padding and must be zero.
    if count > 0 && bits & ((1 << count) - 1) != 0 {
        return Err(EncodingError::decoding(name, "non-zero trailing bits"));
    }
    Ok(out)
}

fn base32_decode(text: &str, alphabet: &[u8; 32], name: &str) -> Result<Vec<u8>, EncodingError> {
    base32_decode_raw(
        text,
        |byte| alphabet.iter().position(|&entry| entry == byte).map(|i| i as u8),
        name,
    )
}

fn base32_crockford_decode(text: &str) -> Result<Vec<u8>, EncodingError> {
    base32_decode_raw(
        text,
        |byte| {
            let byte = byte.to_ascii_uppercase();
            let byte = match byte {
                b'O' => b'0',
                b'I' | b'L' => b'1',
                other => other,
            };
            BASE32_CROCKFORD_ALPHABET
                .iter()
                .position(|&entry| entry == byte)
                .map(|index| index as u8)
        },
        "base32-crockford",
    )
}

const BASE62_ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

fn base62_encode(bytes: &[u8]) -> String {
    // Leading zero bytes are not representable in a pure base conversion;
    // they become leading zero digits.
    let zeros = bytes.iter().take_while(|byte| **byte == 0).count();
    let mut digits = Vec::new();
    let mut value = BigUint::from(0_u8);
    for &byte in &bytes[zeros..] {
        value = (value << 8_usize) + BigUint::from(byte);
    }
    let sixty_two = BigUint::from(62_u8);
    let zero = BigUint::from(0_u8);
    while value > zero {
        let digit = &value % &sixty_two;
        let digit_index = u8::try_from(digit).expect("digit below 62");
        digits.push(BASE62_ALPHABET[usize::from(digit_index)]);
        value /= &sixty_two;
    }
    let mut out = String::with_capacity(zeros + digits.len());
    for _ in 0..zeros {
        out.push('0');
    }
    for &digit in digits.iter().rev() {
        out.push(digit as char);
    }
    out
}

fn base62_decode(text: &str) -> Result<Vec<u8>, EncodingError> {
    let zeros = text.bytes().take_while(|byte| *byte == b'0').count();
    let mut value = BigUint::from(0_u8);
    for byte in text.as_bytes()[zeros..].iter() {
        let digit = BASE62_ALPHABET
            .iter()
            .position(|&entry| entry == *byte)
            .ok_or_else(|| EncodingError::decoding("base62", "invalid digit"))?;
        value = value * BigUint::from(62_u8) + BigUint::from(digit as u8);
    }
    let mut out = vec![0_u8; zeros];
    if value > BigUint::from(0_u8) {
        out.extend_from_slice(&value.to_bytes_be());
    }
    Ok(out)
}

fn quoted_printable_encode(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(bytes.len());
    for (index, &byte) in bytes.iter().enumerate() {
        let last = index + 1 == bytes.len();
        let printable = matches!(byte, b'\t' | b' ' | 0x21..=0x7E) && byte != b'=';
        // Trailing whitespace must be escaped to survive transport.
        if printable && !(last && matches!(byte, b'\t' | b' ')) {
            out.push(byte as char);
        } else {
            out.push('=');
            out.push(DIGITS[usize::from(byte >> 4)] as char);
            out.push(DIGITS[usize::from(byte & 0x0F)] as char);
        }
    }
    out
}

fn quoted_printable_decode(text: &str) -> Result<Vec<u8>, EncodingError> {
    let mut out = Vec::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'=' => {
                // Soft line break or escaped byte.
                if bytes.get(index + 1) == Some(&b'\r') && bytes.get(index + 2) == Some(&b'\n') {
                    index += 3;
                } else if bytes.get(index + 1) == Some(&b'\n') {
                    index += 2;
                } else {
                    let high = bytes
                        .get(index + 1)
                        .copied()
                        .and_then(hex_digit)
                        .ok_or_else(|| {
                            EncodingError::decoding("quoted-printable", "invalid escape")
                        })?;
                    let low = bytes
                        .get(index + 2)
                        .copied()
                        .and_then(hex_digit)
                        .ok_or_else(|| {
                            EncodingError::decoding("quoted-printable", "invalid escape")
                        })?;
                    out.push(high << 4 | low);
                    index += 3;
                }
            }
            byte => {
                out.push(byte);
                index += 1;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::{decode, encode, NAMES};

    #[test]
    fn every_codec_round_trips() {
        let samples: &[&[u8]] = &[
            b"",
            b"f",
            b"fo",
            b"foo",
            b"foob",
            b"fooba",
            b"foobar",
            &[0x00, 0x00, 0x01, 0xFF],
            &[0xDE, 0xAD, 0xBE, 0xEF],
        ];
        for name in NAMES {
            for sample in samples {
                let encoded = encode(name, sample).unwrap();
                let decoded = decode(name, &encoded).unwrap();
                assert_eq!(&decoded, sample, "codec {name}: {encoded}");
            }
        }
    }

    // RFC 4648 test vectors.
    #[test_case("base16", b"foobar", "666F6F626172")]
    #[test_case("base32", b"foobar", "MZXW6YTBOI======")]
    #[test_case("base32hex", b"foobar", "CPNMUOJ1E8======")]
    #[test_case("base64", b"foobar", "Zm9vYmFy")]
    #[test_case("base64", &[0xDE, 0xAD, 0xBE, 0xEF], "3q2+7w==")]
    #[test_case("base64url", &[0xDE, 0xAD, 0xBE, 0xEF], "3q2-7w")]
    fn known_vectors(name: &str, input: &[u8], expected: &str) {
        assert_eq!(encode(name, input).unwrap(), expected);
    }

    #[test]
    fn crockford_decode_is_forgiving() {
        let encoded = encode("base32-crockford", b"hello").unwrap();
        let relaxed = encoded.to_lowercase().replace('1', "I");
        assert_eq!(decode("base32-crockford", &relaxed).unwrap(), b"hello");
    }

    #[test]
    fn quoted_printable_escapes() {
        assert_eq!(
            encode("quoted-printable", "héllo=".as_bytes()).unwrap(),
            "h=C3=A9llo=3D"
        );
        assert_eq!(
            decode("quoted-printable", "h=C3=A9llo=3D").unwrap(),
            "héllo=".as_bytes()
        );
        // Soft line breaks disappear.
        assert_eq!(decode("quoted-printable", "ab=\r\ncd").unwrap(), b"abcd");
    }

    #[test]
    fn unknown_codec_is_reported() {
        assert!(encode("rot13", b"x").is_err());
        assert!(decode("rot13", "x").is_err());
    }
}
