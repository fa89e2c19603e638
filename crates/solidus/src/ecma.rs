//! Best-effort translation of ECMA 262 regular expressions into the syntax
//! `fancy-regex` accepts.
//!
//! `fancy-regex` already supports look-arounds and backreferences, so the
//! remaining gaps are character-class semantics: ECMA `\d`/`\w` are ASCII
//! while Rust's are Unicode, and `\cX` control escapes have no Rust
//! spelling. `\s` is left untouched; its ECMA and Rust definitions differ
//! only in exotic whitespace.
use std::borrow::Cow;

pub(crate) fn to_rust_regex(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains('\\') {
        return Cow::Borrowed(pattern);
    }
    let mut translated = String::with_capacity(pattern.len());
    let mut changed = false;
    let mut in_class = false;
    let mut chars = pattern.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '[' if !in_class => {
                in_class = true;
                translated.push(ch);
            }
            ']' if in_class => {
                in_class = false;
                translated.push(ch);
            }
            '\\' => {
                let Some(escape) = chars.next() else {
                    translated.push('\\');
                    break;
                };
                match escape {
                    'c' => match chars.peek() {
                        Some(letter) if letter.is_ascii_alphabetic() => {
                            let letter = *letter;
                            chars.next();
                            translated.push_str(&format!("\\x{:02x}", (letter as u8) % 32));
                            changed = true;
                        }
                        _ => {
                            translated.push('\\');
                            translated.push('c');
                        }
                    },
                    'd' => {
                        translated.push_str(if in_class { "0-9" } else { "[0-9]" });
                        changed = true;
                    }
                    'D' if !in_class => {
                        translated.push_str("[^0-9]");
                        changed = true;
                    }
                    'w' => {
                        translated.push_str(if in_class {
                            "A-Za-z0-9_"
                        } else {
                            "[A-Za-z0-9_]"
                        });
                        changed = true;
                    }
                    'W' if !in_class => {
                        translated.push_str("[^A-Za-z0-9_]");
                        changed = true;
                    }
                    other => {
                        translated.push('\\');
                        translated.push(other);
                    }
                }
            }
            other => translated.push(other),
        }
    }
    if changed {
        Cow::Owned(translated)
    } else {
        Cow::Borrowed(pattern)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::to_rust_regex;

    #[test_case(r"^[a-z]+$", r"^[a-z]+$"; "untouched")]
    #[test_case(r"\d{3}", r"[0-9]{3}")]
    #[test_case(r"[\d\w]", r"[0-9A-Za-z0-9_]")]
    #[test_case(r"\cJ", "\\x0a"; "control escape")]
    #[test_case(r"\D\W", r"[^0-9][^A-Za-z0-9_]")]
    #[test_case(r"a\.b", r"a\.b"; "ordinary escapes survive")]
    fn translation(input: &str, expected: &str) {
        assert_eq!(to_rust_regex(input), expected);
    }

    #[test]
    fn translated_patterns_compile() {
        for pattern in [r"\d+", r"(?=lookahead)\w*", r"(a)\1"] {
            assert!(fancy_regex::Regex::new(&to_rust_regex(pattern)).is_ok());
        }
    }
}
