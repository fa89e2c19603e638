//! YAML 1.2 core-schema reader and writer.
//!
//! The reader covers the structural subset this crate needs: block and flow
//! collections, plain and quoted scalars, literal/folded block scalars,
//! comments, anchors, aliases and tags, and a single document per stream.
//! Constructs outside the subset (directives other than `%YAML`, explicit
//! `?` keys, multi-line plain scalars) are reported as errors rather than
//! silently misparsed. The reader tokenizes the document up front and then
//! replays it as a lazy event sequence.
//!
//! The writer streams events directly, honoring flow/block collection
//! styles and quoting hints via [`ValueStyle`]. Byte strings travel as
//! `!!binary` base64; explicit tags round-trip through [`Value::Tagged`].
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::{
    error::{ReadError, ReadPosition, WriteError},
    event::{FormatReader, FormatWriter, ValueEvent, ValueStyle},
    number::Number,
    value::Value,
};

/// Parse a single YAML document.
pub fn from_str(text: &str) -> Result<Value, ReadError> {
    YamlReader::new(text)?.read_value()
}

/// Serialize a value as block-style YAML.
pub fn to_string(value: &Value) -> Result<String, WriteError> {
    let mut writer = YamlWriter::new();
    writer.write_value(value)?;
    writer.finish()?;
    Ok(writer.into_string())
}

pub(crate) const YAML_TAG_PREFIX: &str = "tag:yaml.org,2002:";

/// A streaming YAML reader emitting [`ValueEvent`]s.
pub struct YamlReader {
    events: std::vec::IntoIter<ValueEvent>,
    failed: bool,
}

impl YamlReader {
    pub fn new(text: &str) -> Result<YamlReader, ReadError> {
        let mut parser = Parser::new(text);
        parser.parse_document()?;
        Ok(YamlReader {
            events: parser.events.into_iter(),
            failed: false,
        })
    }
}

impl Iterator for YamlReader {
    type Item = Result<ValueEvent, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.events.next().map(Ok)
    }
}

impl FormatReader for YamlReader {}

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    indent: usize,
    /// Content after indentation, before trailing whitespace; comments are
    /// stripped lazily because `#` may sit inside quotes.
    raw: &'a str,
}

struct Parser<'a> {
    lines: Vec<Line<'a>>,
    index: usize,
    events: Vec<ValueEvent>,
    /// A core-schema tag that pins how the next scalar resolves.
    forced_tag: Option<String>,
}

fn position(line: &Line<'_>) -> ReadPosition {
    ReadPosition {
        offset: 0,
        line: line.number,
    }
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Parser<'a> {
        let lines = text
            .lines()
            .enumerate()
            .map(|(index, raw)| {
                let indent = raw.len() - raw.trim_start_matches(' ').len();
                Line {
                    number: index + 1,
                    indent,
                    raw: &raw[indent..],
                }
            })
            .collect();
        Parser {
            lines,
            index: 0,
            events: Vec::new(),
            forced_tag: None,
        }
    }

    /// The next structurally meaningful line.
    fn peek(&mut self) -> Option<Line<'a>> {
        while let Some(line) = self.lines.get(self.index) {
            let content = strip_comment(line.raw);
            if content.is_empty() {
                self.index += 1;
            } else {
                return Some(Line {
                    number: line.number,
                    indent: line.indent,
                    raw: content,
                });
            }
        }
        None
    }

    fn parse_document(&mut self) -> Result<(), ReadError> {
        while let Some(line) = self.peek() {
            if line.raw.starts_with('%') {
                // Directives carry no content we interpret.
                self.index += 1;
            } else {
                break;
            }
        }
        if let Some(line) = self.peek() {
            if line.raw == "---" {
                self.index += 1;
            } else if let Some(rest) = line.raw.strip_prefix("--- ") {
                self.lines[self.index] = Line {
                    number: line.number,
                    indent: line.indent + 4,
                    raw: rest,
                };
            }
        }
        match self.peek() {
            None => self.events.push(ValueEvent::Scalar(Value::Null)),
            Some(_) => self.parse_node(0)?,
        }
        if let Some(line) = self.peek() {
            if line.raw == "..." {
                self.index = self.lines.len();
            } else {
                return Err(ReadError::syntax(
                    position(&line),
                    "a stream holds a single document",
                ));
            }
        }
        Ok(())
    }

    /// Parse the node starting at the current line, which must be indented
    /// at least `min_indent`.
    fn parse_node(&mut self, min_indent: usize) -> Result<(), ReadError> {
        let Some(line) = self.peek() else {
            self.events.push(ValueEvent::Scalar(Value::Null));
            return Ok(());
        };
        if line.indent < min_indent {
            self.events.push(ValueEvent::Scalar(Value::Null));
            return Ok(());
        }
        let rest = self.parse_properties(line.raw, &line)?;
        if rest != line.raw {
            // Properties consumed; re-examine what follows on this line.
            if rest.is_empty() {
                self.index += 1;
                return self.parse_nested_or_null(min_indent.saturating_sub(1));
            }
            self.lines[self.index] = Line {
                number: line.number,
                indent: line.indent + (line.raw.len() - rest.len()),
                raw: rest,
            };
            return self.parse_node(min_indent);
        }
        if let Some(alias) = rest.strip_prefix('*') {
            let name = alias.trim();
            if name.is_empty() || !is_anchor_name(name) {
                return Err(ReadError::syntax(position(&line), "invalid alias name"));
            }
            self.events.push(ValueEvent::Alias(name.to_string()));
            self.index += 1;
            return Ok(());
        }
        if rest == "?" || rest.starts_with("? ") {
            return Err(ReadError::syntax(
                position(&line),
                "explicit key indicators are not supported",
            ));
        }
        if rest.starts_with('|') || rest.starts_with('>') {
            let scalar = self.parse_block_scalar(min_indent.saturating_sub(1), rest)?;
            if let Some(tag) = self.forced_tag.take() {
                if let Some(value) = apply_forced_tag(&tag, &scalar) {
                    self.events.push(ValueEvent::Style(if rest.starts_with('|') {
                        ValueStyle::Literal
                    } else {
                        ValueStyle::Folded
                    }));
                    self.events.push(ValueEvent::Scalar(value));
                    return Ok(());
                }
            }
            self.events.push(ValueEvent::Style(if rest.starts_with('|') {
                ValueStyle::Literal
            } else {
                ValueStyle::Folded
            }));
            self.events.push(ValueEvent::Scalar(Value::String(scalar)));
            return Ok(());
        }
        if rest.starts_with('[') || rest.starts_with('{') {
            self.forced_tag = None;
            return self.parse_flow(line);
        }
        if rest == "-" || rest.starts_with("- ") {
            self.forced_tag = None;
            return self.parse_block_sequence(line.indent);
        }
        if find_mapping_colon(rest).is_some() {
            self.forced_tag = None;
            return self.parse_block_mapping(line.indent);
        }
        // A single-line scalar.
        self.index += 1;
        if let Some(next) = self.peek() {
            if next.indent > line.indent && !rest.starts_with(['"', '\'']) {
                return Err(ReadError::syntax(
                    position(&next),
                    "multi-line plain scalars are not supported",
                ));
            }
        }
        let value = self.parse_inline_scalar(rest, &line)?;
        self.events.push(ValueEvent::Scalar(value));
        Ok(())
    }

    /// Consume leading `&anchor` / `!tag` properties, emitting their events.
    /// Returns what remains of the line.
    fn parse_properties(&mut self, mut rest: &'a str, line: &Line<'a>) -> Result<&'a str, ReadError> {
        loop {
            if let Some(after) = rest.strip_prefix('&') {
                let end = after
                    .find(|ch: char| ch.is_whitespace())
                    .unwrap_or(after.len());
                let name = &after[..end];
                if name.is_empty() || !is_anchor_name(name) {
                    return Err(ReadError::syntax(position(line), "invalid anchor name"));
                }
                self.events.push(ValueEvent::Anchor(name.to_string()));
                rest = after[end..].trim_start();
            } else if rest.starts_with('!') {
                let end = rest
                    .find(|ch: char| ch.is_whitespace())
                    .unwrap_or(rest.len());
                let tag = resolve_tag(&rest[..end])
                    .ok_or_else(|| ReadError::syntax(position(line), "invalid tag"))?;
                if tag == format!("{YAML_TAG_PREFIX}binary") {
                    // Binary payloads normalize to plain byte strings.
                    self.forced_tag = Some(tag);
                } else {
                    if is_core_scalar_tag(&tag) {
                        self.forced_tag = Some(tag.clone());
                    }
                    self.events.push(ValueEvent::Tag(Value::String(tag)));
                }
                rest = rest[end..].trim_start();
            } else {
                return Ok(rest);
            }
        }
    }

    fn parse_nested_or_null(&mut self, parent_indent: usize) -> Result<(), ReadError> {
        match self.peek() {
            Some(next)
                if next.indent > parent_indent
                    || (next.indent == parent_indent
                        && (next.raw == "-" || next.raw.starts_with("- "))) =>
            {
                self.parse_node(next.indent)
            }
            _ => {
                self.events.push(ValueEvent::Scalar(Value::Null));
                Ok(())
            }
        }
    }

    fn parse_block_sequence(&mut self, indent: usize) -> Result<(), ReadError> {
        self.events.push(ValueEvent::BeginArray);
        while let Some(line) = self.peek() {
            if line.indent != indent || !(line.raw == "-" || line.raw.starts_with("- ")) {
                break;
            }
            if line.raw == "-" {
                self.index += 1;
                self.parse_nested_or_null(indent)?;
            } else {
                let content = line.raw[2..].trim_start();
                let offset = line.raw.len() - content.len();
                self.lines[self.index] = Line {
                    number: line.number,
                    indent: indent + offset,
                    raw: content,
                };
                self.parse_node(indent + 1)?;
            }
        }
        self.events.push(ValueEvent::EndArray);
        Ok(())
    }

    fn parse_block_mapping(&mut self, indent: usize) -> Result<(), ReadError> {
        self.events.push(ValueEvent::BeginObject);
        while let Some(line) = self.peek() {
            if line.indent != indent {
                break;
            }
            let Some(colon) = find_mapping_colon(line.raw) else {
                break;
            };
            let key_text = line.raw[..colon].trim_end();
            let key = self.parse_inline_scalar(key_text, &line)?;
            self.events.push(ValueEvent::Key(key));
            let value_text = line.raw[colon + 1..].trim_start();
            if value_text.is_empty() {
                self.index += 1;
                self.parse_nested_or_null(indent)?;
            } else {
                let offset = line.raw.len() - value_text.len();
                self.lines[self.index] = Line {
                    number: line.number,
                    indent: indent + offset,
                    raw: value_text,
                };
                self.parse_node(indent + 1)?;
            }
        }
        self.events.push(ValueEvent::EndObject);
        Ok(())
    }

    /// Parse a flow collection, joining continuation lines until brackets
    /// balance.
    fn parse_flow(&mut self, line: Line<'a>) -> Result<(), ReadError> {
        let mut text = String::new();
        let mut depth = 0_usize;
        loop {
            let Some(current) = self.peek() else {
                return Err(ReadError::eof(ReadPosition {
                    offset: 0,
                    line: self.lines.last().map_or(0, |line| line.number),
                }));
            };
            let content = current.raw;
            depth = update_flow_depth(content, depth)
                .map_err(|reason| ReadError::syntax(position(&current), reason))?;
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(content);
            self.index += 1;
            if depth == 0 {
                break;
            }
        }
        let mut flow = FlowParser {
            chars: text.char_indices().collect(),
            position: 0,
            line_number: line.number,
            events: &mut self.events,
            forced_tag: None,
        };
        flow.parse_value()?;
        flow.skip_spaces();
        if flow.position < flow.chars.len() {
            return Err(ReadError::syntax(
                position(&line),
                "trailing characters after flow collection",
            ));
        }
        Ok(())
    }

    fn parse_block_scalar(&mut self, indent: usize, header: &str) -> Result<String, ReadError> {
        let folded = header.starts_with('>');
        let mut chomp = Chomp::Clip;
        let mut explicit_indent = None;
        for ch in header[1..].chars() {
            match ch {
                '-' => chomp = Chomp::Strip,
                '+' => chomp = Chomp::Keep,
                '1'..='9' => explicit_indent = Some(ch as usize - '0' as usize),
                _ => {
                    let line = self.peek().expect("current line exists");
                    return Err(ReadError::syntax(
                        position(&line),
                        "invalid block scalar header",
                    ));
                }
            }
        }
        self.index += 1;
        // Collect raw lines that belong to the scalar.
        let mut content_indent = explicit_indent.map(|extra| indent + extra);
        let mut collected: Vec<String> = Vec::new();
        while let Some(line) = self.lines.get(self.index) {
            let is_blank = line.raw.trim().is_empty();
            if is_blank {
                collected.push(String::new());
                self.index += 1;
                continue;
            }
            let scalar_indent = match content_indent {
                Some(value) => value,
                None => {
                    if line.indent <= indent {
                        break;
                    }
                    content_indent = Some(line.indent);
                    line.indent
                }
            };
            if line.indent < scalar_indent {
                break;
            }
            let mut text = " ".repeat(line.indent - scalar_indent);
            text.push_str(line.raw);
            collected.push(text);
            self.index += 1;
        }
        // Trailing blanks participate in chomping only.
        while collected.last().is_some_and(String::is_empty) {
            collected.pop();
            if chomp == Chomp::Keep {
                // Put it back as a kept trailing newline marker.
                collected.push(String::new());
                break;
            }
        }
        let mut body = if folded {
            fold_lines(&collected)
        } else {
            collected.join("\n")
        };
        match chomp {
            Chomp::Strip => {}
            Chomp::Clip | Chomp::Keep => {
                if !body.is_empty() || chomp == Chomp::Keep {
                    body.push('\n');
                }
            }
        }
        Ok(body)
    }

    fn parse_inline_scalar(&mut self, text: &str, line: &Line<'a>) -> Result<Value, ReadError> {
        fn resolve(forced: Option<&str>, value: Value) -> Value {
            match (forced, &value) {
                (Some(tag), Value::String(text)) => {
                    apply_forced_tag(tag, text).unwrap_or_else(|| value.clone())
                }
                _ => value,
            }
        }
        let forced = self.forced_tag.take();
        if let Some(rest) = text.strip_prefix('"') {
            let (value, consumed) = parse_double_quoted(rest)
                .map_err(|reason| ReadError::syntax(position(line), reason))?;
            if !rest[consumed..].trim().is_empty() {
                return Err(ReadError::syntax(
                    position(line),
                    "trailing characters after scalar",
                ));
            }
            return Ok(resolve(forced.as_deref(), Value::String(value)));
        }
        if let Some(rest) = text.strip_prefix('\'') {
            let (value, consumed) = parse_single_quoted(rest)
                .map_err(|reason| ReadError::syntax(position(line), reason))?;
            if !rest[consumed..].trim().is_empty() {
                return Err(ReadError::syntax(
                    position(line),
                    "trailing characters after scalar",
                ));
            }
            return Ok(resolve(forced.as_deref(), Value::String(value)));
        }
        match forced {
            Some(tag) => Ok(apply_forced_tag(&tag, text.trim())
                .unwrap_or_else(|| resolve_plain(text.trim()))),
            None => Ok(resolve_plain(text.trim())),
        }
    }
}

fn is_core_scalar_tag(tag: &str) -> bool {
    matches!(
        tag.strip_prefix(YAML_TAG_PREFIX),
        Some("str" | "int" | "float" | "bool" | "null" | "binary")
    )
}

/// Resolve a scalar under an explicit core-schema tag.
fn apply_forced_tag(tag: &str, text: &str) -> Option<Value> {
    match tag.strip_prefix(YAML_TAG_PREFIX)? {
        "str" => Some(Value::String(text.to_string())),
        "null" => Some(Value::Null),
        "bool" => match text {
            "true" | "True" | "TRUE" => Some(Value::Bool(true)),
            "false" | "False" | "FALSE" => Some(Value::Bool(false)),
            _ => None,
        },
        "int" | "float" => match resolve_plain(text) {
            value @ Value::Number(_) => Some(value),
            _ => None,
        },
        "binary" => {
            let cleaned: String = text.chars().filter(|ch| !ch.is_whitespace()).collect();
            STANDARD.decode(cleaned).ok().map(Value::Bytes)
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chomp {
    Strip,
    Clip,
    Keep,
}

fn fold_lines(lines: &[String]) -> String {
    let mut result = String::new();
    let mut previous_blank = true;
    let mut previous_indented = false;
    for (index, line) in lines.iter().enumerate() {
        let blank = line.is_empty();
        let indented = line.starts_with(' ');
        if index > 0 {
            if blank || previous_blank || indented || previous_indented {
                result.push('\n');
            } else {
                result.push(' ');
            }
        }
        result.push_str(line);
        previous_blank = blank;
        previous_indented = indented;
    }
    result
}

/// Strip a trailing comment, respecting quoted sections.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut index = 0;
    while index < bytes.len() {
        let byte = bytes[index];
        if in_double {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_double = false;
            }
        } else if in_single {
            if byte == b'\'' {
                // A doubled quote stays inside the scalar.
                if bytes.get(index + 1) == Some(&b'\'') {
                    index += 1;
                } else {
                    in_single = false;
                }
            }
        } else {
            match byte {
                b'"' => in_double = true,
                b'\'' => in_single = true,
                b'#' => {
                    if index == 0 || bytes[index - 1] == b' ' || bytes[index - 1] == b'\t' {
                        return line[..index].trim_end();
                    }
                }
                _ => {}
            }
        }
        index += 1;
    }
    line.trim_end()
}

/// Find the `:` that separates a block mapping key from its value, if this
/// line is a mapping entry.
fn find_mapping_colon(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut depth = 0_usize;
    for (index, &byte) in bytes.iter().enumerate() {
        if in_double {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_double = false;
            }
            continue;
        }
        if in_single {
            if byte == b'\'' {
                in_single = false;
            }
            continue;
        }
        match byte {
            b'"' => in_double = true,
            b'\'' => in_single = true,
            b'[' | b'{' => depth += 1,
            b']' | b'}' => depth = depth.saturating_sub(1),
            b':' if depth == 0 => {
                let next = bytes.get(index + 1);
                if next.is_none() || next == Some(&b' ') || next == Some(&b'\t') {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn update_flow_depth(line: &str, mut depth: usize) -> Result<usize, &'static str> {
    let bytes = line.as_bytes();
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    for &byte in bytes {
        if in_double {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_double = false;
            }
            continue;
        }
        if in_single {
            if byte == b'\'' {
                in_single = false;
            }
            continue;
        }
        match byte {
            b'"' => in_double = true,
            b'\'' => in_single = true,
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth = depth.checked_sub(1).ok_or("unbalanced brackets")?;
            }
            _ => {}
        }
    }
    Ok(depth)
}

fn is_anchor_name(name: &str) -> bool {
    name.chars()
        .all(|ch| !ch.is_whitespace() && !"[]{},*&!|>'\"%@`".contains(ch))
}

/// Expand a tag shorthand to its full form.
fn resolve_tag(text: &str) -> Option<String> {
    if let Some(rest) = text.strip_prefix("!!") {
        if rest.is_empty() {
            return None;
        }
        return Some(format!("{YAML_TAG_PREFIX}{rest}"));
    }
    if let Some(rest) = text.strip_prefix("!<") {
        return rest.strip_suffix('>').map(ToString::to_string);
    }
    if text.starts_with('!') && text.len() > 1 {
        return Some(text.to_string());
    }
    // The non-specific tag `!` pins a scalar to its basic type.
    (text == "!").then(|| "!".to_string())
}

/// Resolve a plain scalar per the YAML 1.2 core schema.
fn resolve_plain(text: &str) -> Value {
    match text {
        "" | "~" | "null" | "Null" | "NULL" => return Value::Null,
        "true" | "True" | "TRUE" => return Value::Bool(true),
        "false" | "False" | "FALSE" => return Value::Bool(false),
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => {
            return Value::from(f64::INFINITY);
        }
        "-.inf" | "-.Inf" | "-.INF" => return Value::from(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Value::from(f64::NAN),
        _ => {}
    }
    if let Some(hex) = text.strip_prefix("0x") {
        if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            if let Ok(value) = i64::from_str_radix(hex, 16) {
                return Value::from(value);
            }
        }
    }
    if let Some(octal) = text.strip_prefix("0o") {
        if !octal.is_empty() && octal.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            if let Ok(value) = i64::from_str_radix(octal, 8) {
                return Value::from(value);
            }
        }
    }
    if looks_numeric(text) {
        let unsigned = text.strip_prefix('+').unwrap_or(text);
        if let Ok(number) = Number::parse(unsigned) {
            return Value::Number(number);
        }
        // Forms like `.5` or `5.` that the strict decimal parser rejects.
        let expanded = normalize_decimal(unsigned);
        if let Ok(number) = Number::parse(&expanded) {
            return Value::Number(number);
        }
    }
    Value::String(text.to_string())
}

fn looks_numeric(text: &str) -> bool {
    let rest = text
        .strip_prefix(['-', '+'])
        .unwrap_or(text);
    !rest.is_empty()
        && rest
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
        && rest.bytes().any(|b| b.is_ascii_digit())
        && rest.bytes().filter(|b| *b == b'.').count() <= 1
}

fn normalize_decimal(text: &str) -> String {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let mut normalized = String::new();
    if negative {
        normalized.push('-');
    }
    if body.starts_with('.') {
        normalized.push('0');
        normalized.push_str(body);
    } else if let Some(stripped) = body.strip_suffix('.') {
        normalized.push_str(stripped);
        normalized.push_str(".0");
    } else if let Some(index) = body.find(['e', 'E']) {
        // `5.e3` style.
        let (mantissa, exponent) = body.split_at(index);
        if let Some(stripped) = mantissa.strip_suffix('.') {
            normalized.push_str(stripped);
            normalized.push_str(".0");
        } else {
            normalized.push_str(mantissa);
        }
        normalized.push_str(exponent);
    } else {
        normalized.push_str(body);
    }
    normalized
}

fn parse_double_quoted(rest: &str) -> Result<(String, usize), &'static str> {
    let mut result = String::new();
    let mut chars = rest.char_indices();
    while let Some((index, ch)) = chars.next() {
        match ch {
            '"' => return Ok((result, index + 1)),
            '\\' => {
                let (_, escape) = chars.next().ok_or("unterminated escape")?;
                match escape {
                    '0' => result.push('\0'),
                    'a' => result.push('\u{07}'),
                    'b' => result.push('\u{08}'),
                    't' => result.push('\t'),
                    'n' => result.push('\n'),
                    'v' => result.push('\u{0B}'),
                    'f' => result.push('\u{0C}'),
                    'r' => result.push('\r'),
                    'e' => result.push('\u{1B}'),
                    ' ' => result.push(' '),
                    '"' => result.push('"'),
                    '/' => result.push('/'),
                    '\\' => result.push('\\'),
                    'N' => result.push('\u{85}'),
                    '_' => result.push('\u{A0}'),
                    'x' | 'u' | 'U' => {
                        let width = match escape {
                            'x' => 2,
                            'u' => 4,
                            _ => 8,
                        };
                        let mut code = 0_u32;
                        for _ in 0..width {
                            let (_, digit) = chars.next().ok_or("unterminated escape")?;
                            code = code * 16 + digit.to_digit(16).ok_or("invalid hex escape")?;
                        }
                        result.push(char::from_u32(code).ok_or("invalid code point")?);
                    }
                    _ => return Err("unknown escape"),
                }
            }
            _ => result.push(ch),
        }
    }
    Err("unterminated double-quoted scalar")
}

fn parse_single_quoted(rest: &str) -> Result<(String, usize), &'static str> {
    let mut result = String::new();
    let mut chars = rest.char_indices().peekable();
    while let Some((index, ch)) = chars.next() {
        if ch == '\'' {
            if chars.peek().map(|(_, next)| *next) == Some('\'') {
                chars.next();
                result.push('\'');
            } else {
                return Ok((result, index + 1));
            }
        } else {
            result.push(ch);
        }
    }
    Err("unterminated single-quoted scalar")
}

struct FlowParser<'e> {
    chars: Vec<(usize, char)>,
    position: usize,
    line_number: usize,
    events: &'e mut Vec<ValueEvent>,
    forced_tag: Option<String>,
}

impl FlowParser<'_> {
    fn here(&self) -> ReadPosition {
        ReadPosition {
            offset: self
                .chars
                .get(self.position)
                .map_or(0, |(offset, _)| *offset),
            line: self.line_number,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).map(|(_, ch)| *ch)
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.position += 1;
        }
    }

    fn remainder(&self) -> String {
        self.chars[self.position..]
            .iter()
            .map(|(_, ch)| ch)
            .collect()
    }

    fn parse_value(&mut self) -> Result<(), ReadError> {
        self.skip_spaces();
        self.parse_flow_properties()?;
        self.skip_spaces();
        match self.peek() {
            None => Err(ReadError::eof(self.here())),
            Some('[') => {
                self.position += 1;
                self.forced_tag = None;
                self.events.push(ValueEvent::Style(ValueStyle::Flow));
                self.events.push(ValueEvent::BeginArray);
                self.skip_spaces();
                if self.peek() == Some(']') {
                    self.position += 1;
                } else {
                    loop {
                        self.parse_value()?;
                        self.skip_spaces();
                        match self.peek() {
                            Some(',') => {
                                self.position += 1;
                                self.skip_spaces();
                                if self.peek() == Some(']') {
                                    self.position += 1;
                                    break;
                                }
                            }
                            Some(']') => {
                                self.position += 1;
                                break;
                            }
                            _ => {
                                return Err(ReadError::syntax(
                                    self.here(),
                                    "expected ',' or ']'",
                                ));
                            }
                        }
                    }
                }
                self.events.push(ValueEvent::EndArray);
                Ok(())
            }
            Some('{') => {
                self.position += 1;
                self.forced_tag = None;
                self.events.push(ValueEvent::Style(ValueStyle::Flow));
                self.events.push(ValueEvent::BeginObject);
                self.skip_spaces();
                if self.peek() == Some('}') {
                    self.position += 1;
                } else {
                    loop {
                        self.skip_spaces();
                        let key = self.parse_flow_key()?;
                        self.events.push(ValueEvent::Key(key));
                        self.skip_spaces();
                        if self.peek() == Some(':') {
                            self.position += 1;
                            self.parse_value()?;
                        } else {
                            self.events.push(ValueEvent::Scalar(Value::Null));
                        }
                        self.skip_spaces();
                        match self.peek() {
                            Some(',') => {
                                self.position += 1;
                                self.skip_spaces();
                                if self.peek() == Some('}') {
                                    self.position += 1;
                                    break;
                                }
                            }
                            Some('}') => {
                                self.position += 1;
                                break;
                            }
                            _ => {
                                return Err(ReadError::syntax(
                                    self.here(),
                                    "expected ',' or '}'",
                                ));
                            }
                        }
                    }
                }
                self.events.push(ValueEvent::EndObject);
                Ok(())
            }
            Some('*') => {
                self.position += 1;
                let name = self.take_while(|ch| !ch.is_whitespace() && !",[]{}".contains(ch));
                if name.is_empty() {
                    return Err(ReadError::syntax(self.here(), "invalid alias name"));
                }
                self.events.push(ValueEvent::Alias(name));
                Ok(())
            }
            Some('"') => {
                self.position += 1;
                let rest = self.remainder();
                let (value, consumed) = parse_double_quoted(&rest)
                    .map_err(|reason| ReadError::syntax(self.here(), reason))?;
                self.advance_chars(consumed);
                let value = self.forced_scalar(Value::String(value));
                self.events.push(ValueEvent::Scalar(value));
                Ok(())
            }
            Some('\'') => {
                self.position += 1;
                let rest = self.remainder();
                let (value, consumed) = parse_single_quoted(&rest)
                    .map_err(|reason| ReadError::syntax(self.here(), reason))?;
                self.advance_chars(consumed);
                let value = self.forced_scalar(Value::String(value));
                self.events.push(ValueEvent::Scalar(value));
                Ok(())
            }
            Some(_) => {
                let text = self.take_plain();
                let value = match self.forced_tag.take() {
                    Some(tag) => apply_forced_tag(&tag, text.trim())
                        .unwrap_or_else(|| resolve_plain(text.trim())),
                    None => resolve_plain(text.trim()),
                };
                self.events.push(ValueEvent::Scalar(value));
                Ok(())
            }
        }
    }

    fn forced_scalar(&mut self, value: Value) -> Value {
        match (self.forced_tag.take(), &value) {
            (Some(tag), Value::String(text)) => {
                apply_forced_tag(&tag, text).unwrap_or_else(|| value.clone())
            }
            _ => value,
        }
    }

    fn parse_flow_properties(&mut self) -> Result<(), ReadError> {
        loop {
            self.skip_spaces();
            match self.peek() {
                Some('&') => {
                    self.position += 1;
                    let name = self.take_while(|ch| !ch.is_whitespace() && !",[]{}".contains(ch));
                    if name.is_empty() {
                        return Err(ReadError::syntax(self.here(), "invalid anchor name"));
                    }
                    self.events.push(ValueEvent::Anchor(name));
                }
                Some('!') => {
                    let text = self.take_while(|ch| !ch.is_whitespace() && !",[]{}".contains(ch));
                    let tag = resolve_tag(&text)
                        .ok_or_else(|| ReadError::syntax(self.here(), "invalid tag"))?;
                    if tag == format!("{YAML_TAG_PREFIX}binary") {
                        self.forced_tag = Some(tag);
                    } else {
                        if is_core_scalar_tag(&tag) {
                            self.forced_tag = Some(tag.clone());
                        }
                        self.events.push(ValueEvent::Tag(Value::String(tag)));
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_flow_key(&mut self) -> Result<Value, ReadError> {
        match self.peek() {
            Some('"') => {
                self.position += 1;
                let rest = self.remainder();
                let (value, consumed) = parse_double_quoted(&rest)
                    .map_err(|reason| ReadError::syntax(self.here(), reason))?;
                self.advance_chars(consumed);
                Ok(Value::String(value))
            }
            Some('\'') => {
                self.position += 1;
                let rest = self.remainder();
                let (value, consumed) = parse_single_quoted(&rest)
                    .map_err(|reason| ReadError::syntax(self.here(), reason))?;
                self.advance_chars(consumed);
                Ok(Value::String(value))
            }
            _ => {
                let text = self.take_while(|ch| !":,[]{}".contains(ch));
                Ok(resolve_plain(text.trim()))
            }
        }
    }

    fn take_plain(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.peek() {
            if ",[]{}".contains(ch) {
                break;
            }
            if ch == ':' {
                // A colon only ends a flow scalar when followed by space or
                // a flow indicator.
                let next = self.chars.get(self.position + 1).map(|(_, ch)| *ch);
                if next.is_none() || matches!(next, Some(' ' | '\t' | ',' | ']' | '}')) {
                    break;
                }
            }
            result.push(ch);
            self.position += 1;
        }
        result
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut result = String::new();
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            result.push(ch);
            self.position += 1;
        }
        result
    }

    /// Advance by a count of characters previously measured on a
    /// `remainder()` string.
    fn advance_chars(&mut self, consumed_bytes: usize) {
        let mut advanced = 0;
        while advanced < consumed_bytes {
            if let Some((_, ch)) = self.chars.get(self.position) {
                advanced += ch.len_utf8();
                self.position += 1;
            } else {
                break;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Sequence,
    Mapping,
}

#[derive(Debug)]
struct WriterFrame {
    kind: FrameKind,
    flow: bool,
    indent: usize,
    count: usize,
    awaiting_value: bool,
    /// Block frames delay their opening newline until the first child so an
    /// empty collection can fall back to flow form.
    intro_pending: bool,
    /// The first entry continues the line a sequence dash already started.
    first_inline: bool,
}

/// A streaming YAML writer.
pub struct YamlWriter {
    out: String,
    frames: Vec<WriterFrame>,
    pending_style: Option<ValueStyle>,
    pending_tag: Option<String>,
    pending_anchor: Option<String>,
    root_written: bool,
    finished: bool,
}

impl YamlWriter {
    #[must_use]
    pub fn new() -> YamlWriter {
        YamlWriter {
            out: String::new(),
            frames: Vec::new(),
            pending_style: None,
            pending_tag: None,
            pending_anchor: None,
            root_written: false,
            finished: false,
        }
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.out
    }

    fn in_flow(&self) -> bool {
        self.frames.last().is_some_and(|frame| frame.flow)
    }

    /// Write whatever introduces the next node (indentation, `- `, comma or
    /// key separator) and return whether the node sits inline.
    fn node_lead(&mut self) -> Result<(), WriteError> {
        if self.finished {
            return Err(WriteError::Finished);
        }
        let properties = self.take_properties();
        let YamlWriter {
            frames,
            out,
            root_written,
            ..
        } = self;
        match frames.last_mut() {
            None => {
                if *root_written {
                    return Err(WriteError::invalid("a document holds a single value"));
                }
            }
            Some(frame) if frame.flow => match frame.kind {
                FrameKind::Sequence => {
                    if frame.count > 0 {
                        out.push_str(", ");
                    }
                    frame.count += 1;
                }
                FrameKind::Mapping => {
                    if !frame.awaiting_value {
                        return Err(WriteError::invalid("expected a key before this value"));
                    }
                    frame.awaiting_value = false;
                }
            },
            Some(frame) => match frame.kind {
                FrameKind::Sequence => {
                    let indent = frame.indent;
                    let first = frame.count == 0;
                    frame.count += 1;
                    if frame.intro_pending {
                        frame.intro_pending = false;
                        out.push('\n');
                    }
                    if !(first && frame.first_inline) {
                        out.push_str(&" ".repeat(indent));
                    }
                    out.push_str("- ");
                }
                FrameKind::Mapping => {
                    if !frame.awaiting_value {
                        return Err(WriteError::invalid("expected a key before this value"));
                    }
                    frame.awaiting_value = false;
                    out.push(' ');
                }
            },
        }
        if !properties.is_empty() {
            self.out.push_str(&properties);
        }
        Ok(())
    }

    fn take_properties(&mut self) -> String {
        let mut text = String::new();
        if let Some(anchor) = self.pending_anchor.take() {
            text.push('&');
            text.push_str(&anchor);
            text.push(' ');
        }
        if let Some(tag) = self.pending_tag.take() {
            text.push_str(&render_tag(&tag));
            text.push(' ');
        }
        text
    }

    fn after_node(&mut self) {
        if self.frames.is_empty() {
            self.root_written = true;
        }
    }

    fn child_indent(&self) -> usize {
        match self.frames.last() {
            None => 0,
            Some(frame) if frame.flow => 0,
            Some(frame) => frame.indent + 2,
        }
    }

    fn begin_container(&mut self, kind: FrameKind) -> Result<(), WriteError> {
        let style = self.pending_style.take();
        // Tagged or anchored collections render in flow form so their
        // properties stay attached on one line.
        let flow = matches!(style, Some(ValueStyle::Flow))
            || self.in_flow()
            || self.pending_tag.is_some()
            || self.pending_anchor.is_some();
        let child_indent = self.child_indent();
        let parent_is_block_map_value = matches!(
            self.frames.last(),
            Some(frame) if !frame.flow && frame.kind == FrameKind::Mapping
        );
        let parent_is_block_seq = matches!(
            self.frames.last(),
            Some(frame) if !frame.flow && frame.kind == FrameKind::Sequence
        );
        self.node_lead()?;
        if flow {
            self.out.push(match kind {
                FrameKind::Sequence => '[',
                FrameKind::Mapping => '{',
            });
            self.frames.push(WriterFrame {
                kind,
                flow: true,
                indent: child_indent,
                count: 0,
                awaiting_value: false,
                intro_pending: false,
                first_inline: false,
            });
        } else {
            // Remove the separator `node_lead` wrote for a block map value;
            // block children start on their own lines. After a sequence
            // dash, the first child continues that line instead.
            if parent_is_block_map_value && self.out.ends_with(' ') {
                self.out.pop();
            }
            let indent = if parent_is_block_seq {
                // Children align under the dash content column.
                self.frames.last().map_or(0, |frame| frame.indent + 2)
            } else {
                child_indent
            };
            self.frames.push(WriterFrame {
                kind,
                flow: false,
                indent,
                count: 0,
                awaiting_value: false,
                intro_pending: parent_is_block_map_value,
                first_inline: parent_is_block_seq,
            });
        }
        Ok(())
    }

    fn end_container(&mut self, kind: FrameKind) -> Result<(), WriteError> {
        let Some(frame) = self.frames.pop() else {
            return Err(WriteError::invalid("no open collection"));
        };
        if frame.kind != kind || frame.awaiting_value {
            return Err(WriteError::invalid("collection closed out of order"));
        }
        if frame.flow {
            self.out.push(match kind {
                FrameKind::Sequence => ']',
                FrameKind::Mapping => '}',
            });
            if !self.in_flow() {
                self.out.push('\n');
            }
        } else if frame.count == 0 {
            // Empty block collections have no block form.
            if frame.intro_pending {
                self.out.push(' ');
            }
            self.out
                .push_str(if kind == FrameKind::Sequence { "[]" } else { "{}" });
            self.out.push('\n');
        }
        self.after_node();
        Ok(())
    }
}

fn render_tag(tag: &str) -> String {
    if let Some(rest) = tag.strip_prefix(YAML_TAG_PREFIX) {
        format!("!!{rest}")
    } else if tag.starts_with('!') {
        tag.to_string()
    } else {
        format!("!<{tag}>")
    }
}

impl Default for YamlWriter {
    fn default() -> Self {
        YamlWriter::new()
    }
}

impl FormatWriter for YamlWriter {
    fn write(&mut self, event: &ValueEvent) -> Result<(), WriteError> {
        match event {
            ValueEvent::Style(style) => {
                self.pending_style = Some(*style);
                Ok(())
            }
            ValueEvent::Tag(tag) => {
                let text = tag
                    .as_str()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| tag.to_string());
                self.pending_tag = Some(text);
                Ok(())
            }
            ValueEvent::Anchor(name) => {
                self.pending_anchor = Some(name.clone());
                Ok(())
            }
            ValueEvent::Alias(name) => {
                self.node_lead()?;
                self.out.push('*');
                self.out.push_str(name);
                if !self.in_flow() {
                    self.out.push('\n');
                }
                self.after_node();
                Ok(())
            }
            ValueEvent::BeginArray => self.begin_container(FrameKind::Sequence),
            ValueEvent::BeginObject => self.begin_container(FrameKind::Mapping),
            ValueEvent::EndArray => self.end_container(FrameKind::Sequence),
            ValueEvent::EndObject => self.end_container(FrameKind::Mapping),
            ValueEvent::Key(key) => {
                if self.finished {
                    return Err(WriteError::Finished);
                }
                let rendered = render_scalar(key, None)?;
                let YamlWriter { frames, out, .. } = self;
                let Some(frame) = frames.last_mut() else {
                    return Err(WriteError::invalid("key outside a mapping"));
                };
                if frame.kind != FrameKind::Mapping || frame.awaiting_value {
                    return Err(WriteError::invalid("key outside a mapping"));
                }
                if frame.flow {
                    if frame.count > 0 {
                        out.push_str(", ");
                    }
                    frame.count += 1;
                    frame.awaiting_value = true;
                    out.push_str(&rendered);
                    out.push(':');
                } else {
                    let indent = frame.indent;
                    let first = frame.count == 0;
                    frame.count += 1;
                    if frame.intro_pending {
                        frame.intro_pending = false;
                        out.push('\n');
                    }
                    if !(first && frame.first_inline) {
                        out.push_str(&" ".repeat(indent));
                    }
                    frame.awaiting_value = true;
                    out.push_str(&rendered);
                    out.push(':');
                }
                Ok(())
            }
            ValueEvent::Scalar(value) => {
                let style = self.pending_style.take();
                self.node_lead()?;
                let rendered = render_scalar(value, style)?;
                self.out.push_str(&rendered);
                if !self.in_flow() {
                    self.out.push('\n');
                }
                self.after_node();
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

fn render_scalar(value: &Value, style: Option<ValueStyle>) -> Result<String, WriteError> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(true) => Ok("true".to_string()),
        Value::Bool(false) => Ok("false".to_string()),
        Value::Number(number) => Ok(match number.to_decimal_string() {
            Some(text) => text,
            None => number.to_string(), // `.inf` / `.nan` spellings
        }),
        Value::Bytes(bytes) => Ok(format!("!!binary \"{}\"", STANDARD.encode(bytes))),
        Value::String(text) => Ok(match style {
            Some(ValueStyle::SingleQuoted) => format!("'{}'", text.replace('\'', "''")),
            Some(ValueStyle::DoubleQuoted) => double_quote(text),
            _ if plain_safe(text) => text.clone(),
            _ => double_quote(text),
        }),
        Value::Tagged(tagged) => {
            let tag = tagged
                .tag
                .as_str()
                .map(ToString::to_string)
                .unwrap_or_else(|| tagged.tag.to_string());
            let inner = render_scalar(&tagged.value, style)?;
            Ok(format!("{} {}", render_tag(&tag), inner))
        }
        Value::Array(_) | Value::Object(_) => Err(WriteError::invalid(
            "composite scalar events are not supported by the YAML writer",
        )),
    }
}

fn plain_safe(text: &str) -> bool {
    if text.is_empty()
        || text.starts_with(char::is_whitespace)
        || text.ends_with(char::is_whitespace)
    {
        return false;
    }
    if text
        .starts_with(['-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`'])
    {
        return false;
    }
    if text.contains(": ") || text.ends_with(':') || text.contains(" #") {
        return false;
    }
    if text.contains(['\n', '\t', ',', '[', ']', '{', '}']) {
        return false;
    }
    // A plain spelling must not re-resolve to another type.
    matches!(resolve_plain(text), Value::String(_))
}

fn double_quote(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 2);
    result.push('"');
    for ch in text.chars() {
        match ch {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            ch if (ch as u32) < 0x20 => {
                result.push_str(&format!("\\x{:02x}", ch as u32));
            }
            ch => result.push(ch),
        }
    }
    result.push('"');
    result
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::{from_str, to_string};
    use crate::value::Value;

    #[test]
    fn parses_block_mapping_and_sequence() {
        let text = "name: test\nitems:\n  - 1\n  - two\n  - null\nnested:\n  flag: true\n";
        let value = from_str(text).unwrap();
        assert_eq!(
            value,
            Value::from(json!({
                "name": "test",
                "items": [1, "two", null],
                "nested": {"flag": true}
            }))
        );
    }

    #[test]
    fn parses_sequence_at_mapping_indent() {
        let text = "items:\n- a\n- b\n";
        let value = from_str(text).unwrap();
        assert_eq!(value, Value::from(json!({"items": ["a", "b"]})));
    }

    #[test]
    fn parses_flow_collections() {
        let value = from_str("{a: [1, 2.5, \"x\"], b: {c: null}}").unwrap();
        assert_eq!(
            value,
            Value::from(json!({"a": [1, 2.5, "x"], "b": {"c": null}}))
        );
    }

    #[test]
    fn respects_comments_and_quotes() {
        let value = from_str("key: \"a # not a comment\" # a comment\n").unwrap();
        assert_eq!(value, Value::from(json!({"key": "a # not a comment"})));
    }

    #[test_case("null", Value::Null)]
    #[test_case("~", Value::Null)]
    #[test_case("true", Value::from(true))]
    #[test_case("0x1F", Value::from(31))]
    #[test_case("0o17", Value::from(15))]
    #[test_case("3.5", Value::from(json!(3.5)))]
    #[test_case("-12", Value::from(-12))]
    #[test_case("plain text", Value::from("plain text"))]
    #[test_case("'quoted: text'", Value::from("quoted: text"))]
    fn resolves_scalars(text: &str, expected: Value) {
        assert_eq!(from_str(text).unwrap(), expected);
    }

    #[test]
    fn anchors_and_aliases() {
        let text = "base: &shared\n  a: 1\nother: *shared\n";
        let value = from_str(text).unwrap();
        assert_eq!(
            value,
            Value::from(json!({"base": {"a": 1}, "other": {"a": 1}}))
        );
    }

    #[test]
    fn tags_become_tagged_values() {
        let value = from_str("!!str 123").unwrap();
        assert_eq!(
            value,
            Value::tagged(
                Value::from("tag:yaml.org,2002:str"),
                Value::from("123"),
            )
        );
        let local = from_str("!point {x: 1}").unwrap();
        assert_eq!(local.tag(), Some(&Value::from("!point")));
    }

    #[test]
    fn binary_decodes_to_bytes_on_write() {
        let rendered = to_string(&Value::Bytes(vec![0xde, 0xad])).unwrap();
        assert_eq!(rendered, "!!binary \"3q0=\"\n");
    }

    #[test]
    fn literal_block_scalar() {
        let text = "message: |\n  line one\n  line two\n";
        let value = from_str(text).unwrap();
        assert_eq!(
            value,
            Value::from(json!({"message": "line one\nline two\n"}))
        );
    }

    #[test]
    fn folded_block_scalar() {
        let text = "message: >\n  folded\n  text\n";
        let value = from_str(text).unwrap();
        assert_eq!(value, Value::from(json!({"message": "folded text\n"})));
    }

    #[test]
    fn literal_chomping_strip() {
        let value = from_str("m: |-\n  keep\n\n").unwrap();
        assert_eq!(value, Value::from(json!({"m": "keep"})));
    }

    #[test]
    fn writes_block_style_by_default() {
        let value = Value::from(json!({"a": 1, "b": ["x", "y"], "c": {"d": true}}));
        let rendered = to_string(&value).unwrap();
        assert_eq!(rendered, "a: 1\nb:\n  - x\n  - y\nc:\n  d: true\n");
        assert_eq!(from_str(&rendered).unwrap(), value);
    }

    #[test]
    fn writer_round_trips_structures() {
        for value in [
            Value::from(json!([1, [2, 3], {"k": null}])),
            Value::from(json!({"empty_list": [], "empty_map": {}})),
            Value::from(json!("needs: quoting")),
            Value::from(json!("123")),
            Value::tagged(Value::from("!local"), Value::from("x")),
        ] {
            let rendered = to_string(&value).unwrap();
            assert_eq!(from_str(&rendered).unwrap(), value, "text: {rendered}");
        }
    }

    #[test]
    fn strings_that_look_like_scalars_are_quoted() {
        for text in ["true", "null", "3.5", "0x10"] {
            let rendered = to_string(&Value::from(text)).unwrap();
            assert_eq!(from_str(&rendered).unwrap(), Value::from(text));
        }
    }

    #[test]
    fn document_markers() {
        assert_eq!(
            from_str("---\na: 1\n...\n").unwrap(),
            Value::from(json!({"a": 1}))
        );
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert!(from_str("? complex\n: key\n").is_err());
        assert!(from_str("a: 1\n---\nb: 2\n").is_err());
    }
}
