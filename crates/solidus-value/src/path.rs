//! RFC 9535 JSONPath queries.
//!
//! A [`Path`] is parsed once and evaluated against a [`Value`], producing an
//! ordered node list. Every returned node carries the normalized [`Pointer`]
//! that re-selects it from the root.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    error::PathError,
    number::Number,
    pointer::Pointer,
    value::Value,
};

/// A parsed JSONPath query.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
}

/// One step of a query: a child or descendant application of selectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub selectors: Vec<Selector>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Name(String),
    Wildcard,
    Index(i64),
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        step: Option<i64>,
    },
    Filter(FilterExpr),
}

/// Boolean filter algebra of `?…` selectors.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Or(Vec<FilterExpr>),
    And(Vec<FilterExpr>),
    Not(Box<FilterExpr>),
    Comparison {
        left: Comparable,
        op: ComparisonOp,
        right: Comparable,
    },
    /// An existence test: true iff the query selects at least one node.
    Exists(Query),
    /// A logical function call (`match`, `search`).
    Test(FunctionCall),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Comparable {
    Literal(Value),
    /// A singular query (`@.a.b`, `$.a[0]`), yielding a value or nothing.
    Query(Query),
    Function(FunctionCall),
}

/// An embedded query inside a filter, relative (`@`) or absolute (`$`).
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub absolute: bool,
    pub segments: Vec<Segment>,
}

impl Query {
    /// Whether the query is guaranteed to select at most one node.
    fn is_singular(&self) -> bool {
        self.segments.iter().all(|segment| {
            segment.kind == SegmentKind::Child
                && segment.selectors.len() == 1
                && matches!(
                    segment.selectors[0],
                    Selector::Name(_) | Selector::Index(_)
                )
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Comparable>,
}

/// A matched node: its normalized location and the value there.
#[derive(Debug, Clone, PartialEq)]
pub struct PathNode<'v> {
    pub location: Pointer,
    pub value: &'v Value,
}

impl Path {
    /// Parse a query expression. The outermost identifier must be `$`.
    pub fn parse(text: &str) -> Result<Path, PathError> {
        let mut parser = Parser {
            bytes: text.as_bytes(),
            text,
            position: 0,
        };
        parser.skip_whitespace();
        if !parser.eat(b'$') {
            return Err(PathError::new(parser.position, "a query starts with '$'"));
        }
        let segments = parser.parse_segments()?;
        parser.skip_whitespace();
        if parser.position != parser.bytes.len() {
            return Err(PathError::new(parser.position, "trailing characters"));
        }
        Ok(Path { segments })
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Evaluate against `root`, returning matched nodes in document order.
    #[must_use]
    pub fn evaluate<'v>(&self, root: &'v Value) -> Vec<PathNode<'v>> {
        evaluate_segments(&self.segments, root, root)
    }
}

fn evaluate_segments<'v>(
    segments: &[Segment],
    root: &'v Value,
    current: &'v Value,
) -> Vec<PathNode<'v>> {
    let mut nodes = vec![PathNode {
        location: Pointer::root(),
        value: current,
    }];
    for segment in segments {
        let mut next = Vec::new();
        for node in &nodes {
            match segment.kind {
                SegmentKind::Child => {
                    apply_selectors(segment, node, root, &mut next);
                }
                SegmentKind::Descendant => {
                    let mut visits = Vec::new();
                    descend(node.value, &node.location, &mut visits);
                    for visit in &visits {
                        apply_selectors(segment, visit, root, &mut next);
                    }
                }
            }
        }
        nodes = next;
    }
    nodes
}

/// Pre-order traversal: the node itself, then its descendants.
fn descend<'v>(value: &'v Value, location: &Pointer, visits: &mut Vec<PathNode<'v>>) {
    visits.push(PathNode {
        location: location.clone(),
        value,
    });
    match value.untagged() {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                descend(item, &location.join(index), visits);
            }
        }
        Value::Object(object) => {
            for (key, item) in object {
                let key_text = key
                    .as_str()
                    .map_or_else(|| key.to_string(), ToString::to_string);
                descend(item, &location.join(key_text.as_str()), visits);
            }
        }
        _ => {}
    }
}

fn apply_selectors<'v>(
    segment: &Segment,
    node: &PathNode<'v>,
    root: &'v Value,
    out: &mut Vec<PathNode<'v>>,
) {
    for selector in &segment.selectors {
        match selector {
            Selector::Name(name) => {
                if let Some(child) = node.value.get(name.as_str()) {
                    out.push(PathNode {
                        location: node.location.join(name.as_str()),
                        value: child,
                    });
                }
            }
            Selector::Wildcard => match node.value.untagged() {
                Value::Array(items) => {
                    for (index, item) in items.iter().enumerate() {
                        out.push(PathNode {
                            location: node.location.join(index),
                            value: item,
                        });
                    }
                }
                Value::Object(object) => {
                    for (key, item) in object {
                        let key_text = key
                            .as_str()
                            .map_or_else(|| key.to_string(), ToString::to_string);
                        out.push(PathNode {
                            location: node.location.join(key_text.as_str()),
                            value: item,
                        });
                    }
                }
                _ => {}
            },
            Selector::Index(index) => {
                if let Some(items) = node.value.as_array() {
                    if let Some(resolved) = resolve_index(*index, items.len()) {
                        out.push(PathNode {
                            location: node.location.join(resolved),
                            value: &items[resolved],
                        });
                    }
                }
            }
            Selector::Slice { start, end, step } => {
                if let Some(items) = node.value.as_array() {
                    for index in slice_indices(*start, *end, *step, items.len()) {
                        out.push(PathNode {
                            location: node.location.join(index),
                            value: &items[index],
                        });
                    }
                }
            }
            Selector::Filter(expr) => match node.value.untagged() {
                Value::Array(items) => {
                    for (index, item) in items.iter().enumerate() {
                        if filter_matches(expr, item, root) {
                            out.push(PathNode {
                                location: node.location.join(index),
                                value: item,
                            });
                        }
                    }
                }
                Value::Object(object) => {
                    for (key, item) in object {
                        if filter_matches(expr, item, root) {
                            let key_text = key
                                .as_str()
                                .map_or_else(|| key.to_string(), ToString::to_string);
                            out.push(PathNode {
                                location: node.location.join(key_text.as_str()),
                                value: item,
                            });
                        }
                    }
                }
                _ => {}
            },
        }
    }
}

fn resolve_index(index: i64, length: usize) -> Option<usize> {
    if index >= 0 {
        let index = usize::try_from(index).ok()?;
        (index < length).then_some(index)
    } else {
        let back = usize::try_from(-index).ok()?;
        length.checked_sub(back)
    }
}

/// Python slice semantics; `step == 0` selects nothing.
fn slice_indices(
    start: Option<i64>,
    end: Option<i64>,
    step: Option<i64>,
    length: usize,
) -> Vec<usize> {
    let step = step.unwrap_or(1);
    if step == 0 || length == 0 {
        return Vec::new();
    }
    let length = length as i64;
    let normalize = |index: i64| if index < 0 { index + length } else { index };
    let (lower, upper);
    if step > 0 {
        lower = normalize(start.unwrap_or(0)).clamp(0, length);
        upper = normalize(end.unwrap_or(length)).clamp(0, length);
    } else {
        lower = normalize(end.unwrap_or(-length - 1)).clamp(-1, length - 1);
        upper = normalize(start.unwrap_or(length - 1)).clamp(-1, length - 1);
    }
    let mut indices = Vec::new();
    if step > 0 {
        let mut index = lower;
        while index < upper {
            indices.push(index as usize);
            index += step;
        }
    } else {
        let mut index = upper;
        while index > lower {
            indices.push(index as usize);
            index += step;
        }
    }
    indices
}

/// The result of evaluating a comparable: a value or "nothing".
type Evaluated = Option<Value>;

fn filter_matches(expr: &FilterExpr, current: &Value, root: &Value) -> bool {
    match expr {
        FilterExpr::Or(terms) => terms.iter().any(|term| filter_matches(term, current, root)),
        FilterExpr::And(terms) => terms
            .iter()
            .all(|term| filter_matches(term, current, root)),
        FilterExpr::Not(inner) => !filter_matches(inner, current, root),
        FilterExpr::Exists(query) => !run_query(query, current, root).is_empty(),
        FilterExpr::Test(call) => logical_function(call, current, root),
        FilterExpr::Comparison { left, op, right } => {
            let left = evaluate_comparable(left, current, root);
            let right = evaluate_comparable(right, current, root);
            compare(&left, *op, &right)
        }
    }
}

fn run_query<'v>(query: &Query, current: &'v Value, root: &'v Value) -> Vec<PathNode<'v>> {
    let base = if query.absolute { root } else { current };
    evaluate_segments(&query.segments, root, base)
}

fn evaluate_comparable(comparable: &Comparable, current: &Value, root: &Value) -> Evaluated {
    match comparable {
        Comparable::Literal(value) => Some(value.clone()),
        Comparable::Query(query) => {
            let nodes = run_query(query, current, root);
            match nodes.as_slice() {
                [node] => Some(node.value.clone()),
                _ => None,
            }
        }
        Comparable::Function(call) => value_function(call, current, root),
    }
}

/// RFC 9535 "nothing" semantics: nothing equals only nothing and orders
/// with nothing else.
fn compare(left: &Evaluated, op: ComparisonOp, right: &Evaluated) -> bool {
    match op {
        ComparisonOp::Eq => values_equal(left, right),
        ComparisonOp::Ne => !values_equal(left, right),
        ComparisonOp::Lt => values_less(left, right),
        ComparisonOp::Le => values_less(left, right) || values_equal(left, right),
        ComparisonOp::Gt => values_less(right, left),
        ComparisonOp::Ge => values_less(right, left) || values_equal(left, right),
    }
}

fn values_equal(left: &Evaluated, right: &Evaluated) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

fn values_less(left: &Evaluated, right: &Evaluated) -> bool {
    match (left, right) {
        (Some(Value::Number(left)), Some(Value::Number(right))) => {
            matches!(left.partial_cmp(right), Some(std::cmp::Ordering::Less))
        }
        (Some(Value::String(left)), Some(Value::String(right))) => left < right,
        _ => false,
    }
}

fn logical_function(call: &FunctionCall, current: &Value, root: &Value) -> bool {
    match call.name.as_str() {
        "match" | "search" => {
            let (Some(Value::String(text)), Some(Value::String(pattern))) = (
                call.args
                    .first()
                    .and_then(|arg| evaluate_comparable(arg, current, root)),
                call.args
                    .get(1)
                    .and_then(|arg| evaluate_comparable(arg, current, root)),
            ) else {
                return false;
            };
            let anchored = if call.name == "match" {
                format!("^(?:{pattern})$")
            } else {
                pattern.clone()
            };
            cached_regex(&anchored).is_some_and(|regex| regex.is_match(&text))
        }
        // A value-typed function used as a test is true when it yields
        // something.
        _ => value_function(call, current, root).is_some(),
    }
}

fn value_function(call: &FunctionCall, current: &Value, root: &Value) -> Option<Value> {
    match call.name.as_str() {
        "length" => {
            let value = call
                .args
                .first()
                .and_then(|arg| evaluate_comparable(arg, current, root))?;
            match value {
                Value::String(text) => Some(Value::from(text.chars().count())),
                Value::Array(items) => Some(Value::from(items.len())),
                Value::Object(object) => Some(Value::from(object.len())),
                _ => None,
            }
        }
        "count" => {
            let Some(Comparable::Query(query)) = call.args.first() else {
                return None;
            };
            Some(Value::from(run_query(query, current, root).len()))
        }
        "value" => {
            let Some(Comparable::Query(query)) = call.args.first() else {
                return None;
            };
            let nodes = run_query(query, current, root);
            match nodes.as_slice() {
                [node] => Some(node.value.clone()),
                _ => None,
            }
        }
        _ => None,
    }
}

fn cached_regex(pattern: &str) -> Option<Regex> {
    static CACHE: Lazy<std::sync::RwLock<ahash::AHashMap<String, Regex>>> =
        Lazy::new(|| std::sync::RwLock::new(ahash::AHashMap::new()));
    if let Some(regex) = CACHE.read().ok()?.get(pattern) {
        return Some(regex.clone());
    }
    let regex = Regex::new(pattern).ok()?;
    CACHE
        .write()
        .ok()?
        .insert(pattern.to_string(), regex.clone());
    Some(regex)
}

struct Parser<'a> {
    bytes: &'a [u8],
    text: &'a str,
    position: usize,
}

impl<'a> Parser<'a> {
    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.position += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, reason: &str) -> PathError {
        PathError::new(self.position, reason)
    }

    fn parse_segments(&mut self) -> Result<Vec<Segment>, PathError> {
        let mut segments = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'.') => {
                    self.position += 1;
                    if self.eat(b'.') {
                        // Descendant segment.
                        if self.eat(b'*') {
                            segments.push(Segment {
                                kind: SegmentKind::Descendant,
                                selectors: vec![Selector::Wildcard],
                            });
                        } else if self.peek() == Some(b'[') {
                            let selectors = self.parse_bracketed()?;
                            segments.push(Segment {
                                kind: SegmentKind::Descendant,
                                selectors,
                            });
                        } else {
                            let name = self.parse_member_name()?;
                            segments.push(Segment {
                                kind: SegmentKind::Descendant,
                                selectors: vec![Selector::Name(name)],
                            });
                        }
                    } else if self.eat(b'*') {
                        segments.push(Segment {
                            kind: SegmentKind::Child,
                            selectors: vec![Selector::Wildcard],
                        });
                    } else {
                        let name = self.parse_member_name()?;
                        segments.push(Segment {
                            kind: SegmentKind::Child,
                            selectors: vec![Selector::Name(name)],
                        });
                    }
                }
                Some(b'[') => {
                    let selectors = self.parse_bracketed()?;
                    segments.push(Segment {
                        kind: SegmentKind::Child,
                        selectors,
                    });
                }
                _ => return Ok(segments),
            }
        }
    }

    fn parse_member_name(&mut self) -> Result<String, PathError> {
        let start = self.position;
        while let Some(ch) = self.text[self.position..].chars().next() {
            let valid = if self.position == start {
                ch.is_alphabetic() || ch == '_' || !ch.is_ascii()
            } else {
                ch.is_alphanumeric() || ch == '_' || !ch.is_ascii()
            };
            if !valid {
                break;
            }
            self.position += ch.len_utf8();
        }
        if self.position == start {
            return Err(self.error("expected a member name"));
        }
        Ok(self.text[start..self.position].to_string())
    }

    fn parse_bracketed(&mut self) -> Result<Vec<Selector>, PathError> {
        if !self.eat(b'[') {
            return Err(self.error("expected '['"));
        }
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.parse_selector()?);
            self.skip_whitespace();
            if self.eat(b',') {
                continue;
            }
            if self.eat(b']') {
                return Ok(selectors);
            }
            return Err(self.error("expected ',' or ']'"));
        }
    }

    fn parse_selector(&mut self) -> Result<Selector, PathError> {
        match self.peek() {
            Some(b'*') => {
                self.position += 1;
                Ok(Selector::Wildcard)
            }
            Some(b'\'' | b'"') => {
                let name = self.parse_string_literal()?;
                Ok(Selector::Name(name))
            }
            Some(b'?') => {
                self.position += 1;
                let expr = self.parse_or_expr()?;
                Ok(Selector::Filter(expr))
            }
            _ => self.parse_index_or_slice(),
        }
    }

    fn parse_index_or_slice(&mut self) -> Result<Selector, PathError> {
        let start = self.parse_optional_integer()?;
        self.skip_whitespace();
        if self.eat(b':') {
            self.skip_whitespace();
            let end = self.parse_optional_integer()?;
            self.skip_whitespace();
            let step = if self.eat(b':') {
                self.skip_whitespace();
                self.parse_optional_integer()?
            } else {
                None
            };
            Ok(Selector::Slice { start, end, step })
        } else {
            match start {
                Some(index) => Ok(Selector::Index(index)),
                None => Err(self.error("expected a selector")),
            }
        }
    }

    fn parse_optional_integer(&mut self) -> Result<Option<i64>, PathError> {
        let start = self.position;
        if matches!(self.peek(), Some(b'-')) {
            self.position += 1;
        }
        while self.peek().is_some_and(|byte| byte.is_ascii_digit()) {
            self.position += 1;
        }
        if self.position == start || (self.position == start + 1 && self.bytes[start] == b'-') {
            self.position = start;
            return Ok(None);
        }
        self.text[start..self.position]
            .parse::<i64>()
            .map(Some)
            .map_err(|_| PathError::new(start, "integer out of range"))
    }

    fn parse_string_literal(&mut self) -> Result<String, PathError> {
        let quote = self.peek().expect("caller checked quote");
        self.position += 1;
        let mut result = String::new();
        loop {
            let Some(ch) = self.text[self.position..].chars().next() else {
                return Err(self.error("unterminated string literal"));
            };
            self.position += ch.len_utf8();
            if ch as u8 == quote && ch.is_ascii() {
                return Ok(result);
            }
            if ch == '\\' {
                let Some(escape) = self.text[self.position..].chars().next() else {
                    return Err(self.error("unterminated escape"));
                };
                self.position += escape.len_utf8();
                match escape {
                    'n' => result.push('\n'),
                    't' => result.push('\t'),
                    'r' => result.push('\r'),
                    'b' => result.push('\u{0008}'),
                    'f' => result.push('\u{000C}'),
                    '/' => result.push('/'),
                    '\\' => result.push('\\'),
                    '\'' => result.push('\''),
                    '"' => result.push('"'),
                    'u' => {
                        if self.position + 4 > self.bytes.len() {
                            return Err(self.error("unterminated \\u escape"));
                        }
                        let code =
                            u32::from_str_radix(&self.text[self.position..self.position + 4], 16)
                                .map_err(|_| self.error("invalid \\u escape"))?;
                        self.position += 4;
                        result.push(
                            char::from_u32(code).ok_or_else(|| self.error("invalid code point"))?,
                        );
                    }
                    _ => return Err(self.error("unknown escape")),
                }
            } else {
                result.push(ch);
            }
        }
    }

    fn parse_or_expr(&mut self) -> Result<FilterExpr, PathError> {
        let mut terms = vec![self.parse_and_expr()?];
        loop {
            self.skip_whitespace();
            if self.text[self.position..].starts_with("||") {
                self.position += 2;
                terms.push(self.parse_and_expr()?);
            } else {
                break;
            }
        }
        Ok(if terms.len() == 1 {
            terms.pop().expect("one term")
        } else {
            FilterExpr::Or(terms)
        })
    }

    fn parse_and_expr(&mut self) -> Result<FilterExpr, PathError> {
        let mut terms = vec![self.parse_basic_expr()?];
        loop {
            self.skip_whitespace();
            if self.text[self.position..].starts_with("&&") {
                self.position += 2;
                terms.push(self.parse_basic_expr()?);
            } else {
                break;
            }
        }
        Ok(if terms.len() == 1 {
            terms.pop().expect("one term")
        } else {
            FilterExpr::And(terms)
        })
    }

    fn parse_basic_expr(&mut self) -> Result<FilterExpr, PathError> {
        self.skip_whitespace();
        if self.eat(b'!') {
            self.skip_whitespace();
            return Ok(FilterExpr::Not(Box::new(self.parse_basic_expr()?)));
        }
        if self.eat(b'(') {
            let inner = self.parse_or_expr()?;
            self.skip_whitespace();
            if !self.eat(b')') {
                return Err(self.error("expected ')'"));
            }
            return Ok(inner);
        }
        let left = self.parse_comparable()?;
        self.skip_whitespace();
        if let Some(op) = self.parse_comparison_op() {
            self.skip_whitespace();
            let right = self.parse_comparable()?;
            for side in [&left, &right] {
                if let Comparable::Query(query) = side {
                    if !query.is_singular() {
                        return Err(self.error("comparisons require singular queries"));
                    }
                }
            }
            return Ok(FilterExpr::Comparison { left, op, right });
        }
        match left {
            Comparable::Query(query) => Ok(FilterExpr::Exists(query)),
            Comparable::Function(call) => Ok(FilterExpr::Test(call)),
            Comparable::Literal(_) => Err(self.error("a literal is not a valid test")),
        }
    }

    fn parse_comparison_op(&mut self) -> Option<ComparisonOp> {
        let rest = &self.text[self.position..];
        let (op, len) = if rest.starts_with("==") {
            (ComparisonOp::Eq, 2)
        } else if rest.starts_with("!=") {
            (ComparisonOp::Ne, 2)
        } else if rest.starts_with("<=") {
            (ComparisonOp::Le, 2)
        } else if rest.starts_with(">=") {
            (ComparisonOp::Ge, 2)
        } else if rest.starts_with('<') {
            (ComparisonOp::Lt, 1)
        } else if rest.starts_with('>') {
            (ComparisonOp::Gt, 1)
        } else {
            return None;
        };
        self.position += len;
        Some(op)
    }

    fn parse_comparable(&mut self) -> Result<Comparable, PathError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'@') => {
                self.position += 1;
                let segments = self.parse_segments()?;
                Ok(Comparable::Query(Query {
                    absolute: false,
                    segments,
                }))
            }
            Some(b'$') => {
                self.position += 1;
                let segments = self.parse_segments()?;
                Ok(Comparable::Query(Query {
                    absolute: true,
                    segments,
                }))
            }
            Some(b'\'' | b'"') => Ok(Comparable::Literal(Value::String(
                self.parse_string_literal()?,
            ))),
            Some(byte) if byte == b'-' || byte.is_ascii_digit() => {
                let start = self.position;
                self.position += 1;
                while self
                    .peek()
                    .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
                {
                    self.position += 1;
                }
                let number = Number::parse(&self.text[start..self.position])
                    .map_err(|_| PathError::new(start, "invalid number literal"))?;
                Ok(Comparable::Literal(Value::Number(number)))
            }
            _ => {
                let start = self.position;
                let name = self.parse_member_name()?;
                match name.as_str() {
                    "true" => return Ok(Comparable::Literal(Value::Bool(true))),
                    "false" => return Ok(Comparable::Literal(Value::Bool(false))),
                    "null" => return Ok(Comparable::Literal(Value::Null)),
                    _ => {}
                }
                self.skip_whitespace();
                if !self.eat(b'(') {
                    return Err(PathError::new(start, "expected a function call"));
                }
                let mut args = Vec::new();
                self.skip_whitespace();
                if !self.eat(b')') {
                    loop {
                        args.push(self.parse_comparable()?);
                        self.skip_whitespace();
                        if self.eat(b',') {
                            continue;
                        }
                        if self.eat(b')') {
                            break;
                        }
                        return Err(self.error("expected ',' or ')'"));
                    }
                }
                if !matches!(name.as_str(), "length" | "count" | "match" | "search" | "value") {
                    return Err(PathError::new(start, "unknown function"));
                }
                Ok(Comparable::Function(FunctionCall { name, args }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::Path;
    use crate::value::Value;

    fn bookstore() -> Value {
        Value::from(json!({
            "store": {
                "book": [
                    {"category": "reference", "author": "Nigel Rees", "title": "Sayings of the Century", "price": 8.95},
                    {"category": "fiction", "author": "Evelyn Waugh", "title": "Sword of Honour", "price": 12.99},
                    {"category": "fiction", "author": "Herman Melville", "title": "Moby Dick", "isbn": "0-553-21311-3", "price": 8.99},
                    {"category": "fiction", "author": "J. R. R. Tolkien", "title": "The Lord of the Rings", "isbn": "0-395-19395-8", "price": 22.99}
                ],
                "bicycle": {"color": "red", "price": 399}
            }
        }))
    }

    fn titles(path: &str) -> Vec<String> {
        let root = bookstore();
        Path::parse(path)
            .unwrap()
            .evaluate(&root)
            .iter()
            .map(|node| node.value.as_str().unwrap_or("<non-string>").to_string())
            .collect()
    }

    #[test]
    fn selects_names_and_indices() {
        assert_eq!(titles("$.store.book[0].author"), ["Nigel Rees"]);
        assert_eq!(titles("$['store']['book'][1]['author']"), ["Evelyn Waugh"]);
        assert_eq!(titles("$.store.book[-1].author"), ["J. R. R. Tolkien"]);
    }

    #[test]
    fn wildcard_and_descendant() {
        assert_eq!(titles("$.store.book[*].author").len(), 4);
        assert_eq!(titles("$..author").len(), 4);
        let root = bookstore();
        let prices = Path::parse("$..price").unwrap().evaluate(&root);
        assert_eq!(prices.len(), 5);
    }

    #[test_case("$.store.book[1:3].title", &["Sword of Honour", "Moby Dick"])]
    #[test_case("$.store.book[:2].title", &["Sayings of the Century", "Sword of Honour"])]
    #[test_case("$.store.book[::2].title", &["Sayings of the Century", "Moby Dick"])]
    #[test_case("$.store.book[::-1].title", &["The Lord of the Rings", "Moby Dick", "Sword of Honour", "Sayings of the Century"])]
    #[test_case("$.store.book[::0].title", &[])]
    fn slices(path: &str, expected: &[&str]) {
        assert_eq!(titles(path), expected);
    }

    #[test]
    fn filters() {
        assert_eq!(
            titles("$.store.book[?@.isbn].title"),
            ["Moby Dick", "The Lord of the Rings"]
        );
        assert_eq!(
            titles("$.store.book[?@.price < 9].title"),
            ["Sayings of the Century", "Moby Dick"]
        );
        assert_eq!(
            titles("$.store.book[?@.category == 'fiction' && @.price > 20].title"),
            ["The Lord of the Rings"]
        );
        assert_eq!(
            titles("$.store.book[?@.category == 'reference' || @.price == 22.99].title"),
            ["Sayings of the Century", "The Lord of the Rings"]
        );
        assert_eq!(titles("$.store.book[?!@.isbn].title").len(), 2);
    }

    #[test]
    fn filter_functions() {
        assert_eq!(
            titles("$.store.book[?match(@.category, 'fic.*')].title").len(),
            3
        );
        assert_eq!(
            titles("$.store.book[?search(@.title, 'of')].title").len(),
            3
        );
        assert_eq!(
            titles("$.store.book[?length(@.title) == 9].title"),
            ["Moby Dick"]
        );
        let root = bookstore();
        let matched = Path::parse("$[?count($.store.book[*]) == 4].store")
            .unwrap()
            .evaluate(&root);
        assert!(matched.is_empty(), "count applies per candidate node");
    }

    #[test]
    fn absent_path_comparisons_follow_nothing_semantics() {
        // Equality with a literal is false when the path is absent.
        assert_eq!(titles("$.store.book[?@.isbn == ''].title"), Vec::<String>::new());
        // Two absent paths compare equal.
        assert_eq!(titles("$.store.book[?@.missing == @.gone].title").len(), 4);
    }

    #[test]
    fn returned_pointers_reselect_nodes() {
        let root = bookstore();
        for node in Path::parse("$..*").unwrap().evaluate(&root) {
            assert_eq!(root.pointer(&node.location), Some(node.value));
        }
    }

    #[test_case("store.book"; "missing root")]
    #[test_case("$.store.book[?(@.price)"; "unbalanced paren")]
    #[test_case("$[?@.a == @..b]"; "non-singular comparison")]
    #[test_case("$[?frobnicate(@)]"; "unknown function")]
    #[test_case("$[1 2]"; "missing comma")]
    fn rejects(path: &str) {
        assert!(Path::parse(path).is_err());
    }

    #[test]
    fn multiple_selectors_in_one_segment() {
        assert_eq!(
            titles("$.store.book[0, 2].title"),
            ["Sayings of the Century", "Moby Dick"]
        );
    }
}
