//! Output formats for schema application, following the JSON Schema
//! 2020-12 output specification: `flag`, `basic`, `detailed` and `verbose`.
use std::{
    borrow::Cow,
    collections::VecDeque,
    fmt,
    iter::Sum,
    ops::AddAssign,
};

use ahash::AHashMap;
use serde::ser::SerializeMap;
use solidus_referencing::Uri;
use solidus_value::{Pointer, Value};

use crate::{node::SchemaNode, validator::PartialApplication, Schema, ValidationError};

/// A deferred application of a schema to an instance. Formats are evaluated
/// lazily because they have different costs: `flag` short-circuits, the
/// structured formats walk every behavior.
#[derive(Debug, Clone)]
pub struct Output<'a, 'b> {
    schema: &'a Schema,
    root_node: &'a SchemaNode,
    instance: &'b Value,
}

impl<'a, 'b> Output<'a, 'b> {
    pub(crate) const fn new<'c, 'd>(
        schema: &'c Schema,
        root_node: &'c SchemaNode,
        instance: &'d Value,
    ) -> Output<'c, 'd> {
        Output {
            schema,
            root_node,
            instance,
        }
    }

    /// The boolean-only "flag" format.
    #[must_use]
    pub fn flag(&self) -> bool {
        self.schema.is_valid(self.instance)
    }

    /// The flat "basic" format: a list of output units.
    #[must_use]
    pub fn basic(&self) -> BasicOutput<'a> {
        self.root_node
            .apply_rooted(self.instance, &crate::paths::LocationNode::new())
    }

    /// The hierarchical "detailed" format: passing leaves without
    /// annotations are pruned and single-child chains collapse.
    #[must_use]
    pub fn detailed(&self) -> OutputNode<'a> {
        prune(self.verbose())
    }

    /// The hierarchical "verbose" format: every applied keyword appears
    /// with its outcome. The schema-directed coding layer consumes this.
    #[must_use]
    pub fn verbose(&self) -> OutputNode<'a> {
        build_tree(self.basic())
    }
}

/// What a single behavior application produced.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum OutcomePayload<'a> {
    Annotation(Annotations<'a>),
    Error(ErrorDescription),
    /// The behavior passed without producing an annotation. Kept so the
    /// verbose format can show every applied keyword.
    Pass,
}

/// One applied keyword: where it sits in the schema and the instance, and
/// what came of it.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputUnit<'a> {
    keyword_location: Pointer,
    instance_location: Pointer,
    absolute_keyword_location: Option<Uri<String>>,
    payload: OutcomePayload<'a>,
}

impl<'a> OutputUnit<'a> {
    pub(crate) const fn annotation(
        keyword_location: Pointer,
        instance_location: Pointer,
        absolute_keyword_location: Option<Uri<String>>,
        annotations: Annotations<'a>,
    ) -> OutputUnit<'a> {
        OutputUnit {
            keyword_location,
            instance_location,
            absolute_keyword_location,
            payload: OutcomePayload::Annotation(annotations),
        }
    }

    pub(crate) const fn error(
        keyword_location: Pointer,
        instance_location: Pointer,
        absolute_keyword_location: Option<Uri<String>>,
        error: ErrorDescription,
    ) -> OutputUnit<'a> {
        OutputUnit {
            keyword_location,
            instance_location,
            absolute_keyword_location,
            payload: OutcomePayload::Error(error),
        }
    }

    pub(crate) const fn pass(
        keyword_location: Pointer,
        instance_location: Pointer,
        absolute_keyword_location: Option<Uri<String>>,
    ) -> OutputUnit<'a> {
        OutputUnit {
            keyword_location,
            instance_location,
            absolute_keyword_location,
            payload: OutcomePayload::Pass,
        }
    }

    /// The location of the keyword in the schema.
    #[must_use]
    pub const fn keyword_location(&self) -> &Pointer {
        &self.keyword_location
    }

    /// The location in the instance the keyword applied to.
    #[must_use]
    pub const fn instance_location(&self) -> &Pointer {
        &self.instance_location
    }

    /// The dereferenced keyword location, when the schema has a canonical
    /// URI.
    #[must_use]
    pub fn absolute_keyword_location(&self) -> Option<Uri<&str>> {
        self.absolute_keyword_location.as_ref().map(Uri::borrow)
    }

    /// The keyword itself: the last schema location token.
    #[must_use]
    pub fn keyword(&self) -> Option<String> {
        self.keyword_location
            .last()
            .map(|token| token.as_text().into_owned())
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        !matches!(self.payload, OutcomePayload::Error(_))
    }

    /// The annotation value, if this unit carries one.
    #[must_use]
    pub fn annotations(&self) -> Option<Cow<'_, Value>> {
        match &self.payload {
            OutcomePayload::Annotation(annotations) => Some(annotations.value()),
            _ => None,
        }
    }

    /// The error, if this unit carries one.
    #[must_use]
    pub fn error_description(&self) -> Option<&ErrorDescription> {
        match &self.payload {
            OutcomePayload::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Discard the annotation payload, keeping the applied-keyword record.
    /// Used when an enclosing schema fails: annotations below a failing
    /// schema never reach the merged output.
    pub(crate) fn drop_annotation(&mut self) {
        if matches!(self.payload, OutcomePayload::Annotation(_)) {
            self.payload = OutcomePayload::Pass;
        }
    }
}

/// The flat "basic" output: overall validity plus every collected unit.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicOutput<'a> {
    valid: bool,
    units: VecDeque<OutputUnit<'a>>,
}

impl<'a> BasicOutput<'a> {
    pub(crate) fn valid(units: VecDeque<OutputUnit<'a>>) -> BasicOutput<'a> {
        BasicOutput { valid: true, units }
    }

    pub(crate) fn invalid(mut units: VecDeque<OutputUnit<'a>>) -> BasicOutput<'a> {
        for unit in &mut units {
            unit.drop_annotation();
        }
        BasicOutput {
            valid: false,
            units,
        }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// All collected output units, annotations and errors alike.
    pub fn iter_units(&self) -> impl Iterator<Item = &OutputUnit<'a>> {
        self.units.iter()
    }

    /// Annotation units only; empty for invalid results.
    pub fn annotations(&self) -> impl Iterator<Item = &OutputUnit<'a>> {
        self.units
            .iter()
            .filter(|unit| matches!(unit.payload, OutcomePayload::Annotation(_)))
    }

    /// Error units only; empty for valid results.
    pub fn errors(&self) -> impl Iterator<Item = &OutputUnit<'a>> {
        self.units
            .iter()
            .filter(|unit| matches!(unit.payload, OutcomePayload::Error(_)))
    }

    pub(crate) fn take_units(self) -> VecDeque<OutputUnit<'a>> {
        self.units
    }

    pub(crate) fn push_front(&mut self, unit: OutputUnit<'a>) {
        self.units.push_front(unit);
    }
}

impl Default for BasicOutput<'_> {
    fn default() -> Self {
        BasicOutput {
            valid: true,
            units: VecDeque::new(),
        }
    }
}

impl<'a> AddAssign for BasicOutput<'a> {
    fn add_assign(&mut self, mut rhs: Self) {
        if !rhs.valid {
            for unit in &mut self.units {
                unit.drop_annotation();
            }
        }
        if !self.valid {
            for unit in &mut rhs.units {
                unit.drop_annotation();
            }
        }
        self.valid &= rhs.valid;
        self.units.extend(rhs.units);
    }
}

impl<'a> Sum for BasicOutput<'a> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(BasicOutput::default(), |mut acc, elem| {
            acc += elem;
            acc
        })
    }
}

impl<'a> From<BasicOutput<'a>> for PartialApplication<'a> {
    fn from(output: BasicOutput<'a>) -> Self {
        if output.valid {
            PartialApplication::Valid {
                annotations: None,
                child_results: output.units,
            }
        } else {
            PartialApplication::Invalid {
                errors: Vec::new(),
                child_results: output.units,
            }
        }
    }
}

impl<'a> FromIterator<BasicOutput<'a>> for PartialApplication<'a> {
    fn from_iter<T: IntoIterator<Item = BasicOutput<'a>>>(iter: T) -> Self {
        iter.into_iter().sum::<BasicOutput<'_>>().into()
    }
}

/// Annotation payload attached to a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotations<'a>(AnnotationsInner<'a>);

#[derive(Debug, Clone, PartialEq)]
enum AnnotationsInner<'a> {
    /// Keywords nobody recognized, surfaced as an object annotation.
    UnmatchedKeywords(&'a AHashMap<String, Value>),
    ValueRef(&'a Value),
    Value(Box<Value>),
}

impl<'a> Annotations<'a> {
    /// The annotation as a value.
    #[must_use]
    pub fn value(&self) -> Cow<'_, Value> {
        match &self.0 {
            AnnotationsInner::UnmatchedKeywords(unmatched) => {
                let mut object = solidus_value::Object::default();
                for (key, value) in *unmatched {
                    object.insert(Value::String(key.clone()), value.clone());
                }
                Cow::Owned(Value::Object(object))
            }
            AnnotationsInner::ValueRef(value) => Cow::Borrowed(value),
            AnnotationsInner::Value(value) => Cow::Borrowed(value),
        }
    }
}

impl<'a> From<&'a AHashMap<String, Value>> for Annotations<'a> {
    fn from(unmatched: &'a AHashMap<String, Value>) -> Self {
        Annotations(AnnotationsInner::UnmatchedKeywords(unmatched))
    }
}

impl<'a> From<&'a Value> for Annotations<'a> {
    fn from(value: &'a Value) -> Self {
        Annotations(AnnotationsInner::ValueRef(value))
    }
}

impl From<Value> for Annotations<'_> {
    fn from(value: Value) -> Self {
        Annotations(AnnotationsInner::Value(Box::new(value)))
    }
}

/// A rendered assertion failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDescription(String);

impl ErrorDescription {
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ErrorDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ValidationError<'_>> for ErrorDescription {
    fn from(error: ValidationError<'_>) -> Self {
        ErrorDescription(error.to_string())
    }
}

impl From<&str> for ErrorDescription {
    fn from(message: &str) -> Self {
        ErrorDescription(message.to_string())
    }
}

impl serde::Serialize for ErrorDescription {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl serde::Serialize for BasicOutput<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("valid", &self.valid)?;
        if self.valid {
            map.serialize_entry("annotations", &self.annotations().collect::<Vec<_>>())?;
        } else {
            map.serialize_entry("errors", &self.errors().collect::<Vec<_>>())?;
        }
        map.end()
    }
}

impl serde::Serialize for OutputUnit<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("keywordLocation", &self.keyword_location)?;
        map.serialize_entry("instanceLocation", &self.instance_location)?;
        if let Some(absolute) = &self.absolute_keyword_location {
            map.serialize_entry("absoluteKeywordLocation", absolute.as_str())?;
        }
        match &self.payload {
            OutcomePayload::Annotation(annotations) => {
                map.serialize_entry("annotations", annotations.value().as_ref())?;
            }
            OutcomePayload::Error(error) => {
                map.serialize_entry("error", error)?;
            }
            OutcomePayload::Pass => {
                map.serialize_entry("valid", &true)?;
            }
        }
        map.end()
    }
}

/// One node of the hierarchical (`detailed`/`verbose`) output.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputNode<'a> {
    /// The unit at this node; `None` for the synthesized root.
    pub unit: Option<OutputUnit<'a>>,
    pub valid: bool,
    pub nested: Vec<OutputNode<'a>>,
}

impl OutputNode<'_> {
    /// Walk the tree depth-first.
    pub fn walk(&self, visit: &mut impl FnMut(&OutputNode<'_>)) {
        visit(self);
        for child in &self.nested {
            child.walk(visit);
        }
    }
}

impl serde::Serialize for OutputNode<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("valid", &self.valid)?;
        if let Some(unit) = &self.unit {
            map.serialize_entry("keywordLocation", unit.keyword_location())?;
            map.serialize_entry("instanceLocation", unit.instance_location())?;
            if let Some(absolute) = unit.absolute_keyword_location() {
                map.serialize_entry("absoluteKeywordLocation", absolute.as_str())?;
            }
            match &unit.payload {
                OutcomePayload::Annotation(annotations) => {
                    map.serialize_entry("annotation", annotations.value().as_ref())?;
                }
                OutcomePayload::Error(error) => {
                    map.serialize_entry("error", error)?;
                }
                OutcomePayload::Pass => {}
            }
        } else {
            map.serialize_entry("keywordLocation", "")?;
            map.serialize_entry("instanceLocation", "")?;
        }
        if !self.nested.is_empty() {
            map.serialize_entry(
                if self.valid { "annotations" } else { "errors" },
                &self.nested,
            )?;
        }
        map.end()
    }
}

/// Reconstruct the hierarchy from the flat unit list: a unit nests under
/// the unit whose keyword location is its longest proper prefix.
fn build_tree(output: BasicOutput<'_>) -> OutputNode<'_> {
    let valid = output.is_valid();
    let units: Vec<OutputUnit<'_>> = output.take_units().into();
    let mut nodes: Vec<OutputNode<'_>> = units
        .into_iter()
        .map(|unit| OutputNode {
            valid: unit.is_valid(),
            unit: Some(unit),
            nested: Vec::new(),
        })
        .collect();
    // Sort shallow-first so parents are placed before their children.
    nodes.sort_by_key(|node| {
        node.unit
            .as_ref()
            .map_or(0, |unit| unit.keyword_location().len())
    });
    let mut root = OutputNode {
        unit: None,
        valid,
        nested: Vec::new(),
    };
    for node in nodes {
        insert_node(&mut root, node);
    }
    root
}

fn is_prefix(prefix: &Pointer, pointer: &Pointer) -> bool {
    pointer.len() > prefix.len() && pointer.tokens()[..prefix.len()] == *prefix.tokens()
}

fn insert_node<'a>(parent: &mut OutputNode<'a>, node: OutputNode<'a>) {
    let location = node
        .unit
        .as_ref()
        .expect("only the root lacks a unit")
        .keyword_location();
    if let Some(child) = parent.nested.iter_mut().find(|child| {
        child
            .unit
            .as_ref()
            .is_some_and(|unit| is_prefix(unit.keyword_location(), location))
    }) {
        insert_node(child, node);
    } else {
        parent.nested.push(node);
    }
}

/// The `detailed` view: drop passing leaves without annotations, collapse
/// chains that carry no information of their own.
fn prune(mut node: OutputNode<'_>) -> OutputNode<'_> {
    node.nested = node
        .nested
        .drain(..)
        .map(prune)
        .filter(|child| {
            child
                .unit
                .as_ref()
                .is_some_and(|unit| !matches!(unit.payload, OutcomePayload::Pass))
                || !child.nested.is_empty()
        })
        .collect();
    node
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use solidus_value::Value;

    use crate::Schema;

    #[test]
    fn basic_output_lists_annotations() {
        let schema = Schema::new(&Value::from(json!({
            "title": "string value",
            "type": "string"
        })))
        .unwrap();
        let instance = Value::from("some string");
        let output = schema.apply(&instance).basic();
        assert!(output.is_valid());
        let annotations: Vec<_> = output.annotations().collect();
        assert_eq!(annotations.len(), 1);
        assert_eq!(
            annotations[0].annotations().unwrap().as_ref(),
            &Value::from(json!({"title": "string value"}))
        );
    }

    #[test]
    fn failing_branch_annotations_are_dropped() {
        let schema = Schema::new(&Value::from(json!({
            "anyOf": [
                {"title": "numeric branch", "type": "number"},
                {"title": "string branch", "type": "string"}
            ]
        })))
        .unwrap();
        let instance = Value::from("text");
        let output = schema.apply(&instance).basic();
        assert!(output.is_valid());
        let rendered = serde_json::to_string(&output).unwrap();
        assert!(rendered.contains("string branch"));
        assert!(!rendered.contains("numeric branch"));
    }

    #[test]
    fn verbose_tree_nests_by_keyword_location() {
        let schema = Schema::new(&Value::from(json!({
            "properties": {"a": {"type": "integer"}}
        })))
        .unwrap();
        let instance = Value::from(json!({"a": "not a number"}));
        let tree = schema.apply(&instance).verbose();
        assert!(!tree.valid);
        let mut locations = Vec::new();
        tree.walk(&mut |node| {
            if let Some(unit) = &node.unit {
                locations.push(unit.keyword_location().to_string());
            }
        });
        assert!(locations.contains(&"/properties/a/type".to_string()));
    }
}
