//! The streaming event protocol shared by all format readers and writers.
use crate::{
    error::{ReadError, WriteError},
    value::{Object, Value},
};

/// One step of a streamed value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueEvent {
    BeginArray,
    EndArray,
    BeginObject,
    EndObject,
    /// The key of the next object member. Keys may be composite values;
    /// readers compose them before emitting.
    Key(Value),
    Scalar(Value),
    /// A tag applied to the next composed value.
    Tag(Value),
    /// An anchor naming the next composed value.
    Anchor(String),
    /// A reference to a previously anchored value.
    Alias(String),
    /// A presentation hint for the next node; carries no data.
    Style(ValueStyle),
}

/// Presentation styles understood by writers that distinguish them (YAML).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
    Flow,
    Block,
}

/// A pull-based reader producing a finite, non-restartable event sequence.
pub trait FormatReader: Iterator<Item = Result<ValueEvent, ReadError>> {
    /// Compose the remaining events into a single value.
    fn read_value(&mut self) -> Result<Value, ReadError>
    where
        Self: Sized,
    {
        Composer::default().compose(self)
    }
}

/// A push-based writer consuming an event sequence.
pub trait FormatWriter {
    fn write(&mut self, event: &ValueEvent) -> Result<(), WriteError>;

    /// Flush and release the buffer. Writing after `finish` is an error.
    fn finish(&mut self) -> Result<(), WriteError>;

    /// Flatten a value into events and write them all.
    fn write_value(&mut self, value: &Value) -> Result<(), WriteError> {
        for event in Decomposer::events(value) {
            self.write(&event)?;
        }
        Ok(())
    }
}

/// Tags and anchor collected before a node starts; they attach to the node
/// they precede, container or scalar.
#[derive(Default)]
struct Pending {
    tags: Vec<Value>,
    anchor: Option<String>,
}

enum Frame {
    Array(Vec<Value>, Pending),
    Object {
        object: Object,
        pending_key: Option<Value>,
        pending: Pending,
    },
}

/// Assembles a [`Value`] from an event stream, resolving anchors, aliases
/// and tags along the way.
#[derive(Default)]
pub struct Composer {
    stack: Vec<Frame>,
    pending: Pending,
    anchors: ahash::AHashMap<String, Value>,
}

impl Composer {
    /// Drive the iterator until one complete value has been composed.
    pub fn compose<I>(&mut self, events: &mut I) -> Result<Value, ReadError>
    where
        I: Iterator<Item = Result<ValueEvent, ReadError>> + ?Sized,
    {
        for event in events {
            if let Some(value) = self.push(event?)? {
                return Ok(value);
            }
        }
        Err(ReadError::IncompleteValue)
    }

    /// Feed one event; returns the finished value once the stream closes.
    pub fn push(&mut self, event: ValueEvent) -> Result<Option<Value>, ReadError> {
        match event {
            ValueEvent::Style(_) => Ok(None),
            ValueEvent::Tag(tag) => {
                self.pending.tags.push(tag);
                Ok(None)
            }
            ValueEvent::Anchor(name) => {
                self.pending.anchor = Some(name);
                Ok(None)
            }
            ValueEvent::Alias(name) => {
                let value = self
                    .anchors
                    .get(&name)
                    .cloned()
                    .ok_or(ReadError::UnknownAlias { name })?;
                let pending = std::mem::take(&mut self.pending);
                self.complete(value, pending)
            }
            ValueEvent::Scalar(value) => {
                let pending = std::mem::take(&mut self.pending);
                self.complete(value, pending)
            }
            ValueEvent::Key(key) => match self.stack.last_mut() {
                Some(Frame::Object { pending_key, .. }) if pending_key.is_none() => {
                    *pending_key = Some(key);
                    Ok(None)
                }
                _ => Err(ReadError::IncompleteValue),
            },
            ValueEvent::BeginArray => {
                let pending = std::mem::take(&mut self.pending);
                self.stack.push(Frame::Array(Vec::new(), pending));
                Ok(None)
            }
            ValueEvent::BeginObject => {
                let pending = std::mem::take(&mut self.pending);
                self.stack.push(Frame::Object {
                    object: Object::default(),
                    pending_key: None,
                    pending,
                });
                Ok(None)
            }
            ValueEvent::EndArray => match self.stack.pop() {
                Some(Frame::Array(items, pending)) => {
                    self.complete(Value::Array(items), pending)
                }
                _ => Err(ReadError::IncompleteValue),
            },
            ValueEvent::EndObject => match self.stack.pop() {
                Some(Frame::Object {
                    object,
                    pending_key: None,
                    pending,
                }) => self.complete(Value::Object(object), pending),
                _ => Err(ReadError::IncompleteValue),
            },
        }
    }

    fn complete(
        &mut self,
        mut value: Value,
        mut pending: Pending,
    ) -> Result<Option<Value>, ReadError> {
        // Innermost tag first: `tag(a) tag(b) scalar(x)` reads as a(b(x)).
        while let Some(tag) = pending.tags.pop() {
            value = Value::tagged(tag, value);
        }
        if let Some(name) = pending.anchor.take() {
            self.anchors.insert(name, value.clone());
        }
        match self.stack.last_mut() {
            None => Ok(Some(value)),
            Some(Frame::Array(items, _)) => {
                items.push(value);
                Ok(None)
            }
            Some(Frame::Object {
                object,
                pending_key,
                ..
            }) => {
                let Some(key) = pending_key.take() else {
                    return Err(ReadError::IncompleteValue);
                };
                object.insert(key, value);
                Ok(None)
            }
        }
    }
}

/// Flattens a [`Value`] into the canonical event sequence.
pub struct Decomposer;

impl Decomposer {
    #[must_use]
    pub fn events(value: &Value) -> Vec<ValueEvent> {
        let mut events = Vec::new();
        flatten(value, &mut events);
        events
    }
}

fn flatten(value: &Value, events: &mut Vec<ValueEvent>) {
    match value {
        Value::Tagged(tagged) => {
            events.push(ValueEvent::Tag(tagged.tag.clone()));
            flatten(&tagged.value, events);
        }
        Value::Array(items) => {
            events.push(ValueEvent::BeginArray);
            for item in items {
                flatten(item, events);
            }
            events.push(ValueEvent::EndArray);
        }
        Value::Object(object) => {
            events.push(ValueEvent::BeginObject);
            for (key, item) in object {
                events.push(ValueEvent::Key(key.clone()));
                flatten(item, events);
            }
            events.push(ValueEvent::EndObject);
        }
        scalar => events.push(ValueEvent::Scalar(scalar.clone())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Composer, Decomposer, ValueEvent};
    use crate::value::Value;

    fn recompose(value: &Value) -> Value {
        let mut events = Decomposer::events(value).into_iter().map(Ok);
        Composer::default().compose(&mut events).unwrap()
    }

    #[test]
    fn round_trips_containers() {
        let value = Value::from(json!({"a": [1, 2, {"b": null}], "c": true}));
        assert_eq!(recompose(&value), value);
    }

    #[test]
    fn round_trips_tags() {
        let value = Value::tagged(
            Value::from("tag:example"),
            Value::from(json!([1, "two"])),
        );
        assert_eq!(recompose(&value), value);
    }

    #[test]
    fn aliases_reuse_anchored_values() {
        let events = vec![
            ValueEvent::BeginArray,
            ValueEvent::Anchor("a".to_string()),
            ValueEvent::Scalar(Value::from("shared")),
            ValueEvent::Alias("a".to_string()),
            ValueEvent::EndArray,
        ];
        let mut events = events.into_iter().map(Ok);
        let composed = Composer::default().compose(&mut events).unwrap();
        assert_eq!(composed, Value::from(json!(["shared", "shared"])));
    }

    #[test]
    fn unknown_alias_is_an_error() {
        let mut events = [Ok(ValueEvent::Alias("ghost".to_string()))].into_iter();
        assert!(Composer::default().compose(&mut events).is_err());
    }

    #[test]
    fn truncated_stream_is_incomplete() {
        let mut events = [Ok(ValueEvent::BeginArray)].into_iter();
        assert!(Composer::default().compose(&mut events).is_err());
    }
}
