//! Allocation-free instance locations used during validation.
use solidus_value::{Pointer, ReferenceToken};

/// One borrowed step within the instance.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LocationSegment<'a> {
    /// Property name within an object.
    Property(&'a str),
    /// Index within an array.
    Index(usize),
}

impl<'a> From<&'a str> for LocationSegment<'a> {
    #[inline]
    fn from(value: &'a str) -> LocationSegment<'a> {
        LocationSegment::Property(value)
    }
}

impl From<usize> for LocationSegment<'_> {
    #[inline]
    fn from(value: usize) -> Self {
        LocationSegment::Index(value)
    }
}

/// A node in a parent-linked list tracking the current instance location.
///
/// Built on the stack while the validator descends, so pushing a segment
/// never allocates; only conversion into a [`Pointer`] does.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LocationNode<'a, 'b> {
    pub(crate) segment: LocationSegment<'a>,
    pub(crate) parent: Option<&'b LocationNode<'b, 'a>>,
}

impl Default for LocationNode<'_, '_> {
    fn default() -> Self {
        LocationNode::new()
    }
}

impl<'a, 'b> LocationNode<'a, 'b> {
    /// The root location.
    #[must_use]
    pub const fn new() -> Self {
        LocationNode {
            // Never read: the root has no parent to render it under.
            segment: LocationSegment::Index(0),
            parent: None,
        }
    }

    /// Extend the location with one more segment.
    #[inline]
    #[must_use]
    pub fn push(&'a self, segment: impl Into<LocationSegment<'a>>) -> Self {
        LocationNode {
            segment: segment.into(),
            parent: Some(self),
        }
    }

    fn collect(&self) -> Vec<ReferenceToken> {
        let mut capacity = 0;
        let mut head = self;
        while let Some(next) = head.parent {
            head = next;
            capacity += 1;
        }
        let mut buffer = Vec::with_capacity(capacity);
        let mut head = Some(self);
        while let Some(node) = head {
            if node.parent.is_some() {
                buffer.push(match node.segment {
                    LocationSegment::Property(name) => ReferenceToken::from(name),
                    LocationSegment::Index(index) => ReferenceToken::Index(index),
                });
            }
            head = node.parent;
        }
        buffer.reverse();
        buffer
    }
}

impl From<&LocationNode<'_, '_>> for Pointer {
    #[inline]
    fn from(location: &LocationNode<'_, '_>) -> Self {
        location.collect().into_iter().collect()
    }
}

impl From<LocationNode<'_, '_>> for Pointer {
    #[inline]
    fn from(location: LocationNode<'_, '_>) -> Self {
        Pointer::from(&location)
    }
}

#[cfg(test)]
mod tests {
    use solidus_value::Pointer;

    use super::LocationNode;

    #[test]
    fn renders_as_a_pointer() {
        let root = LocationNode::new();
        let first = root.push("items");
        let second = first.push(3_usize);
        let third = second.push("a/b");
        assert_eq!(Pointer::from(&third).to_string(), "/items/3/a~1b");
        assert_eq!(Pointer::from(&root), Pointer::root());
    }
}
