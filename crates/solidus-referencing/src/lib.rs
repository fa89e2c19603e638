//! Schema resource referencing: registries, canonical URIs, anchors and
//! dynamic scopes.
//!
//! A [`Registry`] holds schema resources keyed by canonical URI, eagerly
//! indexing nested `$id` resources and `$anchor`/`$dynamicAnchor` names. A
//! [`Resolver`] walks references against a base URI while maintaining the
//! dynamic scope that `$dynamicRef` resolution consults. External documents
//! are supplied by the host through [`SchemaLocator`].
mod anchors;
mod error;
pub mod meta;
mod registry;
mod resolver;
mod resource;
mod retriever;
mod specification;
pub mod uri;

pub(crate) use anchors::Anchor;
pub use error::Error;
pub use fluent_uri::{Uri, UriRef};
pub use registry::{Registry, SPECIFICATIONS};
pub use resolver::{Resolved, Resolver};
pub use resource::{Resource, ResourceRef};
pub use retriever::{SchemaLocator, UnsupportedLocator};
pub use specification::{Draft, Vocabulary, VocabularySet};
