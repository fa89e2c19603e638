use fluent_uri::Uri;
use solidus_value::Value;

/// Host-provided source of remote schema documents.
///
/// The core never performs I/O: when reference resolution leaves the set of
/// registered resources, the registry asks its locator. Implementations
/// typically map a directory or a fixed table of schemas.
pub trait SchemaLocator: Send + Sync {
    /// Fetch the document identified by `uri`.
    fn locate(&self, uri: &Uri<&str>) -> Result<Value, Box<dyn std::error::Error + Send + Sync>>;
}

/// The default locator: every lookup fails.
pub struct UnsupportedLocator;

impl SchemaLocator for UnsupportedLocator {
    fn locate(&self, _uri: &Uri<&str>) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err("external schema retrieval is not configured".into())
    }
}
