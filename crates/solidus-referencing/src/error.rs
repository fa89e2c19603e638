use core::fmt;

/// Errors that may happen while resolving schema references.
#[derive(Debug)]
pub enum Error {
    /// A URI or URI reference failed to parse or resolve.
    InvalidUri {
        uri: String,
        detail: String,
    },
    /// A resource is not in the registry and the locator failed to supply it.
    Unretrievable {
        uri: String,
        detail: Option<String>,
    },
    /// Two different resources claim the same canonical URI.
    DuplicateId {
        uri: String,
    },
    /// The `$schema` value does not identify a known meta-schema.
    UnknownMetaSchema {
        uri: String,
    },
    /// The fragment names an anchor that does not exist in the resource.
    NoSuchAnchor {
        name: String,
    },
    /// The fragment is not a valid anchor name.
    InvalidAnchor {
        name: String,
    },
    /// A pointer fragment does not address anything in the resource.
    PointerToNowhere {
        pointer: String,
    },
    /// A pointer fragment holds an invalid array index.
    InvalidArrayIndex {
        pointer: String,
        index: String,
    },
    /// A pointer fragment is not valid percent-encoded UTF-8.
    InvalidPercentEncoding {
        pointer: String,
    },
}

impl Error {
    pub(crate) fn invalid_uri(uri: impl Into<String>, detail: impl fmt::Display) -> Error {
        Error::InvalidUri {
            uri: uri.into(),
            detail: detail.to_string(),
        }
    }
    pub(crate) fn unretrievable(uri: impl Into<String>, detail: Option<String>) -> Error {
        Error::Unretrievable {
            uri: uri.into(),
            detail,
        }
    }
    pub(crate) fn duplicate_id(uri: impl Into<String>) -> Error {
        Error::DuplicateId { uri: uri.into() }
    }
    pub(crate) fn unknown_meta_schema(uri: impl Into<String>) -> Error {
        Error::UnknownMetaSchema { uri: uri.into() }
    }
    pub(crate) fn no_such_anchor(name: impl Into<String>) -> Error {
        Error::NoSuchAnchor { name: name.into() }
    }
    pub(crate) fn invalid_anchor(name: impl Into<String>) -> Error {
        Error::InvalidAnchor { name: name.into() }
    }
    pub(crate) fn pointer_to_nowhere(pointer: impl Into<String>) -> Error {
        Error::PointerToNowhere {
            pointer: pointer.into(),
        }
    }
    pub(crate) fn invalid_array_index(
        pointer: impl Into<String>,
        index: impl Into<String>,
    ) -> Error {
        Error::InvalidArrayIndex {
            pointer: pointer.into(),
            index: index.into(),
        }
    }
    pub(crate) fn invalid_percent_encoding(pointer: impl Into<String>) -> Error {
        Error::InvalidPercentEncoding {
            pointer: pointer.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidUri { uri, detail } => {
                write!(f, "Invalid URI '{uri}': {detail}")
            }
            Error::Unretrievable { uri, detail } => {
                write!(f, "Resource '{uri}' is not present in a registry")?;
                if let Some(detail) = detail {
                    write!(f, " and retrieving it failed: {detail}")?;
                }
                Ok(())
            }
            Error::DuplicateId { uri } => {
                write!(f, "Another resource already uses the id '{uri}'")
            }
            Error::UnknownMetaSchema { uri } => {
                write!(f, "'{uri}' does not identify a known meta-schema")
            }
            Error::NoSuchAnchor { name } => write!(f, "Anchor '{name}' does not exist"),
            Error::InvalidAnchor { name } => write!(f, "Anchor '{name}' is invalid"),
            Error::PointerToNowhere { pointer } => {
                write!(f, "Pointer '{pointer}' does not exist")
            }
            Error::InvalidArrayIndex { pointer, index } => {
                write!(f, "Invalid array index '{index}' in pointer '{pointer}'")
            }
            Error::InvalidPercentEncoding { pointer } => {
                write!(f, "Pointer '{pointer}' is not valid percent-encoded UTF-8")
            }
        }
    }
}

impl std::error::Error for Error {}
