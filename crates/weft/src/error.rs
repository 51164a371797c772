// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by every layer of the codec.
//!
//! Errors propagate unchanged to the top-level caller. While unwinding, the
//! structural codecs push the member and type they were processing onto the
//! error's trace, so a failure deep inside a graph reports the whole path:
//!
//! ```text
//! unknown tag 7 for class Order
//! Serialization trace:
//!   lines (Invoice)
//!   order (Shipment)
//! ```

use std::fmt;

/// Coarse classification of an [`Error`], for callers that branch on the
/// kind of failure rather than on its details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The byte stream is truncated or inconsistent with the registry.
    Malformed,
    /// The registry or a codec is set up in a way that can never work.
    Configuration,
    /// A versioned stream does not match the local type version.
    Evolution,
    /// Nesting depth or inflated block size limit exceeded.
    Resource,
    /// The value handed to `write` does not fit the declared type.
    Value,
    /// Underlying I/O (compression, config files).
    Io,
}

#[derive(Debug)]
pub enum ErrorKind {
    // ===== Malformed Data =====
    /// Input ended before `needed` more bytes could be read.
    BufferUnderflow { offset: usize, needed: usize },
    /// A varint ran past its maximum group count without terminating.
    MalformedVarInt { offset: usize, max_bytes: usize },
    /// String bytes are not valid UTF-8.
    InvalidUtf8 { offset: usize },
    /// A back-reference names an ordinal that was never assigned.
    UnknownReference(u32),
    /// A back-reference names an object whose construction has not finished.
    UnresolvedReference(u32),
    /// A class token carries an id with no registration.
    UnknownClassId(u32),
    /// A NAME token refers to a name id never introduced in this stream.
    UnknownClassNameId(u32),
    /// A class name on the wire has no known class definition.
    UnknownClassName(String),
    /// A tagged member has no local counterpart and cannot be skipped.
    UnknownTag { class: String, tag: u32 },
    /// Catch-all for structural inconsistencies.
    InvalidData(String),

    // ===== Configuration Errors =====
    /// Type is not registered and the registry is closed.
    Unregistered(String),
    /// Two registrations claim the same id.
    IdConflict {
        id: u32,
        existing: String,
        requested: String,
    },
    /// Two members of one hierarchy share a tag.
    DuplicateTag {
        class: String,
        tag: u32,
        first: String,
        second: String,
    },
    /// A structural codec needs to allocate a type that cannot be constructed.
    NotInstantiable(String),
    /// A member declares a class that is not in the catalog.
    UnknownClass(String),
    /// A codec was asked to handle a type it was not built for.
    UnsupportedType { codec: &'static str, ty: String },
    /// Config file content could not be parsed.
    InvalidConfig(String),

    // ===== Evolution Errors =====
    /// Versioned stream disagrees with the local type version.
    VersionMismatch {
        class: String,
        stream: u32,
        local: u32,
    },

    // ===== Resource Errors =====
    /// Graph nesting exceeded the configured depth.
    DepthExceeded { max_depth: usize },
    /// A compressed block inflates past the configured size.
    InflateLimitExceeded { limit: usize },

    // ===== Value Errors =====
    /// Value does not match the declared member or codec type.
    TypeMismatch { expected: String, found: String },
    /// Null written where the declared type cannot hold it.
    NullNotAllowed,
    /// Accessor named a member the class does not have.
    NoSuchMember { class: String, member: String },

    // ===== I/O Errors =====
    Io(std::io::Error),
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::BufferUnderflow { .. }
            | ErrorKind::MalformedVarInt { .. }
            | ErrorKind::InvalidUtf8 { .. }
            | ErrorKind::UnknownReference(_)
            | ErrorKind::UnresolvedReference(_)
            | ErrorKind::UnknownClassId(_)
            | ErrorKind::UnknownClassNameId(_)
            | ErrorKind::UnknownClassName(_)
            | ErrorKind::UnknownTag { .. }
            | ErrorKind::InvalidData(_) => ErrorCategory::Malformed,
            ErrorKind::Unregistered(_)
            | ErrorKind::IdConflict { .. }
            | ErrorKind::DuplicateTag { .. }
            | ErrorKind::NotInstantiable(_)
            | ErrorKind::UnknownClass(_)
            | ErrorKind::UnsupportedType { .. }
            | ErrorKind::InvalidConfig(_) => ErrorCategory::Configuration,
            ErrorKind::VersionMismatch { .. } => ErrorCategory::Evolution,
            ErrorKind::DepthExceeded { .. } | ErrorKind::InflateLimitExceeded { .. } => {
                ErrorCategory::Resource
            }
            ErrorKind::TypeMismatch { .. }
            | ErrorKind::NullNotAllowed
            | ErrorKind::NoSuchMember { .. } => ErrorCategory::Value,
            ErrorKind::Io(_) => ErrorCategory::Io,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::BufferUnderflow { offset, needed } => write!(
                f,
                "unexpected end of buffer at offset {} ({} more bytes needed)",
                offset, needed
            ),
            ErrorKind::MalformedVarInt { offset, max_bytes } => write!(
                f,
                "malformed varint at offset {}: no terminator within {} bytes",
                offset, max_bytes
            ),
            ErrorKind::InvalidUtf8 { offset } => {
                write!(f, "invalid UTF-8 in string at offset {}", offset)
            }
            ErrorKind::UnknownReference(ordinal) => {
                write!(f, "reference to unassigned ordinal {}", ordinal)
            }
            ErrorKind::UnresolvedReference(ordinal) => write!(
                f,
                "reference to ordinal {} before its object was constructed",
                ordinal
            ),
            ErrorKind::UnknownClassId(id) => write!(f, "unregistered class id {}", id),
            ErrorKind::UnknownClassNameId(id) => write!(f, "unknown class name id {}", id),
            ErrorKind::UnknownClassName(name) => write!(f, "unknown class name '{}'", name),
            ErrorKind::UnknownTag { class, tag } => {
                write!(f, "unknown tag {} for class {}", tag, class)
            }
            ErrorKind::InvalidData(reason) => write!(f, "invalid data: {}", reason),
            ErrorKind::Unregistered(name) => write!(
                f,
                "class is not registered: {} (registration is required)",
                name
            ),
            ErrorKind::IdConflict {
                id,
                existing,
                requested,
            } => write!(
                f,
                "id {} already registered to {}, cannot assign it to {}",
                id, existing, requested
            ),
            ErrorKind::DuplicateTag {
                class,
                tag,
                first,
                second,
            } => write!(
                f,
                "duplicate tag {} in {}: members '{}' and '{}'",
                tag, class, first, second
            ),
            ErrorKind::NotInstantiable(name) => {
                write!(f, "class cannot be instantiated: {}", name)
            }
            ErrorKind::UnknownClass(name) => write!(f, "class is not defined: {}", name),
            ErrorKind::UnsupportedType { codec, ty } => {
                write!(f, "{} cannot handle type {}", codec, ty)
            }
            ErrorKind::InvalidConfig(reason) => write!(f, "invalid configuration: {}", reason),
            ErrorKind::VersionMismatch {
                class,
                stream,
                local,
            } => write!(
                f,
                "version mismatch for {}: stream version {}, local version {}",
                class, stream, local
            ),
            ErrorKind::DepthExceeded { max_depth } => {
                write!(f, "maximum graph depth exceeded ({})", max_depth)
            }
            ErrorKind::InflateLimitExceeded { limit } => {
                write!(f, "deflate block inflates past {} bytes", limit)
            }
            ErrorKind::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, found {}", expected, found)
            }
            ErrorKind::NullNotAllowed => write!(f, "null value not allowed here"),
            ErrorKind::NoSuchMember { class, member } => {
                write!(f, "class {} has no member '{}'", class, member)
            }
            ErrorKind::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

/// Error returned by every fallible operation in this crate.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    trace: Vec<String>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            trace: Vec::new(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Member/type path, innermost entry first.
    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    /// Append one level of context while the error unwinds.
    #[must_use]
    pub fn with_trace(mut self, entry: impl Into<String>) -> Self {
        self.trace.push(entry.into());
        self
    }

    pub(crate) fn invalid_data(reason: impl Into<String>) -> Self {
        Error::new(ErrorKind::InvalidData(reason.into()))
    }

    pub(crate) fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::new(ErrorKind::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.trace.is_empty() {
            write!(f, "\nSerialization trace:")?;
            for entry in &self.trace {
                write!(f, "\n  {}", entry)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::new(ErrorKind::Io(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_variants() {
        let err = Error::new(ErrorKind::BufferUnderflow {
            offset: 12,
            needed: 4,
        });
        assert_eq!(
            err.to_string(),
            "unexpected end of buffer at offset 12 (4 more bytes needed)"
        );

        let err = Error::new(ErrorKind::MalformedVarInt {
            offset: 3,
            max_bytes: 5,
        });
        assert_eq!(
            err.to_string(),
            "malformed varint at offset 3: no terminator within 5 bytes"
        );

        let err = Error::new(ErrorKind::VersionMismatch {
            class: "Order".into(),
            stream: 3,
            local: 2,
        });
        assert_eq!(
            err.to_string(),
            "version mismatch for Order: stream version 3, local version 2"
        );
    }

    #[test]
    fn test_error_trace_is_rendered_innermost_first() {
        let err = Error::new(ErrorKind::UnknownTag {
            class: "Order".into(),
            tag: 7,
        })
        .with_trace("lines (Invoice)")
        .with_trace("order (Shipment)");

        assert_eq!(err.trace(), &["lines (Invoice)", "order (Shipment)"]);
        assert_eq!(
            err.to_string(),
            "unknown tag 7 for class Order\nSerialization trace:\n  lines (Invoice)\n  order (Shipment)"
        );
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            Error::new(ErrorKind::UnknownReference(4)).category(),
            ErrorCategory::Malformed
        );
        assert_eq!(
            Error::new(ErrorKind::Unregistered("Point".into())).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            Error::new(ErrorKind::VersionMismatch {
                class: "Point".into(),
                stream: 1,
                local: 2
            })
            .category(),
            ErrorCategory::Evolution
        );
        assert_eq!(
            Error::new(ErrorKind::DepthExceeded { max_depth: 8 }).category(),
            ErrorCategory::Resource
        );
        assert_eq!(
            Error::new(ErrorKind::InflateLimitExceeded { limit: 8 }).category(),
            ErrorCategory::Resource
        );
        assert_eq!(
            Error::type_mismatch("int", "String").category(),
            ErrorCategory::Value
        );
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error as _;
        let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert_eq!(err.category(), ErrorCategory::Io);
        assert!(err.source().is_some());
    }
}
