use std::path::PathBuf;

use thiserror::Error;

use crate::classifier::DocumentType;

/// Terminal outcome for a single document
///
/// At most one of these applies to a document and it fully determines the
/// result. Schema violations are not errors: they come back inside a
/// `ValidationResult`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Document is empty")]
    EmptyContent,

    #[error("XML syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: u32,
        column: u32,
        message: String,
    },

    #[error("Unsupported document type: root namespace {}", namespace.as_deref().unwrap_or("(none)"))]
    UnsupportedType { namespace: Option<String> },

    #[error("Unsupported document type: no schema configured for {document_type}")]
    SchemaNotConfigured { document_type: DocumentType },

    #[error("Internal error: {details}")]
    Internal { details: String },
}

impl DocumentError {
    /// Both ways a document can end up without a schema to check against
    pub fn is_unsupported_type(&self) -> bool {
        matches!(
            self,
            DocumentError::UnsupportedType { .. } | DocumentError::SchemaNotConfigured { .. }
        )
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, DocumentError::Syntax { .. })
    }
}

/// Schema registry failures
///
/// Outside of `NotConfigured` these are fatal at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No schema configured for {document_type}")]
    NotConfigured { document_type: DocumentType },

    #[error("Schema not found for {document_type}: {}", path.display())]
    SchemaNotFound {
        document_type: DocumentType,
        path: PathBuf,
    },

    #[error("Schema compilation failed for {document_type} ({}): {details}", path.display())]
    SchemaCompilation {
        document_type: DocumentType,
        path: PathBuf,
        details: String,
    },
}

/// LibXML2-specific error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibXml2Error {
    #[error("Schema parsing failed: {details}")]
    SchemaParseFailed { details: String },

    #[error("Parser context creation failed")]
    ParserContextCreationFailed,

    #[error("Validation context creation failed")]
    ValidationContextCreationFailed,

    #[error("Memory allocation failed in libxml2")]
    MemoryAllocation,

    #[error("Input of {size} bytes is too large for libxml2")]
    DocumentTooLarge { size: usize },

    #[error("Malformed XML at line {line}, column {column}: {message}")]
    MalformedDocument {
        line: u32,
        column: u32,
        message: String,
    },

    #[error("Schema validation internal error (code {code})")]
    InternalError { code: i32 },
}

impl From<LibXml2Error> for DocumentError {
    fn from(err: LibXml2Error) -> Self {
        match err {
            LibXml2Error::MalformedDocument {
                line,
                column,
                message,
            } => DocumentError::Syntax {
                line,
                column,
                message,
            },
            other => DocumentError::Internal {
                details: other.to_string(),
            },
        }
    }
}

impl From<RegistryError> for DocumentError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotConfigured { document_type } => {
                DocumentError::SchemaNotConfigured { document_type }
            }
            other => DocumentError::Internal {
                details: other.to_string(),
            },
        }
    }
}

/// LibXML2 result type alias
pub type LibXml2Result<T> = std::result::Result<T, LibXml2Error>;

/// Registry result type alias
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
