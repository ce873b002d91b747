//! Per-document orchestration: parse, classify, look up, validate, report
//!
//! Every stage either hands its output to the next one or ends the document
//! with a `DocumentError`. Calls are independent of each other; the only shared
//! state is the read-only compiled schema cache behind the `SchemaProvider`.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::{DocumentType, TypeClassifier};
use crate::config::Config;
use crate::document::XmlDocument;
use crate::error::DocumentError;
use crate::error_reporter::{ErrorReporter, ValidationError};
use crate::libxml2::{LibXml2Wrapper, SchemaCheck};
use crate::registry::{SchemaProvider, SchemaRegistry};
use crate::validator::Validator;

/// Outcome of validating one well-formed, supported document
///
/// `errors` is empty exactly when `valid` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    document_type: DocumentType,
    valid: bool,
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    fn valid(document_type: DocumentType) -> Self {
        Self {
            document_type,
            valid: true,
            errors: Vec::new(),
        }
    }

    fn invalid(document_type: DocumentType, errors: Vec<ValidationError>) -> Self {
        Self {
            document_type,
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }
}

pub struct Pipeline<P: SchemaProvider = SchemaRegistry> {
    engine: Arc<LibXml2Wrapper>,
    classifier: TypeClassifier,
    schemas: P,
    validator: Validator,
    reporter: ErrorReporter,
}

impl Pipeline<SchemaRegistry> {
    /// Wire the whole pipeline from an immutable configuration
    pub fn from_config(config: &Config) -> Self {
        let engine = Arc::new(LibXml2Wrapper::new());
        let classifier = TypeClassifier::new(config.namespaces.clone());
        let reporter = ErrorReporter::new(
            config.namespaces.iter().map(|mapping| mapping.uri.as_str()),
            config.reporting.language,
        );
        let schemas = SchemaRegistry::new(&config.schemas, Arc::clone(&engine));

        Self::new(engine, classifier, schemas, reporter)
    }
}

impl<P: SchemaProvider> Pipeline<P> {
    pub fn new(
        engine: Arc<LibXml2Wrapper>,
        classifier: TypeClassifier,
        schemas: P,
        reporter: ErrorReporter,
    ) -> Self {
        Self {
            validator: Validator::new(Arc::clone(&engine)),
            engine,
            classifier,
            schemas,
            reporter,
        }
    }

    pub fn schemas(&self) -> &P {
        &self.schemas
    }

    /// Validate one document held in memory
    pub fn validate(&self, content: &[u8]) -> Result<ValidationResult, DocumentError> {
        if content.iter().all(u8::is_ascii_whitespace) {
            return Err(DocumentError::EmptyContent);
        }

        let document = XmlDocument::parse(&self.engine, content)?;

        let document_type = self.classifier.classify(document.root());
        debug!(root = %document.root().clark_name(), %document_type, "classified document");
        if !document_type.is_known() {
            return Err(DocumentError::UnsupportedType {
                namespace: document.root().namespace.clone(),
            });
        }

        let schema = self.schemas.schema_for(document_type)?;

        match self.validator.check(&document, &schema)? {
            SchemaCheck::Valid => Ok(ValidationResult::valid(document_type)),
            SchemaCheck::Invalid { violations } => {
                let errors = self.reporter.report(&violations, &document);
                debug!(%document_type, errors = errors.len(), "reported violations");
                Ok(ValidationResult::invalid(document_type, errors))
            }
        }
    }
}

impl<P: SchemaProvider + 'static> Pipeline<P> {
    /// Read a file and validate it on the blocking pool
    ///
    /// Read failures and a panicking validation task both end up as
    /// `DocumentError::Internal` for that file only.
    pub async fn validate_file(
        self: &Arc<Self>,
        path: &Path,
    ) -> Result<ValidationResult, DocumentError> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| DocumentError::Internal {
                details: format!("failed to read {}: {}", path.display(), e),
            })?;

        let pipeline = Arc::clone(self);
        tokio::task::spawn_blocking(move || pipeline.validate(&content))
            .await
            .map_err(|e| DocumentError::Internal {
                details: format!("validation task failed: {}", e),
            })?
    }
}
